//! Social-insurance (SVS) contributions for the self-employed.
//!
//! # Contribution structure
//!
//! | Component | Base |
//! |-----------|------|
//! | Pension (PV) | Contribution base × pension rate |
//! | Health (KV) | Contribution base × health rate, or the founder rate |
//! | Provision (SV) | Contribution base × provision rate |
//! | Accident (UV) | Fixed monthly amount × insured months |
//!
//! The contribution base is the profit, raised to the minimum base and capped
//! at the maximum base. Both bounds scale with the insured months in the
//! founding year. Salaried income already insured elsewhere reduces the
//! remaining maximum.
//!
//! # Exemption
//!
//! Neue Selbständige whose profit stays at or below the annual exemption
//! threshold owe nothing. Gewerbetreibende are always insured and pay at least
//! on the minimum base.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use rechner_core::calculations::{SvsCalculator, SvsOptions};
//! use rechner_core::registry::YearConfigRegistry;
//!
//! let config = YearConfigRegistry::builtin().get(2025).unwrap();
//! let result = SvsCalculator::calculate(dec!(40000), dec!(500), config, &SvsOptions::default());
//!
//! assert_eq!(result.final_total, dec!(10872.40));
//! assert_eq!(result.back_payment, dec!(4872.40));
//! assert_eq!(result.savings_recommendation, dec!(406.03));
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::calculations::IncomeTaxEvaluator;
use crate::calculations::common::{clamp, max, ratio, round_half_up};
use crate::models::{InsuranceCategory, YearConfig, YearConfigError};
use crate::registry::YearConfigRegistry;

const MONTHS_PER_YEAR: u32 = 12;

/// Founding data relevant to SVS.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FounderContext {
    pub founding_year: i32,
    pub founding_month: u32,
    pub discount_eligible: bool,
}

/// Options that modify the contribution calculation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SvsOptions {
    pub founder: Option<FounderContext>,
    pub insurance_category: InsuranceCategory,
    /// Annual gross salary from employment insured under ASVG.
    pub other_employment_income: Decimal,
}

/// Outcome of one SVS calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SvsResult {
    pub profit: Decimal,
    pub insured_months: u32,
    pub contribution_base: Decimal,
    /// Minimum base for the insured months.
    pub min_base: Decimal,
    /// Maximum base for the insured months, after other employment income.
    pub max_base: Decimal,
    pub pension: Decimal,
    pub health: Decimal,
    pub provision: Decimal,
    pub accident: Decimal,
    pub final_total: Decimal,
    pub monthly: Decimal,
    pub provisional_total: Decimal,
    /// Final minus provisional contributions. Positive means a back-payment
    /// is due, negative means a credit.
    pub back_payment: Decimal,
    /// Monthly amount to set aside for the back-payment.
    pub savings_recommendation: Decimal,
    /// Income tax saved because the contributions are deductible.
    pub tax_effect: Decimal,
    /// Back-payment as a percentage of the final contributions.
    pub risk_percentage: Decimal,
    pub health_rate_applied: Decimal,
    pub founder_discount_applied: bool,
    /// Profit at or below the exemption threshold, nothing is owed.
    pub below_minimum: bool,
    /// Base was lifted to the minimum.
    pub at_minimum_base: bool,
    /// Base was capped at the maximum.
    pub capped_at_max: bool,
}

/// Calculator for annual SVS contributions.
#[derive(Debug, Clone, Copy, Default)]
pub struct SvsCalculator;

impl SvsCalculator {
    /// Calculates the final contributions for `profit` and reconciles them
    /// against the provisional monthly Vorschreibung.
    ///
    /// # Arguments
    ///
    /// * `profit` - Annual profit that forms the contribution base
    /// * `provisional_monthly` - Monthly provisional contribution already charged
    /// * `config` - Parameters of the tax year
    /// * `options` - Founding data, insurance category and other employment
    pub fn calculate(
        profit: Decimal,
        provisional_monthly: Decimal,
        config: &YearConfig,
        options: &SvsOptions,
    ) -> SvsResult {
        let rates = &config.svs;
        let insured_months = Self::insured_months(config.tax_year, options.founder.as_ref());
        let months = Decimal::from(insured_months);

        let min_base = round_half_up(rates.min_base_monthly * months);
        let full_max_base = round_half_up(rates.max_base_monthly * months);
        let max_base = max(
            full_max_base - max(options.other_employment_income, Decimal::ZERO),
            Decimal::ZERO,
        );

        let (health_rate_applied, founder_discount_applied) =
            Self::health_rate(config, options.founder.as_ref());

        let provisional_total = round_half_up(
            max(provisional_monthly, Decimal::ZERO) * Decimal::from(MONTHS_PER_YEAR),
        );

        let exempt = options.insurance_category == InsuranceCategory::NeueSelbstaendige
            && profit <= rates.exemption_threshold;

        let mut result = SvsResult {
            profit,
            insured_months,
            contribution_base: Decimal::ZERO,
            min_base,
            max_base,
            pension: Decimal::ZERO,
            health: Decimal::ZERO,
            provision: Decimal::ZERO,
            accident: Decimal::ZERO,
            final_total: Decimal::ZERO,
            monthly: Decimal::ZERO,
            provisional_total,
            back_payment: Decimal::ZERO,
            savings_recommendation: Decimal::ZERO,
            tax_effect: Decimal::ZERO,
            risk_percentage: Decimal::ZERO,
            health_rate_applied,
            founder_discount_applied,
            below_minimum: exempt,
            at_minimum_base: false,
            capped_at_max: false,
        };

        if !exempt {
            let base = Self::contribution_base(profit, min_base, max_base);
            result.at_minimum_base = profit < min_base && base == min_base;
            result.capped_at_max = profit > max_base;
            if base != profit {
                debug!(
                    profit = %profit,
                    base = %base,
                    min_base = %min_base,
                    max_base = %max_base,
                    "contribution base clamped"
                );
            }

            result.contribution_base = base;
            result.pension = round_half_up(base * rates.pension_rate);
            result.health = round_half_up(base * health_rate_applied);
            result.provision = round_half_up(base * rates.provision_rate);
            result.accident = round_half_up(rates.accident_monthly * months);
            result.final_total =
                result.pension + result.health + result.provision + result.accident;
            result.monthly =
                round_half_up(result.final_total / Decimal::from(MONTHS_PER_YEAR));
        }

        result.back_payment = result.final_total - provisional_total;
        result.savings_recommendation = Self::savings_recommendation(result.back_payment);
        result.tax_effect = Self::tax_effect(profit, result.final_total, config);
        result.risk_percentage = Self::risk_percentage(result.back_payment, result.final_total);
        result
    }

    /// Months insured in the tax year.
    ///
    /// In the founding year insurance starts with the founding month. A
    /// founding year after the tax year is treated as a full year.
    pub fn insured_months(
        tax_year: i32,
        founder: Option<&FounderContext>,
    ) -> u32 {
        let Some(founder) = founder else {
            return MONTHS_PER_YEAR;
        };
        if founder.founding_year > tax_year {
            warn!(
                founding_year = founder.founding_year,
                tax_year, "founding year lies after the tax year, assuming a full year"
            );
            return MONTHS_PER_YEAR;
        }
        if founder.founding_year == tax_year {
            MONTHS_PER_YEAR + 1 - founder.founding_month.clamp(1, MONTHS_PER_YEAR)
        } else {
            MONTHS_PER_YEAR
        }
    }

    /// Profit raised to `min_base` and capped at `max_base`. The cap wins when
    /// remaining maximum has fallen below the minimum.
    fn contribution_base(
        profit: Decimal,
        min_base: Decimal,
        max_base: Decimal,
    ) -> Decimal {
        max(profit, min_base).min(max_base)
    }

    fn health_rate(
        config: &YearConfig,
        founder: Option<&FounderContext>,
    ) -> (Decimal, bool) {
        let in_window = founder.is_some_and(|f| {
            let years_since = config.tax_year - f.founding_year;
            f.discount_eligible
                && years_since >= 0
                && years_since < config.svs.founder_discount_years
        });
        if in_window {
            (config.svs.founder_health_rate, true)
        } else {
            (config.svs.health_rate, false)
        }
    }

    fn savings_recommendation(back_payment: Decimal) -> Decimal {
        if back_payment > Decimal::ZERO {
            round_half_up(back_payment / Decimal::from(MONTHS_PER_YEAR))
        } else {
            Decimal::ZERO
        }
    }

    fn tax_effect(
        profit: Decimal,
        final_total: Decimal,
        config: &YearConfig,
    ) -> Decimal {
        let evaluator = IncomeTaxEvaluator::new(config);
        evaluator.bracket_tax(profit) - evaluator.bracket_tax(profit - final_total)
    }

    fn risk_percentage(
        back_payment: Decimal,
        final_total: Decimal,
    ) -> Decimal {
        if final_total <= Decimal::ZERO {
            return Decimal::ZERO;
        }
        let pct = ratio(back_payment, final_total) * Decimal::ONE_HUNDRED;
        round_half_up(clamp(pct, Decimal::ZERO, Decimal::ONE_HUNDRED))
    }
}

/// Looks up `tax_year` in the built-in registry and runs [`SvsCalculator`].
///
/// # Errors
///
/// Returns [`YearConfigError::UnsupportedYear`] for years without a table.
pub fn calculate_svs(
    profit: Decimal,
    provisional_monthly: Decimal,
    tax_year: i32,
    options: &SvsOptions,
) -> Result<SvsResult, YearConfigError> {
    let config = YearConfigRegistry::builtin().get(tax_year)?;
    Ok(SvsCalculator::calculate(profit, provisional_monthly, config, options))
}
