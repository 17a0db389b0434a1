//! Statutory parameters for a single tax year.
//!
//! Every calculator reads its rates, bases, thresholds and allowances from a
//! [`YearConfig`]. The built-in tables live in [`crate::registry`]; custom
//! tables can be deserialized and checked with [`YearConfig::validate`].

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{AssetCategory, FlatRateRegime, TaxBracket};

/// Errors raised while looking up or validating a year configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum YearConfigError {
    /// No configuration exists for the requested tax year.
    #[error("tax year {0} is not supported")]
    UnsupportedYear(i32),

    /// The income tax schedule has no brackets.
    #[error("income tax schedule has no brackets")]
    NoBrackets,

    /// The first bracket must start at zero income.
    #[error("first tax bracket must start at 0, got {0}")]
    FirstBracketNotAtZero(Decimal),

    /// A bracket does not start where the previous one ended.
    #[error("tax bracket {index} starts at {actual}, expected {expected}")]
    BracketNotContiguous {
        index: usize,
        expected: Decimal,
        actual: Decimal,
    },

    /// Only the last bracket may be unbounded.
    #[error("tax bracket {0} is unbounded but is not the last bracket")]
    UnboundedBracketNotLast(usize),

    /// The last bracket must be unbounded.
    #[error("last tax bracket must be unbounded")]
    LastBracketBounded,

    /// Bracket rates must strictly increase.
    #[error("tax bracket {index} rate {rate} does not exceed the previous rate")]
    BracketRateNotIncreasing { index: usize, rate: Decimal },

    /// A rate lies outside `[0, 1]`.
    #[error("{name} must be between 0 and 1, got {value}")]
    InvalidRate { name: &'static str, value: Decimal },

    /// A monetary parameter is negative.
    #[error("{name} must be non-negative, got {value}")]
    NegativeAmount { name: &'static str, value: Decimal },

    /// The minimum contribution base exceeds the maximum.
    #[error("minimum contribution base {min} exceeds maximum {max}")]
    MinBaseExceedsMax { min: Decimal, max: Decimal },

    /// A depreciation category has no rule.
    #[error("no depreciation rule for category {0}")]
    MissingCategory(AssetCategory),

    /// A depreciation category has a useful life of zero years.
    #[error("useful life for {0} must be at least one year")]
    InvalidUsefulLife(AssetCategory),
}

/// SVS contribution parameters (GSVG / FSVG).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SvsRates {
    /// Pensionsversicherung.
    pub pension_rate: Decimal,
    /// Krankenversicherung.
    pub health_rate: Decimal,
    /// Selbständigenvorsorge.
    pub provision_rate: Decimal,
    /// Reduced health rate during the founder window.
    pub founder_health_rate: Decimal,
    /// Number of calendar years, counting the founding year, in which the
    /// founder rate applies.
    pub founder_discount_years: i32,
    /// Fixed monthly accident-insurance contribution.
    pub accident_monthly: Decimal,
    pub min_base_monthly: Decimal,
    pub max_base_monthly: Decimal,
    /// Annual Versicherungsgrenze for neue Selbständige.
    pub exemption_threshold: Decimal,
    /// Upper bound of a suggested voluntary prepayment, as a multiple of the
    /// final annual contributions.
    pub max_prepayment_multiple: Decimal,
}

/// Progressive income tax schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomeTaxTable {
    pub brackets: Vec<TaxBracket>,
    /// Income up to this amount is tax free.
    pub tax_free_threshold: Decimal,
}

/// One tier of the investment-linked profit allowance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllowanceTier {
    /// Width of the profit slice this tier covers.
    pub width: Decimal,
    pub rate: Decimal,
}

/// Gewinnfreibetrag parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfitAllowanceRules {
    /// Grundfreibetrag rate.
    pub basic_rate: Decimal,
    /// Profit up to which the basic allowance accrues. Profit above it can
    /// only earn the investment-linked allowance.
    pub basic_profit_ceiling: Decimal,
    /// Investment-linked tiers, applied in order above the basic ceiling.
    pub investment_tiers: Vec<AllowanceTier>,
    /// Maximum investment-linked allowance.
    pub investment_ceiling: Decimal,
}

impl ProfitAllowanceRules {
    /// Maximum basic allowance.
    pub fn basic_ceiling(&self) -> Decimal {
        self.basic_profit_ceiling * self.basic_rate
    }
}

/// Commuter allowance band, selected by the highest `from_km` not above the
/// commute distance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommuterBand {
    pub from_km: u32,
    /// Annual amount when public transport is feasible (kleine Pauschale).
    pub feasible_amount: Decimal,
    /// Annual amount when public transport is not feasible (große Pauschale).
    pub infeasible_amount: Decimal,
}

/// Tax credits subtracted from the computed gross tax.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditRules {
    pub family_bonus_under_18: Decimal,
    pub family_bonus_over_18: Decimal,
    /// Alleinverdienerabsetzbetrag with one child.
    pub sole_earner_base: Decimal,
    pub sole_earner_per_additional_child: Decimal,
    pub commuter_bands: Vec<CommuterBand>,
}

/// Rate and revenue ceiling of one flat-rate regime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlatRateRule {
    pub rate: Decimal,
    pub revenue_ceiling: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlatRateTable {
    pub basis: FlatRateRule,
    pub basis_reduced: FlatRateRule,
    pub kleinunternehmer: FlatRateRule,
    pub kleinunternehmer_service: FlatRateRule,
}

impl FlatRateTable {
    pub fn rule(
        &self,
        regime: FlatRateRegime,
    ) -> Option<&FlatRateRule> {
        match regime {
            FlatRateRegime::None => None,
            FlatRateRegime::Basis => Some(&self.basis),
            FlatRateRegime::BasisReduced => Some(&self.basis_reduced),
            FlatRateRegime::Kleinunternehmer => Some(&self.kleinunternehmer),
            FlatRateRegime::KleinunternehmerService => Some(&self.kleinunternehmer_service),
        }
    }
}

/// Parameters for salaried income.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmploymentRules {
    pub employee_social_rate: Decimal,
    /// Werbungskostenpauschale.
    pub employee_allowance: Decimal,
    /// Salary payments per year (Austrian 13th and 14th included).
    pub salary_payments_per_year: u32,
}

/// Simplified corporate model parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GmbhRules {
    pub employer_social_rate: Decimal,
    /// Körperschaftsteuer.
    pub corporate_tax_rate: Decimal,
    /// Kapitalertragsteuer on distributions.
    pub capital_gains_tax_rate: Decimal,
}

/// Caps and shares for itemized expense positions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseRules {
    /// Arbeitsplatzpauschale without other active income above the tax-free
    /// threshold.
    pub home_office_full: Decimal,
    /// Arbeitsplatzpauschale with such income.
    pub home_office_reduced: Decimal,
    /// Deductible share of a public transport pass.
    pub public_transport_deductible_share: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRule {
    pub category: AssetCategory,
    pub useful_life_years: u32,
    pub declining_allowed: bool,
    /// Counts as qualifying investment for the profit allowance.
    pub allowance_eligible: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepreciationRules {
    /// First-year rate for the declining-balance method.
    pub declining_balance_rate: Decimal,
    pub categories: Vec<CategoryRule>,
}

impl DepreciationRules {
    pub fn rule(
        &self,
        category: AssetCategory,
    ) -> Option<&CategoryRule> {
        self.categories.iter().find(|r| r.category == category)
    }
}

/// Complete statutory configuration for one tax year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearConfig {
    pub tax_year: i32,
    pub svs: SvsRates,
    pub income_tax: IncomeTaxTable,
    pub allowance: ProfitAllowanceRules,
    pub credits: CreditRules,
    pub flat_rates: FlatRateTable,
    pub employment: EmploymentRules,
    pub gmbh: GmbhRules,
    pub expenses: ExpenseRules,
    pub depreciation: DepreciationRules,
    /// Upper clamp for every monetary input.
    pub max_monetary_input: Decimal,
}

impl YearConfig {
    /// Annual minimum contribution base for a full year.
    pub fn min_base_annual(&self) -> Decimal {
        self.svs.min_base_monthly * Decimal::from(12)
    }

    /// Annual maximum contribution base for a full year.
    pub fn max_base_annual(&self) -> Decimal {
        self.svs.max_base_monthly * Decimal::from(12)
    }

    /// Validates all parameters.
    ///
    /// # Errors
    ///
    /// Returns the first [`YearConfigError`] found. Checks cover the shape of
    /// the bracket table, rate ranges, non-negative amounts, the min/max base
    /// ordering and the completeness of the depreciation rules.
    pub fn validate(&self) -> Result<(), YearConfigError> {
        self.validate_brackets()?;

        let rates = [
            ("pension_rate", self.svs.pension_rate),
            ("health_rate", self.svs.health_rate),
            ("provision_rate", self.svs.provision_rate),
            ("founder_health_rate", self.svs.founder_health_rate),
            ("basic_allowance_rate", self.allowance.basic_rate),
            ("employee_social_rate", self.employment.employee_social_rate),
            ("employer_social_rate", self.gmbh.employer_social_rate),
            ("corporate_tax_rate", self.gmbh.corporate_tax_rate),
            ("capital_gains_tax_rate", self.gmbh.capital_gains_tax_rate),
            (
                "public_transport_deductible_share",
                self.expenses.public_transport_deductible_share,
            ),
            (
                "declining_balance_rate",
                self.depreciation.declining_balance_rate,
            ),
            ("flat_rate.basis", self.flat_rates.basis.rate),
            ("flat_rate.basis_reduced", self.flat_rates.basis_reduced.rate),
            ("flat_rate.kleinunternehmer", self.flat_rates.kleinunternehmer.rate),
            (
                "flat_rate.kleinunternehmer_service",
                self.flat_rates.kleinunternehmer_service.rate,
            ),
        ];
        for (name, value) in rates {
            check_rate(name, value)?;
        }
        for tier in &self.allowance.investment_tiers {
            check_rate("investment_allowance_tier", tier.rate)?;
            check_amount("investment_allowance_tier_width", tier.width)?;
        }

        let amounts = [
            ("accident_monthly", self.svs.accident_monthly),
            ("min_base_monthly", self.svs.min_base_monthly),
            ("max_base_monthly", self.svs.max_base_monthly),
            ("exemption_threshold", self.svs.exemption_threshold),
            ("max_prepayment_multiple", self.svs.max_prepayment_multiple),
            ("tax_free_threshold", self.income_tax.tax_free_threshold),
            ("basic_profit_ceiling", self.allowance.basic_profit_ceiling),
            ("investment_ceiling", self.allowance.investment_ceiling),
            ("employee_allowance", self.employment.employee_allowance),
            ("home_office_full", self.expenses.home_office_full),
            ("home_office_reduced", self.expenses.home_office_reduced),
            ("max_monetary_input", self.max_monetary_input),
        ];
        for (name, value) in amounts {
            check_amount(name, value)?;
        }

        if self.svs.min_base_monthly > self.svs.max_base_monthly {
            return Err(YearConfigError::MinBaseExceedsMax {
                min: self.svs.min_base_monthly,
                max: self.svs.max_base_monthly,
            });
        }

        for category in AssetCategory::all() {
            let rule = self
                .depreciation
                .rule(*category)
                .ok_or(YearConfigError::MissingCategory(*category))?;
            if rule.useful_life_years == 0 {
                return Err(YearConfigError::InvalidUsefulLife(*category));
            }
        }

        Ok(())
    }

    fn validate_brackets(&self) -> Result<(), YearConfigError> {
        let brackets = &self.income_tax.brackets;
        let first = brackets.first().ok_or(YearConfigError::NoBrackets)?;
        if first.from != Decimal::ZERO {
            return Err(YearConfigError::FirstBracketNotAtZero(first.from));
        }

        for (index, bracket) in brackets.iter().enumerate() {
            check_rate("bracket_rate", bracket.rate)?;

            let is_last = index + 1 == brackets.len();
            match (bracket.to, is_last) {
                (None, false) => return Err(YearConfigError::UnboundedBracketNotLast(index)),
                (Some(_), true) => return Err(YearConfigError::LastBracketBounded),
                _ => {}
            }

            if index == 0 {
                continue;
            }
            let previous = &brackets[index - 1];
            let expected = previous.to.unwrap_or(Decimal::MAX);
            if bracket.from != expected {
                return Err(YearConfigError::BracketNotContiguous {
                    index,
                    expected,
                    actual: bracket.from,
                });
            }
            if bracket.rate <= previous.rate {
                return Err(YearConfigError::BracketRateNotIncreasing {
                    index,
                    rate: bracket.rate,
                });
            }
        }

        Ok(())
    }
}

fn check_rate(
    name: &'static str,
    value: Decimal,
) -> Result<(), YearConfigError> {
    if value < Decimal::ZERO || value > Decimal::ONE {
        return Err(YearConfigError::InvalidRate { name, value });
    }
    Ok(())
}

fn check_amount(
    name: &'static str,
    value: Decimal,
) -> Result<(), YearConfigError> {
    if value < Decimal::ZERO {
        return Err(YearConfigError::NegativeAmount { name, value });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::registry::YearConfigRegistry;

    fn config_2025() -> YearConfig {
        YearConfigRegistry::builtin()
            .get(2025)
            .cloned()
            .expect("2025 is built in")
    }

    // =========================================================================
    // validate tests
    // =========================================================================

    #[test]
    fn validate_accepts_builtin_config() {
        assert_eq!(config_2025().validate(), Ok(()));
    }

    #[test]
    fn validate_rejects_empty_bracket_table() {
        let mut config = config_2025();
        config.income_tax.brackets.clear();

        assert_eq!(config.validate(), Err(YearConfigError::NoBrackets));
    }

    #[test]
    fn validate_rejects_gap_between_brackets() {
        let mut config = config_2025();
        config.income_tax.brackets[1].from += dec!(1);

        let result = config.validate();

        assert!(matches!(
            result,
            Err(YearConfigError::BracketNotContiguous { index: 1, .. })
        ));
    }

    #[test]
    fn validate_rejects_first_bracket_above_zero() {
        let mut config = config_2025();
        config.income_tax.brackets[0].from = dec!(100);

        assert_eq!(
            config.validate(),
            Err(YearConfigError::FirstBracketNotAtZero(dec!(100)))
        );
    }

    #[test]
    fn validate_rejects_bounded_last_bracket() {
        let mut config = config_2025();
        if let Some(last) = config.income_tax.brackets.last_mut() {
            last.to = Some(dec!(2000000));
        }

        assert_eq!(config.validate(), Err(YearConfigError::LastBracketBounded));
    }

    #[test]
    fn validate_rejects_decreasing_bracket_rate() {
        let mut config = config_2025();
        config.income_tax.brackets[2].rate = dec!(0.10);

        assert_eq!(
            config.validate(),
            Err(YearConfigError::BracketRateNotIncreasing {
                index: 2,
                rate: dec!(0.10)
            })
        );
    }

    #[test]
    fn validate_rejects_rate_above_one() {
        let mut config = config_2025();
        config.svs.pension_rate = dec!(1.85);

        assert_eq!(
            config.validate(),
            Err(YearConfigError::InvalidRate {
                name: "pension_rate",
                value: dec!(1.85)
            })
        );
    }

    #[test]
    fn validate_rejects_min_base_above_max_base() {
        let mut config = config_2025();
        config.svs.min_base_monthly = dec!(9000);

        assert_eq!(
            config.validate(),
            Err(YearConfigError::MinBaseExceedsMax {
                min: dec!(9000),
                max: config.svs.max_base_monthly
            })
        );
    }

    #[test]
    fn validate_rejects_missing_depreciation_category() {
        let mut config = config_2025();
        config
            .depreciation
            .categories
            .retain(|r| r.category != AssetCategory::Vehicle);

        assert_eq!(
            config.validate(),
            Err(YearConfigError::MissingCategory(AssetCategory::Vehicle))
        );
    }

    #[test]
    fn validate_rejects_zero_useful_life() {
        let mut config = config_2025();
        for rule in &mut config.depreciation.categories {
            if rule.category == AssetCategory::Computer {
                rule.useful_life_years = 0;
            }
        }

        assert_eq!(
            config.validate(),
            Err(YearConfigError::InvalidUsefulLife(AssetCategory::Computer))
        );
    }

    // =========================================================================
    // derived value tests
    // =========================================================================

    #[test]
    fn annual_bases_are_twelve_months() {
        let config = config_2025();

        assert_eq!(config.min_base_annual(), config.svs.min_base_monthly * dec!(12));
        assert_eq!(config.max_base_annual(), config.svs.max_base_monthly * dec!(12));
    }

    #[test]
    fn flat_rate_table_has_no_rule_for_none() {
        let config = config_2025();

        assert!(config.flat_rates.rule(FlatRateRegime::None).is_none());
        assert!(config.flat_rates.rule(FlatRateRegime::Basis).is_some());
    }
}
