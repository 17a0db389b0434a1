//! Tax-saving tips.
//!
//! Each tip is a [`TipRule`] in a static table: a predicate deciding whether
//! it applies, a bound giving the recommended amount, and an effect that
//! reruns the tax leg with that amount. The saving is the baseline net tax
//! minus the net tax of the rerun.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use rechner_core::calculations::{TipKind, calculate_tax_tips};
//!
//! let tips = calculate_tax_tips(dec!(80000), dec!(21000), 2025).unwrap();
//!
//! assert!(tips.tips.iter().any(|t| t.kind == TipKind::ExtraInvestment));
//! assert!(tips.total_saving > dec!(0));
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculations::common::{max, round_half_up};
use crate::calculations::pipeline::{CoreOutcome, TaxLegInput, tax_leg};
use crate::calculations::{Credits, IncomeTaxEvaluator, IncomeTaxResult};
use crate::models::{OtherIncome, YearConfig, YearConfigError};
use crate::registry::YearConfigRegistry;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TipKind {
    /// Invest enough to claim the full investment-linked profit allowance.
    ExtraInvestment,
    /// Prepay SVS contributions to deduct them in this year.
    VoluntaryPrepayment,
}

impl TipKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ExtraInvestment => "extra_investment",
            Self::VoluntaryPrepayment => "voluntary_prepayment",
        }
    }
}

/// Baseline figures the tip rules are evaluated against.
#[derive(Debug, Clone)]
pub struct TipContext<'a> {
    pub config: &'a YearConfig,
    pub leg: TaxLegInput,
    pub final_svs: Decimal,
    pub baseline: IncomeTaxResult,
}

impl<'a> TipContext<'a> {
    pub fn new(
        leg: TaxLegInput,
        final_svs: Decimal,
        config: &'a YearConfig,
    ) -> Self {
        let baseline = tax_leg(&leg, config).income_tax;
        Self {
            config,
            leg,
            final_svs,
            baseline,
        }
    }

    pub fn from_outcome(
        outcome: &CoreOutcome,
        config: &'a YearConfig,
    ) -> Self {
        Self {
            config,
            leg: outcome.leg.clone(),
            final_svs: outcome.svs.final_total,
            baseline: outcome.income_tax.clone(),
        }
    }

    /// Business alone: no credits, no investment and no other income.
    pub fn business_only(
        profit: Decimal,
        final_svs: Decimal,
        config: &'a YearConfig,
    ) -> Self {
        let leg = TaxLegInput {
            profit,
            deductible_svs: max(final_svs, Decimal::ZERO),
            qualifying_investment: Decimal::ZERO,
            flat_rate_applied: false,
            other_income: OtherIncome::default(),
            credits: Credits::none(),
        };
        Self::new(leg, max(final_svs, Decimal::ZERO), config)
    }

    fn net_tax_with(
        &self,
        leg: TaxLegInput,
    ) -> Decimal {
        tax_leg(&leg, self.config).income_tax.net_tax
    }
}

/// One entry of the tip table.
pub struct TipRule {
    pub kind: TipKind,
    pub applies: fn(&TipContext<'_>) -> bool,
    pub bound: fn(&TipContext<'_>) -> Decimal,
    /// Net tax after following the tip with the given amount.
    pub effect: fn(&TipContext<'_>, Decimal) -> Decimal,
}

pub static TIP_RULES: [TipRule; 2] = [
    TipRule {
        kind: TipKind::ExtraInvestment,
        applies: |ctx| {
            !ctx.leg.flat_rate_applied
                && ctx.baseline.allowance.base > ctx.config.allowance.basic_profit_ceiling
        },
        bound: |ctx| ctx.baseline.allowance.missing_investment,
        effect: |ctx, amount| {
            ctx.net_tax_with(TaxLegInput {
                qualifying_investment: ctx.leg.qualifying_investment + amount,
                ..ctx.leg.clone()
            })
        },
    },
    TipRule {
        kind: TipKind::VoluntaryPrepayment,
        applies: |ctx| ctx.final_svs > Decimal::ZERO && ctx.baseline.marginal_rate > Decimal::ZERO,
        bound: |ctx| {
            let taxable = ctx.baseline.taxable_income;
            let floor = IncomeTaxEvaluator::new(ctx.config).marginal_bracket_floor(taxable);
            (taxable - floor).min(ctx.config.svs.max_prepayment_multiple * ctx.final_svs)
        },
        effect: |ctx, amount| {
            ctx.net_tax_with(TaxLegInput {
                deductible_svs: ctx.leg.deductible_svs + amount,
                ..ctx.leg.clone()
            })
        },
    },
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tip {
    pub kind: TipKind,
    pub amount: Decimal,
    pub tax_saving: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TipResult {
    pub recommended_investment: Decimal,
    pub investment_saving: Decimal,
    pub recommended_prepayment: Decimal,
    pub prepayment_saving: Decimal,
    pub tips: Vec<Tip>,
    pub total_saving: Decimal,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TipGenerator;

impl TipGenerator {
    pub fn generate(ctx: &TipContext<'_>) -> TipResult {
        let mut result = TipResult::default();
        for rule in &TIP_RULES {
            if !(rule.applies)(ctx) {
                continue;
            }
            let amount = round_half_up(max((rule.bound)(ctx), Decimal::ZERO));
            if amount.is_zero() {
                continue;
            }
            let tax_saving = max(ctx.baseline.net_tax - (rule.effect)(ctx, amount), Decimal::ZERO);
            match rule.kind {
                TipKind::ExtraInvestment => {
                    result.recommended_investment = amount;
                    result.investment_saving = tax_saving;
                }
                TipKind::VoluntaryPrepayment => {
                    result.recommended_prepayment = amount;
                    result.prepayment_saving = tax_saving;
                }
            }
            result.total_saving += tax_saving;
            result.tips.push(Tip {
                kind: rule.kind,
                amount,
                tax_saving,
            });
        }
        result
    }
}

/// Tips for a business without other income, looked up by year.
///
/// # Errors
///
/// Returns [`YearConfigError::UnsupportedYear`] for years without a table.
pub fn calculate_tax_tips(
    profit: Decimal,
    final_svs: Decimal,
    tax_year: i32,
) -> Result<TipResult, YearConfigError> {
    let config = YearConfigRegistry::builtin().get(tax_year)?;
    Ok(TipGenerator::generate(&TipContext::business_only(
        profit, final_svs, config,
    )))
}
