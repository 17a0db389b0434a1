//! Flat-rate expense regimes (Pauschalierung).
//!
//! A regime replaces the actual expenses with a share of revenue. It is only
//! available up to the regime's revenue ceiling. Under the Basis regimes
//! personnel and material costs stay deductible on top. Depreciation is
//! covered by the flat amount under every regime.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::calculations::common::{max, round_half_up};
use crate::models::{Expenses, FlatRateRegime, YearConfig};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlatRateResult {
    pub requested: FlatRateRegime,
    /// The requested regime, or `None` when it is ineligible.
    pub applied: FlatRateRegime,
    pub eligible: bool,
    pub rate: Decimal,
    pub flat_expense: Decimal,
    /// Personnel and material costs kept under a Basis regime.
    pub additional_deductible: Decimal,
    pub profit_with_flat_rate: Decimal,
    /// Profit of the same input with actual expenses.
    pub standard_profit: Option<Decimal>,
    /// The flat rate leaves more net income than actual expenses.
    pub favorable: Option<bool>,
    /// Net income with the flat rate minus net income without it.
    pub net_delta: Option<Decimal>,
}

impl FlatRateResult {
    pub fn is_applied(&self) -> bool {
        self.applied != FlatRateRegime::None
    }

    /// Effective expenses under the applied regime.
    pub fn effective_expenses(&self) -> Decimal {
        self.flat_expense + self.additional_deductible
    }

    /// Records the comparison against the actual-expense path.
    pub fn with_comparison(
        mut self,
        standard_profit: Decimal,
        flat_net: Decimal,
        standard_net: Decimal,
    ) -> Self {
        self.standard_profit = Some(standard_profit);
        self.favorable = Some(flat_net > standard_net);
        self.net_delta = Some(flat_net - standard_net);
        self
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FlatRateEvaluator;

impl FlatRateEvaluator {
    /// `None` is always eligible; any other regime requires revenue at or
    /// below its ceiling.
    pub fn is_eligible(
        regime: FlatRateRegime,
        revenue: Decimal,
        config: &YearConfig,
    ) -> bool {
        match config.flat_rates.rule(regime) {
            None => true,
            Some(rule) => revenue <= rule.revenue_ceiling,
        }
    }

    pub fn evaluate(
        regime: FlatRateRegime,
        revenue: Decimal,
        expenses: &Expenses,
        config: &YearConfig,
    ) -> FlatRateResult {
        let revenue = max(revenue, Decimal::ZERO);
        let eligible = Self::is_eligible(regime, revenue, config);
        let rule = config.flat_rates.rule(regime).filter(|_| eligible);

        if !eligible {
            warn!(
                regime = regime.as_str(),
                revenue = %revenue,
                "flat-rate regime not available at this revenue, using actual expenses"
            );
        }

        let Some(rule) = rule else {
            return FlatRateResult {
                requested: regime,
                applied: FlatRateRegime::None,
                eligible,
                rate: Decimal::ZERO,
                flat_expense: Decimal::ZERO,
                additional_deductible: Decimal::ZERO,
                profit_with_flat_rate: Decimal::ZERO,
                standard_profit: None,
                favorable: None,
                net_delta: None,
            };
        };

        let flat_expense = round_half_up(revenue * rule.rate);
        let additional_deductible = if regime.keeps_personnel_and_materials() {
            expenses.personnel_and_materials()
        } else {
            Decimal::ZERO
        };

        FlatRateResult {
            requested: regime,
            applied: regime,
            eligible,
            rate: rule.rate,
            flat_expense,
            additional_deductible,
            profit_with_flat_rate: revenue - flat_expense - additional_deductible,
            standard_profit: None,
            favorable: None,
            net_delta: None,
        }
    }
}
