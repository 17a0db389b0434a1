//! Progressive income tax with profit allowance and credits.
//!
//! # Computation order
//!
//! | Step | Description |
//! |------|-------------|
//! | 1    | Allowance base: profit minus deductible SVS contributions |
//! | 2    | Profit allowance: basic part plus investment-linked part |
//! | 3    | Taxable income: allowance base minus profit allowance |
//! | 4    | Gross tax from the bracket schedule |
//! | 5    | Credits: family bonus, sole-earner credit, commuter allowance |
//! | 6    | Net tax: gross tax minus credits, never below zero |
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use rechner_core::calculations::{Credits, IncomeTaxEvaluator};
//! use rechner_core::registry::YearConfigRegistry;
//!
//! let config = YearConfigRegistry::builtin().get(2025).unwrap();
//! let evaluator = IncomeTaxEvaluator::new(config);
//!
//! let result = evaluator.evaluate(dec!(40000), &Credits::none());
//!
//! // 8309 × 20 % + 14219 × 30 % + 4164 × 40 %
//! assert_eq!(result.gross_tax, dec!(7593.10));
//! assert_eq!(result.marginal_rate, dec!(0.40));
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculations::common::{max, ratio, round_half_up, round_rate};
use crate::models::{CreditRules, OptimizationInput, ProfitAllowanceRules, YearConfig};

/// Outcome of applying the bracket schedule and credits to one taxable income.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxComputation {
    pub taxable_income: Decimal,
    pub gross_tax: Decimal,
    /// Credits available before the zero floor.
    pub credits: Decimal,
    /// Credits that actually reduced the tax.
    pub credits_used: Decimal,
    pub net_tax: Decimal,
    pub marginal_rate: Decimal,
    pub average_rate: Decimal,
    /// Taxable income is at or below the tax-free threshold, so the gross tax
    /// is exactly zero.
    pub below_tax_free_threshold: bool,
}

/// Gewinnfreibetrag split into its two parts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfitAllowance {
    pub base: Decimal,
    pub basic: Decimal,
    /// Investment-linked allowance the profit could earn with enough
    /// qualifying investment.
    pub investment_potential: Decimal,
    pub investment_linked: Decimal,
    /// Additional qualifying investment needed to reach the potential.
    pub missing_investment: Decimal,
    pub total: Decimal,
}

impl ProfitAllowance {
    /// Computes the profit allowance for `base`.
    ///
    /// The investment-linked part is only granted above the basic ceiling and
    /// never under a flat-rate regime. It is the lesser of the tiered
    /// potential and the qualifying investment.
    pub fn compute(
        base: Decimal,
        qualifying_investment: Decimal,
        flat_rate_applied: bool,
        rules: &ProfitAllowanceRules,
    ) -> Self {
        let base = max(base, Decimal::ZERO);
        let basic = round_half_up(base.min(rules.basic_profit_ceiling) * rules.basic_rate);

        let investment_potential = if flat_rate_applied || base <= rules.basic_profit_ceiling {
            Decimal::ZERO
        } else {
            Self::tiered_potential(base - rules.basic_profit_ceiling, rules)
        };
        let investment_linked = investment_potential.min(max(qualifying_investment, Decimal::ZERO));

        Self {
            base,
            basic,
            investment_potential,
            investment_linked,
            missing_investment: investment_potential - investment_linked,
            total: basic + investment_linked,
        }
    }

    fn tiered_potential(
        excess: Decimal,
        rules: &ProfitAllowanceRules,
    ) -> Decimal {
        let mut remaining = excess;
        let mut potential = Decimal::ZERO;
        for tier in &rules.investment_tiers {
            if remaining <= Decimal::ZERO {
                break;
            }
            let slice = remaining.min(tier.width);
            potential += slice * tier.rate;
            remaining -= slice;
        }
        round_half_up(potential.min(rules.investment_ceiling))
    }
}

/// Tax credits derived from the family and commuting situation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credits {
    pub family_bonus: Decimal,
    pub sole_earner: Decimal,
    pub commuter: Decimal,
    pub total: Decimal,
}

impl Credits {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn compute(
        situation: &OptimizationInput,
        rules: &CreditRules,
    ) -> Self {
        let family_bonus = Decimal::from(situation.children_under_18)
            * rules.family_bonus_under_18
            + Decimal::from(situation.children_over_18) * rules.family_bonus_over_18;

        let children = situation.children_under_18 + situation.children_over_18;
        let sole_earner = if situation.sole_earner && children >= 1 {
            rules.sole_earner_base
                + Decimal::from(children - 1) * rules.sole_earner_per_additional_child
        } else {
            Decimal::ZERO
        };

        let commuter = rules
            .commuter_bands
            .iter()
            .filter(|band| band.from_km <= situation.commuter_distance_km)
            .max_by_key(|band| band.from_km)
            .map(|band| {
                if situation.public_transport_feasible {
                    band.feasible_amount
                } else {
                    band.infeasible_amount
                }
            })
            .unwrap_or(Decimal::ZERO);

        let family_bonus = round_half_up(family_bonus);
        let sole_earner = round_half_up(sole_earner);
        let commuter = round_half_up(commuter);
        Self {
            family_bonus,
            sole_earner,
            commuter,
            total: family_bonus + sole_earner + commuter,
        }
    }
}

/// Bracket-based income tax evaluator for one year.
#[derive(Debug, Clone, Copy)]
pub struct IncomeTaxEvaluator<'a> {
    config: &'a YearConfig,
}

impl<'a> IncomeTaxEvaluator<'a> {
    pub fn new(config: &'a YearConfig) -> Self {
        Self { config }
    }

    /// Gross tax on `income` from the bracket schedule, before credits.
    ///
    /// Each bracket contributes `max(0, min(income, to) - from) × rate`.
    /// Income at or below the tax-free threshold yields exactly zero.
    pub fn bracket_tax(
        &self,
        income: Decimal,
    ) -> Decimal {
        if income <= self.config.income_tax.tax_free_threshold {
            return Decimal::ZERO;
        }
        let tax: Decimal = self
            .config
            .income_tax
            .brackets
            .iter()
            .map(|bracket| bracket.taxable_slice(income) * bracket.rate)
            .sum();
        round_half_up(tax)
    }

    /// Rate of the highest bracket whose lower bound lies below `income`.
    pub fn marginal_rate(
        &self,
        income: Decimal,
    ) -> Decimal {
        self.config
            .income_tax
            .brackets
            .iter()
            .rev()
            .find(|bracket| bracket.from < income)
            .map(|bracket| bracket.rate)
            .unwrap_or(Decimal::ZERO)
    }

    /// Lower bound of the bracket that sets the marginal rate for `income`.
    pub fn marginal_bracket_floor(
        &self,
        income: Decimal,
    ) -> Decimal {
        self.config
            .income_tax
            .brackets
            .iter()
            .rev()
            .find(|bracket| bracket.from < income)
            .map(|bracket| bracket.from)
            .unwrap_or(Decimal::ZERO)
    }

    /// Applies the schedule and `credits` to `taxable_income`.
    pub fn evaluate(
        &self,
        taxable_income: Decimal,
        credits: &Credits,
    ) -> TaxComputation {
        let taxable_income = round_half_up(max(taxable_income, Decimal::ZERO));
        let below_tax_free_threshold =
            taxable_income <= self.config.income_tax.tax_free_threshold;
        let gross_tax = self.bracket_tax(taxable_income);

        let credits_used = credits.total.min(gross_tax);
        let net_tax = gross_tax - credits_used;

        let average_rate = if taxable_income > Decimal::ZERO {
            round_rate(ratio(net_tax, taxable_income))
        } else {
            Decimal::ZERO
        };

        TaxComputation {
            taxable_income,
            gross_tax,
            credits: credits.total,
            credits_used,
            net_tax,
            marginal_rate: self.marginal_rate(taxable_income),
            average_rate,
            below_tax_free_threshold,
        }
    }
}

/// Income tax sub-result of a full calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomeTaxResult {
    pub profit: Decimal,
    /// Final SVS plus prior-year back-payment.
    pub deductible_svs: Decimal,
    pub allowance: ProfitAllowance,
    /// Self-employment share of the taxable income.
    pub self_employment_taxable: Decimal,
    /// Combined taxable income of all income streams.
    pub taxable_income: Decimal,
    pub gross_tax: Decimal,
    pub credits: Credits,
    pub credits_used: Decimal,
    pub net_tax: Decimal,
    pub marginal_rate: Decimal,
    pub average_rate: Decimal,
    pub below_tax_free_threshold: bool,
    /// Disposable income after SVS and income tax, all streams included.
    pub real_net_income: Decimal,
}
