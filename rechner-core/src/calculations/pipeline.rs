//! The core pipeline shared by every scenario.
//!
//! `depreciation → flat rate → SVS → tax leg → mixed income`
//!
//! Comparisons never fork a formula. They transform the input with a
//! [`Scenario`] and run the same pipeline again.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::calculations::common::{max, ratio, round_half_up, round_rate};
use crate::calculations::mixed_income::{Employment, MixedIncomeCombinator, MixedIncomeResult};
use crate::calculations::{
    Credits, DepreciationCalculator, DepreciationResult, FlatRateEvaluator, FlatRateResult,
    FounderContext, IncomeTaxResult, ProfitAllowance, SvsCalculator, SvsOptions, SvsResult,
};
use crate::models::{
    ExpenseBreakdown, Expenses, FlatRateRegime, GmbhScenario, MarginalScenario, OtherIncome,
    RechnerInput, YearConfig,
};

const MONTHS_PER_YEAR: u32 = 12;

/// Input transforms for the comparison runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scenario {
    /// The input as entered.
    Primary,
    /// Actual expenses instead of any flat rate.
    StandardExpenses,
    /// The business alone, without salary and rent.
    BusinessOnly,
    /// The marginal increment added to revenue and expenses.
    Delta,
}

impl Scenario {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Primary => "primary",
            Self::StandardExpenses => "standard_expenses",
            Self::BusinessOnly => "business_only",
            Self::Delta => "delta",
        }
    }

    pub fn apply(
        &self,
        input: &RechnerInput,
    ) -> RechnerInput {
        let mut out = input.clone();
        match self {
            Self::Primary => {}
            Self::StandardExpenses => {
                out.flat_rate = FlatRateRegime::None;
            }
            Self::BusinessOnly => {
                out.other_income = OtherIncome::default();
                out.gmbh = GmbhScenario::default();
                out.marginal = MarginalScenario::default();
            }
            Self::Delta => {
                let extra_revenue = input.marginal.extra_revenue;
                let extra_cost = input.marginal.extra_cost;
                out.revenue += extra_revenue;
                out.expenses = match &input.expenses {
                    Expenses::Total(amount) => Expenses::Total(*amount + extra_cost),
                    Expenses::Itemized(b) => Expenses::Itemized(ExpenseBreakdown {
                        other: b.other + extra_cost,
                        ..b.clone()
                    }),
                };
                out.marginal = MarginalScenario::default();
            }
        }
        out
    }
}

/// Inputs of the tax leg, kept together so tips can rerun it with one field
/// changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaxLegInput {
    pub profit: Decimal,
    pub deductible_svs: Decimal,
    pub qualifying_investment: Decimal,
    pub flat_rate_applied: bool,
    pub other_income: OtherIncome,
    pub credits: Credits,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaxLeg {
    pub income_tax: IncomeTaxResult,
    pub mixed_income: MixedIncomeResult,
}

/// Profit allowance, combined evaluation and net income for one set of
/// tax-leg inputs.
pub fn tax_leg(
    leg: &TaxLegInput,
    config: &YearConfig,
) -> TaxLeg {
    let allowance_base = leg.profit - leg.deductible_svs;
    let allowance = ProfitAllowance::compute(
        allowance_base,
        leg.qualifying_investment,
        leg.flat_rate_applied,
        &config.allowance,
    );
    let self_employment_taxable = allowance_base - allowance.total;

    let mixed_income = MixedIncomeCombinator::combine(
        self_employment_taxable,
        leg.profit,
        leg.deductible_svs,
        &leg.other_income,
        &leg.credits,
        config,
    );
    let computation = &mixed_income.computation;

    let income_tax = IncomeTaxResult {
        profit: leg.profit,
        deductible_svs: leg.deductible_svs,
        allowance,
        self_employment_taxable,
        taxable_income: computation.taxable_income,
        gross_tax: computation.gross_tax,
        credits: leg.credits.clone(),
        credits_used: computation.credits_used,
        net_tax: computation.net_tax,
        marginal_rate: computation.marginal_rate,
        average_rate: computation.average_rate,
        below_tax_free_threshold: computation.below_tax_free_threshold,
        real_net_income: mixed_income.combined.net,
    };
    TaxLeg {
        income_tax,
        mixed_income,
    }
}

/// Everything the core pipeline derives from one input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreOutcome {
    pub revenue: Decimal,
    pub effective_expenses: Decimal,
    pub profit: Decimal,
    pub depreciation: DepreciationResult,
    pub flat_rate: FlatRateResult,
    pub svs: SvsResult,
    pub credits: Credits,
    pub leg: TaxLegInput,
    pub income_tax: IncomeTaxResult,
    pub mixed_income: MixedIncomeResult,
}

impl CoreOutcome {
    /// Disposable income after SVS and income tax.
    pub fn net_income(&self) -> Decimal {
        self.income_tax.real_net_income
    }

    /// SVS and income tax as a share of profit.
    pub fn total_burden_rate(&self) -> Decimal {
        if self.profit <= Decimal::ZERO {
            return Decimal::ZERO;
        }
        round_rate(ratio(
            self.svs.final_total + self.income_tax.net_tax,
            self.profit,
        ))
    }
}

/// Runs the core pipeline on an already sanitized input.
pub fn evaluate_core(
    input: &RechnerInput,
    config: &YearConfig,
) -> CoreOutcome {
    let revenue = input.revenue;
    let employment = Employment::from_monthly(input.other_income.monthly_gross_salary, config);

    let depreciation = DepreciationCalculator::calculate(&input.investments, config);
    let flat_rate = FlatRateEvaluator::evaluate(input.flat_rate, revenue, &input.expenses, config);

    // Depreciation is covered by the flat amount.
    let effective_expenses = if flat_rate.is_applied() {
        flat_rate.effective_expenses()
    } else {
        actual_expenses(&input.expenses, employment.taxable, config) + depreciation.total
    };
    let profit = revenue - effective_expenses;

    let options = SvsOptions {
        founder: input.founding.as_ref().map(|f| FounderContext {
            founding_year: f.year,
            founding_month: f.month,
            discount_eligible: f.founder_discount_eligible,
        }),
        insurance_category: input
            .founding
            .as_ref()
            .map(|f| f.insurance_category)
            .unwrap_or_default(),
        other_employment_income: employment.gross,
    };
    let provisional_monthly =
        input.advance_payments.svs_yearly / Decimal::from(MONTHS_PER_YEAR);
    let svs = SvsCalculator::calculate(profit, provisional_monthly, config, &options);

    let credits = Credits::compute(&input.optimization, &config.credits);
    let leg = TaxLegInput {
        profit,
        deductible_svs: svs.final_total + input.advance_payments.svs_prior_year_back_payment,
        qualifying_investment: depreciation.qualifying_investment,
        flat_rate_applied: flat_rate.is_applied(),
        other_income: input.other_income.clone(),
        credits: credits.clone(),
    };
    let TaxLeg {
        income_tax,
        mixed_income,
    } = tax_leg(&leg, config);

    debug!(
        tax_year = config.tax_year,
        profit = %profit,
        svs = %svs.final_total,
        income_tax = %income_tax.net_tax,
        net = %income_tax.real_net_income,
        "core pipeline evaluated"
    );

    CoreOutcome {
        revenue,
        effective_expenses,
        profit,
        depreciation,
        flat_rate,
        svs,
        credits,
        leg,
        income_tax,
        mixed_income,
    }
}

/// Runs `scenario` on `input` through the core pipeline.
pub fn evaluate_scenario(
    scenario: Scenario,
    input: &RechnerInput,
    config: &YearConfig,
) -> CoreOutcome {
    debug!(scenario = scenario.as_str(), "evaluating scenario");
    evaluate_core(&scenario.apply(input), config)
}

/// Actual expenses before depreciation.
///
/// The home-office amount is capped at the full flat amount, or at the
/// reduced one when taxable salary exceeds the tax-free threshold. A public
/// transport pass counts at the configured share.
pub fn actual_expenses(
    expenses: &Expenses,
    employment_taxable: Decimal,
    config: &YearConfig,
) -> Decimal {
    match expenses {
        Expenses::Total(amount) => max(*amount, Decimal::ZERO),
        Expenses::Itemized(b) => {
            let rules = &config.expenses;
            let home_office_cap =
                if employment_taxable > config.income_tax.tax_free_threshold {
                    rules.home_office_reduced
                } else {
                    rules.home_office_full
                };
            let home_office = b.home_office.min(home_office_cap);
            let transport =
                round_half_up(b.public_transport_pass * rules.public_transport_deductible_share);
            b.personnel + b.materials + b.travel + b.other + home_office + transport
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::models::{AssetCategory, DepreciationMethod, InvestmentItem};
    use crate::registry::YearConfigRegistry;

    fn config() -> &'static YearConfig {
        YearConfigRegistry::builtin().get(2025).unwrap()
    }

    fn business(
        revenue: Decimal,
        expenses: Decimal,
    ) -> RechnerInput {
        let mut input = RechnerInput::new(2025);
        input.revenue = revenue;
        input.expenses = Expenses::Total(expenses);
        input
    }

    // =========================================================================
    // Scenario tests
    // =========================================================================

    #[test]
    fn primary_scenario_is_identity() {
        let input = business(dec!(50000), dec!(10000));

        assert_eq!(Scenario::Primary.apply(&input), input);
    }

    #[test]
    fn standard_expenses_drops_flat_rate() {
        let mut input = business(dec!(50000), dec!(10000));
        input.flat_rate = FlatRateRegime::Basis;

        assert_eq!(
            Scenario::StandardExpenses.apply(&input).flat_rate,
            FlatRateRegime::None
        );
    }

    #[test]
    fn business_only_drops_other_income() {
        let mut input = business(dec!(50000), dec!(10000));
        input.other_income.monthly_gross_salary = dec!(2000);
        input.other_income.rental_income = dec!(5000);

        let out = Scenario::BusinessOnly.apply(&input);

        assert!(out.other_income.is_empty());
        assert_eq!(out.revenue, dec!(50000));
    }

    #[test]
    fn delta_adds_increment_once() {
        let mut input = business(dec!(50000), dec!(10000));
        input.marginal.extra_revenue = dec!(5000);
        input.marginal.extra_cost = dec!(1000);

        let out = Scenario::Delta.apply(&input);

        assert_eq!(out.revenue, dec!(55000));
        assert_eq!(out.expenses, Expenses::Total(dec!(11000)));
        assert!(!out.marginal.is_active());
    }

    #[test]
    fn delta_books_cost_as_other_expense() {
        let mut input = business(dec!(50000), dec!(0));
        input.expenses = Expenses::Itemized(ExpenseBreakdown {
            other: dec!(500),
            ..Default::default()
        });
        input.marginal.extra_cost = dec!(250);

        let out = Scenario::Delta.apply(&input);

        assert_eq!(out.expenses.personnel_and_materials(), dec!(0));
        assert_eq!(
            out.expenses,
            Expenses::Itemized(ExpenseBreakdown {
                other: dec!(750),
                ..Default::default()
            })
        );
    }

    // =========================================================================
    // actual_expenses tests
    // =========================================================================

    #[test]
    fn actual_expenses_caps_home_office() {
        let expenses = Expenses::Itemized(ExpenseBreakdown {
            home_office: dec!(2000),
            ..Default::default()
        });

        assert_eq!(actual_expenses(&expenses, dec!(0), config()), dec!(1200));
        assert_eq!(actual_expenses(&expenses, dec!(30000), config()), dec!(300));
    }

    #[test]
    fn actual_expenses_counts_half_of_transport_pass() {
        let expenses = Expenses::Itemized(ExpenseBreakdown {
            travel: dec!(400),
            public_transport_pass: dec!(1095),
            ..Default::default()
        });

        assert_eq!(actual_expenses(&expenses, dec!(0), config()), dec!(947.50));
    }

    // =========================================================================
    // evaluate_core tests
    // =========================================================================

    #[test]
    fn evaluate_core_business_only_profit() {
        let outcome = evaluate_core(&business(dec!(50000), dec!(10000)), config());

        assert_eq!(outcome.profit, dec!(40000));
        assert_eq!(outcome.svs.final_total, dec!(10872.40));
        // 40000 - 10872.40 - 15 % × 29127.60
        assert_eq!(outcome.income_tax.allowance.basic, dec!(4369.14));
        assert_eq!(outcome.income_tax.self_employment_taxable, dec!(24758.46));
        assert_eq!(
            outcome.net_income(),
            dec!(40000) - dec!(10872.40) - outcome.income_tax.net_tax
        );
    }

    #[test]
    fn evaluate_core_deducts_depreciation_without_flat_rate() {
        let mut input = business(dec!(50000), dec!(10000));
        input.investments.items.push(InvestmentItem::new(
            AssetCategory::Computer,
            dec!(3000),
            DepreciationMethod::StraightLine,
        ));

        let outcome = evaluate_core(&input, config());

        assert_eq!(outcome.effective_expenses, dec!(11000.00));
    }

    #[test]
    fn evaluate_core_flat_rate_replaces_expenses_and_depreciation() {
        let mut input = business(dec!(50000), dec!(30000));
        input.flat_rate = FlatRateRegime::Kleinunternehmer;
        input.investments.items.push(InvestmentItem::new(
            AssetCategory::Computer,
            dec!(3000),
            DepreciationMethod::StraightLine,
        ));

        let outcome = evaluate_core(&input, config());

        assert_eq!(outcome.effective_expenses, dec!(22500.00));
        assert_eq!(outcome.profit, dec!(27500.00));
        assert!(outcome.leg.flat_rate_applied);
    }

    #[test]
    fn evaluate_core_adds_prior_back_payment_to_deductible_svs() {
        let mut input = business(dec!(50000), dec!(10000));
        input.advance_payments.svs_prior_year_back_payment = dec!(2000);

        let outcome = evaluate_core(&input, config());

        assert_eq!(outcome.income_tax.deductible_svs, dec!(12872.40));
    }

    #[test]
    fn evaluate_core_splits_advance_svs_into_months() {
        let mut input = business(dec!(50000), dec!(10000));
        input.advance_payments.svs_yearly = dec!(1000);

        let outcome = evaluate_core(&input, config());

        assert_eq!(outcome.svs.provisional_total, dec!(1000.00));
    }

    #[test]
    fn total_burden_rate_is_zero_without_profit() {
        let outcome = evaluate_core(&business(dec!(0), dec!(0)), config());

        assert_eq!(outcome.total_burden_rate(), dec!(0));
    }
}
