//! Concrete end-to-end scenarios.

use pretty_assertions::assert_eq;
use rust_decimal_macros::dec;

use rechner_core::calculations::{SvsOptions, TipKind};
use rechner_core::{
    AssetCategory, DepreciationMethod, Expenses, Founding, InsuranceCategory, InvestmentItem,
    RechnerInput, YearConfigRegistry, calculate_all, calculate_all_with, calculate_svs,
    calculate_tax_tips,
};

fn founded(
    year: i32,
    eligible: bool,
) -> Option<Founding> {
    Some(Founding {
        year,
        month: 1,
        insurance_category: InsuranceCategory::NeueSelbstaendige,
        founder_discount_eligible: eligible,
    })
}

// =============================================================================
// Reference profits
// =============================================================================

#[test]
fn profit_of_forty_thousand() {
    let svs = calculate_svs(dec!(40000), dec!(500), 2025, &SvsOptions::default()).unwrap();

    assert_eq!(svs.final_total, dec!(10872.40));
    assert_eq!(svs.monthly, dec!(906.03));
    assert_eq!(svs.back_payment, dec!(4872.40));
    assert_eq!(svs.savings_recommendation, dec!(406.03));
    assert_eq!(svs.tax_effect, dec!(3678.12));
    assert_eq!(svs.risk_percentage, dec!(44.81));
}

#[test]
fn profit_of_zero() {
    let svs = calculate_svs(dec!(0), dec!(0), 2025, &SvsOptions::default()).unwrap();

    assert!(svs.below_minimum);
    assert_eq!(svs.final_total, dec!(0));
    assert_eq!(svs.back_payment, dec!(0));
    assert_eq!(svs.risk_percentage, dec!(0));
}

#[test]
fn profit_above_maximum_base() {
    let svs = calculate_svs(dec!(250000), dec!(0), 2025, &SvsOptions::default()).unwrap();

    assert!(svs.capped_at_max);
    assert_eq!(svs.contribution_base, dec!(90300.00));
    assert_eq!(svs.final_total, dec!(24367.89));
}

// =============================================================================
// Founder discount
// =============================================================================

#[test]
fn founder_discount_in_founding_year() {
    let mut input = RechnerInput::new(2025);
    input.revenue = dec!(40000);
    input.founding = founded(2025, true);

    let result = calculate_all(&input).unwrap();

    assert!(result.svs.founder_discount_applied);
    assert_eq!(result.svs.health_rate_applied, dec!(0.034));
    assert_eq!(result.svs.health, dec!(1360.00));
}

#[test]
fn founder_discount_follows_the_selected_year() {
    let mut input = RechnerInput::new(2025);
    input.revenue = dec!(40000);
    input.founding = founded(2023, true);
    let registry = YearConfigRegistry::builtin();

    let third_year = calculate_all_with(&input, registry.get(2025).unwrap());
    let fourth_year = calculate_all_with(&input, registry.get(2026).unwrap());

    assert!(third_year.svs.founder_discount_applied);
    assert!(!fourth_year.svs.founder_discount_applied);
}

// =============================================================================
// Mixed income, GmbH, tips
// =============================================================================

#[test]
fn salary_reduces_contribution_ceiling_and_joins_tax_base() {
    let mut input = RechnerInput::new(2025);
    input.revenue = dec!(60000);
    input.expenses = Expenses::Total(dec!(10000));
    input.other_income.monthly_gross_salary = dec!(5000);

    let result = calculate_all(&input).unwrap();

    // 90300 - 70000 of insured salary
    assert_eq!(result.svs.max_base, dec!(20300.00));
    assert_eq!(result.svs.contribution_base, dec!(20300.00));
    assert_eq!(result.mixed_income.employment_gross, dec!(70000));
    assert_eq!(
        result.mixed_income.business_net_gain,
        result.mixed_income.combined.net - result.mixed_income.salary_only.net
    );
    assert!(result.income_tax.marginal_rate >= dec!(0.48));
}

#[test]
fn gmbh_comparison_is_reported_when_active() {
    let mut input = RechnerInput::new(2025);
    input.revenue = dec!(150000);
    input.expenses = Expenses::Total(dec!(20000));
    input.gmbh.active = true;
    input.gmbh.manager_monthly_salary = dec!(4000);

    let gmbh = calculate_all(&input).unwrap().gmbh.unwrap();

    assert_eq!(gmbh.salary, dec!(56000));
    assert_eq!(gmbh.delta, gmbh.total_net - gmbh.sole_proprietor_net);
    assert_eq!(gmbh.favorable, gmbh.delta > dec!(0));
}

#[test]
fn machinery_counts_towards_investment_allowance() {
    let mut input = RechnerInput::new(2025);
    input.revenue = dec!(120000);
    input.expenses = Expenses::Total(dec!(20000));
    input.investments.items.push(InvestmentItem::new(
        AssetCategory::Machinery,
        dec!(3500),
        DepreciationMethod::StraightLine,
    ));

    let result = calculate_all(&input).unwrap();

    assert_eq!(result.depreciation.total, dec!(500.00));
    assert_eq!(result.income_tax.allowance.investment_linked, dec!(3500));
    assert!(result.tips.recommended_investment > dec!(0));
    assert_eq!(
        result.tips.recommended_investment,
        result.income_tax.allowance.missing_investment
    );
}

#[test]
fn narrow_tip_entry_builds_business_only_context() {
    let tips = calculate_tax_tips(dec!(100000), dec!(24367.89), 2025).unwrap();

    assert_eq!(tips.recommended_investment, dec!(5542.17));
    assert!(tips.tips.iter().any(|t| t.kind == TipKind::VoluntaryPrepayment));
}
