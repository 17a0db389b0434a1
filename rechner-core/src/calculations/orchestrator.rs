//! Full calculation: every component reconciled into one [`RechnerResult`].
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use rechner_core::models::{Expenses, RechnerInput};
//! use rechner_core::calculate_all;
//!
//! let mut input = RechnerInput::new(2025);
//! input.revenue = dec!(50000);
//! input.expenses = Expenses::Total(dec!(10000));
//! input.advance_payments.svs_yearly = dec!(6000);
//!
//! let result = calculate_all(&input).unwrap();
//!
//! assert_eq!(result.profit, dec!(40000));
//! assert_eq!(result.svs.final_total, dec!(10872.40));
//! assert_eq!(result.svs.back_payment, dec!(4872.40));
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::calculations::pipeline::{Scenario, evaluate_core, evaluate_scenario};
use crate::calculations::{
    DepreciationResult, FlatRateResult, GmbhComparator, GmbhResult, IncomeTaxResult,
    MarginalProfitSimulator, MarginalResult, MixedIncomeResult, PrepaymentReconciler,
    PrepaymentResult, SvsResult, TipContext, TipGenerator, TipResult,
};
use crate::models::{RechnerInput, YearConfig, YearConfigError};
use crate::registry::YearConfigRegistry;

/// Reconciled result of one input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RechnerResult {
    pub tax_year: i32,
    pub revenue: Decimal,
    pub effective_expenses: Decimal,
    pub profit: Decimal,
    pub depreciation: DepreciationResult,
    pub flat_rate: FlatRateResult,
    pub svs: SvsResult,
    pub income_tax: IncomeTaxResult,
    pub mixed_income: MixedIncomeResult,
    pub gmbh: Option<GmbhResult>,
    pub marginal: Option<MarginalResult>,
    pub prepayment: PrepaymentResult,
    pub tips: TipResult,
}

/// Looks up the input's tax year in the built-in registry and runs
/// [`calculate_all_with`].
///
/// # Errors
///
/// Returns [`YearConfigError::UnsupportedYear`] for years without a table.
pub fn calculate_all(input: &RechnerInput) -> Result<RechnerResult, YearConfigError> {
    let config = YearConfigRegistry::builtin().get(input.tax_year)?;
    Ok(calculate_all_with(input, config))
}

/// Runs every component against `config`.
pub fn calculate_all_with(
    input: &RechnerInput,
    config: &YearConfig,
) -> RechnerResult {
    if input.tax_year != config.tax_year {
        debug!(
            input_year = input.tax_year,
            config_year = config.tax_year,
            "input year differs from configuration, using configuration"
        );
    }
    let input = input.sanitized(config.max_monetary_input);
    let primary = evaluate_core(&input, config);

    let flat_rate = if primary.flat_rate.is_applied() {
        let standard = evaluate_scenario(Scenario::StandardExpenses, &input, config);
        // The actual expenses are spent either way.
        let flat_net = primary.net_income() - primary.profit + standard.profit;
        primary
            .flat_rate
            .clone()
            .with_comparison(standard.profit, flat_net, standard.net_income())
    } else {
        primary.flat_rate.clone()
    };

    let gmbh = input.gmbh.active.then(|| {
        let business = evaluate_scenario(Scenario::BusinessOnly, &input, config);
        GmbhComparator::compare(
            business.profit,
            input.gmbh.manager_monthly_salary,
            &business.credits,
            business.net_income(),
            config,
        )
    });

    let marginal = input
        .marginal
        .is_active()
        .then(|| MarginalProfitSimulator::simulate(&input, config));

    let prepayment =
        PrepaymentReconciler::reconcile(&input.advance_payments, &primary.svs, &primary.income_tax);
    let tips = TipGenerator::generate(&TipContext::from_outcome(&primary, config));

    debug!(
        tax_year = config.tax_year,
        profit = %primary.profit,
        svs = %primary.svs.final_total,
        income_tax = %primary.income_tax.net_tax,
        "calculation complete"
    );

    RechnerResult {
        tax_year: config.tax_year,
        revenue: primary.revenue,
        effective_expenses: primary.effective_expenses,
        profit: primary.profit,
        depreciation: primary.depreciation,
        flat_rate,
        svs: primary.svs,
        income_tax: primary.income_tax,
        mixed_income: primary.mixed_income,
        gmbh,
        marginal,
        prepayment,
        tips,
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;
    use tracing::Level;

    use super::*;
    use crate::models::{Expenses, FlatRateRegime};

    fn init_test_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_max_level(Level::DEBUG)
            .with_test_writer()
            .try_init();
    }

    fn base_input() -> RechnerInput {
        let mut input = RechnerInput::new(2025);
        input.revenue = dec!(50000);
        input.expenses = Expenses::Total(dec!(10000));
        input
    }

    // =========================================================================
    // calculate_all tests
    // =========================================================================

    #[test]
    fn calculate_all_rejects_unsupported_year() {
        let input = RechnerInput::new(2010);

        assert_eq!(
            calculate_all(&input),
            Err(YearConfigError::UnsupportedYear(2010))
        );
    }

    #[test]
    fn calculate_all_skips_optional_sections() {
        let result = calculate_all(&base_input()).unwrap();

        assert_eq!(result.gmbh, None);
        assert_eq!(result.marginal, None);
        assert_eq!(result.flat_rate.standard_profit, None);
    }

    #[test]
    fn calculate_all_clamps_negative_revenue() {
        init_test_tracing();
        let mut input = base_input();
        input.revenue = dec!(-1000);
        input.expenses = Expenses::Total(dec!(0));

        let result = calculate_all(&input).unwrap();

        assert_eq!(result.revenue, dec!(0));
        assert_eq!(result.profit, dec!(0));
        assert_eq!(result.svs.final_total, dec!(0));
    }

    #[test]
    fn calculate_all_compares_flat_rate_with_actual_expenses() {
        init_test_tracing();
        let mut input = base_input();
        input.flat_rate = FlatRateRegime::Basis;

        let result = calculate_all(&input).unwrap();

        // 13.5 % of revenue is less than the actual 10000
        assert_eq!(result.profit, dec!(43250.00));
        assert_eq!(result.flat_rate.standard_profit, Some(dec!(40000)));
        assert_eq!(result.flat_rate.favorable, Some(false));
    }

    #[test]
    fn calculate_all_flat_rate_favorable_with_low_expenses() {
        let mut input = base_input();
        input.expenses = Expenses::Total(dec!(2000));
        input.flat_rate = FlatRateRegime::Basis;

        let result = calculate_all(&input).unwrap();

        assert_eq!(result.profit, dec!(43250.00));
        assert_eq!(result.flat_rate.favorable, Some(true));
        assert!(result.flat_rate.net_delta.unwrap() > dec!(0));
    }

    #[test]
    fn calculate_all_runs_gmbh_on_business_only() {
        let mut input = base_input();
        input.other_income.monthly_gross_salary = dec!(2000);
        input.gmbh.active = true;
        input.gmbh.manager_monthly_salary = dec!(1500);

        let result = calculate_all(&input).unwrap();
        let gmbh = result.gmbh.unwrap();

        assert_eq!(gmbh.profit, dec!(40000));
        assert_eq!(gmbh.salary, dec!(21000));
        assert_ne!(gmbh.sole_proprietor_net, result.income_tax.real_net_income);
    }

    #[test]
    fn calculate_all_runs_marginal_when_requested() {
        let mut input = base_input();
        input.marginal.extra_revenue = dec!(1000);

        let result = calculate_all(&input).unwrap();

        assert_eq!(result.marginal.unwrap().incremental_profit, dec!(1000));
        assert_eq!(result.profit, dec!(40000));
    }

    #[test]
    fn calculate_all_with_uses_given_configuration() {
        let config = YearConfigRegistry::builtin().get(2024).unwrap();

        let result = calculate_all_with(&base_input(), config);

        assert_eq!(result.tax_year, 2024);
        // 2024 rates: same percentages, accident 11.35 × 12
        assert_eq!(result.svs.accident, dec!(136.20));
    }
}
