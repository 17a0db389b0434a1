//! What an additional piece of revenue or cost does to net income.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculations::common::{ratio, round_rate};
use crate::calculations::pipeline::{CoreOutcome, Scenario, evaluate_core, evaluate_scenario};
use crate::models::{RechnerInput, YearConfig};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarginalPoint {
    pub profit: Decimal,
    pub svs: Decimal,
    pub income_tax: Decimal,
    pub net_income: Decimal,
}

impl From<&CoreOutcome> for MarginalPoint {
    fn from(outcome: &CoreOutcome) -> Self {
        Self {
            profit: outcome.profit,
            svs: outcome.svs.final_total,
            income_tax: outcome.income_tax.net_tax,
            net_income: outcome.net_income(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarginalResult {
    pub extra_revenue: Decimal,
    pub extra_cost: Decimal,
    pub base: MarginalPoint,
    pub with_increment: MarginalPoint,
    pub incremental_profit: Decimal,
    pub incremental_svs: Decimal,
    pub incremental_tax: Decimal,
    pub incremental_net: Decimal,
    /// Share of the extra revenue that ends up as net income.
    pub keep_rate: Decimal,
    /// Share of the extra profit taken by SVS and income tax.
    pub burden_rate: Decimal,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MarginalProfitSimulator;

impl MarginalProfitSimulator {
    pub fn simulate(
        input: &RechnerInput,
        config: &YearConfig,
    ) -> MarginalResult {
        let input = input.sanitized(config.max_monetary_input);
        let base = MarginalPoint::from(&evaluate_core(&input, config));
        let with_increment = MarginalPoint::from(&evaluate_scenario(Scenario::Delta, &input, config));

        let extra_revenue = input.marginal.extra_revenue;
        let incremental_profit = with_increment.profit - base.profit;
        let incremental_svs = with_increment.svs - base.svs;
        let incremental_tax = with_increment.income_tax - base.income_tax;
        let incremental_net = with_increment.net_income - base.net_income;

        let keep_rate = round_rate(ratio(incremental_net, extra_revenue));
        let burden_rate = if incremental_profit > Decimal::ZERO {
            round_rate(ratio(incremental_svs + incremental_tax, incremental_profit))
        } else {
            Decimal::ZERO
        };

        MarginalResult {
            extra_revenue,
            extra_cost: input.marginal.extra_cost,
            base,
            with_increment,
            incremental_profit,
            incremental_svs,
            incremental_tax,
            incremental_net,
            keep_rate,
            burden_rate,
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::models::Expenses;
    use crate::registry::YearConfigRegistry;

    fn config() -> &'static YearConfig {
        YearConfigRegistry::builtin().get(2025).unwrap()
    }

    fn input(
        extra_revenue: Decimal,
        extra_cost: Decimal,
    ) -> RechnerInput {
        let mut input = RechnerInput::new(2025);
        input.revenue = dec!(50000);
        input.expenses = Expenses::Total(dec!(10000));
        input.marginal.extra_revenue = extra_revenue;
        input.marginal.extra_cost = extra_cost;
        input
    }

    // =========================================================================
    // simulate tests
    // =========================================================================

    #[test]
    fn simulate_reports_increment_consistently() {
        let result = MarginalProfitSimulator::simulate(&input(dec!(10000), dec!(0)), config());

        assert_eq!(result.base.profit, dec!(40000));
        assert_eq!(result.with_increment.profit, dec!(50000));
        assert_eq!(result.incremental_profit, dec!(10000));
        // PV + KV + SV on 10000
        assert_eq!(result.incremental_svs, dec!(2683.00));
        assert_eq!(
            result.incremental_net,
            dec!(10000) - result.incremental_svs - result.incremental_tax
        );
        assert!(result.keep_rate > dec!(0) && result.keep_rate < dec!(1));
        assert!(result.burden_rate > dec!(0) && result.burden_rate < dec!(1));
    }

    #[test]
    fn simulate_without_increment_is_flat() {
        let result = MarginalProfitSimulator::simulate(&input(dec!(0), dec!(0)), config());

        assert_eq!(result.base, result.with_increment);
        assert_eq!(result.keep_rate, dec!(0));
        assert_eq!(result.burden_rate, dec!(0));
    }

    #[test]
    fn simulate_extra_cost_alone_reduces_profit() {
        let result = MarginalProfitSimulator::simulate(&input(dec!(0), dec!(5000)), config());

        assert_eq!(result.incremental_profit, dec!(-5000));
        assert!(result.incremental_net < dec!(0));
        assert_eq!(result.burden_rate, dec!(0));
        assert_eq!(result.keep_rate, dec!(0));
    }
}
