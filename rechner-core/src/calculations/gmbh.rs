//! Sole proprietorship against a one-person GmbH.
//!
//! The GmbH pays the managing director a salary and distributes the rest of
//! its profit after corporate tax. The model leaves out incorporation costs,
//! the minimum corporate tax and loss carry-forward.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculations::common::{max, round_half_up};
use crate::calculations::mixed_income::Employment;
use crate::calculations::{Credits, IncomeTaxEvaluator};
use crate::models::YearConfig;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GmbhResult {
    pub profit: Decimal,
    pub requested_salary: Decimal,
    /// Annual salary actually paid.
    pub salary: Decimal,
    /// The requested salary exceeded what the profit can fund.
    pub salary_capped: bool,
    pub employer_social: Decimal,
    pub employee_social: Decimal,
    pub wage_tax: Decimal,
    pub net_salary: Decimal,
    pub corporate_profit: Decimal,
    pub corporate_tax: Decimal,
    pub distribution: Decimal,
    pub capital_gains_tax: Decimal,
    pub net_distribution: Decimal,
    pub total_net: Decimal,
    pub sole_proprietor_net: Decimal,
    /// GmbH total net minus sole-proprietor net.
    pub delta: Decimal,
    pub favorable: bool,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct GmbhComparator;

impl GmbhComparator {
    pub fn compare(
        profit: Decimal,
        manager_monthly_salary: Decimal,
        credits: &Credits,
        sole_proprietor_net: Decimal,
        config: &YearConfig,
    ) -> GmbhResult {
        let rules = &config.gmbh;
        let payments = Decimal::from(config.employment.salary_payments_per_year);
        let requested_salary = max(manager_monthly_salary, Decimal::ZERO) * payments;

        let fundable = (max(profit, Decimal::ZERO) / (Decimal::ONE + rules.employer_social_rate))
            .round_dp_with_strategy(2, rust_decimal::RoundingStrategy::ToZero);
        let salary_capped = requested_salary > fundable;
        let salary = requested_salary.min(fundable);

        let employer_social = round_half_up(salary * rules.employer_social_rate);
        let employment = Employment::from_annual(salary, config);
        let wage = IncomeTaxEvaluator::new(config).evaluate(employment.taxable, credits);
        let net_salary = salary - employment.social - wage.net_tax;

        let corporate_profit = max(profit - salary - employer_social, Decimal::ZERO);
        let corporate_tax = round_half_up(corporate_profit * rules.corporate_tax_rate);
        let distribution = corporate_profit - corporate_tax;
        let capital_gains_tax = round_half_up(distribution * rules.capital_gains_tax_rate);
        let net_distribution = distribution - capital_gains_tax;

        let total_net = net_salary + net_distribution;
        GmbhResult {
            profit,
            requested_salary,
            salary,
            salary_capped,
            employer_social,
            employee_social: employment.social,
            wage_tax: wage.net_tax,
            net_salary,
            corporate_profit,
            corporate_tax,
            distribution,
            capital_gains_tax,
            net_distribution,
            total_net,
            sole_proprietor_net,
            delta: total_net - sole_proprietor_net,
            favorable: total_net > sole_proprietor_net,
        }
    }
}
