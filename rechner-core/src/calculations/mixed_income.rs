//! Combination of self-employment, salaried and rental income.
//!
//! All positive and negative income streams are summed into one taxable
//! base before the bracket schedule is applied, so a business loss offsets
//! salary and rent. The resulting tax is apportioned to the streams for
//! display only.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculations::common::{max, ratio, round_half_up};
use crate::calculations::{Credits, IncomeTaxEvaluator, TaxComputation};
use crate::models::{OtherIncome, YearConfig};

/// Taxable income, tax and disposable income of one view.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomeView {
    pub taxable: Decimal,
    pub tax: Decimal,
    pub net: Decimal,
}

/// Combined income tax split by income stream in proportion to the positive
/// taxable components.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxApportionment {
    pub self_employment: Decimal,
    pub employment: Decimal,
    pub rental: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MixedIncomeResult {
    pub employment_gross: Decimal,
    pub employee_social: Decimal,
    pub employment_taxable: Decimal,
    pub rental_income: Decimal,
    pub self_employment_taxable: Decimal,
    /// Salary and rent without the business.
    pub salary_only: IncomeView,
    pub combined: IncomeView,
    pub apportioned_tax: TaxApportionment,
    /// What the business adds to disposable income.
    pub business_net_gain: Decimal,
    pub computation: TaxComputation,
}

/// Salaried income figures before tax.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Employment {
    pub gross: Decimal,
    pub social: Decimal,
    pub taxable: Decimal,
}

impl Employment {
    /// Annual gross, employee social insurance and taxable wage for a
    /// monthly gross salary. The employee allowance only applies when a
    /// salary is paid.
    pub fn from_monthly(
        monthly_gross_salary: Decimal,
        config: &YearConfig,
    ) -> Self {
        Self::from_annual(
            monthly_gross_salary * Decimal::from(config.employment.salary_payments_per_year),
            config,
        )
    }

    pub fn from_annual(
        gross: Decimal,
        config: &YearConfig,
    ) -> Self {
        let rules = &config.employment;
        let gross = max(gross, Decimal::ZERO);
        if gross.is_zero() {
            return Self::default();
        }
        let social = round_half_up(gross * rules.employee_social_rate);
        Self {
            gross,
            social,
            taxable: max(gross - social - rules.employee_allowance, Decimal::ZERO),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MixedIncomeCombinator;

impl MixedIncomeCombinator {
    /// Combines the streams into one taxable base and evaluates it once.
    ///
    /// # Arguments
    ///
    /// * `self_employed_taxable` - Profit minus deductible SVS and profit allowance, may be negative
    /// * `profit` - Business profit before SVS
    /// * `deductible_svs` - SVS paid in the year
    /// * `other` - Salary and rental income
    /// * `credits` - Credits applied to the combined tax
    pub fn combine(
        self_employed_taxable: Decimal,
        profit: Decimal,
        deductible_svs: Decimal,
        other: &OtherIncome,
        credits: &Credits,
        config: &YearConfig,
    ) -> MixedIncomeResult {
        let evaluator = IncomeTaxEvaluator::new(config);
        let employment = Employment::from_monthly(other.monthly_gross_salary, config);
        let rental = max(other.rental_income, Decimal::ZERO);
        let cash_other = employment.gross - employment.social + rental;

        let salary_only_tax = evaluator.evaluate(employment.taxable + rental, credits);
        let salary_only = IncomeView {
            taxable: salary_only_tax.taxable_income,
            tax: salary_only_tax.net_tax,
            net: cash_other - salary_only_tax.net_tax,
        };

        let computation =
            evaluator.evaluate(self_employed_taxable + employment.taxable + rental, credits);
        let combined = IncomeView {
            taxable: computation.taxable_income,
            tax: computation.net_tax,
            net: cash_other + profit - deductible_svs - computation.net_tax,
        };

        let apportioned_tax = Self::apportion(
            computation.net_tax,
            self_employed_taxable,
            employment.taxable,
            rental,
        );

        MixedIncomeResult {
            employment_gross: employment.gross,
            employee_social: employment.social,
            employment_taxable: employment.taxable,
            rental_income: rental,
            self_employment_taxable: self_employed_taxable,
            business_net_gain: combined.net - salary_only.net,
            salary_only,
            combined,
            apportioned_tax,
            computation,
        }
    }

    /// The self-employment share absorbs the rounding remainder, so the
    /// shares always add up to `tax`.
    fn apportion(
        tax: Decimal,
        self_employed: Decimal,
        employment: Decimal,
        rental: Decimal,
    ) -> TaxApportionment {
        let self_employed = max(self_employed, Decimal::ZERO);
        let total = self_employed + employment + rental;
        if total <= Decimal::ZERO || tax.is_zero() {
            return TaxApportionment::default();
        }
        let employment_share = round_half_up(tax * ratio(employment, total));
        let rental_share = round_half_up(tax * ratio(rental, total));
        TaxApportionment {
            self_employment: tax - employment_share - rental_share,
            employment: employment_share,
            rental: rental_share,
        }
    }
}
