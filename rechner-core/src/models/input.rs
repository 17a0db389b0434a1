//! The year-scoped calculation input.
//!
//! A [`RechnerInput`] is rebuilt on every edit and handed to the engine as a
//! whole. [`RechnerInput::validate`] is the boundary check callers run on
//! user-supplied values; [`RechnerInput::sanitized`] is the clamp the engine
//! applies before computing.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::models::{FlatRateRegime, InsuranceCategory, InvestmentItem};

/// Errors found while checking user input at the boundary.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InputError {
    /// A monetary field holds a negative amount.
    #[error("{field} must not be negative, got {value}")]
    NegativeAmount { field: String, value: Decimal },

    /// The founding month is outside 1..=12.
    #[error("founding month must be between 1 and 12, got {0}")]
    InvalidFoundingMonth(u32),
}

/// Business founding data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Founding {
    pub year: i32,
    #[serde(default = "default_founding_month")]
    pub month: u32,
    #[serde(default)]
    pub insurance_category: InsuranceCategory,
    /// Whether the founder health rate may be claimed at all.
    #[serde(default)]
    pub founder_discount_eligible: bool,
}

fn default_founding_month() -> u32 {
    1
}

/// Itemized annual business expenses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExpenseBreakdown {
    pub personnel: Decimal,
    pub materials: Decimal,
    pub travel: Decimal,
    /// Claimed home-office flat amount, capped by the year's rules.
    pub home_office: Decimal,
    /// Cost of a public transport pass, deductible at the configured share.
    pub public_transport_pass: Decimal,
    pub other: Decimal,
}

/// Expenses as a single figure or as a breakdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Expenses {
    Total(Decimal),
    Itemized(ExpenseBreakdown),
}

impl Default for Expenses {
    fn default() -> Self {
        Self::Total(Decimal::ZERO)
    }
}

impl Expenses {
    /// Personnel plus material costs, the positions a Basis flat rate keeps.
    pub fn personnel_and_materials(&self) -> Decimal {
        match self {
            Self::Total(_) => Decimal::ZERO,
            Self::Itemized(b) => b.personnel + b.materials,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Investments {
    pub items: Vec<InvestmentItem>,
    /// Securities bought to cover the investment-linked profit allowance.
    pub qualifying_securities: Decimal,
}

impl Investments {
    pub fn total(&self) -> Decimal {
        self.items.iter().map(|i| i.amount).sum::<Decimal>() + self.qualifying_securities
    }
}

/// Declared advance payments for the tax year.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdvancePayments {
    /// SVS Vorschreibung for the year.
    pub svs_yearly: Decimal,
    /// SVS back-payment for the previous year paid during this year.
    pub svs_prior_year_back_payment: Decimal,
    /// Income tax prepayments for the year.
    pub income_tax_yearly: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OtherIncome {
    pub monthly_gross_salary: Decimal,
    /// Annual rental surplus.
    pub rental_income: Decimal,
}

impl OtherIncome {
    pub fn is_empty(&self) -> bool {
        self.monthly_gross_salary.is_zero() && self.rental_income.is_zero()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GmbhScenario {
    pub active: bool,
    pub manager_monthly_salary: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarginalScenario {
    pub extra_revenue: Decimal,
    pub extra_cost: Decimal,
}

impl MarginalScenario {
    pub fn is_active(&self) -> bool {
        !self.extra_revenue.is_zero() || !self.extra_cost.is_zero()
    }
}

/// Family and commuting situation used for credits.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizationInput {
    pub children_under_18: u32,
    pub children_over_18: u32,
    pub sole_earner: bool,
    pub commuter_distance_km: u32,
    pub public_transport_feasible: bool,
}

/// Complete input snapshot for one tax year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RechnerInput {
    pub tax_year: i32,
    #[serde(default)]
    pub founding: Option<Founding>,
    #[serde(default)]
    pub revenue: Decimal,
    #[serde(default)]
    pub expenses: Expenses,
    #[serde(default)]
    pub investments: Investments,
    #[serde(default)]
    pub flat_rate: FlatRateRegime,
    #[serde(default)]
    pub advance_payments: AdvancePayments,
    #[serde(default)]
    pub other_income: OtherIncome,
    #[serde(default)]
    pub gmbh: GmbhScenario,
    #[serde(default)]
    pub marginal: MarginalScenario,
    #[serde(default)]
    pub optimization: OptimizationInput,
}

impl RechnerInput {
    /// An empty input for `tax_year`.
    pub fn new(tax_year: i32) -> Self {
        Self {
            tax_year,
            founding: None,
            revenue: Decimal::ZERO,
            expenses: Expenses::default(),
            investments: Investments::default(),
            flat_rate: FlatRateRegime::None,
            advance_payments: AdvancePayments::default(),
            other_income: OtherIncome::default(),
            gmbh: GmbhScenario::default(),
            marginal: MarginalScenario::default(),
            optimization: OptimizationInput::default(),
        }
    }

    /// Checks the input at the boundary.
    ///
    /// # Errors
    ///
    /// Returns [`InputError`] for the first negative monetary field or an
    /// out-of-range founding month.
    pub fn validate(&self) -> Result<(), InputError> {
        if let Some(founding) = &self.founding {
            if !(1..=12).contains(&founding.month) {
                return Err(InputError::InvalidFoundingMonth(founding.month));
            }
        }
        for (field, value) in self.monetary_fields() {
            if value < Decimal::ZERO {
                return Err(InputError::NegativeAmount { field, value });
            }
        }
        Ok(())
    }

    /// Returns a copy with every monetary field clamped to `[0, max]` and
    /// the founding month clamped to `1..=12`.
    pub fn sanitized(
        &self,
        max: Decimal,
    ) -> Self {
        let clamp = |field: &str, value: Decimal| {
            if value < Decimal::ZERO {
                warn!(field, value = %value, "negative input clamped to zero");
                Decimal::ZERO
            } else {
                value.min(max)
            }
        };

        let mut out = self.clone();
        out.revenue = clamp("revenue", out.revenue);
        out.expenses = match &out.expenses {
            Expenses::Total(amount) => Expenses::Total(clamp("expenses", *amount)),
            Expenses::Itemized(b) => Expenses::Itemized(ExpenseBreakdown {
                personnel: clamp("expenses.personnel", b.personnel),
                materials: clamp("expenses.materials", b.materials),
                travel: clamp("expenses.travel", b.travel),
                home_office: clamp("expenses.home_office", b.home_office),
                public_transport_pass: clamp(
                    "expenses.public_transport_pass",
                    b.public_transport_pass,
                ),
                other: clamp("expenses.other", b.other),
            }),
        };
        for item in &mut out.investments.items {
            item.amount = clamp("investments.amount", item.amount);
        }
        out.investments.qualifying_securities = clamp(
            "investments.qualifying_securities",
            out.investments.qualifying_securities,
        );

        let advance = &mut out.advance_payments;
        advance.svs_yearly = clamp("advance_payments.svs_yearly", advance.svs_yearly);
        advance.svs_prior_year_back_payment = clamp(
            "advance_payments.svs_prior_year_back_payment",
            advance.svs_prior_year_back_payment,
        );
        advance.income_tax_yearly = clamp(
            "advance_payments.income_tax_yearly",
            advance.income_tax_yearly,
        );

        out.other_income.monthly_gross_salary = clamp(
            "other_income.monthly_gross_salary",
            out.other_income.monthly_gross_salary,
        );
        out.other_income.rental_income =
            clamp("other_income.rental_income", out.other_income.rental_income);
        out.gmbh.manager_monthly_salary =
            clamp("gmbh.manager_monthly_salary", out.gmbh.manager_monthly_salary);
        out.marginal.extra_revenue = clamp("marginal.extra_revenue", out.marginal.extra_revenue);
        out.marginal.extra_cost = clamp("marginal.extra_cost", out.marginal.extra_cost);

        if let Some(founding) = &mut out.founding {
            founding.month = founding.month.clamp(1, 12);
        }
        out
    }

    fn monetary_fields(&self) -> Vec<(String, Decimal)> {
        let mut fields = vec![("revenue".to_string(), self.revenue)];
        match &self.expenses {
            Expenses::Total(amount) => fields.push(("expenses".to_string(), *amount)),
            Expenses::Itemized(b) => fields.extend([
                ("expenses.personnel".to_string(), b.personnel),
                ("expenses.materials".to_string(), b.materials),
                ("expenses.travel".to_string(), b.travel),
                ("expenses.home_office".to_string(), b.home_office),
                (
                    "expenses.public_transport_pass".to_string(),
                    b.public_transport_pass,
                ),
                ("expenses.other".to_string(), b.other),
            ]),
        }
        for (index, item) in self.investments.items.iter().enumerate() {
            fields.push((format!("investments.items[{index}].amount"), item.amount));
        }
        fields.extend([
            (
                "investments.qualifying_securities".to_string(),
                self.investments.qualifying_securities,
            ),
            (
                "advance_payments.svs_yearly".to_string(),
                self.advance_payments.svs_yearly,
            ),
            (
                "advance_payments.svs_prior_year_back_payment".to_string(),
                self.advance_payments.svs_prior_year_back_payment,
            ),
            (
                "advance_payments.income_tax_yearly".to_string(),
                self.advance_payments.income_tax_yearly,
            ),
            (
                "other_income.monthly_gross_salary".to_string(),
                self.other_income.monthly_gross_salary,
            ),
            (
                "other_income.rental_income".to_string(),
                self.other_income.rental_income,
            ),
            (
                "gmbh.manager_monthly_salary".to_string(),
                self.gmbh.manager_monthly_salary,
            ),
            (
                "marginal.extra_revenue".to_string(),
                self.marginal.extra_revenue,
            ),
            ("marginal.extra_cost".to_string(), self.marginal.extra_cost),
        ]);
        fields
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::models::{AssetCategory, DepreciationMethod};

    fn sample_input() -> RechnerInput {
        let mut input = RechnerInput::new(2025);
        input.revenue = dec!(60000);
        input.expenses = Expenses::Itemized(ExpenseBreakdown {
            personnel: dec!(5000),
            materials: dec!(2000),
            ..Default::default()
        });
        input
    }

    // =========================================================================
    // validate tests
    // =========================================================================

    #[test]
    fn validate_accepts_non_negative_input() {
        assert_eq!(sample_input().validate(), Ok(()));
    }

    #[test]
    fn validate_rejects_negative_revenue() {
        let mut input = sample_input();
        input.revenue = dec!(-1);

        assert_eq!(
            input.validate(),
            Err(InputError::NegativeAmount {
                field: "revenue".to_string(),
                value: dec!(-1)
            })
        );
    }

    #[test]
    fn validate_names_the_negative_investment_line() {
        let mut input = sample_input();
        input.investments.items.push(InvestmentItem::new(
            AssetCategory::Computer,
            dec!(-500),
            DepreciationMethod::StraightLine,
        ));

        assert_eq!(
            input.validate(),
            Err(InputError::NegativeAmount {
                field: "investments.items[0].amount".to_string(),
                value: dec!(-500)
            })
        );
    }

    #[test]
    fn validate_rejects_founding_month_thirteen() {
        let mut input = sample_input();
        input.founding = Some(Founding {
            year: 2025,
            month: 13,
            insurance_category: InsuranceCategory::NeueSelbstaendige,
            founder_discount_eligible: false,
        });

        assert_eq!(input.validate(), Err(InputError::InvalidFoundingMonth(13)));
    }

    // =========================================================================
    // sanitized tests
    // =========================================================================

    #[test]
    fn sanitized_clamps_negative_values_to_zero() {
        let mut input = sample_input();
        input.revenue = dec!(-100);
        input.other_income.rental_income = dec!(-5);

        let clean = input.sanitized(dec!(1000000));

        assert_eq!(clean.revenue, dec!(0));
        assert_eq!(clean.other_income.rental_income, dec!(0));
    }

    #[test]
    fn sanitized_caps_values_at_maximum() {
        let mut input = sample_input();
        input.revenue = dec!(5000000);

        let clean = input.sanitized(dec!(1000000));

        assert_eq!(clean.revenue, dec!(1000000));
    }

    #[test]
    fn sanitized_leaves_valid_input_unchanged() {
        let input = sample_input();

        assert_eq!(input.sanitized(dec!(1000000)), input);
    }

    #[test]
    fn personnel_and_materials_is_zero_for_total_expenses() {
        assert_eq!(Expenses::Total(dec!(9000)).personnel_and_materials(), dec!(0));
        assert_eq!(sample_input().expenses.personnel_and_materials(), dec!(7000));
    }
}
