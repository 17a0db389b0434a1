use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculations::common::round_half_up;
use crate::calculations::{IncomeTaxResult, SvsResult};
use crate::models::AdvancePayments;

const MONTHS_PER_YEAR: u32 = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrepaymentStatus {
    BackPayment,
    Refund,
    Balanced,
}

impl PrepaymentStatus {
    pub fn from_difference(difference: Decimal) -> Self {
        if difference > Decimal::ZERO {
            Self::BackPayment
        } else if difference < Decimal::ZERO {
            Self::Refund
        } else {
            Self::Balanced
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BackPayment => "back_payment",
            Self::Refund => "refund",
            Self::Balanced => "balanced",
        }
    }
}

/// Declared against computed amount for one liability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrepaymentLeg {
    pub declared: Decimal,
    pub computed: Decimal,
    /// Computed minus declared. Positive is owed.
    pub difference: Decimal,
    pub status: PrepaymentStatus,
}

impl PrepaymentLeg {
    fn new(
        declared: Decimal,
        computed: Decimal,
    ) -> Self {
        let difference = round_half_up(computed - declared);
        Self {
            declared,
            computed,
            difference,
            status: PrepaymentStatus::from_difference(difference),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrepaymentResult {
    pub svs: PrepaymentLeg,
    pub income_tax: PrepaymentLeg,
    pub total_difference: Decimal,
    pub status: PrepaymentStatus,
    /// Monthly amount to reserve for a positive total difference.
    pub monthly_reserve: Decimal,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PrepaymentReconciler;

impl PrepaymentReconciler {
    pub fn reconcile(
        advance: &AdvancePayments,
        svs: &SvsResult,
        income_tax: &IncomeTaxResult,
    ) -> PrepaymentResult {
        let svs = PrepaymentLeg::new(advance.svs_yearly, svs.final_total);
        let income_tax = PrepaymentLeg::new(advance.income_tax_yearly, income_tax.net_tax);
        let total_difference = svs.difference + income_tax.difference;
        let monthly_reserve = if total_difference > Decimal::ZERO {
            round_half_up(total_difference / Decimal::from(MONTHS_PER_YEAR))
        } else {
            Decimal::ZERO
        };

        PrepaymentResult {
            status: PrepaymentStatus::from_difference(total_difference),
            svs,
            income_tax,
            total_difference,
            monthly_reserve,
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::calculations::pipeline::evaluate_core;
    use crate::models::{Expenses, RechnerInput};
    use crate::registry::YearConfigRegistry;

    fn reconcile(advance: AdvancePayments) -> PrepaymentResult {
        let config = YearConfigRegistry::builtin().get(2025).unwrap();
        let mut input = RechnerInput::new(2025);
        input.revenue = dec!(50000);
        input.expenses = Expenses::Total(dec!(10000));
        let outcome = evaluate_core(&input, config);
        PrepaymentReconciler::reconcile(&advance, &outcome.svs, &outcome.income_tax)
    }

    #[test]
    fn underpaid_legs_are_back_payments() {
        let result = reconcile(AdvancePayments {
            svs_yearly: dec!(6000),
            ..Default::default()
        });

        assert_eq!(result.svs.difference, dec!(4872.40));
        assert_eq!(result.svs.status, PrepaymentStatus::BackPayment);
        assert_eq!(result.income_tax.status, PrepaymentStatus::BackPayment);
        assert_eq!(
            result.monthly_reserve,
            round_half_up(result.total_difference / dec!(12))
        );
    }

    #[test]
    fn overpaid_legs_are_refunds() {
        let result = reconcile(AdvancePayments {
            svs_yearly: dec!(12000),
            income_tax_yearly: dec!(20000),
            ..Default::default()
        });

        assert_eq!(result.svs.status, PrepaymentStatus::Refund);
        assert_eq!(result.status, PrepaymentStatus::Refund);
        assert_eq!(result.monthly_reserve, dec!(0));
    }

    #[test]
    fn exact_payment_is_balanced() {
        let result = reconcile(AdvancePayments {
            svs_yearly: dec!(10872.40),
            ..Default::default()
        });

        assert_eq!(result.svs.difference, dec!(0));
        assert_eq!(result.svs.status, PrepaymentStatus::Balanced);
    }
}
