use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculations::RechnerResult;
use crate::calculations::common::round_half_up;

/// A saved calculation. Built once from a result and never changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculationSnapshot {
    pub tax_year: i32,

    // Inputs as the engine saw them
    pub profit: Decimal,
    pub monthly_provisional: Decimal,

    // SVS outcome
    pub contribution_base: Decimal,
    pub final_svs: Decimal,
    pub provisional_svs: Decimal,
    pub back_payment: Decimal,
    pub savings_recommendation: Decimal,
    pub tax_saving: Decimal,

    pub created_at: DateTime<Utc>,
}

impl CalculationSnapshot {
    pub fn from_result(
        result: &RechnerResult,
        created_at: DateTime<Utc>,
    ) -> Self {
        let svs = &result.svs;
        Self {
            tax_year: result.tax_year,
            profit: result.profit,
            monthly_provisional: round_half_up(svs.provisional_total / Decimal::from(12)),
            contribution_base: svs.contribution_base,
            final_svs: svs.final_total,
            provisional_svs: svs.provisional_total,
            back_payment: svs.back_payment,
            savings_recommendation: svs.savings_recommendation,
            tax_saving: svs.tax_effect,
            created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::calculations::calculate_all;
    use crate::models::{Expenses, RechnerInput};

    #[test]
    fn from_result_copies_svs_figures() {
        let mut input = RechnerInput::new(2025);
        input.revenue = dec!(50000);
        input.expenses = Expenses::Total(dec!(10000));
        input.advance_payments.svs_yearly = dec!(6000);
        let result = calculate_all(&input).unwrap();
        let created_at = Utc.with_ymd_and_hms(2025, 11, 3, 9, 30, 0).unwrap();

        let snapshot = CalculationSnapshot::from_result(&result, created_at);

        assert_eq!(
            snapshot,
            CalculationSnapshot {
                tax_year: 2025,
                profit: dec!(40000),
                monthly_provisional: dec!(500.00),
                contribution_base: dec!(40000),
                final_svs: dec!(10872.40),
                provisional_svs: dec!(6000.00),
                back_payment: dec!(4872.40),
                savings_recommendation: dec!(406.03),
                tax_saving: dec!(3678.12),
                created_at,
            }
        );
    }
}
