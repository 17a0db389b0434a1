use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One `[from, to)` slice of the progressive income tax schedule.
///
/// `to` is `None` for the top bracket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxBracket {
    pub from: Decimal,
    pub to: Option<Decimal>,
    pub rate: Decimal,
}

impl TaxBracket {
    pub fn new(
        from: Decimal,
        to: Option<Decimal>,
        rate: Decimal,
    ) -> Self {
        Self { from, to, rate }
    }

    /// Portion of `income` that falls inside this bracket.
    pub fn taxable_slice(
        &self,
        income: Decimal,
    ) -> Decimal {
        let upper = match self.to {
            Some(to) => income.min(to),
            None => income,
        };
        (upper - self.from).max(Decimal::ZERO)
    }
}
