//! Flat projection of a calculation for the advice prompt.
//!
//! Field order is fixed, since the prompt body refers to the fields in this
//! order.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculations::RechnerResult;
use crate::models::{FlatRateRegime, InsuranceCategory, RechnerInput};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdviceFields {
    pub tax_year: i32,
    pub revenue: Decimal,
    pub expenses: Decimal,
    pub profit: Decimal,
    pub flat_rate_regime: FlatRateRegime,
    pub flat_rate_applied: bool,

    pub svs_pension: Decimal,
    pub svs_health: Decimal,
    pub svs_provision: Decimal,
    pub svs_accident: Decimal,
    pub svs_total: Decimal,
    pub svs_back_payment: Decimal,

    pub taxable_income: Decimal,
    pub income_tax: Decimal,
    pub marginal_rate: Decimal,
    pub average_rate: Decimal,
    pub net_income: Decimal,

    pub basic_allowance: Decimal,
    pub investment_allowance: Decimal,
    pub missing_investment: Decimal,
    pub credits: Decimal,

    pub founding_year: Option<i32>,
    pub insurance_category: InsuranceCategory,
    pub founder_discount_applied: bool,

    pub advance_svs: Decimal,
    pub advance_income_tax: Decimal,
    pub investment_total: Decimal,

    pub recommended_investment: Decimal,
    pub recommended_prepayment: Decimal,
    pub tip_saving: Decimal,
}

impl AdviceFields {
    pub fn from_result(
        input: &RechnerInput,
        result: &RechnerResult,
    ) -> Self {
        let svs = &result.svs;
        let tax = &result.income_tax;
        Self {
            tax_year: result.tax_year,
            revenue: result.revenue,
            expenses: result.effective_expenses,
            profit: result.profit,
            flat_rate_regime: result.flat_rate.requested,
            flat_rate_applied: result.flat_rate.is_applied(),

            svs_pension: svs.pension,
            svs_health: svs.health,
            svs_provision: svs.provision,
            svs_accident: svs.accident,
            svs_total: svs.final_total,
            svs_back_payment: svs.back_payment,

            taxable_income: tax.taxable_income,
            income_tax: tax.net_tax,
            marginal_rate: tax.marginal_rate,
            average_rate: tax.average_rate,
            net_income: tax.real_net_income,

            basic_allowance: tax.allowance.basic,
            investment_allowance: tax.allowance.investment_linked,
            missing_investment: tax.allowance.missing_investment,
            credits: tax.credits_used,

            founding_year: input.founding.as_ref().map(|f| f.year),
            insurance_category: input
                .founding
                .as_ref()
                .map(|f| f.insurance_category)
                .unwrap_or_default(),
            founder_discount_applied: svs.founder_discount_applied,

            advance_svs: input.advance_payments.svs_yearly,
            advance_income_tax: input.advance_payments.income_tax_yearly,
            investment_total: input.investments.total(),

            recommended_investment: result.tips.recommended_investment,
            recommended_prepayment: result.tips.recommended_prepayment,
            tip_saving: result.tips.total_saving,
        }
    }
}
