//! Calculators for SVS contributions, income tax and the comparisons built
//! on them.
//!
//! Every calculator is a total function of its inputs and a
//! [`YearConfig`](crate::models::YearConfig). The [`pipeline`] chains them,
//! and [`orchestrator`] reconciles the scenario runs into one result.

pub mod common;
pub mod depreciation;
pub mod flat_rate;
pub mod gmbh;
pub mod income_tax;
pub mod marginal;
pub mod mixed_income;
pub mod orchestrator;
pub mod pipeline;
pub mod prepayment;
pub mod svs;
pub mod tips;

pub use depreciation::{CategoryTotal, DepreciationCalculator, DepreciationLine, DepreciationResult};
pub use flat_rate::{FlatRateEvaluator, FlatRateResult};
pub use gmbh::{GmbhComparator, GmbhResult};
pub use income_tax::{Credits, IncomeTaxEvaluator, IncomeTaxResult, ProfitAllowance, TaxComputation};
pub use marginal::{MarginalPoint, MarginalProfitSimulator, MarginalResult};
pub use mixed_income::{
    Employment, IncomeView, MixedIncomeCombinator, MixedIncomeResult, TaxApportionment,
};
pub use orchestrator::{RechnerResult, calculate_all, calculate_all_with};
pub use pipeline::{CoreOutcome, Scenario, TaxLeg, TaxLegInput, evaluate_core, tax_leg};
pub use prepayment::{PrepaymentLeg, PrepaymentReconciler, PrepaymentResult, PrepaymentStatus};
pub use svs::{FounderContext, SvsCalculator, SvsOptions, SvsResult, calculate_svs};
pub use tips::{
    TIP_RULES, Tip, TipContext, TipGenerator, TipKind, TipResult, TipRule, calculate_tax_tips,
};
