mod advice;
mod input;
mod investment;
mod regime;
mod snapshot;
mod tax_bracket;
mod year_config;

pub use advice::AdviceFields;
pub use input::{
    AdvancePayments, ExpenseBreakdown, Expenses, Founding, GmbhScenario, InputError, Investments,
    MarginalScenario, OptimizationInput, OtherIncome, RechnerInput,
};
pub use investment::{AssetCategory, DepreciationMethod, InvestmentItem};
pub use regime::{FlatRateRegime, InsuranceCategory};
pub use snapshot::CalculationSnapshot;
pub use tax_bracket::TaxBracket;
pub use year_config::{
    AllowanceTier, CategoryRule, CommuterBand, CreditRules, DepreciationRules, EmploymentRules,
    ExpenseRules, FlatRateRule, FlatRateTable, GmbhRules, IncomeTaxTable, ProfitAllowanceRules,
    SvsRates, YearConfig, YearConfigError,
};
