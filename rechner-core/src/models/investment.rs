use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Depreciation categories with a fixed statutory useful life.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetCategory {
    Computer,
    Software,
    OfficeFurniture,
    Machinery,
    Vehicle,
    /// Geringwertige Wirtschaftsgüter, expensed in full.
    LowValueAsset,
}

impl AssetCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Computer => "computer",
            Self::Software => "software",
            Self::OfficeFurniture => "office_furniture",
            Self::Machinery => "machinery",
            Self::Vehicle => "vehicle",
            Self::LowValueAsset => "low_value_asset",
        }
    }

    pub fn all() -> &'static [AssetCategory] {
        &[
            Self::Computer,
            Self::Software,
            Self::OfficeFurniture,
            Self::Machinery,
            Self::Vehicle,
            Self::LowValueAsset,
        ]
    }
}

impl std::fmt::Display for AssetCategory {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DepreciationMethod {
    #[default]
    StraightLine,
    DecliningBalance,
}

/// A single investment line as entered by the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvestmentItem {
    pub category: AssetCategory,
    pub amount: Decimal,
    #[serde(default)]
    pub method: DepreciationMethod,
    /// Put into service in the second half of the year (half-year rule).
    #[serde(default)]
    pub second_half_of_year: bool,
}

impl InvestmentItem {
    pub fn new(
        category: AssetCategory,
        amount: Decimal,
        method: DepreciationMethod,
    ) -> Self {
        Self {
            category,
            amount,
            method,
            second_half_of_year: false,
        }
    }
}
