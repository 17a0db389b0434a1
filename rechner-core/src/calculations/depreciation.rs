//! Depreciation (AfA) of the year's investments.
//!
//! Straight-line spreads the amount over the category's useful life.
//! Declining-balance takes the configured first-year rate, but only for
//! categories that allow it. Low-value assets have a useful life of one year
//! and are expensed in full. An asset put into service in the second half of
//! the year gets half the first-year amount.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::calculations::common::{max, round_half_up};
use crate::models::{AssetCategory, DepreciationMethod, Investments, YearConfig};

/// First-year allowance for one investment line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepreciationLine {
    pub category: AssetCategory,
    pub amount: Decimal,
    pub method_requested: DepreciationMethod,
    pub method_applied: DepreciationMethod,
    pub useful_life_years: u32,
    pub half_year_rule: bool,
    pub annual_allowance: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryTotal {
    pub category: AssetCategory,
    pub total: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepreciationResult {
    pub lines: Vec<DepreciationLine>,
    /// Totals per category in category order, only for categories present.
    pub category_totals: Vec<CategoryTotal>,
    pub total: Decimal,
    /// Investment that counts towards the investment-linked profit allowance:
    /// eligible asset categories plus qualifying securities.
    pub qualifying_investment: Decimal,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DepreciationCalculator;

impl DepreciationCalculator {
    pub fn calculate(
        investments: &Investments,
        config: &YearConfig,
    ) -> DepreciationResult {
        let lines: Vec<DepreciationLine> = investments
            .items
            .iter()
            .map(|item| {
                Self::line(
                    item.category,
                    max(item.amount, Decimal::ZERO),
                    item.method,
                    item.second_half_of_year,
                    config,
                )
            })
            .collect();

        let category_totals = AssetCategory::all()
            .iter()
            .filter_map(|category| {
                let mut present = false;
                let mut total = Decimal::ZERO;
                for line in lines.iter().filter(|l| l.category == *category) {
                    present = true;
                    total += line.annual_allowance;
                }
                present.then_some(CategoryTotal {
                    category: *category,
                    total,
                })
            })
            .collect();

        let eligible_items: Decimal = lines
            .iter()
            .filter(|line| {
                config
                    .depreciation
                    .rule(line.category)
                    .is_some_and(|rule| rule.allowance_eligible)
            })
            .map(|line| line.amount)
            .sum();

        DepreciationResult {
            total: lines.iter().map(|l| l.annual_allowance).sum(),
            qualifying_investment: eligible_items
                + max(investments.qualifying_securities, Decimal::ZERO),
            lines,
            category_totals,
        }
    }

    fn line(
        category: AssetCategory,
        amount: Decimal,
        method_requested: DepreciationMethod,
        second_half_of_year: bool,
        config: &YearConfig,
    ) -> DepreciationLine {
        let rules = &config.depreciation;
        let (useful_life_years, declining_allowed) = match rules.rule(category) {
            Some(rule) => (rule.useful_life_years.max(1), rule.declining_allowed),
            None => {
                warn!(%category, "no depreciation rule, expensing in full");
                (1, false)
            }
        };

        let method_applied = match method_requested {
            DepreciationMethod::DecliningBalance if !declining_allowed => {
                warn!(
                    %category,
                    "declining-balance not allowed for category, using straight-line"
                );
                DepreciationMethod::StraightLine
            }
            method => method,
        };

        let full_year = if useful_life_years == 1 {
            amount
        } else {
            match method_applied {
                DepreciationMethod::StraightLine => amount / Decimal::from(useful_life_years),
                DepreciationMethod::DecliningBalance => amount * rules.declining_balance_rate,
            }
        };

        // Expensed-in-full assets are not prorated.
        let half_year_rule = second_half_of_year && useful_life_years > 1;
        let annual_allowance = if half_year_rule {
            round_half_up(full_year / Decimal::TWO)
        } else {
            round_half_up(full_year)
        };

        DepreciationLine {
            category,
            amount,
            method_requested,
            method_applied,
            useful_life_years,
            half_year_rule,
            annual_allowance,
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::models::InvestmentItem;
    use crate::registry::YearConfigRegistry;

    fn config() -> &'static YearConfig {
        YearConfigRegistry::builtin().get(2025).unwrap()
    }

    fn investments(items: Vec<InvestmentItem>) -> Investments {
        Investments {
            items,
            qualifying_securities: Decimal::ZERO,
        }
    }

    // =========================================================================
    // Method tests
    // =========================================================================

    #[test]
    fn straight_line_divides_by_useful_life() {
        let input = investments(vec![InvestmentItem::new(
            AssetCategory::Computer,
            dec!(3000),
            DepreciationMethod::StraightLine,
        )]);

        let result = DepreciationCalculator::calculate(&input, config());

        assert_eq!(result.total, dec!(1000.00));
        assert_eq!(result.lines[0].useful_life_years, 3);
    }

    #[test]
    fn declining_balance_applies_first_year_rate() {
        let input = investments(vec![InvestmentItem::new(
            AssetCategory::Machinery,
            dec!(10000),
            DepreciationMethod::DecliningBalance,
        )]);

        let result = DepreciationCalculator::calculate(&input, config());

        assert_eq!(result.total, dec!(3000.00));
        assert_eq!(
            result.lines[0].method_applied,
            DepreciationMethod::DecliningBalance
        );
    }

    #[test]
    fn declining_balance_falls_back_for_vehicles() {
        let input = investments(vec![InvestmentItem::new(
            AssetCategory::Vehicle,
            dec!(40000),
            DepreciationMethod::DecliningBalance,
        )]);

        let result = DepreciationCalculator::calculate(&input, config());

        assert_eq!(result.lines[0].method_applied, DepreciationMethod::StraightLine);
        assert_eq!(result.total, dec!(5000.00));
    }

    #[test]
    fn low_value_asset_is_expensed_in_full() {
        let mut item = InvestmentItem::new(
            AssetCategory::LowValueAsset,
            dec!(900),
            DepreciationMethod::StraightLine,
        );
        item.second_half_of_year = true;

        let result = DepreciationCalculator::calculate(&investments(vec![item]), config());

        assert_eq!(result.total, dec!(900.00));
        assert!(!result.lines[0].half_year_rule);
    }

    #[test]
    fn half_year_rule_halves_first_year_amount() {
        let mut item = InvestmentItem::new(
            AssetCategory::OfficeFurniture,
            dec!(5000),
            DepreciationMethod::StraightLine,
        );
        item.second_half_of_year = true;

        let result = DepreciationCalculator::calculate(&investments(vec![item]), config());

        assert_eq!(result.total, dec!(250.00));
    }

    #[test]
    fn straight_line_rounds_each_line() {
        let input = investments(vec![InvestmentItem::new(
            AssetCategory::Machinery,
            dec!(1000),
            DepreciationMethod::StraightLine,
        )]);

        let result = DepreciationCalculator::calculate(&input, config());

        assert_eq!(result.total, dec!(142.86));
    }

    // =========================================================================
    // Aggregation tests
    // =========================================================================

    #[test]
    fn no_investments_yield_zero() {
        let result = DepreciationCalculator::calculate(&Investments::default(), config());

        assert_eq!(result.total, dec!(0));
        assert_eq!(result.qualifying_investment, dec!(0));
        assert!(result.category_totals.is_empty());
    }

    #[test]
    fn category_totals_group_lines() {
        let input = investments(vec![
            InvestmentItem::new(
                AssetCategory::Computer,
                dec!(1500),
                DepreciationMethod::StraightLine,
            ),
            InvestmentItem::new(
                AssetCategory::Computer,
                dec!(3000),
                DepreciationMethod::StraightLine,
            ),
            InvestmentItem::new(
                AssetCategory::Software,
                dec!(600),
                DepreciationMethod::StraightLine,
            ),
        ]);

        let result = DepreciationCalculator::calculate(&input, config());

        assert_eq!(
            result.category_totals,
            vec![
                CategoryTotal {
                    category: AssetCategory::Computer,
                    total: dec!(1500.00),
                },
                CategoryTotal {
                    category: AssetCategory::Software,
                    total: dec!(200.00),
                },
            ]
        );
        assert_eq!(result.total, dec!(1700.00));
    }

    #[test]
    fn qualifying_investment_counts_eligible_categories_and_securities() {
        let input = Investments {
            items: vec![
                InvestmentItem::new(
                    AssetCategory::Machinery,
                    dec!(7000),
                    DepreciationMethod::StraightLine,
                ),
                InvestmentItem::new(
                    AssetCategory::Computer,
                    dec!(2000),
                    DepreciationMethod::StraightLine,
                ),
            ],
            qualifying_securities: dec!(1500),
        };

        let result = DepreciationCalculator::calculate(&input, config());

        assert_eq!(result.qualifying_investment, dec!(8500));
    }
}
