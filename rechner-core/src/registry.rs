//! Built-in statutory tables for the supported tax years.
//!
//! Values follow the published SVS and EStG figures for each year. They are
//! estimates for planning purposes and carry no legal weight.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::models::{
    AllowanceTier, AssetCategory, CategoryRule, CommuterBand, CreditRules, DepreciationRules,
    EmploymentRules, ExpenseRules, FlatRateRule, FlatRateTable, GmbhRules, IncomeTaxTable,
    ProfitAllowanceRules, SvsRates, TaxBracket, YearConfig, YearConfigError,
};

static BUILTIN: LazyLock<YearConfigRegistry> = LazyLock::new(YearConfigRegistry::build_builtin);

/// Lookup table of [`YearConfig`] keyed by tax year.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YearConfigRegistry {
    configs: BTreeMap<i32, YearConfig>,
}

impl YearConfigRegistry {
    /// The built-in registry covering 2024 to 2026.
    pub fn builtin() -> &'static YearConfigRegistry {
        &BUILTIN
    }

    /// Builds a registry from custom configurations.
    ///
    /// # Errors
    ///
    /// Returns the first validation error of any configuration.
    pub fn from_configs(
        configs: impl IntoIterator<Item = YearConfig>,
    ) -> Result<Self, YearConfigError> {
        let mut map = BTreeMap::new();
        for config in configs {
            config.validate()?;
            map.insert(config.tax_year, config);
        }
        Ok(Self { configs: map })
    }

    /// Returns a copy with `config` replacing (or adding) its year.
    ///
    /// # Errors
    ///
    /// Returns a validation error if `config` is invalid.
    pub fn with_override(
        &self,
        config: YearConfig,
    ) -> Result<Self, YearConfigError> {
        config.validate()?;
        let mut configs = self.configs.clone();
        configs.insert(config.tax_year, config);
        Ok(Self { configs })
    }

    /// Looks up the configuration for `year`.
    ///
    /// # Errors
    ///
    /// Returns [`YearConfigError::UnsupportedYear`] if no table exists.
    pub fn get(
        &self,
        year: i32,
    ) -> Result<&YearConfig, YearConfigError> {
        self.configs
            .get(&year)
            .ok_or(YearConfigError::UnsupportedYear(year))
    }

    /// Supported years in ascending order.
    pub fn supported_years(&self) -> Vec<i32> {
        self.configs.keys().copied().collect()
    }

    pub fn latest_year(&self) -> Option<i32> {
        self.configs.keys().next_back().copied()
    }

    pub fn configs(&self) -> impl Iterator<Item = &YearConfig> {
        self.configs.values()
    }

    fn build_builtin() -> Self {
        let configs: BTreeMap<i32, YearConfig> = [year_2024(), year_2025(), year_2026()]
            .into_iter()
            .map(|config| {
                debug_assert_eq!(config.validate(), Ok(()), "year {}", config.tax_year);
                (config.tax_year, config)
            })
            .collect();
        Self { configs }
    }
}

fn brackets(bounds: [Decimal; 6]) -> Vec<TaxBracket> {
    let rates = [
        dec!(0.00),
        dec!(0.20),
        dec!(0.30),
        dec!(0.40),
        dec!(0.48),
        dec!(0.50),
        dec!(0.55),
    ];
    let mut from = Decimal::ZERO;
    let mut out = Vec::with_capacity(rates.len());
    for (index, rate) in rates.into_iter().enumerate() {
        let to = bounds.get(index).copied();
        out.push(TaxBracket::new(from, to, rate));
        if let Some(to) = to {
            from = to;
        }
    }
    out
}

fn allowance_rules() -> ProfitAllowanceRules {
    ProfitAllowanceRules {
        basic_rate: dec!(0.15),
        basic_profit_ceiling: dec!(33000),
        investment_tiers: vec![
            AllowanceTier {
                width: dec!(142000),
                rate: dec!(0.13),
            },
            AllowanceTier {
                width: dec!(175000),
                rate: dec!(0.07),
            },
            AllowanceTier {
                width: dec!(230000),
                rate: dec!(0.045),
            },
        ],
        investment_ceiling: dec!(41060),
    }
}

fn commuter_bands() -> Vec<CommuterBand> {
    vec![
        CommuterBand {
            from_km: 2,
            feasible_amount: dec!(0),
            infeasible_amount: dec!(372),
        },
        CommuterBand {
            from_km: 20,
            feasible_amount: dec!(696),
            infeasible_amount: dec!(1476),
        },
        CommuterBand {
            from_km: 40,
            feasible_amount: dec!(1356),
            infeasible_amount: dec!(2568),
        },
        CommuterBand {
            from_km: 60,
            feasible_amount: dec!(2016),
            infeasible_amount: dec!(3672),
        },
    ]
}

fn flat_rates(
    basis_rate: Decimal,
    basis_ceiling: Decimal,
    small_business_ceiling: Decimal,
) -> FlatRateTable {
    FlatRateTable {
        basis: FlatRateRule {
            rate: basis_rate,
            revenue_ceiling: basis_ceiling,
        },
        basis_reduced: FlatRateRule {
            rate: basis_rate / dec!(2),
            revenue_ceiling: basis_ceiling,
        },
        kleinunternehmer: FlatRateRule {
            rate: dec!(0.45),
            revenue_ceiling: small_business_ceiling,
        },
        kleinunternehmer_service: FlatRateRule {
            rate: dec!(0.20),
            revenue_ceiling: small_business_ceiling,
        },
    }
}

fn depreciation_rules() -> DepreciationRules {
    let rule = |category, useful_life_years, declining_allowed, allowance_eligible| CategoryRule {
        category,
        useful_life_years,
        declining_allowed,
        allowance_eligible,
    };
    DepreciationRules {
        declining_balance_rate: dec!(0.30),
        categories: vec![
            rule(AssetCategory::Computer, 3, true, false),
            rule(AssetCategory::Software, 3, false, false),
            rule(AssetCategory::OfficeFurniture, 10, true, true),
            rule(AssetCategory::Machinery, 7, true, true),
            rule(AssetCategory::Vehicle, 8, false, false),
            rule(AssetCategory::LowValueAsset, 1, false, false),
        ],
    }
}

fn employment_rules() -> EmploymentRules {
    EmploymentRules {
        employee_social_rate: dec!(0.1807),
        employee_allowance: dec!(132),
        salary_payments_per_year: 14,
    }
}

fn gmbh_rules() -> GmbhRules {
    GmbhRules {
        employer_social_rate: dec!(0.21),
        corporate_tax_rate: dec!(0.23),
        capital_gains_tax_rate: dec!(0.275),
    }
}

fn expense_rules() -> ExpenseRules {
    ExpenseRules {
        home_office_full: dec!(1200),
        home_office_reduced: dec!(300),
        public_transport_deductible_share: dec!(0.50),
    }
}

fn svs_rates(
    accident_monthly: Decimal,
    min_base_monthly: Decimal,
    max_base_monthly: Decimal,
    exemption_threshold: Decimal,
) -> SvsRates {
    SvsRates {
        pension_rate: dec!(0.185),
        health_rate: dec!(0.068),
        provision_rate: dec!(0.0153),
        founder_health_rate: dec!(0.034),
        founder_discount_years: 3,
        accident_monthly,
        min_base_monthly,
        max_base_monthly,
        exemption_threshold,
        max_prepayment_multiple: dec!(1),
    }
}

fn year_2024() -> YearConfig {
    YearConfig {
        tax_year: 2024,
        svs: svs_rates(dec!(11.35), dec!(518.44), dec!(7070), dec!(6221.28)),
        income_tax: IncomeTaxTable {
            brackets: brackets([
                dec!(12816),
                dec!(20818),
                dec!(34513),
                dec!(66612),
                dec!(99266),
                dec!(1000000),
            ]),
            tax_free_threshold: dec!(12816),
        },
        allowance: allowance_rules(),
        credits: CreditRules {
            family_bonus_under_18: dec!(2000.16),
            family_bonus_over_18: dec!(700.08),
            sole_earner_base: dec!(572),
            sole_earner_per_additional_child: dec!(202),
            commuter_bands: commuter_bands(),
        },
        flat_rates: flat_rates(dec!(0.12), dec!(220000), dec!(40000)),
        employment: employment_rules(),
        gmbh: gmbh_rules(),
        expenses: expense_rules(),
        depreciation: depreciation_rules(),
        max_monetary_input: dec!(100000000),
    }
}

fn year_2025() -> YearConfig {
    YearConfig {
        tax_year: 2025,
        svs: svs_rates(dec!(11.70), dec!(551.10), dec!(7525), dec!(6613.20)),
        income_tax: IncomeTaxTable {
            brackets: brackets([
                dec!(13308),
                dec!(21617),
                dec!(35836),
                dec!(69166),
                dec!(103072),
                dec!(1000000),
            ]),
            tax_free_threshold: dec!(13308),
        },
        allowance: allowance_rules(),
        credits: CreditRules {
            family_bonus_under_18: dec!(2000.16),
            family_bonus_over_18: dec!(700.08),
            sole_earner_base: dec!(601),
            sole_earner_per_additional_child: dec!(212),
            commuter_bands: commuter_bands(),
        },
        flat_rates: flat_rates(dec!(0.135), dec!(320000), dec!(55000)),
        employment: employment_rules(),
        gmbh: gmbh_rules(),
        expenses: expense_rules(),
        depreciation: depreciation_rules(),
        max_monetary_input: dec!(100000000),
    }
}

fn year_2026() -> YearConfig {
    YearConfig {
        tax_year: 2026,
        svs: svs_rates(dec!(12.07), dec!(551.10), dec!(8085), dec!(6613.20)),
        income_tax: IncomeTaxTable {
            brackets: brackets([
                dec!(13539),
                dec!(21992),
                dec!(36458),
                dec!(70365),
                dec!(104859),
                dec!(1000000),
            ]),
            tax_free_threshold: dec!(13539),
        },
        allowance: allowance_rules(),
        credits: CreditRules {
            family_bonus_under_18: dec!(2000.16),
            family_bonus_over_18: dec!(700.08),
            sole_earner_base: dec!(612),
            sole_earner_per_additional_child: dec!(216),
            commuter_bands: commuter_bands(),
        },
        flat_rates: flat_rates(dec!(0.15), dec!(420000), dec!(55000)),
        employment: employment_rules(),
        gmbh: gmbh_rules(),
        expenses: expense_rules(),
        depreciation: depreciation_rules(),
        max_monetary_input: dec!(100000000),
    }
}
