//! Text renderings of calculation results.
//!
//! `summary` is a fixed two-column layout for people; `toml` serializes the
//! whole result for scripts.

use std::fmt::Write;

use clap::ValueEnum;
use rechner_core::calculations::{SvsResult, TipKind, TipResult};
use rechner_core::{RechnerResult, YearConfigRegistry};
use rust_decimal::Decimal;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Summary,
    Toml,
}

const LABEL_WIDTH: usize = 32;

fn line(
    out: &mut String,
    label: &str,
    value: impl std::fmt::Display,
) {
    // Writing to a String cannot fail.
    let _ = writeln!(out, "  {label:<LABEL_WIDTH$} {value:>12}");
}

fn heading(
    out: &mut String,
    title: &str,
) {
    let _ = writeln!(out, "\n{title}");
}

fn percent(rate: Decimal) -> String {
    format!("{:.2} %", rate * Decimal::ONE_HUNDRED)
}

/// Renders a full result in the requested format.
///
/// # Errors
///
/// Returns the serializer error for [`OutputFormat::Toml`].
pub fn render_result(
    result: &RechnerResult,
    format: OutputFormat,
) -> Result<String, toml::ser::Error> {
    match format {
        OutputFormat::Summary => Ok(summary(result)),
        OutputFormat::Toml => toml::to_string_pretty(result),
    }
}

fn summary(result: &RechnerResult) -> String {
    let mut out = format!("Tax year {}\n", result.tax_year);

    heading(&mut out, "Business");
    line(&mut out, "Revenue", result.revenue);
    line(&mut out, "Expenses", result.effective_expenses);
    if result.depreciation.total > Decimal::ZERO {
        line(&mut out, "  of which depreciation", result.depreciation.total);
    }
    line(&mut out, "Profit", result.profit);
    if result.flat_rate.is_applied() {
        line(&mut out, "Flat-rate regime", result.flat_rate.applied.as_str());
        if let Some(favorable) = result.flat_rate.favorable {
            line(&mut out, "Flat rate favorable", if favorable { "yes" } else { "no" });
        }
    }

    out.push_str(&svs_section(&result.svs));

    let tax = &result.income_tax;
    heading(&mut out, "Income tax");
    line(&mut out, "Profit allowance", tax.allowance.total);
    line(&mut out, "Taxable income", tax.taxable_income);
    line(&mut out, "Tax before credits", tax.gross_tax);
    line(&mut out, "Credits used", tax.credits_used);
    line(&mut out, "Income tax", tax.net_tax);
    line(&mut out, "Marginal rate", percent(tax.marginal_rate));
    line(&mut out, "Average rate", percent(tax.average_rate));
    line(&mut out, "Net income", tax.real_net_income);

    let mixed = &result.mixed_income;
    if mixed.employment_gross > Decimal::ZERO || mixed.rental_income > Decimal::ZERO {
        heading(&mut out, "Other income");
        line(&mut out, "Employment gross", mixed.employment_gross);
        line(&mut out, "Rental income", mixed.rental_income);
        line(&mut out, "Combined taxable income", mixed.combined.taxable);
        line(&mut out, "Tax on self-employment", mixed.apportioned_tax.self_employment);
        line(&mut out, "Net gain from business", mixed.business_net_gain);
    }

    if let Some(gmbh) = &result.gmbh {
        heading(&mut out, "GmbH comparison");
        line(&mut out, "Manager salary", gmbh.salary);
        line(&mut out, "Corporate tax", gmbh.corporate_tax);
        line(&mut out, "Net distribution", gmbh.net_distribution);
        line(&mut out, "Total net (GmbH)", gmbh.total_net);
        line(&mut out, "Total net (sole proprietor)", gmbh.sole_proprietor_net);
        line(&mut out, "GmbH favorable", if gmbh.favorable { "yes" } else { "no" });
    }

    if let Some(marginal) = &result.marginal {
        heading(&mut out, "Marginal profit");
        line(&mut out, "Extra profit", marginal.incremental_profit);
        line(&mut out, "Extra SVS", marginal.incremental_svs);
        line(&mut out, "Extra income tax", marginal.incremental_tax);
        line(&mut out, "Extra net income", marginal.incremental_net);
        line(&mut out, "Kept of extra revenue", percent(marginal.keep_rate));
    }

    let prepayment = &result.prepayment;
    heading(&mut out, "Prepayments");
    line(&mut out, "SVS difference", prepayment.svs.difference);
    line(&mut out, "Income tax difference", prepayment.income_tax.difference);
    line(&mut out, "Status", prepayment.status.as_str());
    line(&mut out, "Monthly reserve", prepayment.monthly_reserve);

    out.push_str(&tips_section(&result.tips));
    out
}

fn svs_section(svs: &SvsResult) -> String {
    let mut out = String::new();
    heading(&mut out, "Social insurance (SVS)");
    line(&mut out, "Insured months", svs.insured_months);
    line(&mut out, "Contribution base", svs.contribution_base);
    line(&mut out, "Pension", svs.pension);
    line(&mut out, "Health", svs.health);
    line(&mut out, "Self-employed provision", svs.provision);
    line(&mut out, "Accident", svs.accident);
    line(&mut out, "Total", svs.final_total);
    line(&mut out, "Provisional", svs.provisional_total);
    line(&mut out, "Back payment", svs.back_payment);
    line(&mut out, "Recommended monthly reserve", svs.savings_recommendation);
    if svs.below_minimum {
        let _ = writeln!(out, "  below the insurance threshold, no contributions due");
    }
    if svs.capped_at_max {
        let _ = writeln!(out, "  contribution base capped at the maximum");
    }
    if svs.founder_discount_applied {
        let _ = writeln!(out, "  founder health rate applied");
    }
    out
}

fn tips_section(tips: &TipResult) -> String {
    let mut out = String::new();
    if tips.tips.is_empty() {
        return out;
    }
    heading(&mut out, "Tips");
    for tip in &tips.tips {
        let label = match tip.kind {
            TipKind::ExtraInvestment => "Invest for the profit allowance",
            TipKind::VoluntaryPrepayment => "Prepay SVS voluntarily",
        };
        line(&mut out, label, tip.amount);
        line(&mut out, "  tax saving", tip.tax_saving);
    }
    line(&mut out, "Total tax saving", tips.total_saving);
    out
}

pub fn render_svs(svs: &SvsResult) -> String {
    let mut out = format!("Profit {}\n", svs.profit);
    out.push_str(&svs_section(svs));
    out
}

pub fn render_tips(tips: &TipResult) -> String {
    let out = tips_section(tips);
    if out.is_empty() {
        "No tips for this profit.\n".to_string()
    } else {
        out
    }
}

/// One row per supported year.
pub fn render_years(registry: &YearConfigRegistry) -> String {
    let mut out = format!(
        "{:<6} {:>12} {:>12} {:>12} {:>12}\n",
        "year", "min base", "max base", "exemption", "tax free"
    );
    for config in registry.configs() {
        let _ = writeln!(
            out,
            "{:<6} {:>12} {:>12} {:>12} {:>12}",
            config.tax_year,
            config.min_base_annual(),
            config.max_base_annual(),
            config.svs.exemption_threshold,
            config.income_tax.tax_free_threshold,
        );
    }
    out
}
