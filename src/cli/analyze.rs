use super::ui;
use crate::core::config::PropertyConfig;
use crate::core::finance::{self, FinanceError, FinancialInputs, FinancialMetrics};
use crate::core::irr::{Irr, calculate_irr};
use anyhow::{Context, Result};
use comfy_table::Cell;
use serde::Serialize;
use tracing::debug;

/// Metrics and IRR projection for one configured property.
#[derive(Debug, Clone, Serialize)]
pub struct PropertyReport {
    pub name: String,
    pub zip_code: Option<String>,
    pub holding_period_years: u32,
    pub inputs: FinancialInputs,
    pub metrics: FinancialMetrics,
    /// Absent when the projection has no meaningful rate.
    pub irr: Option<Irr>,
}

/// Runs the metrics pipeline and the hold-and-sell IRR for `property`.
///
/// The IRR treats the purchase price as the initial outlay and projects the
/// current annual cash flow over the holding period.
pub fn analyze_property(property: &PropertyConfig) -> Result<PropertyReport, FinanceError> {
    let metrics = finance::calculate_all_metrics(&property.inputs)?;
    let irr = match calculate_irr(
        property.inputs.purchase_price,
        metrics.monthly_cash_flow * 12.0,
        property.inputs.appreciation_rate,
        property.holding_period_years,
    ) {
        Ok(irr) => Some(irr),
        Err(e) => {
            debug!("No IRR for {}: {}", property.name, e);
            None
        }
    };

    Ok(PropertyReport {
        name: property.name.clone(),
        zip_code: property.zip_code.clone(),
        holding_period_years: property.holding_period_years,
        inputs: property.inputs,
        metrics,
        irr,
    })
}

fn format_irr(irr: Irr) -> String {
    if irr.converged {
        ui::format_percent(irr.rate)
    } else {
        format!("~{} (approx.)", ui::format_percent(irr.rate))
    }
}

impl PropertyReport {
    pub fn display_as_table(&self) -> String {
        let metrics = &self.metrics;
        let mut table = ui::new_styled_table();
        table.set_header(vec![ui::header_cell("Metric"), ui::header_cell("Value")]);

        let rows: Vec<(&str, Cell)> = vec![
            (
                "Purchase Price",
                ui::value_cell(ui::format_currency(self.inputs.purchase_price)),
            ),
            (
                "Cash Invested",
                ui::value_cell(ui::format_currency(self.inputs.total_investment())),
            ),
            (
                "Monthly Mortgage",
                ui::value_cell(ui::format_currency(metrics.monthly_mortgage_payment)),
            ),
            (
                "Monthly Expenses",
                ui::value_cell(ui::format_currency(metrics.monthly_expenses)),
            ),
            (
                "Monthly Cash Flow",
                ui::signed_cell(metrics.monthly_cash_flow, ui::format_currency),
            ),
            (
                "Net Operating Income",
                ui::signed_cell(metrics.net_operating_income, ui::format_currency),
            ),
            ("Cap Rate", ui::signed_cell(metrics.cap_rate, ui::format_percent)),
            (
                "Cash-on-Cash Return",
                ui::signed_cell(metrics.cash_on_cash_return, ui::format_percent),
            ),
            (
                "Return on Investment",
                ui::signed_cell(metrics.return_on_investment, ui::format_percent),
            ),
            (
                "Gross Rent Multiplier",
                ui::value_cell(format!("{:.2}", metrics.gross_rent_multiplier)),
            ),
            (
                "Break-even",
                ui::format_optional_cell(metrics.break_even_point, |y| format!("{y:.1} years")),
            ),
            (
                "DSCR",
                ui::format_optional_cell(metrics.debt_service_coverage_ratio, |r| {
                    format!("{r:.2}")
                }),
            ),
            (
                "IRR",
                ui::format_optional_cell(self.irr, format_irr),
            ),
        ];
        for (label, value) in rows {
            table.add_row(vec![ui::label_cell(label), value]);
        }

        let location = self
            .zip_code
            .as_deref()
            .map(|zip| format!(" ({zip})"))
            .unwrap_or_default();
        let mut output = format!(
            "Property: {}{}\n\n",
            ui::style_text(&self.name, ui::StyleType::Title),
            location
        );
        output.push_str(&table.to_string());
        output.push_str(&format!(
            "\n{}",
            ui::style_text(
                &format!(
                    "IRR assumes a {}-year hold and sale at {} annual appreciation",
                    self.holding_period_years,
                    ui::format_percent(self.inputs.appreciation_rate)
                ),
                ui::StyleType::Subtle
            )
        ));
        output
    }
}

pub fn run(properties: &[PropertyConfig], json: bool) -> Result<()> {
    if properties.is_empty() {
        println!(
            "{}",
            ui::style_text("No properties configured", ui::StyleType::Subtle)
        );
        return Ok(());
    }

    let results: Vec<(&PropertyConfig, Result<PropertyReport, FinanceError>)> = properties
        .iter()
        .map(|property| (property, analyze_property(property)))
        .collect();

    if json {
        let output: Vec<serde_json::Value> = results
            .iter()
            .map(|(property, result)| match result {
                Ok(report) => serde_json::to_value(report)
                    .unwrap_or_else(|e| serde_json::json!({ "name": property.name, "error": e.to_string() })),
                Err(e) => serde_json::json!({ "name": property.name, "error": e.to_string() }),
            })
            .collect();
        let rendered =
            serde_json::to_string_pretty(&output).context("Failed to serialize analysis")?;
        println!("{rendered}");
        return Ok(());
    }

    for (i, (property, result)) in results.iter().enumerate() {
        if i > 0 {
            ui::print_separator();
        }
        match result {
            Ok(report) => println!("{}", report.display_as_table()),
            Err(e) => println!(
                "Property: {}\n\n{}",
                ui::style_text(&property.name, ui::StyleType::Title),
                ui::style_text(&format!("Error: {e}"), ui::StyleType::Error)
            ),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::finance::tests::sample_inputs;

    fn property(inputs: FinancialInputs) -> PropertyConfig {
        PropertyConfig {
            name: "Test Property".to_string(),
            zip_code: Some("12345".to_string()),
            holding_period_years: 5,
            inputs,
        }
    }

    #[test]
    fn test_analyze_property() {
        let report = analyze_property(&property(sample_inputs())).unwrap();
        assert_eq!(report.name, "Test Property");
        assert!((report.metrics.cap_rate - 7.1).abs() < 0.01);

        let irr = report.irr.unwrap();
        assert!(irr.converged);
        assert!(irr.rate > 0.0 && irr.rate < 20.0, "irr {}", irr.rate);
    }

    #[test]
    fn test_invalid_property_is_an_error() {
        let mut inputs = sample_inputs();
        inputs.down_payment = 120.0;
        let err = analyze_property(&property(inputs)).unwrap_err();
        assert!(matches!(
            err,
            FinanceError::InvalidInput {
                field: "down_payment",
                ..
            }
        ));
    }

    #[test]
    fn test_report_table_shows_missing_values() {
        let mut inputs = sample_inputs();
        inputs.down_payment = 100.0;
        let report = analyze_property(&property(inputs)).unwrap();
        assert!(report.metrics.debt_service_coverage_ratio.is_none());

        let rendered = report.display_as_table();
        assert!(rendered.contains("DSCR"));
        assert!(rendered.contains("N/A"));
        assert!(rendered.contains("$300,000.00"));
    }

    #[test]
    fn test_report_serializes_for_export() {
        let report = analyze_property(&property(sample_inputs())).unwrap();
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["name"], "Test Property");
        assert_eq!(value["inputs"]["purchase_price"], 300000.0);
        assert!(value["metrics"]["cap_rate"].is_number());
    }
}
