use super::ui;
use crate::core::config::PropertyConfig;
use crate::core::finance::{FinancialMetrics, calculate_all_metrics};
use crate::core::scenario::{ScenarioAnalysis, analyze_scenarios};
use anyhow::Result;
use comfy_table::{Cell, Table};

fn metric_cells(m: &FinancialMetrics) -> [(&'static str, Cell); 8] {
    [
        (
            "Monthly Expenses",
            ui::value_cell(ui::format_currency(m.monthly_expenses)),
        ),
        (
            "Monthly Cash Flow",
            ui::signed_cell(m.monthly_cash_flow, ui::format_currency),
        ),
        (
            "Net Operating Income",
            ui::signed_cell(m.net_operating_income, ui::format_currency),
        ),
        ("Cap Rate", ui::signed_cell(m.cap_rate, ui::format_percent)),
        (
            "Cash-on-Cash Return",
            ui::signed_cell(m.cash_on_cash_return, ui::format_percent),
        ),
        (
            "Return on Investment",
            ui::signed_cell(m.return_on_investment, ui::format_percent),
        ),
        (
            "Break-even",
            ui::format_optional_cell(m.break_even_point, |y| format!("{y:.1} years")),
        ),
        (
            "DSCR",
            ui::format_optional_cell(m.debt_service_coverage_ratio, |r| format!("{r:.2}")),
        ),
    ]
}

pub fn scenario_table(analysis: &ScenarioAnalysis) -> Table {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Metric"),
        ui::header_cell("Conservative"),
        ui::header_cell("Moderate"),
        ui::header_cell("Optimistic"),
    ]);

    let conservative = metric_cells(&analysis.conservative);
    let moderate = metric_cells(&analysis.moderate);
    let optimistic = metric_cells(&analysis.optimistic);
    for ((label, low), ((_, mid), (_, high))) in conservative
        .into_iter()
        .zip(moderate.into_iter().zip(optimistic))
    {
        table.add_row(vec![ui::label_cell(label), low, mid, high]);
    }
    table
}

fn analyze(property: &PropertyConfig) -> Result<ScenarioAnalysis> {
    let baseline = calculate_all_metrics(&property.inputs)?;
    Ok(analyze_scenarios(&property.inputs, baseline)?)
}

pub fn run(properties: &[PropertyConfig]) -> Result<()> {
    if properties.is_empty() {
        println!(
            "{}",
            ui::style_text("No properties configured", ui::StyleType::Subtle)
        );
        return Ok(());
    }

    for (i, property) in properties.iter().enumerate() {
        if i > 0 {
            ui::print_separator();
        }
        println!(
            "Property: {}\n",
            ui::style_text(&property.name, ui::StyleType::Title)
        );
        match analyze(property) {
            Ok(analysis) => {
                println!("{}", scenario_table(&analysis));
                println!(
                    "{}",
                    ui::style_text(
                        "Conservative: rent -10%, expenses and vacancy +20%. Optimistic: rent +10%, expenses and vacancy -20%.",
                        ui::StyleType::Subtle
                    )
                );
            }
            Err(e) => println!(
                "{}",
                ui::style_text(&format!("Error: {e}"), ui::StyleType::Error)
            ),
        }
    }
    Ok(())
}
