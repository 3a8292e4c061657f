use super::ui;
use crate::core::amortization::{
    AmortizationEntry, AmortizationSchedule, AmortizationYear, summarize_by_year,
};
use crate::core::config::{AppConfig, PropertyConfig};
use anyhow::{Result, anyhow};
use comfy_table::{Cell, Table};

fn yearly_table(years: &[AmortizationYear]) -> Table {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Year"),
        ui::header_cell("Principal"),
        ui::header_cell("Interest"),
        ui::header_cell("Balance"),
    ]);
    for year in years {
        table.add_row(vec![
            Cell::new(year.year),
            ui::value_cell(ui::format_currency(year.principal)),
            ui::value_cell(ui::format_currency(year.interest)),
            ui::value_cell(ui::format_currency(year.ending_balance)),
        ]);
    }
    table
}

fn monthly_table(entries: &[AmortizationEntry]) -> Table {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Month"),
        ui::header_cell("Payment"),
        ui::header_cell("Principal"),
        ui::header_cell("Interest"),
        ui::header_cell("Balance"),
    ]);
    for entry in entries {
        table.add_row(vec![
            Cell::new(entry.month),
            ui::value_cell(ui::format_currency(entry.payment)),
            ui::value_cell(ui::format_currency(entry.principal)),
            ui::value_cell(ui::format_currency(entry.interest)),
            ui::value_cell(ui::format_currency(entry.balance)),
        ]);
    }
    table
}

/// Renders the loan schedule for `property`, by year unless `monthly` is set.
pub fn render(property: &PropertyConfig, monthly: bool) -> Result<String> {
    property.inputs.validate()?;
    let inputs = &property.inputs;
    let loan_amount = inputs.loan_amount();

    let mut output = format!(
        "Property: {}\n\n",
        ui::style_text(&property.name, ui::StyleType::Title)
    );
    if loan_amount <= 0.0 {
        output.push_str(&ui::style_text(
            "No loan to amortize: the purchase is paid in full.",
            ui::StyleType::Subtle,
        ));
        return Ok(output);
    }

    let schedule = AmortizationSchedule::new(loan_amount, inputs.interest_rate, inputs.loan_term);
    let payment = schedule.monthly_payment();
    let entries: Vec<AmortizationEntry> = schedule.collect();
    let total_interest: f64 = entries.iter().map(|e| e.interest).sum();

    let table = if monthly {
        monthly_table(&entries)
    } else {
        yearly_table(&summarize_by_year(&entries))
    };
    output.push_str(&table.to_string());
    output.push_str(&format!(
        "\n\n{} {}  {} {}  {} {}",
        ui::style_text("Loan:", ui::StyleType::TotalLabel),
        ui::format_currency(loan_amount),
        ui::style_text("Monthly Payment:", ui::StyleType::TotalLabel),
        ui::style_text(&ui::format_currency(payment), ui::StyleType::TotalValue),
        ui::style_text("Total Interest:", ui::StyleType::TotalLabel),
        ui::format_currency(total_interest),
    ));
    Ok(output)
}

pub fn run(config: &AppConfig, name: &str, monthly: bool) -> Result<()> {
    let property = config
        .find_property(name)
        .ok_or_else(|| anyhow!("No property named '{}' in configuration", name))?;
    println!("{}", render(property, monthly)?);
    Ok(())
}
