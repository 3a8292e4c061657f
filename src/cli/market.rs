use super::ui;
use crate::core::market::{MarketData, MarketDataProvider};
use anyhow::{Context, Result};
use comfy_table::{Cell, Table};
use futures::future::join_all;

/// Fetches every zip code concurrently, keeping per-zip failures.
pub async fn fetch_all(
    provider: &dyn MarketDataProvider,
    zip_codes: &[String],
) -> Vec<(String, Result<MarketData>)> {
    let pb = ui::new_progress_bar(zip_codes.len() as u64, true);
    pb.set_message("Fetching market data...");

    let futures = zip_codes.iter().map(|zip| {
        let pb_clone = pb.clone();
        async move {
            let res = provider.fetch_market_data(zip).await;
            pb_clone.inc(1);
            (zip.clone(), res)
        }
    });

    let results = join_all(futures).await;
    pb.finish_and_clear();
    results
}

pub fn market_table(results: &[(String, Result<MarketData>)]) -> Table {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Zip Code"),
        ui::header_cell("Median Price"),
        ui::header_cell("Median Rent"),
        ui::header_cell("Price/Rent"),
        ui::header_cell("Appreciation"),
        ui::header_cell("Days on Market"),
        ui::header_cell("Score"),
    ]);

    for (zip, result) in results {
        let mut row = vec![Cell::new(zip)];
        match result {
            Ok(data) => row.extend([
                ui::format_optional_cell(data.median_home_price, ui::format_currency),
                ui::format_optional_cell(data.median_rent, ui::format_currency),
                ui::format_optional_cell(data.price_to_rent_ratio, |r| format!("{r:.1}")),
                ui::format_optional_cell(data.appreciation_rate, ui::format_percent),
                ui::format_optional_cell(data.average_days_on_market, |d| format!("{d:.0}")),
                ui::format_optional_cell(data.market_score, |s| format!("{s:.0}")),
            ]),
            Err(_) => row.extend((0..6).map(|_| ui::na_cell(true))),
        }
        table.add_row(row);
    }
    table
}

pub async fn run(provider: &dyn MarketDataProvider, zip_codes: &[String], json: bool) -> Result<()> {
    if zip_codes.is_empty() {
        println!(
            "{}",
            ui::style_text(
                "No zip codes given and none configured on any property",
                ui::StyleType::Subtle
            )
        );
        return Ok(());
    }

    let results = fetch_all(provider, zip_codes).await;

    if json {
        let output: Vec<serde_json::Value> = results
            .iter()
            .map(|(zip, result)| match result {
                Ok(data) => serde_json::to_value(data)
                    .unwrap_or_else(|e| serde_json::json!({ "zip_code": zip, "error": e.to_string() })),
                Err(e) => serde_json::json!({ "zip_code": zip, "error": format!("{e:#}") }),
            })
            .collect();
        let rendered =
            serde_json::to_string_pretty(&output).context("Failed to serialize market data")?;
        println!("{rendered}");
        return Ok(());
    }

    println!(
        "{}\n\n{}",
        ui::style_text("Market Data", ui::StyleType::Title),
        market_table(&results)
    );
    for (zip, result) in &results {
        if let Err(e) = result {
            println!(
                "{}",
                ui::style_text(&format!("{zip}: {e:#}"), ui::StyleType::Error)
            );
        }
    }
    Ok(())
}
