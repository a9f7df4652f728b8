//! Dashboard and insights commands

use std::path::Path;

use anyhow::{Context, Result};

use smartspend_core::ai::AIClient;
use smartspend_core::charts::{chart_info, ChartData, ChartSelection};
use smartspend_core::gateway;
use smartspend_core::models::ChartType;

use super::{open_session, truncate};

/// Selection from `--charts`, or the default pair when none are given
pub fn parse_chart_selection(ids: &[String]) -> Result<ChartSelection> {
    let mut selection = ChartSelection::new();
    if ids.is_empty() {
        return Ok(selection);
    }

    let wanted: Vec<ChartType> = ids
        .iter()
        .map(|id| id.trim().parse::<ChartType>().map_err(anyhow::Error::msg))
        .collect::<Result<_>>()?;

    for id in ChartType::ALL {
        if selection.is_visible(id) != wanted.contains(&id) {
            selection.toggle(id);
        }
    }
    Ok(selection)
}

pub fn cmd_dashboard(records_path: &Path, charts: &[String], json: bool) -> Result<()> {
    let mut session = open_session(records_path)?;
    let selection = parse_chart_selection(charts)?;
    for id in ChartType::ALL {
        if session.charts().is_visible(id) != selection.is_visible(id) {
            session.toggle_chart(id);
        }
    }
    let view = session.dashboard();

    if json {
        println!("{}", serde_json::to_string_pretty(&view)?);
        return Ok(());
    }

    println!();
    println!("╭─────────────────────────────────────────╮");
    println!("│        🧾 SmartSpend Dashboard          │");
    println!("╰─────────────────────────────────────────╯");
    println!();
    println!("  Total gastado:     ${:.2}", view.summary.total_spent);
    println!(
        "  Categoría top:     {}",
        view.summary.top_category.as_deref().unwrap_or("-")
    );
    println!("  Boletas:           {}", view.summary.record_count);

    for dataset in &view.charts {
        println!();
        println!("  📊 {} - {}", dataset.title, dataset.description);
        match &dataset.data {
            ChartData::CategoryPie(rows) => {
                for row in rows {
                    println!("     {:<24} {:>10.2}", truncate(&row.name, 24), row.value);
                }
            }
            ChartData::MerchantBar(rows) => {
                for row in rows {
                    println!("     {:<24} {:>10.2}", truncate(&row.name, 24), row.amount);
                }
            }
            ChartData::DailyTrend(rows) => {
                for row in rows {
                    println!("     {:<24} {:>10.2}", row.date, row.amount);
                }
            }
            ChartData::CategoryCount(rows) => {
                for row in rows {
                    println!("     {:<24} {:>10}", truncate(&row.name, 24), row.count);
                }
            }
        }
        if dataset.data.is_empty() {
            println!("     (sin datos)");
        }
    }

    let hidden: Vec<&str> = ChartType::ALL
        .iter()
        .filter(|id| !session.charts().is_visible(**id))
        .map(|id| chart_info(*id).title)
        .collect();
    if !hidden.is_empty() {
        println!();
        println!("  Otros gráficos: {} (use --charts)", hidden.join(", "));
    }
    println!();

    Ok(())
}

pub async fn cmd_insights(ai: &AIClient, records_path: &Path) -> Result<()> {
    let mut session = open_session(records_path)?;

    let Some(request) = session.insights_request() else {
        println!("No records yet. Run `smartspend analyze <images>` first.");
        return Ok(());
    };

    println!("🤖 Generating insights for {} receipt(s)...", request.records.len());
    let text = gateway::summarize(ai, &request.records)
        .await
        .context("Insights request failed")?;
    session.store_insights(request.revision, text.clone());

    println!();
    println!("{}", text);
    println!();
    Ok(())
}
