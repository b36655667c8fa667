//! Plain-text views of the pipeline output.

use std::fmt::Write as _;

use chrono::NaiveDate;
use insights::{format_rupees, Dashboard, ImageVariant, LoadState};
use shared::domain::{ClientRecord, FiscalYear};

pub fn render_years(years: &[FiscalYear]) -> String {
    if years.is_empty() {
        return "No fiscal years available\n".to_string();
    }
    let mut out = String::new();
    for (index, year) in years.iter().enumerate() {
        let marker = if index == 0 { " (default)" } else { "" };
        let _ = writeln!(out, "Fiscal Year {year}{marker}");
    }
    out
}

pub fn render_state(state: &LoadState) -> String {
    match state {
        LoadState::Idle => "Not loaded\n".to_string(),
        LoadState::Loading(_) => "Loading...\n".to_string(),
        LoadState::Loaded(dashboard) => render_dashboard(dashboard),
        LoadState::Error { message } => format!("Error: {message}\nRun the command again to retry.\n"),
    }
}

pub fn render_dashboard(dashboard: &Dashboard) -> String {
    let mut out = String::new();
    let Some(selected) = &dashboard.selected_year else {
        out.push_str("No fiscal years available\n");
        return out;
    };

    let _ = writeln!(out, "Audit Insights - Fiscal Year {selected}");
    if dashboard.years.len() > 1 {
        let listed: Vec<&str> = dashboard.years.iter().map(FiscalYear::as_str).collect();
        let _ = writeln!(out, "Available years: {}", listed.join(", "));
    }
    out.push('\n');

    for metric in &dashboard.metrics {
        let _ = writeln!(
            out,
            "{} {}: {} ({})",
            metric.icon, metric.title, metric.value, metric.description
        );
    }
    out.push('\n');
    out.push_str(&render_clients(&dashboard.clients));
    out
}

const HEADERS: [&str; 5] = ["Client", "VAT Returns", "Sales", "Purchases", "Status"];

pub fn render_clients(clients: &[ClientRecord]) -> String {
    if clients.is_empty() {
        return "No client data available for this fiscal year\n".to_string();
    }

    let rows: Vec<[String; 5]> = clients
        .iter()
        .map(|client| {
            [
                client.name.clone(),
                format_rupees(client.vat_returns),
                format_rupees(client.sales),
                format_rupees(client.purchases),
                client.status.clone(),
            ]
        })
        .collect();

    let mut widths = HEADERS.map(|header| header.chars().count());
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    push_row(&mut out, &HEADERS.map(str::to_string), &widths);
    for row in &rows {
        push_row(&mut out, row, &widths);
    }
    out
}

fn push_row(out: &mut String, cells: &[String; 5], widths: &[usize; 5]) {
    let line: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, &width)| format!("{cell:<width$}"))
        .collect();
    let _ = writeln!(out, "{}", line.join("  ").trim_end());
}

pub fn render_hero(date: NaiveDate, variant: ImageVariant) -> String {
    let tagline = if variant.shows_tagline() {
        "shown"
    } else {
        "hidden"
    };
    format!("{date}: {} (tagline {tagline})\n", variant.asset())
}

#[cfg(test)]
#[path = "tests/render_tests.rs"]
mod tests;
