//! Summary cards computed over one fiscal year's client rows.

use shared::domain::{ClientRecord, FiscalYear, MetricCard};

pub const CURRENCY_PREFIX: &str = "Rs. ";
/// Shown instead of a percentage when there are no clients to rate.
pub const NO_RATE_LABEL: &str = "N/A";

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Totals {
    pub clients: usize,
    pub completed: usize,
    pub vat_returns: f64,
    pub sales: f64,
    pub purchases: f64,
}

impl Totals {
    pub fn of(clients: &[ClientRecord]) -> Self {
        Self {
            clients: clients.len(),
            completed: clients.iter().filter(|client| client.is_completed()).count(),
            vat_returns: order_independent_sum(clients.iter().map(|client| client.vat_returns)),
            sales: order_independent_sum(clients.iter().map(|client| client.sales)),
            purchases: order_independent_sum(clients.iter().map(|client| client.purchases)),
        }
    }
}

// Sorted before adding so any permutation of the rows yields the same bits.
// Saturates at the largest finite value instead of overflowing to infinity.
fn order_independent_sum(values: impl Iterator<Item = f64>) -> f64 {
    let mut values: Vec<f64> = values.collect();
    values.sort_by(f64::total_cmp);
    values.into_iter().sum::<f64>().clamp(f64::MIN, f64::MAX)
}

/// Percentage of clients whose status is `completed`, rounded half up.
/// `None` when there are no clients.
pub fn completion_rate(clients: &[ClientRecord]) -> Option<u32> {
    rate(&Totals::of(clients))
}

fn rate(totals: &Totals) -> Option<u32> {
    if totals.clients == 0 {
        return None;
    }
    let percent = 100.0 * totals.completed as f64 / totals.clients as f64;
    Some(percent.round() as u32)
}

pub fn compute_metrics(clients: &[ClientRecord], fiscal_year: &FiscalYear) -> Vec<MetricCard> {
    let totals = Totals::of(clients);
    let rate_label = rate(&totals)
        .map(|percent| format!("{percent}%"))
        .unwrap_or_else(|| NO_RATE_LABEL.to_string());

    vec![
        card(
            1,
            "Total VAT Filed",
            format_rupees(totals.vat_returns),
            "📑",
            format!("Fiscal Year {fiscal_year}"),
        ),
        card(
            2,
            "Completion Rate",
            rate_label,
            "✅",
            format!("{} of {} clients", totals.completed, totals.clients),
        ),
        card(
            3,
            "Total Sales",
            format_rupees(totals.sales),
            "💰",
            "Across all clients".to_string(),
        ),
        card(
            4,
            "Total Purchases",
            format_rupees(totals.purchases),
            "🛒",
            "Across all clients".to_string(),
        ),
    ]
}

fn card(id: u8, title: &str, value: String, icon: &str, description: String) -> MetricCard {
    MetricCard {
        id,
        title: title.to_string(),
        value,
        icon: icon.to_string(),
        description,
    }
}

/// `Rs. 1,234,567.5`: groups of three, at most three fraction digits, no trailing zeros.
pub fn format_rupees(amount: f64) -> String {
    format!("{CURRENCY_PREFIX}{}", group_thousands(amount))
}

pub fn group_thousands(amount: f64) -> String {
    let fixed = format!("{:.3}", amount.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));
    let frac_part = frac_part.trim_end_matches('0');

    let digits = int_part.as_bytes();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (index, digit) in digits.iter().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(char::from(*digit));
    }

    let is_zero = int_part.bytes().all(|b| b == b'0') && frac_part.is_empty();
    let sign = if amount.is_sign_negative() && !is_zero { "-" } else { "" };
    if frac_part.is_empty() {
        format!("{sign}{grouped}")
    } else {
        format!("{sign}{grouped}.{frac_part}")
    }
}

#[cfg(test)]
#[path = "tests/metrics_tests.rs"]
mod tests;
