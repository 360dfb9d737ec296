//! Pie-chart payloads carried by `[PIE_CHART_DATA:{...}]`.

use serde::Serialize;
use serde_json::{Map, Value};

pub const DEFAULT_CHART_TITLE: &str = "Your CO₂ Footprint Breakdown";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartDataPoint {
    pub label: String,
    pub value: f64,
}

/// Parse the JSON object of a chart tag. Keys keep their original order;
/// entries whose value is not a positive number are dropped.
pub fn parse_chart_data(json: &str) -> Result<Vec<ChartDataPoint>, serde_json::Error> {
    let entries: Map<String, Value> = serde_json::from_str(json)?;
    Ok(entries
        .into_iter()
        .filter_map(|(key, value)| {
            let value = value.as_f64()?;
            (value.is_finite() && value > 0.0).then(|| ChartDataPoint {
                label: humanize_key(&key),
                value,
            })
        })
        .collect())
}

/// `shortFlights` → `Short Flights`, `totalCO2` → `Total CO2`.
pub fn humanize_key(key: &str) -> String {
    let mut spaced = String::with_capacity(key.len() + 4);
    let mut prev: Option<char> = None;
    for c in key.chars() {
        if c.is_uppercase() {
            if let Some(p) = prev {
                if !p.is_uppercase() && !p.is_whitespace() {
                    spaced.push(' ');
                }
            }
        }
        spaced.push(c);
        prev = Some(c);
    }

    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Sum of all slice values, used to turn slices into shares.
pub fn chart_total(points: &[ChartDataPoint]) -> f64 {
    points.iter().map(|p| p.value).sum()
}
