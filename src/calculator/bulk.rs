//! Bulk calculator for `activity,value` sheets.
//!
//! Each row is multiplied by the factor of its activity. Unknown activities
//! count as zero emissions and are kept in the report so they can be shown.

use serde::Serialize;

use super::factors::{factor, Category};
use super::footprint::Footprint;
use super::CalculatorError;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BulkRow {
    /// Lowercased activity name.
    pub activity: String,
    pub value: f64,
    pub emissions: f64,
    /// `None` for activities missing from the factor table.
    pub category: Option<Category>,
}

impl BulkRow {
    pub fn new(activity: &str, value: f64) -> Self {
        let activity = activity.trim().to_lowercase();
        match factor(&activity) {
            Some(f) => Self {
                emissions: value * f.kg_per_unit,
                category: Some(f.category),
                activity,
                value,
            },
            None => {
                tracing::warn!("[Calc] No emission factor for '{}', counting 0", activity);
                Self {
                    activity,
                    value,
                    emissions: 0.0,
                    category: None,
                }
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BulkReport {
    pub rows: Vec<BulkRow>,
}

impl BulkReport {
    pub fn total(&self) -> f64 {
        self.rows.iter().map(|r| r.emissions).sum()
    }

    /// Emissions grouped by category; unknown activities are left out.
    pub fn footprint(&self) -> Footprint {
        let mut footprint = Footprint::default();
        for row in &self.rows {
            if let Some(category) = row.category {
                footprint.add(category, row.emissions);
            }
        }
        footprint
    }

    pub fn unknown_activities(&self) -> impl Iterator<Item = &str> {
        self.rows
            .iter()
            .filter(|r| r.category.is_none())
            .map(|r| r.activity.as_str())
    }
}

/// Parse a CSV sheet whose header names an `activity` and a `value` column,
/// in any order and among other columns. Blank lines are skipped.
pub fn parse_csv(input: &str) -> Result<BulkReport, CalculatorError> {
    let mut lines = input
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty());

    let Some((_, header)) = lines.next() else {
        return Err(CalculatorError::MissingColumn("activity"));
    };
    let columns: Vec<String> = split_fields(header)
        .map(|c| c.to_ascii_lowercase())
        .collect();
    let position = |name: &'static str| {
        columns
            .iter()
            .position(|c| c == name)
            .ok_or(CalculatorError::MissingColumn(name))
    };
    let activity_col = position("activity")?;
    let value_col = position("value")?;

    let mut report = BulkReport::default();
    for (line, text) in lines {
        let fields: Vec<&str> = split_fields(text).collect();
        let (Some(activity), Some(raw_value)) = (fields.get(activity_col), fields.get(value_col))
        else {
            return Err(CalculatorError::InvalidRow {
                line,
                reason: format!("expected at least {} fields", activity_col.max(value_col) + 1),
            });
        };
        let value = raw_value
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| CalculatorError::InvalidRow {
                line,
                reason: format!("'{}' is not a number", raw_value),
            })?;
        report.rows.push(BulkRow::new(activity, value));
    }

    tracing::debug!(
        "[Calc] Bulk sheet: {} row(s), {:.2} kg CO₂e",
        report.rows.len(),
        report.total()
    );
    Ok(report)
}

fn split_fields(line: &str) -> impl Iterator<Item = &str> {
    line.split(',').map(|f| f.trim().trim_matches('"'))
}

/// Pick `<activity> <value>` lines out of free text. The separator may be a
/// comma, colon, equals sign or whitespace. Only activities from the factor
/// table are taken; every other line is ignored.
pub fn scan_lines(text: &str) -> BulkReport {
    let rows = text
        .lines()
        .filter_map(|line| {
            let (activity, value) = line
                .trim()
                .split_once(|c: char| c == ',' || c == ':' || c == '=' || c.is_whitespace())?;
            factor(activity)?;
            let value = value.trim_start_matches([',', ':', '=']).trim().parse::<f64>().ok()?;
            value.is_finite().then(|| BulkRow::new(activity, value))
        })
        .collect();
    BulkReport { rows }
}
