//! Emission calculator: factor table, per-category footprint and bulk
//! `activity,value` sheets.

pub mod bulk;
pub mod factors;
pub mod footprint;

use thiserror::Error;

pub use bulk::{parse_csv, scan_lines, BulkReport, BulkRow};
pub use factors::{factor, flight_factor, Category, EmissionFactor, EMISSION_FACTORS};
pub use footprint::{calculate, CalculatorInput, Footprint, Fuel, TransportMode};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CalculatorError {
    #[error("expected key=value, got '{0}'")]
    Malformed(String),
    #[error("unknown field '{0}'")]
    UnknownField(String),
    #[error("unknown {kind} '{value}'")]
    UnknownChoice { kind: &'static str, value: String },
    #[error("'{field}' must be a non-negative number, got '{value}'")]
    InvalidAmount { field: String, value: String },
    #[error("missing '{0}' column")]
    MissingColumn(&'static str),
    #[error("line {line}: {reason}")]
    InvalidRow { line: usize, reason: String },
}
