//! Response-directive protocol: control tags embedded in assistant replies.
//!
//! ```text
//! [CARBON_RECEIPT]            (line-anchored, rest of the reply is the receipt)
//! [BADGE_AWARDED:<badgeId>]
//! [CHART_TITLE:<free text>]
//! [PIE_CHART_DATA:{"<key>": <number>, ...}]
//! ```

pub mod chart;
pub mod parser;
pub mod tokenizer;

pub use chart::{ChartDataPoint, DEFAULT_CHART_TITLE};
pub use parser::{parse, Directive, ParsedResponse};
