//! Offline backend: a tiny keyword knowledge base and the emission
//! calculator, both available without network access.

use async_trait::async_trait;

use super::provider::{GenerationError, GenerationProvider, GenerationSession, ImageAttachment};
use crate::calculator::{scan_lines, BulkReport};

/// Checked in order; the first key contained in the question wins.
const LOCAL_KB: &[(&str, &str)] = &[
    (
        "renewable energy",
        "Renewable energy includes solar, wind, hydro, and geothermal sources.",
    ),
    (
        "solar panel",
        "Solar panels convert sunlight into usable electricity.",
    ),
    (
        "reduce electricity",
        "Use LED bulbs, energy-efficient appliances, and unplug devices.",
    ),
    (
        "carbon footprint",
        "Carbon footprint = total greenhouse gases produced by an activity.",
    ),
];

pub const NO_OFFLINE_ANSWER: &str =
    "No exact offline answer found. Try asking about renewable energy, solar panels, or electricity saving.";

pub fn local_answer(question: &str) -> &'static str {
    let question = question.to_lowercase();
    LOCAL_KB
        .iter()
        .find(|(key, _)| question.contains(key))
        .map(|(_, answer)| *answer)
        .unwrap_or(NO_OFFLINE_ANSWER)
}

/// Reply for a message listing `<activity> <value>` lines: the per-category
/// summary followed by chart tags for the renderer.
pub fn calculated_answer(report: &BulkReport) -> String {
    let footprint = report.footprint();
    let mut reply = format!("Here's your estimate:\n{}", footprint.summary());
    let unknown: Vec<&str> = report.unknown_activities().collect();
    if !unknown.is_empty() {
        reply.push_str(&format!("\nNo factor for: {}", unknown.join(", ")));
    }
    reply.push('\n');
    reply.push_str(&footprint.chart_tags());
    reply
}

#[derive(Debug, Default)]
pub struct OfflineProvider;

impl GenerationProvider for OfflineProvider {
    fn id(&self) -> &str {
        "offline"
    }

    fn open_session(&self, _system_instruction: &str) -> Box<dyn GenerationSession> {
        Box::new(OfflineSession)
    }
}

struct OfflineSession;

#[async_trait]
impl GenerationSession for OfflineSession {
    async fn send(
        &mut self,
        text: &str,
        _image: Option<&ImageAttachment>,
    ) -> Result<String, GenerationError> {
        let report = scan_lines(text);
        if report.rows.is_empty() {
            return Ok(local_answer(text).to_string());
        }
        tracing::debug!("[Offline] Calculating {} activity line(s)", report.rows.len());
        Ok(calculated_answer(&report))
    }
}
