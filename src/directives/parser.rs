//! Turns a raw assistant response into display text plus directives.
//!
//! `parse` is pure: no I/O, no state. Badge validity is checked against the
//! static catalog and the caller-supplied unlocked set, so an award that
//! would be a no-op never leaves the parser.

use std::ops::Range;

use serde::Serialize;

use super::chart::{parse_chart_data, ChartDataPoint};
use super::tokenizer::{tokenize, TagKind, Token};
use crate::gamification::catalog;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Directive {
    Receipt(String),
    BadgeAward(String),
    ChartTitle(String),
    ChartData(Vec<ChartDataPoint>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParsedResponse {
    pub cleaned_text: String,
    pub directives: Vec<Directive>,
}

impl ParsedResponse {
    pub fn receipt(&self) -> Option<&str> {
        self.directives.iter().find_map(|d| match d {
            Directive::Receipt(body) => Some(body.as_str()),
            _ => None,
        })
    }

    pub fn badge_award(&self) -> Option<&str> {
        self.directives.iter().find_map(|d| match d {
            Directive::BadgeAward(id) => Some(id.as_str()),
            _ => None,
        })
    }

    pub fn chart_title(&self) -> Option<&str> {
        self.directives.iter().find_map(|d| match d {
            Directive::ChartTitle(title) => Some(title.as_str()),
            _ => None,
        })
    }

    pub fn chart_data(&self) -> Option<&[ChartDataPoint]> {
        self.directives.iter().find_map(|d| match d {
            Directive::ChartData(points) => Some(points.as_slice()),
            _ => None,
        })
    }
}

pub fn parse(raw: &str, already_unlocked: &[String]) -> ParsedResponse {
    let tokens = tokenize(raw);
    if tokens.is_empty() {
        return ParsedResponse {
            cleaned_text: raw.to_string(),
            directives: Vec::new(),
        };
    }

    // A receipt short-circuits everything else.
    if let Some(receipt) = tokens.iter().find(|t| t.kind == TagKind::Receipt) {
        let body = receipt.payload.trim().to_string();
        return ParsedResponse {
            cleaned_text: body.clone(),
            directives: vec![Directive::Receipt(body)],
        };
    }

    let mut directives = Vec::new();
    let mut seen_badge = false;
    let mut seen_title = false;
    let mut seen_chart = false;

    for token in &tokens {
        match token.kind {
            TagKind::BadgeAward if !seen_badge => {
                seen_badge = true;
                if let Some(directive) = badge_directive(token, already_unlocked) {
                    directives.push(directive);
                }
            }
            TagKind::ChartTitle if !seen_title => {
                seen_title = true;
                let title = token.payload.trim();
                if !title.is_empty() {
                    directives.push(Directive::ChartTitle(title.to_string()));
                }
            }
            TagKind::ChartData if !seen_chart => {
                seen_chart = true;
                match parse_chart_data(token.payload) {
                    Ok(points) if !points.is_empty() => {
                        directives.push(Directive::ChartData(points));
                    }
                    Ok(_) => {
                        tracing::debug!("[Directives] Chart data had no positive entries");
                    }
                    Err(e) => {
                        tracing::warn!("[Directives] Dropping malformed chart data: {}", e);
                    }
                }
            }
            _ => {
                tracing::debug!("[Directives] Ignoring repeated {:?} tag", token.kind);
            }
        }
    }

    let spans: Vec<Range<usize>> = tokens.iter().map(|t| t.span.clone()).collect();
    ParsedResponse {
        cleaned_text: strip_spans(raw, &spans),
        directives,
    }
}

fn badge_directive(token: &Token<'_>, already_unlocked: &[String]) -> Option<Directive> {
    let id = token.payload;
    if catalog::badge(id).is_none() {
        tracing::debug!("[Directives] Unknown badge id '{}'", id);
        return None;
    }
    if already_unlocked.iter().any(|unlocked| unlocked == id) {
        tracing::debug!("[Directives] Badge '{}' already unlocked", id);
        return None;
    }
    Some(Directive::BadgeAward(id.to_string()))
}

/// Remove every span (spans are single-line and sorted). A line left blank by
/// the removal is dropped entirely; the result is trimmed.
fn strip_spans(text: &str, spans: &[Range<usize>]) -> String {
    let mut out = String::with_capacity(text.len());
    let mut line_start = 0;

    for line in text.split_inclusive('\n') {
        let line_end = line_start + line.len();
        let mut kept = String::with_capacity(line.len());
        let mut cursor = line_start;
        let mut removed_any = false;

        for span in spans
            .iter()
            .filter(|s| s.start >= line_start && s.end <= line_end)
        {
            kept.push_str(&text[cursor..span.start]);
            cursor = span.end;
            removed_any = true;
        }
        kept.push_str(&text[cursor..line_end]);

        if !(removed_any && kept.trim().is_empty()) {
            out.push_str(&kept);
        }
        line_start = line_end;
    }

    out.trim().to_string()
}
