//! Single-pass tag scanner.
//!
//! Walks the raw response once, left to right, and yields every recognised
//! tag with its byte span and payload. The input is never mutated, so a
//! removed tag can't shift or corrupt the spans of the ones after it.

use std::ops::Range;

pub const RECEIPT_MARKER: &str = "[CARBON_RECEIPT]";
pub const BADGE_TAG_PREFIX: &str = "[BADGE_AWARDED:";
pub const CHART_TITLE_TAG_PREFIX: &str = "[CHART_TITLE:";
pub const CHART_DATA_TAG_PREFIX: &str = "[PIE_CHART_DATA:";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagKind {
    Receipt,
    BadgeAward,
    ChartTitle,
    ChartData,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'a> {
    /// Byte range of the whole tag in the raw text. For a receipt this runs
    /// to the end of the input.
    pub span: Range<usize>,
    pub kind: TagKind,
    pub payload: &'a str,
}

/// Scan `text` for directive tags. A receipt marker ends the scan: everything
/// after it is receipt body, so it is always the last token when present.
pub fn tokenize(text: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut resume_at = 0;

    for (start, _) in text.match_indices('[') {
        if start < resume_at {
            continue;
        }
        let Some(token) = match_tag(text, start) else {
            continue;
        };
        resume_at = token.span.end;
        let is_receipt = token.kind == TagKind::Receipt;
        tokens.push(token);
        if is_receipt {
            break;
        }
    }

    tokens
}

fn match_tag(text: &str, start: usize) -> Option<Token<'_>> {
    let rest = &text[start..];

    if rest.starts_with(RECEIPT_MARKER) {
        if !is_line_anchored(text, start) {
            return None;
        }
        let body_start = start + RECEIPT_MARKER.len();
        return Some(Token {
            span: start..text.len(),
            kind: TagKind::Receipt,
            payload: &text[body_start..],
        });
    }

    if let Some(after) = rest.strip_prefix(BADGE_TAG_PREFIX) {
        let id_len = after
            .bytes()
            .take_while(|b| b.is_ascii_alphanumeric() || *b == b'_')
            .count();
        if id_len == 0 || after.as_bytes().get(id_len) != Some(&b']') {
            return None;
        }
        let payload_start = start + BADGE_TAG_PREFIX.len();
        return Some(Token {
            span: start..payload_start + id_len + 1,
            kind: TagKind::BadgeAward,
            payload: &text[payload_start..payload_start + id_len],
        });
    }

    if let Some(after) = rest.strip_prefix(CHART_TITLE_TAG_PREFIX) {
        let line = current_line(after);
        let close = line.find(']')?;
        let payload_start = start + CHART_TITLE_TAG_PREFIX.len();
        return Some(Token {
            span: start..payload_start + close + 1,
            kind: TagKind::ChartTitle,
            payload: &text[payload_start..payload_start + close],
        });
    }

    if let Some(after) = rest.strip_prefix(CHART_DATA_TAG_PREFIX) {
        // Greedy: the JSON runs to the last `}]` on the line.
        let line = current_line(after);
        if !line.starts_with('{') {
            return None;
        }
        let close = line.rfind("}]")?;
        let payload_start = start + CHART_DATA_TAG_PREFIX.len();
        return Some(Token {
            span: start..payload_start + close + 2,
            kind: TagKind::ChartData,
            payload: &text[payload_start..payload_start + close + 1],
        });
    }

    None
}

fn current_line(text: &str) -> &str {
    match text.find('\n') {
        Some(end) => &text[..end],
        None => text,
    }
}

/// Only spaces or tabs may precede `pos` on its line.
fn is_line_anchored(text: &str, pos: usize) -> bool {
    let line_start = text[..pos].rfind('\n').map_or(0, |i| i + 1);
    text[line_start..pos]
        .chars()
        .all(|c| c == ' ' || c == '\t' || c == '\r')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn yields_tags_in_order_with_spans() {
        let text = "Nice!\n[BADGE_AWARDED:HOME_HERO]\n[CHART_TITLE:Home]\n[PIE_CHART_DATA:{\"a\": 1}]";
        let tokens = tokenize(text);
        let kinds: Vec<TagKind> = tokens.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![TagKind::BadgeAward, TagKind::ChartTitle, TagKind::ChartData]
        );
        assert_eq!(tokens[0].payload, "HOME_HERO");
        assert_eq!(&text[tokens[0].span.clone()], "[BADGE_AWARDED:HOME_HERO]");
        assert_eq!(tokens[1].payload, "Home");
        assert_eq!(tokens[2].payload, "{\"a\": 1}");
        assert_eq!(&text[tokens[2].span.clone()], "[PIE_CHART_DATA:{\"a\": 1}]");
    }

    #[test]
    fn receipt_ends_the_scan() {
        let text = "[CARBON_RECEIPT]\nITEM: Bottle\n[BADGE_AWARDED:HOME_HERO]";
        let tokens = tokenize(text);
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].kind, TagKind::Receipt);
        assert_eq!(tokens[0].payload, "\nITEM: Bottle\n[BADGE_AWARDED:HOME_HERO]");
    }

    #[test]
    fn receipt_marker_mid_line_is_not_a_tag() {
        assert!(tokenize("see [CARBON_RECEIPT] below").is_empty());
        assert_eq!(tokenize("  [CARBON_RECEIPT] body")[0].kind, TagKind::Receipt);
    }

    #[test]
    fn badge_id_must_be_a_single_word() {
        assert!(tokenize("[BADGE_AWARDED:two words]").is_empty());
        assert!(tokenize("[BADGE_AWARDED:]").is_empty());
        assert!(tokenize("[BADGE_AWARDED:OPEN").is_empty());
    }

    #[test]
    fn chart_title_does_not_cross_lines() {
        assert!(tokenize("[CHART_TITLE:Broken\n]").is_empty());
    }

    #[test]
    fn chart_data_takes_the_last_closing_brace() {
        let tokens = tokenize("[PIE_CHART_DATA:{\"a\": {\"b\": 1}}] trailing");
        assert_eq!(tokens[0].payload, "{\"a\": {\"b\": 1}}");
    }

    #[test]
    fn plain_brackets_are_ignored() {
        assert!(tokenize("Use [brackets] and [LINKS](http://x) freely").is_empty());
    }
}
