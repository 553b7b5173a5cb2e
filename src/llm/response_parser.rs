//! Resilient parsing of model replies into analysis results
//!
//! Models wrap JSON in code fences, preface it with prose, or stop mid-object
//! when they hit the token cap. Parsing here never fails: it tries a direct
//! parse, a heuristic repair, then a structural repair that keeps
//! the deepest valid prefix, and finally returns a fixed fallback.

use log::{debug, warn};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::processing::text_processor::dedupe_preserving_order;

pub const FALLBACK_SCORE: f64 = 50.0;
pub const FALLBACK_KEYWORD: &str = "Analysis unavailable";
pub const FALLBACK_SUMMARY: &str = "The AI response could not be read. Please run the scan again.";
pub const MISSING_SUMMARY: &str = "No summary provided.";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReply {
    pub score: f64,
    pub missing_keywords: Vec<String>,
    pub summary: String,
}

impl AnalysisReply {
    pub fn fallback() -> Self {
        Self {
            score: FALLBACK_SCORE,
            missing_keywords: vec![FALLBACK_KEYWORD.to_string()],
            summary: FALLBACK_SUMMARY.to_string(),
        }
    }
}

/// Which stage produced the parsed value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParsePath {
    Direct,
    HeuristicRepair,
    StructuralRepair,
    Fallback,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedReply {
    pub reply: AnalysisReply,
    pub path: ParsePath,
}

pub struct ResponseParser {
    fence: Regex,
}

impl Default for ResponseParser {
    fn default() -> Self {
        Self::new()
    }
}

impl ResponseParser {
    pub fn new() -> Self {
        let fence = Regex::new(r"```[A-Za-z]*").expect("Invalid fence regex");
        Self { fence }
    }

    /// Best-effort `{score, missingKeywords, summary}`; never fails
    pub fn parse_analysis(&self, raw: &str) -> ParsedReply {
        match self.extract_json(raw) {
            Some((value, path)) => ParsedReply {
                reply: validate_reply(&value),
                path,
            },
            None => {
                warn!("Could not recover JSON from model reply ({} chars), using fallback", raw.len());
                ParsedReply {
                    reply: AnalysisReply::fallback(),
                    path: ParsePath::Fallback,
                }
            }
        }
    }

    /// Recover the first JSON object in a reply
    pub fn extract_json(&self, raw: &str) -> Option<(Value, ParsePath)> {
        let unfenced = self.fence.replace_all(raw, "");
        let start = unfenced.find('{')?;
        let candidate = unfenced[start..].trim_end();

        if let Ok(value) = serde_json::from_str::<Value>(candidate) {
            debug!("Model reply parsed directly");
            return Some((value, ParsePath::Direct));
        }

        if let Ok(value) = serde_json::from_str::<Value>(&trailing_repair(candidate)) {
            debug!("Model reply parsed after heuristic repair");
            return Some((value, ParsePath::HeuristicRepair));
        }

        let repaired = structural_repair(candidate)?;
        match serde_json::from_str::<Value>(&repaired) {
            Ok(value) => {
                debug!("Model reply parsed after structural repair");
                Some((value, ParsePath::StructuralRepair))
            }
            Err(_) => None,
        }
    }
}

/// Close the object based on its last character
fn trailing_repair(candidate: &str) -> String {
    if let Some(without_comma) = candidate.strip_suffix(',') {
        format!("{}}}", without_comma.trim_end())
    } else {
        // quote, bracket, or anything else: the object itself is what is left open
        format!("{}}}", candidate)
    }
}

#[derive(Debug, Clone, Copy)]
enum Frame {
    Object { awaiting_value: bool },
    Array,
}

impl Frame {
    fn closer(&self) -> char {
        match self {
            Frame::Object { .. } => '}',
            Frame::Array => ']',
        }
    }
}

fn closers(stack: &[Frame]) -> String {
    stack.iter().rev().map(Frame::closer).collect()
}

/// Cut back to the deepest point where every value is complete and close all
/// open containers. Returns `None` when nothing of the object survives.
fn structural_repair(candidate: &str) -> Option<String> {
    let bytes = candidate.as_bytes();
    let mut stack: Vec<Frame> = Vec::new();
    let mut safe: Option<(usize, String)> = None;
    let mut in_string = false;
    let mut string_is_key = false;
    let mut escaped = false;
    let mut index = 0;

    while index < bytes.len() {
        let byte = bytes[index];

        if in_string {
            if escaped {
                escaped = false;
            } else if byte == b'\\' {
                escaped = true;
            } else if byte == b'"' {
                in_string = false;
                if !string_is_key {
                    safe = Some((index + 1, closers(&stack)));
                }
            }
            index += 1;
            continue;
        }

        match byte {
            b'"' => {
                in_string = true;
                string_is_key = matches!(stack.last(), Some(Frame::Object { awaiting_value: false }));
            }
            b'{' => {
                stack.push(Frame::Object { awaiting_value: false });
                safe = Some((index + 1, closers(&stack)));
            }
            b'[' => {
                stack.push(Frame::Array);
                safe = Some((index + 1, closers(&stack)));
            }
            b':' => {
                if let Some(Frame::Object { awaiting_value }) = stack.last_mut() {
                    *awaiting_value = true;
                }
            }
            b',' => {
                if let Some(Frame::Object { awaiting_value }) = stack.last_mut() {
                    *awaiting_value = false;
                }
            }
            b'}' | b']' => {
                stack.pop();
                if stack.is_empty() {
                    // complete object; anything after it is trailing prose
                    return Some(candidate[..=index].to_string());
                }
                safe = Some((index + 1, closers(&stack)));
            }
            _ if byte.is_ascii_whitespace() => {}
            _ => {
                let end = bytes[index..]
                    .iter()
                    .position(|b| matches!(b, b',' | b'}' | b']' | b':') || b.is_ascii_whitespace())
                    .map(|offset| index + offset)
                    .unwrap_or(bytes.len());
                let complete = end < bytes.len()
                    && serde_json::from_str::<Value>(&candidate[index..end]).is_ok();
                if complete {
                    safe = Some((end, closers(&stack)));
                }
                index = end;
                continue;
            }
        }
        index += 1;
    }

    // truncated inside a string value: keep it and close the quote
    if in_string && !string_is_key {
        let mut text = candidate.to_string();
        if escaped {
            text.pop();
        }
        let closed = format!("{}\"{}", text, closers(&stack));
        if serde_json::from_str::<Value>(&closed).is_ok() {
            return Some(closed);
        }
    }

    safe.map(|(cut, closing)| format!("{}{}", &candidate[..cut], closing))
}

/// Type-check each field and substitute defaults for anything off-schema
fn validate_reply(value: &Value) -> AnalysisReply {
    let score = match value.get("score") {
        Some(Value::Number(number)) => number.as_f64(),
        Some(Value::String(text)) => text.trim().trim_end_matches('%').trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|score| score.is_finite())
    .map(|score| score.clamp(0.0, 100.0))
    .unwrap_or(0.0);

    let missing_keywords = match value.get("missingKeywords") {
        Some(Value::Array(items)) => dedupe_preserving_order(
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::trim)
                .filter(|keyword| !keyword.is_empty())
                .map(str::to_string),
        ),
        _ => Vec::new(),
    };

    let summary = match value.get("summary") {
        Some(Value::String(summary)) => summary.clone(),
        _ => MISSING_SUMMARY.to_string(),
    };

    AnalysisReply {
        score,
        missing_keywords,
        summary,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(raw: &str) -> ParsedReply {
        ResponseParser::new().parse_analysis(raw)
    }

    #[test]
    fn test_direct_parse() {
        let parsed = parse(r#"{"score": 74, "missingKeywords": ["Docker", "AWS"], "summary": "Solid."}"#);
        assert_eq!(parsed.path, ParsePath::Direct);
        assert_eq!(parsed.reply.score, 74.0);
        assert_eq!(parsed.reply.missing_keywords, vec!["Docker", "AWS"]);
        assert_eq!(parsed.reply.summary, "Solid.");
    }

    #[test]
    fn test_missing_closing_brace_is_repaired() {
        let parsed = parse(r#"{"score": 82, "missingKeywords": ["SQL"], "summary": "ok""#);
        assert_eq!(parsed.reply.score, 82.0);
        assert_eq!(parsed.reply.missing_keywords, vec!["SQL"]);
        assert_eq!(parsed.path, ParsePath::HeuristicRepair);
    }

    #[test]
    fn test_fences_and_prose_are_stripped() {
        let raw = "Sure! Here is the analysis:\n```json\n{\"score\": 61, \"missingKeywords\": [], \"summary\": \"Fine\"}\n```\n";
        let parsed = parse(raw);
        assert_eq!(parsed.path, ParsePath::Direct);
        assert_eq!(parsed.reply.score, 61.0);
    }

    #[test]
    fn test_trailing_comma_repair() {
        let parsed = parse(r#"{"score": 40, "summary": "meh","#);
        assert_eq!(parsed.path, ParsePath::HeuristicRepair);
        assert_eq!(parsed.reply.score, 40.0);
        assert_eq!(parsed.reply.summary, "meh");
    }

    #[test]
    fn test_trailing_bracket_repair() {
        let parsed = parse(r#"{"score": 55, "missingKeywords": ["Go", "gRPC"]"#);
        assert_eq!(parsed.path, ParsePath::HeuristicRepair);
        assert_eq!(parsed.reply.missing_keywords, vec!["Go", "gRPC"]);
    }

    #[test]
    fn test_truncated_inside_array_uses_structural_repair() {
        let parsed = parse(r#"{"score": 67, "missingKeywords": ["Terraform", "Kubern"#);
        assert_eq!(parsed.path, ParsePath::StructuralRepair);
        assert_eq!(parsed.reply.score, 67.0);
        assert_eq!(parsed.reply.missing_keywords, vec!["Terraform", "Kubern"]);
        assert_eq!(parsed.reply.summary, MISSING_SUMMARY);
    }

    #[test]
    fn test_truncated_after_key_drops_dangling_key() {
        let parsed = parse(r#"{"score": 90, "missingKeywords": ["Rust"], "summ"#);
        assert_eq!(parsed.path, ParsePath::StructuralRepair);
        assert_eq!(parsed.reply.score, 90.0);
        assert_eq!(parsed.reply.missing_keywords, vec!["Rust"]);
    }

    #[test]
    fn test_trailing_prose_after_object() {
        let parsed = parse("{\"score\": 12, \"summary\": \"weak\"} Let me know if you need more!");
        assert_eq!(parsed.path, ParsePath::StructuralRepair);
        assert_eq!(parsed.reply.score, 12.0);
    }

    #[test]
    fn test_garbage_returns_fallback() {
        for raw in ["I'm sorry, I can't help with that.", "", "{{{{", "}"] {
            let parsed = parse(raw);
            assert_eq!(parsed.path, ParsePath::Fallback, "input: {raw:?}");
            assert_eq!(parsed.reply, AnalysisReply::fallback());
        }
    }

    #[test]
    fn test_field_validation_defaults() {
        let parsed = parse(r#"{"score": "high", "missingKeywords": "SQL", "summary": 42}"#);
        assert_eq!(parsed.reply.score, 0.0);
        assert!(parsed.reply.missing_keywords.is_empty());
        assert_eq!(parsed.reply.summary, MISSING_SUMMARY);
    }

    #[test]
    fn test_score_is_clamped_and_keywords_cleaned() {
        let parsed = parse(r#"{"score": 140, "missingKeywords": [" SQL ", 3, "", "SQL", "CI/CD"], "summary": "x"}"#);
        assert_eq!(parsed.reply.score, 100.0);
        assert_eq!(parsed.reply.missing_keywords, vec!["SQL", "CI/CD"]);

        let parsed = parse(r#"{"score": "78%"}"#);
        assert_eq!(parsed.reply.score, 78.0);
    }

    #[test]
    fn test_extract_json_for_keyword_replies() {
        let parser = ResponseParser::new();
        let (value, path) = parser
            .extract_json("```json\n{\"Skills\": [\"Rust\", \"Tokio\"]}\n```")
            .unwrap();
        assert_eq!(path, ParsePath::Direct);
        assert_eq!(value["Skills"][1], "Tokio");
        assert!(parser.extract_json("no json here").is_none());
    }
}
