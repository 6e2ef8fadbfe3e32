//! Turns whatever the model replied with into a complete [`TrainRecord`].
//!
//! The reply may be clean JSON, JSON wrapped in prose or code fences, JSON
//! with small syntax slips, or no JSON at all. Normalization never fails: when
//! nothing can be recovered every field holds [`SENTINEL`].

use crate::domain::model::{TrainRecord, REQUIRED_FIELDS, SENTINEL};
use serde_json::{Map, Value};

/// How much of the record came from the model reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction {
    /// A JSON object was found; `missing` lists the schema fields it lacked.
    Parsed { missing: Vec<&'static str> },
    /// No usable JSON object; every field is the sentinel.
    Fallback,
}

pub fn normalize(raw: &str) -> TrainRecord {
    normalize_with_outcome(raw).0
}

pub fn normalize_with_outcome(raw: &str) -> (TrainRecord, Extraction) {
    match extract_object(raw) {
        Some(object) => {
            let (record, missing) = record_from_object(&object);
            (record, Extraction::Parsed { missing })
        }
        None => (TrainRecord::unspecified(), Extraction::Fallback),
    }
}

fn record_from_object(object: &Map<String, Value>) -> (TrainRecord, Vec<&'static str>) {
    let mut record = TrainRecord::unspecified();
    let mut missing = Vec::new();

    for (name, _) in REQUIRED_FIELDS {
        match object.get(name).and_then(coerce_to_string) {
            Some(value) => {
                if let Some(slot) = record.field_mut(name) {
                    *slot = value;
                }
            }
            None => missing.push(name),
        }
    }

    (record, missing)
}

/// `null` counts as absent; everything else keeps its textual form.
fn coerce_to_string(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) => Some(text.clone()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Number(number) => Some(number.to_string()),
        Value::Array(_) | Value::Object(_) => Some(value.to_string()),
    }
}

fn extract_object(raw: &str) -> Option<Map<String, Value>> {
    let text = raw.trim_start_matches('\u{feff}');
    let start = text.find('{')?;
    let text = &text[start..];

    // 無法解析的候選物件，其內層的 { 不再單獨嘗試
    let mut skip_until = 0;
    for (open, _) in text.char_indices().filter(|(_, ch)| *ch == '{') {
        if open < skip_until {
            continue;
        }
        let Some(end) = matching_brace(text, open) else {
            continue;
        };
        if let Some(object) = parse_candidate(&text[open..=end]) {
            return Some(object);
        }
        skip_until = end + 1;
    }

    // 括號不平衡時退回「第一個 { 到最後一個 }」
    let end = text.rfind('}')?;
    parse_candidate(&text[..=end])
}

/// Strict parse first, then the near-JSON repair on the same candidate.
fn parse_candidate(candidate: &str) -> Option<Map<String, Value>> {
    parse_object(candidate).or_else(|| parse_object(&repair_near_json(candidate)))
}

fn parse_object(candidate: &str) -> Option<Map<String, Value>> {
    match serde_json::from_str::<Value>(candidate).ok()? {
        Value::Object(map) => Some(map),
        _ => None,
    }
}

/// Byte index of the `}` closing the `{` at `start`, skipping braces inside
/// string literals.
fn matching_brace(text: &str, start: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text[start..].char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }

        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(start + offset);
                }
            }
            _ => {}
        }
    }

    None
}

/// Lenient pass for near-JSON: typographic double quotes become ASCII,
/// single-quoted strings become double-quoted, and trailing commas before
/// `}` or `]` are dropped. String contents are left alone otherwise.
fn repair_near_json(text: &str) -> String {
    let text = text.replace(['\u{201c}', '\u{201d}'], "\"");
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for (i, &ch) in chars.iter().enumerate() {
        if let Some(open) = quote {
            if escaped {
                escaped = false;
                if ch == '\'' {
                    // `\'` is not a JSON escape
                    out.pop();
                }
                out.push(ch);
            } else if ch == '\\' {
                escaped = true;
                out.push(ch);
            } else if ch == open {
                quote = None;
                out.push('"');
            } else if ch == '"' {
                out.push_str("\\\"");
            } else {
                out.push(ch);
            }
            continue;
        }

        match ch {
            '"' | '\'' => {
                quote = Some(ch);
                out.push('"');
            }
            ',' if closes_container(&chars[i + 1..]) => {}
            _ => out.push(ch),
        }
    }

    out
}

fn closes_container(rest: &[char]) -> bool {
    matches!(
        rest.iter().find(|ch| !ch.is_whitespace()),
        Some('}') | Some(']')
    )
}
