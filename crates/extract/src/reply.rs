//! Model reply parsing.
//!
//! The model is asked for a single JSON object. Replies are parsed leniently:
//! code fences and surrounding prose are stripped, labels are normalized, and
//! every field falls back to its default instead of failing.

use parceltrack_core::{Carrier, PackageStatus, ParseResult};
use serde_json::Value;

use crate::client::ExtractError;

/// Instruction sent with every extraction request.
pub const EXTRACTION_PROMPT: &str = "\
You read delivery notifications (SMS, e-mail or screenshots of either) and extract package data.
Answer with exactly one JSON object and nothing else:
{\"trackingNumber\": string or null, \"carrier\": string, \"sender\": string or null, \"status\": string}
- carrier: one of PostNord, GLS, DAO, Bring, DHL, UPS, FedEx, Other.
- sender: the shop or company that sent the package, null if not stated.
- status: READY_FOR_PICKUP if the package can be collected now, otherwise IN_TRANSIT.
- trackingNumber: copy it exactly as written, null if none is present.
If the text is not about a package delivery, answer with null.";

/// Values a model writes when it means "absent".
const NULL_WORDS: [&str; 5] = ["null", "none", "n/a", "unknown", "-"];

/// Parse the model's text reply into a `ParseResult`.
///
/// A literal `null` reply means the model found no package and maps to
/// `ExtractError::NoData`.
pub fn parse_reply(reply: &str) -> Result<ParseResult, ExtractError> {
    let body = strip_fences(reply.trim());
    if body.eq_ignore_ascii_case("null") || body.is_empty() {
        return Err(ExtractError::NoData);
    }

    let json = json_object_slice(body).unwrap_or(body);
    let value: Value = serde_json::from_str(json)
        .map_err(|e| ExtractError::Parse(format!("reply is not JSON: {e}")))?;

    match value {
        Value::Null => Err(ExtractError::NoData),
        Value::Object(obj) => {
            let field = |camel: &str, snake: &str| obj.get(camel).or_else(|| obj.get(snake));

            Ok(ParseResult {
                tracking_number: field("trackingNumber", "tracking_number").and_then(text_value),
                carrier: field("carrier", "carrier")
                    .and_then(text_value)
                    .map(|c| Carrier::from_label(&c))
                    .unwrap_or_default(),
                sender: field("sender", "sender").and_then(text_value),
                status: field("status", "status")
                    .and_then(text_value)
                    .and_then(|s| PackageStatus::from_extracted(&s))
                    .unwrap_or_default(),
            })
        }
        other => Err(ExtractError::Parse(format!(
            "expected a JSON object, got {}",
            kind_name(&other)
        ))),
    }
}

/// String or number as trimmed text; null-ish words and blanks are `None`.
fn text_value(v: &Value) -> Option<String> {
    let s = match v {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    if s.is_empty() || NULL_WORDS.iter().any(|w| s.eq_ignore_ascii_case(w)) {
        None
    } else {
        Some(s)
    }
}

fn strip_fences(s: &str) -> &str {
    let Some(rest) = s.strip_prefix("```") else {
        return s;
    };
    // Drop the info string ("json") on the opening fence line.
    let rest = rest.split_once('\n').map(|(_, body)| body).unwrap_or("");
    rest.trim_end().trim_end_matches("```").trim()
}

fn json_object_slice(s: &str) -> Option<&str> {
    let start = s.find('{')?;
    let end = s.rfind('}')?;
    (end > start).then(|| &s[start..=end])
}

fn kind_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_object() {
        let r = parse_reply(
            r#"{"trackingNumber":"00370716483957214","carrier":"PostNord","sender":"Zalando","status":"READY_FOR_PICKUP"}"#,
        )
        .unwrap();
        assert_eq!(r.tracking_number.as_deref(), Some("00370716483957214"));
        assert_eq!(r.carrier, Carrier::PostNord);
        assert_eq!(r.sender.as_deref(), Some("Zalando"));
        assert_eq!(r.status, PackageStatus::ReadyForPickup);
    }

    #[test]
    fn fenced_reply_with_prose() {
        let reply = "```json\n{\"trackingNumber\": \"TNT123\", \"carrier\": \"gls\"}\n```";
        let r = parse_reply(reply).unwrap();
        assert_eq!(r.tracking_number.as_deref(), Some("TNT123"));
        assert_eq!(r.carrier, Carrier::Gls);
        assert_eq!(r.status, PackageStatus::InTransit);

        let reply = "Here you go: {\"trackingNumber\": \"X1\"} hope it helps";
        assert_eq!(parse_reply(reply).unwrap().tracking_number.as_deref(), Some("X1"));
    }

    #[test]
    fn defaults_for_unknown_labels() {
        let r = parse_reply(r#"{"trackingNumber":"A","carrier":"Budbee","status":"LOST"}"#).unwrap();
        assert_eq!(r.carrier, Carrier::Other);
        assert_eq!(r.status, PackageStatus::InTransit);
    }

    #[test]
    fn null_words_become_absent() {
        let r = parse_reply(r#"{"trackingNumber":"N/A","sender":"  ","carrier":null}"#).unwrap();
        assert!(r.tracking_number.is_none());
        assert!(r.sender.is_none());
        assert_eq!(r.carrier, Carrier::Other);
    }

    #[test]
    fn numeric_tracking_number_and_snake_case_keys() {
        let r = parse_reply(r#"{"tracking_number": 123456789, "sender": "IKEA"}"#).unwrap();
        assert_eq!(r.tracking_number.as_deref(), Some("123456789"));
        assert_eq!(r.sender.as_deref(), Some("IKEA"));
    }

    #[test]
    fn null_reply_is_no_data() {
        assert!(matches!(parse_reply("null"), Err(ExtractError::NoData)));
        assert!(matches!(parse_reply("  "), Err(ExtractError::NoData)));
        assert!(matches!(parse_reply("```json\nnull\n```"), Err(ExtractError::NoData)));
    }

    #[test]
    fn non_object_is_parse_error() {
        assert!(matches!(parse_reply("[1,2]"), Err(ExtractError::Parse(_))));
        assert!(matches!(parse_reply("sorry, no idea"), Err(ExtractError::Parse(_))));
    }
}
