//! Lenient ClockStatus wire decoding
//!
//! The remote clock service is not under our control and its serializer has
//! varied over firmware versions: key casing differs and some builds emit
//! trailing commas. Decoding therefore tolerates both, and ignores unknown
//! fields.

use contracts::{ClockStatus, ClockTime, ContractError};
use serde::Deserialize;
use serde_json::Value;

/// Wire shape after key folding; field names are compared lowercase.
#[derive(Debug, Default, Deserialize)]
struct WireStatus {
    #[serde(default)]
    time: Option<ClockTime>,
    #[serde(default)]
    isunavailable: bool,
    #[serde(default)]
    isrealtime: bool,
    #[serde(default)]
    ispaused: bool,
}

/// Decode a response body into a `ClockStatus`.
///
/// # Errors
/// Returns `StatusDecode` when the body is not a JSON object or the `time`
/// field does not parse as a time-of-day.
pub fn decode_status(body: &str) -> Result<ClockStatus, ContractError> {
    let cleaned = strip_trailing_separators(body);
    let value: Value = serde_json::from_str(&cleaned)
        .map_err(|e| ContractError::status_decode(format!("invalid json: {e}")))?;
    let folded = fold_keys(value);
    let wire: WireStatus = serde_json::from_value(folded)
        .map_err(|e| ContractError::status_decode(e.to_string()))?;

    Ok(ClockStatus {
        time: wire.time,
        is_unavailable: wire.isunavailable,
        is_realtime: wire.isrealtime,
        is_paused: wire.ispaused,
    })
}

/// Fold all object keys to lowercase, recursively.
fn fold_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| (k.to_ascii_lowercase(), fold_keys(v)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(fold_keys).collect()),
        other => other,
    }
}

/// Remove commas that directly precede a closing `}` or `]`, outside strings.
fn strip_trailing_separators(input: &str) -> String {
    let chars: Vec<char> = input.chars().collect();
    let mut out = String::with_capacity(input.len());
    let mut in_string = false;
    let mut escaped = false;

    for (i, &c) in chars.iter().enumerate() {
        if in_string {
            out.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        match c {
            '"' => {
                in_string = true;
                out.push(c);
            }
            ',' => {
                let next = chars[i + 1..].iter().find(|ch| !ch.is_whitespace());
                if !matches!(next, Some('}') | Some(']')) {
                    out.push(c);
                }
            }
            _ => out.push(c),
        }
    }
    out
}
