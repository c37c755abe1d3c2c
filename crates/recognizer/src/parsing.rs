//! Parsing of model output into receipt rows.
//!
//! The model is asked for
//!
//! ```json
//! {"menus": [{"name": "...", "count": 1, "price": 12.5}], "total": 13.75}
//! ```
//!
//! where `price` is the line total. Models wrap JSON in Markdown fences and
//! are loose with types (numbers as strings, missing counts), so parsing
//! accepts both shapes and defaults a missing count to 1.

use engine::{MoneyCents, ReceiptRow};
use serde::Deserialize;
use serde_json::Value;

use crate::{RecognitionError, RecognizedReceipt};

#[derive(Debug, Deserialize)]
struct RawReceipt {
    #[serde(default)]
    menus: Vec<RawItem>,
    total: Value,
}

#[derive(Debug, Deserialize)]
struct RawItem {
    name: Value,
    #[serde(default)]
    count: Option<Value>,
    price: Value,
}

/// Removes Markdown code fences (```` ```json ```` / ```` ``` ````).
pub(crate) fn strip_code_fences(text: &str) -> String {
    text.replace("```json", "").replace("```", "").trim().to_string()
}

pub(crate) fn parse_receipt_text(text: &str) -> Result<RecognizedReceipt, RecognitionError> {
    let cleaned = strip_code_fences(text);
    let raw: RawReceipt = serde_json::from_str(&cleaned)
        .map_err(|err| RecognitionError::MalformedResponse(format!("{err}: {cleaned}")))?;

    let rows = raw
        .menus
        .into_iter()
        .map(|item| {
            Ok(ReceiptRow {
                name: text_value(&item.name),
                count: match item.count {
                    None | Some(Value::Null) => 1,
                    Some(count) => count_value(&count)?,
                },
                total_price: money_value(&item.price)?,
            })
        })
        .collect::<Result<Vec<_>, RecognitionError>>()?;

    Ok(RecognizedReceipt {
        rows,
        total: money_value(&raw.total)?,
    })
}

fn text_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.trim().to_string(),
        other => other.to_string(),
    }
}

fn count_value(value: &Value) -> Result<i64, RecognitionError> {
    let malformed = || RecognitionError::MalformedResponse(format!("invalid count: {value}"));
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64))
            .ok_or_else(malformed),
        Value::String(s) => s.trim().parse().map_err(|_| malformed()),
        _ => Err(malformed()),
    }
}

fn money_value(value: &Value) -> Result<MoneyCents, RecognitionError> {
    let malformed = |reason: String| {
        RecognitionError::MalformedResponse(format!("invalid amount {value}: {reason}"))
    };
    match value {
        Value::Number(n) => {
            let major = n
                .as_f64()
                .ok_or_else(|| malformed("not a number".to_string()))?;
            MoneyCents::from_major_f64(major).map_err(|err| malformed(err.to_string()))
        }
        Value::String(s) => s.parse().map_err(|err: engine::EngineError| malformed(err.to_string())),
        _ => Err(malformed("not a number".to_string())),
    }
}
