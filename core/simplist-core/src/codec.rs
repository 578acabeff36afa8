//! JSON codec for the todo list stored under the well-known key.
//!
//! # Wire Format
//!
//! ```json
//! [{ "text": "Buy groceries", "isDone": false }, { "text": "Call mom", "isDone": true }]
//! ```
//!
//! Decoding is best-effort: a value that is not a JSON array decodes to an
//! empty list, and an element without a string `text` and a boolean `isDone`
//! is skipped while its neighbours survive. Encoding writes only those two
//! fields, so any extra fields the host attached are dropped on write-back.

use serde_json::Value;

use crate::error::{Result, SimplistError};
use crate::types::TodoItem;

/// Decodes a stored todo list, tolerating absent, malformed and partial input.
pub fn decode(raw: Option<&str>) -> Vec<TodoItem> {
    let Some(raw) = raw else {
        return Vec::new();
    };

    let parsed: Value = match serde_json::from_str(raw) {
        Ok(value) => value,
        Err(err) => {
            tracing::debug!(error = %err, "Stored todo list is not valid JSON");
            return Vec::new();
        }
    };

    let Value::Array(elements) = parsed else {
        tracing::debug!("Stored todo list is not a JSON array");
        return Vec::new();
    };

    let total = elements.len();
    let items: Vec<TodoItem> = elements.iter().filter_map(decode_item).collect();
    if items.len() < total {
        tracing::debug!(
            total,
            kept = items.len(),
            "Dropped todo entries missing text or isDone"
        );
    }
    items
}

fn decode_item(element: &Value) -> Option<TodoItem> {
    let text = element.get("text")?.as_str()?;
    let is_done = element.get("isDone")?.as_bool()?;
    Some(TodoItem::new(text, is_done))
}

/// Encodes a todo list in the wire format, preserving order.
pub fn encode(items: &[TodoItem]) -> Result<String> {
    serde_json::to_string(items).map_err(|err| SimplistError::json("encode todo list", err))
}
