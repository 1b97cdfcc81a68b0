//! Joining stored messages with the per-message content side table, and the
//! reverse split used when a message is saved.
use std::collections::HashMap;

use serde_json::{Map, Value};

use crate::models::fragment::{ContentFragment, FragmentKind};
use crate::models::message::{ContentRow, PersistedMessage};
use crate::normalize::normalize;

/// Attach a message's content rows as its fragments.
///
/// Rows are taken in `order`. Each fragment keeps the order of the row it came
/// from, so gaps left by earlier writes survive.
pub fn hydrate(mut message: PersistedMessage, mut rows: Vec<ContentRow>) -> PersistedMessage {
    rows.retain(|row| row.message_id == message.id);
    if rows.is_empty() {
        return message;
    }
    rows.sort_by_key(|row| row.order);

    let parts: Vec<Value> = rows.iter().map(row_part).collect();
    message.fragments = normalize(&Value::Array(parts))
        .into_iter()
        .zip(&rows)
        .map(|(fragment, row)| ContentFragment::new(fragment.content, row.order))
        .collect();
    message
}

/// Hydrate a batch of messages from one query's worth of rows
pub fn hydrate_all(
    messages: Vec<PersistedMessage>,
    rows: Vec<ContentRow>,
) -> Vec<PersistedMessage> {
    let mut by_message: HashMap<String, Vec<ContentRow>> = HashMap::new();
    for row in rows {
        by_message.entry(row.message_id.clone()).or_default().push(row);
    }

    messages
        .into_iter()
        .map(|message| {
            let rows = by_message.remove(&message.id).unwrap_or_default();
            hydrate(message, rows)
        })
        .collect()
}

/// Split fragments into side table rows for `message_id`
pub fn to_rows(message_id: &str, fragments: &[ContentFragment]) -> Vec<ContentRow> {
    fragments
        .iter()
        .map(|fragment| ContentRow {
            message_id: message_id.to_string(),
            kind: fragment.kind(),
            content: fragment.content.clone().into_payload(),
            order: fragment.order,
        })
        .collect()
}

/// Rebuild the array element a row was written from. Older tool rows hold
/// their fields as a json encoded string, newer ones as an object. Text and
/// reasoning rows hold the value itself.
fn row_part(row: &ContentRow) -> Value {
    let mut part = Map::new();
    part.insert("type".to_string(), Value::String(row.kind.to_string()));

    let fields = match (row.kind, &row.content) {
        (FragmentKind::ToolCall | FragmentKind::ToolResult, Value::Object(fields)) => {
            Some(fields.clone())
        }
        (FragmentKind::ToolCall | FragmentKind::ToolResult, Value::String(raw)) => {
            match serde_json::from_str::<Value>(raw) {
                Ok(Value::Object(fields)) => Some(fields),
                _ => None,
            }
        }
        _ => None,
    };

    match fields {
        Some(fields) => part.extend(fields),
        None => {
            part.insert("content".to_string(), row.content.clone());
        }
    }

    Value::Object(part)
}
