//! Conversion of raw message content into ordered fragments.
//!
//! Content has been stored in several shapes over time: plain strings, json
//! encoded arrays, sdk part arrays using `tool-call` style tags, and rows that
//! nest the tool fields under `content`. All of that is read here and nowhere
//! else. Nothing in this module fails; content that cannot be understood is
//! kept as a text fragment.
use serde_json::Value;

use crate::models::fragment::{ContentFragment, FragmentContent, FragmentKind, ToolCall, ToolResult};

/// Normalize any raw content value into fragments ordered from zero
pub fn normalize(raw: &Value) -> Vec<ContentFragment> {
    match raw {
        Value::String(text) => normalize_str(text),
        Value::Array(items) => normalize_items(items),
        other => vec![ContentFragment::new(FragmentContent::Text(other.clone()), 0)],
    }
}

/// Normalize content held in a string, which may or may not be json
pub fn normalize_str(raw: &str) -> Vec<ContentFragment> {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Array(items)) => normalize_items(&items),
        Ok(parsed) => vec![ContentFragment::new(FragmentContent::Text(parsed), 0)],
        Err(_) => vec![ContentFragment::text(raw, 0)],
    }
}

/// Encode fragments in the form `normalize` reads back unchanged. Orders are
/// reassigned from the array index on the way back, so this holds for
/// fragments numbered from zero without gaps.
pub fn to_json_string(fragments: &[ContentFragment]) -> String {
    serde_json::to_string(fragments).unwrap_or_else(|_| String::from("[]"))
}

fn normalize_items(items: &[Value]) -> Vec<ContentFragment> {
    items
        .iter()
        .enumerate()
        .map(|(order, item)| LegacyPart::new(item).into_fragment(order))
        .collect()
}

/// One element of a stored or sdk content array, before normalization
struct LegacyPart<'a> {
    kind: FragmentKind,
    item: &'a Value,
}

impl<'a> LegacyPart<'a> {
    fn new(item: &'a Value) -> Self {
        Self {
            kind: FragmentKind::from_tag(item.get("type").and_then(Value::as_str)),
            item,
        }
    }

    fn into_fragment(self, order: usize) -> ContentFragment {
        let content = match self.kind {
            FragmentKind::ToolCall => FragmentContent::ToolCall(ToolCall {
                tool_call_id: self.string_field("toolCallId"),
                tool_name: self.string_field("toolName"),
                args: self.field("args").cloned().unwrap_or(Value::Null),
            }),
            FragmentKind::ToolResult => FragmentContent::ToolResult(ToolResult {
                tool_call_id: self.string_field("toolCallId"),
                tool_name: self.string_field("toolName"),
                result: self.field("result").cloned().unwrap_or(Value::Null),
            }),
            FragmentKind::Reasoning => {
                let value = self
                    .field("reasoning")
                    .or_else(|| self.direct("text"))
                    .or_else(|| self.direct("content"))
                    .unwrap_or(self.item);
                FragmentContent::Reasoning(match value {
                    Value::String(text) => text.clone(),
                    other => other.to_string(),
                })
            }
            // an explicit null `content` is the value itself
            FragmentKind::Text => FragmentContent::Text(
                self.direct("text")
                    .or_else(|| self.item.get("content"))
                    .unwrap_or(self.item)
                    .clone(),
            ),
        };
        ContentFragment::new(content, order)
    }

    fn direct(&self, name: &str) -> Option<&'a Value> {
        self.item.get(name).filter(|value| !value.is_null())
    }

    /// A field read from the element itself, falling back to a nested `content` object
    fn field(&self, name: &str) -> Option<&'a Value> {
        self.direct(name).or_else(|| {
            self.item
                .get("content")
                .and_then(|nested| nested.get(name))
                .filter(|value| !value.is_null())
        })
    }

    fn string_field(&self, name: &str) -> String {
        match self.field(name) {
            Some(Value::String(text)) => text.clone(),
            Some(other) => other.to_string(),
            None => String::new(),
        }
    }
}
