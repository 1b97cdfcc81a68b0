use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::fragment::{ContentFragment, FragmentKind};
use super::role::Role;
use crate::normalize::normalize;

/// Raw content column written for messages whose content lives in the side table
pub const PLACEHOLDER_CONTENT: &str = "{}";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// A message as stored for a chat
pub struct PersistedMessage {
    pub id: String,
    pub chat_id: String,
    pub role: Role,
    /// The raw content column. Only consulted when `fragments` is empty.
    #[serde(default)]
    pub content: Value,
    #[serde(default)]
    pub fragments: Vec<ContentFragment>,
    pub created_at: DateTime<Utc>,
}

impl PersistedMessage {
    /// The fragments of this message in reconstruction order.
    ///
    /// Messages saved before the content side table existed carry everything in
    /// the raw column; those are run through the normalizer instead.
    pub fn resolved_fragments(&self) -> Vec<ContentFragment> {
        let mut fragments = if self.fragments.is_empty() {
            normalize(&self.content)
        } else {
            self.fragments.clone()
        };
        fragments.sort_by_key(|fragment| fragment.order);
        fragments
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// One row of the per-message content side table
pub struct ContentRow {
    pub message_id: String,
    #[serde(rename = "type")]
    pub kind: FragmentKind,
    pub content: Value,
    pub order: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value", into = "Value")]
/// The content of a freshly streamed response message
pub enum MessageBody {
    Text(String),
    Fragments(Vec<ContentFragment>),
}

impl MessageBody {
    pub fn is_empty(&self) -> bool {
        match self {
            MessageBody::Text(text) => text.is_empty(),
            MessageBody::Fragments(fragments) => fragments.is_empty(),
        }
    }

    pub fn fragments(&self) -> &[ContentFragment] {
        match self {
            MessageBody::Text(_) => &[],
            MessageBody::Fragments(fragments) => fragments,
        }
    }

    pub fn into_fragments(self) -> Vec<ContentFragment> {
        match self {
            MessageBody::Text(text) => vec![ContentFragment::text(text, 0)],
            MessageBody::Fragments(fragments) => fragments,
        }
    }
}

impl From<Value> for MessageBody {
    fn from(value: Value) -> Self {
        match value {
            Value::String(text) => MessageBody::Text(text),
            other => MessageBody::Fragments(
                canonical_fragments(&other).unwrap_or_else(|| normalize(&other)),
            ),
        }
    }
}

/// Fragments already in `{type, content, order}` form keep their order,
/// including gaps. Anything else goes through the normalizer.
fn canonical_fragments(value: &Value) -> Option<Vec<ContentFragment>> {
    let items = value.as_array()?;
    let canonical = !items.is_empty()
        && items
            .iter()
            .all(|item| item.get("content").is_some() && item.get("order").is_some());
    if !canonical {
        return None;
    }
    serde_json::from_value(value.clone()).ok()
}

impl From<MessageBody> for Value {
    fn from(body: MessageBody) -> Self {
        match body {
            MessageBody::Text(text) => Value::String(text),
            MessageBody::Fragments(fragments) => {
                serde_json::to_value(fragments).unwrap_or_else(|_| Value::Array(Vec::new()))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// A message produced by the model provider during one turn
pub struct ResponseMessage {
    pub id: String,
    pub role: Role,
    pub content: MessageBody,
}

impl ResponseMessage {
    pub fn new<S: Into<String>>(id: S, role: Role, content: MessageBody) -> Self {
        Self {
            id: id.into(),
            role,
            content,
        }
    }

    /// Convert into the stored form. The raw column gets the placeholder and the
    /// content moves to the fragment list, which is what the side table receives.
    pub fn into_persisted<S: Into<String>>(
        self,
        chat_id: S,
        created_at: DateTime<Utc>,
    ) -> PersistedMessage {
        PersistedMessage {
            id: self.id,
            chat_id: chat_id.into(),
            role: self.role,
            content: Value::String(PLACEHOLDER_CONTENT.to_string()),
            fragments: self.content.into_fragments(),
            created_at,
        }
    }
}
