use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use strum_macros::{AsRefStr, Display};

/// A request from the model to run a tool
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolCall {
    #[serde(default)]
    pub tool_call_id: String,
    #[serde(default)]
    pub tool_name: String,
    #[serde(default)]
    pub args: Value,
}

impl ToolCall {
    pub fn new<I: Into<String>, N: Into<String>>(
        tool_call_id: I,
        tool_name: N,
        args: Value,
    ) -> Self {
        Self {
            tool_call_id: tool_call_id.into(),
            tool_name: tool_name.into(),
            args,
        }
    }
}

/// The output of a tool run, paired with its call by `tool_call_id`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolResult {
    #[serde(default)]
    pub tool_call_id: String,
    #[serde(default)]
    pub tool_name: String,
    #[serde(default)]
    pub result: Value,
}

impl ToolResult {
    pub fn new<I: Into<String>, N: Into<String>>(
        tool_call_id: I,
        tool_name: N,
        result: Value,
    ) -> Self {
        Self {
            tool_call_id: tool_call_id.into(),
            tool_name: tool_name.into(),
            result,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, AsRefStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum FragmentKind {
    Text,
    ToolCall,
    ToolResult,
    Reasoning,
}

impl FragmentKind {
    /// Map a stored or sdk type tag onto a kind. Both `tool-call` and `tool_call`
    /// spellings occur in stored data; anything unknown is read as text.
    pub fn from_tag(tag: Option<&str>) -> Self {
        match tag {
            Some("tool_call") | Some("tool-call") => FragmentKind::ToolCall,
            Some("tool_result") | Some("tool-result") => FragmentKind::ToolResult,
            Some("reasoning") => FragmentKind::Reasoning,
            _ => FragmentKind::Text,
        }
    }
}

/// Stored rows carry whatever tag the writer saw, so decoding never fails:
/// unknown or missing tags read as text.
impl<'de> Deserialize<'de> for FragmentKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = Option::<String>::deserialize(deserializer)?;
        Ok(FragmentKind::from_tag(tag.as_deref()))
    }
}

#[derive(Debug, Clone, PartialEq)]
/// The payload of a fragment
pub enum FragmentContent {
    /// Usually a string. Legacy rows may hold any json value here.
    Text(Value),
    ToolCall(ToolCall),
    ToolResult(ToolResult),
    Reasoning(String),
}

impl FragmentContent {
    pub fn kind(&self) -> FragmentKind {
        match self {
            FragmentContent::Text(_) => FragmentKind::Text,
            FragmentContent::ToolCall(_) => FragmentKind::ToolCall,
            FragmentContent::ToolResult(_) => FragmentKind::ToolResult,
            FragmentContent::Reasoning(_) => FragmentKind::Reasoning,
        }
    }

    /// The json stored in the `content` column for this payload
    pub fn into_payload(self) -> Value {
        match self {
            FragmentContent::Text(value) => value,
            FragmentContent::ToolCall(call) => serde_json::to_value(call).unwrap_or(Value::Null),
            FragmentContent::ToolResult(result) => {
                serde_json::to_value(result).unwrap_or(Value::Null)
            }
            FragmentContent::Reasoning(text) => Value::String(text),
        }
    }
}

/// One normalized unit of message content.
///
/// `order` positions the fragment within its message. It is unique per message
/// but not necessarily contiguous, so consumers sort by it rather than index by it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "FragmentRepr", into = "FragmentRepr")]
pub struct ContentFragment {
    pub content: FragmentContent,
    pub order: usize,
}

impl ContentFragment {
    pub fn new(content: FragmentContent, order: usize) -> Self {
        Self { content, order }
    }

    pub fn text<S: Into<String>>(text: S, order: usize) -> Self {
        Self::new(FragmentContent::Text(Value::String(text.into())), order)
    }

    pub fn tool_call(call: ToolCall, order: usize) -> Self {
        Self::new(FragmentContent::ToolCall(call), order)
    }

    pub fn tool_result(result: ToolResult, order: usize) -> Self {
        Self::new(FragmentContent::ToolResult(result), order)
    }

    pub fn reasoning<S: Into<String>>(reasoning: S, order: usize) -> Self {
        Self::new(FragmentContent::Reasoning(reasoning.into()), order)
    }

    pub fn kind(&self) -> FragmentKind {
        self.content.kind()
    }

    pub fn as_tool_call(&self) -> Option<&ToolCall> {
        if let FragmentContent::ToolCall(ref call) = self.content {
            Some(call)
        } else {
            None
        }
    }

    pub fn as_tool_result(&self) -> Option<&ToolResult> {
        if let FragmentContent::ToolResult(ref result) = self.content {
            Some(result)
        } else {
            None
        }
    }

    /// The text as it should be rendered. Numbers and booleans are printed;
    /// objects, arrays and null have no textual form and render as empty.
    pub fn as_text(&self) -> Option<String> {
        match &self.content {
            FragmentContent::Text(value) => Some(render_text(value)),
            _ => None,
        }
    }
}

pub(crate) fn render_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Number(number) => number.to_string(),
        Value::Bool(flag) => flag.to_string(),
        Value::Null | Value::Array(_) | Value::Object(_) => String::new(),
    }
}

/// Serialized shape of a fragment: `{"type", "content", "order"}`
#[derive(Serialize, Deserialize)]
struct FragmentRepr {
    #[serde(rename = "type")]
    kind: FragmentKind,
    #[serde(default)]
    content: Value,
    #[serde(default)]
    order: usize,
}

impl TryFrom<FragmentRepr> for ContentFragment {
    type Error = serde_json::Error;

    fn try_from(repr: FragmentRepr) -> Result<Self, Self::Error> {
        let content = match repr.kind {
            FragmentKind::Text => FragmentContent::Text(repr.content),
            FragmentKind::ToolCall => FragmentContent::ToolCall(serde_json::from_value(repr.content)?),
            FragmentKind::ToolResult => {
                FragmentContent::ToolResult(serde_json::from_value(repr.content)?)
            }
            FragmentKind::Reasoning => FragmentContent::Reasoning(match repr.content {
                Value::String(text) => text,
                other => other.to_string(),
            }),
        };
        Ok(ContentFragment::new(content, repr.order))
    }
}

impl From<ContentFragment> for FragmentRepr {
    fn from(fragment: ContentFragment) -> Self {
        FragmentRepr {
            kind: fragment.kind(),
            content: fragment.content.into_payload(),
            order: fragment.order,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_tag_accepts_both_spellings() {
        assert_eq!(FragmentKind::from_tag(Some("tool-call")), FragmentKind::ToolCall);
        assert_eq!(FragmentKind::from_tag(Some("tool_call")), FragmentKind::ToolCall);
        assert_eq!(FragmentKind::from_tag(Some("tool-result")), FragmentKind::ToolResult);
        assert_eq!(FragmentKind::from_tag(Some("tool_result")), FragmentKind::ToolResult);
        assert_eq!(FragmentKind::from_tag(Some("reasoning")), FragmentKind::Reasoning);
        assert_eq!(FragmentKind::from_tag(Some("image")), FragmentKind::Text);
        assert_eq!(FragmentKind::from_tag(None), FragmentKind::Text);
    }

    #[test]
    fn test_kind_decoding_never_fails() {
        let kinds: Vec<FragmentKind> =
            serde_json::from_value(json!(["tool-call", "tool_result", "image", null])).unwrap();
        assert_eq!(
            kinds,
            vec![
                FragmentKind::ToolCall,
                FragmentKind::ToolResult,
                FragmentKind::Text,
                FragmentKind::Text
            ]
        );
    }

    #[test]
    fn test_serialized_shape() {
        let call = ToolCall::new("a", "getWeather", json!({"city": "Oslo"}));
        let fragment = ContentFragment::tool_call(call, 2);
        assert_eq!(
            serde_json::to_value(&fragment).unwrap(),
            json!({
                "type": "tool_call",
                "content": {"toolCallId": "a", "toolName": "getWeather", "args": {"city": "Oslo"}},
                "order": 2
            })
        );
    }

    #[test]
    fn test_deserialize_tool_result() {
        let fragment: ContentFragment = serde_json::from_value(json!({
            "type": "tool_result",
            "content": {"toolCallId": "a", "result": 42},
            "order": 1
        }))
        .unwrap();

        let result = fragment.as_tool_result().unwrap();
        assert_eq!(result.tool_call_id, "a");
        assert_eq!(result.tool_name, "");
        assert_eq!(result.result, json!(42));
        assert_eq!(fragment.order, 1);
    }

    #[test]
    fn test_as_text_renders_scalars_only() {
        assert_eq!(ContentFragment::text("hi", 0).as_text().as_deref(), Some("hi"));
        let number = ContentFragment::new(FragmentContent::Text(json!(42)), 0);
        assert_eq!(number.as_text().as_deref(), Some("42"));
        let object = ContentFragment::new(FragmentContent::Text(json!({})), 0);
        assert_eq!(object.as_text().as_deref(), Some(""));
        assert_eq!(ContentFragment::reasoning("hmm", 0).as_text(), None);
    }
}
