use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::fragment::{ToolCall, ToolResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FinishReason {
    Stop,
    Length,
    ContentFilter,
    ToolCalls,
    Error,
    Other,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "content", rename_all = "kebab-case")]
/// One event of a streamed model response, in delivery order
pub enum StreamEvent {
    TextDelta(String),
    ToolCall(ToolCall),
    ToolResult(ToolResult),
    Reasoning(String),
    /// Document suggestions produced by tools while the turn runs
    Suggestion(Value),
    Data(Value),
    /// Message annotations (`8`)
    Annotations(Value),
    StartStep(Value),
    FinishStep(Value),
    /// A part the reconciler has no use for, such as tool call deltas,
    /// sources and files, kept so it can be forwarded unchanged
    Passthrough { code: String, payload: Value },
    Error(String),
    Finish(FinishReason),
}

impl StreamEvent {
    pub fn text_delta<S: Into<String>>(text: S) -> Self {
        StreamEvent::TextDelta(text.into())
    }

    pub fn reasoning<S: Into<String>>(text: S) -> Self {
        StreamEvent::Reasoning(text.into())
    }

    pub fn finish() -> Self {
        StreamEvent::Finish(FinishReason::Stop)
    }
}
