//! The line based data stream used between the chat route and the interface.
//!
//! Every line is `<code>:<json>`. The codes handled here:
//! - `0` text delta, a json string
//! - `2` data, a json array (suggestions travel here)
//! - `3` error, a json string
//! - `9` tool call, `{toolCallId, toolName, args}`
//! - `a` tool result, `{toolCallId, result}` with an optional `toolName`
//! - `g` reasoning, a json string
//! - `d` finish, `{finishReason, usage}`
//! - `8` message annotations, `e` step finish, `f` step start
//!
//! Tool call streaming (`b`, `c`), sources (`h`), redacted reasoning (`i`),
//! reasoning signatures (`j`) and files (`k`) are decoded as passthrough parts.
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::errors::{ProtocolError, ProtocolResult};
use crate::models::event::{FinishReason, StreamEvent};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct FinishPart {
    finish_reason: FinishReason,
}

const PASSTHROUGH_CODES: [&str; 6] = ["b", "c", "h", "i", "j", "k"];

/// Decode a single stream line
pub fn parse_line(line: &str) -> ProtocolResult<StreamEvent> {
    let line = line.trim_end_matches(['\r', '\n']);
    let (code, payload) = line
        .split_once(':')
        .ok_or_else(|| ProtocolError::MissingSeparator(line.to_string()))?;

    let event = match code {
        "0" => StreamEvent::TextDelta(decode(code, payload)?),
        "2" => StreamEvent::Data(decode(code, payload)?),
        "3" => StreamEvent::Error(decode(code, payload)?),
        "9" => StreamEvent::ToolCall(decode(code, payload)?),
        "a" => StreamEvent::ToolResult(decode(code, payload)?),
        "g" => StreamEvent::Reasoning(decode(code, payload)?),
        "d" => StreamEvent::Finish(decode::<FinishPart>(code, payload)?.finish_reason),
        "8" => StreamEvent::Annotations(decode(code, payload)?),
        "e" => StreamEvent::FinishStep(decode(code, payload)?),
        "f" => StreamEvent::StartStep(decode(code, payload)?),
        other if PASSTHROUGH_CODES.contains(&other) => StreamEvent::Passthrough {
            code: other.to_string(),
            payload: decode(code, payload)?,
        },
        other => return Err(ProtocolError::UnknownCode(other.to_string())),
    };
    Ok(event)
}

/// Decode every non blank line of a stream body
pub fn decode_stream(body: &str) -> impl Iterator<Item = ProtocolResult<StreamEvent>> + '_ {
    body.lines()
        .filter(|line| !line.trim().is_empty())
        .map(parse_line)
}

/// Encode an event as a stream line, including the trailing newline
pub fn format_event(event: &StreamEvent) -> String {
    match event {
        StreamEvent::TextDelta(text) => format_part("0", &json!(text)),
        StreamEvent::Data(Value::Array(items)) => format_part("2", &json!(items)),
        StreamEvent::Data(other) => format_part("2", &json!([other])),
        StreamEvent::Suggestion(suggestion) => format_part(
            "2",
            &json!([{
                "type": "suggestion",
                "content": suggestion
            }]),
        ),
        StreamEvent::Annotations(annotations) => format_part("8", annotations),
        StreamEvent::FinishStep(step) => format_part("e", step),
        StreamEvent::StartStep(step) => format_part("f", step),
        StreamEvent::Passthrough { code, payload } => format_part(code, payload),
        StreamEvent::Error(message) => format_part("3", &json!(message)),
        StreamEvent::ToolCall(call) => format_part("9", &json!(call)),
        StreamEvent::ToolResult(result) => format_part("a", &json!(result)),
        StreamEvent::Reasoning(text) => format_part("g", &json!(text)),
        StreamEvent::Finish(reason) => format_part(
            "d",
            &json!({
                "finishReason": reason,
                "usage": {
                    "promptTokens": 0,
                    "completionTokens": 0
                }
            }),
        ),
    }
}

fn format_part(code: &str, payload: &Value) -> String {
    format!("{}:{}\n", code, payload)
}

fn decode<T: DeserializeOwned>(code: &str, payload: &str) -> ProtocolResult<T> {
    serde_json::from_str(payload).map_err(|source| ProtocolError::InvalidPayload {
        code: code.to_string(),
        source,
    })
}
