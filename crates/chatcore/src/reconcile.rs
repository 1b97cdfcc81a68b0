use std::collections::HashMap;

use serde::Serialize;

use crate::models::event::StreamEvent;
use crate::models::role::Role;
use crate::models::ui::{ToolInvocation, UIMessage};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamState {
    Empty,
    Streaming,
    Finalized,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    Applied,
    /// The message was already finalized
    Ignored,
}

/// An assistant message being assembled from stream events.
///
/// Events must be applied one at a time in arrival order. There is no timeout
/// here: if the transport stops before `finish` the message simply stays in
/// `Streaming`, and the consumer decides whether to keep or discard it.
#[derive(Debug, Clone)]
pub struct StreamingMessage {
    message: UIMessage,
    state: StreamState,
    /// Invocation index by call id
    invocations: HashMap<String, usize>,
}

impl StreamingMessage {
    pub fn new<S: Into<String>>(id: S) -> Self {
        Self {
            message: UIMessage::new(id, Role::Assistant),
            state: StreamState::Empty,
            invocations: HashMap::new(),
        }
    }

    /// Start a message with a freshly generated id
    pub fn generate() -> Self {
        Self::new(uuid::Uuid::new_v4().to_string())
    }

    pub fn state(&self) -> StreamState {
        self.state
    }

    pub fn message(&self) -> &UIMessage {
        &self.message
    }

    pub fn into_message(self) -> UIMessage {
        self.message
    }

    pub fn apply(&mut self, event: StreamEvent) -> Applied {
        if self.state == StreamState::Finalized {
            tracing::debug!(message_id = %self.message.id, ?event, "ignoring event after finish");
            return Applied::Ignored;
        }

        match event {
            StreamEvent::TextDelta(delta) => {
                self.message.content.push_str(&delta);
                self.touch();
            }
            StreamEvent::ToolCall(call) => {
                let invocations = self.message.invocations_mut();
                // first call with an id keeps it
                self.invocations
                    .entry(call.tool_call_id.clone())
                    .or_insert(invocations.len());
                invocations.push(ToolInvocation::call(call));
                self.touch();
            }
            StreamEvent::ToolResult(result) => {
                let invocations = self.message.invocations_mut();
                match self.invocations.get(&result.tool_call_id) {
                    Some(&index) => invocations[index].resolve(result.result),
                    None => {
                        self.invocations
                            .insert(result.tool_call_id.clone(), invocations.len());
                        invocations.push(ToolInvocation::completed(result));
                    }
                }
                self.touch();
            }
            StreamEvent::Reasoning(delta) => {
                self.message
                    .reasoning
                    .get_or_insert_with(String::new)
                    .push_str(&delta);
                self.touch();
            }
            StreamEvent::Suggestion(_)
            | StreamEvent::Data(_)
            | StreamEvent::Annotations(_)
            | StreamEvent::StartStep(_)
            | StreamEvent::FinishStep(_)
            | StreamEvent::Passthrough { .. } => {}
            StreamEvent::Error(error) => {
                tracing::warn!(message_id = %self.message.id, %error, "stream reported an error");
            }
            StreamEvent::Finish(reason) => {
                tracing::debug!(message_id = %self.message.id, ?reason, "stream finished");
                self.state = StreamState::Finalized;
            }
        }
        Applied::Applied
    }

    fn touch(&mut self) {
        if self.state == StreamState::Empty {
            self.state = StreamState::Streaming;
        }
    }
}

/// Fold a sequence of events into a new message
pub fn reconcile_events<S, I>(id: S, events: I) -> StreamingMessage
where
    S: Into<String>,
    I: IntoIterator<Item = StreamEvent>,
{
    let mut message = StreamingMessage::new(id);
    for event in events {
        message.apply(event);
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fragment::{ToolCall, ToolResult};
    use crate::models::ui::InvocationState;
    use serde_json::json;

    #[test]
    fn test_text_deltas_then_finish() {
        let mut message = reconcile_events(
            "m1",
            vec![
                StreamEvent::text_delta("He"),
                StreamEvent::text_delta("llo"),
                StreamEvent::finish(),
            ],
        );

        assert_eq!(message.state(), StreamState::Finalized);
        assert_eq!(message.message().content, "Hello");

        let before = message.message().clone();
        assert_eq!(message.apply(StreamEvent::text_delta("!")), Applied::Ignored);
        assert_eq!(message.apply(StreamEvent::finish()), Applied::Ignored);
        assert_eq!(message.message(), &before);
    }

    #[test]
    fn test_state_transitions() {
        let mut message = StreamingMessage::new("m1");
        assert_eq!(message.state(), StreamState::Empty);

        message.apply(StreamEvent::Data(json!([1])));
        assert_eq!(message.state(), StreamState::Empty);

        message.apply(StreamEvent::text_delta("x"));
        assert_eq!(message.state(), StreamState::Streaming);

        message.apply(StreamEvent::finish());
        assert_eq!(message.state(), StreamState::Finalized);
    }

    #[test]
    fn test_tool_call_then_result() {
        let message = reconcile_events(
            "m1",
            vec![
                StreamEvent::ToolCall(ToolCall::new("a", "calc", json!({"q": 1}))),
                StreamEvent::ToolCall(ToolCall::new("b", "calc", json!({"q": 2}))),
                StreamEvent::ToolResult(ToolResult::new("b", "calc", json!(2))),
            ],
        );

        let invocations = message.message().invocations();
        assert_eq!(invocations.len(), 2);
        assert_eq!(invocations[0].state, InvocationState::Call);
        assert_eq!(invocations[1].state, InvocationState::Result);
        assert_eq!(invocations[1].result, Some(json!(2)));
        assert_eq!(message.state(), StreamState::Streaming);
    }

    #[test]
    fn test_duplicate_call_id_resolves_earliest_call() {
        let message = reconcile_events(
            "m1",
            vec![
                StreamEvent::ToolCall(ToolCall::new("a", "calc", json!({"q": 1}))),
                StreamEvent::ToolCall(ToolCall::new("a", "calc", json!({"q": 2}))),
                StreamEvent::ToolResult(ToolResult::new("a", "calc", json!(1))),
            ],
        );

        let invocations = message.message().invocations();
        assert_eq!(invocations.len(), 2);
        assert_eq!(invocations[0].state, InvocationState::Result);
        assert_eq!(invocations[0].result, Some(json!(1)));
        assert_eq!(invocations[1].state, InvocationState::Call);
    }

    #[test]
    fn test_step_parts_do_not_touch_the_message() {
        let mut message = StreamingMessage::new("m1");
        message.apply(StreamEvent::StartStep(json!({"messageId": "m1"})));
        message.apply(StreamEvent::Annotations(json!([])));
        assert_eq!(message.state(), StreamState::Empty);

        message.apply(StreamEvent::text_delta("ok"));
        message.apply(StreamEvent::FinishStep(json!({"finishReason": "stop"})));
        assert_eq!(message.state(), StreamState::Streaming);
        assert_eq!(message.message().content, "ok");
    }

    #[test]
    fn test_result_without_call_is_appended() {
        let message = reconcile_events(
            "m1",
            vec![StreamEvent::ToolResult(ToolResult::new("x", "calc", json!("late")))],
        );

        let invocations = message.message().invocations();
        assert_eq!(invocations.len(), 1);
        assert_eq!(invocations[0].tool_call_id, "x");
        assert_eq!(invocations[0].state, InvocationState::Result);
    }

    #[test]
    fn test_reasoning_is_concatenated() {
        let message = reconcile_events(
            "m1",
            vec![StreamEvent::reasoning("step one, "), StreamEvent::reasoning("step two")],
        );

        assert_eq!(message.message().reasoning.as_deref(), Some("step one, step two"));
    }

    #[test]
    fn test_generated_ids_are_unique() {
        assert_ne!(StreamingMessage::generate().message().id, StreamingMessage::generate().message().id);
    }
}
