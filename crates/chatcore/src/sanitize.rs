use std::collections::HashSet;

use serde_json::Value;

use crate::models::fragment::{ContentFragment, FragmentContent};
use crate::models::message::{MessageBody, ResponseMessage};
use crate::models::role::Role;

/// Prepare the messages of a completed turn for persistence.
///
/// A turn can be cut off between a tool call and its result. Calls without a
/// result anywhere in the batch are removed, along with empty text, so that
/// stored history never holds an invocation that can not be completed. The
/// turn's reasoning, if any, is attached to each assistant message.
pub fn sanitize(messages: Vec<ResponseMessage>, reasoning: Option<&str>) -> Vec<ResponseMessage> {
    let result_ids: HashSet<String> = messages
        .iter()
        .flat_map(|message| message.content.fragments())
        .filter_map(ContentFragment::as_tool_result)
        .map(|result| result.tool_call_id.clone())
        .collect();

    let reasoning = reasoning.filter(|text| !text.is_empty());

    messages
        .into_iter()
        .map(|message| match message {
            ResponseMessage {
                id,
                role: Role::Assistant,
                content: MessageBody::Fragments(fragments),
            } => {
                let mut kept: Vec<ContentFragment> = fragments
                    .into_iter()
                    .filter(|fragment| keep_fragment(fragment, &result_ids, &id))
                    .collect();
                if let Some(reasoning) = reasoning {
                    let order = kept.iter().map(|f| f.order + 1).max().unwrap_or(0);
                    kept.push(ContentFragment::reasoning(reasoning, order));
                }
                ResponseMessage::new(id, Role::Assistant, MessageBody::Fragments(kept))
            }
            other => other,
        })
        .filter(|message| !message.content.is_empty())
        .collect()
}

fn keep_fragment(
    fragment: &ContentFragment,
    result_ids: &HashSet<String>,
    message_id: &str,
) -> bool {
    match &fragment.content {
        FragmentContent::ToolCall(call) => {
            let resolved = result_ids.contains(&call.tool_call_id);
            if !resolved {
                tracing::debug!(
                    message_id,
                    tool_call_id = %call.tool_call_id,
                    "removing tool call without a result"
                );
            }
            resolved
        }
        FragmentContent::Text(Value::String(text)) => !text.is_empty(),
        _ => true,
    }
}
