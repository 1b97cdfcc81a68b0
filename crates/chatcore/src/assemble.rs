use std::collections::{HashMap, HashSet};

use crate::models::fragment::{render_text, ContentFragment, FragmentContent};
use crate::models::message::PersistedMessage;
use crate::models::role::Role;
use crate::models::ui::{ToolInvocation, UIMessage};

/// Rebuild the interface messages for a chat from its stored messages.
///
/// Messages are processed in the order given, which callers take from
/// `createdAt`. Tool role messages produce no output of their own; their results
/// are attached to the pending invocation that requested them.
pub fn assemble(messages: &[PersistedMessage]) -> Vec<UIMessage> {
    let mut assembler = Assembler::default();
    for message in messages {
        assembler.push(message);
    }
    assembler.output
}

#[derive(Default)]
struct Assembler {
    output: Vec<UIMessage>,
    /// Pending calls by id, as (message index, invocation index) into `output`
    pending: HashMap<String, (usize, usize)>,
}

impl Assembler {
    fn push(&mut self, message: &PersistedMessage) {
        let fragments = message.resolved_fragments();

        if message.role == Role::Tool {
            self.attach_results(message, &fragments);
            return;
        }

        let ui = build_message(message, fragments);
        let index = self.output.len();
        for (position, invocation) in ui.invocations().iter().enumerate() {
            if invocation.is_pending() {
                self.pending
                    .entry(invocation.tool_call_id.clone())
                    .or_insert((index, position));
            }
        }
        self.output.push(ui);
    }

    fn attach_results(&mut self, message: &PersistedMessage, fragments: &[ContentFragment]) {
        for result in fragments.iter().filter_map(ContentFragment::as_tool_result) {
            match self.pending.remove(&result.tool_call_id) {
                Some((index, position)) => {
                    self.output[index].invocations_mut()[position].resolve(result.result.clone());
                }
                None => {
                    tracing::warn!(
                        message_id = %message.id,
                        tool_call_id = %result.tool_call_id,
                        "dropping tool result with no pending call"
                    );
                }
            }
        }
    }
}

fn build_message(message: &PersistedMessage, fragments: Vec<ContentFragment>) -> UIMessage {
    let mut ui = UIMessage::new(message.id.clone(), message.role);
    let mut local: HashMap<String, usize> = HashMap::new();

    for fragment in fragments {
        match fragment.content {
            FragmentContent::Text(value) => ui.content.push_str(&render_text(&value)),
            // last one wins
            FragmentContent::Reasoning(reasoning) => ui.reasoning = Some(reasoning),
            FragmentContent::ToolCall(call) => {
                let invocations = ui.invocations_mut();
                local
                    .entry(call.tool_call_id.clone())
                    .or_insert(invocations.len());
                invocations.push(ToolInvocation::call(call));
            }
            FragmentContent::ToolResult(result) => {
                let invocations = ui.invocations_mut();
                match local.get(&result.tool_call_id) {
                    Some(&position) => invocations[position].resolve(result.result),
                    None => invocations.push(ToolInvocation::completed(result)),
                }
            }
        }
    }

    ui
}

/// Drop tool invocations that never completed, then drop messages left with
/// nothing to show. Used before handing history back to the model.
pub fn sanitize_ui_messages(messages: Vec<UIMessage>) -> Vec<UIMessage> {
    messages
        .into_iter()
        .map(|mut message| {
            if message.role != Role::Assistant {
                return message;
            }
            if let Some(invocations) = message.tool_invocations.take() {
                let resolved: HashSet<String> = invocations
                    .iter()
                    .filter(|invocation| !invocation.is_pending())
                    .map(|invocation| invocation.tool_call_id.clone())
                    .collect();
                let kept: Vec<ToolInvocation> = invocations
                    .into_iter()
                    .filter(|invocation| {
                        !invocation.is_pending() || resolved.contains(&invocation.tool_call_id)
                    })
                    .collect();
                if !kept.is_empty() {
                    message.tool_invocations = Some(kept);
                }
            }
            message
        })
        .filter(|message| !message.is_empty())
        .collect()
}

pub fn most_recent_user_message(messages: &[UIMessage]) -> Option<&UIMessage> {
    messages.iter().rev().find(|message| message.role == Role::User)
}
