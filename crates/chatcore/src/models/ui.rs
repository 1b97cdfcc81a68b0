use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::fragment::{ToolCall, ToolResult};
use super::role::Role;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvocationState {
    /// Waiting on a result
    Call,
    Result,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// A tool call and, once it arrives, its result
pub struct ToolInvocation {
    pub state: InvocationState,
    pub tool_call_id: String,
    pub tool_name: String,
    #[serde(default)]
    pub args: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
}

impl ToolInvocation {
    pub fn call(call: ToolCall) -> Self {
        Self {
            state: InvocationState::Call,
            tool_call_id: call.tool_call_id,
            tool_name: call.tool_name,
            args: call.args,
            result: None,
        }
    }

    /// An invocation whose call was never observed
    pub fn completed(result: ToolResult) -> Self {
        Self {
            state: InvocationState::Result,
            tool_call_id: result.tool_call_id,
            tool_name: result.tool_name,
            args: Value::Null,
            result: Some(result.result),
        }
    }

    pub fn is_pending(&self) -> bool {
        self.state == InvocationState::Call
    }

    pub fn resolve(&mut self, result: Value) {
        self.state = InvocationState::Result;
        self.result = Some(result);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// A message in the shape the chat interface renders
pub struct UIMessage {
    pub id: String,
    pub role: Role,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_invocations: Option<Vec<ToolInvocation>>,
}

impl UIMessage {
    pub fn new<S: Into<String>>(id: S, role: Role) -> Self {
        Self {
            id: id.into(),
            role,
            content: String::new(),
            reasoning: None,
            tool_invocations: None,
        }
    }

    pub fn invocations(&self) -> &[ToolInvocation] {
        self.tool_invocations.as_deref().unwrap_or_default()
    }

    pub fn invocations_mut(&mut self) -> &mut Vec<ToolInvocation> {
        self.tool_invocations.get_or_insert_with(Vec::new)
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty() && self.invocations().is_empty()
    }
}
