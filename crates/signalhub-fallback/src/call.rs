//! Assistant API operations and their payloads.

use serde_json::{json, Map, Value};
use sha2::{Digest, Sha256};

/// The two assistant API operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    ListAssistants,
    Chat,
}

impl Operation {
    /// Short name used in cache keys, labels and logs.
    pub fn as_str(self) -> &'static str {
        match self {
            Operation::ListAssistants => "list",
            Operation::Chat => "chat",
        }
    }

    pub(crate) fn label(self) -> &'static str {
        match self {
            Operation::ListAssistants => "assistants.list",
            Operation::Chat => "assistants.chat",
        }
    }
}

/// One request to the assistant API.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AssistantCall {
    /// Lists the workspace's assistants, one page at a time.
    ListAssistants { page_num: u32, page_size: u32 },
    /// Sends `query` to an assistant, optionally continuing a conversation.
    Chat {
        assistant_id: String,
        query: String,
        conversation_id: Option<String>,
    },
}

impl AssistantCall {
    /// One page of assistants.
    pub fn list(page_num: u32, page_size: u32) -> Self {
        AssistantCall::ListAssistants {
            page_num,
            page_size,
        }
    }

    /// A chat message starting a new conversation.
    pub fn chat(assistant_id: impl Into<String>, query: impl Into<String>) -> Self {
        AssistantCall::Chat {
            assistant_id: assistant_id.into(),
            query: query.into(),
            conversation_id: None,
        }
    }

    /// Continues the conversation `conversation_id`. No-op for list calls.
    pub fn in_conversation(mut self, id: impl Into<String>) -> Self {
        if let AssistantCall::Chat {
            conversation_id, ..
        } = &mut self
        {
            *conversation_id = Some(id.into());
        }
        self
    }

    pub fn operation(&self) -> Operation {
        match self {
            AssistantCall::ListAssistants { .. } => Operation::ListAssistants,
            AssistantCall::Chat { .. } => Operation::Chat,
        }
    }

    /// Request body for this call in `workspace_id`.
    ///
    /// List calls name the workspace `workspace_id`; chat calls name it
    /// `space_id`.
    pub fn payload(&self, workspace_id: &str) -> Value {
        match self {
            AssistantCall::ListAssistants {
                page_num,
                page_size,
            } => json!({
                "workspace_id": workspace_id,
                "page_num": page_num,
                "page_size": page_size,
            }),
            AssistantCall::Chat {
                assistant_id,
                query,
                conversation_id,
            } => {
                let mut body = Map::new();
                body.insert("space_id".into(), json!(workspace_id));
                body.insert("assistant_id".into(), json!(assistant_id));
                body.insert("query".into(), json!(query));
                if let Some(id) = conversation_id {
                    body.insert("conversation_id".into(), json!(id));
                }
                Value::Object(body)
            }
        }
    }

    /// Cache key for `payload`: the operation, the assistant for chat calls,
    /// and the SHA-256 of the payload's canonical JSON.
    pub fn cache_key(&self, payload: &Value) -> String {
        // serde_json maps are sorted, so equal payloads serialize identically
        let digest = hex::encode(Sha256::digest(payload.to_string().as_bytes()));
        match self {
            AssistantCall::ListAssistants { .. } => format!("assistants:list:{digest}"),
            AssistantCall::Chat { assistant_id, .. } => {
                format!("assistants:chat:{assistant_id}:{digest}")
            }
        }
    }
}
