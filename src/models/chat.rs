use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::models::plan::PlanType;

/// Author of a chat turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

impl ChatRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatRole::User => "user",
            ChatRole::Assistant => "assistant",
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("invalid chat role '{0}'")]
pub struct InvalidChatRole(pub String);

impl TryFrom<String> for ChatRole {
    type Error = InvalidChatRole;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "user" => Ok(ChatRole::User),
            "assistant" => Ok(ChatRole::Assistant),
            _ => Err(InvalidChatRole(value)),
        }
    }
}

/// Represents the 'chat_messages' table. The id is a UUID v4 string.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ChatMessage {
    pub id: String,
    pub user_id: i64,

    #[sqlx(try_from = "String")]
    pub role: ChatRole,

    pub content: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub is_plan: bool,
    pub plan_type: Option<String>,
}

/// DTO for a message sent to the coach.
#[derive(Debug, Deserialize, Validate)]
pub struct SendMessageRequest {
    #[validate(length(
        min = 1,
        max = 4000,
        message = "Message must be between 1 and 4000 characters"
    ))]
    pub content: String,
}

/// Partial update of a chat message (used by mark-plan).
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct ChatMessagePatch {
    #[validate(length(min = 1, max = 20000))]
    pub content: Option<String>,
    pub is_plan: Option<bool>,
    pub plan_type: Option<PlanType>,
}

impl ChatMessagePatch {
    pub fn is_empty(&self) -> bool {
        self.content.is_none() && self.is_plan.is_none() && self.plan_type.is_none()
    }
}

/// Reply to a sent message: the stored assistant turn.
#[derive(Debug, Serialize)]
pub struct ChatReply {
    pub message_id: String,
    pub response: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Serialize)]
pub struct ChatHistory {
    pub messages: Vec<ChatMessage>,
}

/// Query parameters for the chat history.
#[derive(Debug, Deserialize)]
pub struct HistoryParams {
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}
