//! Hexagonal ports. Adapters live in `hwbot-praktikum` and `hwbot-telegram`.

use async_trait::async_trait;

use crate::{
    domain::{ChatId, MessageRef},
    errors::{NotifyError, PollError},
    homework::PollResponse,
};

/// Source of homework status updates (the review-status API).
#[async_trait]
pub trait HomeworkSource: Send + Sync {
    /// Fetch every homework whose status changed since `from_date` (unix seconds).
    async fn poll(&self, from_date: i64) -> Result<PollResponse, PollError>;
}

/// Outbound plain-text messaging (Telegram today).
#[async_trait]
pub trait MessagingPort: Send + Sync {
    async fn send_text(&self, chat_id: ChatId, text: &str) -> Result<MessageRef, NotifyError>;
}
