use std::sync::Arc;

use crate::{
    domain::{ChatId, MessageRef},
    errors::NotifyError,
    ports::MessagingPort,
};

/// Marks messages addressed to the operator rather than review updates.
pub const DIAGNOSTIC_PREFIX: &str = "[bot error] ";

/// A message bound for the operator chat.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Notification {
    /// A review verdict, sent verbatim.
    Status(String),
    /// An internal failure the operator should know about.
    Diagnostic(String),
}

impl Notification {
    pub fn render(&self) -> String {
        match self {
            Self::Status(text) => text.clone(),
            Self::Diagnostic(text) => format!("{DIAGNOSTIC_PREFIX}{text}"),
        }
    }
}

/// Sends notifications to the single configured chat.
#[derive(Clone)]
pub struct Notifier {
    messenger: Arc<dyn MessagingPort>,
    chat_id: ChatId,
}

impl Notifier {
    pub fn new(messenger: Arc<dyn MessagingPort>, chat_id: ChatId) -> Self {
        Self { messenger, chat_id }
    }

    pub async fn notify(&self, notification: &Notification) -> Result<MessageRef, NotifyError> {
        let text = notification.render();
        let sent = self.messenger.send_text(self.chat_id, &text).await?;
        tracing::info!("sent message to chat {}: {text}", self.chat_id.0);
        Ok(sent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::MessageId;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingMessenger {
        sends: Mutex<Vec<(ChatId, String)>>,
        fail: bool,
    }

    #[async_trait]
    impl MessagingPort for RecordingMessenger {
        async fn send_text(&self, chat_id: ChatId, text: &str) -> Result<MessageRef, NotifyError> {
            if self.fail {
                return Err(NotifyError::Delivery("chat not found".to_string()));
            }
            self.sends.lock().unwrap().push((chat_id, text.to_string()));
            Ok(MessageRef {
                chat_id,
                message_id: MessageId(1),
            })
        }
    }

    #[tokio::test]
    async fn status_is_sent_verbatim_and_diagnostics_are_prefixed() {
        let messenger = Arc::new(RecordingMessenger::default());
        let notifier = Notifier::new(messenger.clone(), ChatId(42));

        notifier
            .notify(&Notification::Status("Work \"a\" was reviewed!".to_string()))
            .await
            .unwrap();
        notifier
            .notify(&Notification::Diagnostic("poll failed".to_string()))
            .await
            .unwrap();

        let sends = messenger.sends.lock().unwrap();
        assert_eq!(
            *sends,
            vec![
                (ChatId(42), "Work \"a\" was reviewed!".to_string()),
                (ChatId(42), "[bot error] poll failed".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn delivery_failure_is_returned() {
        let messenger = Arc::new(RecordingMessenger {
            fail: true,
            ..Default::default()
        });
        let notifier = Notifier::new(messenger, ChatId(42));
        let err = notifier
            .notify(&Notification::Status("x".to_string()))
            .await
            .unwrap_err();
        assert!(matches!(err, NotifyError::Delivery(_)));
    }
}
