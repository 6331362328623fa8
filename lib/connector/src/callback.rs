//! Per-event delivery handle.

use crate::error::ConnectorError;
use parlance_core::{ApplicationId, ConnectorType, UserInterfaceType};
use parlance_dialog::Action;
use rootcause::Report;
use tokio::sync::mpsc;

/// Identifies where the answers to one inbound event go.
///
/// Transports that answer synchronously (an HTTP request waiting for the
/// bot's reply) attach a reply channel; push transports leave it empty
/// and deliver through their own client.
#[derive(Debug, Clone)]
pub struct ConnectorCallback {
    /// The registered connector the event came through.
    pub connector_id: String,
    pub application_id: ApplicationId,
    pub connector_type: ConnectorType,
    replies: Option<mpsc::UnboundedSender<Action>>,
}

impl ConnectorCallback {
    /// Creates a callback without reply channel.
    #[must_use]
    pub fn new(
        connector_id: impl Into<String>,
        application_id: ApplicationId,
        connector_type: ConnectorType,
    ) -> Self {
        Self {
            connector_id: connector_id.into(),
            application_id,
            connector_type,
            replies: None,
        }
    }

    /// Attaches a channel receiving every delivered action.
    #[must_use]
    pub fn with_reply_channel(mut self, replies: mpsc::UnboundedSender<Action>) -> Self {
        self.replies = Some(replies);
        self
    }

    /// Returns the interface the user talks through.
    #[must_use]
    pub fn user_interface_type(&self) -> UserInterfaceType {
        self.connector_type.user_interface_type
    }

    /// Returns true if a reply channel is attached.
    #[must_use]
    pub fn has_reply_channel(&self) -> bool {
        self.replies.is_some()
    }

    /// Hands an action to the waiting party.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectorError::ReplyChannelClosed`] when no channel is
    /// attached or its receiver was dropped.
    pub fn reply(&self, action: Action) -> Result<(), Report<ConnectorError>> {
        let closed = || ConnectorError::ReplyChannelClosed {
            connector_id: self.connector_id.clone(),
        };
        let replies = self.replies.as_ref().ok_or_else(closed)?;
        replies.send(action).map_err(|_| closed())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parlance_core::PlayerId;

    fn callback() -> ConnectorCallback {
        ConnectorCallback::new(
            "web",
            ApplicationId::new("travel"),
            ConnectorType::new("web", UserInterfaceType::TextChat),
        )
    }

    fn answer() -> Action {
        Action::text(
            PlayerId::bot("helper"),
            ApplicationId::new("travel"),
            PlayerId::user("alice"),
            "hi",
        )
    }

    #[tokio::test]
    async fn reply_reaches_receiver() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let callback = callback().with_reply_channel(tx);

        callback.reply(answer()).expect("reply");

        let received = rx.recv().await.expect("action");
        assert_eq!(received.text_content(), Some("hi"));
    }

    #[test]
    fn reply_without_channel_fails() {
        assert!(callback().reply(answer()).is_err());
    }

    #[test]
    fn reply_after_receiver_dropped_fails() {
        let (tx, rx) = mpsc::unbounded_channel();
        let callback = callback().with_reply_channel(tx);
        drop(rx);

        assert!(callback.reply(answer()).is_err());
    }
}
