//! Message operations on the [`Store`].

use chrono::Utc;
use tracing::debug;

use crate::error::{Result, StoreError};
use crate::models::Message;
use crate::store::Store;

/// Longest sender name kept on a message; the rest is cut off.
pub const MAX_SENDER_LEN: usize = 64;

/// Sender recorded when the submitted name is blank.
pub const ANONYMOUS_SENDER: &str = "Anonymous";

impl Store {
    // ------------------------------------------------------------------
    // Read
    // ------------------------------------------------------------------

    /// Messages of a channel in arrival order.
    ///
    /// An unknown channel yields an empty slice rather than an error; this
    /// lenient-read behavior is part of the API contract.
    pub fn messages_in(&self, channel: &str) -> &[Message] {
        self.board().channels.get(channel).unwrap_or(&[])
    }

    // ------------------------------------------------------------------
    // Append
    // ------------------------------------------------------------------

    /// Append a message to a channel and persist the board.
    ///
    /// The sender is trimmed, cut to [`MAX_SENDER_LEN`] characters and
    /// replaced with [`ANONYMOUS_SENDER`] when blank. The body is trimmed;
    /// an empty body with no attachment still produces a valid message.
    /// The timestamp is the server receipt time, never client-supplied.
    pub fn post_message(
        &mut self,
        channel: &str,
        sender: &str,
        body: &str,
        attachment: Option<String>,
    ) -> Result<()> {
        let message = Message {
            sender: normalize_sender(sender),
            body: body.trim().to_string(),
            timestamp: Utc::now(),
            attachment,
        };

        let Some(messages) = self.board_mut().channels.get_mut(channel) else {
            return Err(StoreError::ChannelNotFound(channel.to_string()));
        };
        messages.push(message);

        if let Err(e) = self.save() {
            if let Some(messages) = self.board_mut().channels.get_mut(channel) {
                messages.pop();
            }
            return Err(e);
        }

        debug!(channel = %channel, "stored message");
        Ok(())
    }
}

fn normalize_sender(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return ANONYMOUS_SENDER.to_string();
    }
    trimmed.chars().take(MAX_SENDER_LEN).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DEFAULT_CHANNEL;

    fn test_store() -> (Store, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::open_at(&dir.path().join("board.json")).unwrap();
        (store, dir)
    }

    #[test]
    fn post_appends_in_arrival_order() {
        let (mut store, _dir) = test_store();
        store
            .post_message(DEFAULT_CHANNEL, "alice", "first", None)
            .unwrap();
        store
            .post_message(DEFAULT_CHANNEL, "bob", "  second  ", None)
            .unwrap();

        let messages = store.messages_in(DEFAULT_CHANNEL);
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].sender, "alice");
        assert_eq!(messages[0].body, "first");
        assert_eq!(messages[1].sender, "bob");
        assert_eq!(messages[1].body, "second");
    }

    #[test]
    fn blank_sender_becomes_anonymous() {
        let (mut store, _dir) = test_store();
        store
            .post_message(DEFAULT_CHANNEL, "  ", "hello", None)
            .unwrap();
        assert_eq!(
            store.messages_in(DEFAULT_CHANNEL)[0].sender,
            ANONYMOUS_SENDER
        );
    }

    #[test]
    fn overlong_sender_is_cut_to_the_limit() {
        let (mut store, _dir) = test_store();
        let long = "x".repeat(MAX_SENDER_LEN + 20);
        store
            .post_message(DEFAULT_CHANNEL, &long, "hi", None)
            .unwrap();
        assert_eq!(
            store.messages_in(DEFAULT_CHANNEL)[0].sender.chars().count(),
            MAX_SENDER_LEN
        );
    }

    #[test]
    fn empty_body_without_attachment_is_still_a_message() {
        let (mut store, _dir) = test_store();
        store
            .post_message(DEFAULT_CHANNEL, "alice", "   ", None)
            .unwrap();

        let messages = store.messages_in(DEFAULT_CHANNEL);
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].body, "");
        assert_eq!(messages[0].attachment, None);
    }

    #[test]
    fn attachment_reference_is_kept_on_the_message() {
        let (mut store, _dir) = test_store();
        store
            .post_message(
                DEFAULT_CHANNEL,
                "alice",
                "see file",
                Some("20260807093000123456_report.pdf".to_string()),
            )
            .unwrap();
        assert_eq!(
            store.messages_in(DEFAULT_CHANNEL)[0].attachment.as_deref(),
            Some("20260807093000123456_report.pdf")
        );
    }

    #[test]
    fn post_to_an_unknown_channel_is_not_found() {
        let (mut store, _dir) = test_store();
        let err = store
            .post_message("ghost", "alice", "hello", None)
            .unwrap_err();
        assert!(matches!(err, StoreError::ChannelNotFound(_)));
    }

    #[test]
    fn reading_an_unknown_channel_yields_an_empty_list() {
        let (store, _dir) = test_store();
        assert!(store.messages_in("ghost").is_empty());
    }

    #[test]
    fn timestamps_never_run_backwards() {
        let (mut store, _dir) = test_store();
        store
            .post_message(DEFAULT_CHANNEL, "alice", "one", None)
            .unwrap();
        store
            .post_message(DEFAULT_CHANNEL, "alice", "two", None)
            .unwrap();

        let messages = store.messages_in(DEFAULT_CHANNEL);
        assert!(messages[1].timestamp >= messages[0].timestamp);
    }
}
