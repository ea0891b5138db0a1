//! In-memory history source. Implements HistoryPort.
//!
//! Serves fixed channels without any platform access; useful for development and tests.

use crate::domain::{Channel, DomainError, HistoryPage, Message};
use crate::ports::HistoryPort;
use std::collections::HashSet;
use tracing::debug;

/// Fixed history. Each channel's messages are stored newest first.
#[derive(Debug, Default)]
pub struct InMemoryHistory {
    channels: Vec<(Channel, Vec<Message>)>,
    failing: HashSet<String>,
}

impl InMemoryHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a channel whose history is `messages` (newest first).
    pub fn with_channel(mut self, id: &str, name: &str, messages: Vec<Message>) -> Self {
        self.channels.push((
            Channel {
                id: id.to_string(),
                name: name.to_string(),
            },
            messages,
        ));
        self
    }

    /// Make every history request for `id` fail.
    pub fn with_failing_channel(mut self, id: &str) -> Self {
        self.failing.insert(id.to_string());
        self
    }
}

#[async_trait::async_trait]
impl HistoryPort for InMemoryHistory {
    async fn list_channels(&self) -> Result<Vec<Channel>, DomainError> {
        Ok(self.channels.iter().map(|(c, _)| c.clone()).collect())
    }

    async fn fetch_history(
        &self,
        channel_id: &str,
        cursor: Option<String>,
        count: usize,
    ) -> Result<HistoryPage, DomainError> {
        if self.failing.contains(channel_id) {
            return Err(DomainError::History(format!(
                "channel {} is unavailable",
                channel_id
            )));
        }
        let (_, messages) = self
            .channels
            .iter()
            .find(|(c, _)| c.id == channel_id)
            .ok_or_else(|| DomainError::History(format!("unknown channel {}", channel_id)))?;

        page_of(messages, cursor, count)
    }
}

/// Slice one page out of `messages` using an offset cursor.
pub(crate) fn page_of(
    messages: &[Message],
    cursor: Option<String>,
    count: usize,
) -> Result<HistoryPage, DomainError> {
    let offset = match cursor {
        Some(c) => c
            .parse::<usize>()
            .map_err(|_| DomainError::History(format!("invalid cursor '{}'", c)))?,
        None => 0,
    };
    let start = offset.min(messages.len());
    let end = start.saturating_add(count).min(messages.len());
    let has_more = end < messages.len();
    debug!(start, end, total = messages.len(), "serving history page");

    Ok(HistoryPage {
        messages: messages[start..end].to_vec(),
        next_cursor: has_more.then(|| end.to_string()),
        has_more,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn msgs(n: usize) -> Vec<Message> {
        (0..n).map(|i| Message::new(format!("m{i}"), vec![])).collect()
    }

    #[tokio::test]
    async fn test_pages_through_channel() {
        let history = InMemoryHistory::new().with_channel("c1", "general", msgs(5));

        let first = history.fetch_history("c1", None, 2).await.unwrap();
        assert_eq!(first.messages.len(), 2);
        assert!(first.has_more);

        let second = history
            .fetch_history("c1", first.next_cursor, 2)
            .await
            .unwrap();
        assert_eq!(second.messages[0].text, "m2");

        let last = history
            .fetch_history("c1", second.next_cursor, 2)
            .await
            .unwrap();
        assert_eq!(last.messages.len(), 1);
        assert!(!last.has_more);
        assert!(last.next_cursor.is_none());
    }

    #[tokio::test]
    async fn test_failing_and_unknown_channels() {
        let history = InMemoryHistory::new()
            .with_channel("ok", "ok", msgs(1))
            .with_channel("down", "down", msgs(1))
            .with_failing_channel("down");

        assert!(matches!(
            history.fetch_history("down", None, 10).await,
            Err(DomainError::History(_))
        ));
        assert!(matches!(
            history.fetch_history("nope", None, 10).await,
            Err(DomainError::History(_))
        ));
        assert!(matches!(
            history.fetch_history("ok", Some("x".into()), 10).await,
            Err(DomainError::History(_))
        ));
    }
}
