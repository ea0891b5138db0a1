//! Outbound ports. Application calls into infrastructure.
//!
//! Implemented by adapters.

use crate::domain::{Channel, DomainError, HistoryPage};

/// Chat history source. Lists channels and pages through their past messages.
#[async_trait::async_trait]
pub trait HistoryPort: Send + Sync {
    /// List every channel whose history may be used for training.
    async fn list_channels(&self) -> Result<Vec<Channel>, DomainError>;

    /// Fetch one page of a channel's history, newest first.
    ///
    /// - `cursor`: `None` = start from the newest message; otherwise the
    ///   `next_cursor` returned by the previous page
    /// - `count`: max messages per page
    async fn fetch_history(
        &self,
        channel_id: &str,
        cursor: Option<String>,
        count: usize,
    ) -> Result<HistoryPage, DomainError>;
}
