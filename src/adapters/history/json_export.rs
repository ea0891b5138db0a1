//! Implements HistoryPort over a directory of channel exports.
//!
//! One file per channel: {dir}/{channel}.json, a JSON array of messages in
//! chronological order (oldest first), e.g.
//! `[{"text": "ship it", "reactions": [{"name": "rocket", "count": 2}]}]`.
//! Unknown fields are ignored, so platform exports can be used as-is.
//! A file is parsed on its first page and cached until the next `list_channels`,
//! so every refresh sees the exports as they are on disk. Pages are served newest first.

use crate::adapters::history::memory::page_of;
use crate::domain::{Channel, DomainError, HistoryPage, Message};
use crate::ports::HistoryPort;
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// File-system history source. One JSON file per channel.
pub struct JsonExportHistory {
    base_dir: PathBuf,
    /// Parsed channel histories (newest first), keyed by channel id.
    cache: RwLock<HashMap<String, Arc<Vec<Message>>>>,
}

impl JsonExportHistory {
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
            cache: RwLock::new(HashMap::new()),
        }
    }

    fn channel_path(&self, channel_id: &str) -> Result<PathBuf, DomainError> {
        if channel_id.is_empty()
            || channel_id.contains(['/', '\\'])
            || channel_id.starts_with('.')
        {
            return Err(DomainError::History(format!(
                "invalid channel id '{}'",
                channel_id
            )));
        }
        Ok(self.base_dir.join(format!("{}.json", channel_id)))
    }

    /// Load a channel's export, using the cache when already parsed.
    async fn load_channel(&self, channel_id: &str) -> Result<Arc<Vec<Message>>, DomainError> {
        if let Some(messages) = self.cache.read().await.get(channel_id) {
            return Ok(Arc::clone(messages));
        }

        let path = self.channel_path(channel_id)?;
        let raw = fs::read_to_string(&path).await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => DomainError::History(format!("unknown channel {}", channel_id)),
            _ => DomainError::History(format!("read {}: {}", path.display(), e)),
        })?;
        let mut messages: Vec<Message> = serde_json::from_str(&raw)
            .map_err(|e| DomainError::History(format!("parse {}: {}", path.display(), e)))?;
        messages.reverse();
        info!(
            channel = channel_id,
            count = messages.len(),
            path = %path.display(),
            "loaded channel export"
        );

        let messages = Arc::new(messages);
        self.cache
            .write()
            .await
            .insert(channel_id.to_string(), Arc::clone(&messages));
        Ok(messages)
    }
}

#[async_trait::async_trait]
impl HistoryPort for JsonExportHistory {
    /// Every `*.json` file in the directory is a channel, sorted by name.
    /// Hidden files are skipped. Drops parsed exports so they are re-read.
    async fn list_channels(&self) -> Result<Vec<Channel>, DomainError> {
        self.cache.write().await.clear();
        let mut entries = fs::read_dir(&self.base_dir).await.map_err(|e| {
            DomainError::History(format!("read dir {}: {}", self.base_dir.display(), e))
        })?;

        let mut channels = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| DomainError::History(e.to_string()))?
        {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            if !stem.starts_with('.') {
                channels.push(Channel {
                    id: stem.to_string(),
                    name: stem.to_string(),
                });
            }
        }
        channels.sort_by(|a, b| a.name.cmp(&b.name));
        debug!(count = channels.len(), dir = %self.base_dir.display(), "listed channels");
        Ok(channels)
    }

    async fn fetch_history(
        &self,
        channel_id: &str,
        cursor: Option<String>,
        count: usize,
    ) -> Result<HistoryPage, DomainError> {
        let messages = self.load_channel(channel_id).await?;
        page_of(&messages, cursor, count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Label;

    fn write(dir: &Path, name: &str, body: &str) {
        std::fs::write(dir.join(name), body).unwrap();
    }

    #[tokio::test]
    async fn test_lists_json_files_as_channels() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "random.json", "[]");
        write(dir.path(), "general.json", "[]");
        write(dir.path(), "notes.txt", "ignored");
        write(dir.path(), ".hidden.json", "[]");

        let history = JsonExportHistory::new(dir.path());
        let names: Vec<String> = history
            .list_channels()
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();

        assert_eq!(names, vec!["general", "random"]);
    }

    #[tokio::test]
    async fn test_reads_platform_export_newest_first() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "general.json",
            r#"[
                {"type": "message", "user": "U1", "text": "first", "ts": "1.0"},
                {"text": "second", "reactions": [{"name": "tada", "users": ["U2"], "count": 2}]},
                {"text": "third"}
            ]"#,
        );

        let history = JsonExportHistory::new(dir.path());
        let page = history.fetch_history("general", None, 2).await.unwrap();

        assert_eq!(page.messages[0].text, "third");
        assert_eq!(page.messages[1].text, "second");
        assert_eq!(page.messages[1].reactions[0].name, Label::from("tada"));
        assert_eq!(page.messages[1].reactions[0].count, 2);
        assert!(page.has_more);

        let rest = history
            .fetch_history("general", page.next_cursor, 2)
            .await
            .unwrap();
        assert_eq!(rest.messages.len(), 1);
        assert!(rest.messages[0].reactions.is_empty());
        assert!(!rest.has_more);
    }

    #[tokio::test]
    async fn test_listing_channels_rereads_changed_exports() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "general.json", r#"[{"text": "before"}]"#);
        let history = JsonExportHistory::new(dir.path());

        history.list_channels().await.unwrap();
        let first = history.fetch_history("general", None, 10).await.unwrap();
        assert_eq!(first.messages[0].text, "before");

        write(dir.path(), "general.json", r#"[{"text": "after"}]"#);
        let cached = history.fetch_history("general", None, 10).await.unwrap();
        assert_eq!(cached.messages[0].text, "before");

        history.list_channels().await.unwrap();
        let fresh = history.fetch_history("general", None, 10).await.unwrap();
        assert_eq!(fresh.messages[0].text, "after");
    }

    #[tokio::test]
    async fn test_missing_bad_and_unsafe_channels() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "broken.json", "{not json");
        let history = JsonExportHistory::new(dir.path());

        for id in ["missing", "broken", "../etc", ""] {
            assert!(
                matches!(
                    history.fetch_history(id, None, 10).await,
                    Err(DomainError::History(_))
                ),
                "channel id: {id}"
            );
        }
    }

    #[tokio::test]
    async fn test_missing_directory_is_an_error() {
        let history = JsonExportHistory::new("/definitely/not/here");
        assert!(matches!(
            history.list_channels().await,
            Err(DomainError::History(_))
        ));
    }
}
