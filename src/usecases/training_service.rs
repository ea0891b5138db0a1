//! Training session refresh: list channels -> page through history -> new session -> learn.
//!
//! - Keeps only messages that carry reactions
//! - Labels are the distinct reaction names, in first-seen order
//! - A channel that fails mid-way keeps the pages already fetched and is then skipped
//! - Waits for the pipeline to drain so the summary describes a trained model

use crate::domain::{Channel, DomainError, Label, Message};
use crate::ports::HistoryPort;
use crate::usecases::reactor::Reactor;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error, info};

/// Training service. Rebuilds the reactor's model from channel history.
pub struct TrainingService {
    history: Arc<dyn HistoryPort>,
    reactor: Arc<Reactor>,
    max_messages: usize,
    page_size: usize,
    learning: AtomicBool,
    /// One refresh at a time.
    refresh_lock: Mutex<()>,
}

/// Result of one refresh.
#[derive(Debug, Clone, Default)]
pub struct TrainingSummary {
    pub channels: usize,
    pub messages: usize,
    pub labels: Vec<Label>,
}

/// Clears the learning flag when dropped, even if the refresh is cancelled.
struct LearningGuard<'a>(&'a AtomicBool);

impl<'a> LearningGuard<'a> {
    fn set(flag: &'a AtomicBool) -> Self {
        flag.store(true, Ordering::SeqCst);
        Self(flag)
    }
}

impl Drop for LearningGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl TrainingService {
    pub fn new(
        history: Arc<dyn HistoryPort>,
        reactor: Arc<Reactor>,
        max_messages: usize,
        page_size: usize,
    ) -> Self {
        Self {
            history,
            reactor,
            max_messages,
            page_size: page_size.max(1),
            learning: AtomicBool::new(false),
            refresh_lock: Mutex::new(()),
        }
    }

    /// True while a refresh is collecting history or training.
    pub fn is_learning(&self) -> bool {
        self.learning.load(Ordering::SeqCst)
    }

    pub fn max_messages(&self) -> usize {
        self.max_messages
    }

    /// Start a new training session from channel history.
    ///
    /// Fails with `InvalidConfiguration` when no message carries a reaction; the
    /// previous model stays in place in that case.
    pub async fn refresh(&self) -> Result<TrainingSummary, DomainError> {
        let _running = self.refresh_lock.lock().await;
        let _learning = LearningGuard::set(&self.learning);

        info!("setting up the reactor...");
        let channels = self.history.list_channels().await?;

        let mut messages = Vec::new();
        for channel in &channels {
            if let Err(e) = self.collect_channel(channel, &mut messages).await {
                error!(channel = %channel.name, error = %e, "error getting channel history");
                continue;
            }
            info!(channel = %channel.name, "finished getting message history");
        }

        let labels = distinct_labels(&messages);
        debug!(labels = ?labels, "reaction classes");
        self.reactor.start_session(labels.clone()).await?;

        let summary = TrainingSummary {
            channels: channels.len(),
            messages: messages.len(),
            labels,
        };
        for message in messages {
            self.reactor.learn(message).await;
        }
        self.reactor.flush().await;

        info!(
            messages = summary.messages,
            reactions = summary.labels.len(),
            channels = summary.channels,
            "learned from channel history"
        );
        Ok(summary)
    }

    /// Page through one channel, appending reacted-to messages to `out`.
    /// Stops once more than `max_messages` were retrieved or history runs out.
    async fn collect_channel(
        &self,
        channel: &Channel,
        out: &mut Vec<Message>,
    ) -> Result<(), DomainError> {
        let mut cursor = None;
        let mut retrieved = 0usize;

        loop {
            let page = self
                .history
                .fetch_history(&channel.id, cursor.take(), self.page_size)
                .await?;
            retrieved += page.messages.len();
            debug!(
                channel = %channel.name,
                count = page.messages.len(),
                "retrieved history page"
            );

            out.extend(
                page.messages
                    .into_iter()
                    .filter(|m| !m.reactions.is_empty()),
            );

            if retrieved > self.max_messages || !page.has_more {
                break;
            }
            match page.next_cursor {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }
        Ok(())
    }
}

fn distinct_labels(messages: &[Message]) -> Vec<Label> {
    let mut seen = HashSet::new();
    messages
        .iter()
        .flat_map(|m| m.reactions.iter())
        .filter(|r| seen.insert(r.name.clone()))
        .map(|r| r.name.clone())
        .collect()
}
