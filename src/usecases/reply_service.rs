//! Command handling: turn an incoming chat message into the bot's reply.
//!
//! `update` retrains from history, `help` describes the bot, anything else gets
//! a reaction guess.

use crate::domain::{DomainError, Label};
use crate::usecases::reactor::Reactor;
use crate::usecases::training_service::TrainingService;
use rand::seq::SliceRandom;
use std::sync::Arc;
use tracing::{info, warn};

/// Openers for a reaction guess; one is picked at random per reply.
const PREFIXES: &[&str] = &[
    "I'm guessing the reaction will be",
    "That looks like a",
    "That's sure to get a",
    "I bet that people will react with",
];

const STILL_LEARNING: &str = "Hold on, I'm still learning about your team!";
const NOT_TRAINED: &str = "I don't know anything about you yet!";

pub struct ReplyService {
    reactor: Arc<Reactor>,
    training: Arc<TrainingService>,
}

impl ReplyService {
    pub fn new(reactor: Arc<Reactor>, training: Arc<TrainingService>) -> Self {
        Self { reactor, training }
    }

    /// Reply to one incoming message.
    pub async fn handle(&self, text: &str) -> String {
        match text.trim() {
            "update" => self.update().await,
            "help" => self.help().await,
            other => self.react(other).await,
        }
    }

    async fn update(&self) -> String {
        match self.training.refresh().await {
            Ok(summary) => format!(
                "I've learned from {} messages in {} channels",
                summary.messages, summary.channels
            ),
            Err(e) => {
                warn!(error = %e, "update failed");
                format!("I couldn't update: {}", e)
            }
        }
    }

    async fn help(&self) -> String {
        info!("helping the user");
        let mut reply = format!(
            "I guess reactions to messages based on up to the past {} seen in each channel.",
            self.training.max_messages()
        );
        let labels = self.reactor.current_labels().await;
        if !labels.is_empty() {
            reply.push_str(" I'm currently aware of the following reactions:\n");
            reply.push_str(&format_labels(&labels));
        }
        reply
    }

    async fn react(&self, text: &str) -> String {
        if self.training.is_learning() {
            return STILL_LEARNING.to_string();
        }
        match self.reactor.predict(text).await {
            Ok(label) => {
                info!(text, reaction = %label, "reacting");
                let prefix = PREFIXES
                    .choose(&mut rand::thread_rng())
                    .copied()
                    .unwrap_or(PREFIXES[0]);
                format!("{} :{}:", prefix, label)
            }
            Err(DomainError::ModelNotReady) => NOT_TRAINED.to_string(),
            Err(e) => {
                warn!(error = %e, "prediction failed");
                NOT_TRAINED.to_string()
            }
        }
    }
}

/// ` :a:`, ` :a:, and :b:`, ` :a:, :b:, and :c:`.
fn format_labels(labels: &[Label]) -> String {
    let mut out = String::new();
    let last = labels.len().saturating_sub(1);
    for (i, label) in labels.iter().enumerate() {
        if i == 0 {
            out.push_str(" :");
        } else if i == last {
            out.push_str(", and :");
        } else {
            out.push_str(", :");
        }
        out.push_str(label.as_str());
        out.push(':');
    }
    out
}
