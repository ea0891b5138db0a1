//! Async task: reads training jobs from the bounded queue and applies them to the model.
//!
//! Several workers may share one receiver. Every update takes the model's write lock,
//! so the model only ever sees one writer at a time.

use crate::domain::{tokenize, DomainError, Label, Message};
use crate::usecases::reactor::SharedModel;
use std::sync::Arc;
use tokio::sync::{mpsc, watch, Mutex};
use tracing::{debug, info, warn};

/// A message queued for training, tagged with the session it was learned in.
#[derive(Debug)]
pub struct TrainingJob {
    pub generation: u64,
    pub message: Message,
}

/// What happened to a job once a worker picked it up.
#[derive(Debug, PartialEq, Eq)]
enum Outcome {
    Applied,
    /// The session the job was learned in has been replaced.
    Stale,
}

/// Training worker. Consumes the queue until it is closed and drained.
pub struct TrainingWorker {
    id: usize,
    model: SharedModel,
    rx: Arc<Mutex<mpsc::Receiver<TrainingJob>>>,
    pending: Arc<watch::Sender<usize>>,
}

impl TrainingWorker {
    pub fn new(
        id: usize,
        model: SharedModel,
        rx: Arc<Mutex<mpsc::Receiver<TrainingJob>>>,
        pending: Arc<watch::Sender<usize>>,
    ) -> Self {
        Self {
            id,
            model,
            rx,
            pending,
        }
    }

    /// Run the worker. A failing message is logged and skipped; the loop only
    /// ends when the queue is closed.
    pub async fn run(self) {
        loop {
            let job = self.rx.lock().await.recv().await;
            let Some(job) = job else { break };

            match self.apply(job).await {
                Ok(Outcome::Applied) => {}
                Ok(Outcome::Stale) => {
                    debug!(worker = self.id, "dropping message from a replaced session")
                }
                Err(e) => warn!(worker = self.id, error = %e, "training message rejected"),
            }
            self.pending.send_modify(|n| *n = n.saturating_sub(1));
        }

        info!(worker = self.id, "training worker finished (queue closed)");
    }

    async fn apply(&self, job: TrainingJob) -> Result<Outcome, DomainError> {
        let TrainingJob {
            generation,
            message,
        } = job;
        let words = tokenize(&message.text);
        let observations: Vec<(Label, u32)> = message
            .reactions
            .iter()
            .map(|r| (r.name.clone(), r.count))
            .collect();

        let mut slot = self.model.write().await;
        if slot.generation != generation {
            return Ok(Outcome::Stale);
        }
        let Some(model) = slot.model.as_mut() else {
            return Ok(Outcome::Stale);
        };

        debug!(
            worker = self.id,
            raw = %message.text,
            words = ?words,
            reactions = ?message.reactions.iter().map(ToString::to_string).collect::<Vec<_>>(),
            "training on message"
        );
        model.update_all(&words, &observations)?;
        Ok(Outcome::Applied)
    }
}
