//! Reactor: owns the classifier and the training pipeline.
//!
//! All model access goes through one `RwLock`: `predict` takes the read side,
//! worker updates and `start_session` take the write side. The classifier is not
//! reentrant; this lock is the only thing keeping it single-writer.

use crate::domain::{tokenize, Classifier, DomainError, Label, Message, Prediction};
use crate::shared::config::{DEFAULT_QUEUE_CAPACITY, DEFAULT_WORKERS};
use crate::usecases::training_worker::{TrainingJob, TrainingWorker};
use std::sync::Arc;
use tokio::sync::{mpsc, watch, Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// The current model and the session it belongs to. `model` is `None` until the first session.
#[derive(Debug, Default)]
pub struct ModelSlot {
    pub generation: u64,
    pub model: Option<Classifier>,
}

pub type SharedModel = Arc<RwLock<ModelSlot>>;

/// Training pipeline sizing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReactorOptions {
    /// Messages buffered between `learn` callers and workers. `learn` waits when full.
    pub queue_capacity: usize,
    /// Worker loops applying updates. Updates are serialized by the model lock either way.
    pub workers: usize,
}

impl Default for ReactorOptions {
    fn default() -> Self {
        Self {
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            workers: DEFAULT_WORKERS,
        }
    }
}

/// Reaction predictor. Share it as `Arc<Reactor>`.
pub struct Reactor {
    model: SharedModel,
    tx: RwLock<Option<mpsc::Sender<TrainingJob>>>,
    /// Jobs enqueued but not yet applied or discarded.
    pending: Arc<watch::Sender<usize>>,
    workers: Mutex<Vec<JoinHandle<()>>>,
}

impl Reactor {
    /// Create an untrained reactor and spawn its workers. Must be called inside a tokio runtime.
    pub fn new(options: ReactorOptions) -> Result<Self, DomainError> {
        if options.queue_capacity == 0 {
            return Err(DomainError::InvalidConfiguration(
                "training queue capacity must be at least 1".into(),
            ));
        }
        if options.workers == 0 {
            return Err(DomainError::InvalidConfiguration(
                "at least one training worker is required".into(),
            ));
        }

        let model: SharedModel = Arc::new(RwLock::new(ModelSlot::default()));
        let (tx, rx) = mpsc::channel(options.queue_capacity);
        let rx = Arc::new(Mutex::new(rx));
        let (pending, _) = watch::channel(0usize);
        let pending = Arc::new(pending);

        let handles = (0..options.workers)
            .map(|id| {
                let worker = TrainingWorker::new(
                    id,
                    Arc::clone(&model),
                    Arc::clone(&rx),
                    Arc::clone(&pending),
                );
                tokio::spawn(worker.run())
            })
            .collect();

        info!(
            queue_capacity = options.queue_capacity,
            workers = options.workers,
            "reactor ready (untrained)"
        );

        Ok(Self {
            model,
            tx: RwLock::new(Some(tx)),
            pending,
            workers: Mutex::new(handles),
        })
    }

    /// Replace the model with a fresh one over `labels`.
    ///
    /// Waits for in-flight predictions and updates to finish. Messages learned
    /// for the previous session and still queued are discarded by the workers.
    /// On error the current model is left as it was.
    pub async fn start_session(&self, labels: Vec<Label>) -> Result<(), DomainError> {
        let model = Classifier::new(labels)?;
        let label_count = model.labels().len();

        let mut slot = self.model.write().await;
        slot.generation += 1;
        slot.model = Some(model);
        info!(
            generation = slot.generation,
            labels = label_count,
            "training session started"
        );
        Ok(())
    }

    /// Queue `message` for training. Waits while the queue is full.
    ///
    /// Discarded (with a log line) when no session has started or after `shutdown`.
    pub async fn learn(&self, message: Message) {
        let generation = {
            let slot = self.model.read().await;
            if slot.model.is_none() {
                debug!("no training session yet; discarding message");
                return;
            }
            slot.generation
        };

        let Some(tx) = self.tx.read().await.clone() else {
            warn!("reactor is shut down; discarding message");
            return;
        };

        self.pending.send_modify(|n| *n += 1);
        if tx.send(TrainingJob { generation, message }).await.is_err() {
            self.pending.send_modify(|n| *n = n.saturating_sub(1));
            warn!("training queue closed; discarding message");
        }
    }

    /// Best-fitting label for `text`.
    pub async fn predict(&self, text: &str) -> Result<Label, DomainError> {
        Ok(self.score(text).await?.label)
    }

    /// Winning label plus the log-score of every label.
    pub async fn score(&self, text: &str) -> Result<Prediction, DomainError> {
        let words = tokenize(text);
        let slot = self.model.read().await;
        let model = slot.model.as_ref().ok_or(DomainError::ModelNotReady)?;
        let prediction = model.score(&words);
        debug!(text, scores = ?prediction.scores, label = %prediction.label, "scored message");
        Ok(prediction)
    }

    /// Labels of the current session, in configured order. Empty when untrained.
    pub async fn current_labels(&self) -> Vec<Label> {
        self.model
            .read()
            .await
            .model
            .as_ref()
            .map(|m| m.labels().to_vec())
            .unwrap_or_default()
    }

    pub async fn is_ready(&self) -> bool {
        self.model.read().await.model.is_some()
    }

    /// Wait until every message queued so far has been applied or discarded.
    pub async fn flush(&self) {
        let mut rx = self.pending.subscribe();
        // The sender lives as long as `self`, so this cannot fail.
        let _ = rx.wait_for(|n| *n == 0).await;
    }

    /// Stop accepting messages, let workers drain the queue, then wait for them to exit.
    pub async fn shutdown(&self) {
        drop(self.tx.write().await.take());
        let handles = std::mem::take(&mut *self.workers.lock().await);
        for handle in handles {
            if let Err(e) = handle.await {
                error!(error = %e, "training worker panicked");
            }
        }
        info!("reactor shut down");
    }
}
