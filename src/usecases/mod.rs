//! Application use cases. Orchestrate domain logic via ports.

pub mod reactor;
pub mod reply_service;
pub mod training_service;
pub mod training_worker;

pub use reactor::{Reactor, ReactorOptions};
pub use reply_service::ReplyService;
pub use training_service::{TrainingService, TrainingSummary};
pub use training_worker::TrainingWorker;
