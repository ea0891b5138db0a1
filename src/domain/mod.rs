//! Core domain layer. No external I/O dependencies.
//!
//! Entities, text normalization and the Naive Bayes model live here. Dependencies flow inward.

pub mod classifier;
pub mod entities;
pub mod errors;
pub mod tokenizer;

pub use classifier::{Classifier, Prediction};
pub use entities::{Channel, Document, HistoryPage, Label, Message, Reaction};
pub use errors::DomainError;
pub use tokenizer::tokenize;
