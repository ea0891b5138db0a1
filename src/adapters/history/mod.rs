//! History adapters. Implement HistoryPort.
//!
//! JSON channel exports on disk, plus a fixed in-memory source.

pub mod json_export;
pub mod memory;

pub use json_export::JsonExportHistory;
pub use memory::InMemoryHistory;
