//! Infrastructure adapters. Implement ports.
//!
//! History sources and the console front-end. Map errors to DomainError.

pub mod history;
pub mod ui;
