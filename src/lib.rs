//! reactor-bot: guesses which emoji reaction a chat message will get, learned from channel history.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod shared;
pub mod usecases;
