//! Inbound port. UI (adapter) calls into the application.

use crate::domain::DomainError;

/// Input port: chat front-end feeding user messages to the bot.
#[async_trait::async_trait]
pub trait InputPort: Send + Sync {
    /// Read messages and answer them until the user leaves.
    async fn run(&self) -> Result<(), DomainError>;
}
