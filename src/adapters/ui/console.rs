//! Implements InputPort. Inquire-based chat prompt.
//!
//! Each line typed is handed to ReplyService and the reply is printed.

use crate::domain::DomainError;
use crate::ports::InputPort;
use crate::usecases::ReplyService;
use async_trait::async_trait;
use inquire::{InquireError, Text};
use std::sync::Arc;
use tracing::info;

/// Console adapter. Inquire prompts; `quit`, Esc or Ctrl-C leaves.
pub struct ConsoleInputPort {
    replies: Arc<ReplyService>,
}

impl ConsoleInputPort {
    pub fn new(replies: Arc<ReplyService>) -> Self {
        Self { replies }
    }
}

/// Prompt for one line on a blocking thread. `None` when the user cancels.
async fn read_line() -> Result<Option<String>, DomainError> {
    let answer = tokio::task::spawn_blocking(|| Text::new("you:").prompt())
        .await
        .map_err(|e| DomainError::Input(e.to_string()))?;
    match answer {
        Ok(line) => Ok(Some(line)),
        Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => Ok(None),
        Err(e) => Err(DomainError::Input(e.to_string())),
    }
}

#[async_trait]
impl InputPort for ConsoleInputPort {
    async fn run(&self) -> Result<(), DomainError> {
        println!("Say something and I'll guess its reaction. Commands: help, update, quit.");
        while let Some(line) = read_line().await? {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            if line == "quit" {
                break;
            }
            let reply = self.replies.handle(line).await;
            println!("bot: {}", reply);
        }
        info!("console closed");
        Ok(())
    }
}
