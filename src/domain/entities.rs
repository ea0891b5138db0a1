//! Domain entities. Pure data structures for the core business.
//!
//! No chat-platform/IO types here — these are mapped from adapters.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A reaction name. Opaque to the model; the set of labels is fixed per session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Label(String);

impl Label {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Label {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for Label {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Normalized terms of one text message, in order, duplicates kept.
pub type Document = Vec<String>;

/// A reaction attached to a message: `count` people reacted with `name`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reaction {
    pub name: Label,
    pub count: u32,
}

impl Reaction {
    pub fn new(name: impl Into<Label>, count: u32) -> Self {
        Self {
            name: name.into(),
            count,
        }
    }
}

impl fmt::Display for Reaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name, self.count)
    }
}

/// A single chat message with its observed reactions. Unit of training data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub text: String,
    #[serde(default)]
    pub reactions: Vec<Reaction>,
}

impl Message {
    pub fn new(text: impl Into<String>, reactions: Vec<Reaction>) -> Self {
        Self {
            text: text.into(),
            reactions,
        }
    }
}

/// A channel whose history can be replayed for training.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    pub id: String,
    pub name: String,
}

/// One page of channel history. `next_cursor` is passed back to fetch the following page.
#[derive(Debug, Clone, Default)]
pub struct HistoryPage {
    pub messages: Vec<Message>,
    pub next_cursor: Option<String>,
    pub has_more: bool,
}
