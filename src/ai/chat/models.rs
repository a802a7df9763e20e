//! The core models for a chat transcript.
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub enum Role {
    #[serde(rename = "user")]
    User,
    #[serde(rename = "assistant")]
    Assistant,
}

/// One role-tagged message. Never edited once appended.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

impl Turn {
    pub fn new(role: Role, content: &str) -> Self {
        Self {
            role,
            content: content.to_string(),
        }
    }

    pub fn user(content: &str) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: &str) -> Self {
        Self::new(Role::Assistant, content)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum TranscriptEvent {
    Appended { index: usize, turn: Turn },
}

#[derive(Default)]
struct Inner {
    turns: Arc<Vec<Turn>>,
    subscribers: Vec<mpsc::UnboundedSender<TranscriptEvent>>,
}

/// An append-only, ordered list of turns.
///
/// Every append replaces the shared snapshot with a new one so readers
/// holding an older snapshot never see it change, and a change can be
/// detected with `Arc::ptr_eq`.
#[derive(Default)]
pub struct Transcript(Mutex<Inner>);

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_with_turns(turns: Vec<Turn>) -> Self {
        Self(Mutex::new(Inner {
            turns: Arc::new(turns),
            subscribers: Vec::new(),
        }))
    }

    pub fn append(&self, turn: Turn) {
        let mut inner = self.0.lock().expect("Transcript lock poisoned");
        let mut turns = Vec::with_capacity(inner.turns.len() + 1);
        turns.extend(inner.turns.iter().cloned());
        turns.push(turn.clone());
        let index = turns.len() - 1;
        inner.turns = Arc::new(turns);

        // Drop subscribers whose receiver went away
        inner.subscribers.retain(|tx| {
            tx.send(TranscriptEvent::Appended {
                index,
                turn: turn.clone(),
            })
            .is_ok()
        });
    }

    pub fn snapshot(&self) -> Arc<Vec<Turn>> {
        Arc::clone(&self.0.lock().expect("Transcript lock poisoned").turns)
    }

    /// Register for notifications of every subsequent append.
    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<TranscriptEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.0
            .lock()
            .expect("Transcript lock poisoned")
            .subscribers
            .push(tx);
        rx
    }
}
