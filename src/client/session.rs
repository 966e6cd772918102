//! Stateful chat sessions.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Who produced a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The person at the keyboard.
    User,
    /// The generative model.
    Model,
}

impl Role {
    /// Returns the wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Model => "model",
        }
    }
}

/// One completed turn in a session's history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionTurn {
    /// Author of the turn.
    pub role: Role,
    /// Text of the turn.
    pub text: String,
}

/// A multi-turn conversation handle bound to one model configuration.
///
/// Turns are only recorded once an exchange succeeds, so a failed send
/// leaves the history as it was.
#[derive(Debug, Clone)]
pub struct ChatSession {
    id: Uuid,
    model: String,
    thinking_budget: u32,
    history: Vec<SessionTurn>,
}

impl ChatSession {
    /// Creates an empty session.
    pub fn new(model: impl Into<String>, thinking_budget: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            model: model.into(),
            thinking_budget,
            history: Vec::new(),
        }
    }

    /// Opaque identifier of this session.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Model the session is pinned to.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Reasoning budget sent with every turn.
    pub fn thinking_budget(&self) -> u32 {
        self.thinking_budget
    }

    /// Completed turns, oldest first.
    pub fn history(&self) -> &[SessionTurn] {
        &self.history
    }

    /// Records a successful user/model exchange.
    pub fn record_exchange(&mut self, user: impl Into<String>, reply: impl Into<String>) {
        self.history.push(SessionTurn {
            role: Role::User,
            text: user.into(),
        });
        self.history.push(SessionTurn {
            role: Role::Model,
            text: reply.into(),
        });
    }
}
