//! Deep-thinking chat.

use super::{FeatureError, Phase};
use crate::client::{ChatSession, Role};

/// Model turn recorded when a send fails.
pub const CHAT_ERROR_REPLY: &str = "Sorry, I encountered an error.";

/// One turn as shown in the conversation log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    /// Author of the turn.
    pub role: Role,
    /// Text of the turn.
    pub text: String,
}

/// Work handed out by [`ChatController::trigger`].
///
/// Owns the session while the call is outstanding; it comes back
/// through [`ChatController::settle`].
#[derive(Debug)]
pub struct ChatJob {
    /// The conversation to continue.
    pub session: ChatSession,
    /// User text for this turn.
    pub text: String,
    /// Chat activation the job belongs to.
    pub epoch: u64,
}

/// State of the chat view.
#[derive(Debug, Default)]
pub struct ChatController {
    session: Option<ChatSession>,
    messages: Vec<ChatMessage>,
    input: String,
    in_flight: bool,
    last_error: Option<FeatureError>,
    epoch: u64,
}

impl ChatController {
    /// True once a session has been opened for this activation.
    pub fn is_open(&self) -> bool {
        self.session.is_some() || self.in_flight
    }

    /// Installs the session for this activation. Ignored if one is open.
    pub fn open(&mut self, session: ChatSession) {
        if self.is_open() {
            return;
        }
        tracing::debug!(session = %session.id(), model = session.model(), "chat session opened");
        self.session = Some(session);
    }

    /// Tears the conversation down. A reply still in flight is discarded.
    pub fn close(&mut self) {
        self.session = None;
        self.messages.clear();
        self.input.clear();
        self.in_flight = false;
        self.last_error = None;
        self.epoch += 1;
    }

    /// Replaces the text being composed.
    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    fn ready(&self) -> bool {
        self.session.is_some() && !self.input.trim().is_empty()
    }

    /// Sends the composed text if a session is open and no reply is pending.
    ///
    /// The user turn is logged immediately; the model turn follows on settle.
    pub fn trigger(&mut self) -> Option<ChatJob> {
        if self.in_flight || !self.ready() {
            return None;
        }
        let session = self.session.take()?;
        let text = std::mem::take(&mut self.input);

        self.messages.push(ChatMessage {
            role: Role::User,
            text: text.clone(),
        });
        self.in_flight = true;
        self.last_error = None;

        Some(ChatJob {
            session,
            text,
            epoch: self.epoch,
        })
    }

    /// Takes the session back and logs the model turn.
    pub fn settle(
        &mut self,
        job_session: ChatSession,
        epoch: u64,
        outcome: crate::Result<String>,
    ) {
        if epoch != self.epoch {
            tracing::debug!(session = %job_session.id(), "dropping reply for closed chat");
            return;
        }

        self.in_flight = false;
        self.session = Some(job_session);

        let text = match outcome {
            Ok(reply) => reply,
            Err(err) => {
                tracing::warn!(feature = "chat", class = ?err.class(), "request failed: {err}");
                self.last_error = Some(FeatureError::new(CHAT_ERROR_REPLY, &err));
                CHAT_ERROR_REPLY.to_string()
            }
        };
        self.messages.push(ChatMessage {
            role: Role::Model,
            text,
        });
    }

    /// Conversation so far, oldest first.
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Text being composed.
    pub fn input(&self) -> &str {
        &self.input
    }

    /// True while a reply is pending.
    pub fn is_loading(&self) -> bool {
        self.in_flight
    }

    /// Failure behind the most recent error turn.
    pub fn last_error(&self) -> Option<&FeatureError> {
        self.last_error.as_ref()
    }

    /// The open session, unless it is lent out to a pending call.
    pub fn session(&self) -> Option<&ChatSession> {
        self.session.as_ref()
    }

    /// Current phase.
    pub fn phase(&self) -> Phase {
        if self.in_flight {
            Phase::InFlight
        } else if self.ready() {
            Phase::AwaitingInput
        } else if self.last_error.is_some() {
            Phase::HasError
        } else if !self.messages.is_empty() {
            Phase::HasResult
        } else {
            Phase::Idle
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StudioError;

    fn open_controller() -> ChatController {
        let mut ctrl = ChatController::default();
        ctrl.open(ChatSession::new("gemini-3-pro-preview", 32768));
        ctrl
    }

    #[test]
    fn test_needs_open_session() {
        let mut ctrl = ChatController::default();
        ctrl.set_input("hello");
        assert!(ctrl.trigger().is_none());
        assert!(ctrl.messages().is_empty());
        assert_eq!(ctrl.phase(), Phase::Idle);
    }

    #[test]
    fn test_blank_input_is_noop() {
        let mut ctrl = open_controller();
        ctrl.set_input("  \n");
        assert!(ctrl.trigger().is_none());
        assert!(ctrl.messages().is_empty());
    }

    #[test]
    fn test_open_is_once_per_activation() {
        let mut ctrl = open_controller();
        let first = ctrl.session().unwrap().id();
        ctrl.open(ChatSession::new("other", 1));
        assert_eq!(ctrl.session().unwrap().id(), first);
    }

    #[test]
    fn test_send_while_pending_is_noop() {
        let mut ctrl = open_controller();
        ctrl.set_input("a");
        let job = ctrl.trigger().unwrap();
        assert_eq!(ctrl.phase(), Phase::InFlight);
        assert!(ctrl.input().is_empty());

        ctrl.set_input("b");
        assert!(ctrl.trigger().is_none());
        assert_eq!(ctrl.messages().len(), 1);

        ctrl.settle(job.session, job.epoch, Ok("reply a".into()));
        assert_eq!(ctrl.messages().len(), 2);
        assert_eq!(ctrl.phase(), Phase::AwaitingInput);
    }

    #[test]
    fn test_error_becomes_model_turn() {
        let mut ctrl = open_controller();
        ctrl.set_input("a");
        let job = ctrl.trigger().unwrap();
        let err = StudioError::Api {
            status: 500,
            message: "boom".into(),
        };
        ctrl.settle(job.session, job.epoch, Err(err));

        assert_eq!(
            ctrl.messages()[1],
            ChatMessage {
                role: Role::Model,
                text: CHAT_ERROR_REPLY.into()
            }
        );
        assert_eq!(ctrl.phase(), Phase::HasError);
        assert!(ctrl.session().is_some());
    }

    #[test]
    fn test_close_discards_late_reply() {
        let mut ctrl = open_controller();
        ctrl.set_input("a");
        let job = ctrl.trigger().unwrap();
        ctrl.close();
        ctrl.settle(job.session, job.epoch, Ok("late".into()));

        assert!(ctrl.messages().is_empty());
        assert!(!ctrl.is_open());
        assert_eq!(ctrl.phase(), Phase::Idle);
    }
}
