//! Per-feature interaction state machines.
//!
//! Every controller follows the same cycle: inputs arrive, a trigger
//! hands out at most one pending job, and the job's outcome is settled
//! back in. A trigger while a job is pending, or before the required
//! inputs are present, returns `None` and changes nothing.

mod analyze;
mod chat;
mod edit;
mod generate;
mod upscale;

pub use analyze::{AnalyzeController, AnalyzeJob, DEFAULT_ANALYSIS_PROMPT};
pub use chat::{ChatController, ChatJob, ChatMessage, CHAT_ERROR_REPLY};
pub use edit::{EditController, EditJob};
pub use generate::GenerateController;
pub use upscale::{UpscaleController, UpscaleJob};

use crate::error::{ErrorClass, StudioError};
use crate::image::ImageReference;

/// Where a controller is in its request cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Required inputs are missing.
    Idle,
    /// Inputs are present and nothing is pending.
    AwaitingInput,
    /// One call is outstanding.
    InFlight,
    /// The last call succeeded.
    HasResult,
    /// The last call failed.
    HasError,
}

/// The outcome a controller currently holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureResult<'a> {
    /// Reply or description text.
    Text(&'a str),
    /// A returned image.
    Image(&'a ImageReference),
}

impl<'a> FeatureResult<'a> {
    /// The text, if this is a text result.
    pub fn as_text(&self) -> Option<&'a str> {
        match self {
            Self::Text(text) => Some(*text),
            Self::Image(_) => None,
        }
    }

    /// The image, if this is an image result.
    pub fn as_image(&self) -> Option<&'a ImageReference> {
        match self {
            Self::Image(image) => Some(*image),
            Self::Text(_) => None,
        }
    }
}

/// A failure as shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureError {
    /// Which class of failure this was.
    pub class: ErrorClass,
    /// One-line message for display.
    pub message: String,
    /// Underlying error text, for logs.
    pub detail: String,
}

impl FeatureError {
    pub(crate) fn new(message: &str, err: &StudioError) -> Self {
        Self {
            class: err.class(),
            message: message.to_string(),
            detail: err.to_string(),
        }
    }
}

/// Loading flag plus the latest result or error of one controller.
#[derive(Debug, Clone)]
pub struct ResultSlot<T> {
    in_flight: bool,
    armed: bool,
    result: Option<T>,
    error: Option<FeatureError>,
}

impl<T> Default for ResultSlot<T> {
    fn default() -> Self {
        Self {
            in_flight: false,
            armed: false,
            result: None,
            error: None,
        }
    }
}

impl<T> ResultSlot<T> {
    /// True while a call is outstanding.
    pub fn is_loading(&self) -> bool {
        self.in_flight
    }

    /// Latest successful result.
    pub fn result(&self) -> Option<&T> {
        self.result.as_ref()
    }

    /// Latest failure.
    pub fn error(&self) -> Option<&FeatureError> {
        self.error.as_ref()
    }

    fn begin(&mut self) -> bool {
        if self.in_flight {
            return false;
        }
        self.in_flight = true;
        self.error = None;
        true
    }

    fn settle(&mut self, feature: &'static str, outcome: crate::Result<T>, failure: &str) {
        self.in_flight = false;
        self.armed = false;
        match outcome {
            Ok(value) => {
                self.result = Some(value);
                self.error = None;
            }
            Err(err) => {
                tracing::warn!(feature, class = ?err.class(), "request failed: {err}");
                self.result = None;
                self.error = Some(FeatureError::new(failure, &err));
            }
        }
    }

    /// Marks inputs as changed since the last settle.
    fn rearm(&mut self) {
        self.armed = true;
        self.error = None;
    }

    fn clear_result(&mut self) {
        self.result = None;
    }

    fn phase(&self, ready: bool) -> Phase {
        if self.in_flight {
            return Phase::InFlight;
        }
        if !self.armed {
            if self.error.is_some() {
                return Phase::HasError;
            }
            if self.result.is_some() {
                return Phase::HasResult;
            }
        }
        if ready {
            Phase::AwaitingInput
        } else {
            Phase::Idle
        }
    }
}
