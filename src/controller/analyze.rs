//! Free-form image analysis.

use super::{Phase, ResultSlot};
use crate::media::SelectedFile;

/// Prompt pre-filled in the analysis view.
pub const DEFAULT_ANALYSIS_PROMPT: &str = "Describe this image in detail.";

const FAILURE_MESSAGE: &str = "Error analyzing image.";

/// Work handed out by [`AnalyzeController::trigger`].
#[derive(Debug, Clone)]
pub struct AnalyzeJob {
    /// Image to describe.
    pub file: SelectedFile,
    /// What to look for.
    pub prompt: String,
}

/// State of the analysis view.
#[derive(Debug, Clone)]
pub struct AnalyzeController {
    file: Option<SelectedFile>,
    prompt: String,
    slot: ResultSlot<String>,
}

impl Default for AnalyzeController {
    fn default() -> Self {
        Self {
            file: None,
            prompt: DEFAULT_ANALYSIS_PROMPT.to_string(),
            slot: ResultSlot::default(),
        }
    }
}

impl AnalyzeController {
    /// Picks a new image; drops the previous description.
    pub fn select_file(&mut self, file: SelectedFile) {
        self.file = Some(file);
        self.slot.clear_result();
        self.slot.rearm();
    }

    /// Replaces the question asked about the image.
    pub fn set_prompt(&mut self, prompt: impl Into<String>) {
        self.prompt = prompt.into();
        self.slot.rearm();
    }

    /// Starts an analysis if an image is selected and nothing is pending.
    pub fn trigger(&mut self) -> Option<AnalyzeJob> {
        let file = self.file.clone()?;
        if !self.slot.begin() {
            return None;
        }
        Some(AnalyzeJob {
            file,
            prompt: self.prompt.clone(),
        })
    }

    /// Applies the outcome of the pending analysis.
    pub fn settle(&mut self, outcome: crate::Result<String>) {
        self.slot.settle("analyze", outcome, FAILURE_MESSAGE);
    }

    /// Current prompt.
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// Selected file, if any.
    pub fn file(&self) -> Option<&SelectedFile> {
        self.file.as_ref()
    }

    /// Result and loading state.
    pub fn slot(&self) -> &ResultSlot<String> {
        &self.slot
    }

    /// Current phase.
    pub fn phase(&self) -> Phase {
        self.slot.phase(self.file.is_some())
    }
}
