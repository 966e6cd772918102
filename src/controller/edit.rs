//! Instruction-driven image editing.

use super::{Phase, ResultSlot};
use crate::image::ImageReference;
use crate::media::SelectedFile;

const FAILURE_MESSAGE: &str = "Editing failed";

/// Work handed out by [`EditController::trigger`].
#[derive(Debug, Clone)]
pub struct EditJob {
    /// Image to edit.
    pub file: SelectedFile,
    /// What to change.
    pub instruction: String,
}

/// State of the edit view.
#[derive(Debug, Clone, Default)]
pub struct EditController {
    file: Option<SelectedFile>,
    instruction: String,
    slot: ResultSlot<ImageReference>,
}

impl EditController {
    /// Picks a new image; drops the previous edit.
    pub fn select_file(&mut self, file: SelectedFile) {
        self.file = Some(file);
        self.slot.clear_result();
        self.slot.rearm();
    }

    /// Replaces the edit instruction.
    pub fn set_instruction(&mut self, instruction: impl Into<String>) {
        self.instruction = instruction.into();
        self.slot.rearm();
    }

    fn ready(&self) -> bool {
        self.file.is_some() && !self.instruction.trim().is_empty()
    }

    /// Starts an edit if both inputs are present and nothing is pending.
    pub fn trigger(&mut self) -> Option<EditJob> {
        if !self.ready() {
            return None;
        }
        let file = self.file.clone()?;
        if !self.slot.begin() {
            return None;
        }
        Some(EditJob {
            file,
            instruction: self.instruction.clone(),
        })
    }

    /// Applies the outcome of the pending edit.
    pub fn settle(&mut self, outcome: crate::Result<ImageReference>) {
        self.slot.settle("edit", outcome, FAILURE_MESSAGE);
    }

    /// Current instruction.
    pub fn instruction(&self) -> &str {
        &self.instruction
    }

    /// Result and loading state.
    pub fn slot(&self) -> &ResultSlot<ImageReference> {
        &self.slot
    }

    /// Current phase.
    pub fn phase(&self) -> Phase {
        self.slot.phase(self.ready())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_needs_file_and_instruction() {
        let mut ctrl = EditController::default();
        ctrl.set_instruction("Add a retro filter");
        assert!(ctrl.trigger().is_none());
        assert_eq!(ctrl.phase(), Phase::Idle);

        let mut ctrl = EditController::default();
        ctrl.select_file(SelectedFile::with_mime_type("a.png", "image/png").unwrap());
        assert!(ctrl.trigger().is_none());

        ctrl.set_instruction("Make it snowy");
        assert_eq!(ctrl.phase(), Phase::AwaitingInput);
        let job = ctrl.trigger().unwrap();
        assert_eq!(job.instruction, "Make it snowy");
        assert_eq!(ctrl.phase(), Phase::InFlight);
    }
}
