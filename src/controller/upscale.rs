//! Unblur & 4K upscale.

use super::{Phase, ResultSlot};
use crate::image::{ImageReference, Intensity};
use crate::media::SelectedFile;

const FAILURE_MESSAGE: &str = "Failed to upscale image. Please try again.";

/// Work handed out by [`UpscaleController::trigger`].
#[derive(Debug, Clone)]
pub struct UpscaleJob {
    /// Image to enhance.
    pub file: SelectedFile,
    /// Sharpening intensity.
    pub intensity: Intensity,
}

/// State of the upscale view.
#[derive(Debug, Clone, Default)]
pub struct UpscaleController {
    file: Option<SelectedFile>,
    intensity: Intensity,
    slot: ResultSlot<ImageReference>,
}

impl UpscaleController {
    /// Picks a new source image; drops the previous result.
    pub fn select_file(&mut self, file: SelectedFile) {
        self.file = Some(file);
        self.slot.clear_result();
        self.slot.rearm();
    }

    /// Sets the enhancement intensity.
    pub fn set_intensity(&mut self, intensity: Intensity) {
        self.intensity = intensity;
        self.slot.rearm();
    }

    /// Starts an upscale if a file is selected and nothing is pending.
    pub fn trigger(&mut self) -> Option<UpscaleJob> {
        let file = self.file.clone()?;
        if !self.slot.begin() {
            return None;
        }
        Some(UpscaleJob {
            file,
            intensity: self.intensity,
        })
    }

    /// Applies the outcome of the pending upscale.
    pub fn settle(&mut self, outcome: crate::Result<ImageReference>) {
        self.slot.settle("upscale", outcome, FAILURE_MESSAGE);
    }

    /// Selected file, if any.
    pub fn file(&self) -> Option<&SelectedFile> {
        self.file.as_ref()
    }

    /// Current intensity.
    pub fn intensity(&self) -> Intensity {
        self.intensity
    }

    /// Result and loading state.
    pub fn slot(&self) -> &ResultSlot<ImageReference> {
        &self.slot
    }

    /// Current phase.
    pub fn phase(&self) -> Phase {
        self.slot.phase(self.file.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StudioError;

    fn photo() -> SelectedFile {
        SelectedFile::with_mime_type("photo.jpg", "image/jpeg").unwrap()
    }

    #[test]
    fn test_trigger_requires_file() {
        let mut ctrl = UpscaleController::default();
        assert_eq!(ctrl.phase(), Phase::Idle);
        assert!(ctrl.trigger().is_none());
        assert_eq!(ctrl.phase(), Phase::Idle);
    }

    #[test]
    fn test_trigger_carries_intensity() {
        let mut ctrl = UpscaleController::default();
        assert_eq!(ctrl.intensity().percent(), 75);
        ctrl.select_file(photo());
        ctrl.set_intensity(Intensity::new(85));
        assert_eq!(ctrl.phase(), Phase::AwaitingInput);

        let job = ctrl.trigger().unwrap();
        assert_eq!(job.intensity.percent(), 85);
        assert_eq!(job.file, photo());
        assert!(ctrl.trigger().is_none());
        assert!(ctrl.slot().is_loading());
    }

    #[test]
    fn test_new_file_clears_result() {
        let mut ctrl = UpscaleController::default();
        ctrl.select_file(photo());
        ctrl.trigger().unwrap();
        ctrl.settle(Ok(ImageReference::from_base64("AAAA")));
        assert_eq!(ctrl.phase(), Phase::HasResult);

        ctrl.select_file(photo());
        assert!(ctrl.slot().result().is_none());
        assert_eq!(ctrl.phase(), Phase::AwaitingInput);
    }

    #[test]
    fn test_failure_message() {
        let mut ctrl = UpscaleController::default();
        ctrl.select_file(photo());
        ctrl.trigger().unwrap();
        ctrl.settle(Err(StudioError::NoResult("No upscaled image returned.".into())));
        assert_eq!(ctrl.phase(), Phase::HasError);
        assert_eq!(ctrl.slot().error().unwrap().message, FAILURE_MESSAGE);
    }
}
