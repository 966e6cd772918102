//! Text-to-image generation.

use super::{Phase, ResultSlot};
use crate::image::{AspectRatio, GenerationRequest, ImageReference, ImageSize};

const FAILURE_MESSAGE: &str = "Generation failed";

/// State of the generation view.
#[derive(Debug, Clone, Default)]
pub struct GenerateController {
    prompt: String,
    aspect_ratio: AspectRatio,
    image_size: ImageSize,
    slot: ResultSlot<ImageReference>,
}

impl GenerateController {
    /// Replaces the prompt.
    pub fn set_prompt(&mut self, prompt: impl Into<String>) {
        self.prompt = prompt.into();
        self.slot.rearm();
    }

    /// Sets the output aspect ratio.
    pub fn set_aspect_ratio(&mut self, ratio: AspectRatio) {
        self.aspect_ratio = ratio;
        self.slot.rearm();
    }

    /// Sets the output resolution.
    pub fn set_image_size(&mut self, size: ImageSize) {
        self.image_size = size;
        self.slot.rearm();
    }

    fn ready(&self) -> bool {
        !self.prompt.trim().is_empty()
    }

    /// Starts a generation if a prompt is set and nothing is pending.
    pub fn trigger(&mut self) -> Option<GenerationRequest> {
        if !self.ready() || !self.slot.begin() {
            return None;
        }
        Some(
            GenerationRequest::new(self.prompt.clone())
                .with_aspect_ratio(self.aspect_ratio)
                .with_image_size(self.image_size),
        )
    }

    /// Applies the outcome of the pending generation.
    pub fn settle(&mut self, outcome: crate::Result<ImageReference>) {
        self.slot.settle("generate", outcome, FAILURE_MESSAGE);
    }

    /// Current prompt.
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// Current aspect ratio.
    pub fn aspect_ratio(&self) -> AspectRatio {
        self.aspect_ratio
    }

    /// Current resolution.
    pub fn image_size(&self) -> ImageSize {
        self.image_size
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
    use crate::error::StudioError;

    #[test]
    fn test_blank_prompt_is_noop() {
        let mut ctrl = GenerateController::default();
        ctrl.set_prompt("   ");
        assert!(ctrl.trigger().is_none());
        assert_eq!(ctrl.phase(), Phase::Idle);
    }

    #[test]
    fn test_trigger_builds_request() {
        let mut ctrl = GenerateController::default();
        ctrl.set_prompt("A futuristic city with neon lights");
        ctrl.set_aspect_ratio(AspectRatio::Cinematic);
        ctrl.set_image_size(ImageSize::Size2K);

        let req = ctrl.trigger().unwrap();
        assert_eq!(req.prompt, "A futuristic city with neon lights");
        assert_eq!(req.aspect_ratio, AspectRatio::Cinematic);
        assert_eq!(req.image_size, ImageSize::Size2K);
    }

    #[test]
    fn test_no_image_ends_in_error() {
        let mut ctrl = GenerateController::default();
        ctrl.set_prompt("anything");
        ctrl.trigger().unwrap();
        ctrl.settle(Err(StudioError::NoResult("No image generated.".into())));

        assert_eq!(ctrl.phase(), Phase::HasError);
        assert!(ctrl.slot().result().is_none());
        assert_eq!(ctrl.slot().error().unwrap().message, FAILURE_MESSAGE);
    }
}
