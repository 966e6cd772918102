//! The client trait every feature calls through.

use crate::client::session::ChatSession;
use crate::error::Result;
use crate::image::{AnalysisRequest, EditRequest, GenerationRequest, ImageReference, UpscaleRequest};
use crate::media::{self, MediaPayload, SelectedFile};
use async_trait::async_trait;

/// Reply substituted when a chat response is well-formed but has no text.
pub const EMPTY_CHAT_REPLY: &str = "No response text found.";

/// Boundary between local state and the remote generative service.
///
/// Each async method performs exactly one outbound call and never retries.
#[async_trait]
pub trait StudioClient: Send + Sync {
    /// Opens a conversation pinned to the reasoning model. No network call.
    fn open_chat_session(&self) -> ChatSession;

    /// Sends the next user turn and returns the model's reply.
    ///
    /// Returns [`EMPTY_CHAT_REPLY`] when the reply carries no text.
    async fn send_chat_turn(&self, session: &mut ChatSession, text: &str) -> Result<String>;

    /// Describes an image according to the prompt.
    async fn analyze(&self, request: &AnalysisRequest) -> Result<String>;

    /// Generates an image from text.
    async fn generate(&self, request: &GenerationRequest) -> Result<ImageReference>;

    /// Edits an image according to an instruction.
    async fn edit(&self, request: &EditRequest) -> Result<ImageReference>;

    /// Deblurs and upscales an image at maximum resolution.
    async fn upscale(&self, request: &UpscaleRequest) -> Result<ImageReference>;

    /// Reads and encodes a selected file for upload.
    async fn encode_media(&self, file: &SelectedFile) -> Result<MediaPayload> {
        media::encode_media(file).await
    }
}
