#![warn(missing_docs)]
//! GenStudio - a Gemini-backed image studio.
//!
//! Five features share one request/response contract:
//!
//! - **Upscale**: deblur and upscale a photo to 4K.
//! - **Chat**: multi-turn conversation with a large reasoning budget.
//! - **Analyze**: describe an image according to a prompt.
//! - **Generate**: text-to-image with aspect ratio and resolution controls.
//! - **Edit**: change an image by instruction.
//!
//! [`StudioClient`] is the single boundary to the remote service and
//! [`GeminiClient`] implements it. Each feature has a controller in
//! [`controller`] that guards against overlapping calls, and [`Studio`]
//! owns all of them behind one update function.
//!
//! # Quick Start
//!
//! ```no_run
//! use genstudio::{GeminiClient, GenerateMsg, Msg, Studio};
//!
//! #[tokio::main]
//! async fn main() -> genstudio::Result<()> {
//!     let client = GeminiClient::builder().build()?;
//!     let mut studio = Studio::new();
//!
//!     studio.update(Msg::Generate(GenerateMsg::SetPrompt(
//!         "A futuristic city with neon lights".into(),
//!     )));
//!     studio.dispatch(&client, Msg::Generate(GenerateMsg::Run)).await;
//!
//!     if let Some(image) = studio.generate().slot().result() {
//!         image.save("city.png")?;
//!     }
//!     Ok(())
//! }
//! ```
//!
//! Calling the client directly works too:
//!
//! ```no_run
//! use genstudio::{GeminiClient, StudioClient};
//!
//! #[tokio::main]
//! async fn main() -> genstudio::Result<()> {
//!     let client = GeminiClient::builder().build()?;
//!     let mut session = client.open_chat_session();
//!     let reply = client.send_chat_turn(&mut session, "Why is the sky blue?").await?;
//!     println!("{reply}");
//!     Ok(())
//! }
//! ```

mod error;

pub mod client;
pub mod controller;
pub mod image;
pub mod media;
pub mod router;
pub mod studio;

// Re-export error types at crate root
pub use error::{ErrorClass, Result, StudioError};

pub use client::{ChatSession, GeminiClient, GeminiClientBuilder, GeminiModels, Role, StudioClient};
pub use controller::{ChatMessage, FeatureError, FeatureResult, Phase};
pub use image::{
    AnalysisRequest, AspectRatio, EditRequest, GenerationRequest, ImageReference, ImageSize,
    Intensity, UpscaleRequest,
};
pub use media::{encode_media, MediaPayload, SelectedFile};
pub use router::{Mode, ModeRouter};
pub use studio::{
    AnalyzeMsg, ChatMsg, Completion, EditMsg, Effect, GenerateMsg, Msg, Studio, UpscaleMsg,
};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::client::{GeminiClient, StudioClient};
    pub use crate::error::{Result, StudioError};
    pub use crate::media::SelectedFile;
    pub use crate::studio::{Msg, Studio};
}
