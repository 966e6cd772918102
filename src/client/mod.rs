//! Client session adapter for the generative service.

mod gemini;
mod provider;
mod session;

pub use gemini::{
    GeminiClient, GeminiClientBuilder, GeminiModels, ResponsePayload, API_KEY_ENV_VARS,
    DEFAULT_THINKING_BUDGET,
};
pub use provider::{StudioClient, EMPTY_CHAT_REPLY};
pub use session::{ChatSession, Role, SessionTurn};
