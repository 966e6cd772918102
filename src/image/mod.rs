//! Image request and result types.

mod types;

pub use types::{
    AnalysisRequest, AspectRatio, EditRequest, GenerationRequest, ImageFormat, ImageReference,
    ImageSize, Intensity, Strength, UpscaleRequest,
};
