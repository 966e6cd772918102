//! Core types for the image features.

use crate::error::{Result, StudioError};
use crate::media::MediaPayload;
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Image formats the studio recognizes on upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    /// PNG format (lossless).
    #[default]
    Png,
    /// JPEG format (lossy).
    Jpeg,
    /// WebP format.
    WebP,
    /// GIF format.
    Gif,
}

impl ImageFormat {
    /// Returns the file extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::WebP => "webp",
            Self::Gif => "gif",
        }
    }

    /// Returns the MIME type for this format.
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::WebP => "image/webp",
            Self::Gif => "image/gif",
        }
    }

    /// Attempts to detect format from file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "webp" => Some(Self::WebP),
            "gif" => Some(Self::Gif),
            _ => None,
        }
    }

    /// Detects image format from magic bytes.
    pub fn from_magic_bytes(data: &[u8]) -> Option<Self> {
        // PNG: 89 50 4E 47 0D 0A 1A 0A
        if data.starts_with(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]) {
            return Some(Self::Png);
        }

        // JPEG: FF D8 FF
        if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Some(Self::Jpeg);
        }

        if data.starts_with(b"GIF87a") || data.starts_with(b"GIF89a") {
            return Some(Self::Gif);
        }

        // WebP: RIFF....WEBP
        if data.len() >= 12 && data.starts_with(b"RIFF") && &data[8..12] == b"WEBP" {
            return Some(Self::WebP);
        }

        None
    }
}

/// Output aspect ratios offered for generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AspectRatio {
    /// 1:1 square.
    #[default]
    #[serde(rename = "1:1")]
    Square,
    /// 2:3 portrait.
    #[serde(rename = "2:3")]
    Portrait2x3,
    /// 3:2 landscape.
    #[serde(rename = "3:2")]
    Landscape3x2,
    /// 3:4 portrait.
    #[serde(rename = "3:4")]
    Portrait3x4,
    /// 4:3 landscape.
    #[serde(rename = "4:3")]
    Landscape4x3,
    /// 9:16 tall portrait.
    #[serde(rename = "9:16")]
    Portrait9x16,
    /// 16:9 widescreen.
    #[serde(rename = "16:9")]
    Landscape16x9,
    /// 21:9 cinematic.
    #[serde(rename = "21:9")]
    Cinematic,
}

impl AspectRatio {
    /// Every ratio, in the order a picker shows them.
    pub const ALL: [AspectRatio; 8] = [
        Self::Square,
        Self::Portrait2x3,
        Self::Landscape3x2,
        Self::Portrait3x4,
        Self::Landscape4x3,
        Self::Portrait9x16,
        Self::Landscape16x9,
        Self::Cinematic,
    ];

    /// Returns the aspect ratio as a string (e.g., "16:9").
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Square => "1:1",
            Self::Portrait2x3 => "2:3",
            Self::Landscape3x2 => "3:2",
            Self::Portrait3x4 => "3:4",
            Self::Landscape4x3 => "4:3",
            Self::Portrait9x16 => "9:16",
            Self::Landscape16x9 => "16:9",
            Self::Cinematic => "21:9",
        }
    }

    /// Parses "W:H" notation.
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.as_str() == s.trim())
    }
}

impl std::fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Output resolution tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum ImageSize {
    /// Roughly 1024px on the long edge.
    #[default]
    #[serde(rename = "1K")]
    Size1K,
    /// Roughly 2048px.
    #[serde(rename = "2K")]
    Size2K,
    /// Roughly 4096px.
    #[serde(rename = "4K")]
    Size4K,
}

impl ImageSize {
    /// The highest resolution the service supports.
    pub const MAX: ImageSize = ImageSize::Size4K;

    /// Returns the wire string ("1K", "2K", "4K").
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Size1K => "1K",
            Self::Size2K => "2K",
            Self::Size4K => "4K",
        }
    }

    /// Parses "1K" / "2K" / "4K", case-insensitively.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "1K" => Some(Self::Size1K),
            "2K" => Some(Self::Size2K),
            "4K" => Some(Self::Size4K),
            _ => None,
        }
    }
}

impl std::fmt::Display for ImageSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Enhancement intensity for upscaling, as a percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Intensity(u8);

impl Intensity {
    /// Creates an intensity, clamping to 0..=100.
    pub fn new(percent: u32) -> Self {
        Self(percent.min(100) as u8)
    }

    /// Returns the percentage.
    pub fn percent(&self) -> u8 {
        self.0
    }

    /// Returns the sharpening band for this intensity.
    pub fn strength(&self) -> Strength {
        match self.0 {
            0..=29 => Strength::Subtle,
            30..=80 => Strength::Strong,
            _ => Strength::Extreme,
        }
    }
}

impl Default for Intensity {
    fn default() -> Self {
        Self(75)
    }
}

/// Sharpening band derived from an [`Intensity`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strength {
    /// Below 30%.
    Subtle,
    /// 30% to 80% inclusive.
    Strong,
    /// Above 80%.
    Extreme,
}

impl Strength {
    /// Natural-language descriptor embedded in the instruction.
    pub fn descriptor(&self) -> &'static str {
        match self {
            Self::Subtle => "subtle and natural",
            Self::Strong => "strong and distinct",
            Self::Extreme => "extreme and ultra-sharp",
        }
    }
}

/// A text-to-image request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// The text prompt describing the desired image.
    pub prompt: String,
    /// Output aspect ratio.
    pub aspect_ratio: AspectRatio,
    /// Output resolution.
    pub image_size: ImageSize,
}

impl GenerationRequest {
    /// Creates a new request with default ratio and size.
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            aspect_ratio: AspectRatio::default(),
            image_size: ImageSize::default(),
        }
    }

    /// Sets the aspect ratio.
    pub fn with_aspect_ratio(mut self, ratio: AspectRatio) -> Self {
        self.aspect_ratio = ratio;
        self
    }

    /// Sets the output resolution.
    pub fn with_image_size(mut self, size: ImageSize) -> Self {
        self.image_size = size;
        self
    }
}

/// An instruction-driven edit of an uploaded image.
#[derive(Debug, Clone)]
pub struct EditRequest {
    /// Image to edit.
    pub source: MediaPayload,
    /// What to change.
    pub instruction: String,
}

/// A free-form question about an uploaded image.
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    /// Image to analyze.
    pub source: MediaPayload,
    /// What to look for.
    pub prompt: String,
}

/// A deblur + upscale of an uploaded image.
#[derive(Debug, Clone)]
pub struct UpscaleRequest {
    /// Image to enhance.
    pub source: MediaPayload,
    /// How hard to sharpen.
    pub intensity: Intensity,
}

impl UpscaleRequest {
    /// Builds the instruction text sent alongside the image.
    pub fn instruction(&self) -> String {
        format!(
            "Fix blur, remove noise, and upscale this image to high fidelity 4K resolution.\n\
             Enhancement Intensity: {}%.\n\
             Apply a {} level of sharpening and detail restoration.\n\
             Ensure the subject remains faithful to the original but significantly clearer.",
            self.intensity.percent(),
            self.intensity.strength().descriptor(),
        )
    }
}

/// A displayable image returned by the service.
///
/// Always rendered as a PNG data URI, whatever MIME type the service
/// reported, so it can be used directly as an image source or download.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "image reference should be displayed or saved"]
pub struct ImageReference {
    data: String,
}

impl ImageReference {
    const PREFIX: &'static str = "data:image/png;base64,";

    /// Wraps base64 image bytes as returned inline by the service.
    pub fn from_base64(data: impl Into<String>) -> Self {
        Self { data: data.into() }
    }

    /// Returns the base64 payload without the data URI prefix.
    pub fn base64(&self) -> &str {
        &self.data
    }

    /// Returns the `data:image/png;base64,...` string.
    pub fn data_uri(&self) -> String {
        format!("{}{}", Self::PREFIX, self.data)
    }

    /// Decodes the image bytes.
    pub fn decode(&self) -> Result<Vec<u8>> {
        base64::engine::general_purpose::STANDARD
            .decode(&self.data)
            .map_err(|e| StudioError::Decode(e.to_string()))
    }

    /// Writes the decoded image to `path`.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, self.decode()?)?;
        Ok(())
    }
}

impl std::fmt::Display for ImageReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", Self::PREFIX, self.data)
    }
}
