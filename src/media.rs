//! Turning user-selected files into transport-ready payloads.

use crate::error::{Result, StudioError};
use crate::image::ImageFormat;
use base64::Engine;
use std::path::{Path, PathBuf};

/// A local image file the user picked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    /// Where the file lives.
    pub path: PathBuf,
    /// MIME type of the file, always `image/*`.
    pub mime_type: String,
}

impl SelectedFile {
    /// Selects a file, inferring its MIME type from the extension.
    ///
    /// Falls back to sniffing the first bytes when the extension is
    /// missing or unknown. Non-image files are rejected.
    pub fn from_path(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let from_ext = path
            .extension()
            .and_then(|e| e.to_str())
            .and_then(ImageFormat::from_extension);

        let format = match from_ext {
            Some(format) => format,
            None => sniff(&path)?.ok_or_else(|| {
                StudioError::UnsupportedMedia(format!("{} is not an image", path.display()))
            })?,
        };

        Ok(Self {
            path,
            mime_type: format.mime_type().to_string(),
        })
    }

    /// Selects a file with an explicitly known MIME type.
    pub fn with_mime_type(path: impl Into<PathBuf>, mime_type: impl Into<String>) -> Result<Self> {
        let mime_type = mime_type.into();
        if !mime_type.starts_with("image/") {
            return Err(StudioError::UnsupportedMedia(mime_type));
        }
        Ok(Self {
            path: path.into(),
            mime_type,
        })
    }

    /// File name for display.
    pub fn name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

fn sniff(path: &Path) -> Result<Option<ImageFormat>> {
    use std::io::Read;

    let mut head = [0u8; 12];
    let mut file = std::fs::File::open(path)?;
    let n = file.read(&mut head)?;
    Ok(ImageFormat::from_magic_bytes(&head[..n]))
}

/// An image ready for transport: base64 bytes plus MIME type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaPayload {
    /// MIME type of the encoded bytes.
    pub mime_type: String,
    /// Standard base64 encoding of the file contents.
    pub data: String,
}

impl MediaPayload {
    /// Encodes raw bytes.
    pub fn from_bytes(mime_type: impl Into<String>, bytes: &[u8]) -> Self {
        Self {
            mime_type: mime_type.into(),
            data: base64::engine::general_purpose::STANDARD.encode(bytes),
        }
    }

    /// Length of the encoded payload.
    pub fn encoded_len(&self) -> usize {
        self.data.len()
    }
}

/// Reads a selected file fully and encodes it for transport.
pub async fn encode_media(file: &SelectedFile) -> Result<MediaPayload> {
    let bytes = tokio::fs::read(&file.path).await?;
    if bytes.is_empty() {
        return Err(StudioError::Io(std::io::Error::new(
            std::io::ErrorKind::UnexpectedEof,
            format!("{} is empty", file.path.display()),
        )));
    }

    tracing::debug!(
        file = %file.path.display(),
        mime_type = %file.mime_type,
        bytes = bytes.len(),
        "encoded media"
    );

    Ok(MediaPayload::from_bytes(file.mime_type.clone(), &bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorClass;
    use std::io::Write;

    const JPEG_BYTES: [u8; 8] = [0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, 0x4A, 0x46];

    fn write_temp(suffix: &str, bytes: &[u8]) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(bytes).unwrap();
        file
    }

    #[test]
    fn test_mime_from_extension() {
        let tmp = write_temp(".jpg", &JPEG_BYTES);
        let selected = SelectedFile::from_path(tmp.path()).unwrap();
        assert_eq!(selected.mime_type, "image/jpeg");
    }

    #[test]
    fn test_mime_sniffed_without_extension() {
        let tmp = write_temp("", &JPEG_BYTES);
        let selected = SelectedFile::from_path(tmp.path()).unwrap();
        assert_eq!(selected.mime_type, "image/jpeg");
    }

    #[test]
    fn test_rejects_non_image() {
        let tmp = write_temp(".txt", b"just some text here");
        let err = SelectedFile::from_path(tmp.path()).unwrap_err();
        assert!(matches!(err, StudioError::UnsupportedMedia(_)));

        let err = SelectedFile::with_mime_type("notes.txt", "text/plain").unwrap_err();
        assert_eq!(err.class(), ErrorClass::Io);
    }

    #[tokio::test]
    async fn test_encode_keeps_mime_type() {
        let tmp = write_temp(".jpg", &JPEG_BYTES);
        let selected = SelectedFile::from_path(tmp.path()).unwrap();
        let payload = encode_media(&selected).await.unwrap();

        assert_eq!(payload.mime_type, selected.mime_type);
        assert!(payload.encoded_len() > 0);
        assert_eq!(payload, MediaPayload::from_bytes("image/jpeg", &JPEG_BYTES));
    }

    #[tokio::test]
    async fn test_encode_is_stable() {
        let tmp = write_temp(".png", b"\x89PNG\r\n\x1a\nrest-of-file");
        let selected = SelectedFile::from_path(tmp.path()).unwrap();
        let first = encode_media(&selected).await.unwrap();
        let second = encode_media(&selected).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(first.mime_type, "image/png");
    }

    #[tokio::test]
    async fn test_encode_missing_file() {
        let selected = SelectedFile::with_mime_type("/nonexistent/photo.png", "image/png").unwrap();
        let err = encode_media(&selected).await.unwrap_err();
        assert!(matches!(err, StudioError::Io(_)));
    }

    #[tokio::test]
    async fn test_encode_empty_file() {
        let tmp = write_temp(".png", b"");
        let selected = SelectedFile::from_path(tmp.path()).unwrap();
        let err = encode_media(&selected).await.unwrap_err();
        assert_eq!(err.class(), ErrorClass::Io);
    }
}
