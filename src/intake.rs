//! Upload intake checks.
//!
//! The gate every buffer passes before a scan is dispatched: the upload
//! must be recognizable as MP3 by declared MIME type or filename
//! extension, and must fit under the configured size ceiling. Contents are
//! never inspected here; a text file named `song.mp3` passes the gate and
//! scans to zero frames, which is a successful result.

use bytes::Bytes;

use crate::error::{FramescanError, Result};

/// Default size ceiling for accepted uploads (100 MiB).
pub const DEFAULT_MAX_BYTES: usize = 100 * 1024 * 1024;

/// MIME types accepted as MP3.
const ACCEPTED_MIME: [&str; 2] = ["audio/mpeg", "audio/mp3"];

/// One uploaded file held fully in memory.
#[derive(Debug, Clone)]
pub struct Upload {
    /// Original filename, if the sender provided one.
    pub name: Option<String>,
    /// Declared MIME type, if any.
    pub content_type: Option<String>,
    /// File contents.
    pub data: Bytes,
}

impl Upload {
    /// Build an upload from raw contents, with no name or declared type.
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self {
            name: None,
            content_type: None,
            data: data.into(),
        }
    }

    /// Attach the original filename.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Attach the declared MIME type.
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }
}

/// Intake limits applied before any scan runs.
#[derive(Debug, Clone)]
pub struct IntakeConfig {
    /// Upper bound on accepted payload size in bytes.
    pub max_bytes: usize,
}

impl Default for IntakeConfig {
    fn default() -> Self {
        Self {
            max_bytes: DEFAULT_MAX_BYTES,
        }
    }
}

/// Check whether an upload is recognizable as MP3.
///
/// Accepts a declared `audio/mpeg` or `audio/mp3` content type (parameters
/// after `;` ignored) or a filename ending in `.mp3`, all
/// case-insensitive.
pub fn is_mp3_upload(upload: &Upload) -> bool {
    if let Some(content_type) = &upload.content_type {
        let essence = content_type.split(';').next().unwrap_or("").trim();
        if ACCEPTED_MIME.iter().any(|m| essence.eq_ignore_ascii_case(m)) {
            return true;
        }
    }
    if let Some(name) = &upload.name {
        if name.to_ascii_lowercase().ends_with(".mp3") {
            return true;
        }
    }
    false
}

/// Run the full intake gate: media identity, then size ceiling.
pub fn check(upload: &Upload, config: &IntakeConfig) -> Result<()> {
    if !is_mp3_upload(upload) {
        let described = upload
            .content_type
            .clone()
            .or_else(|| upload.name.clone())
            .unwrap_or_else(|| "upload without name or content type".to_string());
        return Err(FramescanError::UnsupportedMedia(described));
    }
    if upload.data.len() > config.max_bytes {
        return Err(FramescanError::PayloadTooLarge {
            size: upload.data.len(),
            limit: config.max_bytes,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_mp3_mime_types() {
        for mime in ["audio/mpeg", "audio/mp3", "AUDIO/MPEG", "Audio/Mp3"] {
            let upload = Upload::new(vec![0u8; 16]).with_content_type(mime);
            assert!(is_mp3_upload(&upload), "{}", mime);
        }
    }

    #[test]
    fn test_accepts_mime_with_parameters() {
        let upload = Upload::new(vec![0u8; 16]).with_content_type("audio/mpeg; x=1");
        assert!(is_mp3_upload(&upload));
    }

    #[test]
    fn test_accepts_mp3_extension() {
        for name in ["song.mp3", "SONG.MP3", "dir.tar/song.Mp3"] {
            let upload = Upload::new(vec![0u8; 16]).with_name(name);
            assert!(is_mp3_upload(&upload), "{}", name);
        }
    }

    #[test]
    fn test_extension_overrides_foreign_content_type() {
        let upload = Upload::new(vec![0u8; 16])
            .with_name("song.mp3")
            .with_content_type("application/octet-stream");
        assert!(is_mp3_upload(&upload));
    }

    #[test]
    fn test_rejects_other_media() {
        let upload = Upload::new(vec![0u8; 16])
            .with_name("song.wav")
            .with_content_type("audio/wav");
        assert!(!is_mp3_upload(&upload));

        let err = check(&upload, &IntakeConfig::default()).unwrap_err();
        assert!(matches!(err, FramescanError::UnsupportedMedia(_)));
    }

    #[test]
    fn test_rejects_anonymous_untyped_upload() {
        let upload = Upload::new(vec![0u8; 16]);
        assert!(!is_mp3_upload(&upload));
    }

    #[test]
    fn test_rejects_extension_lookalikes() {
        for name in ["mp3", "songmp3", "song.mp3.wav"] {
            let upload = Upload::new(vec![0u8; 16]).with_name(name);
            assert!(!is_mp3_upload(&upload), "{}", name);
        }
    }

    #[test]
    fn test_size_ceiling_enforced() {
        let config = IntakeConfig { max_bytes: 64 };

        let at_limit = Upload::new(vec![0u8; 64]).with_name("a.mp3");
        assert!(check(&at_limit, &config).is_ok());

        let over = Upload::new(vec![0u8; 65]).with_name("a.mp3");
        let err = check(&over, &config).unwrap_err();
        assert!(matches!(
            err,
            FramescanError::PayloadTooLarge { size: 65, limit: 64 }
        ));
    }

    #[test]
    fn test_contents_never_inspected() {
        let upload = Upload::new(&b"definitely not audio"[..]).with_name("song.mp3");
        assert!(check(&upload, &IntakeConfig::default()).is_ok());
    }
}
