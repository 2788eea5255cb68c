//! Document and extracted-text structures

use crate::error::{Result, ResumeLensError};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MediaType {
    Pdf,
    PlainText,
    Markdown,
}

impl MediaType {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "pdf" => Some(MediaType::Pdf),
            "txt" | "text" => Some(MediaType::PlainText),
            "md" | "markdown" => Some(MediaType::Markdown),
            _ => None,
        }
    }

    pub fn from_mime(mime: &str) -> Option<Self> {
        let essence = mime.split(';').next().unwrap_or_default().trim();
        match essence.to_lowercase().as_str() {
            "application/pdf" => Some(MediaType::Pdf),
            "text/plain" => Some(MediaType::PlainText),
            "text/markdown" | "text/x-markdown" => Some(MediaType::Markdown),
            _ => None,
        }
    }

    pub fn as_mime(&self) -> &'static str {
        match self {
            MediaType::Pdf => "application/pdf",
            MediaType::PlainText => "text/plain",
            MediaType::Markdown => "text/markdown",
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_mime())
    }
}

/// Opaque document bytes plus the media type the caller declared for them.
#[derive(Clone, PartialEq, Eq)]
pub struct Document {
    bytes: Vec<u8>,
    media_type: MediaType,
}

impl Document {
    pub fn new(bytes: impl Into<Vec<u8>>, media_type: MediaType) -> Self {
        Self {
            bytes: bytes.into(),
            media_type,
        }
    }

    pub fn pdf(bytes: impl Into<Vec<u8>>) -> Self {
        Self::new(bytes, MediaType::Pdf)
    }

    pub fn plain_text(text: impl Into<String>) -> Self {
        Self::new(text.into().into_bytes(), MediaType::PlainText)
    }

    /// Build a document from a declared mime type such as `application/pdf`.
    ///
    /// A type no extractor can decode is an extraction failure.
    pub fn from_mime(bytes: impl Into<Vec<u8>>, mime: &str) -> Result<Self> {
        let media_type = MediaType::from_mime(mime).ok_or_else(|| {
            ResumeLensError::Extraction(format!("Unsupported media type: {}", mime.trim()))
        })?;
        Ok(Self::new(bytes, media_type))
    }

    pub fn media_type(&self) -> MediaType {
        self.media_type
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("media_type", &self.media_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Ordered text fragments, one per page or segment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedText {
    fragments: Vec<String>,
}

impl ExtractedText {
    pub fn new(fragments: Vec<String>) -> Self {
        Self { fragments }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn fragments(&self) -> &[String] {
        &self.fragments
    }

    pub fn page_count(&self) -> usize {
        self.fragments.len()
    }

    /// Fragments joined with newline separators.
    pub fn joined(&self) -> String {
        self.fragments.join("\n")
    }

    /// True when there is no non-whitespace text at all.
    pub fn is_blank(&self) -> bool {
        self.fragments.iter().all(|f| f.trim().is_empty())
    }
}
