//! Input manager for loading resume files from disk

use crate::error::{Result, ResumeLensError};
use crate::input::document::{Document, MediaType};
use crate::input::file_detector::detect_media_type;
use log::{info, warn};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::fs;

pub struct InputManager {
    cache: HashMap<PathBuf, Document>,
}

impl Default for InputManager {
    fn default() -> Self {
        Self::new()
    }
}

impl InputManager {
    pub fn new() -> Self {
        Self {
            cache: HashMap::new(),
        }
    }

    /// Read a file into a `Document`, detecting its media type.
    pub async fn load_document(&mut self, path: &Path) -> Result<Document> {
        if let Some(cached) = self.cache.get(path) {
            info!("Using cached document for: {}", path.display());
            return Ok(cached.clone());
        }

        let bytes = read_file(path).await?;
        let media_type = self.detect_media_type(path, &bytes)?;
        let document = Document::new(bytes, media_type);
        log_loaded(path, &document);

        self.cache.insert(path.to_path_buf(), document.clone());
        Ok(document)
    }

    /// Read a file as the caller-declared mime type, skipping detection.
    pub async fn load_document_as(&mut self, path: &Path, mime: &str) -> Result<Document> {
        let document = Document::from_mime(read_file(path).await?, mime)?;
        log_loaded(path, &document);
        Ok(document)
    }

    /// Read a UTF-8 text file, used for long role descriptions.
    pub async fn load_text(&self, path: &Path) -> Result<String> {
        ensure_exists(path)?;
        Ok(fs::read_to_string(path).await?)
    }

    fn detect_media_type(&self, path: &Path, bytes: &[u8]) -> Result<MediaType> {
        detect_media_type(path, bytes).ok_or_else(|| {
            ResumeLensError::InvalidInput(format!(
                "Unsupported file type for: {} (expected PDF, TXT or MD)",
                path.display()
            ))
        })
    }

    pub fn cache_size(&self) -> usize {
        self.cache.len()
    }
}

fn ensure_exists(path: &Path) -> Result<()> {
    if path.exists() {
        Ok(())
    } else {
        Err(ResumeLensError::InvalidInput(format!(
            "File does not exist: {}",
            path.display()
        )))
    }
}

async fn read_file(path: &Path) -> Result<Vec<u8>> {
    ensure_exists(path)?;
    Ok(fs::read(path).await?)
}

fn log_loaded(path: &Path, document: &Document) {
    if document.is_empty() {
        warn!("{} is empty", path.display());
    }
    info!("Loaded {} ({}, {} bytes)", path.display(), document.media_type(), document.len());
}
