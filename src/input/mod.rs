//! Input processing module
//! Handles media type detection, document loading, and text extraction

pub mod document;
pub mod file_detector;
pub mod manager;
pub mod text_extractor;

pub use document::{Document, ExtractedText, MediaType};
pub use manager::InputManager;
pub use text_extractor::DocumentTextExtractor;
