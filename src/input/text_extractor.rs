//! Text extraction from resume documents

use crate::error::{Result, ResumeLensError};
use crate::input::document::{Document, ExtractedText, MediaType};
use log::{debug, info, warn};
use pulldown_cmark::{Event, Parser, Tag};
use regex::Regex;
use std::sync::LazyLock;

static EXCESS_BLANK_LINES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n[ \t]*\n(?:[ \t]*\n)+").expect("static pattern is valid"));

/// Decodes one media type into ordered text fragments.
pub trait TextExtractor: Send + Sync {
    fn extract(&self, bytes: &[u8]) -> Result<Vec<String>>;
}

pub struct PdfExtractor;

impl TextExtractor for PdfExtractor {
    fn extract(&self, bytes: &[u8]) -> Result<Vec<String>> {
        let pages = pdf_extract::extract_text_from_mem_by_pages(bytes).map_err(|e| {
            ResumeLensError::Extraction(format!("Failed to read PDF file: {}", e))
        })?;

        Ok(pages.iter().map(|page| normalize_page(page)).collect())
    }
}

pub struct PlainTextExtractor;

impl TextExtractor for PlainTextExtractor {
    fn extract(&self, bytes: &[u8]) -> Result<Vec<String>> {
        let text = std::str::from_utf8(bytes).map_err(|e| {
            ResumeLensError::Extraction(format!("Text document is not valid UTF-8: {}", e))
        })?;
        Ok(vec![text.to_string()])
    }
}

pub struct MarkdownExtractor;

impl TextExtractor for MarkdownExtractor {
    fn extract(&self, bytes: &[u8]) -> Result<Vec<String>> {
        let markdown = std::str::from_utf8(bytes).map_err(|e| {
            ResumeLensError::Extraction(format!("Markdown document is not valid UTF-8: {}", e))
        })?;
        Ok(vec![self.markdown_to_text(markdown)])
    }
}

impl MarkdownExtractor {
    fn markdown_to_text(&self, markdown: &str) -> String {
        let mut raw = String::new();
        for event in Parser::new(markdown) {
            match event {
                Event::Text(text) | Event::Code(text) => raw.push_str(&text),
                Event::SoftBreak | Event::HardBreak => raw.push('\n'),
                Event::End(Tag::Paragraph)
                | Event::End(Tag::Heading(..))
                | Event::End(Tag::Item)
                | Event::End(Tag::CodeBlock(_))
                | Event::End(Tag::BlockQuote) => raw.push('\n'),
                _ => {}
            }
        }

        raw.lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Trim trailing whitespace on every line and collapse long blank runs.
fn normalize_page(page: &str) -> String {
    let trimmed: Vec<&str> = page.lines().map(str::trim_end).collect();
    let joined = trimmed.join("\n");
    EXCESS_BLANK_LINES
        .replace_all(&joined, "\n\n")
        .trim()
        .to_string()
}

/// Routes a `Document` to the extractor for its declared media type.
#[derive(Debug, Clone, Copy, Default)]
pub struct DocumentTextExtractor {
    headless: bool,
}

impl DocumentTextExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// An extractor for non-interactive hosts: every document yields empty text.
    pub fn headless() -> Self {
        Self { headless: true }
    }

    /// Decode on the current thread.
    pub fn extract_sync(&self, document: &Document) -> Result<ExtractedText> {
        if self.headless {
            debug!("Headless extraction requested, skipping {} decode", document.media_type());
            return Ok(ExtractedText::empty());
        }

        let fragments = match document.media_type() {
            MediaType::Pdf => PdfExtractor.extract(document.bytes())?,
            MediaType::PlainText => PlainTextExtractor.extract(document.bytes())?,
            MediaType::Markdown => MarkdownExtractor.extract(document.bytes())?,
        };

        Ok(ExtractedText::new(fragments))
    }

    /// Decode on the blocking pool, consuming the document.
    ///
    /// A panic inside a decoder is reported as an extraction error.
    pub async fn extract(&self, document: Document) -> Result<ExtractedText> {
        let extractor = *self;
        let media_type = document.media_type();
        info!("Extracting text from {} document ({} bytes)", media_type, document.len());

        let extracted = tokio::task::spawn_blocking(move || extractor.extract_sync(&document))
            .await
            .map_err(|e| {
                warn!("Text extraction task aborted: {}", e);
                ResumeLensError::Extraction(format!("Failed to read {} document", media_type))
            })??;

        debug!("Extracted {} fragment(s)", extracted.page_count());
        Ok(extracted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_single_fragment() {
        let doc = Document::plain_text("Built dashboards using SQL");
        let text = DocumentTextExtractor::new().extract_sync(&doc).unwrap();
        assert_eq!(text.fragments(), &["Built dashboards using SQL".to_string()]);
    }

    #[test]
    fn test_invalid_utf8_is_extraction_error() {
        let doc = Document::new(vec![0xff, 0xfe, 0x00, 0xc3], MediaType::PlainText);
        let err = DocumentTextExtractor::new().extract_sync(&doc).unwrap_err();
        assert!(matches!(err, ResumeLensError::Extraction(_)));
    }

    #[test]
    fn test_markdown_is_flattened() {
        let md = "# Jane Doe\n\n## Experience\n\n- **Led** a team of `5` engineers\n- Shipped React apps\n";
        let doc = Document::new(md.as_bytes().to_vec(), MediaType::Markdown);
        let text = DocumentTextExtractor::new().extract_sync(&doc).unwrap().joined();
        assert_eq!(text, "Jane Doe\nExperience\nLed a team of 5 engineers\nShipped React apps");
    }

    #[test]
    fn test_headless_short_circuits() {
        let doc = Document::pdf(b"not a pdf at all".to_vec());
        let text = DocumentTextExtractor::headless().extract_sync(&doc).unwrap();
        assert!(text.is_blank());
        assert_eq!(text.page_count(), 0);
    }

    #[test]
    fn test_normalize_page_collapses_blank_runs() {
        let page = "Summary   \n\n\n\n  \nSkills\t\n";
        assert_eq!(normalize_page(page), "Summary\n\nSkills");
    }

    #[tokio::test]
    async fn test_garbage_pdf_fails_extraction() {
        let doc = Document::pdf(b"this is definitely not a PDF".to_vec());
        let err = DocumentTextExtractor::new().extract(doc).await.unwrap_err();
        assert!(matches!(err, ResumeLensError::Extraction(_)));
    }
}
