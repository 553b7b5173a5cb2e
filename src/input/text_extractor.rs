//! Text extraction from PDF resumes

use crate::config::LayoutConfig;
use crate::error::{Result, ResumeScannerError};
use crate::input::glyph_runs;
use crate::input::layout::LayoutReconstructor;
use log::{debug, warn};
use std::path::Path;
use tokio::fs;

/// Share of replacement or control characters above which positioned text is discarded
const MAX_UNREADABLE_RATIO: f64 = 0.1;

pub trait TextExtractor {
    fn extract(&self, path: &Path) -> impl std::future::Future<Output = Result<String>> + Send;
}

pub struct PdfExtractor {
    layout: LayoutReconstructor,
}

impl Default for PdfExtractor {
    fn default() -> Self {
        Self::new(LayoutConfig::default())
    }
}

impl TextExtractor for PdfExtractor {
    async fn extract(&self, path: &Path) -> Result<String> {
        let bytes = fs::read(path).await?;

        self.extract_from_mem(&bytes).map_err(|e| match e {
            ResumeScannerError::PdfExtraction(msg) => ResumeScannerError::PdfExtraction(
                format!("Failed to extract text from PDF '{}': {}", path.display(), msg),
            ),
            other => other,
        })
    }
}

impl PdfExtractor {
    pub fn new(layout: LayoutConfig) -> Self {
        Self {
            layout: LayoutReconstructor::new(layout),
        }
    }

    /// Positioned extraction first, pdf-extract's plain text when that yields nothing readable
    pub fn extract_from_mem(&self, bytes: &[u8]) -> Result<String> {
        let doc = glyph_runs::load_document(bytes)?;
        let positioned = match glyph_runs::collect_document(&doc) {
            Ok(pages) => {
                let text = self.layout.reconstruct_document(&pages);
                debug!("Reconstructed {} pages, {} characters", pages.len(), text.len());
                text
            }
            Err(e) => {
                warn!("Positioned extraction failed: {}", e);
                String::new()
            }
        };

        select_text(positioned, || glyph_runs::plain_text(bytes))
    }
}

/// Keep readable positioned text, otherwise take the plain rendering
fn select_text(positioned: String, plain: impl FnOnce() -> Result<String>) -> Result<String> {
    if is_readable(&positioned) {
        return Ok(positioned);
    }

    debug!("Positioned extraction unreadable, falling back to pdf-extract");
    match plain() {
        Ok(text) if !text.trim().is_empty() => Ok(text),
        Ok(_) if !positioned.trim().is_empty() => Ok(positioned),
        Ok(_) => Err(ResumeScannerError::EmptyDocument(
            "the PDF contains no extractable text (is it a scanned image?)".to_string(),
        )),
        Err(e) if !positioned.trim().is_empty() => {
            warn!("pdf-extract failed ({}), keeping positioned text", e);
            Ok(positioned)
        }
        Err(e) => Err(e),
    }
}

fn is_readable(text: &str) -> bool {
    let meaningful: Vec<char> = text.chars().filter(|c| !c.is_whitespace()).collect();
    if meaningful.is_empty() {
        return false;
    }
    let unreadable = meaningful
        .iter()
        .filter(|c| **c == char::REPLACEMENT_CHARACTER || c.is_control())
        .count();
    (unreadable as f64) / (meaningful.len() as f64) <= MAX_UNREADABLE_RATIO
}
