//! Positioned glyph-run collection on top of pdf-extract's page interpreter
//!
//! pdf-extract walks every page (fonts, encodings, ToUnicode maps, form
//! XObjects) and reports each decoded character with its text rendering
//! matrix. The collector below folds those characters back into shown
//! strings with a device-space origin and advance width, so that `layout`
//! can rebuild the reading order.

use crate::error::{Result, ResumeScannerError};
use crate::input::layout::GlyphRun;
use log::{debug, warn};
use lopdf::Document;
use pdf_extract::{MediaBox, OutputDev, OutputError, Transform};
use std::panic::{self, AssertUnwindSafe};
use unicode_normalization::UnicodeNormalization;

/// Largest origin drift still treated as the same shown string
const CONTIGUITY_EPSILON: f64 = 0.01;

/// Collects one `Vec<GlyphRun>` per page
#[derive(Default)]
struct GlyphCollector {
    pages: Vec<Vec<GlyphRun>>,
    pending: Option<GlyphRun>,
}

impl GlyphCollector {
    fn flush(&mut self) {
        if let Some(run) = self.pending.take() {
            match self.pages.last_mut() {
                Some(page) => page.push(run),
                None => self.pages.push(vec![run]),
            }
        }
    }

    fn continues_pending(&self, x: f64, y: f64) -> bool {
        self.pending.as_ref().is_some_and(|run| {
            (run.y - y).abs() <= CONTIGUITY_EPSILON && (run.x + run.width - x).abs() <= CONTIGUITY_EPSILON
        })
    }
}

impl OutputDev for GlyphCollector {
    fn begin_page(
        &mut self,
        _page_num: u32,
        _media_box: &MediaBox,
        _art_box: Option<(f64, f64, f64, f64)>,
    ) -> std::result::Result<(), OutputError> {
        self.flush();
        self.pages.push(Vec::new());
        Ok(())
    }

    fn end_page(&mut self) -> std::result::Result<(), OutputError> {
        self.flush();
        Ok(())
    }

    fn output_character(
        &mut self,
        trm: &Transform,
        width: f64,
        spacing: f64,
        font_size: f64,
        char: &str,
    ) -> std::result::Result<(), OutputError> {
        let (x, y) = (trm.m31, trm.m32);
        let advance = (width * font_size + spacing) * trm.m11;
        // ligature glyphs (fi, fl, ffi) decode to presentation forms
        let text: String = char.nfkc().collect();

        if self.continues_pending(x, y) {
            if let Some(run) = self.pending.as_mut() {
                run.text.push_str(&text);
                run.width += advance;
            }
        } else {
            self.flush();
            self.pending = Some(GlyphRun::new(text, x, y, advance));
        }
        Ok(())
    }

    fn begin_word(&mut self) -> std::result::Result<(), OutputError> {
        self.flush();
        Ok(())
    }

    fn end_word(&mut self) -> std::result::Result<(), OutputError> {
        self.flush();
        Ok(())
    }

    fn end_line(&mut self) -> std::result::Result<(), OutputError> {
        Ok(())
    }
}

/// Load a PDF from memory, rejecting encrypted documents
pub fn load_document(bytes: &[u8]) -> Result<Document> {
    let doc = Document::load_mem(bytes).map_err(|e| {
        if contains(bytes, b"/Encrypt") {
            encrypted()
        } else {
            ResumeScannerError::PdfExtraction(format!("Failed to parse PDF: {}", e))
        }
    })?;

    if doc.trailer.get(b"Encrypt").is_ok() {
        return Err(encrypted());
    }
    Ok(doc)
}

/// Glyph runs for every page, in page order
pub fn collect_document(doc: &Document) -> Result<Vec<Vec<GlyphRun>>> {
    let mut collector = GlyphCollector::default();
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| pdf_extract::output_doc(doc, &mut collector)));

    match outcome {
        Ok(Ok(())) => {
            collector.flush();
            debug!(
                "Collected {} glyph runs over {} pages",
                collector.pages.iter().map(Vec::len).sum::<usize>(),
                collector.pages.len()
            );
            Ok(collector.pages)
        }
        Ok(Err(e)) => Err(ResumeScannerError::PdfExtraction(format!("Failed to interpret page content: {}", e))),
        Err(_) => {
            warn!("pdf-extract panicked while interpreting page content");
            Err(ResumeScannerError::PdfExtraction(
                "the page content could not be interpreted".to_string(),
            ))
        }
    }
}

/// pdf-extract's own plain-text rendering of the document
pub fn plain_text(bytes: &[u8]) -> Result<String> {
    match panic::catch_unwind(|| pdf_extract::extract_text_from_mem(bytes)) {
        Ok(Ok(text)) => Ok(text),
        Ok(Err(e)) => Err(ResumeScannerError::PdfExtraction(e.to_string())),
        Err(_) => Err(ResumeScannerError::PdfExtraction(
            "pdf-extract could not read the document".to_string(),
        )),
    }
}

fn encrypted() -> ResumeScannerError {
    ResumeScannerError::EncryptedPdf("password-protected PDFs cannot be scanned".to_string())
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|window| window == needle)
}
