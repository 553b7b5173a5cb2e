//! Input manager: validates the uploaded file and routes it to the extractor

use crate::config::LayoutConfig;
use crate::error::{Result, ResumeScannerError};
use crate::input::file_detector::FileType;
use crate::input::text_extractor::{PdfExtractor, TextExtractor};
use log::info;
use std::path::Path;

pub struct InputManager {
    pdf: PdfExtractor,
}

impl Default for InputManager {
    fn default() -> Self {
        Self::new(LayoutConfig::default())
    }
}

impl InputManager {
    pub fn new(layout: LayoutConfig) -> Self {
        Self {
            pdf: PdfExtractor::new(layout),
        }
    }

    pub async fn extract_text(&self, path: &Path) -> Result<String> {
        // Validate file exists
        if !path.exists() {
            return Err(ResumeScannerError::InvalidInput(
                format!("File does not exist: {}", path.display())
            ));
        }

        let file_type = self.detect_file_type(path).await?;

        match file_type {
            FileType::Pdf => {
                info!("Extracting text from PDF: {}", path.display());
                self.pdf.extract(path).await
            }
            FileType::Unknown => Err(ResumeScannerError::UnsupportedFormat(
                format!("{} is not a PDF file (expected {})", path.display(), crate::input::file_detector::PDF_MIME)
            )),
        }
    }

    async fn detect_file_type(&self, path: &Path) -> Result<FileType> {
        use tokio::io::AsyncReadExt;

        let mut head = Vec::with_capacity(1024);
        let file = tokio::fs::File::open(path).await?;
        file.take(1024).read_to_end(&mut head).await?;

        Ok(FileType::detect(path, &head))
    }
}
