//! File type detection
//!
//! Only PDF resumes are accepted. The check looks at both the extension and
//! the leading magic bytes, which is what a browser-side MIME check amounts to.

use std::path::Path;

pub const PDF_MIME: &str = "application/pdf";
const PDF_MAGIC: &[u8] = b"%PDF-";

#[derive(Debug, Clone, PartialEq)]
pub enum FileType {
    Pdf,
    Unknown,
}

impl FileType {
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "pdf" => FileType::Pdf,
            _ => FileType::Unknown,
        }
    }

    /// Sniff the content. PDF allows junk before the header, within the first KiB.
    pub fn from_content(bytes: &[u8]) -> Self {
        let head = &bytes[..bytes.len().min(1024)];
        if head.windows(PDF_MAGIC.len()).any(|window| window == PDF_MAGIC) {
            FileType::Pdf
        } else {
            FileType::Unknown
        }
    }

    pub fn detect(path: &Path, bytes: &[u8]) -> Self {
        let by_extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(FileType::from_extension)
            .unwrap_or(FileType::Unknown);

        match (by_extension, FileType::from_content(bytes)) {
            (FileType::Pdf, FileType::Pdf) => FileType::Pdf,
            _ => FileType::Unknown,
        }
    }
}
