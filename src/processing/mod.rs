//! Tokenizing, keyword scoring, and scan orchestration

pub mod keywords;
pub mod scan_result;
pub mod scanner;
pub mod text_processor;

pub use scan_result::{JobLevel, ScanRequest, ScanResult};
pub use scanner::Scanner;
