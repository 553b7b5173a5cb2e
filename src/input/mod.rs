//! Input processing module
//! Handles file validation, PDF glyph collection, and layout reconstruction

pub mod file_detector;
pub mod glyph_runs;
pub mod layout;
pub mod manager;
pub mod text_extractor;

pub use layout::{GlyphRun, LayoutReconstructor};
pub use manager::InputManager;
