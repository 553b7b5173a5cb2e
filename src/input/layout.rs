//! Reading-order reconstruction from positioned glyph runs
//!
//! PDF pages carry text as absolutely positioned fragments in no particular
//! order. This module turns one page's fragments back into line-broken text.

use crate::config::LayoutConfig;
use std::cmp::Ordering;

/// A contiguous rendered text fragment with its baseline origin on one page
#[derive(Debug, Clone, PartialEq)]
pub struct GlyphRun {
    pub text: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
}

impl GlyphRun {
    pub fn new(text: impl Into<String>, x: f64, y: f64, width: f64) -> Self {
        Self {
            text: text.into(),
            x,
            y,
            width,
        }
    }

    fn end_x(&self) -> f64 {
        self.x + self.width
    }
}

pub struct LayoutReconstructor {
    line_tolerance: f64,
    word_gap: f64,
}

impl Default for LayoutReconstructor {
    fn default() -> Self {
        Self::new(LayoutConfig::default())
    }
}

impl LayoutReconstructor {
    pub fn new(config: LayoutConfig) -> Self {
        Self {
            line_tolerance: config.line_tolerance,
            word_gap: config.word_gap,
        }
    }

    /// Rebuild one page's text. Top of the page comes first.
    pub fn reconstruct_page(&self, runs: &[GlyphRun]) -> String {
        let lines = self.group_lines(runs);

        let mut output = String::new();
        for (index, line) in lines.iter().enumerate() {
            if index > 0 {
                output.push('\n');
            }
            self.emit_line(line, &mut output);
        }
        output
    }

    /// Rebuild a whole document, each page followed by a line break
    pub fn reconstruct_document(&self, pages: &[Vec<GlyphRun>]) -> String {
        let mut output = String::new();
        for page in pages {
            output.push_str(&self.reconstruct_page(page));
            output.push('\n');
        }
        output
    }

    fn group_lines<'a>(&self, runs: &'a [GlyphRun]) -> Vec<Vec<&'a GlyphRun>> {
        let mut sorted: Vec<&GlyphRun> = runs.iter().filter(|run| !run.text.is_empty()).collect();
        sorted.sort_by(|a, b| compare_reading_order(a, b));

        let mut lines: Vec<Vec<&GlyphRun>> = Vec::new();
        let mut line_y = f64::NAN;

        for run in sorted {
            match lines.last_mut() {
                Some(line) if (line_y - run.y).abs() <= self.line_tolerance => line.push(run),
                _ => {
                    line_y = run.y;
                    lines.push(vec![run]);
                }
            }
        }

        for line in &mut lines {
            line.sort_by(|a, b| a.x.total_cmp(&b.x));
        }
        lines
    }

    fn emit_line(&self, line: &[&GlyphRun], output: &mut String) {
        let mut previous: Option<&GlyphRun> = None;

        for run in line {
            if let Some(prev) = previous {
                let gap = run.x - prev.end_x();
                let has_boundary_space = prev.text.ends_with(char::is_whitespace)
                    || run.text.starts_with(char::is_whitespace);
                if gap > self.word_gap && !has_boundary_space {
                    output.push(' ');
                }
            }
            output.push_str(&run.text);
            previous = Some(run);
        }
    }
}

/// Descending Y, then ascending X. Total order so the sort is deterministic.
fn compare_reading_order(a: &GlyphRun, b: &GlyphRun) -> Ordering {
    b.y.total_cmp(&a.y).then_with(|| a.x.total_cmp(&b.x))
}
