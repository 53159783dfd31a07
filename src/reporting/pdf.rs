use log::debug;
use printpdf::{BuiltinFont, Mm, PdfDocument};

use crate::core::constants::report;
use crate::core::error::{ForestError, Result};
use crate::dataset::ObservationTable;
use crate::reporting::summary::describe;

use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontRole {
    Title,
    Body,
}

/// A line of text positioned on a page (millimetres from the bottom-left)
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedLine {
    pub text: String,
    pub x_mm: f32,
    pub y_mm: f32,
    pub size: f32,
    pub font: FontRole,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageLayout {
    pub lines: Vec<PlacedLine>,
}

/// Writes the summary report: a centered title, a timestamp line and the
/// statistics block in a monospace font, breaking onto new pages at the
/// bottom margin.
#[derive(Debug, Clone)]
pub struct ReportGenerator {
    title: String,
    timestamp: Option<String>,
}

impl Default for ReportGenerator {
    fn default() -> Self {
        Self::new(report::DEFAULT_TITLE)
    }
}

impl ReportGenerator {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            timestamp: None,
        }
    }

    /// Fixed timestamp line instead of the current time
    pub fn with_timestamp(mut self, timestamp: impl Into<String>) -> Self {
        self.timestamp = Some(timestamp.into());
        self
    }

    /// Render and write the report for `table` to `path`, overwriting it
    pub fn write(&self, table: &ObservationTable, path: &Path) -> Result<()> {
        let bytes = self.render(table)?;
        fs::write(path, bytes)?;
        debug!("Wrote report to {}", path.display());
        Ok(())
    }

    pub fn render(&self, table: &ObservationTable) -> Result<Vec<u8>> {
        let statistics = describe(table).to_text();
        let pages = self.layout(&statistics);

        let (doc, first_page, first_layer) = PdfDocument::new(
            self.title.as_str(),
            Mm(report::PAGE_WIDTH_MM),
            Mm(report::PAGE_HEIGHT_MM),
            "Layer 1",
        );
        let title_font = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| ForestError::Pdf(e.to_string()))?;
        let body_font = doc
            .add_builtin_font(BuiltinFont::Courier)
            .map_err(|e| ForestError::Pdf(e.to_string()))?;

        for (index, page) in pages.iter().enumerate() {
            let layer = if index == 0 {
                doc.get_page(first_page).get_layer(first_layer)
            } else {
                let (page_index, layer_index) = doc.add_page(
                    Mm(report::PAGE_WIDTH_MM),
                    Mm(report::PAGE_HEIGHT_MM),
                    format!("Layer {}", index + 1),
                );
                doc.get_page(page_index).get_layer(layer_index)
            };

            for line in &page.lines {
                let font = match line.font {
                    FontRole::Title => &title_font,
                    FontRole::Body => &body_font,
                };
                layer.use_text(line.text.as_str(), line.size, Mm(line.x_mm), Mm(line.y_mm), font);
            }
        }

        doc.save_to_bytes()
            .map_err(|e| ForestError::Pdf(e.to_string()))
    }

    /// Position the title, timestamp and statistics lines on pages
    pub fn layout(&self, statistics: &str) -> Vec<PageLayout> {
        let top = report::PAGE_HEIGHT_MM - report::MARGIN_MM;
        let max_chars = Self::max_body_chars();

        let mut pages = vec![PageLayout::default()];
        let mut y = top - report::TITLE_LINE_HEIGHT_MM * 0.7;

        pages[0].lines.push(PlacedLine {
            text: self.title.clone(),
            x_mm: Self::centered_x(&self.title, report::TITLE_FONT_SIZE),
            y_mm: y,
            size: report::TITLE_FONT_SIZE,
            font: FontRole::Title,
        });
        y -= report::TITLE_LINE_HEIGHT_MM;

        let timestamp = self
            .timestamp
            .clone()
            .unwrap_or_else(|| chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string());
        let body = std::iter::once(format!("Generated: {timestamp}"))
            .chain(std::iter::once(String::new()))
            .chain(
                statistics
                    .lines()
                    .flat_map(|line| wrap_line(line, max_chars)),
            );

        for text in body {
            if y < report::BOTTOM_MARGIN_MM {
                pages.push(PageLayout::default());
                y = top - report::BODY_LINE_HEIGHT_MM;
            }
            if let Some(page) = pages.last_mut() {
                page.lines.push(PlacedLine {
                    text,
                    x_mm: report::MARGIN_MM,
                    y_mm: y,
                    size: report::BODY_FONT_SIZE,
                    font: FontRole::Body,
                });
            }
            y -= report::BODY_LINE_HEIGHT_MM;
        }

        pages
    }

    // Helvetica averages about half an em per glyph
    fn centered_x(text: &str, size: f32) -> f32 {
        let width = text.chars().count() as f32 * size * 0.5 * report::MM_PER_PT;
        ((report::PAGE_WIDTH_MM - width) / 2.0).max(report::MARGIN_MM)
    }

    // Courier glyphs are 0.6 em wide
    fn max_body_chars() -> usize {
        let glyph = report::BODY_FONT_SIZE * 0.6 * report::MM_PER_PT;
        ((report::PAGE_WIDTH_MM - 2.0 * report::MARGIN_MM) / glyph) as usize
    }
}

/// Split a line into chunks of at most `max_chars` characters
fn wrap_line(line: &str, max_chars: usize) -> Vec<String> {
    let chars: Vec<char> = line.chars().collect();
    if chars.len() <= max_chars || max_chars == 0 {
        return vec![line.to_string()];
    }
    chars
        .chunks(max_chars)
        .map(|chunk| chunk.iter().collect())
        .collect()
}
