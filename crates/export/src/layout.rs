//! Page layout for an exported bias report.
//!
//! Coordinates are millimetres on an A4 portrait page with the origin at
//! the top-left corner; `y` is the text baseline.

use biasbuster_core::BiasReport;
use chrono::{DateTime, Utc};

use crate::wrap;

pub const PAGE_WIDTH_MM: f32 = 210.0;
pub const PAGE_HEIGHT_MM: f32 = 297.0;

const LEFT_MM: f32 = 20.0;
const TOP_MM: f32 = 20.0;
const BOTTOM_MM: f32 = 280.0;
const COLUMN_MM: f32 = 170.0;
const LINE_PITCH_MM: f32 = 7.0;
const SECTION_GAP_MM: f32 = 10.0;

const TITLE: &str = "BiasBuster - Bias Analysis Report";
const TITLE_SIZE: f32 = 20.0;
const RESULT_SIZE: f32 = 14.0;
const BODY_SIZE: f32 = 12.0;

const ID_Y: f32 = 35.0;
const GENERATED_Y: f32 = 45.0;
const RESULT_Y: f32 = 60.0;
const EXPLANATION_HEADING_Y: f32 = 75.0;
const EXPLANATION_Y: f32 = 85.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextRole {
    Title,
    Identifier,
    GeneratedAt,
    Result,
    Heading,
    Body,
}

impl TextRole {
    pub fn is_bold(&self) -> bool {
        matches!(self, Self::Title | Self::Result | Self::Heading)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextItem {
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub role: TextRole,
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub items: Vec<TextItem>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub title: String,
    pub identifier: String,
    pub generated_at: DateTime<Utc>,
    pub pages: Vec<Page>,
}

impl Document {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn items(&self) -> impl Iterator<Item = &TextItem> {
        self.pages.iter().flat_map(|p| p.items.iter())
    }

    /// Pages with the generation stamp removed, for comparing exports.
    pub fn without_timestamp(&self) -> Vec<Page> {
        self.pages
            .iter()
            .map(|page| Page {
                items: page
                    .items
                    .iter()
                    .filter(|item| item.role != TextRole::GeneratedAt)
                    .cloned()
                    .collect(),
            })
            .collect()
    }

    pub fn find(&self, role: TextRole) -> impl Iterator<Item = (usize, &TextItem)> {
        self.pages.iter().enumerate().flat_map(move |(idx, page)| {
            page.items
                .iter()
                .filter(move |item| item.role == role)
                .map(move |item| (idx, item))
        })
    }
}

struct Cursor {
    pages: Vec<Page>,
    y: f32,
}

impl Cursor {
    fn new() -> Self {
        Self {
            pages: vec![Page::default()],
            y: TOP_MM,
        }
    }

    fn place(&mut self, text: String, size: f32, role: TextRole) {
        if self.y > BOTTOM_MM {
            self.pages.push(Page::default());
            self.y = TOP_MM;
        }
        if let Some(page) = self.pages.last_mut() {
            page.items.push(TextItem {
                x: LEFT_MM,
                y: self.y,
                size,
                role,
                text,
            });
        }
    }

    fn place_at(&mut self, y: f32, text: String, size: f32, role: TextRole) {
        self.y = y;
        self.place(text, size, role);
    }

    /// Keep a heading on the same page as the first line under it.
    fn keep_with_next(&mut self) {
        if self.y + SECTION_GAP_MM > BOTTOM_MM {
            self.pages.push(Page::default());
            self.y = TOP_MM;
        }
    }

    fn paragraph(&mut self, lines: Vec<String>) {
        for line in lines {
            self.place(line, BODY_SIZE, TextRole::Body);
            self.y += LINE_PITCH_MM;
        }
    }
}

pub(crate) fn generated_label(at: DateTime<Utc>) -> String {
    format!("Generated: {}", at.format("%Y-%m-%d %H:%M:%S UTC"))
}

/// Lay the report out top to bottom.
///
/// The remediation heading sits `SECTION_GAP_MM` below the last explanation
/// line, so its offset grows with the explanation's wrapped line count.
pub fn layout(report: &BiasReport, identifier: &str, generated_at: DateTime<Utc>) -> Document {
    let mut cursor = Cursor::new();

    cursor.place_at(TOP_MM, TITLE.to_string(), TITLE_SIZE, TextRole::Title);
    cursor.place_at(
        ID_Y,
        format!("Report ID: {identifier}"),
        BODY_SIZE,
        TextRole::Identifier,
    );
    cursor.place_at(
        GENERATED_Y,
        generated_label(generated_at),
        BODY_SIZE,
        TextRole::GeneratedAt,
    );
    cursor.place_at(
        RESULT_Y,
        format!("Result: {}", report.result),
        RESULT_SIZE,
        TextRole::Result,
    );
    cursor.place_at(
        EXPLANATION_HEADING_Y,
        "Explanation:".to_string(),
        BODY_SIZE,
        TextRole::Heading,
    );

    cursor.y = EXPLANATION_Y;
    cursor.paragraph(wrap::wrap(&report.explanation, COLUMN_MM, BODY_SIZE));

    cursor.y += SECTION_GAP_MM;
    cursor.keep_with_next();
    cursor.place("How to Fix:".to_string(), BODY_SIZE, TextRole::Heading);
    cursor.y += SECTION_GAP_MM;
    cursor.paragraph(wrap::wrap(&report.how_to_fix, COLUMN_MM, BODY_SIZE));

    Document {
        title: TITLE.to_string(),
        identifier: identifier.to_string(),
        generated_at,
        pages: cursor.pages,
    }
}
