//! Greedy word wrapping against an average glyph width.

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Average glyph advance as a fraction of the font size.
const AVG_GLYPH_EM: f32 = 0.5;

const MM_PER_PT: f32 = 25.4 / 72.0;

/// Columns that fit in `width_mm` at `font_size` points.
pub fn columns(width_mm: f32, font_size: f32) -> usize {
    let glyph_mm = font_size * AVG_GLYPH_EM * MM_PER_PT;
    ((width_mm / glyph_mm).floor() as usize).max(1)
}

/// Wrap `text` into lines no wider than `width_mm` at `font_size`.
///
/// Explicit newlines start a new line; blank input yields no lines.
pub fn wrap(text: &str, width_mm: f32, font_size: f32) -> Vec<String> {
    wrap_columns(text, columns(width_mm, font_size))
}

pub fn wrap_columns(text: &str, max_cols: usize) -> Vec<String> {
    let mut lines = Vec::new();
    if text.trim().is_empty() {
        return lines;
    }

    for paragraph in text.lines() {
        let mut current = String::new();
        let mut current_cols = 0usize;

        for word in paragraph.split_whitespace() {
            for piece in split_long_word(word, max_cols) {
                let piece_cols = piece.width();
                let needed = if current.is_empty() {
                    piece_cols
                } else {
                    current_cols + 1 + piece_cols
                };
                if needed > max_cols && !current.is_empty() {
                    lines.push(std::mem::take(&mut current));
                    current_cols = 0;
                }
                if !current.is_empty() {
                    current.push(' ');
                    current_cols += 1;
                }
                current.push_str(&piece);
                current_cols += piece_cols;
            }
        }

        // Blank lines inside the text are kept as paragraph gaps.
        lines.push(current);
    }

    while lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }
    lines
}

fn split_long_word(word: &str, max_cols: usize) -> Vec<String> {
    if word.width() <= max_cols {
        return vec![word.to_string()];
    }
    let mut pieces = Vec::new();
    let mut piece = String::new();
    let mut cols = 0usize;
    for ch in word.chars() {
        let w = ch.width().unwrap_or(0);
        if cols + w > max_cols && !piece.is_empty() {
            pieces.push(std::mem::take(&mut piece));
            cols = 0;
        }
        piece.push(ch);
        cols += w;
    }
    if !piece.is_empty() {
        pieces.push(piece);
    }
    pieces
}
