//! Text format and layout caches.
//!
//! Formats are keyed by point size, layouts by `(text, family, size)`, both
//! built on demand and reused across frames. Layouts are device-independent:
//! they survive resizes and device loss without invalidation.
//!
//! Glyphs come from a built-in 5×7 block font covering the characters the
//! engine itself emits (digits, punctuation, and the FPS overlay letters);
//! anything else renders as a filled box. A layout is just the list of filled
//! cells, so drawing one is a run of rectangle fills on the active target.

use std::collections::HashMap;

use crate::graphics::Rect;

/// A cached text format: font family name plus size in pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct TextFormat {
    pub family: String,
    pub size: f32,
}

/// Cache of [`TextFormat`] objects keyed by size.
#[derive(Default)]
pub struct TextFormatCache {
    formats: HashMap<u32, TextFormat>,
    default_family: String,
}

impl TextFormatCache {
    #[must_use]
    pub fn new() -> Self {
        Self {
            formats: HashMap::new(),
            default_family: "monospace".into(),
        }
    }

    /// Returns the format for the given size, creating it on first use.
    pub fn get(&mut self, size: f32) -> &TextFormat {
        self.formats
            .entry(size.to_bits())
            .or_insert_with(|| TextFormat {
                family: self.default_family.clone(),
                size,
            })
    }

    pub fn clear(&mut self) {
        self.formats.clear();
    }
}

/// One positioned glyph cell within a layout, relative to the layout origin.
#[derive(Debug, Clone, Copy)]
pub struct GlyphQuad {
    pub rect: Rect,
}

/// A laid-out string: filled cells plus overall metrics.
#[derive(Debug, Clone)]
pub struct TextLayout {
    pub quads: Vec<GlyphQuad>,
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct LayoutKey {
    text: String,
    family: String,
    size_bits: u32,
}

/// Cache of [`TextLayout`] objects keyed by `(text, family, size)`.
#[derive(Default)]
pub struct TextLayoutCache {
    layouts: HashMap<LayoutKey, TextLayout>,
}

impl TextLayoutCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the layout for the given text and format, building it on first
    /// use.
    pub fn get(&mut self, text: &str, format: &TextFormat) -> &TextLayout {
        let key = LayoutKey {
            text: text.to_owned(),
            family: format.family.clone(),
            size_bits: format.size.to_bits(),
        };
        self.layouts
            .entry(key)
            .or_insert_with(|| build_layout(text, format.size))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.layouts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.layouts.is_empty()
    }

    pub fn clear(&mut self) {
        self.layouts.clear();
    }
}

// ============================================================================
// Block font
// ============================================================================

const GLYPH_COLS: u32 = 5;
const GLYPH_ROWS: u32 = 7;

/// 5×7 glyph bitmaps, one `u8` row each, most significant of the low five
/// bits on the left. Covers the FPS overlay character set.
fn glyph_rows(c: char) -> Option<[u8; 7]> {
    let rows = match c {
        '0' => [0x0E, 0x11, 0x13, 0x15, 0x19, 0x11, 0x0E],
        '1' => [0x04, 0x0C, 0x04, 0x04, 0x04, 0x04, 0x0E],
        '2' => [0x0E, 0x11, 0x01, 0x06, 0x08, 0x10, 0x1F],
        '3' => [0x0E, 0x11, 0x01, 0x06, 0x01, 0x11, 0x0E],
        '4' => [0x02, 0x06, 0x0A, 0x12, 0x1F, 0x02, 0x02],
        '5' => [0x1F, 0x10, 0x1E, 0x01, 0x01, 0x11, 0x0E],
        '6' => [0x06, 0x08, 0x10, 0x1E, 0x11, 0x11, 0x0E],
        '7' => [0x1F, 0x01, 0x02, 0x04, 0x08, 0x08, 0x08],
        '8' => [0x0E, 0x11, 0x11, 0x0E, 0x11, 0x11, 0x0E],
        '9' => [0x0E, 0x11, 0x11, 0x0F, 0x01, 0x02, 0x0C],
        '.' => [0x00, 0x00, 0x00, 0x00, 0x00, 0x0C, 0x0C],
        ':' => [0x00, 0x0C, 0x0C, 0x00, 0x0C, 0x0C, 0x00],
        '-' => [0x00, 0x00, 0x00, 0x1F, 0x00, 0x00, 0x00],
        '%' => [0x18, 0x19, 0x02, 0x04, 0x08, 0x13, 0x03],
        'F' => [0x1F, 0x10, 0x10, 0x1E, 0x10, 0x10, 0x10],
        'P' => [0x1E, 0x11, 0x11, 0x1E, 0x10, 0x10, 0x10],
        'S' => [0x0F, 0x10, 0x10, 0x0E, 0x01, 0x01, 0x1E],
        ' ' => [0x00; 7],
        _ => return None,
    };
    Some(rows)
}

fn build_layout(text: &str, size: f32) -> TextLayout {
    let cell = size / GLYPH_ROWS as f32;
    let advance = cell * (GLYPH_COLS + 1) as f32;

    let mut quads = Vec::new();
    let mut pen_x = 0.0f32;
    for c in text.chars() {
        match glyph_rows(c) {
            Some(rows) => {
                for (row_idx, row) in rows.iter().enumerate() {
                    let y = row_idx as f32 * cell;
                    // Emit one quad per contiguous horizontal run of set bits.
                    let mut col = 0;
                    while col < GLYPH_COLS {
                        if row >> (GLYPH_COLS - 1 - col) & 1 == 1 {
                            let start = col;
                            while col < GLYPH_COLS && row >> (GLYPH_COLS - 1 - col) & 1 == 1 {
                                col += 1;
                            }
                            quads.push(GlyphQuad {
                                rect: Rect::new(
                                    pen_x + start as f32 * cell,
                                    y,
                                    (col - start) as f32 * cell,
                                    cell,
                                ),
                            });
                        } else {
                            col += 1;
                        }
                    }
                }
            }
            None => {
                // Unsupported character: filled box.
                quads.push(GlyphQuad {
                    rect: Rect::new(pen_x, 0.0, GLYPH_COLS as f32 * cell, size),
                });
            }
        }
        pen_x += advance;
    }

    TextLayout {
        quads,
        width: if text.is_empty() { 0.0 } else { pen_x - cell },
        height: size,
    }
}
