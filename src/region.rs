use std::ops::Range;

use anyhow::Result;
use ratatui::layout::Rect;
use unicode_width::UnicodeWidthChar;

use crate::surface::{Attr, Surface};

/// A rectangular slice of the terminal that a component owns.
///
/// Every write made through [`Region::put`] is clamped into the rectangle, so
/// components never paint over each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    area: Rect,
}

impl Region {
    pub fn new(area: Rect) -> Self {
        Self { area }
    }

    pub fn top(&self) -> u16 {
        self.area.top()
    }

    pub fn left(&self) -> u16 {
        self.area.left()
    }

    pub fn width(&self) -> usize {
        usize::from(self.area.width)
    }

    pub fn height(&self) -> usize {
        usize::from(self.area.height)
    }

    pub fn rows(&self) -> Range<u16> {
        self.area.top()..self.area.bottom()
    }

    pub fn is_empty(&self) -> bool {
        self.area.is_empty()
    }

    pub fn clamp_row(&self, row: u16) -> u16 {
        row.clamp(self.area.top(), self.area.bottom().saturating_sub(1).max(self.area.top()))
    }

    pub fn clamp_col(&self, col: u16) -> u16 {
        col.clamp(self.area.left(), self.area.right().saturating_sub(1).max(self.area.left()))
    }

    /// Columns left between `col` and the right edge.
    pub fn room(&self, col: u16) -> usize {
        usize::from(self.area.right().saturating_sub(col))
    }

    pub fn blank(&self) -> String {
        " ".repeat(self.width())
    }

    /// Writes the head of `text` that fits between `col` and the right edge.
    pub fn put<T: Surface + ?Sized>(
        &self,
        surface: &mut T,
        row: u16,
        col: u16,
        text: &str,
        attr: Attr,
    ) -> Result<()> {
        if self.is_empty() {
            return Ok(());
        }
        let row = self.clamp_row(row);
        let col = self.clamp_col(col);
        surface.put(row, col, take_width(text, self.room(col)), attr)
    }
}

/// Longest prefix of `text` whose display width is at most `max`.
pub fn take_width(text: &str, max: usize) -> &str {
    let mut used = 0usize;
    for (index, ch) in text.char_indices() {
        used += ch.width().unwrap_or(0);
        if used > max {
            return &text[..index];
        }
    }
    text
}

/// Longest suffix of `text` whose display width is at most `max`.
pub fn take_tail_width(text: &str, max: usize) -> &str {
    let mut used = 0usize;
    for (index, ch) in text.char_indices().rev() {
        used += ch.width().unwrap_or(0);
        if used > max {
            return &text[index + ch.len_utf8()..];
        }
    }
    text
}

pub fn display_width(text: &str) -> usize {
    text.chars().map(|ch| ch.width().unwrap_or(0)).sum()
}
