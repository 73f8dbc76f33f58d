use anyhow::Result;

use crate::region::{Region, display_width, take_tail_width};
use crate::surface::{Attr, Key, Surface};

/// What a key press meant to the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    None,
    Edited,
    Up,
    Down,
    Confirm,
    Cancel,
}

/// Single-row query editor. Edits only ever happen at the end of the text.
pub struct InputLine {
    text: String,
    region: Region,
}

impl InputLine {
    pub fn new(region: Region) -> Self {
        Self {
            text: String::new(),
            region,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Blocks for one key, applies it and repaints.
    pub fn read_event<T: Surface + ?Sized>(&mut self, surface: &mut T) -> Result<Signal> {
        let key = surface.read_key(self.caret())?;
        let signal = self.apply(key);
        if signal == Signal::Edited {
            // a backspace leaves its old cell behind the caret
            self.region
                .put(surface, self.region.top(), self.caret().1, " ", Attr::Normal)?;
        }
        self.paint(surface)?;
        Ok(signal)
    }

    pub fn apply(&mut self, key: Key) -> Signal {
        match key {
            Key::Backspace => match self.text.pop() {
                Some(_) => Signal::Edited,
                None => Signal::None,
            },
            Key::Up => Signal::Up,
            Key::Down => Signal::Down,
            Key::Enter => Signal::Confirm,
            Key::Cancel => Signal::Cancel,
            Key::Char(ch) if !ch.is_control() => {
                self.text.push(ch);
                Signal::Edited
            }
            Key::Char(_) | Key::Other => Signal::None,
        }
    }

    pub fn paint<T: Surface + ?Sized>(&self, surface: &mut T) -> Result<()> {
        self.region.put(
            surface,
            self.region.top(),
            self.region.left(),
            self.visible(),
            Attr::Normal,
        )
    }

    /// Tail of the text that fits while leaving a cell free for the caret.
    fn visible(&self) -> &str {
        take_tail_width(&self.text, self.region.width().saturating_sub(1))
    }

    /// `(row, col)` just past the end of the visible text.
    fn caret(&self) -> (u16, u16) {
        let offset = u16::try_from(display_width(self.visible())).unwrap_or(u16::MAX);
        let col = self.region.clamp_col(self.region.left().saturating_add(offset));
        (self.region.top(), col)
    }
}
