use std::io::{self, Stdout, Write};

use anyhow::{Context, Result};
use crossterm::cursor::{self, MoveTo};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::style::{Attribute, Print, SetAttribute};
use crossterm::terminal::{
    self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode,
    enable_raw_mode,
};
use crossterm::{execute, queue};

/// A decoded key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Up,
    Down,
    Enter,
    Backspace,
    Cancel,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attr {
    Normal,
    Highlight,
}

/// The drawing and input primitives the picker needs from a terminal.
///
/// Coordinates are zero-based `(row, col)`. Writes that start outside the
/// terminal are dropped and writes that run past its right edge are cut.
pub trait Surface {
    /// Current size as `(rows, cols)`.
    fn size(&self) -> Result<(u16, u16)>;
    fn put(&mut self, row: u16, col: u16, text: &str, attr: Attr) -> Result<()>;
    /// Blocks until the next key press, with the caret parked at `caret`.
    fn read_key(&mut self, caret: (u16, u16)) -> Result<Key>;
    fn flush(&mut self) -> Result<()>;
    fn set_echo(&mut self, enabled: bool) -> Result<()>;
}

/// Maps a crossterm key event onto a [`Key`].
///
/// Terminals disagree on what enter and backspace send, so CR, LF, Ctrl-M and
/// Ctrl-J all count as enter, and DEL, BS and Ctrl-H all count as backspace.
pub fn classify(key: KeyEvent) -> Key {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Enter => Key::Enter,
        KeyCode::Backspace => Key::Backspace,
        KeyCode::Up => Key::Up,
        KeyCode::Down => Key::Down,
        KeyCode::Esc => Key::Cancel,
        KeyCode::Char('\r' | '\n') => Key::Enter,
        KeyCode::Char('\u{7f}' | '\u{8}') => Key::Backspace,
        KeyCode::Char('m' | 'j') if ctrl => Key::Enter,
        KeyCode::Char('h') if ctrl => Key::Backspace,
        KeyCode::Char('c') if ctrl => Key::Cancel,
        KeyCode::Char(_) if ctrl || key.modifiers.contains(KeyModifiers::ALT) => Key::Other,
        KeyCode::Char(ch) => Key::Char(ch),
        _ => Key::Other,
    }
}

/// The real terminal, driven through crossterm on the alternate screen.
pub struct TerminalSurface {
    out: Stdout,
    raw: bool,
}

impl TerminalSurface {
    pub fn open() -> Result<Self> {
        let mut out = io::stdout();
        execute!(out, EnterAlternateScreen, Clear(ClearType::All))
            .context("failed to enter alternate screen")?;
        Ok(Self { out, raw: false })
    }

    fn restore(&mut self) -> Result<()> {
        if self.raw {
            disable_raw_mode().context("failed to disable raw mode")?;
            self.raw = false;
        }
        execute!(self.out, LeaveAlternateScreen, cursor::Show)
            .context("failed to leave alternate screen")
    }
}

impl Surface for TerminalSurface {
    fn size(&self) -> Result<(u16, u16)> {
        let (cols, rows) = terminal::size().context("failed to read terminal size")?;
        Ok((rows, cols))
    }

    fn put(&mut self, row: u16, col: u16, text: &str, attr: Attr) -> Result<()> {
        let (rows, cols) = self.size()?;
        if row >= rows || col >= cols {
            return Ok(());
        }
        let text = crate::region::take_width(text, usize::from(cols - col));

        queue!(self.out, MoveTo(col, row))?;
        match attr {
            Attr::Normal => queue!(self.out, Print(text))?,
            Attr::Highlight => queue!(
                self.out,
                SetAttribute(Attribute::Reverse),
                Print(text),
                SetAttribute(Attribute::Reset)
            )?,
        }
        Ok(())
    }

    fn read_key(&mut self, caret: (u16, u16)) -> Result<Key> {
        let (row, col) = caret;
        queue!(self.out, MoveTo(col, row), cursor::Show)?;
        self.out.flush().context("failed to flush terminal")?;

        loop {
            let Event::Key(key) = event::read().context("failed to read terminal event")? else {
                continue;
            };
            if key.kind == KeyEventKind::Release {
                continue;
            }
            return Ok(classify(key));
        }
    }

    fn flush(&mut self) -> Result<()> {
        self.out.flush().context("failed to flush terminal")
    }

    fn set_echo(&mut self, enabled: bool) -> Result<()> {
        if enabled && self.raw {
            disable_raw_mode().context("failed to disable raw mode")?;
            self.raw = false;
        } else if !enabled && !self.raw {
            enable_raw_mode().context("failed to enable raw mode")?;
            self.raw = true;
        }
        Ok(())
    }
}

impl Drop for TerminalSurface {
    fn drop(&mut self) {
        let _ = self.restore();
    }
}

#[cfg(test)]
pub use headless::BufferSurface;


#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode, modifiers: KeyModifiers) -> Key {
        classify(KeyEvent::new(code, modifiers))
    }

    #[test]
    fn classifies_every_enter_encoding() {
        assert_eq!(press(KeyCode::Enter, KeyModifiers::NONE), Key::Enter);
        assert_eq!(press(KeyCode::Char('\r'), KeyModifiers::NONE), Key::Enter);
        assert_eq!(press(KeyCode::Char('\n'), KeyModifiers::NONE), Key::Enter);
        assert_eq!(press(KeyCode::Char('m'), KeyModifiers::CONTROL), Key::Enter);
        assert_eq!(press(KeyCode::Char('j'), KeyModifiers::CONTROL), Key::Enter);
    }

    #[test]
    fn classifies_every_backspace_encoding() {
        assert_eq!(press(KeyCode::Backspace, KeyModifiers::NONE), Key::Backspace);
        assert_eq!(press(KeyCode::Char('\u{7f}'), KeyModifiers::NONE), Key::Backspace);
        assert_eq!(press(KeyCode::Char('\u{8}'), KeyModifiers::NONE), Key::Backspace);
        assert_eq!(press(KeyCode::Char('h'), KeyModifiers::CONTROL), Key::Backspace);
    }

    #[test]
    fn shifted_characters_stay_printable() {
        assert_eq!(press(KeyCode::Char('A'), KeyModifiers::SHIFT), Key::Char('A'));
        assert_eq!(press(KeyCode::Char('x'), KeyModifiers::NONE), Key::Char('x'));
    }

    #[test]
    fn control_chords_and_function_keys_are_other() {
        assert_eq!(press(KeyCode::Char('x'), KeyModifiers::CONTROL), Key::Other);
        assert_eq!(press(KeyCode::Char('x'), KeyModifiers::ALT), Key::Other);
        assert_eq!(press(KeyCode::F(2), KeyModifiers::NONE), Key::Other);
        assert_eq!(press(KeyCode::Left, KeyModifiers::NONE), Key::Other);
    }

    #[test]
    fn escape_and_ctrl_c_cancel() {
        assert_eq!(press(KeyCode::Esc, KeyModifiers::NONE), Key::Cancel);
        assert_eq!(press(KeyCode::Char('c'), KeyModifiers::CONTROL), Key::Cancel);
    }

    #[test]
    fn buffer_surface_clips_and_highlights() {
        let mut surface = BufferSurface::new(2, 5);
        surface.put(0, 1, "abcdefgh", Attr::Highlight).unwrap();
        surface.put(5, 0, "ignored", Attr::Normal).unwrap();
        assert_eq!(surface.row_text(0), " abcd");
        assert!(surface.is_highlighted(0, 1));
        assert!(!surface.is_highlighted(0, 0));

        surface.put(0, 1, "zz", Attr::Normal).unwrap();
        assert!(!surface.is_highlighted(0, 1));
    }
}
