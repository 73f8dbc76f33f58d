use anyhow::Result;
use tracing::debug;

use crate::matcher::Matcher;

/// Receives the selection model's change notifications.
pub trait SelectionSink {
    /// The active list was recomputed.
    fn on_full_update(&mut self, active: ActiveView<'_>, cursor: usize) -> Result<()>;
    /// Only the cursor moved; the active list is the one from the last full update.
    fn on_cursor_update(&mut self, active: ActiveView<'_>, cursor: usize) -> Result<()>;
}

impl<S: SelectionSink + ?Sized> SelectionSink for &mut S {
    fn on_full_update(&mut self, active: ActiveView<'_>, cursor: usize) -> Result<()> {
        (**self).on_full_update(active, cursor)
    }

    fn on_cursor_update(&mut self, active: ActiveView<'_>, cursor: usize) -> Result<()> {
        (**self).on_cursor_update(active, cursor)
    }
}

/// Notifies the first sink, then the second.
impl<A: SelectionSink, B: SelectionSink> SelectionSink for (A, B) {
    fn on_full_update(&mut self, active: ActiveView<'_>, cursor: usize) -> Result<()> {
        self.0.on_full_update(active, cursor)?;
        self.1.on_full_update(active, cursor)
    }

    fn on_cursor_update(&mut self, active: ActiveView<'_>, cursor: usize) -> Result<()> {
        self.0.on_cursor_update(active, cursor)?;
        self.1.on_cursor_update(active, cursor)
    }
}

/// Borrowed, ranked view of the candidates that passed the current filter.
#[derive(Debug, Clone, Copy)]
pub struct ActiveView<'a> {
    candidates: &'a [String],
    order: &'a [usize],
}

impl<'a> ActiveView<'a> {
    pub fn new(candidates: &'a [String], order: &'a [usize]) -> Self {
        Self { candidates, order }
    }

    pub fn get(&self, index: usize) -> Option<&'a str> {
        let candidate = *self.order.get(index)?;
        self.candidates.get(candidate).map(String::as_str)
    }

    pub fn iter(self) -> impl Iterator<Item = &'a str> + 'a {
        let candidates = self.candidates;
        self.order
            .iter()
            .filter_map(move |&index| candidates.get(index).map(String::as_str))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

pub struct SelectionModel {
    candidates: Vec<String>,
    matcher: Matcher,
    active: Vec<usize>,
    cursor: usize,
}

impl SelectionModel {
    /// Starts unfiltered: every candidate is active, in input order.
    pub fn new(candidates: Vec<String>, matcher: Matcher) -> Self {
        let active = (0..candidates.len()).collect();
        Self {
            candidates,
            matcher,
            active,
            cursor: 0,
        }
    }

    pub fn active(&self) -> ActiveView<'_> {
        ActiveView::new(&self.candidates, &self.active)
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Re-ranks every candidate against `query` and publishes a full update.
    pub fn apply_filter<S: SelectionSink>(&mut self, query: &str, sink: &mut S) -> Result<()> {
        let mut scored: Vec<(usize, f64)> = self
            .candidates
            .iter()
            .enumerate()
            .map(|(index, candidate)| (index, self.matcher.score(query, candidate)))
            .filter(|(_, score)| *score > 0.0)
            .collect();
        // `sort_by` is stable, so equal scores keep input order.
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));

        self.active = scored.into_iter().map(|(index, _)| index).collect();
        if self.cursor >= self.active.len() {
            self.cursor = 0;
        }
        debug!(query, matched = self.active.len(), cursor = self.cursor, "filter applied");

        sink.on_full_update(self.active(), self.cursor)
    }

    /// Moves the cursor one step, wrapping at both ends. Does nothing when no
    /// candidate is active.
    pub fn move_cursor<S: SelectionSink>(
        &mut self,
        direction: Direction,
        sink: &mut S,
    ) -> Result<usize> {
        let len = self.active.len();
        if len == 0 {
            return Ok(self.cursor);
        }

        self.cursor = match direction {
            Direction::Down => (self.cursor + 1) % len,
            Direction::Up => (self.cursor + len - 1) % len,
        };
        debug!(?direction, cursor = self.cursor, "cursor moved");

        sink.on_cursor_update(self.active(), self.cursor)?;
        Ok(self.cursor)
    }

    pub fn current(&self) -> Option<&str> {
        self.active().get(self.cursor)
    }
}
