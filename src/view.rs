use anyhow::Result;

use crate::model::{ActiveView, SelectionSink};
use crate::region::Region;
use crate::surface::{Attr, Surface};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Painted {
    start: usize,
    cursor: usize,
}

/// Draws a scrolling window of the active list, highlighting the cursor row.
///
/// Remembers what it painted last so a bare cursor move only touches the two
/// rows involved instead of the whole region.
pub struct ListView {
    region: Region,
    last: Option<Painted>,
}

impl ListView {
    pub fn new(region: Region) -> Self {
        Self { region, last: None }
    }

    /// Binds the view to a surface so the selection model can drive it.
    pub fn port<'a, T: Surface + ?Sized>(&'a mut self, surface: &'a mut T) -> ListPort<'a, T> {
        ListPort {
            view: self,
            surface,
        }
    }

    /// First visible index; keeps the cursor on the last row once it scrolls.
    fn window_start(&self, cursor: usize) -> usize {
        let height = self.region.height().max(1);
        cursor.saturating_sub(height - 1)
    }

    pub fn render_full<T: Surface + ?Sized>(
        &mut self,
        surface: &mut T,
        active: ActiveView<'_>,
        cursor: usize,
    ) -> Result<()> {
        let start = self.window_start(cursor);
        let blank = self.region.blank();
        for row in self.region.rows() {
            self.region
                .put(surface, row, self.region.left(), &blank, Attr::Normal)?;
        }
        for (row, item) in self
            .region
            .rows()
            .zip(active.iter().skip(start).take(self.region.height()))
        {
            self.region
                .put(surface, row, self.region.left(), item, Attr::Normal)?;
        }
        self.finish(surface, active, start, cursor)
    }

    pub fn render_cursor<T: Surface + ?Sized>(
        &mut self,
        surface: &mut T,
        active: ActiveView<'_>,
        cursor: usize,
    ) -> Result<()> {
        let start = self.window_start(cursor);
        let Some(last) = self.last.filter(|last| last.start == start) else {
            return self.render_full(surface, active, cursor);
        };

        self.repaint_row(surface, active, start, last.cursor, Attr::Normal)?;
        self.repaint_row(surface, active, start, cursor, Attr::Normal)?;
        self.finish(surface, active, start, cursor)
    }

    fn finish<T: Surface + ?Sized>(
        &mut self,
        surface: &mut T,
        active: ActiveView<'_>,
        start: usize,
        cursor: usize,
    ) -> Result<()> {
        self.repaint_row(surface, active, start, cursor, Attr::Highlight)?;
        self.last = Some(Painted { start, cursor });
        Ok(())
    }

    /// Blanks the row showing `index` and redraws its item, if it is on screen.
    fn repaint_row<T: Surface + ?Sized>(
        &self,
        surface: &mut T,
        active: ActiveView<'_>,
        start: usize,
        index: usize,
        attr: Attr,
    ) -> Result<()> {
        let Some(row) = self.row_of(start, index) else {
            return Ok(());
        };
        let Some(item) = active.get(index) else {
            return Ok(());
        };
        let left = self.region.left();
        if attr == Attr::Normal {
            self.region
                .put(surface, row, left, &self.region.blank(), Attr::Normal)?;
        }
        self.region.put(surface, row, left, item, attr)
    }

    fn row_of(&self, start: usize, index: usize) -> Option<u16> {
        let offset = index.checked_sub(start)?;
        if offset >= self.region.height() {
            return None;
        }
        Some(self.region.top() + offset as u16)
    }
}

/// [`SelectionSink`] that paints a [`ListView`] onto a surface.
pub struct ListPort<'a, T: Surface + ?Sized> {
    view: &'a mut ListView,
    surface: &'a mut T,
}

impl<T: Surface + ?Sized> SelectionSink for ListPort<'_, T> {
    fn on_full_update(&mut self, active: ActiveView<'_>, cursor: usize) -> Result<()> {
        self.view.render_full(&mut *self.surface, active, cursor)
    }

    fn on_cursor_update(&mut self, active: ActiveView<'_>, cursor: usize) -> Result<()> {
        self.view.render_cursor(&mut *self.surface, active, cursor)
    }
}

#[cfg(test)]
mod tests {
    use ratatui::layout::Rect;

    use super::*;
    use crate::surface::BufferSurface;

    fn items(values: &[&str]) -> (Vec<String>, Vec<usize>) {
        (
            values.iter().map(|value| value.to_string()).collect(),
            (0..values.len()).collect(),
        )
    }

    #[test]
    fn full_render_draws_window_and_highlights_cursor() {
        let (candidates, order) = items(&["alpha", "beta", "gamma"]);
        let mut surface = BufferSurface::new(6, 10);
        let mut view = ListView::new(Region::new(Rect::new(1, 2, 8, 4)));

        view.render_full(&mut surface, ActiveView::new(&candidates, &order), 1)
            .unwrap();

        assert_eq!(surface.row_text(2), " alpha");
        assert_eq!(surface.row_text(3), " beta");
        assert_eq!(surface.row_text(4), " gamma");
        assert_eq!(surface.row_text(5), "");
        assert!(surface.is_highlighted(3, 1));
        assert!(!surface.is_highlighted(2, 1));
    }

    #[test]
    fn scrolls_so_cursor_sits_on_last_row() {
        let (candidates, order) = items(&["a", "b", "c", "d", "e"]);
        let mut surface = BufferSurface::new(3, 4);
        let mut view = ListView::new(Region::new(Rect::new(0, 0, 4, 3)));

        view.render_full(&mut surface, ActiveView::new(&candidates, &order), 4)
            .unwrap();

        assert_eq!(surface.row_text(0), "c");
        assert_eq!(surface.row_text(1), "d");
        assert_eq!(surface.row_text(2), "e");
        assert!(surface.is_highlighted(2, 0));
    }

    #[test]
    fn cursor_move_within_window_touches_two_rows() {
        let (candidates, order) = items(&["a", "b", "c", "d"]);
        let active = ActiveView::new(&candidates, &order);
        let mut surface = BufferSurface::new(4, 4);
        let mut view = ListView::new(Region::new(Rect::new(0, 0, 4, 4)));

        view.render_full(&mut surface, active, 0).unwrap();
        surface.writes = 0;
        view.render_cursor(&mut surface, active, 1).unwrap();

        // old row: blank + text, new row: blank + text + highlight
        assert_eq!(surface.writes, 5);
        assert!(!surface.is_highlighted(0, 0));
        assert!(surface.is_highlighted(1, 0));
        assert_eq!(surface.row_text(0), "a");
        assert_eq!(surface.row_text(1), "b");
    }

    #[test]
    fn cursor_move_that_scrolls_falls_back_to_full_render() {
        let (candidates, order) = items(&["a", "b", "c", "d"]);
        let active = ActiveView::new(&candidates, &order);
        let mut surface = BufferSurface::new(3, 4);
        let mut view = ListView::new(Region::new(Rect::new(0, 0, 4, 3)));

        view.render_full(&mut surface, active, 2).unwrap();
        surface.writes = 0;
        view.render_cursor(&mut surface, active, 3).unwrap();

        // three blanks, three items, one highlight
        assert_eq!(surface.writes, 7);
        assert_eq!(surface.row_text(0), "b");
        assert_eq!(surface.row_text(1), "c");
        assert_eq!(surface.row_text(2), "d");
        assert!(surface.is_highlighted(2, 0));
    }

    #[test]
    fn wrap_to_top_repaints_whole_window() {
        let (candidates, order) = items(&["a", "b", "c"]);
        let active = ActiveView::new(&candidates, &order);
        let mut surface = BufferSurface::new(2, 4);
        let mut view = ListView::new(Region::new(Rect::new(0, 0, 4, 2)));

        view.render_full(&mut surface, active, 2).unwrap();
        view.render_cursor(&mut surface, active, 0).unwrap();

        assert_eq!(surface.row_text(0), "a");
        assert_eq!(surface.row_text(1), "b");
        assert!(surface.is_highlighted(0, 0));
        assert!(!surface.is_highlighted(1, 0));
    }

    #[test]
    fn empty_list_blanks_region_without_highlight() {
        let (candidates, order) = items(&["long entry"]);
        let mut surface = BufferSurface::new(2, 12);
        let mut view = ListView::new(Region::new(Rect::new(0, 0, 12, 2)));
        view.render_full(&mut surface, ActiveView::new(&candidates, &order), 0)
            .unwrap();

        view.render_full(&mut surface, ActiveView::new(&candidates, &[]), 0)
            .unwrap();

        assert_eq!(surface.row_text(0), "");
        assert!(!surface.is_highlighted(0, 0));
    }

    #[test]
    fn long_items_are_cut_at_region_edge() {
        let (candidates, order) = items(&["a/very/long/path.rs"]);
        let mut surface = BufferSurface::new(2, 20);
        let mut view = ListView::new(Region::new(Rect::new(2, 0, 6, 2)));

        view.render_full(&mut surface, ActiveView::new(&candidates, &order), 0)
            .unwrap();

        assert_eq!(surface.row_text(0), "  a/very");
    }
}
