use anyhow::{Context, Result};
use ratatui::layout::{Constraint, Direction as Axis, Layout, Rect};
use tracing::{debug, info};

use crate::input::{InputLine, Signal};
use crate::matcher::{MatchAlgorithm, Matcher};
use crate::model::{Direction, SelectionModel};
use crate::region::Region;
use crate::surface::Surface;
use crate::view::ListView;

#[derive(Debug, Clone, Copy)]
pub struct PickerSettings {
    pub algorithm: MatchAlgorithm,
}

/// Runs the interactive picker until the user confirms or cancels.
pub fn run_picker<T: Surface>(
    surface: T,
    candidates: Vec<String>,
    settings: PickerSettings,
) -> Result<Option<String>> {
    let mut picker = Picker::new(surface, candidates, settings)?;
    picker.run()
}

struct Picker<T: Surface> {
    surface: T,
    input: InputLine,
    model: SelectionModel,
    list: ListView,
}

impl<T: Surface> Picker<T> {
    fn new(mut surface: T, candidates: Vec<String>, settings: PickerSettings) -> Result<Self> {
        let (rows, cols) = surface.size()?;
        let (query_area, list_area) = split_screen(Rect::new(0, 0, cols, rows));
        surface.set_echo(false)?;

        info!(
            candidates = candidates.len(),
            algorithm = ?settings.algorithm,
            rows,
            cols,
            "picker started"
        );
        let model = SelectionModel::new(candidates, Matcher::new(settings.algorithm));
        let mut list = ListView::new(Region::new(list_area));
        list.render_full(&mut surface, model.active(), model.cursor())?;
        surface.flush()?;

        Ok(Self {
            surface,
            input: InputLine::new(Region::new(query_area)),
            model,
            list,
        })
    }

    fn run(&mut self) -> Result<Option<String>> {
        loop {
            let signal = self
                .input
                .read_event(&mut self.surface)
                .context("failed to read query input")?;
            debug!(?signal, query = self.input.text(), "input");

            let mut port = self.list.port(&mut self.surface);
            match signal {
                Signal::Edited => self.model.apply_filter(self.input.text(), &mut port)?,
                Signal::Up => {
                    self.model.move_cursor(Direction::Up, &mut port)?;
                }
                Signal::Down => {
                    self.model.move_cursor(Direction::Down, &mut port)?;
                }
                Signal::Confirm => return Ok(self.model.current().map(str::to_owned)),
                Signal::Cancel => return Ok(None),
                Signal::None => {}
            }
            self.surface.flush()?;
        }
    }
}

/// Query line on the second row, list below it, one blank cell of margin on
/// the top and left.
fn split_screen(screen: Rect) -> (Rect, Rect) {
    let inner = Rect {
        x: screen.x.saturating_add(1),
        y: screen.y.saturating_add(1),
        width: screen.width.saturating_sub(1),
        height: screen.height.saturating_sub(1),
    };
    let chunks = Layout::default()
        .direction(Axis::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(0)])
        .split(inner);
    (chunks[0], chunks[1])
}
