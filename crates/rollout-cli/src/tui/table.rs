//! TUI table over the work items of one version (or all versions).
//!
//! The table is windowed: only the rows inside the [`ViewWindow`] range
//! are materialized as ratatui rows, the rest of the scroll extent is
//! represented by the window's spacers (surfaced here as the position
//! indicator). Edits made from the table go through the catalog and are
//! staged like any other edit; the status bar shows the open batch size.
//!
//! Key bindings: j/k move, g/G home/end, ctrl-d/ctrl-u half page,
//! s cycle status (staged), w commit batch, u discard batch, q quit.

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    DefaultTerminal, Frame,
};
use rollout_core::model::Status;
use rollout_core::window::{ViewWindow, WindowParams};
use rollout_core::Catalog;

/// Run the table view until the user quits.
pub fn run_table_tui(
    catalog: &mut Catalog,
    version_id: Option<u64>,
    params: WindowParams,
) -> Result<()> {
    let mut terminal = ratatui::init();
    let result = TableView::new(catalog, version_id, params).run(&mut terminal);
    ratatui::restore();
    result
}

/// One materialized table row.
struct RowView {
    id: u64,
    version: String,
    name: String,
    status: Status,
    parties: usize,
}

struct TableView<'a> {
    catalog: &'a mut Catalog,
    /// Restrict the table to one version; `None` shows everything.
    version_id: Option<u64>,
    /// Row data in display order, parallel to the window's keys.
    rows: Vec<RowView>,
    window: ViewWindow,
    /// Selected index into `rows`.
    selected: usize,
    status_msg: Option<String>,
    should_quit: bool,
}

impl<'a> TableView<'a> {
    fn new(catalog: &'a mut Catalog, version_id: Option<u64>, params: WindowParams) -> Self {
        let mut view = Self {
            catalog,
            version_id,
            rows: Vec::new(),
            window: ViewWindow::new(params),
            selected: 0,
            status_msg: None,
            should_quit: false,
        };
        view.reload();
        view
    }

    /// Rebuild the row list from the catalog. Scroll position survives:
    /// the window only rematerializes rows that actually changed.
    fn reload(&mut self) {
        self.rows = self
            .catalog
            .versions()
            .iter()
            .filter(|v| self.version_id.is_none_or(|id| v.id == id))
            .flat_map(|version| {
                version.cdus.iter().map(|cdu| RowView {
                    id: cdu.id,
                    version: version.number.clone(),
                    name: cdu.name.clone(),
                    status: cdu.status,
                    parties: cdu.parties.len(),
                })
            })
            .collect();
        self.window.update_data(self.rows.iter().map(|r| r.id).collect());
        if self.selected >= self.rows.len() {
            self.selected = self.rows.len().saturating_sub(1);
        }
    }

    fn run(mut self, terminal: &mut DefaultTerminal) -> Result<()> {
        while !self.should_quit {
            terminal.draw(|frame| self.draw(frame))?;
            if let Event::Key(key) = event::read()? {
                self.handle_key(key);
            }
        }
        Ok(())
    }

    fn handle_key(&mut self, key: KeyEvent) {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let half_page = i64::try_from((self.window.params().visible_rows / 2).max(1)).unwrap_or(1);
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('j') | KeyCode::Down => self.select(1),
            KeyCode::Char('k') | KeyCode::Up => self.select(-1),
            KeyCode::Char('d') if ctrl => self.select(half_page),
            KeyCode::Char('u') if ctrl => self.select(-half_page),
            KeyCode::Char('g') => {
                self.selected = 0;
                self.window.set_scroll(0);
            }
            KeyCode::Char('G') => {
                self.selected = self.rows.len().saturating_sub(1);
                self.window.scroll_to_end();
            }
            KeyCode::Char('s') => self.cycle_status(),
            KeyCode::Char('w') => {
                let applied = self.catalog.commit_changes();
                self.status_msg = Some(format!("committed {} change(s)", applied.len()));
                self.reload();
            }
            KeyCode::Char('u') => match self.catalog.discard_changes() {
                Ok(dropped) => {
                    self.status_msg = Some(format!("discarded {} change(s)", dropped.len()));
                    self.reload();
                }
                Err(err) => {
                    self.status_msg = Some(format!("rollback failed: {err}"));
                }
            },
            _ => {}
        }
    }

    /// Move the selection, keeping it inside the materialized window.
    fn select(&mut self, delta: i64) {
        if self.rows.is_empty() {
            return;
        }
        let last = self.rows.len() - 1;
        let target = if delta < 0 {
            self.selected.saturating_sub(delta.unsigned_abs() as usize)
        } else {
            (self.selected + delta.unsigned_abs() as usize).min(last)
        };
        self.selected = target;

        let height = self.window.params().row_height;
        let visible = self.window.params().visible_rows;
        let first_visible = (self.window.scroll_px() / height) as usize;
        if target < first_visible {
            self.window.set_scroll(target as u64 * height);
        } else if target >= first_visible + visible {
            let top = (target + 1).saturating_sub(visible);
            self.window.set_scroll(top as u64 * height);
        }
    }

    /// Advance the selected item to the next lifecycle status (staged).
    fn cycle_status(&mut self) {
        let Some(row) = self.rows.get(self.selected) else {
            return;
        };
        let next_idx = Status::ALL
            .iter()
            .position(|s| *s == row.status)
            .map_or(0, |i| (i + 1) % Status::ALL.len());
        let next = Status::ALL[next_idx];
        let now = chrono::Utc::now().timestamp_micros();
        if self.catalog.set_cdu_status(row.id, next, now) {
            self.status_msg = Some(format!("staged: {} -> {next}", row.name));
            self.reload();
        }
    }

    fn draw(&self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(3), Constraint::Length(1)])
            .split(frame.area());

        self.draw_table(frame, chunks[0]);
        self.draw_status_bar(frame, chunks[1]);
    }

    fn draw_table(&self, frame: &mut Frame, area: Rect) {
        let range = self.window.range().clone();
        let rows: Vec<Row> = self.rows[range.clone()]
            .iter()
            .enumerate()
            .map(|(offset, row)| {
                let style = if range.start + offset == self.selected {
                    Style::default()
                        .add_modifier(Modifier::REVERSED)
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default()
                };
                Row::new(vec![
                    Cell::from(row.id.to_string()),
                    Cell::from(row.version.clone()),
                    Cell::from(row.name.clone()),
                    Cell::from(row.status.to_string()).style(status_style(row.status)),
                    Cell::from(row.parties.to_string()),
                ])
                .style(style)
            })
            .collect();

        let title = format!(
            " work items {}-{} of {} ",
            range.start.min(self.rows.len()),
            range.end,
            self.rows.len()
        );
        let table = Table::new(
            rows,
            [
                Constraint::Length(5),
                Constraint::Length(10),
                Constraint::Min(16),
                Constraint::Length(22),
                Constraint::Length(7),
            ],
        )
        .header(
            Row::new(vec!["id", "version", "name", "status", "owners"])
                .style(Style::default().add_modifier(Modifier::BOLD)),
        )
        .block(Block::default().borders(Borders::ALL).title(title));

        frame.render_widget(table, area);
    }

    fn draw_status_bar(&self, frame: &mut Frame, area: Rect) {
        let raw = self.catalog.stats_raw();
        let unique = self.catalog.stats_unique();
        let pending = self.catalog.pending().len();

        let text = self.status_msg.clone().unwrap_or_else(|| {
            format!(
                "raw {} | unique {} | pending {} | s status  w commit  u discard  q quit",
                raw.total(),
                unique.total(),
                pending
            )
        });
        frame.render_widget(
            Paragraph::new(Line::from(text)).style(Style::default().fg(Color::DarkGray)),
            area,
        );
    }
}

fn status_style(status: Status) -> Style {
    match status {
        Status::InDevelopment => Style::default().fg(Color::Yellow),
        Status::PendingCertification => Style::default().fg(Color::Magenta),
        Status::CertifiedOk => Style::default().fg(Color::Green),
        Status::InProduction => Style::default().fg(Color::Cyan),
    }
}
