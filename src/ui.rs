//! UI rendering helpers for the terminal user interface.
//!
//! `draw` renders the screen on top of the stack plus any overlay, and
//! returns the areas the mouse can interact with.

use std::time::Instant;

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style, Stylize},
    text::Line,
    widgets::{Block, Borders, Clear, Gauge, List, ListItem, ListState, Padding, Paragraph, Wrap},
};

use crate::app::{App, Screen};
use crate::config::ControlsSettings;
use crate::transport::{TransportIcon, TransportView, readable_time};

const DISC_FRAMES: [&str; 4] = ["◐", "◓", "◑", "◒"];

/// Screen regions that react to the mouse, from the last draw.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HitAreas {
    pub mini_bar: Option<Rect>,
    pub seek_bar: Option<Rect>,
    pub grid: Option<GridArea>,
}

/// Where the library grid sits and which row is at its top.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridArea {
    pub area: Rect,
    pub first_row: usize,
    pub span: u16,
    pub len: usize,
}

impl GridArea {
    /// Catalog index under a terminal cell, if any.
    pub fn index_at(&self, column: u16, row: u16) -> Option<usize> {
        if !contains(self.area, column, row) || self.span == 0 {
            return None;
        }
        let col_width = (self.area.width / self.span).max(1);
        let col = ((column - self.area.x) / col_width).min(self.span - 1) as usize;
        let line = (row - self.area.y) as usize;
        let index = (self.first_row + line) * self.span as usize + col;
        (index < self.len).then_some(index)
    }
}

pub fn contains(area: Rect, column: u16, row: u16) -> bool {
    column >= area.x
        && column < area.x.saturating_add(area.width)
        && row >= area.y
        && row < area.y.saturating_add(area.height)
}

/// Seek position for a click at `column` on a bar spanning `area`.
pub fn seek_position(area: Rect, column: u16, max: u64) -> u64 {
    if area.width <= 1 {
        return 0;
    }
    let offset = column.saturating_sub(area.x).min(area.width - 1) as u64;
    offset * max / (area.width - 1) as u64
}

fn icon_glyph(icon: TransportIcon) -> &'static str {
    match icon {
        TransportIcon::Play => "▶",
        TransportIcon::Pause => "⏸",
    }
}

fn controls_text(screen: Screen, scrub_seconds: u64) -> String {
    let keys: &[&str] = match screen {
        Screen::Library => &[
            "[arrows/hjkl] move",
            "[enter] play",
            "[space/p] play/pause",
            "[n/b] next/prev",
            "[v] columns",
            "[tab/o] player",
            "[q] quit",
        ],
        Screen::Player => &[
            "[space/p] play/pause",
            "[n/b] next/prev",
            "[enter] commit seek",
            "[esc] back",
            "[q] quit",
        ],
    };
    let mut parts: Vec<String> = keys.iter().map(|k| k.to_string()).collect();
    if screen == Screen::Player {
        parts.insert(2, format!("[H/L] scrub -/+{scrub_seconds}s"));
    }
    parts.join(" | ")
}

/// Compute a centered rectangle with given size constrained to `r`.
fn centered_rect_sized(mut width: u16, mut height: u16, r: Rect) -> Rect {
    width = width.min(r.width.saturating_sub(2)).max(10);
    height = height.min(r.height.saturating_sub(2)).max(5);

    let x = r.x + (r.width.saturating_sub(width) / 2);
    let y = r.y + (r.height.saturating_sub(height) / 2);
    Rect {
        x,
        y,
        width,
        height,
    }
}

fn padded(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .title(title)
        .padding(Padding {
            left: 1,
            right: 0,
            top: 0,
            bottom: 0,
        })
}

/// Render the entire UI and report mouse targets.
pub fn draw(frame: &mut Frame, app: &App, controls: &ControlsSettings) -> HitAreas {
    let mut hits = HitAreas::default();
    match app.screen() {
        Screen::Library => draw_library(frame, app, controls, &mut hits),
        Screen::Player => draw_player(frame, app, controls, &mut hits),
    }

    if let Some(dialog) = app.dialog() {
        let area = centered_rect_sized(56, 7, frame.area());
        frame.render_widget(Clear, area);
        let body = format!(
            "{}\n\n[y] {}    [n] {}",
            dialog.message, dialog.allow, dialog.deny
        );
        let paragraph = Paragraph::new(body)
            .alignment(Alignment::Center)
            .block(padded(dialog.title).title_alignment(Alignment::Center))
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
    }

    if let Some(toast) = app.toast().filter(|t| t.is_visible(Instant::now())) {
        let full = frame.area();
        let width = (toast.message.chars().count() as u16 + 4).min(full.width);
        let area = Rect {
            x: full.x + full.width.saturating_sub(width) / 2,
            y: full.y + full.height.saturating_sub(4),
            width,
            height: 3.min(full.height),
        };
        frame.render_widget(Clear, area);
        frame.render_widget(
            Paragraph::new(toast.message.as_str())
                .alignment(Alignment::Center)
                .block(Block::bordered()),
            area,
        );
    }

    hits
}

fn draw_library(frame: &mut Frame, app: &App, controls: &ControlsSettings, hits: &mut HitAreas) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(3),
            Constraint::Length(3),
        ])
        .split(frame.area());

    let header = Paragraph::new(app.title())
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" spindle ")
                .title_alignment(Alignment::Center),
        );
    frame.render_widget(header, chunks[0]);

    let grid_block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" songs ({}) ", app.catalog().len()));
    let grid_inner = grid_block.inner(chunks[1]);
    frame.render_widget(grid_block, chunks[1]);
    hits.grid = Some(draw_grid(frame, app, grid_inner));

    let mini = app.mini_view();
    let mini_text = if mini.title.is_empty() {
        format!("{} nothing playing", icon_glyph(mini.icon))
    } else {
        format!(
            "{} {}  {}/{}",
            icon_glyph(mini.icon),
            mini.title,
            mini.position_label,
            mini.duration_label
        )
    };
    frame.render_widget(
        Paragraph::new(mini_text).block(padded(" now playing ")),
        chunks[2],
    );
    hits.mini_bar = Some(chunks[2]);

    frame.render_widget(
        Paragraph::new(controls_text(Screen::Library, controls.scrub_seconds))
            .block(padded(" controls "))
            .wrap(Wrap { trim: true }),
        chunks[3],
    );
}

fn draw_grid(frame: &mut Frame, app: &App, area: Rect) -> GridArea {
    let span = app.span().max(1);
    let len = app.catalog().len();
    let rows = len.div_ceil(span as usize);
    let height = area.height as usize;
    let selected_row = app.selected() / span as usize;

    // Keep the selected row centered when the grid overflows.
    let first_row = if rows <= height || height == 0 {
        0
    } else {
        let half = height / 2;
        let start = selected_row.saturating_sub(half);
        start.min(rows - height)
    };
    let last_row = (first_row + height).min(rows);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(vec![Constraint::Ratio(1, span as u32); span as usize])
        .split(area);

    for (col, col_area) in columns.iter().enumerate() {
        let items: Vec<ListItem> = (first_row..last_row)
            .filter_map(|row| app.catalog().get(row * span as usize + col))
            .map(|track| {
                ListItem::new(Line::from(format!(
                    "{}  {}",
                    track.title,
                    readable_time(track.duration_ms)
                )))
            })
            .collect();

        let mut state = ListState::default();
        if app.selected() % span as usize == col && len > 0 {
            state.select(Some(selected_row - first_row));
        }
        let list = List::new(items)
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .highlight_symbol("> ");
        frame.render_stateful_widget(list, *col_area, &mut state);
    }

    GridArea {
        area,
        first_row,
        span,
        len,
    }
}

fn disc_frame(view: &TransportView, app: &App) -> &'static str {
    let phase = view.spin.phase(app.rotation());
    let i = ((phase * DISC_FRAMES.len() as f64) as usize).min(DISC_FRAMES.len() - 1);
    DISC_FRAMES[i]
}

fn draw_player(frame: &mut Frame, app: &App, controls: &ControlsSettings, hits: &mut HitAreas) {
    let view = app.player_view();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(3),
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(3),
        ])
        .split(frame.area());

    let title = if view.title.is_empty() {
        "nothing queued"
    } else {
        view.title.as_str()
    };
    frame.render_widget(
        Paragraph::new(title)
            .alignment(Alignment::Center)
            .bold()
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(" now playing ")
                    .title_alignment(Alignment::Center),
            ),
        chunks[0],
    );

    let art = vec![
        Line::from(""),
        Line::from(disc_frame(view, app)).bold(),
        Line::from(""),
        Line::from(view.artwork.label()).italic(),
    ];
    frame.render_widget(
        Paragraph::new(art)
            .alignment(Alignment::Center)
            .block(Block::bordered().title(if view.spin.is_spinning() {
                " artwork "
            } else {
                " artwork (paused) "
            })),
        chunks[1],
    );

    let times = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(chunks[2]);
    frame.render_widget(Paragraph::new(format!(" {}", view.position_label)), times[0]);
    frame.render_widget(
        Paragraph::new(format!("{} ", view.duration_label)).alignment(Alignment::Right),
        times[1],
    );

    let seek_block = Block::bordered().title(if app.is_dragging() {
        " seek (enter to commit) "
    } else {
        " seek "
    });
    let seek_inner = seek_block.inner(chunks[3]);
    let label = if app.is_dragging() {
        readable_time(view.seek.progress)
    } else {
        String::new()
    };
    frame.render_widget(
        Gauge::default()
            .block(seek_block)
            .ratio(view.seek.ratio())
            .label(label),
        chunks[3],
    );
    hits.seek_bar = Some(seek_inner);

    frame.render_widget(
        Paragraph::new(format!("⏮    {}    ⏭", icon_glyph(view.icon)))
            .alignment(Alignment::Center)
            .block(Block::bordered()),
        chunks[4],
    );

    frame.render_widget(
        Paragraph::new(controls_text(Screen::Player, controls.scrub_seconds))
            .block(padded(" controls "))
            .wrap(Wrap { trim: true }),
        chunks[5],
    );
}
