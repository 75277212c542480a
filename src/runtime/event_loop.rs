use std::sync::mpsc::Receiver;
use std::time::Duration;

use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent,
    MouseEventKind,
};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::app::{App, Intent, Screen, UiEvent};
use crate::config;
use crate::permission::Answer;
use crate::ui::{self, HitAreas, contains, seek_position};

/// Main terminal event loop: drains the UI queue, draws, then maps one input
/// event. Returns `Ok(())` once the app has shut down.
pub fn run(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    settings: &config::Settings,
    app: &mut App,
    queue: &Receiver<UiEvent>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut hits = HitAreas::default();
    loop {
        while let Ok(event) = queue.try_recv() {
            app.handle(event);
        }
        if app.should_quit() {
            break;
        }

        terminal.draw(|f| hits = ui::draw(f, app, &settings.controls))?;

        if event::poll(Duration::from_millis(50))? {
            let mapped = match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => map_key(key, app),
                Event::Mouse(mouse) => map_mouse(mouse, app, &hits),
                _ => None,
            };
            if let Some(event) = mapped {
                app.handle(event);
            }
        }
    }

    Ok(())
}

fn input(intent: Intent) -> Option<UiEvent> {
    Some(UiEvent::Input(intent))
}

pub(super) fn map_key(key: KeyEvent, app: &App) -> Option<UiEvent> {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return Some(UiEvent::Quit);
    }

    if app.dialog().is_some() {
        return match key.code {
            KeyCode::Char('y') | KeyCode::Enter => input(Intent::Answer(Answer::Allow)),
            KeyCode::Char('n') | KeyCode::Esc => input(Intent::Answer(Answer::DontAllow)),
            KeyCode::Char('q') => Some(UiEvent::Quit),
            _ => None,
        };
    }

    match key.code {
        KeyCode::Char('q') => return Some(UiEvent::Quit),
        KeyCode::Char(' ') | KeyCode::Char('p') => return input(Intent::TogglePlay),
        KeyCode::Char('n') => return input(Intent::Next),
        KeyCode::Char('b') => return input(Intent::Previous),
        _ => {}
    }

    match app.screen() {
        Screen::Library => match key.code {
            KeyCode::Up | KeyCode::Char('k') => input(Intent::Up),
            KeyCode::Down | KeyCode::Char('j') => input(Intent::Down),
            KeyCode::Left | KeyCode::Char('h') => input(Intent::Left),
            KeyCode::Right | KeyCode::Char('l') => input(Intent::Right),
            KeyCode::Enter => input(Intent::PlaySelected),
            KeyCode::Char('v') => input(Intent::ToggleSpan),
            KeyCode::Tab | KeyCode::Char('o') => input(Intent::OpenPlayer),
            _ => None,
        },
        Screen::Player => match key.code {
            KeyCode::Esc | KeyCode::Backspace => input(Intent::Back),
            KeyCode::Char('H') => input(Intent::Scrub(-1)),
            KeyCode::Char('L') => input(Intent::Scrub(1)),
            KeyCode::Enter => input(Intent::SeekCommit),
            _ => None,
        },
    }
}

pub(super) fn map_mouse(mouse: MouseEvent, app: &App, hits: &HitAreas) -> Option<UiEvent> {
    if app.dialog().is_some() {
        return None;
    }
    let (x, y) = (mouse.column, mouse.row);
    let seek_max = app.player_view().seek.max;

    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            if hits.mini_bar.is_some_and(|a| contains(a, x, y)) {
                return input(Intent::OpenPlayer);
            }
            if let Some(bar) = hits.seek_bar.filter(|a| contains(*a, x, y)) {
                return input(Intent::SeekDrag(seek_position(bar, x, seek_max)));
            }
            hits.grid
                .and_then(|g| g.index_at(x, y))
                .and_then(|i| input(Intent::Select(i)))
        }
        MouseEventKind::Drag(MouseButton::Left) if app.is_dragging() => hits
            .seek_bar
            .and_then(|bar| input(Intent::SeekDrag(seek_position(bar, x, seek_max)))),
        MouseEventKind::Up(MouseButton::Left) if app.is_dragging() => input(Intent::SeekCommit),
        MouseEventKind::ScrollDown if app.screen() == Screen::Library => input(Intent::Down),
        MouseEventKind::ScrollUp if app.screen() == Screen::Library => input(Intent::Up),
        _ => None,
    }
}
