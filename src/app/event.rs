use crate::engine::EngineEvent;
use crate::permission::Answer;
use crate::poller::Tick;

/// What the user asked for, already mapped from keys or mouse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Up,
    Down,
    Left,
    Right,
    /// Move the cursor to a grid cell.
    Select(usize),
    PlaySelected,
    TogglePlay,
    Next,
    Previous,
    ToggleSpan,
    OpenPlayer,
    Back,
    /// Nudge the seek handle by a signed number of milliseconds.
    Scrub(i64),
    /// Drag the seek handle to an absolute position.
    SeekDrag(u64),
    SeekCommit,
    Answer(Answer),
}

/// Everything the UI thread reacts to, in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    Input(Intent),
    Engine(EngineEvent),
    Tick(Tick),
    Quit,
}
