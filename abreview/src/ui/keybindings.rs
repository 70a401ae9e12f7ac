//! Keybinding dispatcher for abreview.
//!
//! Translates raw crossterm `KeyEvent`s into `AppState` mutations and returns a
//! `KeyAction` telling the event loop what to do next. Work that leaves the
//! loop (network, players) is returned as an action rather than started here.

use crossterm::event::{KeyCode, KeyEvent, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Position;

use abreview_core::engine::MediaRequest;
use abreview_core::types::Choice;

use crate::app::{AppState, LoadState, Mode, SubmitTicket, ViewMode};

/// Control-flow signal returned from the dispatchers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyAction {
    Continue,
    Quit,
    /// Re-issue the task load.
    Reload,
    /// Open players for a newly shown pair (or reopen the current one).
    OpenMedia(MediaRequest),
    Submit(SubmitTicket),
}

impl From<Option<MediaRequest>> for KeyAction {
    fn from(request: Option<MediaRequest>) -> Self {
        request.map_or(KeyAction::Continue, KeyAction::OpenMedia)
    }
}

/// Dispatches a key event to the handler matching the current mode.
pub fn handle_key(key: KeyEvent, state: &mut AppState) -> KeyAction {
    match state.mode {
        Mode::HelpOverlay => handle_help(key, state),
        Mode::Normal => handle_normal(key, state),
    }
}

// ---------------------------------------------------------------------------
// Normal mode
// ---------------------------------------------------------------------------

fn handle_normal(key: KeyEvent, state: &mut AppState) -> KeyAction {
    if let Some(action) = handle_jump_key(key, state) {
        return action;
    }

    match key.code {
        KeyCode::Char('l') | KeyCode::Char('n') | KeyCode::Right => {
            state.navigate(|engine| engine.next()).into()
        }
        KeyCode::Char('h') | KeyCode::Char('p') | KeyCode::Left => {
            state.navigate(|engine| engine.previous()).into()
        }
        KeyCode::Char('g') | KeyCode::Home => state.navigate(|engine| engine.go_to(0)).into(),
        KeyCode::Char('G') | KeyCode::End => state
            .navigate(|engine| {
                let last = engine.session().len().saturating_sub(1);
                engine.go_to(last)
            })
            .into(),

        KeyCode::Char('a') | KeyCode::Char('b') | KeyCode::Char('t')
            if state.view == ViewMode::BlindTest =>
        {
            let choice = match key.code {
                KeyCode::Char('a') => Choice::A,
                KeyCode::Char('b') => Choice::B,
                _ => Choice::Tie,
            };
            state.begin_submit(choice).map_or(KeyAction::Continue, KeyAction::Submit)
        }

        KeyCode::Char('r') => match state.load_state {
            LoadState::Failed(_) => KeyAction::Reload,
            LoadState::Loading => KeyAction::Continue,
            LoadState::Ready => state
                .engine
                .as_mut()
                .and_then(|engine| {
                    // Reopening replaces the current players, so bump the
                    // generation the same way navigation does.
                    engine.close();
                    engine.media_request()
                })
                .into(),
        },

        KeyCode::Char('?') => {
            state.help_scroll = 0;
            state.mode = Mode::HelpOverlay;
            KeyAction::Continue
        }

        KeyCode::Char('q') | KeyCode::Esc => KeyAction::Quit,

        _ => KeyAction::Continue,
    }
}

/// Digit entry for page jumps. Digits accumulate; Enter jumps, Esc and
/// Backspace edit. Returns `None` when the key is not part of a jump.
fn handle_jump_key(key: KeyEvent, state: &mut AppState) -> Option<KeyAction> {
    match key.code {
        KeyCode::Char(c) if c.is_ascii_digit() => {
            state.push_jump_digit(c);
            Some(KeyAction::Continue)
        }
        KeyCode::Enter if !state.jump_input.is_empty() => {
            let target = state.take_jump_target();
            Some(match target {
                Some(index) => state.navigate(|engine| engine.go_to(index)).into(),
                None => KeyAction::Continue,
            })
        }
        KeyCode::Backspace if !state.jump_input.is_empty() => {
            state.jump_input.pop();
            Some(KeyAction::Continue)
        }
        KeyCode::Esc if !state.jump_input.is_empty() => {
            state.jump_input.clear();
            Some(KeyAction::Continue)
        }
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// HelpOverlay mode
// ---------------------------------------------------------------------------

fn handle_help(key: KeyEvent, state: &mut AppState) -> KeyAction {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => {
            state.help_scroll = state.help_scroll.saturating_add(1);
            KeyAction::Continue
        }
        KeyCode::Char('k') | KeyCode::Up => {
            state.help_scroll = state.help_scroll.saturating_sub(1);
            KeyAction::Continue
        }
        KeyCode::Char('g') => {
            state.help_scroll = 0;
            KeyAction::Continue
        }
        KeyCode::Char('?') | KeyCode::Esc | KeyCode::Char('q') => {
            state.mode = Mode::Normal;
            KeyAction::Continue
        }
        _ => KeyAction::Continue,
    }
}

// ---------------------------------------------------------------------------
// Mouse events
// ---------------------------------------------------------------------------

/// Left click on a page cell jumps to it; the wheel steps through pairs (or
/// scrolls the help overlay when it is open).
pub fn handle_mouse(mouse: MouseEvent, state: &mut AppState) -> KeyAction {
    match (mouse.kind, state.mode) {
        (MouseEventKind::Down(MouseButton::Left), Mode::Normal) => {
            let pos = Position { x: mouse.column, y: mouse.row };
            let hit = state.page_hits.iter().find(|(rect, _)| rect.contains(pos)).map(|&(_, i)| i);
            match hit {
                Some(index) => state.navigate(|engine| engine.go_to(index)).into(),
                None => KeyAction::Continue,
            }
        }
        (MouseEventKind::ScrollUp, Mode::HelpOverlay) => {
            state.help_scroll = state.help_scroll.saturating_sub(3);
            KeyAction::Continue
        }
        (MouseEventKind::ScrollDown, Mode::HelpOverlay) => {
            state.help_scroll = state.help_scroll.saturating_add(3);
            KeyAction::Continue
        }
        (MouseEventKind::ScrollUp, Mode::Normal) => state.navigate(|engine| engine.previous()).into(),
        (MouseEventKind::ScrollDown, Mode::Normal) => state.navigate(|engine| engine.next()).into(),
        _ => KeyAction::Continue,
    }
}
