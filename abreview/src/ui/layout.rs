//! Responsive layout for the comparison view.
//!
//! Pure layout arithmetic; no mutable application state lives here. It runs
//! inside `terminal.draw()` on every render so each frame reflects the current
//! terminal size.
//!
//! # Geometry
//!
//! At `>= 80` columns the two sides sit next to each other. Below that they
//! stack vertically. `Spacing::Overlap(1)` with
//! `Block::merge_borders(MergeStrategy::Fuzzy)` lets adjacent panels share a
//! border column and merge their junction characters.

use ratatui::{
    Frame,
    layout::{Constraint, Layout, Margin, Rect, Spacing},
    style::{Modifier, Style},
    symbols::merge::MergeStrategy,
    text::{Line, Span},
    widgets::{Block, BorderType, Paragraph},
};

use crate::app::{AppState, LoadState, Mode, ViewMode};
use crate::theme::Theme;

/// Terminal width below which the two sides are stacked.
const SIDE_BY_SIDE_MIN_WIDTH: u16 = 80;

/// Returns `[header, left, right, choice, strip, status_bar]` for the current frame.
pub fn compute_layout(frame: &Frame) -> [Rect; 6] {
    let area = frame.area();
    let [header, main, choice, strip, status_bar] = area.layout(&Layout::vertical([
        Constraint::Length(4),
        Constraint::Fill(1),
        Constraint::Length(3),
        Constraint::Length(3),
        Constraint::Length(1),
    ]));

    let sides = if area.width >= SIDE_BY_SIDE_MIN_WIDTH {
        Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)])
    } else {
        Layout::vertical([Constraint::Fill(1), Constraint::Fill(1)])
    };
    let [left, right] = main.layout(&sides.spacing(Spacing::Overlap(1)));

    [header, left, right, choice, strip, status_bar]
}

/// Inner `Rect` of a panel after removing the 1-cell border.
pub fn inner_rect(area: Rect) -> Rect {
    area.inner(Margin { vertical: 1, horizontal: 1 })
}

/// Bordered panel block. Highlighted panels get a thick border in `accent`.
pub fn panel_block<'a>(title: Line<'a>, accent: Option<ratatui::style::Color>, theme: &Theme) -> Block<'a> {
    let (border_type, color) = match accent {
        Some(color) => (BorderType::Thick, color),
        None => (BorderType::Plain, theme.border_inactive),
    };
    Block::bordered()
        .title(title)
        .border_type(border_type)
        .border_style(Style::default().fg(color))
        .merge_borders(MergeStrategy::Fuzzy)
}

/// Renders the 1-row status bar: mode badge, load state and the latest
/// status message or key hints.
pub fn render_status_bar(frame: &mut Frame, area: Rect, state: &AppState, theme: &Theme) {
    let (mode_text, mode_fg) = match state.view {
        ViewMode::Review => (" REVIEW ", theme.status_mode_normal),
        ViewMode::BlindTest => (" TEST ", theme.status_mode_test),
    };
    let mut spans = vec![Span::styled(
        mode_text,
        Style::default().fg(mode_fg).add_modifier(Modifier::BOLD),
    )];

    let detail = match (&state.load_state, state.status()) {
        (LoadState::Loading, _) => "loading…".to_owned(),
        (LoadState::Failed(_), _) => "load failed: r retry, q quit".to_owned(),
        (LoadState::Ready, Some(message)) => message.to_owned(),
        (LoadState::Ready, None) if !state.jump_input.is_empty() => {
            format!("go to page {}_  (Enter to jump, Esc to cancel)", state.jump_input)
        }
        (LoadState::Ready, None) => key_hints(state).to_owned(),
    };
    spans.push(Span::raw(format!(" {detail}")));

    if state.mode == Mode::HelpOverlay {
        spans.push(Span::styled("  [help]", Style::default().fg(theme.muted)));
    }

    frame.render_widget(
        Paragraph::new(Line::from(spans))
            .style(Style::default().bg(theme.status_bar_bg).fg(theme.status_bar_fg)),
        area,
    );
}

fn key_hints(state: &AppState) -> &'static str {
    match state.view {
        ViewMode::Review => "h/l prev/next  g/G first/last  1-9 jump  ? help  q quit",
        ViewMode::BlindTest => "a/b choose  t tie  h previous  ? help  q quit",
    }
}
