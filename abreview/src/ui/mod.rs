//! UI rendering module for abreview.
//!
//! `render()` is the single entry point called by the event loop's
//! `terminal.draw()` closure. Layout arithmetic lives in `layout.rs`, the pair
//! panels in `pair_view.rs` and the page strip in `pair_strip.rs`.

mod layout;
pub mod help;
pub mod keybindings;
pub mod pair_strip;
pub mod pair_view;

use ratatui::{
    Frame,
    layout::Rect,
    style::Style,
    text::{Line, Text},
    widgets::{Block, Paragraph, Wrap},
};

use abreview_core::types::Side;

use crate::app::{AppState, LoadState, Mode};
use crate::theme::Theme;
use layout::{compute_layout, render_status_bar};

/// Renders one complete frame.
///
/// Called exactly once per `AppEvent::Render`. Takes `&mut AppState` so the
/// page strip can cache its hit boxes for the next mouse click.
pub fn render(frame: &mut Frame, state: &mut AppState, theme: &Theme) {
    frame.render_widget(Block::default().style(Style::default().bg(theme.background)), frame.area());

    let [header, left, right, choice, strip, status_bar] = compute_layout(frame);

    pair_view::render_header(frame, header, state, theme);

    match state.load_state.clone() {
        LoadState::Ready => {
            pair_view::render_side(frame, left, Side::Left, state, theme);
            pair_view::render_side(frame, right, Side::Right, state, theme);
            pair_view::render_choice(frame, choice, state, theme);
            pair_strip::render_strip(frame, strip, state, theme);
        }
        LoadState::Loading => {
            render_message(frame, left.union(right), "Loading task…", theme.border_inactive);
        }
        LoadState::Failed(reason) => {
            let text = format!("Could not load task {}:\n{reason}\n\nr retry · q quit", state.task_id);
            render_message(frame, left.union(right), &text, theme.error);
        }
    }

    render_status_bar(frame, status_bar, state, theme);

    if state.mode == Mode::HelpOverlay {
        help::render_help_overlay(frame, theme, state.view, state.help_scroll);
    }
}

fn render_message(frame: &mut Frame, area: Rect, message: &str, color: ratatui::style::Color) {
    let text = Text::from(message.lines().map(|l| Line::raw(l.to_owned())).collect::<Vec<_>>());
    frame.render_widget(
        Paragraph::new(text)
            .style(Style::default().fg(color))
            .wrap(Wrap { trim: false })
            .block(Block::bordered().border_style(Style::default().fg(color))),
        area,
    );
}
