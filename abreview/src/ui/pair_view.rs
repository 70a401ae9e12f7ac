//! Side panels, header and choice line for the pair on screen.

use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Paragraph, Wrap},
};

use abreview_core::choice::ChoiceCategory;
use abreview_core::types::Side;

use crate::app::{AppState, ViewMode};
use crate::theme::Theme;
use crate::ui::layout::{inner_rect, panel_block};

/// Task title, progress and the prompt derived from the filename.
pub fn render_header(frame: &mut Frame, area: Rect, state: &AppState, theme: &Theme) {
    let block = Block::bordered().border_style(Style::default().fg(theme.border_active));
    let Some(engine) = state.engine.as_ref() else {
        let title = format!("Task {}", state.task_id);
        frame.render_widget(Paragraph::new(title).block(block), area);
        return;
    };

    let header = engine.header();
    let session = engine.session();
    let position = if session.is_empty() {
        "no pairs".to_owned()
    } else {
        format!("Pair {} / {}", session.current_index() + 1, session.len())
    };
    let badge = match (state.view, state.is_blind()) {
        (ViewMode::Review, _) => "results",
        (ViewMode::BlindTest, true) => "blind test",
        (ViewMode::BlindTest, false) => "non-blind test",
    };
    let title_line = Line::from(vec![
        Span::styled(header.task_name.clone(), Style::default().add_modifier(Modifier::BOLD)),
        Span::styled(format!("  [{badge}]"), Style::default().fg(theme.muted)),
        Span::raw(format!("  {position}")),
    ]);
    let prompt_line = match engine.prompt() {
        Some(prompt) => Line::from(vec![
            Span::styled("Prompt: ", Style::default().fg(theme.muted)),
            Span::raw(prompt),
        ]),
        None => Line::raw(""),
    };

    frame.render_widget(
        Paragraph::new(Text::from(vec![title_line, prompt_line])).block(block),
        area,
    );
}

/// One side of the comparison: folder label, filename and player state.
///
/// In review mode the chosen side gets a thick border in its category color.
pub fn render_side(frame: &mut Frame, area: Rect, side: Side, state: &AppState, theme: &Theme) {
    let engine = state.engine.as_ref();
    let entry = engine.and_then(|e| e.current());

    let accent = engine
        .and_then(|e| e.display())
        .and_then(|display| match (display.category, side) {
            (ChoiceCategory::LeftChosen, Side::Left) => Some(theme.left_chosen),
            (ChoiceCategory::RightChosen, Side::Right) => Some(theme.right_chosen),
            _ => None,
        });

    let title = match (state.view, entry) {
        (ViewMode::BlindTest, _) => {
            let letter = if side == Side::Left { "A" } else { "B" };
            format!(" Video {letter} ")
        }
        (ViewMode::Review, Some(entry)) => format!(" {side} · {} ", entry.pair.folder_on(side)),
        (ViewMode::Review, None) => format!(" {side} "),
    };
    let block = panel_block(Line::raw(title), accent, theme);
    let inner = inner_rect(area);
    frame.render_widget(block, area);

    let Some(entry) = entry else {
        return;
    };
    let mut lines = Vec::new();
    if !state.is_blind() {
        lines.push(Line::styled(
            entry.pair.name_on(side).to_owned(),
            Style::default().fg(theme.folder_label).add_modifier(Modifier::BOLD),
        ));
    }

    let url = engine
        .and_then(|e| e.media_request())
        .and_then(|request| match side {
            Side::Left => request.left_url,
            Side::Right => request.right_url,
        });
    let attached = engine.is_some_and(|e| e.sync().element(side).is_some());
    let player_line = match (&url, attached, state.players_enabled) {
        (None, _, _) => Line::styled("No media for this side", Style::default().fg(theme.error)),
        (Some(_), true, _) => Line::raw("▶ playing in mpv"),
        (Some(_), false, true) => Line::styled("opening player…", Style::default().fg(theme.muted)),
        (Some(_), false, false) => {
            Line::styled("player disabled; open the URL below", Style::default().fg(theme.muted))
        }
    };
    lines.push(player_line);
    if let Some(url) = url {
        lines.push(Line::raw(""));
        lines.push(Line::styled(url, Style::default().fg(theme.muted)));
    }

    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
}

/// The choice line (review) or the submission prompt (blind test).
pub fn render_choice(frame: &mut Frame, area: Rect, state: &AppState, theme: &Theme) {
    let Some(engine) = state.engine.as_ref() else {
        frame.render_widget(panel_block(Line::raw(" Choice "), None, theme), area);
        return;
    };

    let (title, line) = match state.view {
        ViewMode::Review => {
            let line = match engine.display() {
                Some(display) => Line::styled(
                    display.label.clone(),
                    Style::default()
                        .fg(theme.category(display.category))
                        .add_modifier(Modifier::BOLD),
                ),
                None => Line::raw("No pairs in this task."),
            };
            (" Choice ", line)
        }
        ViewMode::BlindTest => (" Which video is better? ", submit_line(state, theme)),
    };

    let block = panel_block(Line::raw(title), None, theme);
    frame.render_widget(Paragraph::new(line).block(block), area);
}

fn submit_line(state: &AppState, theme: &Theme) -> Line<'static> {
    if let Some(error) = &state.submit_error {
        return Line::styled(format!("Submit failed: {error}  (press again to retry)"), Style::default().fg(theme.error));
    }
    if state.completed {
        return Line::styled("All pairs evaluated. Press q to quit.", Style::default().fg(theme.tie));
    }
    if state.is_submitting() {
        return Line::styled("Submitting…", Style::default().fg(theme.muted));
    }
    let current = state.engine.as_ref().and_then(|e| e.display()).map(|d| d.category);
    let recorded = match current {
        Some(ChoiceCategory::Unevaluated) | None => String::new(),
        Some(_) => "  (already answered)".to_owned(),
    };
    Line::from(vec![
        Span::styled("a", Style::default().fg(theme.left_chosen).add_modifier(Modifier::BOLD)),
        Span::raw(" A is better   "),
        Span::styled("t", Style::default().fg(theme.tie).add_modifier(Modifier::BOLD)),
        Span::raw(" about the same   "),
        Span::styled("b", Style::default().fg(theme.right_chosen).add_modifier(Modifier::BOLD)),
        Span::raw(" B is better"),
        Span::styled(recorded, Style::default().fg(theme.muted)),
    ])
}
