//! Help overlay renderer for abreview.
//!
//! Draws a centred modal over the comparison view. `Clear` erases the
//! background first so the overlay lives in the same `terminal.draw()` closure
//! as every other widget.

use ratatui::{
    Frame,
    layout::Constraint,
    text::{Line, Text},
    widgets::{Block, Clear, Paragraph, Wrap},
};

use crate::app::ViewMode;
use crate::theme::Theme;

/// Renders the help overlay, scrolled by `help_scroll` rows.
///
/// Skipped on terminals narrower than 60 columns to avoid a zero-height area.
pub fn render_help_overlay(frame: &mut Frame, theme: &Theme, view: ViewMode, help_scroll: u16) {
    if frame.area().width < 60 {
        return;
    }

    let overlay_area = frame
        .area()
        .centered(Constraint::Percentage(80), Constraint::Percentage(80));

    frame.render_widget(Clear, overlay_area);

    let block = Block::bordered()
        .title(" Help · j/k scroll, ? or Esc to dismiss ")
        .border_style(ratatui::style::Style::default().fg(theme.border_active));

    frame.render_widget(
        Paragraph::new(build_help_text(view))
            .block(block)
            .wrap(Wrap { trim: false })
            .scroll((help_scroll, 0)),
        overlay_area,
    );
}

fn build_help_text(view: ViewMode) -> Text<'static> {
    let mut lines = vec![
        Line::from("Navigation"),
        Line::from("  l / → / n     Next pair"),
        Line::from("  h / ← / p     Previous pair"),
        Line::from("  g / G         First / last pair"),
        Line::from("  1-9 … Enter   Jump to page number"),
        Line::from("  click a page  Jump to that pair"),
        Line::from("  scroll wheel  Previous / next pair"),
        Line::from(""),
        Line::from("Playback"),
        Line::from("  Both players loop and stay within 0.2 s of each other."),
        Line::from("  r             Reopen players (or retry a failed load)"),
        Line::from(""),
    ];
    if view == ViewMode::BlindTest {
        lines.extend([
            Line::from("Evaluation"),
            Line::from("  a             A is better"),
            Line::from("  b             B is better"),
            Line::from("  t             About the same"),
            Line::from("  Answering moves on to the next pair."),
            Line::from(""),
        ]);
    } else {
        lines.extend([
            Line::from("Choice line"),
            Line::from("  Left / Right (folder)   side that was picked, as it was shown"),
            Line::from("  Tie / about the same    no preference"),
            Line::from("  Not evaluated.          no answer recorded yet"),
            Line::from(""),
        ]);
    }
    lines.extend([
        Line::from("General"),
        Line::from("  j / k         Scroll this help overlay"),
        Line::from("  ?             Open / close this help overlay"),
        Line::from("  q / Esc       Quit"),
    ]);
    Text::from(lines)
}
