//! Page strip: one numbered cell per pair, colored by its choice category.
//!
//! Only a window around the current pair is drawn when the task has more
//! pages than fit. Cell rectangles are written back into `AppState.page_hits`
//! so mouse clicks can jump to a page.

use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
};

use abreview_core::choice::category_of;

use crate::app::AppState;
use crate::theme::Theme;
use crate::ui::layout::{inner_rect, panel_block};

pub fn render_strip(frame: &mut Frame, area: Rect, state: &mut AppState, theme: &Theme) {
    state.page_hits.clear();

    let title = match state.summary() {
        Some(summary) if summary.total > 0 => {
            let (folder_a, folder_b) = state
                .engine
                .as_ref()
                .map(|e| {
                    let folders = &e.header().folders;
                    (folders.folder_a.clone(), folders.folder_b.clone())
                })
                .unwrap_or_default();
            if state.is_blind() {
                format!(" Pairs · {:.1}% done ", summary.completion_rate)
            } else {
                format!(
                    " Pairs · {folder_a} {} · {folder_b} {} · tie {} · {:.1}% done ",
                    summary.a_wins, summary.b_wins, summary.ties, summary.completion_rate
                )
            }
        }
        _ => " Pairs ".to_owned(),
    };
    frame.render_widget(panel_block(Line::raw(title), None, theme), area);

    let inner = inner_rect(area);
    let Some(engine) = state.engine.as_ref() else {
        return;
    };
    let entries = engine.session().entries();
    if entries.is_empty() || inner.width == 0 {
        return;
    }
    let current = engine.session().current_index();

    let cell_width = cell_width(entries.len());
    let visible = (inner.width / cell_width).max(1) as usize;
    let start = window_start(current, entries.len(), visible);

    let mut spans = Vec::with_capacity(visible);
    let mut x = inner.x;
    for (index, entry) in entries.iter().enumerate().skip(start).take(visible) {
        let color = theme.category(category_of(&entry.pair, entry.evaluation.as_ref()));
        let style = if index == current {
            Style::default()
                .fg(theme.background)
                .bg(theme.current_page)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(color)
        };
        let label = format!("{:^width$}", index + 1, width = cell_width as usize);
        spans.push(Span::styled(label, style));
        state.page_hits.push((Rect::new(x, inner.y, cell_width, 1), index));
        x += cell_width;
    }

    frame.render_widget(Line::from(spans), inner);
}

/// Width of one page cell: the widest page number plus one space each side.
fn cell_width(pages: usize) -> u16 {
    pages.to_string().len() as u16 + 2
}

/// First page to draw so that `current` is visible and roughly centred.
fn window_start(current: usize, total: usize, visible: usize) -> usize {
    if total <= visible {
        return 0;
    }
    current.saturating_sub(visible / 2).min(total - visible)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_keeps_current_visible() {
        assert_eq!(window_start(0, 5, 10), 0);
        assert_eq!(window_start(0, 100, 10), 0);
        assert_eq!(window_start(50, 100, 10), 45);
        assert_eq!(window_start(99, 100, 10), 90);
        for current in 0..100 {
            let start = window_start(current, 100, 7);
            assert!(start <= current && current < start + 7);
        }
    }

    #[test]
    fn cells_fit_widest_number() {
        assert_eq!(cell_width(9), 3);
        assert_eq!(cell_width(10), 4);
        assert_eq!(cell_width(250), 5);
    }
}
