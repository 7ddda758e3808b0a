//! Event log pane rendering

use super::{clamp_scroll, pane_block};
use crate::ui::logger::LogLine;
use crate::ui::theme::DEFAULT_THEME;
use log::Level;
use ratatui::{
    layout::Rect,
    style::Style,
    widgets::{List, ListItem, Padding, Paragraph},
    Frame,
};

/// Render the event log pane
pub fn render_log_pane(
    frame: &mut Frame,
    area: Rect,
    lines: &[LogLine],
    is_focused: bool,
    scroll_offset: &mut usize,
) {
    let block = pane_block(" Event Log ", is_focused);

    if lines.is_empty() {
        let paragraph = Paragraph::new("(no events)")
            .block(block)
            .style(Style::default().fg(DEFAULT_THEME.comment));
        frame.render_widget(paragraph, area);
        return;
    }

    let block = block.padding(Padding::new(1, 0, 0, 0));
    let visible_height = area.height.saturating_sub(2).max(1) as usize; // Account for borders, min 1
    clamp_scroll(scroll_offset, lines.len(), visible_height);

    let items: Vec<ListItem> = lines
        .iter()
        .skip(*scroll_offset)
        .take(visible_height)
        .map(|line| {
            let color = match line.level {
                Level::Error => DEFAULT_THEME.error,
                Level::Warn => DEFAULT_THEME.warning,
                Level::Info => DEFAULT_THEME.fg,
                Level::Debug | Level::Trace => DEFAULT_THEME.comment,
            };
            ListItem::new(line.text.as_str()).style(Style::default().fg(color))
        })
        .collect();

    frame.render_widget(List::new(items).block(block), area);
}
