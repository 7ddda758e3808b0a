//! Process list and size input rendering

use super::pane_block;
use crate::memory::format_size;
use crate::simulation::ProcessView;
use crate::ui::theme::{process_color, DEFAULT_THEME};
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{List, ListItem, Paragraph},
    Frame,
};

/// Render the process registry with the selected row highlighted
pub fn render_process_pane(
    frame: &mut Frame,
    area: Rect,
    processes: &[ProcessView],
    selected: usize,
    is_focused: bool,
) {
    let block = pane_block(" Processes ", is_focused);

    if processes.is_empty() {
        let paragraph = Paragraph::new("(no processes, press 'a' to add one)")
            .block(block)
            .style(Style::default().fg(DEFAULT_THEME.comment));
        frame.render_widget(paragraph, area);
        return;
    }

    // Keep the selection in view
    let visible_height = area.height.saturating_sub(2).max(1) as usize;
    let first = selected.saturating_sub(visible_height.saturating_sub(1));

    let items: Vec<ListItem> = processes
        .iter()
        .enumerate()
        .skip(first)
        .take(visible_height)
        .map(|(i, process)| {
            let (status, status_color) = match process.backing {
                Some(backing) => (format!("{}", backing), DEFAULT_THEME.success),
                None => ("not allocated".to_string(), DEFAULT_THEME.comment),
            };
            let line = Line::from(vec![
                Span::styled(
                    format!("{:<5}", process.name),
                    Style::default()
                        .fg(process_color(process.id.0))
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(
                    format!("{:>10}  ", format_size(process.size)),
                    Style::default().fg(DEFAULT_THEME.primary),
                ),
                Span::styled(status, Style::default().fg(status_color)),
            ]);
            let style = if i == selected {
                Style::default().bg(DEFAULT_THEME.current_line_bg)
            } else {
                Style::default()
            };
            ListItem::new(line).style(style)
        })
        .collect();

    frame.render_widget(List::new(items).block(block), area);
}

/// Render the size entry box shown while adding a process
pub fn render_size_input(frame: &mut Frame, area: Rect, text: &str) {
    let block = pane_block(" New process size ", true);
    let line = Line::from(vec![
        Span::styled(text.to_string(), Style::default().fg(DEFAULT_THEME.fg)),
        Span::styled(
            "▏",
            Style::default()
                .fg(DEFAULT_THEME.secondary)
                .add_modifier(Modifier::SLOW_BLINK),
        ),
    ]);
    frame.render_widget(Paragraph::new(line).block(block), area);
}
