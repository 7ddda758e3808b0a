//! Status bar rendering with strategy, free space and keybindings

use crate::allocator::Strategy;
use crate::memory::format_size;
use crate::simulation::MemoryStats;
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

/// Data needed to render the status bar
pub struct StatusRenderData<'a> {
    pub message: &'a str,
    pub is_error: bool,
    pub strategy: Strategy,
    pub stats: &'a MemoryStats,
    pub is_input: bool,
}

/// Padded badge text for the active strategy
fn strategy_label(strategy: Strategy) -> String {
    match strategy {
        Strategy::Fixed => " STATIC ".to_string(),
        Strategy::Dynamic(opts) if opts.coalesce => format!(" DYNAMIC {} +coalesce ", opts.fit),
        Strategy::Dynamic(opts) => format!(" DYNAMIC {} ", opts.fit),
    }
}

/// Render the status bar at the bottom.
pub fn render_status_bar(frame: &mut Frame, area: Rect, data: StatusRenderData) {
    let layout = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    let bar_bg = Style::default().bg(DEFAULT_THEME.current_line_bg);
    let sep_style = bar_bg.fg(DEFAULT_THEME.comment);

    // Left side: strategy, free space and the last message
    let strategy_text = strategy_label(data.strategy);
    let free_text = format!(
        " {} free / {} ",
        format_size(data.stats.free),
        format_size(data.stats.usable)
    );
    let frag_text = if data.stats.internal_fragmentation > 0 {
        format!(" {} wasted ", format_size(data.stats.internal_fragmentation))
    } else {
        format!(
            " ext. frag {:.0}% ",
            data.stats.external_fragmentation * 100.0
        )
    };

    let left_spans = vec![
        Span::styled(
            strategy_text,
            Style::default()
                .bg(if data.is_input {
                    DEFAULT_THEME.secondary
                } else {
                    DEFAULT_THEME.primary
                })
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(free_text, bar_bg.fg(DEFAULT_THEME.success)),
        Span::styled("│", sep_style),
        Span::styled(frag_text, bar_bg.fg(DEFAULT_THEME.fg)),
        Span::styled("│", sep_style),
        Span::styled(
            format!(" {} ", data.message),
            bar_bg.fg(if data.is_error {
                DEFAULT_THEME.error
            } else {
                DEFAULT_THEME.fg
            }),
        ),
    ];

    frame.render_widget(
        Paragraph::new(Line::from(left_spans))
            .style(bar_bg)
            .alignment(Alignment::Left),
        layout[0],
    );

    // Right side: keybinds
    let key_style = Style::default().bg(DEFAULT_THEME.comment).fg(Color::Black);
    let desc_style = bar_bg.fg(DEFAULT_THEME.fg);

    let bindings: &[(&str, &str)] = if data.is_input {
        &[(" ↵ ", " add "), (" esc ", " cancel ")]
    } else {
        &[
            (" a ", " add "),
            (" ⎵ ", " alloc/free "),
            (" m ", " mode "),
            (" f ", " fit "),
            (" c ", " coalesce "),
            (" r ", " reset "),
            (" q ", " quit "),
        ]
    };

    let mut right_spans = Vec::with_capacity(bindings.len() * 3);
    for (i, (key, desc)) in bindings.iter().enumerate() {
        if i > 0 {
            right_spans.push(Span::styled("│", sep_style));
        }
        right_spans.push(Span::styled(*key, key_style));
        right_spans.push(Span::styled(*desc, desc_style));
    }

    frame.render_widget(
        Paragraph::new(Line::from(right_spans))
            .style(bar_bg)
            .alignment(Alignment::Right),
        layout[1],
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::allocator::{DynamicOptions, FitAlgorithm};

    #[test]
    fn test_strategy_label_spacing() {
        assert_eq!(strategy_label(Strategy::Fixed), " STATIC ");
        assert_eq!(
            strategy_label(Strategy::Dynamic(DynamicOptions {
                fit: FitAlgorithm::Best,
                coalesce: true,
            })),
            format!(" DYNAMIC {} +coalesce ", FitAlgorithm::Best)
        );

        let plain = strategy_label(Strategy::Dynamic(DynamicOptions {
            fit: FitAlgorithm::Worst,
            coalesce: false,
        }));
        assert_eq!(plain, format!(" DYNAMIC {} ", FitAlgorithm::Worst));
        assert!(!plain.contains("  "));
    }
}
