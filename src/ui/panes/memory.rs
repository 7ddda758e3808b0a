//! Memory map pane rendering
//!
//! The top line is a bar spanning the whole simulated space, one cell per
//! `total / width` bytes: the reserved OS prefix, free regions and each
//! process in its own color. Below it every region is listed in address
//! order with its start, size and owner.

use super::{clamp_scroll, pane_block};
use crate::memory::{format_size, MemorySpace};
use crate::simulation::RegionView;
use crate::ui::theme::{process_color, DEFAULT_THEME};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{List, ListItem},
    Frame,
};

/// Render the memory map pane
pub fn render_memory_pane(
    frame: &mut Frame,
    area: Rect,
    regions: &[RegionView],
    space: &MemorySpace,
    is_focused: bool,
    scroll_offset: &mut usize,
) {
    let block = pane_block(" Memory Map ", is_focused);
    let content_width = area.width.saturating_sub(2) as usize; // borders

    let mut items = vec![
        ListItem::new(usage_bar(regions, space, content_width)),
        ListItem::new(""),
        ListItem::new(Line::from(Span::styled(
            format!("{:<12}{:>10}  {}", "Address", "Size", "Contents"),
            Style::default()
                .fg(DEFAULT_THEME.comment)
                .add_modifier(Modifier::BOLD),
        ))),
    ];
    let fixed_rows = items.len();

    let mut rows = Vec::with_capacity(regions.len() + 1);
    if space.reserved() > 0 {
        rows.push(region_row(
            0,
            space.reserved(),
            Span::styled("OS (reserved)", Style::default().fg(DEFAULT_THEME.comment)),
        ));
    }
    for region in regions {
        let contents = match (&region.owner, region.owner_id) {
            (Some(name), Some(id)) => Span::styled(
                name.clone(),
                Style::default()
                    .fg(process_color(id.0))
                    .add_modifier(Modifier::BOLD),
            ),
            _ => Span::styled("free", Style::default().fg(DEFAULT_THEME.success)),
        };
        rows.push(region_row(region.start, region.size, contents));
    }

    let visible_height = (area.height.saturating_sub(2) as usize)
        .saturating_sub(fixed_rows)
        .max(1);
    clamp_scroll(scroll_offset, rows.len(), visible_height);
    items.extend(rows.into_iter().skip(*scroll_offset).take(visible_height));

    frame.render_widget(List::new(items).block(block), area);
}

fn region_row(start: u64, size: u64, contents: Span<'static>) -> ListItem<'static> {
    ListItem::new(Line::from(vec![
        Span::styled(
            format!("0x{:08x}  ", start),
            Style::default().fg(DEFAULT_THEME.comment),
        ),
        Span::styled(
            format!("{:>10}  ", format_size(size)),
            Style::default().fg(DEFAULT_THEME.primary),
        ),
        contents,
    ]))
}

/// Color of the byte at `addr`
fn color_at(addr: u64, regions: &[RegionView], space: &MemorySpace) -> Color {
    if addr < space.reserved() {
        return DEFAULT_THEME.reserved;
    }
    let region = regions
        .iter()
        .find(|r| addr >= r.start && addr < r.start + r.size);
    match region.and_then(|r| r.owner_id) {
        Some(id) => process_color(id.0),
        None => DEFAULT_THEME.free,
    }
}

fn usage_bar(regions: &[RegionView], space: &MemorySpace, width: usize) -> Line<'static> {
    if width == 0 {
        return Line::default();
    }
    let total = space.total();
    let spans: Vec<Span> = (0..width as u64)
        .map(|col| {
            // Sample the middle of the cell
            let addr = (total * (2 * col + 1)) / (2 * width as u64);
            Span::styled("█", Style::default().fg(color_at(addr, regions, space)))
        })
        .collect();
    Line::from(spans)
}
