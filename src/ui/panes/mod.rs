//! TUI pane rendering modules
//!
//! # Pane Modules
//!
//! - [`memory`]: Memory map with a proportional usage bar and one row per region
//! - [`processes`]: Process registry with selection cursor and allocation state
//! - [`event_log`]: Event log fed by the in-memory logger
//! - [`status`]: Status bar with strategy, free space and keybindings
//!
//! Each pane module exports a primary `render_*` function that draws from
//! read-only simulation views and never mutates the simulation.

pub mod event_log;
pub mod memory;
pub mod processes;
pub mod status;

pub use event_log::render_log_pane;
pub use memory::render_memory_pane;
pub use processes::{render_process_pane, render_size_input};
pub use status::{render_status_bar, StatusRenderData};

use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    style::{Modifier, Style},
    widgets::{Block, Borders},
};

/// Bordered block with the focus highlight shared by all panes
fn pane_block(title: &str, is_focused: bool) -> Block<'_> {
    let border_style = if is_focused {
        Style::default()
            .fg(DEFAULT_THEME.border_focused)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(DEFAULT_THEME.border_normal)
    };

    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(border_style)
}

/// Clamp `offset` so a window of `visible` rows stays within `total` rows
fn clamp_scroll(offset: &mut usize, total: usize, visible: usize) {
    if total > visible {
        *offset = (*offset).min(total - visible);
    } else {
        *offset = 0;
    }
}
