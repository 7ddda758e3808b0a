//! Main TUI application state and logic

use super::logger::EventLogger;
use super::panes::{
    render_log_pane, render_memory_pane, render_process_pane, render_size_input, render_status_bar,
    StatusRenderData,
};
use crate::allocator::{DynamicOptions, Mode};
use crate::memory::units::parse_size;
use crate::memory::format_size;
use crate::simulation::Simulation;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout},
    Frame, Terminal,
};
use std::io;
use std::time::Duration;

/// Which pane is currently focused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusedPane {
    Memory,
    Processes,
    Log,
}

impl FocusedPane {
    /// Move focus to the next pane (memory -> processes -> log)
    pub fn next(self) -> Self {
        match self {
            FocusedPane::Memory => FocusedPane::Processes,
            FocusedPane::Processes => FocusedPane::Log,
            FocusedPane::Log => FocusedPane::Memory,
        }
    }
}

/// The main application state
pub struct App {
    /// The simulation being driven
    pub simulation: Simulation,

    /// Currently focused pane
    pub focused_pane: FocusedPane,

    /// Index of the selected process in the registry
    pub selected: usize,

    /// Per-pane scroll offsets
    pub memory_scroll: usize,
    pub log_scroll: usize,

    /// Text typed so far while entering a process size (None = not entering)
    pub size_input: Option<String>,

    /// Whether the app should quit
    pub should_quit: bool,

    /// Status message to display
    pub status_message: String,

    /// Whether the status message reports a failure
    pub status_is_error: bool,
}

impl App {
    /// Create a new app driving the given simulation
    pub fn new(simulation: Simulation) -> Self {
        App {
            simulation,
            focused_pane: FocusedPane::Processes,
            selected: 0,
            memory_scroll: 0,
            log_scroll: usize::MAX, // Follow the newest entries
            size_input: None,
            should_quit: false,
            status_message: String::from("Ready! Press 'a' to add a process."),
            status_is_error: false,
        }
    }

    /// Run the TUI application
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        loop {
            terminal.draw(|f| self.render(f))?;

            if self.should_quit {
                break;
            }

            if event::poll(Duration::from_millis(100))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key_event(key);
                    }
                }
            }
        }

        Ok(())
    }

    /// Render the UI
    fn render(&mut self, frame: &mut Frame) {
        let size = frame.area();

        // Panes on top, status bar at the bottom
        let main_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(1)])
            .split(size);

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(main_chunks[0]);

        // Left column: Memory map (top) | Event log (bottom)
        let left_rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(70), Constraint::Percentage(30)])
            .split(columns[0]);

        // Right column: Processes (top) | Size input (bottom, while entering)
        let input_height = if self.size_input.is_some() { 3 } else { 0 };
        let right_rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(input_height)])
            .split(columns[1]);

        let regions = self.simulation.regions();
        let processes = self.simulation.processes();
        let stats = self.simulation.stats();

        render_memory_pane(
            frame,
            left_rows[0],
            &regions,
            self.simulation.memory_space(),
            self.focused_pane == FocusedPane::Memory,
            &mut self.memory_scroll,
        );

        render_log_pane(
            frame,
            left_rows[1],
            &EventLogger::lines(),
            self.focused_pane == FocusedPane::Log,
            &mut self.log_scroll,
        );

        render_process_pane(
            frame,
            right_rows[0],
            &processes,
            self.selected,
            self.focused_pane == FocusedPane::Processes,
        );

        if let Some(text) = &self.size_input {
            render_size_input(frame, right_rows[1], text);
        }

        render_status_bar(
            frame,
            main_chunks[1],
            StatusRenderData {
                message: &self.status_message,
                is_error: self.status_is_error,
                strategy: self.simulation.strategy(),
                stats: &stats,
                is_input: self.size_input.is_some(),
            },
        );
    }

    /// Handle keyboard events
    fn handle_key_event(&mut self, key: KeyEvent) {
        if self.size_input.is_some() {
            self.handle_input_key(key);
            return;
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') => {
                self.should_quit = true;
            }
            KeyCode::Char('a') => {
                self.size_input = Some(String::new());
                self.set_status("Enter a size such as 512KB or 1.5MB, Esc to cancel");
            }
            KeyCode::Char(' ') | KeyCode::Enter => self.toggle_selected(),
            KeyCode::Char('d') => self.deallocate_selected(),
            KeyCode::Char('m') => {
                let mode = self.simulation.mode().toggled();
                match self.simulation.set_mode(mode) {
                    Ok(()) => self.set_status(&format!("Switched to {} partitioning", mode)),
                    Err(e) => self.set_error(&e.to_string()),
                }
            }
            KeyCode::Char('f') => {
                let current = self.simulation.dynamic_options();
                self.change_dynamic_options(DynamicOptions {
                    fit: current.fit.next(),
                    ..current
                });
            }
            KeyCode::Char('c') => {
                let current = self.simulation.dynamic_options();
                self.change_dynamic_options(DynamicOptions {
                    coalesce: !current.coalesce,
                    ..current
                });
            }
            KeyCode::Char('r') => match self.simulation.reset() {
                Ok(()) => self.set_status("Memory reset"),
                Err(e) => self.set_error(&e.to_string()),
            },
            KeyCode::Tab => {
                self.focused_pane = self.focused_pane.next();
            }
            KeyCode::Up => match self.focused_pane {
                FocusedPane::Memory => {
                    self.memory_scroll = self.memory_scroll.saturating_sub(1);
                }
                FocusedPane::Processes => {
                    self.selected = self.selected.saturating_sub(1);
                }
                FocusedPane::Log => {
                    self.log_scroll = self.log_scroll.saturating_sub(1);
                }
            },
            KeyCode::Down => match self.focused_pane {
                FocusedPane::Memory => {
                    self.memory_scroll = self.memory_scroll.saturating_add(1);
                }
                FocusedPane::Processes => {
                    let count = self.simulation.process_ids().len();
                    if self.selected + 1 < count {
                        self.selected += 1;
                    }
                }
                FocusedPane::Log => {
                    self.log_scroll = self.log_scroll.saturating_add(1);
                }
            },
            _ => {}
        }
    }

    /// Handle keys while typing a process size
    fn handle_input_key(&mut self, key: KeyEvent) {
        let Some(text) = self.size_input.as_mut() else {
            return;
        };
        match key.code {
            KeyCode::Esc => {
                self.size_input = None;
                self.set_status("Cancelled");
            }
            KeyCode::Backspace => {
                text.pop();
            }
            KeyCode::Char(c) if text.len() < 24 => {
                text.push(c);
            }
            KeyCode::Enter => {
                let text = std::mem::take(text);
                self.size_input = None;
                self.submit_size(&text);
            }
            _ => {}
        }
    }

    /// Parse a typed size and register the process
    fn submit_size(&mut self, text: &str) {
        let result = parse_size(text).and_then(|bytes| self.simulation.add_process(bytes as f64));
        match result {
            Ok(id) => {
                let ids = self.simulation.process_ids();
                self.selected = ids.iter().position(|&p| p == id).unwrap_or(0);
                if let Some(process) = self.simulation.process(id) {
                    self.set_status(&format!(
                        "Created {} ({}). Space allocates it.",
                        process.name,
                        format_size(process.size)
                    ));
                }
                self.log_scroll = usize::MAX;
            }
            Err(e) => self.set_error(&e.to_string()),
        }
    }

    fn toggle_selected(&mut self) {
        let Some(&id) = self.simulation.process_ids().get(self.selected) else {
            self.set_status("No process selected");
            return;
        };
        match self.simulation.toggle_allocation(id) {
            Ok(()) => {
                if let Some(process) = self.simulation.process(id) {
                    let verb = if process.allocated { "Allocated" } else { "Deallocated" };
                    self.set_status(&format!("{} {}", verb, process.name));
                }
            }
            Err(e) => self.set_error(&e.to_string()),
        }
        self.log_scroll = usize::MAX;
    }

    fn deallocate_selected(&mut self) {
        let Some(&id) = self.simulation.process_ids().get(self.selected) else {
            self.set_status("No process selected");
            return;
        };
        if self.simulation.deallocate(id) {
            self.set_status("Deallocated");
        } else {
            self.set_status("Process is not allocated");
        }
        self.log_scroll = usize::MAX;
    }

    fn change_dynamic_options(&mut self, options: DynamicOptions) {
        match self.simulation.set_dynamic_options(options.fit, options.coalesce) {
            Ok(()) => {
                let note = if self.simulation.mode() == Mode::Static {
                    " (applies in dynamic mode)"
                } else {
                    ""
                };
                self.set_status(&format!(
                    "Memory reset: {}, coalescing {}{}",
                    options.fit,
                    if options.coalesce { "on" } else { "off" },
                    note
                ));
            }
            Err(e) => self.set_error(&e.to_string()),
        }
    }

    fn set_status(&mut self, message: &str) {
        self.status_message = message.to_string();
        self.status_is_error = false;
    }

    fn set_error(&mut self, message: &str) {
        self.status_message = message.to_string();
        self.status_is_error = true;
    }
}
