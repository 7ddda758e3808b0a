//! Terminal user interface built on [ratatui](https://github.com/ratatui-org/ratatui).
//!
//! The UI is the presentation and input layer of the simulator:
//!
//! - **[`app`]**: application state, keyboard event loop, pane focus, size input mode
//! - **[`panes`]**: stateless render functions for each visible pane (memory map,
//!   processes, event log, status bar)
//! - **[`logger`]**: `log` backend that buffers records for the event log pane
//! - **[`theme`]**: centralized color palette used by all panes
//!
//! The entry point for consumers is [`App`]: construct it with a [`Simulation`] and
//! call [`App::run`] to start the event loop.
//!
//! [`Simulation`]: crate::simulation::Simulation
//! [`App::run`]: app::App::run

pub mod app;
pub mod logger;
pub mod panes;
pub mod theme;

pub use app::App;
