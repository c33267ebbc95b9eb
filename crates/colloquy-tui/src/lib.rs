//! Chat message rendering for terminal UIs: Markdown to styled lines,
//! display-state inference for streamed content, and light/dark theming.

pub mod error;
pub mod tui;

pub use error::{Error, Result};

// Expose the commonly used types at the crate root
pub use tui::model::{Message, Role};
pub use tui::streaming::{DisplayState, StreamTracker};
pub use tui::theme::{ColorMode, Component, Theme, ThemeLoader};
pub use tui::widgets::{ChatRenderable, MessageWidget};
