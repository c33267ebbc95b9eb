//! Terminal rendering for chat conversations.
//!
//! The embedding application owns the event loop and the message store; this
//! module turns one [`model::Message`] at a time into themed [`ratatui`]
//! lines. [`streaming::StreamTracker`] classifies each message's display
//! state, [`theme`] resolves semantic tokens to terminal styles, and
//! [`widgets`] holds the renderable widgets.

pub mod model;
pub mod streaming;
pub mod theme;
pub mod widgets;

pub use model::{Message, Role};
pub use streaming::{DisplayState, StreamTracker};
pub use theme::{ColorMode, Component, Theme, ThemeLoader};
pub use widgets::{ChatRenderable, MessageWidget};
