//! Chat rendering widgets.

pub mod chat_widget;
pub mod gutter;
pub mod helpers;
pub mod markdown;
pub mod message;

pub use chat_widget::{ChatRenderable, RenderCache, RenderKey};
pub use gutter::{Gutter, RoleGlyph, SPINNER_FRAMES, spinner_frame};
pub use message::MessageWidget;
