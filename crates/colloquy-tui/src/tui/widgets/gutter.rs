//! Role gutter drawn in front of the first line of every message.

use ratatui::text::Span;

use crate::tui::model::Role;
use crate::tui::theme::{Component, Theme};

/// Braille spinner shown while a message is in flight
pub const SPINNER_FRAMES: [char; 10] = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];

/// Frame for an animation tick, wrapping around the frame table
pub fn spinner_frame(tick: usize) -> char {
    SPINNER_FRAMES[tick % SPINNER_FRAMES.len()]
}

/// Glyph identifying who authored a message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleGlyph {
    User,
    Assistant,
}

impl From<Role> for RoleGlyph {
    fn from(role: Role) -> Self {
        match role {
            Role::User => RoleGlyph::User,
            Role::Assistant => RoleGlyph::Assistant,
        }
    }
}

impl RoleGlyph {
    fn symbol(self) -> char {
        match self {
            RoleGlyph::User => '▶',
            RoleGlyph::Assistant => '◀',
        }
    }

    fn component(self) -> Component {
        match self {
            RoleGlyph::User => Component::UserMessageRole,
            RoleGlyph::Assistant => Component::AssistantMessageRole,
        }
    }
}

/// Fixed-width gutter: a role glyph, or a spinner frame while in flight
#[derive(Debug, Clone, Copy)]
pub struct Gutter {
    role: RoleGlyph,
    spinner: Option<char>,
}

impl Gutter {
    /// Gutter width in columns, including the trailing pad
    pub const WIDTH: u16 = 2;

    pub fn new(role: RoleGlyph) -> Self {
        Self {
            role,
            spinner: None,
        }
    }

    pub fn with_spinner(mut self, frame: Option<char>) -> Self {
        self.spinner = frame;
        self
    }

    /// The gutter span for the first line of a message
    pub fn span(&self, theme: &Theme) -> Span<'static> {
        let glyph = self.spinner.unwrap_or_else(|| self.role.symbol());
        Span::styled(format!("{glyph} "), theme.style(self.role.component()))
    }

    /// The blank span aligning continuation lines under the content
    pub fn pad() -> Span<'static> {
        Span::raw(" ".repeat(Self::WIDTH as usize))
    }
}
