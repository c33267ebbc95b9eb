//! Rendering contract shared by everything that appears in the chat area.

use ratatui::text::Line;

use crate::tui::streaming::DisplayState;
use crate::tui::theme::Theme;

/// Anything that can render itself as chat lines at a given width.
///
/// Implementations cache internally; calling [`lines`](ChatRenderable::lines)
/// twice with the same inputs must be cheap and return identical output.
pub trait ChatRenderable: Send + Sync {
    /// Render (or return cached) lines for the given width, display state,
    /// and theme. Lines are pre-wrapped to `width`.
    fn lines(&mut self, width: u16, state: DisplayState, theme: &Theme) -> &[Line<'static>];

    fn height(&mut self, width: u16, state: DisplayState, theme: &Theme) -> u16 {
        self.lines(width, state, theme).len() as u16
    }
}

/// Cache key for rendered lines. Rendering is pure in these inputs, so a
/// matching key means the cached lines are still valid.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RenderKey {
    pub width: u16,
    pub state: Option<DisplayState>,
    pub theme_name: String,
    pub content_hash: u64,
    pub spinner_frame: Option<char>,
}

/// Cached render output, invalidated whenever the key changes
#[derive(Debug, Default)]
pub struct RenderCache {
    key: RenderKey,
    lines: Option<Vec<Line<'static>>>,
}

impl RenderCache {
    pub fn get(&self, key: &RenderKey) -> Option<&[Line<'static>]> {
        if self.key == *key {
            self.lines.as_deref()
        } else {
            None
        }
    }

    pub fn store(&mut self, key: RenderKey, lines: Vec<Line<'static>>) -> &[Line<'static>] {
        self.key = key;
        self.lines.insert(lines).as_slice()
    }

    pub fn invalidate(&mut self) {
        self.lines = None;
    }
}
