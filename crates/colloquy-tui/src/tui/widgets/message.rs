//! A single chat message rendered as styled lines.
//!
//! The widget owns a render cache keyed by width, display state, theme, and
//! message content; re-rendering with unchanged inputs returns the cached
//! lines without touching the Markdown pipeline.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use ratatui::text::{Line, Span};
use time::macros::format_description;
use unicode_width::UnicodeWidthStr;

use super::chat_widget::{ChatRenderable, RenderCache, RenderKey};
use super::gutter::{Gutter, RoleGlyph};
use super::helpers::style_wrap_with_indent;
use super::markdown::{self, MarkdownStyles};
use crate::tui::model::Message;
use crate::tui::streaming::DisplayState;
use crate::tui::theme::{Component, Theme};

/// Glyph appended after the last content line while streaming
pub const STREAM_CURSOR: &str = "▌";

const THINKING_LABEL: &str = "Thinking…";

pub struct MessageWidget {
    message: Message,
    spinner_frame: Option<char>,
    cache: RenderCache,
}

impl MessageWidget {
    pub fn new(message: Message) -> Self {
        Self {
            message,
            spinner_frame: None,
            cache: RenderCache::default(),
        }
    }

    pub fn message(&self) -> &Message {
        &self.message
    }

    /// Replace the message. The cache key hashes the content, so a changed
    /// message invalidates naturally on the next render.
    pub fn set_message(&mut self, message: Message) {
        self.message = message;
    }

    /// Current spinner frame for in-flight states; `None` hides the spinner.
    pub fn set_spinner_frame(&mut self, frame: Option<char>) {
        self.spinner_frame = frame;
    }

    fn render_key(&self, width: u16, state: DisplayState, theme: &Theme) -> RenderKey {
        let spinner_frame = match state {
            DisplayState::Settled => None,
            DisplayState::Thinking | DisplayState::Streaming => self.spinner_frame,
        };
        RenderKey {
            width,
            state: Some(state),
            theme_name: theme.name.clone(),
            content_hash: content_hash(&self.message),
            spinner_frame,
        }
    }

    fn render(&self, width: u16, state: DisplayState, theme: &Theme) -> Vec<Line<'static>> {
        let content_width = width.saturating_sub(Gutter::WIDTH).max(1);

        let mut body = match state {
            DisplayState::Thinking => vec![Line::from(Span::styled(
                THINKING_LABEL,
                theme.style(Component::ThinkingIndicator),
            ))],
            DisplayState::Streaming | DisplayState::Settled => {
                self.render_markdown(content_width, theme)
            }
        };
        if body.is_empty() {
            body.push(Line::default());
        }

        if state == DisplayState::Streaming {
            if let Some(last) = body.last_mut() {
                last.push_span(Span::styled(
                    STREAM_CURSOR,
                    theme.style(Component::StreamCursor),
                ));
            }
        }

        let spinner = match state {
            DisplayState::Settled => None,
            DisplayState::Thinking | DisplayState::Streaming => self.spinner_frame,
        };
        let gutter = Gutter::new(RoleGlyph::from(self.message.role)).with_spinner(spinner);

        let mut lines = Vec::with_capacity(body.len() + 1);
        for (idx, mut line) in body.into_iter().enumerate() {
            let prefix = if idx == 0 {
                gutter.span(theme)
            } else {
                Gutter::pad()
            };
            line.spans.insert(0, prefix);
            lines.push(line);
        }
        lines.push(self.timestamp_line(width, theme));
        lines
    }

    fn render_markdown(&self, content_width: u16, theme: &Theme) -> Vec<Line<'static>> {
        let styles = MarkdownStyles::from_theme(theme);
        let rendered = markdown::render_with_width(
            &self.message.content,
            &styles,
            theme,
            Some(content_width),
        );

        let mut lines = Vec::with_capacity(rendered.lines.len());
        for rendered_line in rendered.lines {
            if rendered_line.no_wrap {
                lines.push(rendered_line.line);
            } else {
                lines.extend(style_wrap_with_indent(
                    rendered_line.line,
                    content_width,
                    rendered_line.indent,
                ));
            }
        }
        lines
    }

    /// Right-aligned HH:MM line closing the message
    fn timestamp_line(&self, width: u16, theme: &Theme) -> Line<'static> {
        let format = format_description!("[hour]:[minute]");
        let stamp = self.message.timestamp.format(&format).unwrap_or_default();
        let pad = (width as usize).saturating_sub(stamp.width());
        Line::from(vec![
            Span::raw(" ".repeat(pad)),
            Span::styled(stamp, theme.style(Component::Timestamp)),
        ])
    }
}

impl ChatRenderable for MessageWidget {
    fn lines(&mut self, width: u16, state: DisplayState, theme: &Theme) -> &[Line<'static>] {
        let key = self.render_key(width, state, theme);
        if self.cache.get(&key).is_none() {
            let rendered = self.render(width, state, theme);
            return self.cache.store(key, rendered);
        }
        self.cache.get(&key).unwrap_or(&[])
    }
}

fn content_hash(message: &Message) -> u64 {
    let mut hasher = DefaultHasher::new();
    message.id.hash(&mut hasher);
    message.content.hash(&mut hasher);
    message.is_thinking.hash(&mut hasher);
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::model::Role;
    use crate::tui::theme::ColorMode;

    fn text_of(lines: &[Line<'_>]) -> Vec<String> {
        lines
            .iter()
            .map(|l| l.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect()
    }

    fn theme() -> Theme {
        Theme::default_for(ColorMode::Light)
    }

    #[test]
    fn test_thinking_shows_indicator_instead_of_content() {
        let mut msg = Message::thinking();
        msg.content = "half-formed draft".to_string();
        let mut widget = MessageWidget::new(msg);

        let lines = widget.lines(40, DisplayState::Thinking, &theme());
        let rendered = text_of(lines);
        assert!(rendered[0].contains(THINKING_LABEL));
        assert!(!rendered.iter().any(|l| l.contains("half-formed")));
    }

    #[test]
    fn test_streaming_appends_cursor_to_last_content_line() {
        let mut widget = MessageWidget::new(Message::assistant("first\n\nsecond"));
        let lines = widget.lines(40, DisplayState::Streaming, &theme());
        let rendered = text_of(lines);

        // last line is the timestamp; the cursor sits on the content line
        // before it
        let content_last = &rendered[rendered.len() - 2];
        assert!(content_last.ends_with(STREAM_CURSOR), "{content_last:?}");
    }

    #[test]
    fn test_settled_has_no_cursor() {
        let mut widget = MessageWidget::new(Message::assistant("done"));
        let lines = widget.lines(40, DisplayState::Settled, &theme());
        assert!(!text_of(lines).iter().any(|l| l.contains(STREAM_CURSOR)));
    }

    #[test]
    fn test_streaming_empty_content_still_shows_cursor() {
        let mut widget = MessageWidget::new(Message::assistant(""));
        let lines = widget.lines(40, DisplayState::Streaming, &theme());
        let rendered = text_of(lines);
        assert!(rendered.iter().any(|l| l.contains(STREAM_CURSOR)));
    }

    #[test]
    fn test_gutter_marks_the_first_line_only() {
        let mut widget = MessageWidget::new(Message::new(Role::User, "one\n\ntwo"));
        let lines = widget.lines(40, DisplayState::Settled, &theme());
        let rendered = text_of(lines);

        assert!(rendered[0].starts_with("▶ "));
        for line in &rendered[1..rendered.len() - 1] {
            assert!(line.starts_with("  "), "continuation line: {line:?}");
        }
    }

    #[test]
    fn test_timestamp_is_right_aligned_on_the_last_line() {
        let mut widget = MessageWidget::new(Message::assistant("hi"));
        let lines = widget.lines(30, DisplayState::Settled, &theme());
        let rendered = text_of(lines);
        let last = rendered.last().unwrap();

        assert_eq!(last.len(), 30);
        let stamp = last.trim_start();
        assert_eq!(stamp.len(), 5);
        assert_eq!(stamp.as_bytes()[2], b':');
    }

    #[test]
    fn test_long_content_wraps_to_width() {
        let content = "word ".repeat(40);
        let mut widget = MessageWidget::new(Message::assistant(content.trim_end()));
        let lines = widget.lines(20, DisplayState::Settled, &theme());
        assert!(lines.len() > 2);
    }

    #[test]
    fn test_repeated_render_returns_identical_lines() {
        let mut widget = MessageWidget::new(Message::assistant("# Hi\n\nbody"));
        let theme = theme();

        let first = widget.lines(40, DisplayState::Settled, &theme).to_vec();
        let second = widget.lines(40, DisplayState::Settled, &theme).to_vec();
        assert_eq!(first, second);
    }

    #[test]
    fn test_state_change_invalidates_the_cache() {
        let mut widget = MessageWidget::new(Message::assistant("hello"));
        let theme = theme();

        let streaming = widget.lines(40, DisplayState::Streaming, &theme).to_vec();
        let settled = widget.lines(40, DisplayState::Settled, &theme).to_vec();
        assert_ne!(streaming, settled);
    }

    #[test]
    fn test_set_message_invalidates_via_content_hash() {
        let mut widget = MessageWidget::new(Message::assistant("before"));
        let theme = theme();
        let before = text_of(widget.lines(40, DisplayState::Settled, &theme));

        let mut changed = widget.message().clone();
        changed.content = "after".to_string();
        widget.set_message(changed);
        let after = text_of(widget.lines(40, DisplayState::Settled, &theme));

        assert_ne!(before, after);
        assert!(after.iter().any(|l| l.contains("after")));
    }

    #[test]
    fn test_spinner_frame_replaces_gutter_glyph_while_streaming() {
        let mut widget = MessageWidget::new(Message::assistant("hi"));
        widget.set_spinner_frame(Some('⠙'));
        let theme = theme();

        let lines = widget.lines(40, DisplayState::Streaming, &theme);
        assert!(text_of(lines)[0].starts_with("⠙ "));

        // spinner never shows on a settled message
        let lines = widget.lines(40, DisplayState::Settled, &theme);
        assert!(text_of(lines)[0].starts_with("◀ "));
    }
}
