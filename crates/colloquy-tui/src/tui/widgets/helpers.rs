//! Line-level helpers shared by the chat widgets.

use ratatui::text::{Line, Span};
use unicode_width::UnicodeWidthStr;

/// Split into chunks of one word plus its trailing whitespace, so styles
/// and spacing survive the wrap untouched.
fn words_with_trailing_whitespace(s: &str) -> Vec<&str> {
    let mut chunks = Vec::new();
    let mut start = 0;
    let mut in_whitespace = false;
    for (idx, ch) in s.char_indices() {
        if ch.is_whitespace() {
            in_whitespace = true;
        } else if in_whitespace {
            chunks.push(&s[start..idx]);
            start = idx;
            in_whitespace = false;
        }
    }
    if start < s.len() {
        chunks.push(&s[start..]);
    }
    chunks
}

/// Wrap a styled line to `width` columns, keeping each span's style, and
/// indent continuation lines by `indent` spaces. The fit test uses the word
/// without its trailing whitespace, so a space at the wrap point never
/// forces an extra line. Words wider than a whole line are split mid-word.
pub fn style_wrap_with_indent(
    line: Line<'static>,
    width: u16,
    indent: usize,
) -> Vec<Line<'static>> {
    let max_width = width as usize;
    if max_width == 0 {
        return vec![line];
    }
    let total_width: usize = line.spans.iter().map(|s| s.content.as_ref().width()).sum();
    if total_width <= max_width {
        return vec![line];
    }

    // An indent that leaves no room for content is ignored
    let indent = if indent >= max_width { 0 } else { indent };
    let indent_prefix = " ".repeat(indent);

    let mut wrapped: Vec<Line<'static>> = Vec::new();
    let mut current: Vec<Span<'static>> = Vec::new();
    let mut current_width = 0usize;
    let mut line_base = 0usize;

    for span in line.spans {
        let style = span.style;
        for chunk in words_with_trailing_whitespace(span.content.as_ref()) {
            let word_width = chunk.trim_end().width();

            if current_width > line_base && current_width + word_width > max_width {
                wrapped.push(Line::from(std::mem::take(&mut current)));
                current.push(Span::raw(indent_prefix.clone()));
                current_width = indent;
                line_base = indent;
            }

            if line_base + word_width > max_width {
                // Hard-split a word that cannot fit on any line
                let mut piece = String::new();
                let mut piece_width = current_width;
                for ch in chunk.chars() {
                    let ch_width = ch.to_string().width();
                    if piece_width + ch_width > max_width && !piece.is_empty() {
                        current.push(Span::styled(std::mem::take(&mut piece), style));
                        wrapped.push(Line::from(std::mem::take(&mut current)));
                        current.push(Span::raw(indent_prefix.clone()));
                        piece_width = indent;
                    }
                    piece.push(ch);
                    piece_width += ch_width;
                }
                if !piece.is_empty() {
                    current.push(Span::styled(piece, style));
                }
                current_width = piece_width;
                line_base = indent;
                continue;
            }

            current.push(Span::styled(chunk.to_string(), style));
            current_width += chunk.width();
        }
    }

    if !current.is_empty() {
        wrapped.push(Line::from(current));
    }
    wrapped
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::style::{Color, Style};

    fn text_of(lines: &[Line<'_>]) -> Vec<String> {
        lines
            .iter()
            .map(|l| l.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect()
    }

    #[test]
    fn test_short_line_is_untouched() {
        let line = Line::from("hello");
        let wrapped = style_wrap_with_indent(line, 10, 0);
        assert_eq!(text_of(&wrapped), vec!["hello"]);
    }

    #[test]
    fn test_wrap_with_hanging_indent() {
        let line = Line::from("- aaaa bbbb cccc dddd eeee ffff gggg");
        let wrapped = style_wrap_with_indent(line, 10, 2);
        assert_eq!(
            text_of(&wrapped),
            vec![
                "- aaaa ", "  bbbb ", "  cccc ", "  dddd ", "  eeee ", "  ffff ", "  gggg",
            ]
        );
    }

    #[test]
    fn test_trailing_space_does_not_force_wrap() {
        // "12345 7890" is exactly 10 wide; the trailing space after "7890"
        // is not part of the fit test
        let line = Line::from("12345 7890 x");
        let wrapped = style_wrap_with_indent(line, 10, 0);
        assert_eq!(text_of(&wrapped), vec!["12345 7890 ", "x"]);
    }

    #[test]
    fn test_styles_survive_the_wrap() {
        let red = Style::default().fg(Color::Red);
        let line = Line::from(vec![
            Span::raw("plain words here "),
            Span::styled("styled words here", red),
        ]);
        let wrapped = style_wrap_with_indent(line, 12, 0);
        assert!(wrapped.len() > 1);
        let styled_spans: Vec<_> = wrapped
            .iter()
            .flat_map(|l| &l.spans)
            .filter(|s| s.style == red)
            .collect();
        let styled_text: String = styled_spans
            .iter()
            .map(|s| s.content.as_ref())
            .collect::<String>()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ");
        assert_eq!(styled_text, "styled words here");
    }

    #[test]
    fn test_overlong_word_is_hard_split() {
        let line = Line::from("abcdefghijklmnop");
        let wrapped = style_wrap_with_indent(line, 5, 0);
        assert_eq!(text_of(&wrapped), vec!["abcde", "fghij", "klmno", "p"]);
    }

    #[test]
    fn test_indent_wider_than_line_is_ignored() {
        let line = Line::from("aaaa bbbb cccc");
        let wrapped = style_wrap_with_indent(line, 6, 8);
        for rendered in text_of(&wrapped) {
            assert!(!rendered.starts_with(' '), "no indent expected: {rendered:?}");
        }
    }

    #[test]
    fn test_zero_width_is_untouched() {
        let line = Line::from("anything at all");
        let wrapped = style_wrap_with_indent(line, 0, 2);
        assert_eq!(text_of(&wrapped), vec!["anything at all"]);
    }
}
