//! Theme-aware Markdown renderer for the TUI.
//!
//! Walks `pulldown-cmark` events and produces styled [`ratatui`] lines. The
//! mapping is total over the node types that can appear in chat content:
//! paragraphs, headings, lists, blockquotes, inline and fenced code, tables,
//! links, images, rules, and breaks. Fenced code blocks are highlighted with
//! `syntect` when the language token resolves and the theme carries a
//! highlighting theme; otherwise they degrade to plain text.

use itertools::{Itertools, Position};
use once_cell::sync::Lazy;
use pulldown_cmark::{Alignment, CodeBlockKind, CowStr, Event, HeadingLevel, Options, Parser, Tag};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use syntect::easy::HighlightLines;
use syntect::parsing::{SyntaxReference, SyntaxSet};
use syntect::util::LinesWithEndings;
use tracing::warn;
use unicode_width::UnicodeWidthStr;

use crate::tui::theme::{Component, Theme};

/// Lazy-loaded syntax set for highlighting
static SYNTAX_SET: Lazy<SyntaxSet> = Lazy::new(SyntaxSet::load_defaults_newlines);

/// Resolve a fenced code block language token to a syntax definition.
/// Returns `None` for unknown tokens; the caller renders plain text then.
fn resolve_syntax(token: &str) -> Option<&'static SyntaxReference> {
    SYNTAX_SET
        .find_syntax_by_token(token)
        .or_else(|| SYNTAX_SET.find_syntax_by_extension(token))
}

fn syntect_to_ratatui(style: syntect::highlighting::Style) -> Style {
    Style::default().fg(Color::Rgb(
        style.foreground.r,
        style.foreground.g,
        style.foreground.b,
    ))
}

/// A rendered line with metadata about how it should be wrapped
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedLine {
    pub line: Line<'static>,
    /// Code block lines keep their exact layout and are never wrapped
    pub no_wrap: bool,
    /// Hanging indent (in columns) for wrapped continuations
    pub indent: usize,
}

impl RenderedLine {
    fn wrappable(line: Line<'static>, indent: usize) -> Self {
        Self {
            line,
            no_wrap: false,
            indent,
        }
    }

    fn verbatim(line: Line<'static>) -> Self {
        Self {
            line,
            no_wrap: true,
            indent: 0,
        }
    }
}

/// Rendered Markdown output
#[derive(Debug, Default, PartialEq)]
pub struct RenderedText {
    pub lines: Vec<RenderedLine>,
}

impl RenderedText {
    pub fn height(&self) -> usize {
        self.lines.len()
    }
}

/// Per-node-type styles resolved from the theme
#[derive(Debug, Clone)]
pub struct MarkdownStyles {
    pub h1: Style,
    pub h2: Style,
    pub h3: Style,
    pub h4: Style,
    pub h5: Style,
    pub h6: Style,
    pub emphasis: Style,
    pub strong: Style,
    pub strikethrough: Style,
    pub blockquote: Style,
    pub code: Style,
    pub code_block: Style,
    pub link: Style,
    pub list_marker: Style,
    pub list_number: Style,
    pub rule: Style,
    pub image: Style,
    pub table_border: Style,
    pub table_header: Style,
    pub table_cell: Style,
}

impl MarkdownStyles {
    /// Resolve the style table from a theme. Structural emphasis (bold,
    /// italic, strikethrough) is purely semantic and never themed.
    pub fn from_theme(theme: &Theme) -> Self {
        Self {
            h1: theme
                .style(Component::MarkdownH1)
                .add_modifier(Modifier::BOLD | Modifier::REVERSED),
            h2: theme
                .style(Component::MarkdownH2)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
            h3: theme
                .style(Component::MarkdownH3)
                .add_modifier(Modifier::BOLD),
            h4: theme
                .style(Component::MarkdownH4)
                .add_modifier(Modifier::UNDERLINED),
            h5: theme
                .style(Component::MarkdownH5)
                .add_modifier(Modifier::ITALIC),
            h6: theme
                .style(Component::MarkdownH6)
                .add_modifier(Modifier::ITALIC),
            emphasis: Style::default().add_modifier(Modifier::ITALIC),
            strong: Style::default().add_modifier(Modifier::BOLD),
            strikethrough: Style::default().add_modifier(Modifier::CROSSED_OUT),
            blockquote: theme.style(Component::MarkdownBlockquote),
            code: theme.style(Component::MarkdownCode),
            code_block: theme.style(Component::MarkdownCodeBlock),
            link: theme
                .style(Component::MarkdownLink)
                .add_modifier(Modifier::UNDERLINED),
            list_marker: theme.style(Component::MarkdownListBullet),
            list_number: theme.style(Component::MarkdownListNumber),
            rule: theme.style(Component::MarkdownRule),
            image: theme.style(Component::MarkdownImage),
            table_border: theme.style(Component::MarkdownTableBorder),
            table_header: theme.style(Component::MarkdownTableHeader),
            table_cell: theme.style(Component::MarkdownTableCell),
        }
    }
}

pub fn render(input: &str, styles: &MarkdownStyles, theme: &Theme) -> RenderedText {
    render_with_width(input, styles, theme, None)
}

pub fn render_with_width(
    input: &str,
    styles: &MarkdownStyles,
    theme: &Theme,
    terminal_width: Option<u16>,
) -> RenderedText {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    let parser = Parser::new_ext(input, options);
    let mut writer = Writer::new(parser, styles, theme, terminal_width);
    writer.run();
    writer.out
}

/// Table rows accumulated before layout; each cell is a list of spans
#[derive(Default)]
struct TableBuilder {
    alignments: Vec<Alignment>,
    rows: Vec<Vec<Vec<Span<'static>>>>,
}

impl TableBuilder {
    fn current_cell(&mut self) -> Option<&mut Vec<Span<'static>>> {
        self.rows.last_mut().and_then(|row| row.last_mut())
    }
}

struct Writer<'a, I> {
    iter: I,
    out: RenderedText,

    /// Stack of inline styles; the top is the current style
    inline_styles: Vec<Style>,
    /// Stack of whole-line styles (blockquote, code block)
    line_styles: Vec<Style>,
    /// Prefix spans added at the start of each new line
    line_prefixes: Vec<Span<'a>>,

    /// Stack of list counters; `None` for bullet lists
    list_counters: Vec<Option<u64>>,
    /// Hanging indent of the current list item
    item_indent: usize,

    /// Destination of the link currently being rendered
    link: Option<CowStr<'a>>,
    /// Destination and accumulated alt text of the current image
    image: Option<(CowStr<'a>, String)>,

    /// Table being accumulated, if any
    table: Option<TableBuilder>,
    in_code_block: bool,
    code_language: Option<String>,

    needs_newline: bool,
    terminal_width: Option<u16>,

    styles: &'a MarkdownStyles,
    theme: &'a Theme,
}

impl<'a, I> Writer<'a, I>
where
    I: Iterator<Item = Event<'a>>,
{
    fn new(
        iter: I,
        styles: &'a MarkdownStyles,
        theme: &'a Theme,
        terminal_width: Option<u16>,
    ) -> Self {
        Self {
            iter,
            out: RenderedText::default(),
            inline_styles: vec![],
            line_styles: vec![],
            line_prefixes: vec![],
            list_counters: vec![],
            item_indent: 0,
            link: None,
            image: None,
            table: None,
            in_code_block: false,
            code_language: None,
            needs_newline: false,
            terminal_width,
            styles,
            theme,
        }
    }

    fn run(&mut self) {
        while let Some(event) = self.iter.next() {
            self.handle_event(event);
        }
    }

    fn handle_event(&mut self, event: Event<'a>) {
        match event {
            Event::Start(tag) => self.start_tag(tag),
            Event::End(tag) => self.end_tag(tag),
            Event::Text(text) => self.text(text),
            Event::Code(code) => self.inline_code(code),
            Event::Html(html) => {
                warn!("raw html passed through unstyled: {}", html);
                self.text(html);
            }
            Event::FootnoteReference(reference) => {
                warn!("footnote reference not supported: {}", reference);
                self.text(reference);
            }
            Event::SoftBreak => self.push_line(Line::default()),
            Event::HardBreak => {
                self.push_span("  ".into());
                self.push_line(Line::default());
            }
            Event::Rule => self.rule(),
            // Task lists are not enabled in the parser options
            Event::TaskListMarker(_) => {}
        }
    }

    fn start_tag(&mut self, tag: Tag<'a>) {
        match tag {
            Tag::Paragraph => self.start_paragraph(),
            Tag::Heading(level, _, _) => self.start_heading(level),
            Tag::BlockQuote => self.start_blockquote(),
            Tag::CodeBlock(kind) => self.start_codeblock(kind),
            Tag::List(start) => self.start_list(start),
            Tag::Item => self.start_item(),
            Tag::Table(alignments) => self.start_table(alignments),
            Tag::TableHead | Tag::TableRow => self.start_table_row(),
            Tag::TableCell => self.start_table_cell(),
            Tag::Emphasis => self.push_inline_style(self.styles.emphasis),
            Tag::Strong => self.push_inline_style(self.styles.strong),
            Tag::Strikethrough => self.push_inline_style(self.styles.strikethrough),
            Tag::Link(_, dest_url, _) => self.link = Some(dest_url),
            Tag::Image(_, dest_url, _) => self.image = Some((dest_url, String::new())),
            Tag::FootnoteDefinition(_) => warn!("footnote definition not supported"),
        }
    }

    fn end_tag(&mut self, tag: Tag<'a>) {
        match tag {
            Tag::Paragraph => self.needs_newline = true,
            Tag::Heading(..) => {
                self.pop_inline_style();
                self.needs_newline = true;
            }
            Tag::BlockQuote => self.end_blockquote(),
            Tag::CodeBlock(_) => self.end_codeblock(),
            Tag::List(_) => {
                self.list_counters.pop();
                self.needs_newline = true;
            }
            Tag::Item => {}
            Tag::Table(_) => self.end_table(),
            Tag::TableHead | Tag::TableRow | Tag::TableCell => {}
            Tag::Emphasis | Tag::Strong | Tag::Strikethrough => self.pop_inline_style(),
            Tag::Link(..) => self.end_link(),
            Tag::Image(..) => self.end_image(),
            Tag::FootnoteDefinition(_) => {}
        }
    }

    fn start_paragraph(&mut self) {
        if self.needs_newline {
            self.push_line(Line::default());
        }
        self.push_line(Line::default());
        self.needs_newline = false;
    }

    fn start_heading(&mut self, level: HeadingLevel) {
        if self.needs_newline {
            self.push_line(Line::default());
        }
        let style = match level {
            HeadingLevel::H1 => self.styles.h1,
            HeadingLevel::H2 => self.styles.h2,
            HeadingLevel::H3 => self.styles.h3,
            HeadingLevel::H4 => self.styles.h4,
            HeadingLevel::H5 => self.styles.h5,
            HeadingLevel::H6 => self.styles.h6,
        };
        self.push_inline_style(style);
        let marker = format!("{} ", "#".repeat(level as usize));
        self.push_line(Line::styled(marker, style));
        self.needs_newline = false;
    }

    fn start_blockquote(&mut self) {
        if self.needs_newline {
            self.push_line(Line::default());
            self.needs_newline = false;
        }
        self.line_prefixes
            .push(Span::styled(">", self.styles.blockquote));
        self.line_styles.push(self.styles.blockquote);
    }

    fn end_blockquote(&mut self) {
        self.line_prefixes.pop();
        self.line_styles.pop();
        self.needs_newline = true;
    }

    fn start_codeblock(&mut self, kind: CodeBlockKind<'_>) {
        if !self.out.lines.is_empty() {
            self.push_line(Line::default());
        }
        self.in_code_block = true;
        self.code_language = match kind {
            CodeBlockKind::Fenced(lang) if !lang.is_empty() => Some(lang.to_string()),
            CodeBlockKind::Fenced(_) | CodeBlockKind::Indented => None,
        };
        self.line_styles.push(self.styles.code_block);
        // The first text event must open a fresh verbatim line rather than
        // append to the separator pushed above
        self.needs_newline = true;
    }

    fn end_codeblock(&mut self) {
        self.in_code_block = false;
        self.code_language = None;
        self.line_styles.pop();
        self.needs_newline = true;
    }

    fn start_list(&mut self, start: Option<u64>) {
        if self.list_counters.is_empty() && self.needs_newline {
            self.push_line(Line::default());
        }
        self.list_counters.push(start);
    }

    fn start_item(&mut self) {
        self.push_line(Line::default());
        self.needs_newline = false;
        self.push_item_marker();
    }

    /// Push the bullet or number for a freshly started list item and record
    /// the hanging indent so wrapped continuations align under the text.
    fn push_item_marker(&mut self) {
        let depth = self.list_counters.len();
        let lead = "  ".repeat(depth.saturating_sub(1));

        let Some(counter) = self.list_counters.last_mut() else {
            return;
        };
        let (marker, style) = match counter {
            None => (format!("{lead}• "), self.styles.list_marker),
            Some(n) => {
                let marker = format!("{lead}{n}. ");
                *n += 1;
                (marker, self.styles.list_number)
            }
        };

        self.item_indent = marker.as_str().width();
        if let Some(current) = self.out.lines.last_mut() {
            current.indent = self.item_indent;
        }
        self.push_span(Span::styled(marker, style));
    }

    fn text(&mut self, text: CowStr<'a>) {
        // Image alt text is buffered and emitted when the image tag closes
        if let Some((_, alt)) = self.image.as_mut() {
            alt.push_str(&text);
            return;
        }

        if self.table.is_some() {
            let style = self.current_inline_style();
            let span = Span::styled(text.to_string(), style);
            self.push_span(span);
        } else if self.in_code_block {
            self.code_block_text(&text);
        } else {
            for (position, line) in text.lines().with_position() {
                if self.needs_newline {
                    self.push_line(Line::default());
                    self.needs_newline = false;
                }
                if matches!(position, Position::Middle | Position::Last) {
                    self.push_line(Line::default());
                }
                let span = Span::styled(line.to_owned(), self.current_inline_style());
                self.push_span(span);
            }
            self.needs_newline = false;
        }
    }

    /// Code block content: highlighted when the language resolves and the
    /// theme has a highlighting theme, plain text otherwise. Either way the
    /// text content is preserved verbatim.
    fn code_block_text(&mut self, text: &str) {
        let base_style = self.current_inline_style().patch(self.styles.code_block);
        let syntax = self.code_language.as_deref().and_then(resolve_syntax);
        let theme = self.theme;

        if let (Some(syntax), Some(syntax_theme)) = (syntax, theme.syntax_theme.as_ref()) {
            let mut highlighter = HighlightLines::new(syntax, syntax_theme);
            for (idx, line) in LinesWithEndings::from(text).enumerate() {
                if idx > 0 || self.needs_newline {
                    self.push_line(Line::default());
                }
                let ranges = highlighter
                    .highlight_line(line, &SYNTAX_SET)
                    .unwrap_or_else(|_| vec![(syntect::highlighting::Style::default(), line)]);
                for (style, piece) in ranges {
                    let piece = piece.trim_end_matches('\n');
                    if piece.is_empty() {
                        continue;
                    }
                    let span =
                        Span::styled(piece.to_string(), syntect_to_ratatui(style).patch(base_style));
                    self.push_span(span);
                }
            }
        } else {
            for (idx, line) in text.lines().enumerate() {
                if idx > 0 || self.needs_newline {
                    self.push_line(Line::default());
                }
                // Exact line content, all whitespace preserved
                self.push_span(Span::styled(line.to_string(), base_style));
            }
        }
        self.needs_newline = text.ends_with('\n');
    }

    fn inline_code(&mut self, code: CowStr<'a>) {
        let span = Span::styled(code.to_string(), self.styles.code);
        self.push_span(span);
    }

    fn end_link(&mut self) {
        if let Some(dest) = self.link.take() {
            self.push_span(" (".into());
            self.push_span(Span::styled(dest.to_string(), self.styles.link));
            self.push_span(")".into());
        }
    }

    /// Terminals have no inline images; render a placeholder carrying the
    /// alt text and the source so neither is lost.
    fn end_image(&mut self) {
        let Some((dest, alt)) = self.image.take() else {
            return;
        };
        let label = if alt.is_empty() {
            "[image]".to_string()
        } else {
            format!("[image: {alt}]")
        };
        self.push_span(Span::styled(label, self.styles.image));
        self.push_span(" (".into());
        self.push_span(Span::styled(dest.to_string(), self.styles.link));
        self.push_span(")".into());
    }

    fn rule(&mut self) {
        if self.needs_newline {
            self.push_line(Line::default());
        }
        let width = self.terminal_width.unwrap_or(80) as usize;
        let line = Line::from(Span::styled("─".repeat(width), self.styles.rule));
        self.push_line(line);
        self.needs_newline = true;
    }

    fn current_inline_style(&self) -> Style {
        self.inline_styles.last().copied().unwrap_or_default()
    }

    fn push_inline_style(&mut self, style: Style) {
        let patched = self.current_inline_style().patch(style);
        self.inline_styles.push(patched);
    }

    fn pop_inline_style(&mut self) {
        self.inline_styles.pop();
    }

    fn push_line(&mut self, line: Line<'a>) {
        let style = self.line_styles.last().copied().unwrap_or_default();
        let mut line = line.patch_style(style);

        let has_prefixes = !self.line_prefixes.is_empty();
        if has_prefixes {
            line.spans.insert(0, " ".into());
            for prefix in self.line_prefixes.iter().rev() {
                line.spans.insert(0, prefix.clone());
            }
        }

        let spans: Vec<Span<'static>> = line
            .spans
            .into_iter()
            .map(|span| Span::styled(span.content.into_owned(), span.style))
            .collect();
        let line = Line::from(spans);

        let rendered = if self.in_code_block {
            RenderedLine::verbatim(line)
        } else {
            let indent = if !self.list_counters.is_empty() && !has_prefixes {
                self.item_indent
            } else {
                0
            };
            RenderedLine::wrappable(line, indent)
        };
        self.out.lines.push(rendered);
    }

    fn push_span(&mut self, span: Span<'a>) {
        let span = Span::styled(span.content.into_owned(), span.style);
        if let Some(cell) = self.table.as_mut().and_then(TableBuilder::current_cell) {
            cell.push(span);
        } else if let Some(rendered) = self.out.lines.last_mut() {
            rendered.line.push_span(span);
        } else {
            self.push_line(Line::from(vec![span]));
        }
    }

    // Table handling

    fn start_table(&mut self, alignments: Vec<Alignment>) {
        if self.needs_newline {
            self.push_line(Line::default());
        }
        self.table = Some(TableBuilder {
            alignments,
            rows: Vec::new(),
        });
        self.needs_newline = false;
    }

    fn start_table_row(&mut self) {
        if let Some(table) = self.table.as_mut() {
            table.rows.push(Vec::new());
        }
    }

    fn start_table_cell(&mut self) {
        if let Some(row) = self.table.as_mut().and_then(|t| t.rows.last_mut()) {
            row.push(Vec::new());
        }
    }

    fn end_table(&mut self) {
        if let Some(table) = self.table.take() {
            self.layout_table(&table);
        }
        self.needs_newline = true;
    }

    /// Lay out the accumulated table with box-drawing borders. The first row
    /// is the header; every row has one divider per column boundary and
    /// nothing after the last cell but the right border.
    fn layout_table(&mut self, table: &TableBuilder) {
        if table.rows.is_empty() {
            return;
        }

        let num_cols = table.alignments.len();
        let mut col_widths = vec![0usize; num_cols];
        for row in &table.rows {
            for (idx, cell) in row.iter().enumerate().take(num_cols) {
                let cell_width: usize = cell.iter().map(|s| s.content.as_ref().width()).sum();
                col_widths[idx] = col_widths[idx].max(cell_width);
            }
        }
        for width in &mut col_widths {
            *width += 2; // one space of padding each side
        }

        let border = self.styles.table_border;
        self.table_border_line(&col_widths, '┌', '┬', '┐', border);

        for (row_idx, row) in table.rows.iter().enumerate() {
            let is_header = row_idx == 0 && table.rows.len() > 1;
            let cell_style = if is_header {
                self.styles.table_header
            } else {
                self.styles.table_cell
            };

            let mut spans = vec![Span::styled("│", border)];
            for (idx, cell) in row.iter().enumerate().take(num_cols) {
                let text: String = cell.iter().map(|s| s.content.as_ref()).collect();
                let padded = align_cell(&text, col_widths[idx], table.alignments[idx]);
                spans.push(Span::styled(padded, cell_style));
                spans.push(Span::styled("│", border));
            }
            self.push_line(Line::from(spans));

            if is_header {
                self.table_border_line(&col_widths, '├', '┼', '┤', border);
            }
        }

        self.table_border_line(&col_widths, '└', '┴', '┘', border);
    }

    fn table_border_line(
        &mut self,
        col_widths: &[usize],
        left: char,
        mid: char,
        right: char,
        style: Style,
    ) {
        let mut border = String::from(left);
        for (idx, &width) in col_widths.iter().enumerate() {
            border.push_str(&"─".repeat(width));
            if idx < col_widths.len() - 1 {
                border.push(mid);
            }
        }
        border.push(right);
        self.push_line(Line::from(Span::styled(border, style)));
    }
}

/// Pad cell text to `width` columns according to its column alignment
fn align_cell(text: &str, width: usize, alignment: Alignment) -> String {
    let text_width = text.width();
    let padding = width.saturating_sub(text_width);
    match alignment {
        Alignment::None | Alignment::Left => {
            format!(" {}{}", text, " ".repeat(padding.saturating_sub(1)))
        }
        Alignment::Center => {
            let left = padding / 2;
            format!("{}{}{}", " ".repeat(left), text, " ".repeat(padding - left))
        }
        Alignment::Right => {
            format!("{}{} ", " ".repeat(padding.saturating_sub(1)), text)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::theme::ColorMode;

    fn plain(rendered: &RenderedText) -> Vec<String> {
        rendered
            .lines
            .iter()
            .map(|l| l.line.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect()
    }

    fn render_default(input: &str) -> RenderedText {
        let theme = Theme::default_for(ColorMode::Dark);
        let styles = MarkdownStyles::from_theme(&theme);
        render(input, &styles, &theme)
    }

    #[test]
    fn test_rendering_is_pure() {
        let input = "# Title\n\nSome *emphasis* and `code`.\n\n- one\n- two";
        let theme = Theme::default_for(ColorMode::Light);
        let styles = MarkdownStyles::from_theme(&theme);

        let first = render(input, &styles, &theme);
        let second = render(input, &styles, &theme);
        assert_eq!(first, second);
    }

    #[test]
    fn test_mode_switch_keeps_text_identical() {
        let input = "A [link](https://example.com) and **bold** text.";
        let light_theme = Theme::default_for(ColorMode::Light);
        let dark_theme = Theme::default_for(ColorMode::Dark);

        let light = render(input, &MarkdownStyles::from_theme(&light_theme), &light_theme);
        let dark = render(input, &MarkdownStyles::from_theme(&dark_theme), &dark_theme);
        assert_eq!(plain(&light), plain(&dark));
    }

    #[test]
    fn test_heading_marker_and_style() {
        let rendered = render_default("## Section");
        let lines = plain(&rendered);
        assert_eq!(lines, vec!["## Section"]);
    }

    #[test]
    fn test_known_language_is_highlighted() {
        let rendered = render_default("```python\nprint(1)\n```");
        let code_line = rendered
            .lines
            .iter()
            .find(|l| {
                l.line
                    .spans
                    .iter()
                    .any(|s| s.content.as_ref().contains("print"))
            })
            .unwrap();

        assert!(code_line.no_wrap);
        assert!(
            code_line.line.spans.len() > 1,
            "highlighted code should produce multiple spans, got {:?}",
            code_line.line
        );
    }

    #[test]
    fn test_unknown_language_degrades_to_plain_text() {
        let rendered = render_default("```xyz123\nprint(1)\n```");
        let lines = plain(&rendered);
        assert!(
            lines.iter().any(|l| l == "print(1)"),
            "content must be preserved verbatim: {lines:?}"
        );

        let code_line = rendered
            .lines
            .iter()
            .find(|l| {
                l.line
                    .spans
                    .iter()
                    .any(|s| s.content.as_ref().contains("print"))
            })
            .unwrap();
        assert_eq!(code_line.line.spans.len(), 1, "plain code is a single span");
    }

    #[test]
    fn test_code_block_without_syntax_theme_is_plain() {
        let mut theme = Theme::default_for(ColorMode::Dark);
        theme.syntax_theme = None;
        let styles = MarkdownStyles::from_theme(&theme);

        let rendered = render("```rust\nfn main() {}\n```", &styles, &theme);
        let code_line = rendered
            .lines
            .iter()
            .find(|l| l.line.spans.iter().any(|s| s.content.as_ref().contains("fn")))
            .unwrap();
        assert_eq!(code_line.line.spans.len(), 1);
    }

    #[test]
    fn test_code_block_preserves_indentation() {
        let rendered = render_default("```xyzunknown\nfn main() {\n    let x = 1;\n}\n```");
        let lines = plain(&rendered);
        assert!(lines.iter().any(|l| l == "    let x = 1;"));
    }

    #[test]
    fn test_code_block_after_paragraph_is_separated_and_verbatim() {
        let rendered =
            render_default("para\n\n```xyzunknown\nfirst code line\nsecond code line\n```");
        let lines = plain(&rendered);

        let first_idx = lines.iter().position(|l| l == "first code line").unwrap();
        assert!(rendered.lines[first_idx].no_wrap);
        assert!(rendered.lines[first_idx + 1].no_wrap);
        assert_eq!(lines[first_idx + 1], "second code line");

        // blank separator between the paragraph and the code block
        assert_eq!(lines[first_idx - 1], "");
        assert_eq!(lines[first_idx - 2], "para");
    }

    #[test]
    fn test_table_layout() {
        let rendered = render_default("| Name | Value |\n|------|-------|\n| a | b |");
        let lines = plain(&rendered);

        // top border, header, separator, data row, bottom border
        assert_eq!(lines.len(), 5);
        assert!(lines[0].starts_with('┌') && lines[0].ends_with('┐'));
        assert!(lines[2].starts_with('├') && lines[2].ends_with('┤'));
        assert!(lines[4].starts_with('└') && lines[4].ends_with('┘'));

        // exactly one divider per column boundary: left, middle, right
        for row in [&lines[1], &lines[3]] {
            assert_eq!(
                row.matches('│').count(),
                3,
                "no divider after the last cell: {row}"
            );
        }
        assert!(lines[1].contains("Name") && lines[1].contains("Value"));
        assert!(lines[3].contains(" a ") && lines[3].contains(" b "));
    }

    #[test]
    fn test_table_column_alignment() {
        let rendered =
            render_default("| L | C | R |\n|:--|:-:|--:|\n| aa | bb | cc |");
        let lines = plain(&rendered);
        let data = &lines[3];
        let cells: Vec<&str> = data.trim_matches('│').split('│').collect();
        assert_eq!(cells.len(), 3);
        assert!(cells[0].starts_with(" aa"), "left aligned: {:?}", cells[0]);
        assert!(cells[2].ends_with("cc "), "right aligned: {:?}", cells[2]);
    }

    #[test]
    fn test_link_renders_text_and_destination() {
        let rendered = render_default("see [the docs](https://example.com/docs)");
        let lines = plain(&rendered);
        assert_eq!(lines, vec!["see the docs (https://example.com/docs)"]);
    }

    #[test]
    fn test_image_renders_placeholder() {
        let rendered = render_default("![a chart](https://example.com/c.png)");
        let lines = plain(&rendered);
        assert_eq!(
            lines,
            vec!["[image: a chart] (https://example.com/c.png)"]
        );
    }

    #[test]
    fn test_image_without_alt() {
        let rendered = render_default("![](https://example.com/c.png)");
        let lines = plain(&rendered);
        assert_eq!(lines, vec!["[image] (https://example.com/c.png)"]);
    }

    #[test]
    fn test_horizontal_rule_spans_width() {
        let theme = Theme::default_for(ColorMode::Dark);
        let styles = MarkdownStyles::from_theme(&theme);
        let rendered = render_with_width("above\n\n---\n\nbelow", &styles, &theme, Some(12));
        let lines = plain(&rendered);
        assert!(lines.iter().any(|l| l == &"─".repeat(12)));
    }

    #[test]
    fn test_blockquote_prefix() {
        let rendered = render_default("> quoted text");
        let lines = plain(&rendered);
        assert_eq!(lines, vec!["> quoted text"]);
    }

    #[test]
    fn test_bullet_list_markers_and_indent() {
        let rendered = render_default("- outer\n  - inner");
        let lines = plain(&rendered);
        assert_eq!(lines, vec!["• outer", "  • inner"]);
        assert_eq!(rendered.lines[0].indent, 2);
        assert_eq!(rendered.lines[1].indent, 4);
    }

    #[test]
    fn test_numbered_list_counts_from_start() {
        let rendered = render_default("3. three\n4. four");
        let lines = plain(&rendered);
        assert_eq!(lines, vec!["3. three", "4. four"]);
    }

    #[test]
    fn test_numbered_item_with_leading_bold() {
        let rendered = render_default("1. **Key**: value\n2. plain");
        let lines = plain(&rendered);
        assert_eq!(lines, vec!["1. Key: value", "2. plain"]);
    }

    #[test]
    fn test_paragraphs_separated_by_blank_line() {
        let rendered = render_default("first\n\nsecond");
        let lines = plain(&rendered);
        assert_eq!(lines, vec!["first", "", "second"]);
    }

    #[test]
    fn test_soft_break_starts_a_new_line() {
        let rendered = render_default("one\ntwo");
        let lines = plain(&rendered);
        assert_eq!(lines, vec!["one", "two"]);
    }

    #[test]
    fn test_inline_code_keeps_text() {
        let rendered = render_default("run `cargo test` now");
        let lines = plain(&rendered);
        assert_eq!(lines, vec!["run cargo test now"]);
    }

    #[test]
    fn test_empty_input() {
        let rendered = render_default("");
        assert_eq!(rendered.height(), 0);
    }

    #[test]
    fn test_unknown_language_lookup_is_none() {
        assert!(resolve_syntax("xyz123").is_none());
        assert!(resolve_syntax("python").is_some());
        assert!(resolve_syntax("rs").is_some());
    }
}
