//! Theme system for colloquy-tui
//!
//! A theme is an immutable mapping from semantic component tokens to
//! terminal styles, compiled once and passed by reference into every
//! rendering call. Themes come in a light and a dark variant; user themes
//! are TOML files with a named palette plus per-component styles that
//! reference palette entries.

use once_cell::sync::Lazy;
use ratatui::style::{Color, Modifier, Style};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use std::fmt;
use syntect::highlighting::ThemeSet;
use thiserror::Error;

mod loader;

pub use loader::ThemeLoader;

/// Syntect themes bundled with the highlighter, shared by every compiled
/// theme.
static SYNTAX_THEMES: Lazy<ThemeSet> = Lazy::new(ThemeSet::load_defaults);

const LIGHT_SYNTAX_THEME: &str = "InspiredGitHub";
const DARK_SYNTAX_THEME: &str = "base16-ocean.dark";

/// Errors that can occur during theme operations
#[derive(Debug, Error)]
pub enum ThemeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Color not found in palette: {0}")]
    ColorNotFound(String),

    #[error("Invalid color value: {0}")]
    InvalidColor(String),
}

/// Light/dark display variant, selected by the embedding application.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    #[default]
    Light,
    Dark,
}

impl ColorMode {
    fn syntax_theme_name(self) -> &'static str {
        match self {
            ColorMode::Light => LIGHT_SYNTAX_THEME,
            ColorMode::Dark => DARK_SYNTAX_THEME,
        }
    }
}

/// A color value that can be either a palette reference or a direct color
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ColorValue {
    /// Reference to a palette color (e.g., "background", "brand")
    Palette(String),
    /// Direct color value (e.g., "#ff0000", "red")
    Direct(String),
}

/// Style definition for a component
#[derive(Debug, Clone, Deserialize)]
pub struct ComponentStyle {
    pub fg: Option<ColorValue>,
    pub bg: Option<ColorValue>,
    #[serde(default)]
    pub bold: bool,
    #[serde(default)]
    pub italic: bool,
    #[serde(default)]
    pub underlined: bool,
}

/// Raw theme as loaded from a TOML file
#[derive(Debug, Clone, Deserialize)]
pub struct RawTheme {
    pub name: String,
    #[serde(default)]
    pub mode: ColorMode,
    pub palette: HashMap<String, RgbColor>,
    pub components: HashMap<Component, ComponentStyle>,
}

/// Theme is an alias for CompiledTheme for easier use
pub type Theme = CompiledTheme;

/// RGB color deserialized from a hex string
#[derive(Debug, Clone, Copy)]
pub struct RgbColor(pub u8, pub u8, pub u8);

fn parse_hex(s: &str) -> Option<RgbColor> {
    let hex = s.strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some(RgbColor(r, g, b))
}

impl<'de> Deserialize<'de> for RgbColor {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        parse_hex(&s).ok_or_else(|| serde::de::Error::custom(format!("Invalid hex color: {s}")))
    }
}

impl From<RgbColor> for Color {
    fn from(rgb: RgbColor) -> Self {
        Color::Rgb(rgb.0, rgb.1, rgb.2)
    }
}

/// All themeable components
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Component {
    // Messages
    UserMessage,
    UserMessageRole,
    AssistantMessage,
    AssistantMessageRole,

    // Per-message chrome
    Timestamp,
    ThinkingIndicator,
    StreamCursor,

    // General
    DimText,
    ErrorText,

    // Markdown elements
    MarkdownH1,
    MarkdownH2,
    MarkdownH3,
    MarkdownH4,
    MarkdownH5,
    MarkdownH6,
    MarkdownParagraph,
    MarkdownCode,
    MarkdownCodeBlock,
    MarkdownLink,
    MarkdownBlockquote,
    MarkdownListBullet,
    MarkdownListNumber,
    MarkdownRule,
    MarkdownImage,

    // Markdown table elements
    MarkdownTableBorder,
    MarkdownTableHeader,
    MarkdownTableCell,
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

/// Compiled theme ready for rendering
#[derive(Debug, Clone)]
pub struct CompiledTheme {
    pub name: String,
    pub mode: ColorMode,
    pub styles: HashMap<Component, Style>,
    pub background_color: Option<Color>,
    /// Highlighting theme for fenced code blocks; absence degrades code
    /// blocks to plain text.
    pub syntax_theme: Option<syntect::highlighting::Theme>,
}

impl RawTheme {
    /// Compile the theme into a usable format
    pub fn into_theme(self) -> Result<Theme, ThemeError> {
        let mut styles = HashMap::new();

        let background_color = self.palette.get("background").map(|&rgb| rgb.into());

        for (component, style_def) in &self.components {
            let mut style = Style::default();

            if let Some(fg) = &style_def.fg {
                style = style.fg(self.resolve_color(fg)?);
            }
            if let Some(bg) = &style_def.bg {
                style = style.bg(self.resolve_color(bg)?);
            }
            if style_def.bold {
                style = style.add_modifier(Modifier::BOLD);
            }
            if style_def.italic {
                style = style.add_modifier(Modifier::ITALIC);
            }
            if style_def.underlined {
                style = style.add_modifier(Modifier::UNDERLINED);
            }

            styles.insert(*component, style);
        }

        Ok(Theme {
            name: self.name,
            mode: self.mode,
            styles,
            background_color,
            syntax_theme: SYNTAX_THEMES
                .themes
                .get(self.mode.syntax_theme_name())
                .cloned(),
        })
    }

    /// Resolve a color value to a ratatui Color.
    ///
    /// Untagged deserialization cannot tell a palette reference from a
    /// direct color, so every string arrives as `Palette`; a name that
    /// misses the palette is retried as a direct color before failing.
    fn resolve_color(&self, color_value: &ColorValue) -> Result<Color, ThemeError> {
        match color_value {
            ColorValue::Palette(name) => {
                if let Some(&rgb) = self.palette.get(name) {
                    return Ok(rgb.into());
                }
                parse_direct_color(name).map_err(|_| ThemeError::ColorNotFound(name.clone()))
            }
            ColorValue::Direct(color_str) => parse_direct_color(color_str),
        }
    }
}

/// Parse a direct color string (hex or named)
fn parse_direct_color(color_str: &str) -> Result<Color, ThemeError> {
    if let Some(rgb) = parse_hex(color_str) {
        return Ok(rgb.into());
    }

    match color_str.to_lowercase().as_str() {
        "black" => Ok(Color::Black),
        "red" => Ok(Color::Red),
        "green" => Ok(Color::Green),
        "yellow" => Ok(Color::Yellow),
        "blue" => Ok(Color::Blue),
        "magenta" => Ok(Color::Magenta),
        "cyan" => Ok(Color::Cyan),
        "white" => Ok(Color::White),
        "gray" | "grey" => Ok(Color::Gray),
        "darkgray" | "darkgrey" | "dark_gray" | "dark_grey" => Ok(Color::DarkGray),
        "lightred" | "light_red" => Ok(Color::LightRed),
        "lightgreen" | "light_green" => Ok(Color::LightGreen),
        "lightyellow" | "light_yellow" => Ok(Color::LightYellow),
        "lightblue" | "light_blue" => Ok(Color::LightBlue),
        "lightmagenta" | "light_magenta" => Ok(Color::LightMagenta),
        "lightcyan" | "light_cyan" => Ok(Color::LightCyan),
        "reset" => Ok(Color::Reset),
        _ => Err(ThemeError::InvalidColor(color_str.to_string())),
    }
}

impl CompiledTheme {
    /// Get a style for a component, falling back to default if not found.
    /// A missing token is a theme-file defect, never a runtime failure.
    pub fn style(&self, component: Component) -> Style {
        self.styles.get(&component).copied().unwrap_or_default()
    }

    pub fn get_background_color(&self) -> Option<Color> {
        self.background_color
    }

    pub fn dim_text(&self) -> Style {
        self.style(Component::DimText)
    }

    pub fn error_text(&self) -> Style {
        self.style(Component::ErrorText)
    }

    /// Built-in theme for a color mode, used when no theme file is loaded.
    pub fn default_for(mode: ColorMode) -> Self {
        create_default_theme(mode)
    }
}

impl Default for CompiledTheme {
    fn default() -> Self {
        create_default_theme(ColorMode::Light)
    }
}

/// Brand accent carried over from the product palette.
const BRAND: Color = Color::Rgb(0x71, 0x2c, 0xf9);
const BRAND_LIGHT: Color = Color::Rgb(0x8a, 0x45, 0xff);

fn create_default_theme(mode: ColorMode) -> CompiledTheme {
    let mut styles = HashMap::new();

    let (user_accent, text_dim, quote_bg, code_bg) = match mode {
        ColorMode::Light => (
            Color::Rgb(0x31, 0x82, 0xce),
            Color::DarkGray,
            Color::Rgb(0xed, 0xf2, 0xf7),
            Color::Rgb(0xed, 0xf2, 0xf7),
        ),
        ColorMode::Dark => (
            Color::Rgb(0x63, 0xb3, 0xed),
            Color::Gray,
            Color::Rgb(0x2d, 0x37, 0x48),
            Color::Black,
        ),
    };
    let assistant_accent = match mode {
        ColorMode::Light => BRAND,
        ColorMode::Dark => BRAND_LIGHT,
    };

    styles.insert(Component::UserMessage, Style::default());
    styles.insert(
        Component::UserMessageRole,
        Style::default().fg(user_accent).add_modifier(Modifier::BOLD),
    );
    styles.insert(Component::AssistantMessage, Style::default());
    styles.insert(
        Component::AssistantMessageRole,
        Style::default()
            .fg(assistant_accent)
            .add_modifier(Modifier::BOLD),
    );

    styles.insert(Component::Timestamp, Style::default().fg(text_dim));
    styles.insert(
        Component::ThinkingIndicator,
        Style::default().fg(text_dim).add_modifier(Modifier::ITALIC),
    );
    styles.insert(Component::StreamCursor, Style::default().fg(user_accent));

    styles.insert(Component::DimText, Style::default().fg(text_dim));
    styles.insert(Component::ErrorText, Style::default().fg(Color::Red));

    styles.insert(
        Component::MarkdownH1,
        Style::default().fg(assistant_accent),
    );
    styles.insert(
        Component::MarkdownH2,
        Style::default().fg(assistant_accent),
    );
    styles.insert(
        Component::MarkdownH3,
        Style::default().fg(assistant_accent),
    );
    styles.insert(Component::MarkdownH4, Style::default().fg(user_accent));
    styles.insert(Component::MarkdownH5, Style::default().fg(user_accent));
    styles.insert(Component::MarkdownH6, Style::default().fg(text_dim));
    styles.insert(Component::MarkdownParagraph, Style::default());
    styles.insert(Component::MarkdownCode, Style::default().bg(code_bg));
    styles.insert(Component::MarkdownCodeBlock, Style::default().bg(code_bg));
    styles.insert(Component::MarkdownLink, Style::default().fg(user_accent));
    styles.insert(
        Component::MarkdownBlockquote,
        Style::default().fg(text_dim).bg(quote_bg),
    );
    styles.insert(Component::MarkdownListBullet, Style::default().fg(text_dim));
    styles.insert(
        Component::MarkdownListNumber,
        Style::default().fg(user_accent),
    );
    styles.insert(Component::MarkdownRule, Style::default().fg(text_dim));
    styles.insert(Component::MarkdownImage, Style::default().fg(text_dim));

    styles.insert(Component::MarkdownTableBorder, Style::default().fg(text_dim));
    styles.insert(
        Component::MarkdownTableHeader,
        Style::default()
            .fg(assistant_accent)
            .add_modifier(Modifier::BOLD),
    );
    styles.insert(Component::MarkdownTableCell, Style::default());

    CompiledTheme {
        name: match mode {
            ColorMode::Light => "default-light".to_string(),
            ColorMode::Dark => "default-dark".to_string(),
        },
        mode,
        styles,
        background_color: None,
        syntax_theme: SYNTAX_THEMES
            .themes
            .get(mode.syntax_theme_name())
            .cloned(),
    }
}
