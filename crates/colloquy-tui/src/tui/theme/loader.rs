//! Theme loading functionality

use super::{RawTheme, Theme, ThemeError};
use directories::ProjectDirs;
use std::fs;
use std::path::{Path, PathBuf};

/// Bundled themes included with the crate
const BUNDLED_THEMES: &[(&str, &str)] = &[
    (
        "default-light",
        include_str!("../../../themes/default-light.toml"),
    ),
    (
        "default-dark",
        include_str!("../../../themes/default-dark.toml"),
    ),
];

/// Theme loader responsible for finding and loading theme files
pub struct ThemeLoader {
    search_paths: Vec<PathBuf>,
}

impl ThemeLoader {
    /// Create a new theme loader with default search paths
    pub fn new() -> Self {
        let mut search_paths = Vec::new();

        if let Some(proj_dirs) = ProjectDirs::from("", "", "colloquy") {
            // Config directory (e.g., ~/.config/colloquy/themes on Linux)
            search_paths.push(proj_dirs.config_dir().join("themes"));

            // Data directory as fallback
            search_paths.push(proj_dirs.data_dir().join("themes"));
        }

        Self { search_paths }
    }

    /// Add a custom search path
    pub fn add_search_path(&mut self, path: PathBuf) {
        self.search_paths.push(path);
    }

    /// Load a theme by name
    pub fn load_theme(&self, name: &str) -> Result<Theme, ThemeError> {
        // Bundled themes take precedence. They skip the name-mismatch check
        // below: the table key is the name, and the validation test asserts
        // the two agree.
        for (theme_name, theme_content) in BUNDLED_THEMES {
            if theme_name == &name {
                let raw_theme: RawTheme = toml::from_str(theme_content)?;
                return raw_theme.into_theme();
            }
        }

        let theme_file = self.find_theme_file(name)?;
        let content = fs::read_to_string(&theme_file)?;
        let raw_theme: RawTheme = toml::from_str(&content)?;

        if raw_theme.name.to_lowercase() != name.to_lowercase() {
            return Err(ThemeError::Validation(format!(
                "Theme name mismatch: expected '{}', found '{}'",
                name, raw_theme.name
            )));
        }

        raw_theme.into_theme()
    }

    /// Load a theme from a specific file path
    pub fn load_theme_from_path(&self, path: &Path) -> Result<Theme, ThemeError> {
        let content = fs::read_to_string(path)?;
        let raw_theme: RawTheme = toml::from_str(&content)?;
        raw_theme.into_theme()
    }

    /// List all available themes
    pub fn list_themes(&self) -> Vec<String> {
        let mut themes = Vec::new();

        for (theme_name, _) in BUNDLED_THEMES {
            themes.push((*theme_name).to_string());
        }

        for search_path in &self.search_paths {
            if let Ok(entries) = fs::read_dir(search_path) {
                for entry in entries.flatten() {
                    let path = entry.path();
                    if !path.is_file() {
                        continue;
                    }
                    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                        continue;
                    };
                    if let Some(theme_name) = name.strip_suffix(".toml") {
                        if !themes.iter().any(|t| t == theme_name) {
                            themes.push(theme_name.to_string());
                        }
                    }
                }
            }
        }

        themes.sort();
        themes
    }

    /// Find a theme file by name in the search paths
    fn find_theme_file(&self, name: &str) -> Result<PathBuf, ThemeError> {
        let filename = format!("{name}.toml");

        for search_path in &self.search_paths {
            let theme_path = search_path.join(&filename);
            if theme_path.exists() {
                return Ok(theme_path);
            }
        }

        Err(ThemeError::Validation(format!(
            "Theme '{name}' not found in bundled themes or filesystem"
        )))
    }
}

impl Default for ThemeLoader {
    fn default() -> Self {
        Self::new()
    }
}
