//! Error types for the colloquy-tui crate

use std::io;
use thiserror::Error;

/// Result type alias for colloquy-tui operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for colloquy-tui
#[derive(Error, Debug)]
pub enum Error {
    /// Terminal I/O errors
    #[error("Terminal I/O error: {0}")]
    Io(#[from] io::Error),

    /// Theme loading and resolution errors
    #[error("Theme error: {0}")]
    Theme(#[from] crate::tui::theme::ThemeError),

    /// Rendering errors
    #[error("Rendering error: {0}")]
    Rendering(String),
}
