//! Unified error types for gfx_text32

use thiserror::Error;

use crate::{BitmapHandle, FontId};

/// Main error type for text layout and bitmap composition
#[derive(Debug, Error)]
pub enum EngineError {
    // === Font Errors ===
    #[error("Font {id} not found")]
    FontNotFound { id: FontId },

    // === Bitmap Errors ===
    #[error("Invalid bitmap size {width}x{height}")]
    InvalidBitmapSize { width: i32, height: i32 },

    #[error("Unknown bitmap handle {handle}")]
    UnknownBitmap { handle: BitmapHandle },

    #[error("No bitmap has been composed yet")]
    NoActiveBitmap,

    #[error("Cel pixel data mismatch: expected {expected} pixels, got {actual}")]
    InvalidCel { expected: usize, actual: usize },

    // === Scaling Errors ===
    #[error("Invalid scale: script {script_width}x{script_height}, scaled {scaled_width}x{scaled_height}")]
    InvalidScale {
        script_width: i32,
        script_height: i32,
        scaled_width: i32,
        scaled_height: i32,
    },

    // === Settings Errors ===
    #[error("Invalid text settings: {0}")]
    Settings(#[from] toml::de::Error),

    #[error("Failed to write text settings: {0}")]
    SettingsWrite(#[from] toml::ser::Error),
}

/// Result type alias for gfx_text32 operations
pub type Result<T> = std::result::Result<T, EngineError>;
