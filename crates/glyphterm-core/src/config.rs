//! Configuration types for glyphterm.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::{ArrowLayout, Dimensions, Error};

/// Top-level configuration loaded from a YAML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TermConfig {
    /// Terminal settings
    pub terminal: TerminalSettings,
    /// Font atlas settings
    pub font: FontSettings,
    /// Window settings
    pub window: WindowSettings,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Default for TermConfig {
    fn default() -> Self {
        Self {
            terminal: TerminalSettings::default(),
            font: FontSettings::default(),
            window: WindowSettings::default(),
            log_level: "info".to_string(),
        }
    }
}

impl TermConfig {
    /// Load configuration from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML string.
    pub fn from_yaml(yaml: &str) -> crate::Result<Self> {
        let config: TermConfig =
            serde_yaml::from_str(yaml).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values.
    pub fn validate(&self) -> crate::Result<()> {
        if self.terminal.rows == 0 || self.terminal.cols == 0 {
            return Err(Error::InvalidDimensions {
                rows: self.terminal.rows,
                cols: self.terminal.cols,
            });
        }

        if self.terminal.term.trim().is_empty() {
            return Err(Error::Config("terminal.term cannot be empty".to_string()));
        }

        if self.font.glyph_width == 0 || self.font.glyph_height == 0 {
            return Err(Error::Config(
                "font glyph dimensions must be > 0".to_string(),
            ));
        }

        if self.font.atlas_columns == 0 || self.font.atlas_columns > 256 {
            return Err(Error::Config(
                "font.atlas_columns must be between 1 and 256".to_string(),
            ));
        }

        Ok(())
    }

    /// Grid dimensions.
    pub fn dimensions(&self) -> Dimensions {
        Dimensions::new(self.terminal.rows, self.terminal.cols)
    }
}

/// Terminal settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TerminalSettings {
    /// Grid rows
    pub rows: u16,
    /// Grid columns
    pub cols: u16,
    /// TERM environment variable value for the child
    pub term: String,
    /// Shell override (None = login shell from the account database)
    pub shell: Option<String>,
    /// Start the shell as a login shell (reads the profile scripts)
    pub login_shell: bool,
    /// Encoding of the horizontal arrow keys
    pub arrow_layout: ArrowLayout,
}

impl Default for TerminalSettings {
    fn default() -> Self {
        Self {
            rows: 25,
            cols: 80,
            term: "xterm".to_string(),
            shell: None,
            login_shell: true,
            arrow_layout: ArrowLayout::Standard,
        }
    }
}

/// Bitmap font atlas settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FontSettings {
    /// PNG image holding the glyphs
    pub atlas_path: PathBuf,
    /// Glyph width in pixels
    pub glyph_width: u32,
    /// Glyph height in pixels
    pub glyph_height: u32,
    /// Glyphs per atlas row
    pub atlas_columns: u32,
}

impl Default for FontSettings {
    fn default() -> Self {
        Self {
            atlas_path: PathBuf::from("font.png"),
            glyph_width: 8,
            glyph_height: 16,
            atlas_columns: 32,
        }
    }
}

/// Window settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowSettings {
    /// Initial window title
    pub title: String,
    /// Border padding left and right of the grid, in pixels
    pub horizontal_padding: u32,
    /// Border padding above and below the grid, in pixels
    pub vertical_padding: u32,
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self {
            title: "glyphterm".to_string(),
            horizontal_padding: 8,
            vertical_padding: 8,
        }
    }
}
