//! Command-line arguments.

use std::path::PathBuf;

use clap::Parser;

use glyphterm_core::{Result, TermConfig};

/// A bitmap-font terminal window running your login shell
#[derive(Parser, Debug, Default)]
#[command(name = "glyphterm")]
#[command(about = "A bitmap-font terminal window running your login shell", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to a YAML configuration file
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Font atlas image (256 glyphs)
    #[arg(long, value_name = "PATH")]
    pub font: Option<PathBuf>,

    /// Grid rows
    #[arg(long)]
    pub rows: Option<u16>,

    /// Grid columns
    #[arg(long)]
    pub cols: Option<u16>,

    /// Shell to run instead of the login shell
    #[arg(long, value_name = "PATH")]
    pub shell: Option<String>,

    /// Log filter (trace, debug, info, warn, error); RUST_LOG takes precedence
    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<String>,
}

impl Cli {
    /// Load the configuration file, if any, and apply command-line overrides.
    pub fn load_config(&self) -> Result<TermConfig> {
        let mut config = match &self.config {
            Some(path) => TermConfig::from_file(path)?,
            None => TermConfig::default(),
        };

        if let Some(font) = &self.font {
            config.font.atlas_path = font.clone();
        }
        if let Some(rows) = self.rows {
            config.terminal.rows = rows;
        }
        if let Some(cols) = self.cols {
            config.terminal.cols = cols;
        }
        if let Some(shell) = &self.shell {
            config.terminal.shell = Some(shell.clone());
        }
        if let Some(level) = &self.log_level {
            config.log_level = level.clone();
        }

        config.validate()?;
        Ok(config)
    }
}
