//! Bitmap font atlas.
//!
//! The atlas is a single image holding 256 fixed-size glyphs laid out
//! left-to-right, top-to-bottom, `columns` glyphs per row. Glyph `i` lives
//! at `((i % columns) * glyph_width, (i / columns) * glyph_height)`.

use std::path::Path;

use tracing::info;

use glyphterm_core::{Error, FontSettings, Result};

/// Number of glyphs an atlas must provide.
pub const GLYPH_COUNT: u32 = 256;

/// Decoded font atlas in `0x00RRGGBB` pixels.
#[derive(Debug, Clone)]
pub struct FontAtlas {
    width: u32,
    height: u32,
    pixels: Vec<u32>,
    glyph_width: u32,
    glyph_height: u32,
    columns: u32,
}

impl FontAtlas {
    /// Load an atlas image from disk using the configured glyph layout.
    pub fn from_settings(settings: &FontSettings) -> Result<Self> {
        Self::load(
            &settings.atlas_path,
            settings.glyph_width,
            settings.glyph_height,
            settings.atlas_columns,
        )
    }

    /// Load an atlas image (PNG) from disk.
    pub fn load<P: AsRef<Path>>(
        path: P,
        glyph_width: u32,
        glyph_height: u32,
        columns: u32,
    ) -> Result<Self> {
        let path = path.as_ref();
        let image = image::open(path)
            .map_err(|e| Error::Atlas(format!("{}: {e}", path.display())))?
            .to_rgba8();

        let (width, height) = image.dimensions();
        let pixels = image
            .pixels()
            .map(|p| {
                let [r, g, b, a] = p.0;
                let scale = |c: u8| (c as u32 * a as u32) / 255;
                (scale(r) << 16) | (scale(g) << 8) | scale(b)
            })
            .collect();

        let atlas = Self::from_pixels(width, height, pixels, glyph_width, glyph_height, columns)?;
        info!(
            "Loaded font atlas {} ({}x{}, glyphs {}x{})",
            path.display(),
            width,
            height,
            glyph_width,
            glyph_height
        );
        Ok(atlas)
    }

    /// Build an atlas from already decoded pixels.
    pub fn from_pixels(
        width: u32,
        height: u32,
        pixels: Vec<u32>,
        glyph_width: u32,
        glyph_height: u32,
        columns: u32,
    ) -> Result<Self> {
        if glyph_width == 0 || glyph_height == 0 || columns == 0 {
            return Err(Error::Atlas(
                "glyph size and column count must be > 0".to_string(),
            ));
        }
        if pixels.len() != width as usize * height as usize {
            return Err(Error::Atlas(format!(
                "expected {} pixels for {}x{}, got {}",
                width as usize * height as usize,
                width,
                height,
                pixels.len()
            )));
        }

        let rows = GLYPH_COUNT.div_ceil(columns);
        let needed_width = columns.min(GLYPH_COUNT) * glyph_width;
        let needed_height = rows * glyph_height;
        if width < needed_width || height < needed_height {
            return Err(Error::Atlas(format!(
                "image is {width}x{height} but 256 glyphs of {glyph_width}x{glyph_height} \
                 in {columns} columns need {needed_width}x{needed_height}"
            )));
        }

        Ok(Self {
            width,
            height,
            pixels,
            glyph_width,
            glyph_height,
            columns,
        })
    }

    /// Image width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Image height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Glyph width in pixels.
    pub fn glyph_width(&self) -> u32 {
        self.glyph_width
    }

    /// Glyph height in pixels.
    pub fn glyph_height(&self) -> u32 {
        self.glyph_height
    }

    /// Glyphs per atlas row.
    pub fn columns(&self) -> u32 {
        self.columns
    }

    /// Top-left corner of a glyph's source rectangle.
    pub fn glyph_origin(&self, glyph: u8) -> (u32, u32) {
        let index = glyph as u32;
        (
            (index % self.columns) * self.glyph_width,
            (index / self.columns) * self.glyph_height,
        )
    }

    /// `len` pixels of row `y` starting at column `x`.
    pub(crate) fn span(&self, x: u32, y: u32, len: u32) -> &[u32] {
        let start = y as usize * self.width as usize + x as usize;
        &self.pixels[start..start + len as usize]
    }

    /// Pixel at a position.
    pub fn pixel(&self, x: u32, y: u32) -> Option<u32> {
        if x < self.width && y < self.height {
            Some(self.pixels[y as usize * self.width as usize + x as usize])
        } else {
            None
        }
    }
}
