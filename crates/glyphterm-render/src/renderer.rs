//! Dirty-gated grid renderer.

use tracing::{debug, trace};

use glyphterm_core::{Dimensions, Error, Result, WindowSettings};
use glyphterm_emulator::Grid;

use crate::atlas::FontAtlas;
use crate::frame::{FrameBuffer, Rect, BACKGROUND};

/// Receives finished frames and window-level notifications.
pub trait Presenter {
    /// Show a completed frame.
    fn present(&mut self, frame: &FrameBuffer) -> Result<()>;

    /// Change the window title.
    fn set_title(&mut self, _title: &str) {}

    /// Ring the bell.
    fn bell(&mut self) {}
}

/// Pixel padding around the cell area.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Padding {
    /// Left and right padding
    pub horizontal: u32,
    /// Top and bottom padding
    pub vertical: u32,
}

impl Padding {
    /// Create padding from horizontal and vertical amounts.
    pub fn new(horizontal: u32, vertical: u32) -> Self {
        Self {
            horizontal,
            vertical,
        }
    }
}

impl From<&WindowSettings> for Padding {
    fn from(settings: &WindowSettings) -> Self {
        Self::new(settings.horizontal_padding, settings.vertical_padding)
    }
}

/// Pixel size of a frame showing `dimensions` cells.
pub fn frame_size(
    dimensions: Dimensions,
    glyph_width: u32,
    glyph_height: u32,
    padding: Padding,
) -> (u32, u32) {
    (
        dimensions.cols as u32 * glyph_width + 2 * padding.horizontal,
        dimensions.rows as u32 * glyph_height + 2 * padding.vertical,
    )
}

/// Draws a [`Grid`] into a frame with a [`FontAtlas`].
///
/// Redraws happen only when the renderer has been marked dirty since the
/// last presented frame. A new renderer starts dirty so the first frame is
/// always drawn.
#[derive(Debug)]
pub struct Renderer {
    dimensions: Dimensions,
    atlas: FontAtlas,
    padding: Padding,
    frame: FrameBuffer,
    dirty: bool,
    frames: u64,
}

impl Renderer {
    /// Create a renderer for a grid of the given dimensions.
    pub fn new(dimensions: Dimensions, atlas: FontAtlas, padding: Padding) -> Self {
        let (width, height) = frame_size(
            dimensions,
            atlas.glyph_width(),
            atlas.glyph_height(),
            padding,
        );
        debug!(
            "Renderer for {} cells, frame {}x{}",
            dimensions, width, height
        );
        Self {
            dimensions,
            atlas,
            padding,
            frame: FrameBuffer::new(width, height),
            dirty: true,
            frames: 0,
        }
    }

    /// Grid dimensions this renderer draws.
    pub fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    /// Frame width and height in pixels.
    pub fn frame_size(&self) -> (u32, u32) {
        (self.frame.width(), self.frame.height())
    }

    /// Last drawn frame.
    pub fn frame(&self) -> &FrameBuffer {
        &self.frame
    }

    /// The font atlas.
    pub fn atlas(&self) -> &FontAtlas {
        &self.atlas
    }

    /// Number of frames presented so far.
    pub fn frames_presented(&self) -> u64 {
        self.frames
    }

    /// Request a redraw on the next [`Renderer::redraw_if_dirty`].
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Whether a redraw is pending.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Redraw and present if dirty. Returns whether a frame was presented.
    ///
    /// The dirty flag is cleared only after the presenter accepted the
    /// frame, so a failed present is retried on the next call.
    pub fn redraw_if_dirty(&mut self, grid: &Grid, presenter: &mut dyn Presenter) -> Result<bool> {
        if !self.dirty {
            return Ok(false);
        }
        self.draw(grid)?;
        presenter.present(&self.frame)?;
        self.dirty = false;
        self.frames += 1;
        trace!("Presented frame {}", self.frames);
        Ok(true)
    }

    /// Draw every cell of `grid` into the frame without presenting it.
    pub fn draw(&mut self, grid: &Grid) -> Result<()> {
        if grid.dimensions() != self.dimensions {
            return Err(Error::GridMismatch {
                expected: self.dimensions,
                actual: grid.dimensions(),
            });
        }

        self.frame.clear(BACKGROUND);

        let glyph_width = self.atlas.glyph_width();
        let glyph_height = self.atlas.glyph_height();
        for row in 0..self.dimensions.rows {
            let Some(cells) = grid.row(row) else {
                continue;
            };
            let dst_y = self.padding.vertical + row as u32 * glyph_height;
            for (col, cell) in cells.iter().enumerate() {
                let (src_x, src_y) = self.atlas.glyph_origin(cell.glyph());
                let dst_x = self.padding.horizontal + col as u32 * glyph_width;
                self.frame.blit(
                    &self.atlas,
                    Rect::new(src_x, src_y, glyph_width, glyph_height),
                    dst_x,
                    dst_y,
                );
            }
        }
        Ok(())
    }
}
