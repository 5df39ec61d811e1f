//! Software frame buffer.

use crate::atlas::FontAtlas;

/// Background color of cleared frames.
pub const BACKGROUND: u32 = 0x0000_0000;

/// Rectangle in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    /// Left edge
    pub x: u32,
    /// Top edge
    pub y: u32,
    /// Width
    pub w: u32,
    /// Height
    pub h: u32,
}

impl Rect {
    /// Create a new rectangle.
    pub fn new(x: u32, y: u32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }
}

/// Frame of `0x00RRGGBB` pixels, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameBuffer {
    width: u32,
    height: u32,
    pixels: Vec<u32>,
}

impl FrameBuffer {
    /// Create a frame filled with the background color.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![BACKGROUND; width as usize * height as usize],
        }
    }

    /// Frame width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Frame height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// All pixels, row-major.
    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    /// Pixel at a position.
    pub fn pixel(&self, x: u32, y: u32) -> Option<u32> {
        if x < self.width && y < self.height {
            Some(self.pixels[y as usize * self.width as usize + x as usize])
        } else {
            None
        }
    }

    /// Fill the whole frame with one color.
    pub fn clear(&mut self, color: u32) {
        self.pixels.fill(color);
    }

    /// Copy `src` from the atlas to `(dst_x, dst_y)`, clipped to both images.
    pub fn blit(&mut self, atlas: &FontAtlas, src: Rect, dst_x: u32, dst_y: u32) {
        if src.x >= atlas.width() || src.y >= atlas.height() {
            return;
        }
        if dst_x >= self.width || dst_y >= self.height {
            return;
        }
        let w = src
            .w
            .min(atlas.width() - src.x)
            .min(self.width - dst_x);
        let h = src
            .h
            .min(atlas.height() - src.y)
            .min(self.height - dst_y);

        for row in 0..h {
            let from = atlas.span(src.x, src.y + row, w);
            let start = (dst_y + row) as usize * self.width as usize + dst_x as usize;
            self.pixels[start..start + w as usize].copy_from_slice(from);
        }
    }
}
