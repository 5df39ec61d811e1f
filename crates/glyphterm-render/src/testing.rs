//! Testing utilities for glyphterm rendering.
//!
//! Provides an in-memory atlas and a presenter that records what it was
//! asked to show, so render loops can be exercised without a window.

use glyphterm_core::{Error, Result};

use crate::atlas::{FontAtlas, GLYPH_COUNT};
use crate::frame::FrameBuffer;
use crate::renderer::Presenter;

/// Atlas whose pixel values are their own index, so every glyph differs.
pub fn numbered_atlas(glyph_width: u32, glyph_height: u32, columns: u32) -> FontAtlas {
    let width = columns * glyph_width;
    let height = GLYPH_COUNT.div_ceil(columns) * glyph_height;
    let pixels = (0..width * height).collect();
    match FontAtlas::from_pixels(width, height, pixels, glyph_width, glyph_height, columns) {
        Ok(atlas) => atlas,
        Err(e) => panic!("numbered atlas is always valid: {e}"),
    }
}

/// Presenter keeping counts and the last frame.
#[derive(Debug, Default)]
pub struct RecordingPresenter {
    /// Frames presented
    pub frames: usize,
    /// Copy of the most recent frame
    pub last_frame: Option<FrameBuffer>,
    /// Titles set, in order
    pub titles: Vec<String>,
    /// Bells rung
    pub bells: usize,
    /// Fail every present call
    pub fail: bool,
}

impl Presenter for RecordingPresenter {
    fn present(&mut self, frame: &FrameBuffer) -> Result<()> {
        if self.fail {
            return Err(Error::Frontend("present failed".to_string()));
        }
        self.frames += 1;
        self.last_frame = Some(frame.clone());
        Ok(())
    }

    fn set_title(&mut self, title: &str) {
        self.titles.push(title.to_string());
    }

    fn bell(&mut self) {
        self.bells += 1;
    }
}
