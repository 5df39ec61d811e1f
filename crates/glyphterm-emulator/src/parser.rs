//! ANSI/VT escape sequence parser using the VTE crate.
//!
//! The parser owns the grid and a single `vte::Parser` state machine that
//! persists between [`Parser::feed`] calls, so a sequence split across two
//! PTY reads is decoded exactly as if it had arrived in one.

use tracing::{debug, trace};
use vte::{Params, Perform};

use glyphterm_core::{Cell, Dimensions};

use crate::grid::Grid;

/// Glyph drawn for characters outside the 8-bit atlas.
const REPLACEMENT_GLYPH: u8 = b'?';

/// Bit layout of the attribute word the parser packs into each cell.
///
/// The renderer treats these bits as opaque.
pub mod attr {
    /// Bold / increased intensity
    pub const BOLD: u64 = 1 << 0;
    /// Underline
    pub const UNDERLINE: u64 = 1 << 1;
    /// Blink
    pub const BLINK: u64 = 1 << 2;
    /// Reverse video
    pub const REVERSE: u64 = 1 << 3;

    /// Foreground palette index + 1 (0 = default)
    pub const FG_SHIFT: u32 = 8;
    /// Background palette index + 1 (0 = default)
    pub const BG_SHIFT: u32 = 17;
    /// Width mask of a color field
    pub const COLOR_MASK: u64 = 0x1ff;

    /// Pack a palette index into a color field value.
    pub fn color(index: u8) -> u64 {
        index as u64 + 1
    }
}

/// Callbacks the parser invokes on its host.
pub trait Host {
    /// The child rang the bell (BEL).
    fn bell(&mut self);

    /// The child set the window title (OSC 0 / OSC 2).
    fn set_title(&mut self, title: &str);

    /// The parser must send bytes back to the child (e.g. cursor reports).
    fn write(&mut self, bytes: &[u8]);
}

/// Host that ignores every callback.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullHost;

impl Host for NullHost {
    fn bell(&mut self) {}
    fn set_title(&mut self, _title: &str) {}
    fn write(&mut self, _bytes: &[u8]) {}
}

/// ANSI parser wrapping the VTE state machine.
pub struct Parser {
    /// VTE state, kept across feeds
    state: vte::Parser,
    /// Terminal grid state
    grid: Grid,
    /// Attribute applied to newly printed cells
    attribute: u64,
}

impl std::fmt::Debug for Parser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Parser")
            .field("grid", &self.grid)
            .field("attribute", &self.attribute)
            .finish_non_exhaustive()
    }
}

impl Parser {
    /// Create a parser over a blank grid of the given dimensions.
    pub fn init(dimensions: Dimensions) -> Self {
        Self::new(Grid::new(dimensions))
    }

    /// Create a new parser with the given grid.
    pub fn new(grid: Grid) -> Self {
        Self {
            state: vte::Parser::new(),
            grid,
            attribute: 0,
        }
    }

    /// Get a reference to the grid.
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Get a mutable reference to the grid.
    pub fn grid_mut(&mut self) -> &mut Grid {
        &mut self.grid
    }

    /// Consume the parser and return the grid.
    pub fn into_grid(self) -> Grid {
        self.grid
    }

    /// Process bytes through the VTE parser.
    ///
    /// Returns the number of grid rows whose contents changed; zero means
    /// no redraw is needed.
    pub fn feed(&mut self, bytes: &[u8], host: &mut dyn Host) -> usize {
        let mut performer = Performer {
            grid: &mut self.grid,
            attribute: &mut self.attribute,
            host,
        };
        for byte in bytes {
            self.state.advance(&mut performer, *byte);
        }
        let changed = self.grid.take_dirty_rows();
        trace!("Fed {} bytes, {} rows changed", bytes.len(), changed);
        changed
    }

    /// Resizing is not supported; the grid keeps its configured size.
    pub fn resize(&mut self, dimensions: Dimensions) {
        debug!(
            "Ignoring resize request to {} (grid stays {})",
            dimensions,
            self.grid.dimensions()
        );
    }
}

/// Borrowed view handed to VTE for the duration of one feed.
struct Performer<'a, 'h> {
    grid: &'a mut Grid,
    attribute: &'a mut u64,
    host: &'a mut (dyn Host + 'h),
}

/// First parameter of a CSI sequence, with 0 and missing mapped to `default`.
fn first_param(params: &Params, default: u16) -> u16 {
    match params.iter().next().map(|p| p[0]) {
        None | Some(0) => default,
        Some(n) => n,
    }
}

impl Performer<'_, '_> {
    /// Move cursor down one row, scrolling at the bottom edge.
    fn line_feed(&mut self) {
        let dims = self.grid.dimensions();
        let pos = self.grid.cursor().position;
        if pos.row + 1 >= dims.rows {
            self.grid.scroll_up(1);
        } else {
            self.grid.move_cursor(pos.row + 1, pos.col);
        }
    }

    /// Move cursor up one row, scrolling at the top edge.
    fn reverse_index(&mut self) {
        let pos = self.grid.cursor().position;
        if pos.row == 0 {
            self.grid.scroll_down(1);
        } else {
            self.grid.move_cursor(pos.row - 1, pos.col);
        }
    }

    fn move_relative(&mut self, rows: i32, cols: i32) {
        let pos = self.grid.cursor().position;
        let clamp = |v: i32| v.clamp(0, u16::MAX as i32) as u16;
        self.grid
            .move_cursor(clamp(pos.row as i32 + rows), clamp(pos.col as i32 + cols));
    }

    fn set_color(&mut self, shift: u32, value: u64) {
        *self.attribute &= !(attr::COLOR_MASK << shift);
        *self.attribute |= (value & attr::COLOR_MASK) << shift;
    }

    /// Process SGR (Select Graphic Rendition) parameters.
    fn process_sgr(&mut self, params: &Params) {
        let mut iter = params.iter();

        if params.is_empty() {
            *self.attribute = 0;
            return;
        }

        while let Some(param) = iter.next() {
            match param[0] {
                0 => *self.attribute = 0,
                1 => *self.attribute |= attr::BOLD,
                4 => *self.attribute |= attr::UNDERLINE,
                5 => *self.attribute |= attr::BLINK,
                7 => *self.attribute |= attr::REVERSE,
                22 => *self.attribute &= !attr::BOLD,
                24 => *self.attribute &= !attr::UNDERLINE,
                25 => *self.attribute &= !attr::BLINK,
                27 => *self.attribute &= !attr::REVERSE,

                n @ 30..=37 => self.set_color(attr::FG_SHIFT, attr::color((n - 30) as u8)),
                39 => self.set_color(attr::FG_SHIFT, 0),
                n @ 40..=47 => self.set_color(attr::BG_SHIFT, attr::color((n - 40) as u8)),
                49 => self.set_color(attr::BG_SHIFT, 0),
                n @ 90..=97 => self.set_color(attr::FG_SHIFT, attr::color((n - 90 + 8) as u8)),
                n @ 100..=107 => {
                    self.set_color(attr::BG_SHIFT, attr::color((n - 100 + 8) as u8))
                }

                // 256-color (38;5;n / 48;5;n); true color is not representable
                n @ (38 | 48) => {
                    let shift = if n == 38 {
                        attr::FG_SHIFT
                    } else {
                        attr::BG_SHIFT
                    };
                    match iter.next().map(|p| p[0]) {
                        Some(5) => {
                            if let Some(index) = iter.next() {
                                self.set_color(shift, attr::color(index[0] as u8));
                            }
                        }
                        Some(2) => {
                            iter.next();
                            iter.next();
                            iter.next();
                        }
                        _ => {}
                    }
                }

                _ => {} // Ignore unknown SGR codes
            }
        }
    }

    /// Device status report.
    fn device_status(&mut self, params: &Params) {
        match first_param(params, 0) {
            5 => self.host.write(b"\x1b[0n"),
            6 => {
                let pos = self.grid.cursor().position;
                let report = format!("\x1b[{};{}R", pos.row + 1, pos.col + 1);
                self.host.write(report.as_bytes());
            }
            _ => {}
        }
    }
}

impl Perform for Performer<'_, '_> {
    /// Print a character to the terminal.
    fn print(&mut self, c: char) {
        let glyph = u8::try_from(c as u32).unwrap_or(REPLACEMENT_GLYPH);
        let pos = self.grid.cursor().position;
        let dims = self.grid.dimensions();

        self.grid
            .set_cell(pos.row, pos.col, Cell::new(glyph, *self.attribute));

        if pos.col + 1 >= dims.cols {
            self.grid.move_cursor(pos.row, 0);
            self.line_feed();
        } else {
            self.grid.move_cursor(pos.row, pos.col + 1);
        }
    }

    /// Execute a control character.
    fn execute(&mut self, byte: u8) {
        match byte {
            // Bell (BEL)
            0x07 => self.host.bell(),

            // Backspace (BS)
            0x08 => self.move_relative(0, -1),

            // Horizontal Tab (HT)
            0x09 => {
                let pos = self.grid.cursor().position;
                let next_tab = ((pos.col / 8) + 1) * 8;
                self.grid.move_cursor(pos.row, next_tab);
            }

            // Line Feed (LF), Vertical Tab, Form Feed
            0x0A..=0x0C => self.line_feed(),

            // Carriage Return (CR)
            0x0D => {
                let row = self.grid.cursor().position.row;
                self.grid.move_cursor(row, 0);
            }

            _ => {} // Ignore other control codes
        }
    }

    fn hook(&mut self, _params: &Params, _intermediates: &[u8], _ignore: bool, _c: char) {}

    fn put(&mut self, _byte: u8) {}

    fn unhook(&mut self) {}

    /// OSC (Operating System Command) dispatch.
    fn osc_dispatch(&mut self, params: &[&[u8]], _bell_terminated: bool) {
        match params.first().copied() {
            Some(b"0") | Some(b"2") if params.len() > 1 => {
                let title = params[1..]
                    .iter()
                    .map(|p| String::from_utf8_lossy(p))
                    .collect::<Vec<_>>()
                    .join(";");
                self.host.set_title(&title);
            }
            _ => {}
        }
    }

    /// CSI (Control Sequence Introducer) dispatch.
    fn csi_dispatch(&mut self, params: &Params, intermediates: &[u8], _ignore: bool, c: char) {
        let dims = self.grid.dimensions();
        let pos = self.grid.cursor().position;

        if intermediates == b"?" {
            // DECTCEM show/hide cursor
            if (c == 'h' || c == 'l') && params.iter().any(|p| p[0] == 25) {
                self.grid.cursor_mut().visible = c == 'h';
            }
            return;
        }

        match c {
            // Cursor Up (CUU)
            'A' => self.move_relative(-(first_param(params, 1) as i32), 0),

            // Cursor Down (CUD)
            'B' => self.move_relative(first_param(params, 1) as i32, 0),

            // Cursor Forward (CUF)
            'C' => self.move_relative(0, first_param(params, 1) as i32),

            // Cursor Backward (CUB)
            'D' => self.move_relative(0, -(first_param(params, 1) as i32)),

            // Cursor Horizontal Absolute (CHA)
            'G' => self.grid.move_cursor(pos.row, first_param(params, 1) - 1),

            // Vertical Position Absolute (VPA)
            'd' => self.grid.move_cursor(first_param(params, 1) - 1, pos.col),

            // Cursor Position (CUP / HVP)
            'H' | 'f' => {
                let mut iter = params.iter();
                let row = iter.next().map(|p| p[0]).unwrap_or(1).max(1) - 1;
                let col = iter.next().map(|p| p[0]).unwrap_or(1).max(1) - 1;
                self.grid.move_cursor(row, col);
            }

            // Erase in Display (ED)
            'J' => match first_param(params, 0) {
                0 => {
                    self.grid.clear_cols(pos.row, pos.col, dims.cols);
                    self.grid.clear_rows(pos.row + 1, dims.rows);
                }
                1 => {
                    self.grid.clear_rows(0, pos.row);
                    self.grid.clear_cols(pos.row, 0, pos.col + 1);
                }
                2 | 3 => self.grid.clear(),
                _ => {}
            },

            // Erase in Line (EL)
            'K' => match first_param(params, 0) {
                0 => self.grid.clear_cols(pos.row, pos.col, dims.cols),
                1 => self.grid.clear_cols(pos.row, 0, pos.col + 1),
                2 => self.grid.clear_cols(pos.row, 0, dims.cols),
                _ => {}
            },

            // SGR (Select Graphic Rendition)
            'm' => self.process_sgr(params),

            // Device Status Report (DSR)
            'n' => self.device_status(params),

            // Primary Device Attributes (DA)
            'c' => self.host.write(b"\x1b[?1;2c"),

            // Save / Restore Cursor Position
            's' => self.grid.save_cursor(),
            'u' => self.grid.restore_cursor(),

            _ => trace!("Ignoring CSI {:?}", c),
        }
    }

    /// ESC (Escape) dispatch.
    fn esc_dispatch(&mut self, intermediates: &[u8], _ignore: bool, byte: u8) {
        if !intermediates.is_empty() {
            return;
        }
        match byte {
            // DECSC / DECRC
            b'7' => self.grid.save_cursor(),
            b'8' => self.grid.restore_cursor(),
            // Index
            b'D' => self.line_feed(),
            // Reverse Index
            b'M' => self.reverse_index(),
            // Full reset (RIS)
            b'c' => {
                self.grid.clear();
                self.grid.move_cursor(0, 0);
                *self.attribute = 0;
            }
            _ => {}
        }
    }
}
