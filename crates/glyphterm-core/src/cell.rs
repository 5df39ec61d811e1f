//! Packed cell representation for the terminal grid.

/// Number of bits reserved for the glyph index.
const GLYPH_BITS: u32 = 8;

/// Mask selecting the glyph index from a packed cell.
const GLYPH_MASK: u64 = 0xff;

/// Largest attribute value that fits beside the glyph index (56 bits).
pub const MAX_ATTRIBUTE: u64 = u64::MAX >> GLYPH_BITS;

/// Glyph used for empty cells.
pub const BLANK_GLYPH: u8 = b' ';

/// Single character cell in the terminal grid.
///
/// The low byte holds the glyph index into the font atlas. The upper
/// 56 bits hold an attribute value that the display core carries around
/// without interpreting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cell(u64);

impl Default for Cell {
    fn default() -> Self {
        Self::blank()
    }
}

impl Cell {
    /// Create a cell from a glyph index and attribute bits.
    ///
    /// Attribute bits above [`MAX_ATTRIBUTE`] are discarded.
    pub fn new(glyph: u8, attribute: u64) -> Self {
        Self(((attribute & MAX_ATTRIBUTE) << GLYPH_BITS) | glyph as u64)
    }

    /// An empty cell (space glyph, no attributes).
    pub fn blank() -> Self {
        Self::new(BLANK_GLYPH, 0)
    }

    /// Rebuild a cell from its packed representation.
    pub fn from_bits(bits: u64) -> Self {
        Self(bits)
    }

    /// Packed representation.
    pub fn bits(&self) -> u64 {
        self.0
    }

    /// Glyph index into the font atlas (0-255).
    pub fn glyph(&self) -> u8 {
        (self.0 & GLYPH_MASK) as u8
    }

    /// Opaque attribute bits.
    pub fn attribute(&self) -> u64 {
        self.0 >> GLYPH_BITS
    }

    /// Check if cell is blank (space glyph with no attributes).
    pub fn is_blank(&self) -> bool {
        *self == Self::blank()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_default_is_blank() {
        let cell = Cell::default();
        assert_eq!(cell.glyph(), b' ');
        assert_eq!(cell.attribute(), 0);
        assert!(cell.is_blank());
    }

    #[test]
    fn test_cell_packing() {
        let cell = Cell::new(b'A', 0x1234);
        assert_eq!(cell.glyph(), b'A');
        assert_eq!(cell.attribute(), 0x1234);
        assert_eq!(cell.bits(), (0x1234 << 8) | 0x41);
        assert!(!cell.is_blank());
    }

    #[test]
    fn test_cell_attribute_is_truncated_to_56_bits() {
        let cell = Cell::new(0xff, u64::MAX);
        assert_eq!(cell.glyph(), 0xff);
        assert_eq!(cell.attribute(), MAX_ATTRIBUTE);
    }

    #[test]
    fn test_cell_glyph_is_low_byte() {
        let cell = Cell::from_bits(0xdead_beef_0000_0142);
        assert_eq!(cell.glyph(), 0x42);
        assert_eq!(cell.attribute(), 0xdead_beef_0000_01);
    }
}
