//! Color tables and palette lookups
use std::collections::HashMap;
use std::error;
use std::fmt;
use std::io;

use traits::{Encodable, WriteBytesExt};
use types::{Color, EncodingError};

/// Maximum number of entries in a color table
pub const MAX_COLORS: usize = 256;

/// Non-fatal conditions reported when a color could not be added.
///
/// The table is left unchanged in both cases.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum PaletteWarning {
    /// The table already holds 256 colors
    Overflow,
    /// The global color table flag is not set
    Disabled,
}

impl fmt::Display for PaletteWarning {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match *self {
            PaletteWarning::Overflow => "color table is full, color was not added",
            PaletteWarning::Disabled => "global color table flag is disabled, color was not added",
        })
    }
}

impl error::Error for PaletteWarning {}

/// An ordered table of at most 256 colors.
///
/// The position of a color is its palette index.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColorTable {
    colors: Vec<Color>,
}

impl ColorTable {
    pub fn new() -> ColorTable {
        ColorTable { colors: Vec::new() }
    }

    /// Appends a color unless the table is full
    pub fn add_color(&mut self, color: Color) -> Result<(), PaletteWarning> {
        if self.colors.len() >= MAX_COLORS {
            warn!("{} ({})", PaletteWarning::Overflow, color);
            return Err(PaletteWarning::Overflow)
        }
        self.colors.push(color);
        Ok(())
    }

    pub fn colors(&self) -> &[Color] {
        &self.colors
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// The color closest to `target`
    pub fn nearest_color(&self, target: &Color) -> Result<Color, EncodingError> {
        nearest_color(&self.colors, target).map(|(_, color)| color)
    }

    /// Palette index of the color closest to `target`
    pub fn nearest_index(&self, target: &Color) -> Result<u8, EncodingError> {
        nearest_color(&self.colors, target).map(|(idx, _)| idx as u8)
    }

    /// Value of the 3 bit size field needed to address this table
    pub fn size_flag(&self) -> u8 {
        flag_size(self.colors.len())
    }

    /// Writes the table padded with black up to `2^(size + 1)` entries.
    ///
    /// `size` is raised if the table does not fit. Returns the size written.
    pub fn write_padded<W: io::Write + ?Sized>(&self, w: &mut W, size: u8) -> io::Result<u8> {
        let size = ::std::cmp::max(size & 0b111, self.size_flag());
        self.write_to(w)?;
        for _ in self.colors.len()..(2 << size) {
            w.write_all(&[0, 0, 0])?;
        }
        Ok(size)
    }
}

impl Encodable for ColorTable {
    fn write_to<W: io::Write + ?Sized>(&self, w: &mut W) -> io::Result<()> {
        for color in &self.colors {
            color.write_to(w)?;
        }
        Ok(())
    }
}

/// Finds the color in `colors` with the smallest L1 distance to `target`.
///
/// Ties resolve to the lowest index. Returns the index and the color.
pub fn nearest_color(colors: &[Color], target: &Color) -> Result<(usize, Color), EncodingError> {
    let mut best = None;
    let mut min_distance = u32::max_value();
    for (i, color) in colors.iter().enumerate() {
        let distance = color.distance(target);
        if distance < min_distance {
            min_distance = distance;
            best = Some((i, *color));
            if distance == 0 {
                break
            }
        }
    }
    best.ok_or(EncodingError::EmptyPalette)
}

// Color table size converted to flag bits
pub fn flag_size(size: usize) -> u8 {
    (0..7).find(|&n| (2usize << n) >= size).unwrap_or(7)
}

/// Maps pixel colors to indices of the active palette
pub struct PixelIndexer<'a> {
    palette: &'a [Color],
    cache: HashMap<Color, u8>,
}

impl<'a> PixelIndexer<'a> {
    pub fn new(palette: &'a [Color]) -> Result<PixelIndexer<'a>, EncodingError> {
        if palette.is_empty() {
            return Err(EncodingError::EmptyPalette)
        }
        if palette.len() > MAX_COLORS {
            return Err(EncodingError::IndexOverflow("palette has more than 256 colors"))
        }
        Ok(PixelIndexer {
            palette: palette,
            cache: HashMap::new(),
        })
    }

    /// Palette index of the color nearest to `pixel`
    pub fn index_of(&mut self, pixel: &Color) -> Result<u8, EncodingError> {
        if let Some(&idx) = self.cache.get(pixel) {
            return Ok(idx)
        }
        let (idx, _) = nearest_color(self.palette, pixel)?;
        self.cache.insert(*pixel, idx as u8);
        Ok(idx as u8)
    }

    pub fn palette_len(&self) -> usize {
        self.palette.len()
    }
}

#[cfg(test)]
mod test {
    use traits::Encodable;
    use types::{Color, EncodingError};
    use super::*;

    fn table() -> ColorTable {
        let mut table = ColorTable::new();
        for c in &[Color::new(0, 0, 0), Color::new(255, 255, 255), Color::new(10, 20, 30)] {
            table.add_color(*c).unwrap();
        }
        table
    }

    #[test]
    fn nearest() {
        let table = table();
        assert_eq!(table.nearest_color(&Color::new(50, 50, 50)).unwrap(), Color::new(10, 20, 30));
        assert_eq!(table.nearest_color(&Color::new(1, 1, 1)).unwrap(), Color::new(0, 0, 0));
        assert_eq!(table.nearest_index(&Color::new(250, 250, 250)).unwrap(), 1);
    }

    #[test]
    fn nearest_is_minimal() {
        let table = table();
        for &(r, g, b) in &[(7, 99, 3), (128, 128, 128), (200, 10, 40), (10, 20, 30)] {
            let target = Color::new(r, g, b);
            let best = table.nearest_color(&target).unwrap();
            assert!(table.colors().contains(&best));
            for c in table.colors() {
                assert!(best.distance(&target) <= c.distance(&target));
            }
        }
    }

    #[test]
    fn ties_resolve_to_first() {
        let colors = [Color::new(10, 0, 0), Color::new(0, 10, 0), Color::new(5, 5, 0)];
        let (idx, color) = nearest_color(&colors, &Color::new(5, 5, 0)).unwrap();
        assert_eq!((idx, color), (2, Color::new(5, 5, 0)));
        let (idx, _) = nearest_color(&colors[..2], &Color::new(5, 5, 0)).unwrap();
        assert_eq!(idx, 0);
    }

    #[test]
    fn empty_palette() {
        match ColorTable::new().nearest_color(&Color::default()) {
            Err(EncodingError::EmptyPalette) => (),
            other => panic!("{:?}", other),
        }
        assert!(PixelIndexer::new(&[]).is_err());
    }

    #[test]
    fn buffer() {
        let mut table = ColorTable::new();
        for i in 0..3 {
            table.add_color(Color::new(i, i, i)).unwrap();
        }
        assert_eq!(table.to_buffer().unwrap(), [0, 0, 0, 1, 1, 1, 2, 2, 2]);
    }

    #[test]
    fn overflow_is_rejected() {
        let mut table = ColorTable::new();
        for i in 0..256 {
            table.add_color(Color::new(i, 0, 0)).unwrap();
        }
        assert_eq!(table.add_color(Color::new(1, 2, 3)), Err(PaletteWarning::Overflow));
        assert_eq!(table.len(), 256);
        assert_eq!(table.colors()[255], Color::new(255, 0, 0));
    }

    #[test]
    fn padding() {
        let table = table();
        let mut buf = Vec::new();
        assert_eq!(table.write_padded(&mut buf, 0).unwrap(), 1);
        assert_eq!(buf.len(), 12);
        assert_eq!(&buf[9..], [0, 0, 0]);
        buf.clear();
        assert_eq!(table.write_padded(&mut buf, 7).unwrap(), 7);
        assert_eq!(buf.len(), 768);
    }

    #[test]
    fn size_flags() {
        assert_eq!(flag_size(0), 0);
        assert_eq!(flag_size(2), 0);
        assert_eq!(flag_size(3), 1);
        assert_eq!(flag_size(16), 3);
        assert_eq!(flag_size(17), 4);
        assert_eq!(flag_size(256), 7);
    }

    #[test]
    fn indexer_caches_lookups() {
        let table = table();
        let mut indexer = PixelIndexer::new(table.colors()).unwrap();
        assert_eq!(indexer.index_of(&Color::new(9, 21, 30)).unwrap(), 2);
        assert_eq!(indexer.index_of(&Color::new(9, 21, 30)).unwrap(), 2);
        assert_eq!(indexer.index_of(&Color::new(240, 255, 255)).unwrap(), 1);
        assert_eq!(indexer.palette_len(), 3);
    }
}
