//! Table based image data
use std::cmp;
use std::collections::{HashMap, HashSet};
use std::io;

use traits::{Encodable, WriteBytesExt};
use palette::MAX_COLORS;
use types::{Color, EncodingError};
use super::lzw;

/// Maximum payload of a single sub-block
pub const SUB_BLOCK_SIZE: usize = 0xFF;

/// Writes `data` as length prefixed sub-blocks followed by the block terminator
pub fn write_sub_blocks<W: io::Write + ?Sized>(w: &mut W, data: &[u8]) -> io::Result<()> {
    for chunk in data.chunks(SUB_BLOCK_SIZE) {
        w.write_le(chunk.len() as u8)?;
        w.write_all(chunk)?;
    }
    w.write_le(0u8)
}

// Smallest n with 2^n >= count
fn ceil_log2(count: usize) -> u8 {
    if count <= 1 {
        0
    } else {
        (64 - (count as u64 - 1).leading_zeros()) as u8
    }
}

/// LZW minimum code size for `count` addressable colors
pub fn min_code_size(count: usize) -> u8 {
    cmp::max(2, ceil_log2(count))
}

/// A run of at most 255 palette indices together with the colors they stand for
#[derive(Debug, Clone, Default)]
pub struct SubBlock {
    lzw_min_code_size: u8,
    colors: HashMap<String, usize>,
    indices: Vec<u8>,
    distinct: HashSet<u8>,
}

impl SubBlock {
    pub fn new() -> SubBlock {
        SubBlock {
            lzw_min_code_size: min_code_size(0),
            ..SubBlock::default()
        }
    }

    /// Appends an index. Fails once the block holds 255 indices.
    pub fn push(&mut self, index: u8, color: Option<&Color>) -> Result<(), EncodingError> {
        if self.is_full() {
            return Err(EncodingError::IndexOverflow("sub-block already holds 255 indices"))
        }
        self.indices.push(index);
        if self.distinct.insert(index) {
            self.lzw_min_code_size = min_code_size(self.distinct.len());
        }
        if let Some(color) = color {
            *self.colors.entry(color.to_hex_string(".")).or_insert(0) += 1;
        }
        Ok(())
    }

    pub fn is_full(&self) -> bool {
        self.indices.len() >= SUB_BLOCK_SIZE
    }

    pub fn indices(&self) -> &[u8] {
        &self.indices
    }

    /// Minimum code size for the distinct indices seen in this block
    pub fn lzw_min_code_size(&self) -> u8 {
        self.lzw_min_code_size
    }

    /// How often each color (keyed `rr.gg.bb`) was pushed
    pub fn color_frequency(&self) -> &HashMap<String, usize> {
        &self.colors
    }
}

/// The image data of one image.
///
/// Indices are collected in sub-blocks of 255 and compressed when written.
#[derive(Debug, Clone, Default)]
pub struct ImageDataTable {
    palette_size: usize,
    max_index: Option<u8>,
    blocks: Vec<SubBlock>,
}

impl ImageDataTable {
    pub fn new() -> ImageDataTable {
        ImageDataTable::default()
    }

    /// Sets the number of colors of the palette the indices refer to.
    ///
    /// Sizes above 256 are capped, no palette can address more colors.
    pub fn set_palette_size(&mut self, size: usize) {
        if size > MAX_COLORS {
            warn!("palette size {} capped at {}", size, MAX_COLORS);
        }
        self.palette_size = cmp::min(size, MAX_COLORS);
    }

    /// Appends a palette index, starting a new sub-block when the current one is full
    pub fn push_index(&mut self, index: usize) -> Result<(), EncodingError> {
        self.push(index, None)
    }

    /// Appends the index of `color` and records the color for frequency statistics
    pub fn push_pixel(&mut self, index: usize, color: &Color) -> Result<(), EncodingError> {
        self.push(index, Some(color))
    }

    fn push(&mut self, index: usize, color: Option<&Color>) -> Result<(), EncodingError> {
        if index > 0xFF {
            return Err(EncodingError::IndexOverflow("palette index exceeds 255"))
        }
        let index = index as u8;
        let rollover = self.blocks.last().map_or(true, |b| b.is_full());
        if rollover {
            if !self.blocks.is_empty() {
                debug!("starting sub-block {}", self.blocks.len());
            }
            self.blocks.push(SubBlock::new());
        }
        self.max_index = Some(cmp::max(index, self.max_index.unwrap_or(0)));
        match self.blocks.last_mut() {
            Some(block) => block.push(index, color),
            None => Err(EncodingError::Format("no sub-block to write into")),
        }
    }

    pub fn sub_blocks(&self) -> &[SubBlock] {
        &self.blocks
    }

    /// Number of indices in the table
    pub fn len(&self) -> usize {
        self.blocks.iter().map(|b| b.indices().len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All indices in order
    pub fn indices(&self) -> Vec<u8> {
        let mut indices = Vec::with_capacity(self.len());
        for block in &self.blocks {
            indices.extend_from_slice(block.indices());
        }
        indices
    }

    /// LZW minimum code size covering the palette and every index pushed so far
    pub fn lzw_min_code_size(&self) -> u8 {
        let used = self.max_index.map_or(0, |i| i as usize + 1);
        let from_blocks = self.blocks.iter().map(|b| b.lzw_min_code_size()).max().unwrap_or(2);
        cmp::max(min_code_size(cmp::max(self.palette_size, used)), from_blocks)
    }

    /// Color frequencies summed over all sub-blocks
    pub fn color_frequency(&self) -> HashMap<String, usize> {
        let mut merged = HashMap::new();
        for block in &self.blocks {
            for (key, count) in block.color_frequency() {
                *merged.entry(key.clone()).or_insert(0) += *count;
            }
        }
        merged
    }

    /// Returns the minimum code size and the LZW compressed indices
    pub fn compress(&self) -> Result<(u8, Vec<u8>), EncodingError> {
        let min_code_size = self.lzw_min_code_size();
        let mut enc = lzw::LzwEncoder::new(min_code_size)?;
        for block in &self.blocks {
            enc.encode(block.indices())?;
        }
        Ok((min_code_size, enc.finish()))
    }
}

impl Encodable for ImageDataTable {
    fn write_to<W: io::Write + ?Sized>(&self, w: &mut W) -> io::Result<()> {
        let (min_code_size, data) = self.compress().map_err(|err| {
            io::Error::new(io::ErrorKind::InvalidInput, err.to_string())
        })?;
        w.write_le(min_code_size)?;
        write_sub_blocks(w, &data)
    }
}

#[cfg(test)]
mod test {
    use traits::Encodable;
    use types::{Color, EncodingError};
    use writer::lzw::test::decompress;
    use super::*;

    /// Splits sub-block framed data and checks every length byte
    fn unframe(data: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        let mut i = 0;
        loop {
            let len = data[i] as usize;
            i += 1;
            if len == 0 {
                break
            }
            out.extend_from_slice(&data[i..i + len]);
            i += len;
        }
        assert_eq!(i, data.len());
        out
    }

    #[test]
    fn code_sizes() {
        assert_eq!(min_code_size(0), 2);
        assert_eq!(min_code_size(2), 2);
        assert_eq!(min_code_size(4), 2);
        assert_eq!(min_code_size(5), 3);
        assert_eq!(min_code_size(16), 4);
        assert_eq!(min_code_size(17), 5);
        assert_eq!(min_code_size(256), 8);
    }

    #[test]
    fn sub_block_capacity() {
        let mut block = SubBlock::new();
        for i in 0..255 {
            block.push((i % 3) as u8, None).unwrap();
        }
        assert_eq!(block.lzw_min_code_size(), 2);
        match block.push(0, None) {
            Err(EncodingError::IndexOverflow(_)) => (),
            other => panic!("{:?}", other),
        }
        assert_eq!(block.indices().len(), 255);
    }

    #[test]
    fn table_rolls_over() {
        let mut table = ImageDataTable::new();
        for i in 0..600 {
            table.push_index(i % 200).unwrap();
        }
        assert_eq!(table.sub_blocks().len(), 3);
        assert_eq!(table.sub_blocks()[2].indices().len(), 90);
        assert_eq!(table.len(), 600);
        assert_eq!(table.lzw_min_code_size(), 8);
    }

    #[test]
    fn index_out_of_range() {
        let mut table = ImageDataTable::new();
        match table.push_index(256) {
            Err(EncodingError::IndexOverflow(_)) => (),
            other => panic!("{:?}", other),
        }
        assert!(table.is_empty());
    }

    #[test]
    fn merged_color_frequency() {
        let red = Color::new(255, 0, 0);
        let blue = Color::new(0, 0, 255);
        let mut table = ImageDataTable::new();
        for i in 0..300 {
            if i % 3 == 0 {
                table.push_pixel(1, &blue).unwrap();
            } else {
                table.push_pixel(0, &red).unwrap();
            }
        }
        let freq = table.color_frequency();
        assert_eq!(freq.len(), 2);
        assert_eq!(freq["ff.00.00"], 200);
        assert_eq!(freq["00.00.ff"], 100);
    }

    #[test]
    fn palette_size_sets_code_size() {
        for &(k, expected) in &[(1, 2), (2, 2), (3, 2), (4, 2), (8, 3), (9, 4), (100, 7), (256, 8)] {
            let mut table = ImageDataTable::new();
            table.set_palette_size(k);
            for i in 0..1000 {
                table.push_index(i * 7 % k).unwrap();
            }
            assert_eq!(table.lzw_min_code_size(), expected, "{} colors", k);
            let buf = table.to_buffer().unwrap();
            assert_eq!(buf[0], expected);
            let data = unframe(&buf[1..]);
            assert_eq!(decompress(&data, expected, 1000), table.indices());
        }
    }

    #[test]
    fn sub_blocks_are_bounded() {
        let mut x = 7u32;
        let mut table = ImageDataTable::new();
        for _ in 0..20000 {
            x = x.wrapping_mul(1664525).wrapping_add(1013904223);
            table.push_index((x >> 24) as usize).unwrap();
        }
        let buf = table.to_buffer().unwrap();
        assert_eq!(*buf.last().unwrap(), 0);
        let mut i = 1;
        let mut full = 0;
        while buf[i] != 0 {
            if buf[i] == 255 {
                full += 1;
            }
            i += buf[i] as usize + 1;
        }
        assert_eq!(i, buf.len() - 1);
        assert!(full > 10);
        let data = unframe(&buf[1..]);
        assert_eq!(decompress(&data, 8, 20000), table.indices());
    }

    #[test]
    fn oversized_palette_is_capped() {
        let mut table = ImageDataTable::new();
        table.set_palette_size(300);
        table.push_index(0).unwrap();
        assert_eq!(table.lzw_min_code_size(), 8);
        let buf = table.to_buffer().unwrap();
        assert_eq!(buf[0], 8);
        assert_eq!(decompress(&unframe(&buf[1..]), 8, 1), [0]);
    }

    #[test]
    fn reference_image_data() {
        // 10x10 sample image with a four color palette
        let rows = [
            "1111122222", "1111122222", "1111122222", "1110000222", "1110000222",
            "2220000111", "2220000111", "2222211111", "2222211111", "2222211111",
        ];
        let mut table = ImageDataTable::new();
        table.set_palette_size(4);
        for row in rows.iter() {
            for c in row.bytes() {
                table.push_index((c - b'0') as usize).unwrap();
            }
        }
        assert_eq!(table.to_buffer().unwrap(), [
            0x02, 0x16, 0x8C, 0x2D, 0x99, 0x87, 0x2A, 0x1C, 0xDC, 0x33, 0xA0, 0x02,
            0x75, 0xEC, 0x95, 0xFA, 0xA8, 0xDE, 0x60, 0x8C, 0x04, 0x91, 0x4C, 0x01, 0x00,
        ]);
    }
}
