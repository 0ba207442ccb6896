//! Header and descriptor blocks with packed fields
use std::io;

use traits::{Encodable, WriteBytesExt};
use types::{dimension, Block, EncodingError, Version};

/// The six byte signature at the start of every data stream
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct GifHeader {
    pub version: Version,
}

impl GifHeader {
    pub fn new(version: Version) -> GifHeader {
        GifHeader { version: version }
    }
}

impl Encodable for GifHeader {
    fn write_to<W: io::Write + ?Sized>(&self, w: &mut W) -> io::Result<()> {
        w.write_all(self.version.signature())
    }
}

/// Logical screen descriptor.
///
/// Defines the area all images of the stream are rendered into and whether a
/// global color table follows.
#[derive(Debug, Clone, PartialEq)]
pub struct LogicalDisplayDescriptor {
    pub width: u16,
    pub height: u16,
    /// Index of the background color in the global color table
    pub background_color_index: u8,
    /// Aspect ratio is `(pixel_aspect_ratio + 15) / 64`, 0 means no information
    pub pixel_aspect_ratio: u8,
    /// Bits per primary color of the source, minus one (3 bits)
    pub color_resolution: u8,
    /// The global table holds `2^(size + 1)` entries (3 bits)
    pub size_of_global_color_table: u8,
    pub sort_flag: bool,
    pub global_color_table_flag: bool,
}

impl LogicalDisplayDescriptor {
    /// Creates a descriptor with a 256 entry global color table announced.
    pub fn new(width: u32, height: u32) -> Result<LogicalDisplayDescriptor, EncodingError> {
        Ok(LogicalDisplayDescriptor {
            width: dimension(width)?,
            height: dimension(height)?,
            background_color_index: 0,
            pixel_aspect_ratio: 0,
            color_resolution: 7,
            size_of_global_color_table: 7,
            sort_flag: false,
            global_color_table_flag: true,
        })
    }

    /// Global Color Table Flag (1) | Color Resolution (3) | Sort Flag (1) | Size of Global Color Table (3)
    pub fn packed_fields(&self) -> u8 {
        let mut flags = 0;
        flags |= (self.global_color_table_flag as u8) << 7;
        flags |= (self.color_resolution & 0b111) << 4;
        flags |= (self.sort_flag as u8) << 3;
        flags |= self.size_of_global_color_table & 0b111;
        flags
    }
}

impl Encodable for LogicalDisplayDescriptor {
    fn write_to<W: io::Write + ?Sized>(&self, w: &mut W) -> io::Result<()> {
        w.write_le(self.width)?;
        w.write_le(self.height)?;
        w.write_le(self.packed_fields())?;
        w.write_le(self.background_color_index)?;
        w.write_le(self.pixel_aspect_ratio)
    }
}

/// Image descriptor, starts every image block
#[derive(Debug, Clone, PartialEq)]
pub struct ImageDescriptor {
    pub left: u16,
    pub top: u16,
    pub width: u16,
    pub height: u16,
    pub local_color_table_flag: bool,
    pub interlace_flag: bool,
    pub sort_flag: bool,
    /// The local table holds `2^(size + 1)` entries (3 bits)
    pub size_of_local_color_table: u8,
}

impl ImageDescriptor {
    pub fn new(width: u16, height: u16) -> ImageDescriptor {
        ImageDescriptor {
            left: 0,
            top: 0,
            width: width,
            height: height,
            local_color_table_flag: false,
            interlace_flag: false,
            sort_flag: false,
            size_of_local_color_table: 7,
        }
    }

    /// Places the image at `left`, `top` on the logical screen
    pub fn at(mut self, left: u16, top: u16) -> ImageDescriptor {
        self.left = left;
        self.top = top;
        self
    }

    /// Local Color Table Flag (1) | Interlace Flag (1) | Sort Flag (1) | Reserved (2) | Size of Local Color Table (3)
    pub fn packed_fields(&self) -> u8 {
        let mut flags = 0;
        flags |= (self.local_color_table_flag as u8) << 7;
        flags |= (self.interlace_flag as u8) << 6;
        flags |= (self.sort_flag as u8) << 5;
        flags |= self.size_of_local_color_table & 0b111;
        flags
    }
}

impl Encodable for ImageDescriptor {
    fn write_to<W: io::Write + ?Sized>(&self, w: &mut W) -> io::Result<()> {
        w.write_le(Block::Image as u8)?;
        w.write_le(self.left)?;
        w.write_le(self.top)?;
        w.write_le(self.width)?;
        w.write_le(self.height)?;
        w.write_le(self.packed_fields())
    }
}
