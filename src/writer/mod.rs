use traits::Parameter;
use types::Version;

mod data;
mod descriptor;
mod encoder;
mod image;
mod lzw;

pub use self::data::{ImageDataTable, SubBlock, write_sub_blocks, min_code_size, SUB_BLOCK_SIZE};
pub use self::descriptor::{GifHeader, LogicalDisplayDescriptor, ImageDescriptor};
pub use self::encoder::GifBuilder;
pub use self::image::Image;
pub use self::lzw::{LzwEncoder, compress};

/// Presence of the global color table
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum GlobalColorTable {
    /// The table follows the logical screen descriptor
    Enabled,
    /// No global table, every image needs a local one
    Disabled,
}

impl Parameter<GifBuilder> for GlobalColorTable {
    fn set_param(self, this: &mut GifBuilder) {
        this.display_descriptor.global_color_table_flag = self == GlobalColorTable::Enabled
    }
}

impl Parameter<GifBuilder> for Version {
    fn set_param(self, this: &mut GifBuilder) {
        this.header.version = self
    }
}

/// Index of the background color in the global color table
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct BackgroundColor(pub u8);

impl Parameter<GifBuilder> for BackgroundColor {
    fn set_param(self, this: &mut GifBuilder) {
        this.display_descriptor.background_color_index = self.0
    }
}

/// Bits per primary color of the source material, minus one
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ColorResolution(pub u8);

impl Parameter<GifBuilder> for ColorResolution {
    fn set_param(self, this: &mut GifBuilder) {
        this.display_descriptor.color_resolution = self.0 & 0b111
    }
}
