//! # GIF builder
//!
//! Assembles GIF87a/GIF89a data streams from a logical screen, an optional
//! global color table and a sequence of table based images.
//!
//! ```
//! extern crate gif_builder;
//!
//! use gif_builder::{Color, EncodingError, GifBuilder};
//!
//! # fn run() -> Result<(), EncodingError> {
//! let mut builder = GifBuilder::new(2, 1)?;
//! builder.add_color(Color::new(0, 0, 0)).ok();
//! builder.add_color(Color::new(255, 255, 255)).ok();
//! builder.add_indexed_frame(2, 1, &[0, 1], None)?;
//! let gif: Vec<u8> = builder.create()?;
//! assert_eq!(&gif[..6], b"GIF89a");
//! assert_eq!(gif.last(), Some(&0x3B));
//! # Ok(())
//! # }
//! # fn main() { run().unwrap() }
//! ```
extern crate color_quant;
extern crate num;
#[cfg(test)]
extern crate lzw;

#[macro_use] extern crate enum_primitive;
#[macro_use] extern crate log;

mod traits;
mod types;
mod palette;
mod writer;

pub use traits::{Encodable, HasParameters, Parameter};
pub use types::{Block, Color, DecodedImage, EncodingError, Version};
pub use palette::{ColorTable, PaletteWarning, PixelIndexer, nearest_color, flag_size};

pub use writer::{GifBuilder, Image, ImageDataTable, SubBlock, LzwEncoder};
pub use writer::{GifHeader, LogicalDisplayDescriptor, ImageDescriptor};
pub use writer::{write_sub_blocks, min_code_size, compress};
/// Builder configuration parameters
pub use writer::{GlobalColorTable, BackgroundColor, ColorResolution};
