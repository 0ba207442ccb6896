use std::io;
use std::io::prelude::*;

use palette::{ColorTable, PaletteWarning};
use traits::{Encodable, HasParameters, WriteBytesExt};
use types::{dimension, Block, Color, DecodedImage, EncodingError, Version};
use super::descriptor::{GifHeader, ImageDescriptor, LogicalDisplayDescriptor};
use super::image::Image;

/// Assembles a complete GIF data stream.
///
/// Images are kept in insertion order. `create` emits header, logical screen
/// descriptor, the global color table if its flag is set, every image and the
/// trailer.
#[derive(Debug, Clone)]
pub struct GifBuilder {
	pub header: GifHeader,
	pub display_descriptor: LogicalDisplayDescriptor,
	global_color_table: ColorTable,
	images: Vec<Image>,
}

impl HasParameters for GifBuilder {}

impl GifBuilder {
	pub fn new(width: u32, height: u32) -> Result<GifBuilder, EncodingError> {
		Ok(GifBuilder {
			header: GifHeader::new(Version::V89a),
			display_descriptor: LogicalDisplayDescriptor::new(width, height)?,
			global_color_table: ColorTable::new(),
			images: Vec::new(),
		})
	}

	pub fn global_color_table(&self) -> &ColorTable {
		&self.global_color_table
	}

	pub fn images(&self) -> &[Image] {
		&self.images
	}

	/// Adds a color to the global color table.
	///
	/// Nothing is added if the global color table flag is cleared or the
	/// table is full.
	pub fn add_color(&mut self, color: Color) -> Result<(), PaletteWarning> {
		if !self.display_descriptor.global_color_table_flag {
			warn!("{} ({})", PaletteWarning::Disabled, color);
			return Err(PaletteWarning::Disabled)
		}
		self.global_color_table.add_color(color)
	}

	/// Colors images without a local table are quantized against
	fn active_global_palette(&self) -> &[Color] {
		if self.display_descriptor.global_color_table_flag {
			self.global_color_table.colors()
		} else {
			&[]
		}
	}

	/// Fails if `image` has neither a local nor an enabled global color table
	fn check_palette(&self, image: &Image) -> Result<(), EncodingError> {
		if image.local_color_table().is_none() && !self.display_descriptor.global_color_table_flag {
			return Err(EncodingError::Format(
				"The GIF format requires a color palette but none was given."
			))
		}
		Ok(())
	}

	/// Adds an image as is
	pub fn add_image(&mut self, image: Image) -> Result<(), EncodingError> {
		self.check_palette(&image)?;
		let desc = image.descriptor();
		let right = desc.left as u32 + desc.width as u32;
		let bottom = desc.top as u32 + desc.height as u32;
		if right > self.display_descriptor.width as u32 || bottom > self.display_descriptor.height as u32 {
			warn!("image {}x{} at {},{} exceeds the logical screen {}x{}",
				desc.width, desc.height, desc.left, desc.top,
				self.display_descriptor.width, self.display_descriptor.height);
		}
		self.images.push(image);
		Ok(())
	}

	/// Adds a frame whose pixels are mapped to the nearest colors of the global color table
	pub fn add_frame(&mut self, frame: &DecodedImage) -> Result<(), EncodingError> {
		let mut image = Image::new(ImageDescriptor::new(frame.width(), frame.height()));
		image.push_pixels(frame.pixels(), self.active_global_palette())?;
		self.add_image(image)
	}

	/// Adds a frame with its own local color table
	pub fn add_frame_with_palette(&mut self, frame: &DecodedImage, palette: ColorTable)
	-> Result<(), EncodingError> {
		let mut image = Image::new(ImageDescriptor::new(frame.width(), frame.height()));
		image.set_local_color_table(palette);
		image.push_pixels(frame.pixels(), &[])?;
		self.add_image(image)
	}

	/// Adds a frame with a local color table of at most `max_colors` generated from its pixels
	pub fn add_quantized_frame(&mut self, frame: &DecodedImage, max_colors: usize)
	-> Result<(), EncodingError> {
		let palette = frame.quantize(max_colors);
		self.add_frame_with_palette(frame, palette)
	}

	/// Adds a frame of palette indices.
	///
	/// The indices refer to `palette` if given, otherwise to the global color table.
	pub fn add_indexed_frame(&mut self, width: u32, height: u32, indices: &[u8],
							 palette: Option<ColorTable>) -> Result<(), EncodingError> {
		let mut image = Image::new(ImageDescriptor::new(dimension(width)?, dimension(height)?));
		if image.pixel_count() != indices.len() {
			return Err(EncodingError::Format(
				"pixel count does not match the image dimensions"
			))
		}
		let palette_size = match palette {
			Some(palette) => {
				let len = palette.len();
				image.set_local_color_table(palette);
				len
			},
			None => {
				let len = self.active_global_palette().len();
				image.data_mut().set_palette_size(len);
				len
			}
		};
		if indices.iter().any(|&idx| idx as usize >= palette_size) {
			return Err(EncodingError::IndexOverflow(
				"palette index exceeds the size of the color table"
			))
		}
		image.push_indices(indices)?;
		self.add_image(image)
	}

	/// Returns the complete data stream.
	///
	/// Fails if an image lacks a color palette, which can happen when the
	/// global color table is disabled after the image was added.
	pub fn create(&self) -> Result<Vec<u8>, EncodingError> {
		for image in &self.images {
			self.check_palette(image)?;
		}
		Ok(self.to_buffer()?)
	}

	/// Writes the logical screen desriptor and the global color table
	fn write_screen_desc<W: Write + ?Sized>(&self, w: &mut W) -> io::Result<()> {
		let mut desc = self.display_descriptor.clone();
		if desc.global_color_table_flag {
			let mut table = Vec::new();
			desc.size_of_global_color_table = self.global_color_table.write_padded(
				&mut table, desc.size_of_global_color_table
			)?;
			desc.write_to(w)?;
			w.write_all(&table)
		} else {
			desc.write_to(w)
		}
	}
}

impl Encodable for GifBuilder {
	fn write_to<W: Write + ?Sized>(&self, w: &mut W) -> io::Result<()> {
		debug!("writing {} image(s), {} global color(s)",
			self.images.len(), self.global_color_table.len());
		self.header.write_to(w)?;
		self.write_screen_desc(w)?;
		for image in &self.images {
			image.write_to(w)?;
		}
		w.write_le(Block::Trailer as u8)
	}
}
