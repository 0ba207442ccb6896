use std::io;

use palette::{ColorTable, PixelIndexer};
use traits::Encodable;
use types::{Color, EncodingError};
use super::data::ImageDataTable;
use super::descriptor::ImageDescriptor;

/// A table based image: descriptor, optional local color table and image data
#[derive(Debug, Clone)]
pub struct Image {
    descriptor: ImageDescriptor,
    local_color_table: Option<ColorTable>,
    data: ImageDataTable,
}

impl Image {
    pub fn new(descriptor: ImageDescriptor) -> Image {
        Image {
            descriptor: descriptor,
            local_color_table: None,
            data: ImageDataTable::new(),
        }
    }

    pub fn descriptor(&self) -> &ImageDescriptor {
        &self.descriptor
    }

    pub fn descriptor_mut(&mut self) -> &mut ImageDescriptor {
        &mut self.descriptor
    }

    pub fn local_color_table(&self) -> Option<&ColorTable> {
        self.local_color_table.as_ref()
    }

    /// Attaches a local color table and updates the descriptor flags to match
    pub fn set_local_color_table(&mut self, table: ColorTable) {
        self.descriptor.local_color_table_flag = true;
        self.descriptor.size_of_local_color_table = table.size_flag();
        self.data.set_palette_size(table.len());
        self.local_color_table = Some(table);
    }

    pub fn data(&self) -> &ImageDataTable {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut ImageDataTable {
        &mut self.data
    }

    /// Number of pixels the descriptor announces
    pub fn pixel_count(&self) -> usize {
        self.descriptor.width as usize * self.descriptor.height as usize
    }

    /// Appends pre-indexed pixels
    pub fn push_indices(&mut self, indices: &[u8]) -> Result<(), EncodingError> {
        for &idx in indices {
            self.data.push_index(idx as usize)?;
        }
        Ok(())
    }

    /// Quantizes `pixels` against the local color table, or `global` if there is none,
    /// and appends their palette indices
    pub fn push_pixels(&mut self, pixels: &[Color], global: &[Color]) -> Result<(), EncodingError> {
        let Image { ref local_color_table, ref mut data, .. } = *self;
        let palette = match *local_color_table {
            Some(ref table) => table.colors(),
            None => global,
        };
        let mut indexer = PixelIndexer::new(palette)?;
        if local_color_table.is_none() {
            data.set_palette_size(indexer.palette_len());
        }
        for pixel in pixels {
            let idx = indexer.index_of(pixel)?;
            data.push_pixel(idx as usize, pixel)?;
        }
        Ok(())
    }
}

impl Encodable for Image {
    fn write_to<W: io::Write + ?Sized>(&self, w: &mut W) -> io::Result<()> {
        let mut descriptor = self.descriptor.clone();
        match self.local_color_table {
            Some(ref table) => {
                descriptor.local_color_table_flag = true;
                let mut buf = Vec::new();
                descriptor.size_of_local_color_table = table.write_padded(
                    &mut buf, descriptor.size_of_local_color_table
                )?;
                descriptor.write_to(w)?;
                w.write_all(&buf)?;
            }
            None => {
                descriptor.local_color_table_flag = false;
                descriptor.write_to(w)?
            }
        }
        self.data.write_to(w)
    }
}
