//! Common types used by the palette and the writer
use std::error;
use std::fmt;
use std::io;
use std::str::FromStr;

use color_quant::NeuQuant;
use num;

use palette::ColorTable;
use traits::{Encodable, WriteBytesExt};

/// Largest value a 16 bit dimension field can hold
pub const MAX_DIMENSION: u32 = 0xFFFF;

#[derive(Debug)]
pub enum EncodingError {
    /// A color string is not of the form `rr.gg.bb`
    MalformedColor(String),
    /// A width or height does not fit into 16 bits
    DimensionOverflow(u32),
    /// A palette index is out of range or a sub-block is full
    IndexOverflow(&'static str),
    /// A color lookup was attempted on a palette without colors
    EmptyPalette,
    Format(&'static str),
    Io(io::Error),
}

impl fmt::Display for EncodingError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use self::EncodingError::*;
        match *self {
            MalformedColor(ref s) => write!(f, "malformed color signature: {:?}", s),
            DimensionOverflow(n) => write!(f, "dimension {} exceeds {}", n, MAX_DIMENSION),
            IndexOverflow(msg) => write!(f, "index overflow: {}", msg),
            EmptyPalette => f.write_str("color lookup in an empty palette"),
            Format(msg) => f.write_str(msg),
            Io(ref err) => err.fmt(f),
        }
    }
}

impl error::Error for EncodingError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match *self {
            EncodingError::Io(ref err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for EncodingError {
    fn from(err: io::Error) -> Self {
        EncodingError::Io(err)
    }
}

/// Checks that `n` fits into a 16 bit dimension field
pub fn dimension(n: u32) -> Result<u16, EncodingError> {
    if n > MAX_DIMENSION {
        Err(EncodingError::DimensionOverflow(n))
    } else {
        Ok(n as u16)
    }
}

/// Known block types
enum_from_primitive!{
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Block {
    Image = 0x2C,
    Extension = 0x21,
    Trailer = 0x3B
}
}

/// GIF format version written into the header
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Version {
    V87a,
    V89a,
}

impl Version {
    /// The six byte signature of this version
    pub fn signature(&self) -> &'static [u8; 6] {
        match *self {
            Version::V87a => b"GIF87a",
            Version::V89a => b"GIF89a",
        }
    }
}

impl Default for Version {
    fn default() -> Version {
        Version::V89a
    }
}

/// An RGB color. Channels are clamped into `0..=255` on construction.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub struct Color {
    red: u8,
    green: u8,
    blue: u8,
}

fn channel(v: i64) -> u8 {
    num::clamp(v, 0, 0xFF) as u8
}

impl Color {
    pub fn new(red: i32, green: i32, blue: i32) -> Color {
        Color {
            red: channel(red as i64),
            green: channel(green as i64),
            blue: channel(blue as i64),
        }
    }

    pub fn red(&self) -> u8 {
        self.red
    }

    pub fn green(&self) -> u8 {
        self.green
    }

    pub fn blue(&self) -> u8 {
        self.blue
    }

    /// Renders the channels as two digit lowercase hex values joined by `separator`
    pub fn to_hex_string(&self, separator: &str) -> String {
        format!("{:02x}{sep}{:02x}{sep}{:02x}",
            self.red, self.green, self.blue, sep = separator)
    }

    /// Parses a color written as three hex values joined by `separator`.
    ///
    /// Each value must consist of hex digits only, signs and whitespace are
    /// rejected. Values above `ff` are clamped.
    pub fn from_string(s: &str, separator: &str) -> Result<Color, EncodingError> {
        let malformed = || EncodingError::MalformedColor(s.to_string());
        if separator.is_empty() {
            return Err(malformed())
        }
        let parts: Vec<&str> = s.split(separator).collect();
        if parts.len() != 3 {
            return Err(malformed())
        }
        let mut channels = [0u8; 3];
        for (c, part) in channels.iter_mut().zip(parts.iter()) {
            if part.is_empty() || !part.bytes().all(|b| b.is_ascii_hexdigit()) {
                return Err(malformed())
            }
            let v = i64::from_str_radix(part, 16).map_err(|_| malformed())?;
            *c = channel(v);
        }
        Ok(Color {
            red: channels[0],
            green: channels[1],
            blue: channels[2],
        })
    }

    /// L1 distance between two colors
    pub fn distance(&self, other: &Color) -> u32 {
        let d = |a: u8, b: u8| (a as i32 - b as i32).abs() as u32;
        d(self.red, other.red) + d(self.green, other.green) + d(self.blue, other.blue)
    }
}

impl From<[u8; 3]> for Color {
    fn from(rgb: [u8; 3]) -> Color {
        Color { red: rgb[0], green: rgb[1], blue: rgb[2] }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.to_hex_string("."))
    }
}

impl FromStr for Color {
    type Err = EncodingError;

    fn from_str(s: &str) -> Result<Color, EncodingError> {
        Color::from_string(s, ".")
    }
}

impl Encodable for Color {
    fn write_to<W: io::Write + ?Sized>(&self, w: &mut W) -> io::Result<()> {
        w.write_le(self.red)?;
        w.write_le(self.green)?;
        w.write_le(self.blue)
    }
}

/// A decoded raster as produced by an image decoder
#[derive(Debug, Clone)]
pub struct DecodedImage {
    width: u16,
    height: u16,
    pixels: Vec<Color>,
}

impl DecodedImage {
    pub fn new(width: u32, height: u32, pixels: Vec<Color>) -> Result<DecodedImage, EncodingError> {
        let width = dimension(width)?;
        let height = dimension(height)?;
        if width as usize * height as usize != pixels.len() {
            return Err(EncodingError::Format(
                "pixel count does not match the image dimensions"
            ))
        }
        Ok(DecodedImage {
            width: width,
            height: height,
            pixels: pixels,
        })
    }

    /// Creates an image from pixels in RGB format.
    pub fn from_rgb(width: u32, height: u32, pixels: &[u8]) -> Result<DecodedImage, EncodingError> {
        if pixels.len() % 3 != 0 {
            return Err(EncodingError::Format("RGB data is not a multiple of 3 bytes"))
        }
        let colors = pixels.chunks(3).map(|v| Color::from([v[0], v[1], v[2]])).collect();
        DecodedImage::new(width, height, colors)
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    pub fn pixels(&self) -> &[Color] {
        &self.pixels
    }

    /// Builds a palette of at most `max_colors` entries for this image.
    ///
    /// Note: This method is not optimized for speed.
    pub fn quantize(&self, max_colors: usize) -> ColorTable {
        let mut table = ColorTable::new();
        if self.pixels.is_empty() {
            return table
        }
        let max_colors = num::clamp(max_colors, 2, 256);
        let mut rgba = Vec::with_capacity(self.pixels.len() * 4);
        for pix in &self.pixels {
            rgba.extend([pix.red, pix.green, pix.blue, 0xFF].iter().cloned());
        }
        let nq = NeuQuant::new(1, max_colors, &rgba);
        for rgb in nq.color_map_rgb().chunks(3) {
            // at most 256 entries, cannot overflow
            let _ = table.add_color(Color::from([rgb[0], rgb[1], rgb[2]]));
        }
        table
    }
}
