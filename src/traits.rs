//! Traits used in this library
use std::io;

/// Configuration parameter trait
pub trait Parameter<Object> {
    fn set_param(self, this: &mut Object);
}

/// Object has parameters
pub trait HasParameters: Sized {
    fn set<T: Parameter<Self>>(&mut self, value: T) -> &mut Self {
        value.set_param(self);
        self
    }
}

/// A structure that has a fixed binary representation in the data stream
pub trait Encodable {
    /// Writes the binary representation to `w`
    fn write_to<W: io::Write + ?Sized>(&self, w: &mut W) -> io::Result<()>;

    /// Returns the binary representation as a new buffer
    fn to_buffer(&self) -> io::Result<Vec<u8>> {
        let mut buf = Vec::new();
        self.write_to(&mut buf)?;
        Ok(buf)
    }
}

/// Writer extesion to write little endian data
pub trait WriteBytesExt<T> {
	fn write_le(&mut self, n: T) -> io::Result<()>;
}

impl<W: io::Write + ?Sized> WriteBytesExt<u8> for W {
	#[inline]
	fn write_le(&mut self, n: u8) -> io::Result<()> {
		self.write_all(&[n])
	}
}

impl<W: io::Write + ?Sized> WriteBytesExt<u16> for W {
	#[inline]
	fn write_le(&mut self, n: u16) -> io::Result<()> {
		self.write_all(&[n as u8, (n>>8) as u8])
	}
}
