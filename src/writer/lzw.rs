//! Variable width LZW compression as used by GIF image data
use std::collections::HashMap;

use types::EncodingError;

const MAX_CODESIZE: u8 = 12;
/// Largest code that may be assigned before the table is cleared
const MAX_CODE: u16 = (1 << MAX_CODESIZE) - 1;

/// Packs codes LSB first into bytes
#[derive(Debug, Default)]
struct LsbWriter {
    buf: Vec<u8>,
    acc: u32,
    bits: u8,
}

impl LsbWriter {
    fn write_bits(&mut self, v: u16, n: u8) {
        self.acc |= (v as u32) << self.bits;
        self.bits += n;
        while self.bits >= 8 {
            self.buf.push(self.acc as u8);
            self.acc >>= 8;
            self.bits -= 8;
        }
    }

    fn into_bytes(mut self) -> Vec<u8> {
        if self.bits > 0 {
            self.buf.push(self.acc as u8);
        }
        self.buf
    }
}

/// LZW encoder state machine.
///
/// Starts with a clear code. Every code is written with the current code
/// width, which grows by one bit once the next free code no longer fits.
/// When all 12 bit codes are assigned a clear code resets the table.
#[derive(Debug)]
pub struct LzwEncoder {
    min_code_size: u8,
    code_size: u8,
    clear_code: u16,
    end_code: u16,
    next_code: u16,
    table: HashMap<(u16, u8), u16>,
    prefix: Option<u16>,
    w: LsbWriter,
}

impl LzwEncoder {
    pub fn new(min_code_size: u8) -> Result<LzwEncoder, EncodingError> {
        if min_code_size < 2 || min_code_size > 8 {
            return Err(EncodingError::Format("LZW minimum code size must be within 2..8"))
        }
        let clear_code = 1 << min_code_size;
        let mut enc = LzwEncoder {
            min_code_size: min_code_size,
            code_size: min_code_size + 1,
            clear_code: clear_code,
            end_code: clear_code + 1,
            next_code: clear_code + 2,
            table: HashMap::new(),
            prefix: None,
            w: LsbWriter::default(),
        };
        enc.emit(clear_code);
        Ok(enc)
    }

    pub fn min_code_size(&self) -> u8 {
        self.min_code_size
    }

    /// Feeds one palette index into the encoder
    pub fn push(&mut self, index: u8) -> Result<(), EncodingError> {
        if index as u16 >= self.clear_code {
            return Err(EncodingError::IndexOverflow(
                "palette index does not fit the minimum code size"
            ))
        }
        let prefix = match self.prefix {
            Some(prefix) => prefix,
            None => {
                self.prefix = Some(index as u16);
                return Ok(())
            }
        };
        if let Some(&code) = self.table.get(&(prefix, index)) {
            self.prefix = Some(code);
            return Ok(())
        }
        self.emit(prefix);
        if self.next_code < MAX_CODE {
            self.table.insert((prefix, index), self.next_code);
            self.next_code += 1;
        } else {
            let clear_code = self.clear_code;
            self.emit(clear_code);
            self.reset();
        }
        self.prefix = Some(index as u16);
        Ok(())
    }

    pub fn encode(&mut self, indices: &[u8]) -> Result<(), EncodingError> {
        for &index in indices {
            self.push(index)?;
        }
        Ok(())
    }

    /// Flushes the pending string, writes the end code and returns the packed bytes
    pub fn finish(mut self) -> Vec<u8> {
        if let Some(prefix) = self.prefix.take() {
            self.emit(prefix);
        }
        let end_code = self.end_code;
        self.emit(end_code);
        self.w.into_bytes()
    }

    fn emit(&mut self, code: u16) {
        self.w.write_bits(code, self.code_size);
        if self.next_code >= 1 << self.code_size && self.code_size < MAX_CODESIZE {
            self.code_size += 1;
        }
    }

    fn reset(&mut self) {
        debug!("LZW code table full, clearing");
        self.table.clear();
        self.code_size = self.min_code_size + 1;
        self.next_code = self.end_code + 1;
    }
}

/// Compresses `indices` with the given minimum code size
pub fn compress(indices: &[u8], min_code_size: u8) -> Result<Vec<u8>, EncodingError> {
    let mut enc = LzwEncoder::new(min_code_size)?;
    enc.encode(indices)?;
    Ok(enc.finish())
}

#[cfg(test)]
pub mod test {
    use lzw;

    use super::*;

    /// Decodes GIF LZW data with the reference decoder
    pub fn decompress(data: &[u8], min_code_size: u8, expected: usize) -> Vec<u8> {
        let mut dec = lzw::Decoder::new(lzw::LsbReader::new(), min_code_size);
        let mut out = Vec::new();
        let mut buf = data;
        while !buf.is_empty() && out.len() < expected {
            let (consumed, bytes) = dec.decode_bytes(buf).unwrap();
            out.extend_from_slice(bytes);
            buf = &buf[consumed..];
        }
        out
    }

    #[test]
    fn empty_stream() {
        // clear code (4) and end code (5), 3 bits each
        assert_eq!(compress(&[], 2).unwrap(), [0b00_101_100]);
    }

    #[test]
    fn code_size_bounds() {
        assert!(LzwEncoder::new(1).is_err());
        assert!(LzwEncoder::new(9).is_err());
        assert_eq!(LzwEncoder::new(8).unwrap().min_code_size(), 8);
    }

    #[test]
    fn index_must_fit_code_size() {
        let mut enc = LzwEncoder::new(2).unwrap();
        assert!(enc.push(3).is_ok());
        match enc.push(4) {
            Err(EncodingError::IndexOverflow(_)) => (),
            other => panic!("{:?}", other),
        }
    }

    #[test]
    fn round_trip() {
        let data: Vec<u8> = (0..2000u32).map(|i| ((i * i) % 7) as u8).collect();
        let encoded = compress(&data, 3).unwrap();
        assert_eq!(decompress(&encoded, 3, data.len()), data);
    }

    #[test]
    fn round_trip_with_table_reset() {
        // enough entropy to fill all 4096 codes several times
        let mut x = 12345u32;
        let data: Vec<u8> = (0..60000).map(|_| {
            x = x.wrapping_mul(1103515245).wrapping_add(12345);
            (x >> 16) as u8
        }).collect();
        let encoded = compress(&data, 8).unwrap();
        assert_eq!(decompress(&encoded, 8, data.len()), data);
    }

    #[test]
    fn round_trip_single_color() {
        let data = vec![0u8; 10000];
        let encoded = compress(&data, 2).unwrap();
        assert!(encoded.len() < 200);
        assert_eq!(decompress(&encoded, 2, data.len()), data);
    }
}
