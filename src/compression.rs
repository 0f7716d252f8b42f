use flate2::read::{GzDecoder, ZlibDecoder};
use flate2::write::{GzEncoder, ZlibEncoder};
use std::io::{self, Read, Write};

/// Compression schemes of chunk payloads, by region file id.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Compression {
    Gzip = 1,
    Zlib = 2,
    Uncompressed = 3,
}

impl Default for Compression {
    fn default() -> Self {
        Compression::Zlib
    }
}

impl Compression {
    pub fn from_id(id: u8) -> Option<Compression> {
        match id {
            1 => Some(Compression::Gzip),
            2 => Some(Compression::Zlib),
            3 => Some(Compression::Uncompressed),
            _ => None,
        }
    }

    pub fn id(self) -> u8 {
        self as u8
    }

    pub fn compress(self, data: &[u8]) -> io::Result<Vec<u8>> {
        match self {
            Compression::Gzip => {
                let mut encoder = GzEncoder::new(Vec::new(), flate2::Compression::default());
                encoder.write_all(data)?;
                encoder.finish()
            }
            Compression::Zlib => {
                let mut encoder = ZlibEncoder::new(Vec::new(), flate2::Compression::default());
                encoder.write_all(data)?;
                encoder.finish()
            }
            Compression::Uncompressed => Ok(data.to_vec()),
        }
    }

    pub fn decompress(self, data: &[u8]) -> io::Result<Vec<u8>> {
        let mut buffer = Vec::new();

        match self {
            Compression::Gzip => GzDecoder::new(data).read_to_end(&mut buffer)?,
            Compression::Zlib => ZlibDecoder::new(data).read_to_end(&mut buffer)?,
            Compression::Uncompressed => {
                buffer.extend_from_slice(data);
                data.len()
            }
        };

        Ok(buffer)
    }
}
