use crate::diagnostic::Diagnostic;
use crate::position::RegionChunkPosition;
use crate::tag::TagKind;
use std::{error::Error, fmt::Display, io};

/// Possible errors while decoding, encoding or mutating NBT documents.
#[derive(Debug)]
pub enum NbtError {
    /// Tag id outside of the known range.
    UnknownTag { id: u8, offset: usize },
    /// Buffer ended before the field at `offset` was complete.
    Truncated { offset: usize, needed: usize },
    /// Name or string payload is not valid UTF-8.
    InvalidUtf8 { offset: usize },
    /// Array declared a negative element count.
    NegativeLength { length: i32, offset: usize },
    /// Bytes remain after the root tag.
    TrailingData { offset: usize, remaining: usize },
    /// Tags are nested deeper than the parser accepts.
    TooDeep { offset: usize },
    /// Attaching the node would make it its own ancestor.
    CircularReference,
    /// Operation is not supported by the node tag type.
    WrongKind {
        expected: &'static str,
        found: TagKind,
    },
    /// Element does not match the list child type.
    ListTypeMismatch { expected: TagKind, found: TagKind },
    /// Integer does not fit the tag type.
    ValueOutOfRange { kind: TagKind, value: i64 },
    IndexOutOfBounds { index: usize, len: usize },
    BitPack { bit_pack_error: BitPackError },
    /// I/O Error which happened while reading or writing a document.
    IOError { io_error: io::Error },
}

impl From<io::Error> for NbtError {
    fn from(io_error: io::Error) -> Self {
        NbtError::IOError { io_error }
    }
}

impl From<BitPackError> for NbtError {
    fn from(bit_pack_error: BitPackError) -> Self {
        NbtError::BitPack { bit_pack_error }
    }
}

impl Error for NbtError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            NbtError::IOError { io_error } => Some(io_error),
            NbtError::BitPack { bit_pack_error } => Some(bit_pack_error),
            _ => None,
        }
    }
}

impl Display for NbtError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use NbtError::*;
        match self {
            UnknownTag { id, offset } => write!(f, "Unknown tag id {} at offset {}", id, offset),
            Truncated { offset, needed } => write!(
                f,
                "Unexpected end of data at offset {} ({} more bytes needed)",
                offset, needed
            ),
            InvalidUtf8 { offset } => write!(f, "Invalid UTF-8 string at offset {}", offset),
            NegativeLength { length, offset } => {
                write!(f, "Negative array length {} at offset {}", length, offset)
            }
            TrailingData { offset, remaining } => write!(
                f,
                "{} bytes of trailing data after root tag at offset {}",
                remaining, offset
            ),
            TooDeep { offset } => write!(f, "Tags nested too deep at offset {}", offset),
            CircularReference => write!(f, "Node cannot be its own ancestor"),
            WrongKind { expected, found } => write!(f, "Expected {} but found {}", expected, found),
            ListTypeMismatch { expected, found } => {
                write!(f, "List of {} cannot hold {}", expected, found)
            }
            ValueOutOfRange { kind, value } => write!(f, "Value {} does not fit in {}", value, kind),
            IndexOutOfBounds { index, len } => {
                write!(f, "Index {} out of bounds for length {}", index, len)
            }
            BitPack { .. } => write!(f, "Bit packing failed"),
            IOError { .. } => write!(f, "IO Error"),
        }
    }
}

/// Precondition failures of the bit packer.
#[derive(Debug, Eq, PartialEq)]
pub enum BitPackError {
    /// Field or word width outside of 1..=64.
    UnsupportedWidth { bits: u32 },
    /// Total bit length is not a multiple of the output width.
    TrailingBits { remaining: usize, nbits: u32 },
    /// Input value has bits set above the declared input width.
    ValueTooWide { value: u64, bits: u32 },
}

impl Error for BitPackError {}

impl Display for BitPackError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use BitPackError::*;
        match self {
            UnsupportedWidth { bits } => write!(f, "Cannot pack/unpack {} bits wide data", bits),
            TrailingBits { remaining, nbits } => write!(
                f,
                "{} trailing bits do not fill a {} bits wide field",
                remaining, nbits
            ),
            ValueTooWide { value, bits } => write!(f, "Value {} does not fit in {} bits", value, bits),
        }
    }
}

/// Possible errors while loading the chunk.
#[derive(Debug)]
pub enum ChunkReadError {
    /// Chunk was required but its slot is empty.
    EmptyChunk { position: RegionChunkPosition },
    /// Chunk header or payload cannot be interpreted.
    ///
    /// Region file are corrupted.
    BadChunk {
        position: RegionChunkPosition,
        reason: &'static str,
    },
    /// Currently are only 3 types of compression: Gzip, Zlib and none.
    ///
    /// Region file are corrupted or was introduced new compression type.
    UnknownCompression {
        /// Compression scheme type id.
        compression_scheme: u8,
    },
    /// Compressed payload cannot be inflated.
    Decompress { io_error: io::Error },
    /// Error while decoding binary data to NBT tag.
    TagDecode { error: NbtError },
    /// Recoverable issue reported as an error by a strict region.
    Diagnostic { diagnostic: Diagnostic },
}

impl From<NbtError> for ChunkReadError {
    fn from(error: NbtError) -> Self {
        ChunkReadError::TagDecode { error }
    }
}

impl From<Diagnostic> for ChunkReadError {
    fn from(diagnostic: Diagnostic) -> Self {
        ChunkReadError::Diagnostic { diagnostic }
    }
}

impl Error for ChunkReadError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        use ChunkReadError::*;
        match self {
            Decompress { io_error } => Some(io_error),
            TagDecode { error } => Some(error),
            _ => None,
        }
    }
}

impl Display for ChunkReadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use ChunkReadError::*;
        match self {
            EmptyChunk { position } => {
                write!(f, "Chunk {}, {} is empty", position.x, position.z)
            }
            BadChunk { position, reason } => {
                write!(f, "Chunk {}, {} is damaged: {}", position.x, position.z, reason)
            }
            UnknownCompression { compression_scheme } => {
                write!(f, "Unknown compression scheme: {}", compression_scheme)
            }
            Decompress { .. } => write!(f, "Failed to decompress chunk"),
            TagDecode { .. } => write!(f, "Failed to decode nbt"),
            ChunkReadError::Diagnostic { diagnostic } => write!(f, "{}", diagnostic),
        }
    }
}

/// Possible errors while saving the chunk.
#[derive(Debug)]
pub enum ChunkWriteError {
    /// Compressed chunk does not fit in 255 pages.
    LengthExceedsMaximum {
        /// Chunk length.
        length: u32,
    },
    /// Error while encoding NBT tag to binary data.
    TagEncode { error: NbtError },
    /// I/O Error which happened while were compressing chunk data.
    IOError { io_error: io::Error },
}

impl From<io::Error> for ChunkWriteError {
    fn from(io_error: io::Error) -> Self {
        ChunkWriteError::IOError { io_error }
    }
}

impl From<NbtError> for ChunkWriteError {
    fn from(error: NbtError) -> Self {
        ChunkWriteError::TagEncode { error }
    }
}

impl Error for ChunkWriteError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ChunkWriteError::IOError { io_error } => Some(io_error),
            ChunkWriteError::TagEncode { error } => Some(error),
            _ => None,
        }
    }
}

impl Display for ChunkWriteError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use ChunkWriteError::*;
        match self {
            LengthExceedsMaximum { length } => {
                write!(f, "Chunk length of {} exceeds maximum (255 pages)", length)
            }
            TagEncode { .. } => write!(f, "Failed to encode nbt"),
            IOError { .. } => write!(f, "IO Error"),
        }
    }
}

/// Possible errors of a parse, modify and write back cycle.
#[derive(Debug)]
pub enum ChunkEditError {
    Read(ChunkReadError),
    Write(ChunkWriteError),
    Edit(NbtError),
}

impl From<ChunkReadError> for ChunkEditError {
    fn from(e: ChunkReadError) -> Self {
        Self::Read(e)
    }
}

impl From<ChunkWriteError> for ChunkEditError {
    fn from(e: ChunkWriteError) -> Self {
        Self::Write(e)
    }
}

impl From<NbtError> for ChunkEditError {
    fn from(e: NbtError) -> Self {
        Self::Edit(e)
    }
}

impl Error for ChunkEditError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ChunkEditError::Read(e) => Some(e),
            ChunkEditError::Write(e) => Some(e),
            ChunkEditError::Edit(e) => Some(e),
        }
    }
}

impl Display for ChunkEditError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChunkEditError::Read(e) => write!(f, "{}", e),
            ChunkEditError::Write(e) => write!(f, "{}", e),
            ChunkEditError::Edit(e) => write!(f, "{}", e),
        }
    }
}

/// Possible errors while loading or saving a whole region.
#[derive(Debug)]
pub enum RegionError {
    /// I/O Error which happened while reading or writing region file.
    IOError { io_error: io::Error },
    /// Recoverable issue reported as an error by a strict region.
    Diagnostic { diagnostic: Diagnostic },
    /// Region was not opened from a file and cannot be saved in place.
    NoPath,
}

impl From<io::Error> for RegionError {
    fn from(io_error: io::Error) -> Self {
        RegionError::IOError { io_error }
    }
}

impl From<Diagnostic> for RegionError {
    fn from(diagnostic: Diagnostic) -> Self {
        RegionError::Diagnostic { diagnostic }
    }
}

impl Error for RegionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            RegionError::IOError { io_error } => Some(io_error),
            _ => None,
        }
    }
}

impl Display for RegionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use RegionError::*;
        match self {
            IOError { .. } => write!(f, "IO Error"),
            RegionError::Diagnostic { diagnostic } => write!(f, "{}", diagnostic),
            NoPath => write!(f, "Region has no backing file"),
        }
    }
}
