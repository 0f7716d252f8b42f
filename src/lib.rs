//! Lazy, cache-coherent NBT documents and Anvil region file storage.
//!
//! Documents parsed with [`parse`] keep the bytes they were read from, so
//! writing back an untouched document or branch reproduces the input bit
//! for bit, while edited branches are encoded again. [`Region`] holds the
//! 1024 chunks of a region file in memory and reflows their pages on save.
pub mod bitpack;
mod compression;
mod diagnostic;
mod error;
mod node;
mod position;
mod read;
mod region;
mod tag;
mod value;
mod visit;
mod write;

pub use crate::compression::Compression;
pub use crate::diagnostic::Diagnostic;
pub use crate::error::{
    BitPackError, ChunkEditError, ChunkReadError, ChunkWriteError, NbtError, RegionError,
};
pub use crate::node::Node;
pub use crate::position::{RegionChunkPosition, RegionPosition, REGION_SIDE_CHUNKS};
pub use crate::read::{parse, parse_file, parse_slice, MAX_DEPTH};
pub use crate::region::{ChunkHandle, ChunkInfo, Region, RegionOptions, REGION_PAGE_BYTES_LENGTH};
pub use crate::tag::{Layout, TagDescriptor, TagKind, ValueClass};
pub use crate::value::Value;
pub use crate::visit::{Dump, Exporter, Native, Visitor, Walk};
pub use crate::write::{write_file, ARRAY_WRITE_WINDOW};
