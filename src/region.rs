use crate::compression::Compression;
use crate::diagnostic::Diagnostic;
use crate::error::{ChunkEditError, ChunkReadError, ChunkWriteError, NbtError, RegionError};
use crate::node::Node;
use crate::position::{RegionChunkPosition, RegionPosition};
use crate::read;
use byteorder::{BigEndian, ByteOrder, WriteBytesExt};
use bytes::Bytes;
use log::{debug, warn};
use std::collections::BTreeSet;
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

/// Amount of chunks in region.
const REGION_CHUNKS: usize = 1024;
/// Region page length in bytes.
pub const REGION_PAGE_BYTES_LENGTH: usize = 4096;
/// Pages holding the location and timestamp tables.
const REGION_HEADER_PAGES: u32 = 2;
/// Region header length in bytes.
const REGION_HEADER_BYTES_LENGTH: usize = REGION_HEADER_PAGES as usize * REGION_PAGE_BYTES_LENGTH;
/// Maximum chunk length in bytes, including its length prefix.
const CHUNK_MAXIMUM_BYTES_LENGTH: usize = REGION_PAGE_BYTES_LENGTH * 256;
/// Maximum amount of pages a location entry can address.
const CHUNK_MAXIMUM_PAGES: usize = 255;
/// Chunk length prefix and compression scheme id.
const CHUNK_HEADER_BYTES_LENGTH: usize = 5;

/// Amount of pages needed to store `length` bytes.
fn pages(length: usize) -> usize {
    (length + REGION_PAGE_BYTES_LENGTH - 1) / REGION_PAGE_BYTES_LENGTH
}

fn now() -> u32 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|time| time.as_secs() as u32)
        .unwrap_or(0)
}

/// Region settings.
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq)]
pub struct RegionOptions {
    /// Compression used when writing chunks without an explicit scheme.
    pub compression: Compression,
    /// Whether diagnostics are returned as errors instead of only recorded.
    pub strict: bool,
}

/// Slot of the region header.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ChunkInfo {
    /// First page of the chunk, `None` until the chunk is placed.
    pub addr: Option<u32>,
    /// Amount of pages of the chunk, `None` until the chunk is placed.
    pub size: Option<u8>,
    /// Last time in seconds when chunk was modified.
    pub timestamp: u32,
    pub x: u8,
    pub z: u8,
    /// Chunk bytes: length prefix, compression id and compressed payload.
    pub data: Bytes,
}

impl ChunkInfo {
    fn empty(position: RegionChunkPosition) -> Self {
        ChunkInfo {
            addr: None,
            size: None,
            timestamp: 0,
            x: position.x,
            z: position.z,
            data: Bytes::new(),
        }
    }

    pub fn position(&self) -> RegionChunkPosition {
        RegionChunkPosition::new(self.x, self.z)
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Compression scheme recorded in the chunk bytes.
    pub fn compression(&self) -> Option<Compression> {
        self.data.get(4).and_then(|&id| Compression::from_id(id))
    }
}

/// Region represents a 32x32 group of chunks held in memory.
pub struct Region {
    position: RegionPosition,
    options: RegionOptions,
    /// File the region was opened from.
    path: Option<PathBuf>,
    chunks: Vec<ChunkInfo>,
    /// Chunks owning each page, computed on demand.
    bitmap: Option<Vec<Vec<RegionChunkPosition>>>,
    /// Shared pages already reported.
    reported_pages: BTreeSet<usize>,
    /// Chunks already reported with inconsistent coordinates.
    mislocated: BTreeSet<RegionChunkPosition>,
    diagnostics: Vec<Diagnostic>,
    dirty: bool,
}

impl Region {
    pub fn new(position: RegionPosition) -> Self {
        Region::with_options(position, RegionOptions::default())
    }

    pub fn with_options(position: RegionPosition, options: RegionOptions) -> Self {
        let chunks = (0..REGION_CHUNKS)
            .map(|index| ChunkInfo::empty(RegionChunkPosition::from_index(index)))
            .collect();

        Region {
            position,
            options,
            path: None,
            chunks,
            bitmap: None,
            reported_pages: BTreeSet::new(),
            mislocated: BTreeSet::new(),
            diagnostics: Vec::new(),
            dirty: false,
        }
    }

    pub fn load<R: Read>(position: RegionPosition, source: R) -> Result<Self, RegionError> {
        Region::load_with_options(position, source, RegionOptions::default())
    }

    pub fn load_with_options<R: Read>(
        position: RegionPosition,
        mut source: R,
        options: RegionOptions,
    ) -> Result<Self, RegionError> {
        let mut data = Vec::new();
        source.read_to_end(&mut data)?;

        Region::from_bytes(position, Bytes::from(data), options)
    }

    /// Builds a region from the whole content of a region file.
    ///
    /// Chunk data keeps sharing the memory of `data`.
    pub fn from_bytes(
        position: RegionPosition,
        data: Bytes,
        options: RegionOptions,
    ) -> Result<Self, RegionError> {
        let mut region = Region::with_options(position, options);
        region.read_header(data)?;

        Ok(region)
    }

    /// Opens a region file, inferring its position from a `r.<x>.<z>.mca`
    /// file name.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, RegionError> {
        Region::open_with_options(path, RegionOptions::default())
    }

    pub fn open_with_options<P: AsRef<Path>>(
        path: P,
        options: RegionOptions,
    ) -> Result<Self, RegionError> {
        let path = path.as_ref();
        let position = RegionPosition::from_filename(path).unwrap_or_default();

        Region::open_at(path, position, options)
    }

    /// Opens a region file at a known position. A missing file opens as an
    /// empty region bound to `path`.
    pub fn open_at<P: AsRef<Path>>(
        path: P,
        position: RegionPosition,
        options: RegionOptions,
    ) -> Result<Self, RegionError> {
        let path = path.as_ref();

        let mut region = match fs::read(path) {
            Ok(data) => Region::from_bytes(position, Bytes::from(data), options)?,
            Err(error) if error.kind() == io::ErrorKind::NotFound => {
                debug!(
                    target: "anvil-nbt",
                    "Region file {} does not exist, starting empty",
                    path.display()
                );

                Region::with_options(position, options)
            }
            Err(error) => return Err(error.into()),
        };

        region.path = Some(path.to_path_buf());

        Ok(region)
    }

    /// First 8KB of data are header of 1024 locations and 1024 timestamps.
    fn read_header(&mut self, mut data: Bytes) -> Result<(), RegionError> {
        // If necessary, extend the data length to the length of the header.
        if REGION_HEADER_BYTES_LENGTH > data.len() {
            debug!(
                target: "anvil-nbt",
                "Extending region x: {}, z: {} data from {} bytes to header length",
                self.position.x,
                self.position.z,
                data.len()
            );

            let mut extended = data.to_vec();
            extended.resize(REGION_HEADER_BYTES_LENGTH, 0);
            data = Bytes::from(extended);
        }

        for index in 0..REGION_CHUNKS {
            let location = BigEndian::read_u32(&data[index * 4..]);
            let timestamp = BigEndian::read_u32(&data[REGION_PAGE_BYTES_LENGTH + index * 4..]);
            let position = RegionChunkPosition::from_index(index);

            let addr = location >> 8;
            let size = (location & 0xFF) as u8;

            if size == 0 {
                self.chunks[index].timestamp = timestamp;
                continue;
            }

            if addr < REGION_HEADER_PAGES {
                self.report(Diagnostic::ChunkDataInHeader {
                    position,
                    page: addr,
                })?;
            }

            let start = addr as usize * REGION_PAGE_BYTES_LENGTH;
            let length = size as usize * REGION_PAGE_BYTES_LENGTH;

            let chunk_data = if start + length <= data.len() {
                data.slice(start..start + length)
            } else {
                let available = data.len().saturating_sub(start);

                self.report(Diagnostic::MissingData {
                    position,
                    expected: length,
                    available,
                })?;

                let mut filled = vec![0; length];

                if available > 0 {
                    filled[..available].copy_from_slice(&data[start..]);
                }

                Bytes::from(filled)
            };

            self.chunks[index] = ChunkInfo {
                addr: Some(addr),
                size: Some(size),
                timestamp,
                x: position.x,
                z: position.z,
                data: chunk_data,
            };
        }

        Ok(())
    }

    fn record(&mut self, diagnostic: Diagnostic) {
        warn!(
            target: "anvil-nbt",
            "Region x: {}, z: {}: {}", self.position.x, self.position.z, diagnostic
        );

        self.diagnostics.push(diagnostic);
    }

    /// Records `diagnostic`, failing with it when the region is strict.
    fn report(&mut self, diagnostic: Diagnostic) -> Result<(), Diagnostic> {
        self.record(diagnostic.clone());

        if self.options.strict {
            return Err(diagnostic);
        }

        Ok(())
    }

    pub fn position(&self) -> RegionPosition {
        self.position
    }

    pub fn options(&self) -> RegionOptions {
        self.options
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Diagnostics recorded since the region was loaded.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diagnostics)
    }

    /// Whether chunks changed since the region was loaded or saved.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn chunk_info(&self, x: i32, z: i32) -> &ChunkInfo {
        &self.chunks[RegionChunkPosition::from_chunk_position(x, z).index()]
    }

    /// Handle on the chunk at `x`, `z`, taken modulo 32.
    pub fn chunk(&mut self, x: i32, z: i32) -> ChunkHandle<'_> {
        ChunkHandle {
            position: RegionChunkPosition::from_chunk_position(x, z),
            region: self,
        }
    }

    /// Positions of non empty chunks in header order.
    pub fn positions(&self) -> impl Iterator<Item = RegionChunkPosition> + '_ {
        self.chunks
            .iter()
            .filter(|chunk| !chunk.is_empty())
            .map(ChunkInfo::position)
    }

    /// Chunks owning each page. Pages claimed by several chunks are
    /// reported the first time they are found.
    pub fn bitmap(&mut self) -> &[Vec<RegionChunkPosition>] {
        if self.bitmap.is_none() {
            let bitmap = self.compute_bitmap();

            for (page, owners) in bitmap.iter().enumerate() {
                if owners.len() > 1 && self.reported_pages.insert(page) {
                    self.record(Diagnostic::DuplicatePage {
                        page,
                        owners: owners.clone(),
                    });
                }
            }

            self.bitmap = Some(bitmap);
        }

        self.bitmap.as_deref().unwrap_or(&[])
    }

    fn compute_bitmap(&self) -> Vec<Vec<RegionChunkPosition>> {
        let end = self
            .chunks
            .iter()
            .filter_map(|chunk| Some(chunk.addr? as usize + chunk.size? as usize))
            .max()
            .unwrap_or(0)
            .max(REGION_HEADER_PAGES as usize);

        let mut bitmap = vec![Vec::new(); end];

        for chunk in &self.chunks {
            if let (Some(addr), Some(size)) = (chunk.addr, chunk.size) {
                let start = addr as usize;

                for owners in &mut bitmap[start..start + size as usize] {
                    owners.push(chunk.position());
                }
            }
        }

        bitmap
    }

    /// Computes the page bitmap, failing on overlapping chunks when strict.
    pub fn check(&mut self) -> Result<(), RegionError> {
        let strict = self.options.strict;
        let shared = self
            .bitmap()
            .iter()
            .enumerate()
            .find(|(_, owners)| owners.len() > 1)
            .map(|(page, owners)| Diagnostic::DuplicatePage {
                page,
                owners: owners.clone(),
            });

        match shared {
            Some(diagnostic) if strict => Err(diagnostic.into()),
            _ => Ok(()),
        }
    }

    /// Decodes the chunk at `x`, `z`, `None` when the slot is empty.
    pub fn parse_chunk(&mut self, x: i32, z: i32) -> Result<Option<Node>, ChunkReadError> {
        self.parse_chunk_at(RegionChunkPosition::from_chunk_position(x, z))
    }

    /// Like [`Region::parse_chunk`], failing on empty slots.
    pub fn require_chunk(&mut self, x: i32, z: i32) -> Result<Node, ChunkReadError> {
        self.require_chunk_at(RegionChunkPosition::from_chunk_position(x, z))
    }

    /// Decodes every non empty chunk, skipping the chunks which fail.
    pub fn parse_chunks(&mut self) -> Vec<(RegionChunkPosition, Node)> {
        let positions: Vec<_> = self.positions().collect();
        let mut chunks = Vec::with_capacity(positions.len());

        for position in positions {
            match self.parse_chunk_at(position) {
                Ok(Some(node)) => chunks.push((position, node)),
                Ok(None) => {}
                Err(error) => warn!(
                    target: "anvil-nbt",
                    "Skipping region x: {}, z: {} chunk {}: {}",
                    self.position.x, self.position.z, position, error
                ),
            }
        }

        chunks
    }

    fn require_chunk_at(&mut self, position: RegionChunkPosition) -> Result<Node, ChunkReadError> {
        self.parse_chunk_at(position)?
            .ok_or(ChunkReadError::EmptyChunk { position })
    }

    fn parse_chunk_at(
        &mut self,
        position: RegionChunkPosition,
    ) -> Result<Option<Node>, ChunkReadError> {
        let data = self.chunks[position.index()].data.clone();

        if data.is_empty() {
            return Ok(None);
        }

        let root = self.decode_chunk(position, data)?;
        self.check_location(position, &root)?;

        Ok(Some(root))
    }

    fn decode_chunk(
        &mut self,
        position: RegionChunkPosition,
        data: Bytes,
    ) -> Result<Node, ChunkReadError> {
        if data.len() < CHUNK_HEADER_BYTES_LENGTH {
            return Err(ChunkReadError::BadChunk {
                position,
                reason: "chunk header is truncated",
            });
        }

        // Length counts the compression scheme id.
        let length = BigEndian::read_u32(&data[..4]) as usize;

        if length == 0 {
            return Err(ChunkReadError::BadChunk {
                position,
                reason: "chunk has no compression scheme",
            });
        }

        if length + 4 > CHUNK_MAXIMUM_BYTES_LENGTH {
            return Err(ChunkReadError::BadChunk {
                position,
                reason: "chunk length exceeds 256 pages",
            });
        }

        let payload = if 4 + length > data.len() {
            self.report(Diagnostic::MissingData {
                position,
                expected: 4 + length,
                available: data.len(),
            })?;

            let mut filled = data[4..].to_vec();
            filled.resize(length, 0);
            Bytes::from(filled)
        } else {
            data.slice(4..4 + length)
        };

        let compression_scheme = payload[0];
        let compression = Compression::from_id(compression_scheme)
            .ok_or(ChunkReadError::UnknownCompression { compression_scheme })?;

        let buffer = match compression {
            Compression::Uncompressed => payload.slice(1..),
            _ => Bytes::from(
                compression
                    .decompress(&payload[1..])
                    .map_err(|io_error| ChunkReadError::Decompress { io_error })?,
            ),
        };

        let (root, _, _) = read::parse(&buffer, 0)?;

        Ok(root)
    }

    /// Compares the position stored in a chunk with its slot.
    fn check_location(
        &mut self,
        position: RegionChunkPosition,
        root: &Node,
    ) -> Result<(), Diagnostic> {
        let holder = match root.get("Level") {
            Some(level) if level.contains_key("xPos") => level,
            _ => root.clone(),
        };

        let coordinate = |name: &str| holder.get(name).and_then(|node| node.as_i64());

        let found = match (coordinate("xPos"), coordinate("zPos")) {
            (Some(x), Some(z)) => (x, z),
            _ => return Ok(()),
        };

        let expected = position.world_position(self.position);

        if found == expected {
            return Ok(());
        }

        let diagnostic = Diagnostic::InconsistentLocation {
            position,
            expected,
            found,
        };

        if self.mislocated.insert(position) {
            self.record(diagnostic.clone());
        }

        if self.options.strict {
            return Err(diagnostic);
        }

        Ok(())
    }

    /// Encodes `node` into the chunk at `x`, `z` with the default compression.
    ///
    /// The chunk is placed in pages on the next [`Region::write_to`].
    pub fn write_chunk(&mut self, x: i32, z: i32, node: &Node) -> Result<(), ChunkWriteError> {
        let compression = self.options.compression;

        self.write_chunk_at(RegionChunkPosition::from_chunk_position(x, z), node, compression)
    }

    pub fn write_chunk_with(
        &mut self,
        x: i32,
        z: i32,
        node: &Node,
        compression: Compression,
    ) -> Result<(), ChunkWriteError> {
        self.write_chunk_at(RegionChunkPosition::from_chunk_position(x, z), node, compression)
    }

    fn write_chunk_at(
        &mut self,
        position: RegionChunkPosition,
        node: &Node,
        compression: Compression,
    ) -> Result<(), ChunkWriteError> {
        let mut buffer = Vec::new();
        node.write(&mut buffer)?;

        let compressed = compression.compress(&buffer)?;
        // 1 byte for compression scheme id.
        let length = compressed.len() + 1;

        let mut data = Vec::with_capacity(length + 4);
        data.write_u32::<BigEndian>(length as u32)?;
        data.write_u8(compression.id())?;
        data.extend_from_slice(&compressed);

        debug!(
            target: "anvil-nbt",
            "Region x: {}, z: {} chunk {} encoded with length {}",
            self.position.x, self.position.z, position, length
        );

        self.set_chunk_data_at(position, Bytes::from(data))
    }

    /// Raw chunk bytes, empty for an empty slot.
    pub fn chunk_data(&self, x: i32, z: i32) -> Bytes {
        self.chunk_info(x, z).data.clone()
    }

    /// Replaces the raw bytes of a chunk, for example with bytes taken from
    /// another region.
    pub fn set_chunk_data(&mut self, x: i32, z: i32, data: Bytes) -> Result<(), ChunkWriteError> {
        self.set_chunk_data_at(RegionChunkPosition::from_chunk_position(x, z), data)
    }

    fn set_chunk_data_at(
        &mut self,
        position: RegionChunkPosition,
        data: Bytes,
    ) -> Result<(), ChunkWriteError> {
        if pages(data.len()) > CHUNK_MAXIMUM_PAGES {
            return Err(ChunkWriteError::LengthExceedsMaximum {
                length: data.len() as u32,
            });
        }

        let timestamp = if data.is_empty() { 0 } else { now() };
        self.store(position, data, timestamp);

        Ok(())
    }

    fn store(&mut self, position: RegionChunkPosition, data: Bytes, timestamp: u32) {
        self.chunks[position.index()] = ChunkInfo {
            timestamp,
            data,
            ..ChunkInfo::empty(position)
        };
        self.bitmap = None;
        self.mislocated.remove(&position);
        self.dirty = true;
    }

    /// Empties the chunk at `x`, `z`.
    pub fn kill_chunk(&mut self, x: i32, z: i32) {
        let position = RegionChunkPosition::from_chunk_position(x, z);
        self.store(position, Bytes::new(), 0);
    }

    /// Copies the raw bytes of a chunk to another slot.
    pub fn copy_chunk(&mut self, src_x: i32, src_z: i32, dst_x: i32, dst_z: i32) {
        let source = self.chunk_info(src_x, src_z).clone();
        let destination = RegionChunkPosition::from_chunk_position(dst_x, dst_z);

        self.store(destination, source.data, source.timestamp);
    }

    /// Writes the whole region file.
    ///
    /// Every non empty chunk is placed again in header order right after
    /// the header, so stale or overlapping pages never survive a save.
    pub fn write_to<W: Write>(&mut self, out: &mut W) -> Result<(), io::Error> {
        let mut next_page = REGION_HEADER_PAGES;

        for chunk in self.chunks.iter_mut() {
            if chunk.is_empty() {
                chunk.addr = None;
                chunk.size = None;
                continue;
            }

            let size = pages(chunk.data.len()) as u32;
            chunk.addr = Some(next_page);
            chunk.size = Some(size as u8);
            next_page += size;
        }

        for chunk in &self.chunks {
            let location = match (chunk.addr, chunk.size) {
                (Some(addr), Some(size)) => (addr << 8) | size as u32,
                _ => 0,
            };

            out.write_u32::<BigEndian>(location)?;
        }

        for chunk in &self.chunks {
            out.write_u32::<BigEndian>(chunk.timestamp)?;
        }

        let padding = [0u8; REGION_PAGE_BYTES_LENGTH];

        for chunk in self.chunks.iter().filter(|chunk| !chunk.is_empty()) {
            out.write_all(&chunk.data)?;

            // Padding to align page.
            let remainder = chunk.data.len() % REGION_PAGE_BYTES_LENGTH;

            if remainder > 0 {
                out.write_all(&padding[..REGION_PAGE_BYTES_LENGTH - remainder])?;
            }
        }

        self.bitmap = None;
        self.reported_pages.clear();

        debug!(
            target: "anvil-nbt",
            "Region x: {}, z: {} written with {} pages",
            self.position.x, self.position.z, next_page
        );

        Ok(())
    }

    /// Rewrites the file the region was opened from.
    pub fn save(&mut self) -> Result<(), RegionError> {
        let path = self.path.clone().ok_or(RegionError::NoPath)?;

        self.save_to(path)
    }

    pub fn save_to<P: AsRef<Path>>(&mut self, path: P) -> Result<(), RegionError> {
        let mut buffer = Vec::new();
        self.write_to(&mut buffer)?;
        fs::write(path, buffer)?;

        self.dirty = false;

        Ok(())
    }

    /// Saves only when chunks changed, returning whether the file was written.
    pub fn save_if_dirty(&mut self) -> Result<bool, RegionError> {
        if !self.dirty {
            return Ok(false);
        }

        self.save()?;

        Ok(true)
    }
}

/// Chunk slot of a region borrowed for reading or writing.
pub struct ChunkHandle<'a> {
    region: &'a mut Region,
    position: RegionChunkPosition,
}

impl ChunkHandle<'_> {
    pub fn position(&self) -> RegionChunkPosition {
        self.position
    }

    pub fn info(&self) -> &ChunkInfo {
        &self.region.chunks[self.position.index()]
    }

    pub fn parse(&mut self) -> Result<Option<Node>, ChunkReadError> {
        self.region.parse_chunk_at(self.position)
    }

    pub fn write(&mut self, node: &Node) -> Result<(), ChunkWriteError> {
        let compression = self.region.options.compression;

        self.region.write_chunk_at(self.position, node, compression)
    }

    pub fn write_with(&mut self, node: &Node, compression: Compression) -> Result<(), ChunkWriteError> {
        self.region.write_chunk_at(self.position, node, compression)
    }

    pub fn kill(&mut self) {
        self.region.store(self.position, Bytes::new(), 0);
    }

    /// Parses the chunk, runs `edit` on its root and writes the root back
    /// with its original compression when `edit` changed it.
    pub fn edit<F>(&mut self, edit: F) -> Result<(), ChunkEditError>
    where
        F: FnOnce(&Node) -> Result<(), NbtError>,
    {
        let root = self.region.require_chunk_at(self.position)?;
        edit(&root)?;

        if root.is_cached() {
            debug!(
                target: "anvil-nbt",
                "Chunk {} unchanged by edit", self.position
            );

            return Ok(());
        }

        let compression = self
            .info()
            .compression()
            .unwrap_or(self.region.options.compression);

        self.region.write_chunk_at(self.position, &root, compression)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::compression::Compression;
    use crate::diagnostic::Diagnostic;
    use crate::error::{ChunkEditError, ChunkReadError, ChunkWriteError, RegionError};
    use crate::node::Node;
    use crate::position::{RegionChunkPosition, RegionPosition};
    use crate::region::{Region, RegionOptions, REGION_PAGE_BYTES_LENGTH};
    use bytes::Bytes;
    use std::io::Cursor;

    const PAGE: usize = REGION_PAGE_BYTES_LENGTH;

    fn origin() -> RegionPosition {
        RegionPosition::new(0, 0)
    }

    fn pos(x: u8, z: u8) -> RegionChunkPosition {
        RegionChunkPosition::new(x, z)
    }

    /// Region bytes of `pages` pages with location entries `(x, z, page, count)`.
    fn region_bytes(pages: usize, entries: &[(u8, u8, u32, u8)]) -> Vec<u8> {
        let mut data = vec![0; pages * PAGE];

        for &(x, z, page, count) in entries {
            let index = pos(x, z).index() * 4;
            data[index..index + 4].copy_from_slice(&((page << 8) | count as u32).to_be_bytes());
        }

        data
    }

    fn place(data: &mut Vec<u8>, page: usize, bytes: &[u8]) {
        let start = page * PAGE;

        if data.len() < start + bytes.len() {
            data.resize(start + bytes.len(), 0);
        }

        data[start..start + bytes.len()].copy_from_slice(bytes);
    }

    /// Chunk bytes declaring `length` and holding `payload` after the scheme id.
    fn chunk_bytes(length: u32, compression: u8, payload: &[u8]) -> Vec<u8> {
        let mut data = length.to_be_bytes().to_vec();
        data.push(compression);
        data.extend_from_slice(payload);
        data
    }

    fn load(data: Vec<u8>) -> Region {
        Region::from_bytes(origin(), Bytes::from(data), RegionOptions::default()).unwrap()
    }

    fn located(x: i32, z: i32) -> Node {
        let root = Node::compound();
        root.set_value("xPos", x).unwrap();
        root.set_value("zPos", z).unwrap();
        root.set_value("Status", "full").unwrap();
        root
    }

    #[test]
    fn test_empty_state() {
        let mut fresh = Region::new(origin());
        let mut loaded = load(vec![0; 2 * PAGE]);

        for region in [&mut fresh, &mut loaded].iter_mut() {
            for x in 0..32 {
                for z in 0..32 {
                    let info = region.chunk_info(x, z);

                    assert_eq!(info.addr, None);
                    assert_eq!(info.size, None);
                    assert_eq!(info.timestamp, 0);
                    assert!(info.data.is_empty());
                    assert_eq!(region.parse_chunk(x, z).unwrap(), None);
                }
            }

            assert!(region.diagnostics().is_empty());
            assert_eq!(region.positions().count(), 0);
        }
    }

    #[test]
    fn test_short_header_is_extended() {
        let region = load(vec![0; 100]);

        assert!(region.diagnostics().is_empty());
        assert!(region.chunk_info(0, 0).is_empty());
    }

    #[test]
    fn test_missing_data_is_zero_filled() {
        let region = load(((5u32 << 8) | 3).to_be_bytes().to_vec());
        let info = region.chunk_info(0, 0);

        assert_eq!(info.addr, Some(5));
        assert_eq!(info.size, Some(3));
        assert_eq!(info.data, Bytes::from(vec![0; 3 * PAGE]));
        assert_eq!(
            region.diagnostics(),
            &[Diagnostic::MissingData {
                position: pos(0, 0),
                expected: 3 * PAGE,
                available: 0,
            }]
        );
    }

    #[test]
    fn test_bitmap() {
        let mut region = load(region_bytes(7, &[(3, 4, 5, 2)]));
        let bitmap = region.bitmap().to_vec();

        assert_eq!(bitmap.len(), 7);

        for (page, owners) in bitmap.iter().enumerate() {
            if page == 5 || page == 6 {
                assert_eq!(owners, &vec![pos(3, 4)]);
            } else {
                assert!(owners.is_empty());
            }
        }

        assert!(region.diagnostics().is_empty());
    }

    #[test]
    fn test_duplicate_pages_reported_once() {
        let mut region = load(region_bytes(7, &[(0, 1, 5, 2), (3, 4, 5, 2)]));

        assert_eq!(region.bitmap()[5], vec![pos(0, 1), pos(3, 4)]);
        region.bitmap();
        region.check().unwrap();

        region.write_chunk(10, 10, &Node::int(1)).unwrap();
        assert_eq!(region.bitmap()[6], vec![pos(0, 1), pos(3, 4)]);

        assert_eq!(
            region.diagnostics(),
            &[
                Diagnostic::DuplicatePage {
                    page: 5,
                    owners: vec![pos(0, 1), pos(3, 4)],
                },
                Diagnostic::DuplicatePage {
                    page: 6,
                    owners: vec![pos(0, 1), pos(3, 4)],
                },
            ]
        );
    }

    #[test]
    fn test_partial_overlap() {
        let mut region = load(region_bytes(7, &[(0, 1, 4, 2), (3, 4, 5, 2)]));

        assert_eq!(region.bitmap()[4], vec![pos(0, 1)]);
        assert_eq!(region.bitmap()[6], vec![pos(3, 4)]);
        assert_eq!(region.diagnostics().len(), 1);
    }

    #[test]
    fn test_strict_check() {
        let options = RegionOptions {
            strict: true,
            ..RegionOptions::default()
        };
        let data = Bytes::from(region_bytes(7, &[(0, 1, 5, 2), (3, 4, 5, 2)]));
        let mut region = Region::from_bytes(origin(), data, options).unwrap();

        match region.check() {
            Err(RegionError::Diagnostic {
                diagnostic: Diagnostic::DuplicatePage { page: 5, .. },
            }) => {}
            other => panic!("Expected `DuplicatePage` but got `{:?}`", other),
        }

        assert!(region.check().is_err());
    }

    #[test]
    fn test_strict_check_after_bitmap() {
        let options = RegionOptions {
            strict: true,
            ..RegionOptions::default()
        };
        let data = Bytes::from(region_bytes(7, &[(0, 1, 5, 2), (3, 4, 5, 2)]));
        let mut region = Region::from_bytes(origin(), data, options).unwrap();

        region.bitmap();

        assert!(matches!(
            region.check(),
            Err(RegionError::Diagnostic {
                diagnostic: Diagnostic::DuplicatePage { page: 5, .. }
            })
        ));

        region.kill_chunk(0, 1);
        region.check().unwrap();
    }

    #[test]
    fn test_chunk_data_in_header() {
        let region = load(region_bytes(2, &[(3, 4, 1, 1)]));

        assert_eq!(
            region.diagnostics(),
            &[Diagnostic::ChunkDataInHeader {
                position: pos(3, 4),
                page: 1,
            }]
        );
    }

    #[test]
    fn test_strict_load() {
        let options = RegionOptions {
            strict: true,
            ..RegionOptions::default()
        };
        let data = Bytes::from(((5u32 << 8) | 3).to_be_bytes().to_vec());

        match Region::from_bytes(origin(), data, options) {
            Err(RegionError::Diagnostic {
                diagnostic: Diagnostic::MissingData { .. },
            }) => {}
            Err(error) => panic!("Expected `MissingData` but got `{:?}`", error),
            Ok(_) => panic!("Expected `MissingData` but region loaded"),
        }
    }

    #[test]
    fn test_round_trip_via_save() {
        let mut region = Region::new(origin());
        region.write_chunk(1, 2, &Node::int(3)).unwrap();

        assert_eq!(region.chunk_info(1, 2).addr, None);
        assert!(region.is_dirty());

        let mut buffer = Vec::new();
        region.write_to(&mut buffer).unwrap();

        assert_eq!(buffer.len(), 3 * PAGE);
        assert_eq!(&buffer[65 * 4..66 * 4], &[0, 0, 2, 1]);
        assert_eq!(&buffer[..4], &[0, 0, 0, 0]);
        assert_eq!(region.chunk_info(1, 2).addr, Some(2));
        assert_eq!(region.chunk_info(1, 2).size, Some(1));

        let mut reloaded = Region::load(origin(), Cursor::new(buffer)).unwrap();

        assert_eq!(reloaded.parse_chunk(1, 2).unwrap().unwrap(), 3);
        assert_eq!(reloaded.parse_chunk(33, 34).unwrap().unwrap(), 3);
        assert!(reloaded.diagnostics().is_empty());
        assert!(!reloaded.is_dirty());
    }

    #[test]
    fn test_reflow_packs_chunks_in_header_order() {
        let mut region = load(region_bytes(9, &[(0, 1, 7, 2), (3, 0, 2, 1)]));
        region.kill_chunk(3, 0);
        region.write_chunk(0, 0, &Node::int(1)).unwrap();

        let mut buffer = Vec::new();
        region.write_to(&mut buffer).unwrap();

        assert_eq!(region.chunk_info(0, 0).addr, Some(2));
        assert_eq!(region.chunk_info(0, 1).addr, Some(3));
        assert_eq!(region.chunk_info(0, 1).size, Some(2));
        assert_eq!(region.chunk_info(3, 0).addr, None);
        assert_eq!(buffer.len(), 5 * PAGE);
        assert_eq!(region.bitmap().len(), 5);
    }

    #[test]
    fn test_kill_chunk() {
        let mut region = load(region_bytes(6, &[(2, 1, 5, 1)]));

        assert_eq!(region.bitmap()[5], vec![pos(2, 1)]);

        region.kill_chunk(2, 1);

        assert!(region.chunk_info(2, 1).is_empty());
        assert_eq!(region.bitmap().len(), 2);
        assert_eq!(region.parse_chunk(2, 1).unwrap(), None);
        assert!(region.is_dirty());
    }

    #[test]
    fn test_copy_chunk() {
        let mut region = Region::new(origin());
        region.write_chunk(0, 0, &Node::string("copied")).unwrap();
        region.copy_chunk(0, 0, 5, 5);

        assert_eq!(region.chunk_data(5, 5), region.chunk_data(0, 0));
        assert_eq!(
            region.chunk_info(5, 5).timestamp,
            region.chunk_info(0, 0).timestamp
        );
        assert_eq!(region.parse_chunk(5, 5).unwrap().unwrap(), "copied");
    }

    #[test]
    fn test_transfer_between_regions() {
        let mut source = Region::new(origin());
        let mut destination = Region::new(RegionPosition::new(1, 1));

        source.write_chunk(4, 4, &Node::long(-1)).unwrap();
        destination
            .set_chunk_data(7, 7, source.chunk_data(4, 4))
            .unwrap();

        assert_eq!(destination.parse_chunk(7, 7).unwrap().unwrap(), -1);
        assert_eq!(destination.positions().collect::<Vec<_>>(), vec![pos(7, 7)]);
    }

    #[test]
    fn test_parse_chunk_compressions() {
        for &compression in &[Compression::Gzip, Compression::Zlib, Compression::Uncompressed] {
            let mut region = Region::new(origin());
            region
                .write_chunk_with(1, 1, &located(1, 1), compression)
                .unwrap();

            let mut buffer = Vec::new();
            region.write_to(&mut buffer).unwrap();

            let mut reloaded = load(buffer);
            let root = reloaded.parse_chunk(1, 1).unwrap().unwrap();

            assert_eq!(reloaded.chunk_info(1, 1).compression(), Some(compression));
            assert_eq!(root, located(1, 1));
            assert!(reloaded.diagnostics().is_empty());
        }
    }

    #[test]
    fn test_unknown_compression() {
        let mut data = region_bytes(3, &[(0, 0, 2, 1)]);
        place(&mut data, 2, &chunk_bytes(2, 9, &[0]));

        match load(data).parse_chunk(0, 0) {
            Err(ChunkReadError::UnknownCompression {
                compression_scheme: 9,
            }) => {}
            other => panic!("Expected `UnknownCompression` but got `{:?}`", other),
        }
    }

    #[test]
    fn test_bad_chunk_lengths() {
        let mut oversized = region_bytes(3, &[(0, 0, 2, 1)]);
        place(&mut oversized, 2, &chunk_bytes(256 * PAGE as u32, 2, &[]));

        let mut zero = region_bytes(3, &[(0, 0, 2, 1)]);
        place(&mut zero, 2, &chunk_bytes(0, 2, &[]));

        for data in vec![oversized, zero] {
            match load(data).parse_chunk(0, 0) {
                Err(ChunkReadError::BadChunk { position, .. }) => assert_eq!(position, pos(0, 0)),
                other => panic!("Expected `BadChunk` but got `{:?}`", other),
            }
        }
    }

    #[test]
    fn test_declared_length_exceeds_data() {
        let nbt = located(0, 0).to_bytes(Some("")).unwrap();
        let mut data = region_bytes(3, &[(0, 0, 2, 1)]);
        place(&mut data, 2, &chunk_bytes(2 * PAGE as u32, 3, &nbt));

        let mut region = load(data.clone());
        let root = region.parse_chunk(0, 0).unwrap().unwrap();

        assert_eq!(root, located(0, 0));
        assert_eq!(
            region.diagnostics(),
            &[Diagnostic::MissingData {
                position: pos(0, 0),
                expected: 2 * PAGE + 4,
                available: PAGE,
            }]
        );

        let options = RegionOptions {
            strict: true,
            ..RegionOptions::default()
        };
        let mut strict = Region::from_bytes(origin(), Bytes::from(data), options).unwrap();

        assert!(matches!(
            strict.parse_chunk(0, 0),
            Err(ChunkReadError::Diagnostic {
                diagnostic: Diagnostic::MissingData { .. }
            })
        ));
    }

    #[test]
    fn test_inconsistent_location() {
        let mut region = Region::new(RegionPosition::new(1, -1));
        region.write_chunk(1, 2, &located(5, -30)).unwrap();
        region.write_chunk(3, 4, &located(35, -28)).unwrap();

        let legacy = Node::compound();
        legacy.set("Level", located(32, -32)).unwrap();
        region.write_chunk(0, 0, &legacy).unwrap();

        assert!(region.parse_chunk(1, 2).unwrap().is_some());
        assert!(region.parse_chunk(3, 4).unwrap().is_some());
        assert!(region.parse_chunk(0, 0).unwrap().is_some());

        assert_eq!(
            region.diagnostics(),
            &[Diagnostic::InconsistentLocation {
                position: pos(1, 2),
                expected: (33, -30),
                found: (5, -30),
            }]
        );
    }

    #[test]
    fn test_inconsistent_location_reported_once() {
        let mut region = Region::new(origin());
        region.write_chunk(0, 0, &located(9, 9)).unwrap();

        region.parse_chunk(0, 0).unwrap();
        region.parse_chunk(0, 0).unwrap();
        region.parse_chunks();

        assert_eq!(region.diagnostics().len(), 1);

        region.write_chunk(0, 0, &located(8, 8)).unwrap();
        region.parse_chunk(0, 0).unwrap();

        assert_eq!(region.diagnostics().len(), 2);
    }

    #[test]
    fn test_location_of_distant_region() {
        let mut region = Region::new(RegionPosition::new(100_000_000, -100_000_000));
        let root = Node::compound();
        root.set("xPos", Node::long(3_200_000_001)).unwrap();
        root.set("zPos", Node::long(-3_199_999_998)).unwrap();
        region.write_chunk(1, 2, &root).unwrap();

        assert!(region.parse_chunk(1, 2).unwrap().is_some());
        assert!(region.diagnostics().is_empty());

        region.write_chunk(1, 2, &located(1, 2)).unwrap();
        region.parse_chunk(1, 2).unwrap();

        assert_eq!(
            region.diagnostics(),
            &[Diagnostic::InconsistentLocation {
                position: pos(1, 2),
                expected: (3_200_000_001, -3_199_999_998),
                found: (1, 2),
            }]
        );
    }

    #[test]
    fn test_parse_chunks_skips_bad_chunks() {
        let mut region = Region::new(origin());
        region.write_chunk(0, 0, &Node::int(1)).unwrap();
        region
            .set_chunk_data(1, 0, Bytes::from(chunk_bytes(2, 9, &[0])))
            .unwrap();
        region.write_chunk(2, 0, &Node::int(2)).unwrap();

        let chunks = region.parse_chunks();

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].0, pos(0, 0));
        assert_eq!(chunks[1].0, pos(2, 0));
        assert_eq!(chunks[1].1, 2);
    }

    #[test]
    fn test_write_chunk_too_large() {
        let mut region = Region::new(origin());
        let array = Node::byte_array(vec![1; 255 * PAGE]);

        match region.write_chunk_with(0, 0, &array, Compression::Uncompressed) {
            Err(ChunkWriteError::LengthExceedsMaximum { .. }) => {}
            other => panic!("Expected `LengthExceedsMaximum` but got `{:?}`", other),
        }

        assert!(region.chunk_info(0, 0).is_empty());
    }

    #[test]
    fn test_chunk_handle() {
        let mut region = Region::new(origin());
        let mut handle = region.chunk(33, 1);

        assert_eq!(handle.position(), pos(1, 1));
        assert_eq!(handle.parse().unwrap(), None);

        handle.write(&located(1, 1)).unwrap();
        assert_eq!(handle.info().compression(), Some(Compression::Zlib));
        assert_eq!(handle.parse().unwrap().unwrap(), located(1, 1));

        handle.kill();
        assert!(handle.info().is_empty());
    }

    #[test]
    fn test_edit_writes_back_changes_only() {
        let mut region = Region::new(origin());
        region
            .write_chunk_with(0, 0, &located(0, 0), Compression::Gzip)
            .unwrap();

        let mut buffer = Vec::new();
        region.write_to(&mut buffer).unwrap();
        let mut region = load(buffer);
        let before = region.chunk_data(0, 0);

        region.chunk(0, 0).edit(|_| Ok(())).unwrap();
        assert_eq!(region.chunk_data(0, 0), before);
        assert!(!region.is_dirty());

        region
            .chunk(0, 0)
            .edit(|root| root.set_value("Status", "empty"))
            .unwrap();

        assert!(region.is_dirty());
        assert_eq!(region.chunk_info(0, 0).compression(), Some(Compression::Gzip));

        let root = region.parse_chunk(0, 0).unwrap().unwrap();
        assert_eq!(root.get("Status").unwrap(), "empty");
        assert_eq!(root.get("xPos").unwrap(), 0);
    }

    #[test]
    fn test_edit_empty_chunk() {
        let mut region = Region::new(origin());

        match region.chunk(3, 3).edit(|_| Ok(())) {
            Err(ChunkEditError::Read(ChunkReadError::EmptyChunk { position })) => {
                assert_eq!(position, pos(3, 3))
            }
            other => panic!("Expected `EmptyChunk` but got `{:?}`", other),
        }

        assert!(matches!(
            region.require_chunk(3, 3),
            Err(ChunkReadError::EmptyChunk { .. })
        ));
    }

    #[test]
    fn test_open_and_save() {
        let folder = tempfile::tempdir().unwrap();
        let path = folder.path().join("r.-1.2.mca");

        let mut region = Region::open(&path).unwrap();

        assert_eq!(region.position(), RegionPosition::new(-1, 2));
        assert_eq!(region.path(), Some(path.as_path()));
        assert!(!region.save_if_dirty().unwrap());
        assert!(!path.exists());

        region.write_chunk(31, 0, &located(-1, 64)).unwrap();
        assert!(region.save_if_dirty().unwrap());
        assert!(!region.is_dirty());

        let mut reopened = Region::open(&path).unwrap();

        assert_eq!(
            reopened.parse_chunk(31, 0).unwrap().unwrap(),
            located(-1, 64)
        );
        assert!(reopened.diagnostics().is_empty());
        assert_eq!(std::fs::metadata(&path).unwrap().len(), 3 * PAGE as u64);
    }

    #[test]
    fn test_save_without_path() {
        let mut region = Region::new(origin());

        assert!(matches!(region.save(), Err(RegionError::NoPath)));
    }
}
