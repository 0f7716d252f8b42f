use std::fmt::{self, Display};
use std::path::Path;
use std::str::FromStr;

/// Amount of chunks along one side of a region.
pub const REGION_SIDE_CHUNKS: i32 = 32;

#[derive(Debug, Default, Ord, PartialOrd, Eq, PartialEq, Hash, Copy, Clone)]
pub struct RegionPosition {
    pub x: i32,
    pub z: i32,
}

impl RegionPosition {
    pub fn new(x: i32, z: i32) -> RegionPosition {
        RegionPosition { x, z }
    }

    pub fn from_chunk_position(chunk_x: i32, chunk_z: i32) -> RegionPosition {
        let x = chunk_x >> 5;
        let z = chunk_z >> 5;

        RegionPosition::new(x, z)
    }

    /// Parses `r.<x>.<z>.mca` file names.
    pub fn from_filename(path: &Path) -> Option<RegionPosition> {
        // we can use lossy because of the parse check later
        let filename = path.file_name()?.to_string_lossy();
        let parts: Vec<_> = filename.split('.').collect();

        let incorrect_format = parts.len() != 4 || parts[0] != "r" || parts[3] != "mca";

        if incorrect_format {
            return None;
        }

        Some(RegionPosition::new(
            i32::from_str(parts[1]).ok()?,
            i32::from_str(parts[2]).ok()?,
        ))
    }

    pub fn filename(&self) -> String {
        format!("r.{}.{}.mca", self.x, self.z)
    }
}

/// Position of a chunk inside its region, each coordinate in `0..32`.
#[derive(Debug, Ord, PartialOrd, Eq, PartialEq, Hash, Copy, Clone)]
pub struct RegionChunkPosition {
    pub x: u8,
    pub z: u8,
}

impl RegionChunkPosition {
    pub fn new(x: u8, z: u8) -> RegionChunkPosition {
        debug_assert!(32 > x, "Region chunk x coordinate out of bounds");
        debug_assert!(32 > z, "Region chunk z coordinate out of bounds");

        RegionChunkPosition { x, z }
    }

    /// Wraps world chunk coordinates, or any coordinates, into the region.
    pub fn from_chunk_position(chunk_x: i32, chunk_z: i32) -> RegionChunkPosition {
        let x = (chunk_x & 31) as u8;
        let z = (chunk_z & 31) as u8;

        RegionChunkPosition::new(x, z)
    }

    /// Slot of the chunk in the region header.
    pub fn index(&self) -> usize {
        self.x as usize + self.z as usize * 32
    }

    pub fn from_index(index: usize) -> RegionChunkPosition {
        RegionChunkPosition::new((index % 32) as u8, (index / 32 % 32) as u8)
    }

    /// World chunk coordinates of this position inside `region`.
    pub fn world_position(&self, region: RegionPosition) -> (i64, i64) {
        let side = i64::from(REGION_SIDE_CHUNKS);

        (
            i64::from(region.x) * side + i64::from(self.x),
            i64::from(region.z) * side + i64::from(self.z),
        )
    }
}

impl Display for RegionChunkPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.z)
    }
}
