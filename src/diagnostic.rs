use crate::position::RegionChunkPosition;
use std::fmt::{self, Display};

/// Recoverable damage found in a region file.
///
/// A lenient region logs and records these and carries on, a strict region
/// turns them into errors.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Diagnostic {
    /// Location entry points into the two header pages.
    ChunkDataInHeader {
        position: RegionChunkPosition,
        page: u32,
    },
    /// Several chunks claim the same page.
    DuplicatePage {
        page: usize,
        owners: Vec<RegionChunkPosition>,
    },
    /// Chunk data runs past the end of the available bytes, missing bytes
    /// were filled with zeros.
    MissingData {
        position: RegionChunkPosition,
        expected: usize,
        available: usize,
    },
    /// Chunk coordinates stored in the chunk disagree with its slot.
    InconsistentLocation {
        position: RegionChunkPosition,
        expected: (i64, i64),
        found: (i64, i64),
    },
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Diagnostic::*;
        match self {
            ChunkDataInHeader { position, page } => write!(
                f,
                "Chunk {} data starts at page {} inside the region header",
                position, page
            ),
            DuplicatePage { page, owners } => {
                write!(f, "Page {} is shared by chunks", page)?;

                for owner in owners {
                    write!(f, " {}", owner)?;
                }

                Ok(())
            }
            MissingData {
                position,
                expected,
                available,
            } => write!(
                f,
                "Chunk {} expects {} bytes but only {} are available",
                position, expected, available
            ),
            InconsistentLocation {
                position,
                expected,
                found,
            } => write!(
                f,
                "Chunk {} stores location {:?} instead of {:?}",
                position, found, expected
            ),
        }
    }
}
