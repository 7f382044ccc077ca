use crate::error::{Result, TmxError};
use crate::tileset::Tileset;
use serde::Serialize;

/// Horizontal flip flag.
pub const FLIP_H: u32 = 0x8000_0000; // bit 31
/// Vertical flip flag.
pub const FLIP_V: u32 = 0x4000_0000; // bit 30
/// Diagonal flip flag.
pub const FLIP_D: u32 = 0x2000_0000; // bit 29
/// Clears the flip flags.
pub const GID_MASK: u32 = 0x1FFF_FFFF; // keep lower 29 bits

/// A gid exactly as stored in the file, flip bits included.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct TileId(pub u32);

impl TileId {
    /// Gid with flags.
    #[inline] pub fn raw(self) -> u32 { self.0 }
    /// Gid without flags.
    #[inline] pub fn clean(self) -> u32 { self.0 & GID_MASK }
    /// Horizontal flip set.
    #[inline] pub fn flip_h(self) -> bool { (self.0 & FLIP_H) != 0 }
    /// Vertical flip set.
    #[inline] pub fn flip_v(self) -> bool { (self.0 & FLIP_V) != 0 }
    /// Diagonal flip set.
    #[inline] pub fn flip_d(self) -> bool { (self.0 & FLIP_D) != 0 }
    /// No tile.
    #[inline] pub fn is_empty(self) -> bool { self.clean() == 0 }
}

/// Where a gid lives: which tileset, and which cell of that tileset's grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct TileLocation {
    /// Position in [`Map::tilesets`](crate::Map::tilesets).
    pub tileset_index: usize,
    /// Row-major cell of the tileset grid.
    pub flat_index: u32,
}

/// Maps a flag-free gid onto its tileset.
///
/// Gid 0 is "no tile" and always yields the zero location, even with no
/// tilesets at all. Otherwise tilesets are scanned in document order; the
/// flat index is measured from the end of the previous tileset's range
/// (starting at 1), so tilesets are expected in increasing, non-overlapping
/// `firstgid` order.
pub fn resolve_gid(tilesets: &[Tileset], gid: u32) -> Result<TileLocation> {
    if gid == 0 {
        return Ok(TileLocation::default());
    }

    let mut last_end = 1u32;
    for (i, ts) in tilesets.iter().enumerate() {
        let (start, end) = ts.gid_range();
        if gid >= start && gid < end {
            // only underflows when tilesets are out of firstgid order
            let flat_index = gid
                .checked_sub(last_end)
                .ok_or(TmxError::UnknownTileIndices { gid })?;
            return Ok(TileLocation {
                tileset_index: i,
                flat_index,
            });
        }
        last_end = end;
    }

    Err(TmxError::UnknownTileIndices { gid })
}
