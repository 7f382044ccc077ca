use crate::error::{Result, TmxError};
use crate::object::ObjectGroup;
use crate::properties::Properties;
use serde::Serialize;
use std::collections::BTreeMap;

/// An `<image>` reference. `source` is rewritten against the caller's image
/// base path once the whole map has been read.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Image {
    /// File path as written, or rebased onto the image base path.
    pub source: String,
    /// Format hint for embedded images.
    pub format: Option<String>,
    /// The `trans` color key, hex without `#`.
    pub transparent_color: Option<String>,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

/// Pixel offset applied when drawing tiles of a tileset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TileOffset {
    /// Horizontal offset in pixels.
    pub x: i32,
    /// Vertical offset in pixels.
    pub y: i32,
}

/// One step of a tile animation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AnimationFrame {
    /// Local id inside the owning tileset.
    pub tile_id: u32,
    /// Milliseconds.
    pub duration: f32,
}

/// Extra data for one tile of a tileset. Only tiles carrying properties,
/// animation frames or collision shapes get one.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TileDefinition {
    /// Local id inside the tileset.
    pub id: u32,
    /// Custom properties.
    pub properties: Properties,
    /// Animation frames in playback order.
    pub animation: Vec<AnimationFrame>,
    /// Collision shapes.
    pub object_groups: Vec<ObjectGroup>,
}

impl TileDefinition {
    /// True when the tile carries nothing worth keeping.
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty() && self.animation.is_empty() && self.object_groups.is_empty()
    }
}

/// One image atlas sliced into a regular grid.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tileset {
    /// Gid of the tileset's first tile.
    pub first_gid: u32,
    /// Tileset name.
    pub name: String,
    /// Tile width in pixels.
    pub tile_width: u32,
    /// Tile height in pixels.
    pub tile_height: u32,
    /// Pixels between neighbouring tiles.
    pub spacing: u32,
    /// Pixels around the tile grid.
    pub margin: u32,
    /// Drawing offset.
    pub offset: TileOffset,
    /// The atlas image.
    pub image: Image,
    /// Custom properties.
    pub properties: Properties,
    /// Sparse per-tile data keyed by local id.
    pub tile_definitions: BTreeMap<u32, TileDefinition>,
    /// Columns in the atlas grid.
    pub col_count: u32,
    /// Rows in the atlas grid.
    pub row_count: u32,
}

impl Tileset {
    /// Number of tiles in the grid.
    pub fn tile_count(&self) -> u32 {
        self.col_count.saturating_mul(self.row_count)
    }

    /// Half-open gid range `[first_gid, first_gid + tile_count)`.
    pub fn gid_range(&self) -> (u32, u32) {
        (self.first_gid, self.first_gid.saturating_add(self.tile_count()))
    }

    /// Extra data for a local tile id, if it has any.
    pub fn tile_definition(&self, local_id: u32) -> Option<&TileDefinition> {
        self.tile_definitions.get(&local_id)
    }
}

/// `(image - margin) / (tile + spacing)` along one axis.
pub(crate) fn grid_cells(image: u32, tile: u32, spacing: u32, margin: u32) -> Result<u32> {
    let step = tile.saturating_add(spacing);
    if step == 0 {
        return Err(TmxError::parsing(
            "tileset",
            "tile size plus spacing must be greater than zero",
        ));
    }
    Ok(image.saturating_sub(margin) / step)
}

/// Derives `(col_count, row_count)` from the image and tile geometry.
pub(crate) fn grid_dimensions(
    image: &Image,
    tile_width: u32,
    tile_height: u32,
    spacing: u32,
    margin: u32,
) -> Result<(u32, u32)> {
    Ok((
        grid_cells(image.width, tile_width, spacing, margin)?,
        grid_cells(image.height, tile_height, spacing, margin)?,
    ))
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn grid_uses_margin_and_spacing() {
        let image = Image {
            width: 528,
            height: 448,
            ..Image::default()
        };
        assert_eq!(grid_dimensions(&image, 16, 16, 0, 0).unwrap(), (33, 28));
        // (528 - 2) / (16 + 1) = 30, (448 - 2) / 17 = 26
        assert_eq!(grid_dimensions(&image, 16, 16, 1, 2).unwrap(), (30, 26));
    }

    #[test]
    fn degenerate_tile_size_is_rejected() {
        let image = Image {
            width: 64,
            height: 64,
            ..Image::default()
        };
        let err = grid_dimensions(&image, 0, 16, 0, 0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ErrorParsing);
    }

    #[test]
    fn margin_larger_than_image_gives_empty_grid() {
        assert_eq!(grid_cells(8, 16, 0, 32).unwrap(), 0);
    }

    #[test]
    fn gid_range_is_half_open() {
        let ts = testing::atlas(925, 16, 16, 384, 464);
        assert_eq!(ts.gid_range(), (925, 1621));
    }
}
