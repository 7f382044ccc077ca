use crate::error::{Result, TmxError};
use crate::tileset::Tileset;
use serde::Serialize;

/// Normalized atlas rectangle for one tile.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct TileUv {
    /// Left edge.
    pub u: f32,
    /// Top edge.
    pub v: f32,
    /// Right edge.
    pub u2: f32,
    /// Bottom edge.
    pub v2: f32,
}

/// Texture coordinates of `flat_index` inside `tileset`'s image.
///
/// `pixel_correction` (0.5 is typical) pulls every edge inward by that many
/// texels so neighbouring tiles do not bleed in when sampling. With `flip_y`
/// the v range is mirrored for bottom-up texture origins.
///
/// The margin is scaled by the tile's column/row index, and spacing is added
/// once; atlases built with both margin and spacing rely on exactly this.
pub fn compute_uv(
    tileset: &Tileset,
    flat_index: u32,
    pixel_correction: f32,
    flip_y: bool,
) -> Result<TileUv> {
    let tile_count = tileset.tile_count();
    if flat_index >= tile_count {
        return Err(TmxError::InvalidTileIndex {
            index: flat_index,
            tile_count,
        });
    }

    let x_index = (flat_index % tileset.col_count) as f32;
    let y_index = (flat_index / tileset.col_count) as f32;

    let tile_w = tileset.tile_width as f32;
    let tile_h = tileset.tile_height as f32;
    let image_w = tileset.image.width as f32;
    let image_h = tileset.image.height as f32;

    let width_delta = tileset.spacing as f32 + tileset.margin as f32 * x_index;
    let height_delta = tileset.spacing as f32 + tileset.margin as f32 * y_index;

    let u = (x_index * tile_w + width_delta + pixel_correction) / image_w;
    let v = (y_index * tile_h + height_delta + pixel_correction) / image_h;
    let u2 = ((x_index + 1.0) * tile_w + width_delta - pixel_correction) / image_w;
    let v2 = ((y_index + 1.0) * tile_h + height_delta - pixel_correction) / image_h;

    Ok(if flip_y {
        TileUv {
            u,
            v: 1.0 - v2,
            u2,
            v2: 1.0 - v,
        }
    } else {
        TileUv { u, v, u2, v2 }
    })
}
