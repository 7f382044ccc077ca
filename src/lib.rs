#![warn(missing_docs)]

//! Tiled TMX map loader.
//!
//! Turns a `.tmx` document into a [`Map`]: tilesets with their atlas geometry,
//! tile layers whose cells are already resolved to `(tileset, flat index)` with
//! flip flags split out, object groups and image layers. [`compute_uv`] gives
//! the normalized atlas rectangle for any tile.

mod config;
mod diagnostics;
mod error;
mod loader;
mod map;
mod object;
mod properties;
mod render;
mod spatial;
mod tileset;

pub use config::ParseOptions;
pub use diagnostics::{Fields, LogLogger, NullLogger, ParseLogger};
pub use error::{ErrorKind, Result, TmxError};
pub use loader::compression::{decompress, Compression};
pub use loader::data::{parse_base64, parse_csv, Encoding};
pub use map::{ImageLayer, Layer, Map, Orientation, TileRecord, TmxParser};
pub use object::{parse_points, Object, ObjectGroup, ObjectShape, Point};
pub use properties::Properties;
pub use render::{compute_uv, TileUv};
pub use spatial::{resolve_gid, TileId, TileLocation, FLIP_D, FLIP_H, FLIP_V, GID_MASK};
pub use tileset::{AnimationFrame, Image, TileDefinition, TileOffset, Tileset};
