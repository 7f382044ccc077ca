pub mod gid;

pub use gid::{resolve_gid, TileId, TileLocation, FLIP_D, FLIP_H, FLIP_V, GID_MASK};
