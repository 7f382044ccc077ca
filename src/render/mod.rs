pub mod uv;

pub use uv::{compute_uv, TileUv};
