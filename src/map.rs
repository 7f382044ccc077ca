use crate::config::ParseOptions;
use crate::diagnostics::{ParseLogger, DEFAULT_LOGGER};
use crate::error::{Result, TmxError};
use crate::loader::{tmx_loader, LoadContext};
use crate::object::ObjectGroup;
use crate::properties::Properties;
use crate::render::{compute_uv, TileUv};
use crate::spatial::{resolve_gid, TileId, TileLocation};
use crate::tileset::{Image, Tileset};
use serde::Serialize;
use std::path::Path;
use std::str::FromStr;

/// Map projection from the `orientation` attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    /// Square grid; also the default when the attribute is absent.
    #[default]
    Orthogonal,
    /// Diamond projection.
    Isometric,
    /// Staggered isometric rows.
    Staggered,
}

impl FromStr for Orientation {
    type Err = TmxError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "orthogonal" => Ok(Orientation::Orthogonal),
            "isometric" => Ok(Orientation::Isometric),
            "staggered" => Ok(Orientation::Staggered),
            other => Err(TmxError::parsing(
                "map",
                format!("unknown orientation '{other}'"),
            )),
        }
    }
}

/// One cell of a tile layer, flip bits split out of the gid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct TileRecord {
    /// Gid with the flip bits cleared; 0 means the cell is empty.
    pub gid: u32,
    /// Tileset and flat index; zeroed for empty cells.
    pub location: TileLocation,
    /// Mirrored horizontally.
    pub flip_h: bool,
    /// Mirrored vertically.
    pub flip_v: bool,
    /// Mirrored along the anti-diagonal.
    pub flip_d: bool,
}

impl TileRecord {
    /// Strips the flip bits off a raw gid and finds its tileset.
    pub fn resolve(tilesets: &[Tileset], raw: u32) -> Result<Self> {
        let id = TileId(raw);
        Ok(TileRecord {
            gid: id.clean(),
            location: resolve_gid(tilesets, id.clean())?,
            flip_h: id.flip_h(),
            flip_v: id.flip_v(),
            flip_d: id.flip_d(),
        })
    }

    /// True for cells holding no tile.
    pub fn is_empty(&self) -> bool {
        self.gid == 0
    }
}

/// A `<layer>` of tiles.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Layer {
    /// Layer name as shown in the editor.
    pub name: String,
    /// Size in cells.
    pub width: u32,
    /// Height in cells.
    pub height: u32,
    /// Layer opacity, 1.0 when absent.
    pub opacity: f32,
    /// False when the layer is hidden.
    pub visible: bool,
    /// Custom properties.
    pub properties: Properties,
    /// Row-major, normally `width * height` long.
    pub tiles: Vec<TileRecord>,
}

impl Layer {
    /// Cell at column `x`, row `y`.
    pub fn tile_at(&self, x: u32, y: u32) -> Option<&TileRecord> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.tiles.get(y as usize * self.width as usize + x as usize)
    }
}

/// An `<imagelayer>`: one image drawn at a pixel offset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageLayer {
    /// Layer name as shown in the editor.
    pub name: String,
    /// Horizontal pixel offset, truncated from the file's float value.
    pub offset_x: i32,
    /// Vertical pixel offset, truncated from the file's float value.
    pub offset_y: i32,
    /// Width in tiles.
    pub width: u32,
    /// Height in tiles.
    pub height: u32,
    /// Layer opacity, 1.0 when absent.
    pub opacity: f32,
    /// False when the layer is hidden.
    pub visible: bool,
    /// Custom properties.
    pub properties: Properties,
    /// The drawn image; Tiled allows saving an image layer without one.
    pub image: Option<Image>,
}

/// A fully loaded TMX document. Built in one go by a parse call; nothing in it
/// refers back to the XML it came from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Map {
    /// TMX format version, empty when absent.
    pub version: String,
    /// Grid projection.
    pub orientation: Orientation,
    /// Width in cells.
    pub width: u32,
    /// Height in cells.
    pub height: u32,
    /// Cell width in pixels.
    pub tile_width: u32,
    /// Cell height in pixels.
    pub tile_height: u32,
    /// `#rrggbb` or `#aarrggbb` as written in the file.
    pub background_color: Option<String>,
    /// Draw order of tiles, `right-down` when absent.
    pub render_order: String,
    /// Custom map properties.
    pub properties: Properties,
    /// In document order, which is also gid order.
    pub tilesets: Vec<Tileset>,
    /// Tile layers in document order.
    pub layers: Vec<Layer>,
    /// Object groups in document order.
    pub object_groups: Vec<ObjectGroup>,
    /// Image layers in document order.
    pub image_layers: Vec<ImageLayer>,
}

impl Map {
    /// Parses a TMX file, prefixing bare image file names with `image_base_path`.
    pub fn parse_from_path(path: impl AsRef<Path>, image_base_path: &str) -> Result<Self> {
        TmxParser::new(ParseOptions::new().with_image_base_path(image_base_path)).parse_path(path)
    }

    /// Parses an in-memory TMX document.
    pub fn parse_from_buffer(bytes: &[u8], image_base_path: &str) -> Result<Self> {
        TmxParser::new(ParseOptions::new().with_image_base_path(image_base_path))
            .parse_buffer(bytes)
    }

    /// Parses a TMX file with images resolved next to the map file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let map_dir = path
            .parent()
            .map(|d| d.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self::parse_from_path(path, &map_dir)
    }

    /// Tileset owning a non-empty cell.
    pub fn tileset_for(&self, record: &TileRecord) -> Option<&Tileset> {
        if record.is_empty() {
            return None;
        }
        self.tilesets.get(record.location.tileset_index)
    }

    /// Atlas UVs for a layer cell, `None` for empty cells.
    pub fn tile_uv(
        &self,
        record: &TileRecord,
        pixel_correction: f32,
        flip_y: bool,
    ) -> Result<Option<TileUv>> {
        if record.is_empty() {
            return Ok(None);
        }
        let tileset = self
            .tileset_for(record)
            .ok_or(TmxError::UnknownTileIndices { gid: record.gid })?;
        compute_uv(tileset, record.location.flat_index, pixel_correction, flip_y).map(Some)
    }
}

/// Parser front end carrying options and the diagnostics sink.
///
/// ```no_run
/// use tmx_loader::{ParseOptions, TmxParser};
///
/// let map = TmxParser::new(ParseOptions::new().with_image_base_path("assets"))
///     .parse_path("assets/level.tmx")?;
/// println!("{} layers", map.layers.len());
/// # Ok::<(), tmx_loader::TmxError>(())
/// ```
pub struct TmxParser<'l> {
    options: ParseOptions,
    logger: &'l dyn ParseLogger,
}

impl TmxParser<'static> {
    /// Reports through the `log` facade.
    pub fn new(options: ParseOptions) -> Self {
        TmxParser {
            options,
            logger: &DEFAULT_LOGGER,
        }
    }
}

impl<'l> TmxParser<'l> {
    /// Sends diagnostics to `logger` instead of the `log` facade.
    pub fn with_logger<'n>(self, logger: &'n dyn ParseLogger) -> TmxParser<'n> {
        TmxParser {
            options: self.options,
            logger,
        }
    }

    /// Options this parser runs with.
    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    /// Reads and parses a file.
    pub fn parse_path(&self, path: impl AsRef<Path>) -> Result<Map> {
        let path = path.as_ref();
        let txt = std::fs::read_to_string(path).map_err(|source| TmxError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.parse_str(&txt)
    }

    /// Parses UTF-8 bytes.
    pub fn parse_buffer(&self, bytes: &[u8]) -> Result<Map> {
        let txt = std::str::from_utf8(bytes)
            .map_err(|e| TmxError::parsing("map", format!("document is not UTF-8: {e}")))?;
        self.parse_str(txt)
    }

    /// Parses a document already in memory.
    pub fn parse_str(&self, text: &str) -> Result<Map> {
        let ctx = LoadContext {
            options: &self.options,
            logger: self.logger,
        };
        tmx_loader::decode_document(text, &ctx)
    }
}
