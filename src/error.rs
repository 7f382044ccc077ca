use std::{io, path::PathBuf};
use thiserror::Error;

/// Flat classification of every failure the loader can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed structure, unsupported encoding, bad numbers, missing shape points.
    ErrorParsing,
    /// A required attribute was absent.
    MissingRequiredAttribute,
    /// The document root is not a `map` element.
    MissingMapNode,
    /// A tile layer has no `data` child.
    MissingDataNode,
    /// A `property` element lacks `name` or `value`.
    MalformedPropertyNode,
    /// A flat index lies outside its tileset grid.
    InvalidTileIndex,
    /// A gid is not claimed by any tileset.
    UnknownTileIndices,
}

/// Error type for the TMX loader
#[derive(Debug, Error)]
pub enum TmxError {
    /// File I/O error
    #[error("I/O error reading {}: {source}", path.display())]
    Io {
        /// File that could not be read.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },

    /// The input is not well-formed XML
    #[error("XML syntax error: {0}")]
    Xml(#[from] roxmltree::Error),

    /// Malformed structure or an attribute that does not parse
    #[error("parse error in <{element}>: {message}")]
    Parsing {
        /// Tag of the offending element.
        element: String,
        /// What was wrong with it.
        message: String,
    },

    /// A required attribute is absent
    #[error("<{element}> is missing required attribute '{attribute}'")]
    MissingRequiredAttribute {
        /// Tag of the element missing the attribute.
        element: String,
        /// Name of the missing attribute.
        attribute: String,
    },

    /// The root element is not `<map>`
    #[error("document has no <map> root element")]
    MissingMapNode,

    /// A tile layer without `<data>`
    #[error("layer '{layer}' has no <data> element")]
    MissingDataNode {
        /// Name of the layer.
        layer: String,
    },

    /// A property without a name or value
    #[error("<property> needs both 'name' and 'value'")]
    MalformedPropertyNode,

    /// A flat index past the end of its tileset
    #[error("tile index {index} is outside a tileset of {tile_count} tiles")]
    InvalidTileIndex {
        /// Requested flat index.
        index: u32,
        /// Number of tiles in the tileset.
        tile_count: u32,
    },

    /// A gid no tileset claims
    #[error("gid {gid} does not belong to any tileset")]
    UnknownTileIndices {
        /// The flag-free gid.
        gid: u32,
    },
}

impl TmxError {
    pub(crate) fn parsing(element: &str, message: impl Into<String>) -> Self {
        TmxError::Parsing {
            element: element.to_owned(),
            message: message.into(),
        }
    }

    pub(crate) fn missing_attribute(element: &str, attribute: &str) -> Self {
        TmxError::MissingRequiredAttribute {
            element: element.to_owned(),
            attribute: attribute.to_owned(),
        }
    }

    /// The flat error code this error reports as.
    pub fn kind(&self) -> ErrorKind {
        match self {
            TmxError::Io { .. } | TmxError::Xml(_) | TmxError::Parsing { .. } => {
                ErrorKind::ErrorParsing
            }
            TmxError::MissingRequiredAttribute { .. } => ErrorKind::MissingRequiredAttribute,
            TmxError::MissingMapNode => ErrorKind::MissingMapNode,
            TmxError::MissingDataNode { .. } => ErrorKind::MissingDataNode,
            TmxError::MalformedPropertyNode => ErrorKind::MalformedPropertyNode,
            TmxError::InvalidTileIndex { .. } => ErrorKind::InvalidTileIndex,
            TmxError::UnknownTileIndices { .. } => ErrorKind::UnknownTileIndices,
        }
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, TmxError>;
