pub mod compression;
pub mod data;
pub mod tmx_loader;
pub mod xml;

use crate::config::ParseOptions;
use crate::diagnostics::ParseLogger;

/// Per-parse state threaded through the loader functions.
pub(crate) struct LoadContext<'a> {
    pub options: &'a ParseOptions,
    pub logger: &'a dyn ParseLogger,
}
