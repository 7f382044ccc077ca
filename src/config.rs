/// Knobs for a parse run.
#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// Directory prepended to bare image file names. `None` or empty leaves sources untouched.
    pub image_base_path: Option<String>,
    /// Fail, instead of warning, when a layer decodes to a tile count other than `width * height`.
    pub strict_layer_size: bool,
    /// Accept `compression="zlib|gzip|zstd"` on base64 layer data.
    pub allow_compression: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            image_base_path: None,
            strict_layer_size: false,
            allow_compression: true,
        }
    }
}

impl ParseOptions {
    /// Same as [`ParseOptions::default`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the directory bare image file names are resolved against.
    pub fn with_image_base_path(mut self, path: impl Into<String>) -> Self {
        self.image_base_path = Some(path.into());
        self
    }

    /// Turns layer size mismatches into errors.
    pub fn with_strict_layer_size(mut self, strict: bool) -> Self {
        self.strict_layer_size = strict;
        self
    }

    /// Allows or rejects compressed layer data.
    pub fn with_compression(mut self, allow: bool) -> Self {
        self.allow_compression = allow;
        self
    }
}
