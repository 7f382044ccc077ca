use crate::error::{Result, TmxError};
use flate2::read::{GzDecoder, ZlibDecoder};
use std::io::Read;
use std::str::FromStr;

/// Value of the `compression` attribute on base64 layer data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    /// zlib stream
    Zlib,
    /// gzip member
    Gzip,
    /// Zstandard frame
    Zstd,
}

impl FromStr for Compression {
    type Err = TmxError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "zlib" => Ok(Compression::Zlib),
            "gzip" => Ok(Compression::Gzip),
            "zstd" => Ok(Compression::Zstd),
            other => Err(TmxError::parsing(
                "data",
                format!("unsupported compression '{other}'"),
            )),
        }
    }
}

/// Largest output, relative to the compressed input, reserved up front.
const MAX_RESERVE_RATIO: usize = 64;

/// Inflates a layer payload. `expected_len` is the decoded size the layer
/// needs (`width * height * 4`) and only serves as a capacity hint, capped
/// relative to the input size; the actual length is checked by the caller.
pub fn decompress(bytes: &[u8], expected_len: usize, method: Compression) -> Result<Vec<u8>> {
    let reserve = expected_len.min(bytes.len().saturating_mul(MAX_RESERVE_RATIO));
    let mut out = Vec::with_capacity(reserve);
    let read = match method {
        Compression::Zlib => ZlibDecoder::new(bytes).read_to_end(&mut out),
        Compression::Gzip => GzDecoder::new(bytes).read_to_end(&mut out),
        Compression::Zstd => zstd::stream::read::Decoder::new(bytes)
            .and_then(|mut d| d.read_to_end(&mut out)),
    };
    read.map_err(|e| TmxError::parsing("data", format!("{method:?} stream: {e}")))?;
    Ok(out)
}
