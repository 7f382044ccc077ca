//! Tile layer `<data>` decoding: inline `<tile>` elements, CSV, or base64
//! (optionally compressed) little-endian u32 streams.

use super::compression::{decompress, Compression};
use super::xml::{required, Element};
use super::LoadContext;
use crate::error::{Result, TmxError};
use crate::map::TileRecord;
use crate::tileset::Tileset;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;

/// How a `<data>` element stores its gids.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    /// No `encoding` attribute: one `<tile gid=".."/>` per cell.
    Xml,
    /// Comma separated decimal text.
    Csv,
    /// Base64 little-endian u32 array, possibly compressed.
    Base64,
}

impl Encoding {
    fn from_attr(value: Option<&str>) -> Result<Self> {
        match value {
            None => Ok(Encoding::Xml),
            Some("csv") => Ok(Encoding::Csv),
            Some("base64") => Ok(Encoding::Base64),
            Some(other) => Err(TmxError::parsing(
                "data",
                format!("unsupported encoding '{other}'"),
            )),
        }
    }
}

/// Decodes a `<data>` element into resolved tile records, row-major.
///
/// The number of records is whatever the stream holds; matching it against
/// the layer size is left to the caller.
pub(crate) fn decode_layer_data<E: Element>(
    data: &E,
    width: u32,
    height: u32,
    tilesets: &[Tileset],
    ctx: &LoadContext<'_>,
) -> Result<Vec<TileRecord>> {
    let encoding = Encoding::from_attr(data.attr("encoding"))?;
    let compression = data
        .attr("compression")
        .map(str::parse::<Compression>)
        .transpose()?;

    if compression.is_some() && encoding != Encoding::Base64 {
        return Err(TmxError::parsing(
            "data",
            "only base64 encoded data can be compressed",
        ));
    }
    if compression.is_some() && !ctx.options.allow_compression {
        return Err(TmxError::parsing("data", "compressed layer data is disabled"));
    }

    let raw = match encoding {
        Encoding::Xml => data
            .children_named("tile")
            .map(|tile| required::<_, u32>(&tile, "gid"))
            .collect::<Result<Vec<_>>>()?,
        Encoding::Csv => parse_csv(data.text_content().unwrap_or_default())?,
        Encoding::Base64 => {
            let expected_len = (width as usize)
                .checked_mul(height as usize)
                .and_then(|cells| cells.checked_mul(4))
                .ok_or_else(|| {
                    TmxError::parsing(
                        "data",
                        format!("layer of {width}x{height} cells is too large"),
                    )
                })?;
            parse_base64(data.text_content().unwrap_or_default(), compression, expected_len)?
        }
    };

    raw.into_iter()
        .map(|gid| TileRecord::resolve(tilesets, gid))
        .collect()
}

/// Comma separated decimal gids; newlines and other whitespace between
/// values are ignored.
pub fn parse_csv(text: &str) -> Result<Vec<u32>> {
    text.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|token| !token.is_empty())
        .map(|token| {
            token
                .parse()
                .map_err(|_| TmxError::parsing("data", format!("invalid csv gid '{token}'")))
        })
        .collect()
}

/// Base64 text, optionally compressed, read as little-endian u32 gids.
pub fn parse_base64(
    text: &str,
    compression: Option<Compression>,
    expected_len: usize,
) -> Result<Vec<u32>> {
    let cleaned: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = STANDARD
        .decode(cleaned.as_bytes())
        .map_err(|e| TmxError::parsing("data", format!("invalid base64: {e}")))?;

    let bytes = match compression {
        Some(method) => decompress(&bytes, expected_len, method)?,
        None => bytes,
    };

    if bytes.len() % 4 != 0 {
        return Err(TmxError::parsing(
            "data",
            format!("{} bytes is not a whole number of gids", bytes.len()),
        ));
    }

    Ok(bytes
        .chunks_exact(4)
        .map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ParseOptions;
    use crate::diagnostics::NullLogger;
    use crate::error::ErrorKind;
    use crate::spatial::{FLIP_D, FLIP_H};
    use crate::tileset::testing::atlas;
    use flate2::write::ZlibEncoder;
    use std::io::Write;

    fn le_bytes(gids: &[u32]) -> Vec<u8> {
        gids.iter().flat_map(|g| g.to_le_bytes()).collect()
    }

    fn decode(xml: &str, options: &ParseOptions) -> Result<Vec<TileRecord>> {
        decode_sized(xml, 10, 1, options)
    }

    fn decode_sized(
        xml: &str,
        width: u32,
        height: u32,
        options: &ParseOptions,
    ) -> Result<Vec<TileRecord>> {
        let doc = roxmltree::Document::parse(xml).unwrap();
        let sets = [atlas(1, 16, 16, 528, 448)];
        let ctx = LoadContext {
            options,
            logger: &NullLogger,
        };
        decode_layer_data(&doc.root_element(), width, height, &sets, &ctx)
    }

    fn flat_indices(records: &[TileRecord]) -> Vec<(usize, u32)> {
        records
            .iter()
            .map(|r| (r.location.tileset_index, r.location.flat_index))
            .collect()
    }

    #[test]
    fn csv_tolerates_newlines_and_trailing_separators() {
        assert_eq!(parse_csv("\n1,2,3,\n4,5\n").unwrap(), vec![1, 2, 3, 4, 5]);
        assert_eq!(parse_csv(" 7 , 8 ").unwrap(), vec![7, 8]);
        assert!(parse_csv("").unwrap().is_empty());
        assert_eq!(parse_csv("1,-2").unwrap_err().kind(), ErrorKind::ErrorParsing);
    }

    #[test]
    fn base64_strips_whitespace_before_decoding() {
        let encoded = STANDARD.encode(le_bytes(&[1, 2, 3]));
        let (head, tail) = encoded.split_at(5);
        let wrapped = format!("\n   {head}\r\n {tail}\n");
        assert_eq!(parse_base64(&wrapped, None, 12).unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn base64_with_partial_gid_is_rejected() {
        let encoded = STANDARD.encode([1u8, 0, 0]);
        let err = parse_base64(&encoded, None, 4).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ErrorParsing);
    }

    #[test]
    fn all_three_encodings_agree() {
        let gids: Vec<u32> = (1..=10).collect();
        let options = ParseOptions::default();

        let tiles: String = gids.iter().map(|g| format!(r#"<tile gid="{g}"/>"#)).collect();
        let xml = decode(&format!("<data>{tiles}</data>"), &options).unwrap();
        let csv = decode(r#"<data encoding="csv">1,2,3,4,5,6,7,8,9,10</data>"#, &options).unwrap();
        let b64 = decode(
            &format!(
                r#"<data encoding="base64">{}</data>"#,
                STANDARD.encode(le_bytes(&gids))
            ),
            &options,
        )
        .unwrap();

        let expected: Vec<(usize, u32)> = (0..10).map(|n| (0, n)).collect();
        assert_eq!(flat_indices(&xml), expected);
        assert_eq!(flat_indices(&csv), expected);
        assert_eq!(flat_indices(&b64), expected);
        assert_eq!(xml, csv);
        assert_eq!(csv, b64);
    }

    #[test]
    fn zlib_stream_is_inflated() {
        let mut enc = ZlibEncoder::new(Vec::new(), flate2::Compression::default());
        enc.write_all(&le_bytes(&[5, 0, 7])).unwrap();
        let packed = STANDARD.encode(enc.finish().unwrap());
        let xml = format!(r#"<data encoding="base64" compression="zlib">{packed}</data>"#);

        let records = decode(&xml, &ParseOptions::default()).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].gid, 5);
        assert!(records[1].is_empty());

        let err = decode(&xml, &ParseOptions::default().with_compression(false)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ErrorParsing);
    }

    #[test]
    fn base64_layer_size_that_overflows_is_rejected() {
        let xml = r#"<data encoding="base64">AQAAAA==</data>"#;
        let err = decode_sized(xml, u32::MAX, u32::MAX, &ParseOptions::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ErrorParsing);
    }

    #[test]
    fn huge_declared_size_does_not_drive_allocation() {
        let mut enc = ZlibEncoder::new(Vec::new(), flate2::Compression::default());
        enc.write_all(&le_bytes(&[1])).unwrap();
        let packed = STANDARD.encode(enc.finish().unwrap());
        let xml = format!(r#"<data encoding="base64" compression="zlib">{packed}</data>"#);

        let records = decode_sized(&xml, 65535, 65535, &ParseOptions::default()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].gid, 1);
    }

    #[test]
    fn flags_are_stripped_even_in_csv() {
        let raw = 3 | FLIP_H | FLIP_D;
        let records = decode(
            &format!(r#"<data encoding="csv">{raw}</data>"#),
            &ParseOptions::default(),
        )
        .unwrap();
        assert_eq!(records[0].gid, 3);
        assert_eq!(records[0].location.flat_index, 2);
        assert!(records[0].flip_h && records[0].flip_d && !records[0].flip_v);
    }

    #[test]
    fn rejects_bad_encoding_combinations() {
        let options = ParseOptions::default();
        let unknown = decode(r#"<data encoding="hex">01</data>"#, &options).unwrap_err();
        assert_eq!(unknown.kind(), ErrorKind::ErrorParsing);

        let plain = decode(r#"<data compression="zlib"><tile gid="1"/></data>"#, &options);
        assert_eq!(plain.unwrap_err().kind(), ErrorKind::ErrorParsing);

        let csv = decode(r#"<data encoding="csv" compression="gzip">1</data>"#, &options);
        assert_eq!(csv.unwrap_err().kind(), ErrorKind::ErrorParsing);
    }

    #[test]
    fn inline_tile_without_gid_is_missing_attribute() {
        let err = decode(r#"<data><tile/></data>"#, &ParseOptions::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredAttribute);
    }

    #[test]
    fn unknown_gid_fails_the_layer() {
        let err = decode(r#"<data encoding="csv">1,5000</data>"#, &ParseOptions::default())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownTileIndices);
    }
}
