// tests/map_tests.rs

use base64::Engine;
use std::cell::RefCell;
use std::fmt::Write as _;
use tmx_loader::{
    compute_uv, ErrorKind, Fields, Map, ParseLogger, ParseOptions, TileUv, TmxParser, FLIP_D,
    FLIP_H,
};

#[derive(Default)]
struct Recorder {
    warnings: RefCell<Vec<String>>,
    errors: RefCell<Vec<String>>,
}

fn render(msg: &str, fields: Fields<'_>) -> String {
    let mut out = msg.to_owned();
    for (k, v) in fields {
        let _ = write!(out, " {k}={v}");
    }
    out
}

impl ParseLogger for Recorder {
    fn warn(&self, msg: &str, fields: Fields<'_>) {
        self.warnings.borrow_mut().push(render(msg, fields));
    }

    fn error(&self, msg: &str, fields: Fields<'_>) {
        self.errors.borrow_mut().push(render(msg, fields));
    }
}

fn level(data_attrs: &str, data: &str, width: u32) -> String {
    format!(
        r#"<map version="1.0" orientation="orthogonal" width="{width}" height="1" tilewidth="16" tileheight="16">
  <tileset firstgid="1" name="atlas" tilewidth="16" tileheight="16">
    <image source="atlas.png" width="528" height="448"/>
  </tileset>
  <layer name="ground" width="{width}" height="1">
    <data {data_attrs}>{data}</data>
  </layer>
</map>"#
    )
}

fn parse(xml: &str) -> tmx_loader::Result<Map> {
    Map::parse_from_buffer(xml.as_bytes(), "")
}

#[test]
fn wrong_root_is_missing_map_node() {
    let recorder = Recorder::default();
    let err = TmxParser::new(ParseOptions::new())
        .with_logger(&recorder)
        .parse_str(r#"<tileset firstgid="1"/>"#)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MissingMapNode);
    assert!(recorder.warnings.borrow().is_empty());
}

#[test]
fn inline_csv_and_base64_agree() {
    let gids: Vec<u32> = (1..=10).collect();
    let inline: String = gids.iter().map(|g| format!(r#"<tile gid="{g}"/>"#)).collect();
    let csv = gids.iter().map(u32::to_string).collect::<Vec<_>>().join(",");
    let bytes: Vec<u8> = gids.iter().flat_map(|g| g.to_le_bytes()).collect();
    let b64 = base64::engine::general_purpose::STANDARD.encode(bytes);

    let a = parse(&level("", &inline, 10)).unwrap();
    let b = parse(&level(r#"encoding="csv""#, &csv, 10)).unwrap();
    let c = parse(&level(r#"encoding="base64""#, &b64, 10)).unwrap();

    assert_eq!(a.layers, b.layers);
    assert_eq!(b.layers, c.layers);
    for (i, rec) in a.layers[0].tiles.iter().enumerate() {
        assert_eq!(rec.location.tileset_index, 0);
        assert_eq!(rec.location.flat_index, i as u32);
    }
}

#[test]
fn flip_flags_survive_loading() {
    let raw = 5 | FLIP_H | FLIP_D;
    let map = parse(&level(r#"encoding="csv""#, &format!("{raw},0"), 2)).unwrap();
    let layer = &map.layers[0];

    let rec = layer.tile_at(0, 0).unwrap();
    assert_eq!(rec.gid, 5);
    assert!(rec.flip_h && rec.flip_d && !rec.flip_v);
    assert_eq!(rec.location.flat_index, 4);

    let empty = layer.tile_at(1, 0).unwrap();
    assert!(empty.is_empty());
    assert!(layer.tile_at(2, 0).is_none());
    assert!(map.tileset_for(empty).is_none());
}

#[test]
fn unknown_gid_fails_the_parse() {
    let err = parse(&level(r#"encoding="csv""#, "925", 1)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnknownTileIndices);
}

#[test]
fn short_layer_warns_through_the_injected_logger() {
    let recorder = Recorder::default();
    let map = TmxParser::new(ParseOptions::new())
        .with_logger(&recorder)
        .parse_str(&level(r#"encoding="csv""#, "1,2", 3))
        .unwrap();
    assert_eq!(map.layers[0].tiles.len(), 2);

    let warnings = recorder.warnings.borrow();
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].contains("layer=ground"), "{}", warnings[0]);
    assert!(recorder.errors.borrow().is_empty());
}

#[test]
fn strict_mode_rejects_short_layers_and_logs_the_stage() {
    let recorder = Recorder::default();
    let err = TmxParser::new(ParseOptions::new().with_strict_layer_size(true))
        .with_logger(&recorder)
        .parse_str(&level(r#"encoding="csv""#, "1,2", 3))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ErrorParsing);
    assert_eq!(recorder.errors.borrow().len(), 1);
}

#[test]
fn compression_can_be_disabled() {
    let xml = level(r#"encoding="base64" compression="zlib""#, "eJxjZGBgAAAACAAC", 1);
    let err = TmxParser::new(ParseOptions::new().with_compression(false))
        .parse_str(&xml)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ErrorParsing);
}

#[test]
fn tile_uv_matches_compute_uv() {
    let map = parse(&level(r#"encoding="csv""#, "1,34,0", 3)).unwrap();
    let tiles = &map.layers[0].tiles;

    let first = map.tile_uv(&tiles[0], 0.5, false).unwrap().unwrap();
    let direct = compute_uv(&map.tilesets[0], 0, 0.5, false).unwrap();
    assert_eq!(first, direct);
    assert!((first.u - 0.000947).abs() < 1e-4);
    assert!((first.v2 - 0.034598).abs() < 1e-4);

    // gid 34 starts the second row
    let second_row: TileUv = map.tile_uv(&tiles[1], 0.0, false).unwrap().unwrap();
    assert_eq!(second_row.u, 0.0);
    assert!((second_row.v - 16.0 / 448.0).abs() < 1e-6);

    assert_eq!(map.tile_uv(&tiles[2], 0.5, false).unwrap(), None);
}

fn huge_layer(width: u32, height: u32, data_attrs: &str, data: &str) -> String {
    format!(
        r#"<map width="{width}" height="{height}" tilewidth="16" tileheight="16">
  <tileset firstgid="1" name="atlas" tilewidth="16" tileheight="16">
    <image source="atlas.png" width="528" height="448"/>
  </tileset>
  <layer name="huge" width="{width}" height="{height}">
    <data {data_attrs}>{data}</data>
  </layer>
</map>"#
    )
}

#[test]
fn overflowing_layer_size_is_a_parse_error() {
    let xml = huge_layer(u32::MAX, u32::MAX, r#"encoding="base64""#, "AQAAAA==");
    let err = parse(&xml).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ErrorParsing);
}

#[test]
fn huge_compressed_layer_is_a_short_layer() {
    // zlib of the single gid 1
    let xml = huge_layer(
        65535,
        65535,
        r#"encoding="base64" compression="zlib""#,
        "eJxjZGBgAAAACAAC",
    );
    let recorder = Recorder::default();
    let map = TmxParser::new(ParseOptions::new())
        .with_logger(&recorder)
        .parse_str(&xml)
        .unwrap();
    assert_eq!(map.layers[0].tiles.len(), 1);
    assert_eq!(map.layers[0].tiles[0].gid, 1);
    assert_eq!(recorder.warnings.borrow().len(), 1);
}

#[test]
fn buffer_must_be_utf8() {
    let err = Map::parse_from_buffer(&[0xff, 0xfe, 0x00], "").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ErrorParsing);
}

#[test]
fn serializes_to_json() {
    let map = parse(&level(r#"encoding="csv""#, "2", 1)).unwrap();
    let json = serde_json::to_value(&map).unwrap();
    assert_eq!(json["orientation"], "orthogonal");
    assert_eq!(json["tilesets"][0]["image"]["source"], "atlas.png");
    assert_eq!(json["layers"][0]["tiles"][0]["location"]["flat_index"], 1);
}
