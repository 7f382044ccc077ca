use anyhow::Context;
use clap::Parser;
use serde::Serialize;
use std::path::PathBuf;
use tmx_loader::{Map, ParseOptions, TileUv, TmxParser};

/// Load a Tiled .tmx map and print it as JSON.
#[derive(Parser)]
#[command(name = "tmxdump", version)]
struct Args {
    /// Map file to load
    map: PathBuf,

    /// Directory prepended to bare image file names (defaults to the map's directory)
    #[arg(long)]
    image_base: Option<String>,

    /// Fail when a layer's tile count does not match its size
    #[arg(long)]
    strict: bool,

    /// Also print atlas UVs for every non-empty cell
    #[arg(long)]
    uv: bool,

    /// Half-texel inset applied to UVs
    #[arg(long, default_value_t = 0.5)]
    pixel_correction: f32,

    /// Flip the v axis of printed UVs
    #[arg(long)]
    flip_y: bool,
}

#[derive(Serialize)]
struct CellUv {
    layer: String,
    x: u32,
    y: u32,
    gid: u32,
    uv: TileUv,
}

#[derive(Serialize)]
struct Dump<'a> {
    map: &'a Map,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    uvs: Vec<CellUv>,
}

fn collect_uvs(map: &Map, pixel_correction: f32, flip_y: bool) -> anyhow::Result<Vec<CellUv>> {
    let mut out = Vec::new();
    for layer in &map.layers {
        for (idx, rec) in layer.tiles.iter().enumerate() {
            let Some(uv) = map
                .tile_uv(rec, pixel_correction, flip_y)
                .with_context(|| format!("UVs for gid {} in layer '{}'", rec.gid, layer.name))?
            else {
                continue;
            };
            let width = layer.width.max(1) as usize;
            out.push(CellUv {
                layer: layer.name.clone(),
                x: (idx % width) as u32,
                y: (idx / width) as u32,
                gid: rec.gid,
                uv,
            });
        }
    }
    Ok(out)
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let image_base = args.image_base.clone().unwrap_or_else(|| {
        args.map
            .parent()
            .map(|d| d.to_string_lossy().into_owned())
            .unwrap_or_default()
    });
    let options = ParseOptions::new()
        .with_image_base_path(image_base)
        .with_strict_layer_size(args.strict);

    let map = TmxParser::new(options)
        .parse_path(&args.map)
        .with_context(|| format!("Loading map {}", args.map.display()))?;

    let uvs = if args.uv {
        collect_uvs(&map, args.pixel_correction, args.flip_y)?
    } else {
        Vec::new()
    };

    let json = serde_json::to_string_pretty(&Dump { map: &map, uvs })?;
    println!("{json}");
    Ok(())
}
