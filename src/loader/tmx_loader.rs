// src/loader/tmx_loader.rs
use super::data::decode_layer_data;
use super::xml::{
    bool_or, optional, or, or_default, required, string_opt, string_or_default, Element,
};
use super::LoadContext;
use crate::error::{Result, TmxError};
use crate::map::{ImageLayer, Layer, Map, Orientation};
use crate::object::{parse_points, Object, ObjectGroup, ObjectShape, Point};
use crate::properties::Properties;
use crate::spatial::TileId;
use crate::tileset::{
    grid_dimensions, AnimationFrame, Image, TileDefinition, TileOffset, Tileset,
};
use std::collections::BTreeMap;

pub(crate) fn decode_document(text: &str, ctx: &LoadContext<'_>) -> Result<Map> {
    let doc = roxmltree::Document::parse(text)?;
    let root = doc.root_element();
    if root.tag() != "map" {
        return Err(TmxError::MissingMapNode);
    }
    parse_map(&root, ctx)
}

/// Logs which stage failed and hands the error back unchanged.
fn stage<T>(ctx: &LoadContext<'_>, stage: &str, result: Result<T>) -> Result<T> {
    result.map_err(|err| {
        ctx.logger
            .error("error processing map", &[("stage", &stage), ("error", &err)]);
        err
    })
}

pub(crate) fn parse_map<E: Element>(el: &E, ctx: &LoadContext<'_>) -> Result<Map> {
    let mut map = stage(ctx, "map attributes", parse_map_attributes(el))?;
    map.properties = stage(ctx, "map properties", parse_properties(el.child("properties")))?;

    // Layers and objects resolve gids against the tilesets, so those go first.
    for child in el.children_named("tileset") {
        map.tilesets.push(stage(ctx, "tileset", parse_tileset(&child, ctx))?);
    }

    for child in el.children_named("layer") {
        let layer = stage(ctx, "layer", parse_layer(&child, &map.tilesets, ctx))?;
        map.layers.push(layer);
    }

    for child in el.children_named("objectgroup") {
        map.object_groups.push(stage(ctx, "objectgroup", parse_object_group(&child))?);
    }

    for child in el.children_named("imagelayer") {
        map.image_layers.push(stage(ctx, "imagelayer", parse_image_layer(&child, ctx))?);
    }

    if let Some(base) = ctx.options.image_base_path.as_deref() {
        rebase_image_sources(&mut map, base);
    }

    Ok(map)
}

/// The `<map>` element's own attributes; children are filled in afterwards.
fn parse_map_attributes<E: Element>(el: &E) -> Result<Map> {
    let orientation = optional::<_, String>(el, "orientation")?
        .map(|o| o.parse::<Orientation>())
        .transpose()?
        .unwrap_or_default();

    Ok(Map {
        version: string_or_default(el, "version"),
        orientation,
        width: or_default(el, "width")?,
        height: or_default(el, "height")?,
        tile_width: or_default(el, "tilewidth")?,
        tile_height: or_default(el, "tileheight")?,
        background_color: string_opt(el, "backgroundcolor"),
        render_order: or(el, "renderorder", String::from("right-down"))?,
        properties: Properties::new(),
        tilesets: Vec::new(),
        layers: Vec::new(),
        object_groups: Vec::new(),
        image_layers: Vec::new(),
    })
}

/// Reads a `<properties>` block. No block at all is an empty table.
pub(crate) fn parse_properties<E: Element>(el: Option<E>) -> Result<Properties> {
    let mut out = Properties::new();
    let Some(el) = el else {
        return Ok(out);
    };
    for prop in el.children_named("property") {
        match (prop.attr("name"), prop.attr("value")) {
            (Some(name), Some(value)) => out.insert(name, value),
            _ => return Err(TmxError::MalformedPropertyNode),
        }
    }
    Ok(out)
}

pub(crate) fn parse_image<E: Element>(el: &E, ctx: &LoadContext<'_>) -> Result<Image> {
    let source = string_or_default(el, "source");
    if source.is_empty() {
        ctx.logger
            .warn("missing attribute", &[("element", &"image"), ("attribute", &"source")]);
    }
    Ok(Image {
        source,
        format: string_opt(el, "format"),
        transparent_color: string_opt(el, "trans"),
        width: or_default(el, "width")?,
        height: or_default(el, "height")?,
    })
}

pub(crate) fn parse_tileset<E: Element>(el: &E, ctx: &LoadContext<'_>) -> Result<Tileset> {
    if let Some(source) = el.attr("source") {
        return Err(TmxError::parsing(
            "tileset",
            format!("external tileset '{source}' is not supported"),
        ));
    }

    let first_gid: u32 = required(el, "firstgid")?;
    let tile_width: u32 = required(el, "tilewidth")?;
    let tile_height: u32 = required(el, "tileheight")?;
    let spacing: u32 = or_default(el, "spacing")?;
    let margin: u32 = or_default(el, "margin")?;

    let offset = match el.child("tileoffset") {
        Some(o) => TileOffset {
            x: or_default(&o, "x")?,
            y: or_default(&o, "y")?,
        },
        None => TileOffset::default(),
    };

    let image_el = el.child("image").ok_or_else(|| {
        TmxError::parsing("tileset", "tileset has no <image>; only atlas tilesets are supported")
    })?;
    let image = parse_image(&image_el, ctx)?;
    let (col_count, row_count) = grid_dimensions(&image, tile_width, tile_height, spacing, margin)?;

    let mut tile_definitions = BTreeMap::new();
    for tile in el.children_named("tile") {
        let def = parse_tile_definition(&tile)?;
        if !def.is_empty() {
            tile_definitions.insert(def.id, def);
        }
    }

    Ok(Tileset {
        first_gid,
        name: string_or_default(el, "name"),
        tile_width,
        tile_height,
        spacing,
        margin,
        offset,
        image,
        properties: parse_properties(el.child("properties"))?,
        tile_definitions,
        col_count,
        row_count,
    })
}

pub(crate) fn parse_tile_definition<E: Element>(el: &E) -> Result<TileDefinition> {
    let animation = match el.child("animation") {
        Some(anim) => anim
            .children_named("frame")
            .map(|frame| -> Result<AnimationFrame> {
                Ok(AnimationFrame {
                    tile_id: required(&frame, "tileid")?,
                    duration: required(&frame, "duration")?,
                })
            })
            .collect::<Result<Vec<_>>>()?,
        None => Vec::new(),
    };

    Ok(TileDefinition {
        id: required(el, "id")?,
        properties: parse_properties(el.child("properties"))?,
        animation,
        object_groups: el
            .children_named("objectgroup")
            .map(|g| parse_object_group(&g))
            .collect::<Result<Vec<_>>>()?,
    })
}

pub(crate) fn parse_layer<E: Element>(
    el: &E,
    tilesets: &[Tileset],
    ctx: &LoadContext<'_>,
) -> Result<Layer> {
    let name = string_or_default(el, "name");
    let width: u32 = or_default(el, "width")?;
    let height: u32 = or_default(el, "height")?;
    let properties = parse_properties(el.child("properties"))?;

    let data = el
        .child("data")
        .ok_or_else(|| TmxError::MissingDataNode { layer: name.clone() })?;
    let tiles = decode_layer_data(&data, width, height, tilesets, ctx)?;

    let expected = u64::from(width) * u64::from(height);
    if tiles.len() as u64 != expected {
        if ctx.options.strict_layer_size {
            return Err(TmxError::parsing(
                "layer",
                format!("layer '{name}' holds {} tiles, expected {expected}", tiles.len()),
            ));
        }
        ctx.logger.warn(
            "layer tile count does not match its size",
            &[("layer", &name), ("expected", &expected), ("decoded", &tiles.len())],
        );
    }

    Ok(Layer {
        name,
        width,
        height,
        opacity: or(el, "opacity", 1.0)?,
        visible: bool_or(el, "visible", true)?,
        properties,
        tiles,
    })
}

pub(crate) fn parse_object_group<E: Element>(el: &E) -> Result<ObjectGroup> {
    Ok(ObjectGroup {
        name: string_or_default(el, "name"),
        color: string_opt(el, "color"),
        opacity: or(el, "opacity", 1.0)?,
        visible: bool_or(el, "visible", true)?,
        properties: parse_properties(el.child("properties"))?,
        objects: el
            .children_named("object")
            .map(|o| parse_object(&o))
            .collect::<Result<Vec<_>>>()?,
    })
}

fn shape_points<E: Element>(shape: &E) -> Result<Vec<Point>> {
    let points = shape.attr("points").ok_or_else(|| {
        TmxError::parsing(shape.tag(), "missing points attribute for shape requiring one")
    })?;
    parse_points(points)
}

pub(crate) fn parse_object<E: Element>(el: &E) -> Result<Object> {
    let shape = if el.child("ellipse").is_some() {
        ObjectShape::Ellipse
    } else if let Some(polygon) = el.child("polygon") {
        ObjectShape::Polygon(shape_points(&polygon)?)
    } else if let Some(polyline) = el.child("polyline") {
        ObjectShape::Polyline(shape_points(&polyline)?)
    } else {
        ObjectShape::Rectangle
    };

    let class_name = string_opt(el, "type")
        .or_else(|| string_opt(el, "class"))
        .unwrap_or_default();

    Ok(Object {
        name: string_or_default(el, "name"),
        class_name,
        x: or_default(el, "x")?,
        y: or_default(el, "y")?,
        width: or_default(el, "width")?,
        height: or_default(el, "height")?,
        rotation: or_default(el, "rotation")?,
        gid: optional::<_, u32>(el, "gid")?.map(TileId),
        visible: bool_or(el, "visible", true)?,
        properties: parse_properties(el.child("properties"))?,
        shape,
    })
}

pub(crate) fn parse_image_layer<E: Element>(el: &E, ctx: &LoadContext<'_>) -> Result<ImageLayer> {
    // newer files write offsetx/offsety (possibly fractional), older ones x/y
    let offset = |primary: &str, legacy: &str| -> Result<i32> {
        let value = match optional::<_, f32>(el, primary)? {
            Some(v) => v,
            None => or_default(el, legacy)?,
        };
        Ok(value as i32)
    };

    Ok(ImageLayer {
        name: string_or_default(el, "name"),
        offset_x: offset("offsetx", "x")?,
        offset_y: offset("offsety", "y")?,
        width: or_default(el, "width")?,
        height: or_default(el, "height")?,
        opacity: or(el, "opacity", 1.0)?,
        visible: bool_or(el, "visible", true)?,
        properties: parse_properties(el.child("properties"))?,
        image: el.child("image").map(|i| parse_image(&i, ctx)).transpose()?,
    })
}

/// Prefixes `base` to an image source that is a bare file name. Sources that
/// already carry a directory are left alone.
pub(crate) fn rebase_image_source(source: &str, base: &str) -> Option<String> {
    if base.is_empty() || source.is_empty() || source.contains(['/', '\\']) {
        return None;
    }
    let sep = if base.contains('\\') && !base.contains('/') {
        '\\'
    } else {
        '/'
    };
    let base = base.trim_end_matches(['/', '\\']);
    Some(format!("{base}{sep}{source}"))
}

fn rebase_image_sources(map: &mut Map, base: &str) {
    let images = map
        .tilesets
        .iter_mut()
        .map(|ts| &mut ts.image)
        .chain(map.image_layers.iter_mut().filter_map(|l| l.image.as_mut()));
    for image in images {
        if let Some(rebased) = rebase_image_source(&image.source, base) {
            image.source = rebased;
        }
    }
}
