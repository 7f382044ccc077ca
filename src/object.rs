use crate::error::{Result, TmxError};
use crate::properties::Properties;
use crate::spatial::TileId;
use serde::Serialize;

/// A polygon or polyline vertex.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    /// Horizontal offset from the object origin.
    pub x: f32,
    /// Vertical offset from the object origin.
    pub y: f32,
}

/// Outline of an object.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "points", rename_all = "snake_case")]
pub enum ObjectShape {
    /// Axis-aligned box of the object's size; also used for tile objects.
    Rectangle,
    /// Ellipse inscribed in the object's box.
    Ellipse,
    /// Closed outline, points relative to the object origin.
    Polygon(Vec<Point>),
    /// Open outline, points relative to the object origin.
    Polyline(Vec<Point>),
}

/// One `<object>` of an object group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Object {
    /// Object name, empty when absent.
    pub name: String,
    /// `type`, or `class` on maps saved by newer editors.
    pub class_name: String,
    /// Position in pixels.
    pub x: f32,
    /// Position in pixels.
    pub y: f32,
    /// Size in pixels.
    pub width: f32,
    /// Size in pixels.
    pub height: f32,
    /// Clockwise rotation in degrees.
    pub rotation: f32,
    /// Set for tile objects; keeps its flip bits.
    pub gid: Option<TileId>,
    /// False when the object is hidden.
    pub visible: bool,
    /// Custom properties.
    pub properties: Properties,
    /// Outline of the object.
    pub shape: ObjectShape,
}

/// An `<objectgroup>`, either a map layer or a tile's collision shapes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObjectGroup {
    /// Group name, empty when absent.
    pub name: String,
    /// Editor display color.
    pub color: Option<String>,
    /// Group opacity, 1.0 when absent.
    pub opacity: f32,
    /// False when the group is hidden.
    pub visible: bool,
    /// Custom properties.
    pub properties: Properties,
    /// Objects in document order.
    pub objects: Vec<Object>,
}

/// Parses a `points` attribute: space separated `x,y` pairs, at least one.
pub fn parse_points(text: &str) -> Result<Vec<Point>> {
    let points = text
        .split_whitespace()
        .map(|pair| -> Result<Point> {
            let (x, y) = pair
                .split_once(',')
                .ok_or_else(|| TmxError::parsing("object", format!("malformed point '{pair}'")))?;
            let coord = |s: &str| {
                s.trim()
                    .parse::<f32>()
                    .map_err(|_| TmxError::parsing("object", format!("malformed point '{pair}'")))
            };
            Ok(Point {
                x: coord(x)?,
                y: coord(y)?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    if points.is_empty() {
        return Err(TmxError::parsing("object", "shape has no points"));
    }
    Ok(points)
}
