//! Vector style document generation.
//!
//! [`generate_style`] is a pure function from a [`Theme`] to a complete
//! style document for the artistic renderer: one background layer, water
//! and park fills, then six road layers split into mutually-exclusive
//! classes with widths that grow with road importance. Documents are always
//! regenerated whole; nothing is ever patched incrementally.
//!
//! The document serializes to the renderer's wire format (hyphenated keys,
//! expression-array filters), so a host can hand `serde_json::to_value` of
//! it straight to the renderer.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::theme::Theme;

/// Style specification version understood by the vector renderer.
pub const STYLE_VERSION: u8 = 8;

/// Key of the single vector tile source every thematic layer reads from.
pub const VECTOR_SOURCE_ID: &str = "openfreemap";

/// URL of the fixed external vector tile source.
pub const VECTOR_SOURCE_URL: &str = "https://tiles.openfreemap.org/planet";

/// A complete style document for the vector renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleDocument {
    pub version: u8,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    pub sources: BTreeMap<String, VectorSource>,
    pub layers: Vec<Layer>,
}

/// A vector tile source entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorSource {
    #[serde(rename = "type")]
    pub kind: String,
    pub url: String,
}

/// One style layer, tagged by renderer layer type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Layer {
    Background {
        id: String,
        paint: BackgroundPaint,
    },
    Fill {
        id: String,
        source: String,
        #[serde(rename = "source-layer")]
        source_layer: String,
        paint: FillPaint,
    },
    Line {
        id: String,
        source: String,
        #[serde(rename = "source-layer")]
        source_layer: String,
        filter: Value,
        paint: LinePaint,
    },
}

impl Layer {
    /// The layer's identifier.
    pub fn id(&self) -> &str {
        match self {
            Layer::Background { id, .. } | Layer::Fill { id, .. } | Layer::Line { id, .. } => id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackgroundPaint {
    #[serde(rename = "background-color")]
    pub background_color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FillPaint {
    #[serde(rename = "fill-color")]
    pub fill_color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinePaint {
    #[serde(rename = "line-color")]
    pub line_color: String,
    #[serde(rename = "line-width")]
    pub line_width: f64,
}

/// Road classes rendered as dedicated line layers, in paint order
/// (least prominent first so higher classes draw on top).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoadClass {
    Residential,
    Tertiary,
    Secondary,
    Primary,
    Motorway,
}

impl RoadClass {
    /// Paint order for the classed road layers.
    pub const PAINT_ORDER: [RoadClass; 5] = [
        RoadClass::Residential,
        RoadClass::Tertiary,
        RoadClass::Secondary,
        RoadClass::Primary,
        RoadClass::Motorway,
    ];

    /// The class value as it appears in the vector tile data.
    pub fn as_str(&self) -> &'static str {
        match self {
            RoadClass::Residential => "residential",
            RoadClass::Tertiary => "tertiary",
            RoadClass::Secondary => "secondary",
            RoadClass::Primary => "primary",
            RoadClass::Motorway => "motorway",
        }
    }

    /// Line width tier; more important classes render wider.
    pub fn line_width(&self) -> f64 {
        match self {
            RoadClass::Residential => 0.5,
            RoadClass::Tertiary => 0.8,
            RoadClass::Secondary => 1.0,
            RoadClass::Primary => 1.5,
            RoadClass::Motorway => 2.0,
        }
    }

    fn color<'a>(&self, theme: &'a Theme) -> &'a str {
        match self {
            RoadClass::Residential => &theme.road_residential,
            RoadClass::Tertiary => &theme.road_tertiary,
            RoadClass::Secondary => &theme.road_secondary,
            RoadClass::Primary => &theme.road_primary,
            RoadClass::Motorway => &theme.road_motorway,
        }
    }
}

/// Width of the catch-all road layer for anything without a classed layer.
pub const DEFAULT_ROAD_WIDTH: f64 = 0.5;

fn class_filter(class: RoadClass) -> Value {
    json!(["==", ["get", "class"], class.as_str()])
}

fn default_road_filter() -> Value {
    let named: Vec<&str> = [
        RoadClass::Motorway,
        RoadClass::Primary,
        RoadClass::Secondary,
        RoadClass::Tertiary,
        RoadClass::Residential,
    ]
    .iter()
    .map(RoadClass::as_str)
    .collect();
    json!(["!", ["match", ["get", "class"], named, true, false]])
}

fn road_layer(id: &str, color: &str, width: f64, filter: Value) -> Layer {
    Layer::Line {
        id: id.to_string(),
        source: VECTOR_SOURCE_ID.to_string(),
        source_layer: "transportation".to_string(),
        filter,
        paint: LinePaint {
            line_color: color.to_string(),
            line_width: width,
        },
    }
}

/// The style the vector renderer is created with: no sources, no layers.
///
/// Starting empty means the first theme application goes through exactly
/// the same path as every later one.
pub fn empty_style() -> StyleDocument {
    StyleDocument {
        version: STYLE_VERSION,
        name: String::new(),
        sources: BTreeMap::new(),
        layers: Vec::new(),
    }
}

/// Generates the full style document for a theme.
///
/// Pure and deterministic; safe to call repeatedly and discard results.
pub fn generate_style(theme: &Theme) -> StyleDocument {
    let mut sources = BTreeMap::new();
    sources.insert(
        VECTOR_SOURCE_ID.to_string(),
        VectorSource {
            kind: "vector".to_string(),
            url: VECTOR_SOURCE_URL.to_string(),
        },
    );

    let mut layers = Vec::with_capacity(3 + 1 + RoadClass::PAINT_ORDER.len());
    layers.push(Layer::Background {
        id: "background".to_string(),
        paint: BackgroundPaint {
            background_color: theme.bg.clone(),
        },
    });
    layers.push(Layer::Fill {
        id: "water".to_string(),
        source: VECTOR_SOURCE_ID.to_string(),
        source_layer: "water".to_string(),
        paint: FillPaint {
            fill_color: theme.water.clone(),
        },
    });
    layers.push(Layer::Fill {
        id: "park".to_string(),
        source: VECTOR_SOURCE_ID.to_string(),
        source_layer: "park".to_string(),
        paint: FillPaint {
            fill_color: theme.parks.clone(),
        },
    });
    layers.push(road_layer(
        "road-default",
        &theme.road_default,
        DEFAULT_ROAD_WIDTH,
        default_road_filter(),
    ));
    for class in RoadClass::PAINT_ORDER {
        layers.push(road_layer(
            &format!("road-{}", class.as_str()),
            class.color(theme),
            class.line_width(),
            class_filter(class),
        ));
    }

    StyleDocument {
        version: STYLE_VERSION,
        name: theme.name.clone(),
        sources,
        layers,
    }
}
