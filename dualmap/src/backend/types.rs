//! Shared types for the renderer backends.

use thiserror::Error;

use crate::icon::{styled_markup, IconKind};

/// Errors a backend can report.
///
/// Nothing here is fatal to the module: style failures become pending
/// retries and subscription failures degrade readiness probes to an
/// immediate resolve.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BackendError {
    /// The renderer refused a style document (e.g. mid-load).
    #[error("renderer rejected style: {0}")]
    StyleRejected(String),

    /// Installing an event listener on the renderer failed.
    #[error("event subscription failed: {0}")]
    SubscriptionFailed(String),
}

/// A renderable marker: markup plus pixel size and anchor offset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerGlyph {
    pub markup: String,
    pub size: u32,
    /// Anchor offset in pixels from the glyph's top-left corner.
    pub anchor: (u32, u32),
}

impl MarkerGlyph {
    /// Glyph with the stock catalog markup.
    pub fn new(kind: IconKind, size: u32) -> Self {
        Self {
            markup: kind.markup().to_string(),
            size,
            anchor: kind.anchor(size),
        }
    }

    /// Glyph with inline sizing and color baked into the markup.
    pub fn styled(kind: IconKind, size: u32, color: &str) -> Self {
        Self {
            markup: styled_markup(kind, size, color),
            size,
            anchor: kind.anchor(size),
        }
    }
}

/// Anchor mode for vector-renderer markers, whose anchoring is expressed
/// symbolically rather than as a pixel offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerAnchor {
    Bottom,
    Center,
}

impl MarkerAnchor {
    /// The anchor mode matching the catalog's anchor rule for an icon.
    pub fn for_icon(kind: IconKind) -> Self {
        match kind {
            IconKind::Pin => MarkerAnchor::Bottom,
            _ => MarkerAnchor::Center,
        }
    }
}

/// Events the raster renderer reports back into the module.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PrimaryEvent {
    /// A pan or zoom settled.
    MoveEnd,
    /// The user finished dragging the marker.
    MarkerDragEnd { lat: f64, lon: f64 },
}

/// Events the vector renderer reports back into the module.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SecondaryEvent {
    /// A pan or zoom settled (programmatic or user-driven).
    MoveEnd,
    /// The style handed to the renderer finished loading.
    StyleLoaded,
    /// The user finished dragging the marker. Note the renderer-native
    /// (lon, lat) order.
    MarkerDragEnd { lon: f64, lat: f64 },
}
