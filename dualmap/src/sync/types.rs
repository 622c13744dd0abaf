//! Host-facing types for the dual-map controller.

use serde::{Deserialize, Serialize};

use crate::theme::RenderMode;

/// Initialization parameters for a dual-map session.
///
/// Container creation belongs to the host; by the time a session is
/// initialized both backends are already bound to their containers.
#[derive(Debug, Clone, PartialEq)]
pub struct MapConfig {
    /// Initial center as (lat, lon).
    pub center: (f64, f64),
    /// Initial zoom in primary-map zoom units.
    pub zoom: f64,
    /// Tile template URL for the raster renderer.
    pub tile_url: String,
}

/// Updates this module reports outward to the host's state store.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum StateUpdate {
    /// A user-driven pan or zoom settled.
    Viewport { lat: f64, lon: f64, zoom: f64 },
    /// A marker drag finished.
    MarkerPosition { lat: f64, lon: f64 },
}

/// Snapshot of the host state that drives marker restyling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateSnapshot {
    pub marker_icon: String,
    /// Multiplier on the base marker size.
    pub marker_size: f64,
    pub marker_lat: f64,
    pub marker_lon: f64,
    pub show_marker: bool,
    pub render_mode: RenderMode,
}
