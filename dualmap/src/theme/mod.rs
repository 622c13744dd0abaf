//! Theme palettes for the two renderers.
//!
//! A [`Theme`] describes the artistic vector map: background, water and park
//! fills, and one color per road class. The raster map's appearance comes
//! from its tile set, so [`RasterTheme`] only carries what this module needs
//! from it (the marker text color).
//!
//! Themes are identified by name. Applying a theme whose name matches the
//! one already settled on the vector renderer is a no-op, so names must be
//! unique across the host's theme catalog.

use serde::{Deserialize, Serialize};

/// Marker color used when a theme does not provide one.
pub const DEFAULT_MARKER_COLOR: &str = "#0f172a";

/// Input palette for the vector style generator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Theme {
    /// Unique identifier; the style-swap dedupe key.
    pub name: String,
    pub bg: String,
    pub water: String,
    pub parks: String,
    pub road_default: String,
    pub road_residential: String,
    pub road_tertiary: String,
    pub road_secondary: String,
    pub road_primary: String,
    pub road_motorway: String,
    /// Optional accent color, used as a marker-color fallback.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl Theme {
    /// Marker color for artistic render mode: the primary road color,
    /// falling back to the accent color, then the global default.
    pub fn marker_color(&self) -> &str {
        if !self.road_primary.is_empty() {
            return &self.road_primary;
        }
        match &self.text {
            Some(text) if !text.is_empty() => text,
            _ => DEFAULT_MARKER_COLOR,
        }
    }
}

/// The slice of a raster tile theme this module consumes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RasterTheme {
    /// Text color of the tile set, used for the marker in raster mode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_color: Option<String>,
}

impl RasterTheme {
    /// Marker color for raster render mode.
    pub fn marker_color(&self) -> &str {
        match &self.text_color {
            Some(color) if !color.is_empty() => color,
            _ => DEFAULT_MARKER_COLOR,
        }
    }
}

/// Which renderer the host is currently presenting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderMode {
    Raster,
    Artistic,
}

/// The currently selected theme for each renderer, resolved by the host.
///
/// Theme storage and selection live with the host application; this struct
/// is the snapshot handed to marker restyling.
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveThemes {
    pub raster: RasterTheme,
    pub vector: Theme,
}

impl ActiveThemes {
    /// Marker color for the given render mode.
    pub fn marker_color(&self, mode: RenderMode) -> &str {
        match mode {
            RenderMode::Raster => self.raster.marker_color(),
            RenderMode::Artistic => self.vector.marker_color(),
        }
    }
}

#[cfg(test)]
pub(crate) fn test_theme(name: &str) -> Theme {
    Theme {
        name: name.to_string(),
        bg: "#000000".to_string(),
        water: "#111111".to_string(),
        parks: "#222222".to_string(),
        road_default: "#333333".to_string(),
        road_residential: "#444444".to_string(),
        road_tertiary: "#555555".to_string(),
        road_secondary: "#666666".to_string(),
        road_primary: "#777777".to_string(),
        road_motorway: "#888888".to_string(),
        text: None,
    }
}
