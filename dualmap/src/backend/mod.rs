//! Renderer backend abstraction.
//!
//! The module never talks to a real map renderer directly. Hosts implement
//! [`RasterBackend`] over their tile map and [`VectorBackend`] over their
//! artistic map, and forward renderer events in as [`PrimaryEvent`] /
//! [`SecondaryEvent`]. This keeps the synchronizer and the style-swap
//! protocol testable without a rendering engine; [`sim`] provides the
//! in-memory backends the test suite and the demo CLI run against.
//!
//! Coordinate conventions follow the renderers themselves: the raster side
//! consumes `(lat, lon)`, the vector side `(lon, lat)`. Callers of these
//! traits reorder at every cross-renderer boundary.

mod types;

pub mod sim;

pub use types::{
    BackendError, MarkerAnchor, MarkerGlyph, PrimaryEvent, SecondaryEvent,
};

use tokio::sync::oneshot;

use crate::style::StyleDocument;

/// Handle to the raster tile renderer.
pub trait RasterBackend: Send + Sync {
    /// Pans and zooms to a center, optionally animated.
    fn set_view(&self, lat: f64, lon: f64, zoom: f64, animate: bool);

    /// Zooms in place without panning.
    fn set_zoom(&self, zoom: f64, animate: bool);

    /// Current center as `(lat, lon)`.
    fn center(&self) -> (f64, f64);

    /// Current zoom level.
    fn zoom(&self) -> f64;

    /// Swaps the tile template URL without recreating the tile layer.
    fn set_tile_url(&self, url: &str);

    /// Replaces the marker's glyph (markup, size, anchor).
    fn set_marker_glyph(&self, glyph: &MarkerGlyph);

    /// Moves the marker.
    fn set_marker_position(&self, lat: f64, lon: f64);

    /// Attaches the marker to the render tree. Idempotent.
    fn add_marker(&self);

    /// Detaches the marker without destroying it. Idempotent.
    fn remove_marker(&self);

    /// Whether the marker is currently attached.
    fn marker_attached(&self) -> bool;

    /// Whether any tiles are currently mid-load.
    fn tiles_loading(&self) -> bool;

    /// Installs a one-shot listener for the next "all tiles loaded" signal.
    fn subscribe_tiles_loaded(&self) -> Result<oneshot::Receiver<()>, BackendError>;

    /// Re-measures the renderer against its container.
    fn invalidate_size(&self);
}

/// Handle to the vector (artistic) renderer.
pub trait VectorBackend: Send + Sync {
    /// Jumps to a center and zoom with no animation.
    fn jump_to(&self, lon: f64, lat: f64, zoom: f64);

    /// Current center as `(lon, lat)`.
    fn center(&self) -> (f64, f64);

    /// Current zoom level (vector-renderer zoom domain).
    fn zoom(&self) -> f64;

    /// Hands a style document to the renderer. The renderer signals
    /// completion later via [`SecondaryEvent::StyleLoaded`].
    fn set_style(&self, style: &StyleDocument) -> Result<(), BackendError>;

    /// Creates the marker element at a position. The backend wires drag
    /// reporting for the new element; callers remove any previous marker
    /// first.
    fn create_marker(&self, glyph: &MarkerGlyph, lon: f64, lat: f64, anchor: MarkerAnchor);

    /// Removes the marker element. Idempotent.
    fn remove_marker(&self);

    /// Moves the marker.
    fn set_marker_position(&self, lon: f64, lat: f64);

    /// Installs a one-shot listener for the next render-idle signal.
    fn subscribe_render_idle(&self) -> Result<oneshot::Receiver<()>, BackendError>;

    /// Re-measures the renderer against its container.
    fn resize(&self);
}
