//! Adapter over the raster tile renderer.

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::backend::{MarkerGlyph, RasterBackend};
use crate::icon::{IconKind, DEFAULT_MARKER_SIZE};

/// Owns the raster renderer's viewport, tile layer, and marker.
///
/// The marker is created with the session but stays detached from the
/// render tree until the host shows it; visibility toggling attaches and
/// detaches rather than destroying.
pub struct PrimaryAdapter {
    backend: Arc<dyn RasterBackend>,
}

impl PrimaryAdapter {
    /// Initializes the renderer at a center, zoom, and tile template URL,
    /// and stages the default marker.
    pub fn new(backend: Arc<dyn RasterBackend>, lat: f64, lon: f64, zoom: f64, tile_url: &str) -> Self {
        backend.set_view(lat, lon, zoom, false);
        backend.set_tile_url(tile_url);
        backend.set_marker_glyph(&MarkerGlyph::new(IconKind::Pin, DEFAULT_MARKER_SIZE));
        backend.set_marker_position(lat, lon);
        Self { backend }
    }

    /// Pans/zooms when a center is given; zooms in place when only a zoom
    /// is given. Mirrors the host-facing viewport command semantics.
    pub fn set_view(&self, lat: Option<f64>, lon: Option<f64>, zoom: Option<f64>, animate: bool) {
        match (lat, lon) {
            (Some(lat), Some(lon)) => {
                let zoom = zoom.unwrap_or_else(|| self.backend.zoom());
                self.backend.set_view(lat, lon, zoom, animate);
            }
            _ => {
                if let Some(zoom) = zoom {
                    self.backend.set_zoom(zoom, animate);
                }
            }
        }
    }

    /// Snaps instantly to a view. Used when this renderer follows the
    /// other one, which must not animate.
    pub fn snap_to(&self, lat: f64, lon: f64, zoom: f64) {
        self.backend.set_view(lat, lon, zoom, false);
    }

    pub fn center(&self) -> (f64, f64) {
        self.backend.center()
    }

    pub fn zoom(&self) -> f64 {
        self.backend.zoom()
    }

    pub fn set_tile_url(&self, url: &str) {
        self.backend.set_tile_url(url);
    }

    pub fn set_marker_glyph(&self, glyph: &MarkerGlyph) {
        self.backend.set_marker_glyph(glyph);
    }

    pub fn set_marker_position(&self, lat: f64, lon: f64) {
        self.backend.set_marker_position(lat, lon);
    }

    pub fn set_marker_visible(&self, visible: bool) {
        if visible {
            self.backend.add_marker();
        } else {
            self.backend.remove_marker();
        }
    }

    /// Applies a full marker restyle: glyph, position, visibility.
    pub fn restyle_marker(&self, glyph: &MarkerGlyph, lat: f64, lon: f64, visible: bool) {
        if visible {
            self.backend.set_marker_glyph(glyph);
            self.backend.set_marker_position(lat, lon);
            if !self.backend.marker_attached() {
                self.backend.add_marker();
            }
        } else if self.backend.marker_attached() {
            self.backend.remove_marker();
        }
    }

    pub fn invalidate_size(&self) {
        self.backend.invalidate_size();
    }

    /// Resolves once no tiles are mid-load, the next loaded signal fires,
    /// or the timeout elapses, whichever comes first. Never fails.
    pub async fn wait_until_tiles_loaded(&self, timeout: Duration) {
        if !self.backend.tiles_loading() {
            return;
        }
        let loaded = match self.backend.subscribe_tiles_loaded() {
            Ok(rx) => rx,
            Err(err) => {
                debug!(%err, "tile-load subscription failed; treating renderer as idle");
                return;
            }
        };
        tokio::select! {
            _ = loaded => {}
            _ = tokio::time::sleep(timeout) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::sim::SimRasterBackend;

    fn adapter() -> (PrimaryAdapter, SimRasterBackend) {
        let backend = SimRasterBackend::new();
        let adapter = PrimaryAdapter::new(
            Arc::new(backend.clone()),
            48.8566,
            2.3522,
            13.0,
            "https://tiles/{z}/{x}/{y}.png",
        );
        (adapter, backend)
    }

    #[test]
    fn test_initialization_sets_view_tiles_and_marker() {
        let (_adapter, backend) = adapter();
        assert_eq!(backend.center(), (48.8566, 2.3522));
        assert_eq!(backend.zoom(), 13.0);
        assert_eq!(backend.tile_url(), "https://tiles/{z}/{x}/{y}.png");
        assert_eq!(backend.marker_pos(), Some((48.8566, 2.3522)));
        assert!(!backend.marker_attached(), "marker starts detached");
        assert!(!backend.last_view().unwrap().animate);
    }

    #[test]
    fn test_set_view_with_center_pans() {
        let (adapter, backend) = adapter();
        adapter.set_view(Some(51.5), Some(-0.12), Some(10.0), true);
        let view = backend.last_view().unwrap();
        assert_eq!((view.lat, view.lon, view.zoom), (51.5, -0.12, 10.0));
        assert!(view.animate);
    }

    #[test]
    fn test_set_view_keeps_zoom_when_omitted() {
        let (adapter, backend) = adapter();
        adapter.set_view(Some(51.5), Some(-0.12), None, true);
        assert_eq!(backend.zoom(), 13.0);
    }

    #[test]
    fn test_set_view_zoom_only_zooms_in_place() {
        let (adapter, backend) = adapter();
        adapter.set_view(None, None, Some(15.0), false);
        assert_eq!(backend.center(), (48.8566, 2.3522));
        assert_eq!(backend.zoom(), 15.0);
    }

    #[test]
    fn test_set_view_without_center_or_zoom_is_noop() {
        let (adapter, backend) = adapter();
        let before = backend.views().len();
        adapter.set_view(None, None, None, true);
        assert_eq!(backend.views().len(), before);
    }

    #[test]
    fn test_snap_to_never_animates() {
        let (adapter, backend) = adapter();
        adapter.snap_to(40.0, -74.0, 12.0);
        assert!(!backend.last_view().unwrap().animate);
    }

    #[test]
    fn test_marker_visibility_toggles_attachment() {
        let (adapter, backend) = adapter();
        adapter.set_marker_visible(true);
        assert!(backend.marker_attached());
        adapter.set_marker_visible(false);
        assert!(!backend.marker_attached());
        // Marker state survives the toggle
        assert!(backend.glyph().is_some());
    }

    #[test]
    fn test_restyle_marker_hidden_detaches() {
        let (adapter, backend) = adapter();
        adapter.set_marker_visible(true);
        let glyph = MarkerGlyph::new(IconKind::Star, 48);
        adapter.restyle_marker(&glyph, 1.0, 2.0, false);
        assert!(!backend.marker_attached());
    }

    #[test]
    fn test_restyle_marker_shown_updates_everything() {
        let (adapter, backend) = adapter();
        let glyph = MarkerGlyph::new(IconKind::Star, 48);
        adapter.restyle_marker(&glyph, 1.0, 2.0, true);
        assert!(backend.marker_attached());
        assert_eq!(backend.glyph(), Some(glyph));
        assert_eq!(backend.marker_pos(), Some((1.0, 2.0)));
    }

    #[tokio::test]
    async fn test_wait_resolves_immediately_when_not_loading() {
        let (adapter, _backend) = adapter();
        // No tiles mid-load, so this must not block on the 5s timeout
        adapter.wait_until_tiles_loaded(Duration::from_secs(5)).await;
    }

    #[tokio::test]
    async fn test_wait_resolves_on_loaded_signal() {
        let (adapter, backend) = adapter();
        backend.set_tiles_loading(true);
        let driver = backend.clone();
        let fire = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            driver.fire_tiles_loaded();
        });
        let start = std::time::Instant::now();
        adapter.wait_until_tiles_loaded(Duration::from_secs(10)).await;
        assert!(start.elapsed() < Duration::from_secs(5), "signal should beat timeout");
        fire.await.unwrap();
    }

    #[tokio::test]
    async fn test_wait_resolves_on_timeout_without_signal() {
        let (adapter, backend) = adapter();
        backend.set_tiles_loading(true);
        adapter.wait_until_tiles_loaded(Duration::from_millis(20)).await;
    }

    #[tokio::test]
    async fn test_wait_resolves_when_subscription_fails() {
        let (adapter, backend) = adapter();
        backend.set_tiles_loading(true);
        backend.fail_subscriptions(true);
        adapter.wait_until_tiles_loaded(Duration::from_secs(10)).await;
    }
}
