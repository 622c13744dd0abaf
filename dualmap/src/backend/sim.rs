//! In-memory simulated backends.
//!
//! These stand in for real renderers in the test suite and the demo CLI.
//! They record every call so tests can assert on what the module asked the
//! renderer to do, and they expose drive methods (`fire_*`, `set_*`) so a
//! test can play the renderer's side of the protocol.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::oneshot;

use super::{BackendError, MarkerAnchor, MarkerGlyph, RasterBackend, VectorBackend};
use crate::style::StyleDocument;

/// One recorded view change on the raster side.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewChange {
    pub lat: f64,
    pub lon: f64,
    pub zoom: f64,
    pub animate: bool,
}

#[derive(Debug, Default)]
struct RasterState {
    center: (f64, f64),
    zoom: f64,
    tile_url: String,
    views: Vec<ViewChange>,
    glyph: Option<MarkerGlyph>,
    marker_pos: Option<(f64, f64)>,
    attached: bool,
    tiles_loading: bool,
    loaded_waiters: Vec<oneshot::Sender<()>>,
    fail_subscriptions: bool,
    invalidations: u32,
}

/// Simulated raster tile renderer.
#[derive(Debug, Clone, Default)]
pub struct SimRasterBackend {
    state: Arc<Mutex<RasterState>>,
}

impl SimRasterBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks tiles as mid-load so `wait_until` probes have to wait.
    pub fn set_tiles_loading(&self, loading: bool) {
        self.state.lock().tiles_loading = loading;
    }

    /// Makes future event subscriptions fail.
    pub fn fail_subscriptions(&self, fail: bool) {
        self.state.lock().fail_subscriptions = fail;
    }

    /// Delivers the "all tiles loaded" signal to every waiting probe.
    pub fn fire_tiles_loaded(&self) {
        let waiters = {
            let mut state = self.state.lock();
            state.tiles_loading = false;
            std::mem::take(&mut state.loaded_waiters)
        };
        for waiter in waiters {
            let _ = waiter.send(());
        }
    }

    pub fn tile_url(&self) -> String {
        self.state.lock().tile_url.clone()
    }

    pub fn glyph(&self) -> Option<MarkerGlyph> {
        self.state.lock().glyph.clone()
    }

    pub fn marker_pos(&self) -> Option<(f64, f64)> {
        self.state.lock().marker_pos
    }

    /// Every view change so far, in order.
    pub fn views(&self) -> Vec<ViewChange> {
        self.state.lock().views.clone()
    }

    pub fn last_view(&self) -> Option<ViewChange> {
        self.state.lock().views.last().cloned()
    }

    pub fn invalidations(&self) -> u32 {
        self.state.lock().invalidations
    }
}

impl RasterBackend for SimRasterBackend {
    fn set_view(&self, lat: f64, lon: f64, zoom: f64, animate: bool) {
        let mut state = self.state.lock();
        state.center = (lat, lon);
        state.zoom = zoom;
        state.views.push(ViewChange {
            lat,
            lon,
            zoom,
            animate,
        });
    }

    fn set_zoom(&self, zoom: f64, animate: bool) {
        let mut state = self.state.lock();
        let (lat, lon) = state.center;
        state.zoom = zoom;
        state.views.push(ViewChange {
            lat,
            lon,
            zoom,
            animate,
        });
    }

    fn center(&self) -> (f64, f64) {
        self.state.lock().center
    }

    fn zoom(&self) -> f64 {
        self.state.lock().zoom
    }

    fn set_tile_url(&self, url: &str) {
        self.state.lock().tile_url = url.to_string();
    }

    fn set_marker_glyph(&self, glyph: &MarkerGlyph) {
        self.state.lock().glyph = Some(glyph.clone());
    }

    fn set_marker_position(&self, lat: f64, lon: f64) {
        self.state.lock().marker_pos = Some((lat, lon));
    }

    fn add_marker(&self) {
        self.state.lock().attached = true;
    }

    fn remove_marker(&self) {
        self.state.lock().attached = false;
    }

    fn marker_attached(&self) -> bool {
        self.state.lock().attached
    }

    fn tiles_loading(&self) -> bool {
        self.state.lock().tiles_loading
    }

    fn subscribe_tiles_loaded(&self) -> Result<oneshot::Receiver<()>, BackendError> {
        let mut state = self.state.lock();
        if state.fail_subscriptions {
            return Err(BackendError::SubscriptionFailed(
                "simulated subscription failure".to_string(),
            ));
        }
        let (tx, rx) = oneshot::channel();
        state.loaded_waiters.push(tx);
        Ok(rx)
    }

    fn invalidate_size(&self) {
        self.state.lock().invalidations += 1;
    }
}

/// One marker element on the simulated vector renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct SimMarker {
    pub glyph: MarkerGlyph,
    pub lon: f64,
    pub lat: f64,
    pub anchor: MarkerAnchor,
}

#[derive(Debug, Default)]
struct VectorState {
    center: (f64, f64),
    zoom: f64,
    jumps: Vec<(f64, f64, f64)>,
    styles: Vec<StyleDocument>,
    reject_styles: bool,
    marker: Option<SimMarker>,
    markers_created: u32,
    idle_waiters: Vec<oneshot::Sender<()>>,
    fail_subscriptions: bool,
    resizes: u32,
}

/// Simulated vector (artistic) renderer.
#[derive(Debug, Clone, Default)]
pub struct SimVectorBackend {
    state: Arc<Mutex<VectorState>>,
}

impl SimVectorBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes `set_style` fail until turned off again.
    pub fn reject_styles(&self, reject: bool) {
        self.state.lock().reject_styles = reject;
    }

    /// Makes future event subscriptions fail.
    pub fn fail_subscriptions(&self, fail: bool) {
        self.state.lock().fail_subscriptions = fail;
    }

    /// Delivers the render-idle signal to every waiting probe.
    pub fn fire_render_idle(&self) {
        let waiters = std::mem::take(&mut self.state.lock().idle_waiters);
        for waiter in waiters {
            let _ = waiter.send(());
        }
    }

    /// Every view jump so far, as (lon, lat, zoom) in order.
    pub fn jumps(&self) -> Vec<(f64, f64, f64)> {
        self.state.lock().jumps.clone()
    }

    /// Every style handed to the renderer, in order (empty init style
    /// included).
    pub fn styles(&self) -> Vec<StyleDocument> {
        self.state.lock().styles.clone()
    }

    pub fn last_style(&self) -> Option<StyleDocument> {
        self.state.lock().styles.last().cloned()
    }

    pub fn marker(&self) -> Option<SimMarker> {
        self.state.lock().marker.clone()
    }

    /// How many marker elements have been created over the session.
    pub fn markers_created(&self) -> u32 {
        self.state.lock().markers_created
    }

    pub fn resizes(&self) -> u32 {
        self.state.lock().resizes
    }
}

impl VectorBackend for SimVectorBackend {
    fn jump_to(&self, lon: f64, lat: f64, zoom: f64) {
        let mut state = self.state.lock();
        state.center = (lon, lat);
        state.zoom = zoom;
        state.jumps.push((lon, lat, zoom));
    }

    fn center(&self) -> (f64, f64) {
        self.state.lock().center
    }

    fn zoom(&self) -> f64 {
        self.state.lock().zoom
    }

    fn set_style(&self, style: &StyleDocument) -> Result<(), BackendError> {
        let mut state = self.state.lock();
        if state.reject_styles {
            return Err(BackendError::StyleRejected(
                "simulated style rejection".to_string(),
            ));
        }
        state.styles.push(style.clone());
        Ok(())
    }

    fn create_marker(&self, glyph: &MarkerGlyph, lon: f64, lat: f64, anchor: MarkerAnchor) {
        let mut state = self.state.lock();
        state.marker = Some(SimMarker {
            glyph: glyph.clone(),
            lon,
            lat,
            anchor,
        });
        state.markers_created += 1;
    }

    fn remove_marker(&self) {
        self.state.lock().marker = None;
    }

    fn set_marker_position(&self, lon: f64, lat: f64) {
        if let Some(marker) = self.state.lock().marker.as_mut() {
            marker.lon = lon;
            marker.lat = lat;
        }
    }

    fn subscribe_render_idle(&self) -> Result<oneshot::Receiver<()>, BackendError> {
        let mut state = self.state.lock();
        if state.fail_subscriptions {
            return Err(BackendError::SubscriptionFailed(
                "simulated subscription failure".to_string(),
            ));
        }
        let (tx, rx) = oneshot::channel();
        state.idle_waiters.push(tx);
        Ok(rx)
    }

    fn resize(&self) {
        self.state.lock().resizes += 1;
    }
}
