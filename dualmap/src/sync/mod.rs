//! The dual-map controller and view synchronizer.
//!
//! [`DualMap`] composes the two adapters behind the module's public
//! command surface and mediates all cross-renderer traffic. Settle events
//! flow in through [`DualMap::handle_primary_event`] and
//! [`DualMap::handle_secondary_event`]; the synchronizer re-applies the
//! equivalent view to the other renderer. Renderers also settle after a
//! programmatic move, so each propagation arms a latch for the echo it
//! provokes; the echoed settle is absorbed instead of bouncing back as a
//! second propagation.
//!
//! The two renderers run zoom scales offset by exactly one level: the
//! secondary always displays `primary zoom - 1`. Every cross-renderer call
//! also reorders coordinates, since the primary consumes (lat, lon) and
//! the secondary (lon, lat).
//!
//! Everything here degrades to best-effort. Commands issued before
//! initialization are silent no-ops, and a closed state channel is
//! ignored; no failure propagates to the caller.

mod guard;
mod types;

pub use types::{MapConfig, StateSnapshot, StateUpdate};

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;

use crate::adapter::{PrimaryAdapter, SecondaryAdapter};
use crate::backend::{
    MarkerAnchor, MarkerGlyph, PrimaryEvent, RasterBackend, SecondaryEvent, VectorBackend,
};
use crate::icon::{IconKind, DEFAULT_MARKER_SIZE};
use crate::theme::{ActiveThemes, Theme};
use guard::{Side, SyncGuard};

/// Fixed zoom-scale offset between the two renderers.
pub const ZOOM_OFFSET: f64 = 1.0;

/// Default bound on waiting for raster tiles to finish loading.
pub const DEFAULT_PRIMARY_IDLE_TIMEOUT: Duration = Duration::from_secs(5);

/// Default bound on waiting for the vector renderer to go idle.
pub const DEFAULT_SECONDARY_IDLE_TIMEOUT: Duration = Duration::from_secs(2);

struct Session {
    primary: PrimaryAdapter,
    secondary: SecondaryAdapter,
    guard: SyncGuard,
}

/// Controller for one synchronized pair of map renderers.
pub struct DualMap {
    sink: UnboundedSender<StateUpdate>,
    session: Option<Session>,
}

impl DualMap {
    /// Creates the controller. No renderer is touched until
    /// [`initialize`](Self::initialize); every command before that is a
    /// silent no-op.
    pub fn new(sink: UnboundedSender<StateUpdate>) -> Self {
        Self {
            sink,
            session: None,
        }
    }

    /// Binds both renderers and brings them to the initial viewport: the
    /// primary at (lat, lon, zoom) with the given tile template, the
    /// secondary at the reordered center one zoom level below, on an
    /// empty style.
    pub fn initialize(
        &mut self,
        config: &MapConfig,
        raster: Arc<dyn RasterBackend>,
        vector: Arc<dyn VectorBackend>,
    ) {
        let (lat, lon) = config.center;
        debug!(lat, lon, zoom = config.zoom, "initializing dual-map session");
        let primary = PrimaryAdapter::new(raster, lat, lon, config.zoom, &config.tile_url);
        let secondary = SecondaryAdapter::new(vector, lon, lat, config.zoom - ZOOM_OFFSET);
        self.session = Some(Session {
            primary,
            secondary,
            guard: SyncGuard::new(),
        });
    }

    pub fn is_initialized(&self) -> bool {
        self.session.is_some()
    }

    /// Feeds a raster-renderer event into the synchronizer.
    pub fn handle_primary_event(&mut self, event: PrimaryEvent) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        match event {
            PrimaryEvent::MoveEnd => {
                if session.guard.absorb(Side::Primary) {
                    debug!("primary settle was a propagation echo; dropped");
                    return;
                }
                let (lat, lon) = session.primary.center();
                let zoom = session.primary.zoom();
                debug!(lat, lon, zoom, "primary settled; following with secondary");
                let _ = self.sink.send(StateUpdate::Viewport { lat, lon, zoom });
                session.secondary.jump_to(lon, lat, zoom - ZOOM_OFFSET);
                // The jump makes the secondary settle too; that echo comes
                // back through handle_secondary_event and must not bounce.
                session.guard.arm(Side::Secondary);
            }
            PrimaryEvent::MarkerDragEnd { lat, lon } => {
                let _ = self.sink.send(StateUpdate::MarkerPosition { lat, lon });
                session.secondary.set_marker_position(lon, lat);
            }
        }
    }

    /// Feeds a vector-renderer event into the synchronizer.
    pub fn handle_secondary_event(&mut self, event: SecondaryEvent) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        match event {
            SecondaryEvent::MoveEnd => {
                if session.guard.absorb(Side::Secondary) {
                    debug!("secondary settle was a propagation echo; dropped");
                    return;
                }
                let (lon, lat) = session.secondary.center();
                let zoom = session.secondary.zoom() + ZOOM_OFFSET;
                debug!(lat, lon, zoom, "secondary settled; snapping primary");
                let _ = self.sink.send(StateUpdate::Viewport { lat, lon, zoom });
                // The primary is following, not leading: snap, no animation
                session.primary.snap_to(lat, lon, zoom);
                session.guard.arm(Side::Primary);
            }
            SecondaryEvent::StyleLoaded => {
                session.secondary.on_style_loaded();
            }
            SecondaryEvent::MarkerDragEnd { lon, lat } => {
                let _ = self.sink.send(StateUpdate::MarkerPosition { lat, lon });
                session.primary.set_marker_position(lat, lon);
                session.secondary.note_dragged(lon, lat);
            }
        }
    }

    /// Pans/zooms the primary; the secondary follows through the settle
    /// event the host forwards back in.
    pub fn set_viewport(
        &mut self,
        lat: Option<f64>,
        lon: Option<f64>,
        zoom: Option<f64>,
        animate: bool,
    ) {
        let Some(session) = self.session.as_ref() else {
            return;
        };
        session.primary.set_view(lat, lon, zoom, animate);
    }

    /// Swaps the raster tile template in place.
    pub fn set_tile_url(&mut self, url: &str) {
        let Some(session) = self.session.as_ref() else {
            return;
        };
        session.primary.set_tile_url(url);
    }

    /// Requests a theme switch on the secondary renderer.
    pub fn apply_theme(&mut self, theme: &Theme) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        session.secondary.apply_theme(theme);
    }

    /// The most recently requested theme name.
    pub fn current_theme_name(&self) -> Option<String> {
        self.session
            .as_ref()
            .and_then(|session| session.secondary.current_theme_name().map(str::to_string))
    }

    /// Sets the marker glyph on both renderers.
    pub fn set_marker_icon(&mut self, name: &str, size: u32) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let kind = IconKind::from_name(name);
        let glyph = MarkerGlyph::new(kind, size);
        session.primary.set_marker_glyph(&glyph);
        session
            .secondary
            .set_marker_glyph(glyph, MarkerAnchor::for_icon(kind));
    }

    /// Resizes the marker; glyph and anchor are recomputed for the new
    /// size.
    pub fn set_marker_size(&mut self, size: u32, name: &str) {
        self.set_marker_icon(name, size);
    }

    pub fn set_marker_visible(&mut self, visible: bool) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        session.primary.set_marker_visible(visible);
        session.secondary.set_marker_visible(visible);
    }

    /// Whether the logical marker is currently shown. `false` before
    /// initialization.
    pub fn marker_visible(&self) -> bool {
        self.session
            .as_ref()
            .is_some_and(|session| session.secondary.marker_visible())
    }

    pub fn set_marker_position(&mut self, lat: f64, lon: f64) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        session.primary.set_marker_position(lat, lon);
        session.secondary.set_marker_position(lon, lat);
    }

    /// Recomputes marker glyph, color, size, position, and visibility from
    /// a full host-state snapshot. The marker color follows the active
    /// theme of whichever renderer the host is presenting.
    pub fn restyle_marker_from_state(&mut self, snapshot: &StateSnapshot, themes: &ActiveThemes) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let kind = IconKind::from_name(&snapshot.marker_icon);
        let size = (DEFAULT_MARKER_SIZE as f64 * snapshot.marker_size).round() as u32;
        let color = themes.marker_color(snapshot.render_mode);
        let glyph = MarkerGlyph::styled(kind, size, color);

        session.primary.restyle_marker(
            &glyph,
            snapshot.marker_lat,
            snapshot.marker_lon,
            snapshot.show_marker,
        );
        session.secondary.restyle_marker(
            glyph,
            MarkerAnchor::for_icon(kind),
            snapshot.marker_lon,
            snapshot.marker_lat,
            snapshot.show_marker,
        );
    }

    /// Re-measures both renderers against their containers.
    pub fn resize_to_container(&mut self) {
        let Some(session) = self.session.as_ref() else {
            return;
        };
        session.primary.invalidate_size();
        session.secondary.resize();
    }

    /// Resolves once the raster renderer has no tiles mid-load, or after
    /// `timeout`, whichever comes first. Never fails; resolves immediately
    /// before initialization.
    pub async fn wait_for_primary_idle(&self, timeout: Duration) {
        let Some(session) = self.session.as_ref() else {
            return;
        };
        session.primary.wait_until_tiles_loaded(timeout).await;
    }

    /// Resolves on the vector renderer's next render-idle signal, or after
    /// `timeout`, whichever comes first. Never fails; resolves immediately
    /// before initialization.
    pub async fn wait_for_secondary_idle(&self, timeout: Duration) {
        let Some(session) = self.session.as_ref() else {
            return;
        };
        session.secondary.wait_until_render_idle(timeout).await;
    }

}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::sim::{SimRasterBackend, SimVectorBackend};
    use crate::theme::{test_theme, RasterTheme, RenderMode};
    use tokio::sync::mpsc::{self, UnboundedReceiver};

    const PARIS: (f64, f64) = (48.8566, 2.3522);

    fn config() -> MapConfig {
        MapConfig {
            center: PARIS,
            zoom: 13.0,
            tile_url: "https://tiles/{z}/{x}/{y}.png".to_string(),
        }
    }

    fn setup() -> (
        DualMap,
        UnboundedReceiver<StateUpdate>,
        SimRasterBackend,
        SimVectorBackend,
    ) {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut controller = DualMap::new(tx);
        let raster = SimRasterBackend::new();
        let vector = SimVectorBackend::new();
        controller.initialize(&config(), Arc::new(raster.clone()), Arc::new(vector.clone()));
        (controller, rx, raster, vector)
    }

    #[test]
    fn test_commands_before_initialization_are_noops() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut controller = DualMap::new(tx);
        assert!(!controller.is_initialized());

        controller.set_viewport(Some(1.0), Some(2.0), Some(3.0), true);
        controller.set_marker_icon("star", 40);
        controller.set_marker_visible(true);
        controller.set_marker_position(1.0, 2.0);
        controller.set_tile_url("https://other/{z}/{x}/{y}.png");
        controller.apply_theme(&test_theme("dark"));
        controller.resize_to_container();
        controller.handle_primary_event(PrimaryEvent::MoveEnd);
        controller.handle_secondary_event(SecondaryEvent::StyleLoaded);

        assert!(controller.current_theme_name().is_none());
        assert!(!controller.marker_visible());
        assert!(rx.try_recv().is_err(), "nothing may be reported outward");
    }

    #[test]
    fn test_initialization_scenario() {
        let (controller, _rx, raster, vector) = setup();
        assert!(controller.is_initialized());
        assert_eq!(raster.center(), PARIS);
        assert_eq!(raster.zoom(), 13.0);
        assert_eq!(raster.tile_url(), "https://tiles/{z}/{x}/{y}.png");

        // Secondary: reordered center, one zoom level below, empty style
        assert_eq!(vector.center(), (2.3522, 48.8566));
        assert_eq!(vector.zoom(), 12.0);
        let styles = vector.styles();
        assert_eq!(styles.len(), 1);
        assert!(styles[0].layers.is_empty());
    }

    #[test]
    fn test_primary_settle_drives_secondary() {
        let (mut controller, mut rx, raster, vector) = setup();
        raster.set_view(51.5074, -0.1278, 15.0, true);
        controller.handle_primary_event(PrimaryEvent::MoveEnd);

        assert_eq!(vector.center(), (-0.1278, 51.5074), "lon/lat reordered");
        assert_eq!(vector.zoom(), 14.0, "secondary zoom is primary - 1");
        assert_eq!(
            rx.try_recv().unwrap(),
            StateUpdate::Viewport {
                lat: 51.5074,
                lon: -0.1278,
                zoom: 15.0
            }
        );
    }

    #[test]
    fn test_secondary_settle_snaps_primary() {
        let (mut controller, mut rx, raster, vector) = setup();
        vector.jump_to(-74.0060, 40.7128, 11.0);
        controller.handle_secondary_event(SecondaryEvent::MoveEnd);

        assert_eq!(raster.center(), (40.7128, -74.0060));
        assert_eq!(raster.zoom(), 12.0, "primary zoom is secondary + 1");
        assert!(
            !raster.last_view().unwrap().animate,
            "the follower must snap, not animate"
        );
        assert_eq!(
            rx.try_recv().unwrap(),
            StateUpdate::Viewport {
                lat: 40.7128,
                lon: -74.0060,
                zoom: 12.0
            }
        );
    }

    #[test]
    fn test_induced_secondary_settle_does_not_bounce() {
        let (mut controller, mut rx, raster, vector) = setup();
        raster.set_view(51.5074, -0.1278, 15.0, true);
        controller.handle_primary_event(PrimaryEvent::MoveEnd);
        let views_after_propagation = raster.views().len();
        assert!(rx.try_recv().is_ok(), "the user pan itself is reported");

        // The jump made the secondary settle; the host forwards that too
        controller.handle_secondary_event(SecondaryEvent::MoveEnd);

        assert_eq!(
            raster.views().len(),
            views_after_propagation,
            "echoed settle must not re-drive the primary"
        );
        assert_eq!(vector.zoom(), 14.0, "secondary keeps the propagated view");
        assert!(rx.try_recv().is_err(), "echo produces no outward report");
    }

    #[test]
    fn test_induced_primary_settle_does_not_bounce() {
        let (mut controller, mut rx, raster, vector) = setup();
        vector.jump_to(-74.0060, 40.7128, 11.0);
        controller.handle_secondary_event(SecondaryEvent::MoveEnd);
        let jumps_after_propagation = vector.jumps().len();
        assert!(rx.try_recv().is_ok());

        controller.handle_primary_event(PrimaryEvent::MoveEnd);

        assert_eq!(
            vector.jumps().len(),
            jumps_after_propagation,
            "echoed settle must not re-drive the secondary"
        );
        assert!((raster.zoom() - 12.0).abs() < 1e-9);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_user_settle_after_echo_propagates_again() {
        let (mut controller, _rx, raster, vector) = setup();
        raster.set_view(10.0, 20.0, 16.0, false);
        controller.handle_primary_event(PrimaryEvent::MoveEnd);
        controller.handle_secondary_event(SecondaryEvent::MoveEnd); // echo
        assert_eq!(vector.zoom(), 15.0);

        // Echo consumed the latch; a genuine pan goes through again
        vector.jump_to(2.3522, 48.8566, 12.0);
        controller.handle_secondary_event(SecondaryEvent::MoveEnd);
        assert_eq!(raster.center(), (48.8566, 2.3522));
        assert!((raster.zoom() - 13.0).abs() < 1e-9);
    }

    #[test]
    fn test_primary_drag_mirrors_to_secondary() {
        let (mut controller, mut rx, _raster, vector) = setup();
        controller.set_marker_visible(true);
        controller.handle_primary_event(PrimaryEvent::MarkerDragEnd {
            lat: 48.85,
            lon: 2.35,
        });

        assert_eq!(
            rx.try_recv().unwrap(),
            StateUpdate::MarkerPosition {
                lat: 48.85,
                lon: 2.35
            }
        );
        let marker = vector.marker().unwrap();
        assert_eq!((marker.lon, marker.lat), (2.35, 48.85));
    }

    #[test]
    fn test_secondary_drag_mirrors_to_primary() {
        let (mut controller, mut rx, raster, _vector) = setup();
        controller.set_marker_visible(true);
        controller.handle_secondary_event(SecondaryEvent::MarkerDragEnd {
            lon: 2.40,
            lat: 48.90,
        });

        assert_eq!(
            rx.try_recv().unwrap(),
            StateUpdate::MarkerPosition {
                lat: 48.90,
                lon: 2.40
            }
        );
        assert_eq!(raster.marker_pos(), Some((48.90, 2.40)));
    }

    #[test]
    fn test_secondary_drag_survives_icon_change() {
        let (mut controller, _rx, raster, vector) = setup();
        controller.set_marker_visible(true);
        controller.handle_secondary_event(SecondaryEvent::MarkerDragEnd {
            lon: 9.19,
            lat: 45.46,
        });

        // Changing the icon recreates the secondary marker element
        controller.set_marker_icon("star", 40);
        let marker = vector.marker().unwrap();
        assert_eq!(
            (marker.lon, marker.lat),
            (9.19, 45.46),
            "recreation must keep the dragged position"
        );
        assert_eq!(raster.marker_pos(), Some((45.46, 9.19)));
    }

    #[test]
    fn test_marker_visibility_is_reported() {
        let (mut controller, _rx, _raster, _vector) = setup();
        assert!(!controller.marker_visible(), "marker starts hidden");
        controller.set_marker_visible(true);
        assert!(controller.marker_visible());
        controller.set_marker_visible(false);
        assert!(!controller.marker_visible());
    }

    #[test]
    fn test_double_apply_before_load_hits_renderer_twice() {
        let (mut controller, _rx, _raster, vector) = setup();
        let dark = test_theme("dark");
        controller.apply_theme(&dark);
        controller.apply_theme(&dark);

        let applied: Vec<_> = vector.styles().into_iter().skip(1).collect();
        assert_eq!(applied.len(), 2, "repeat before load is applied, not deduped");
        assert_eq!(applied[1], crate::style::generate_style(&dark));
        assert_eq!(controller.current_theme_name().as_deref(), Some("dark"));
    }

    #[test]
    fn test_settled_theme_repeat_is_noop() {
        let (mut controller, _rx, _raster, vector) = setup();
        controller.apply_theme(&test_theme("dark"));
        controller.handle_secondary_event(SecondaryEvent::StyleLoaded);

        controller.apply_theme(&test_theme("dark"));
        assert_eq!(vector.styles().len(), 2, "bootstrap + one application only");
    }

    #[test]
    fn test_marker_icon_flows_to_both_renderers() {
        let (mut controller, _rx, raster, vector) = setup();
        controller.set_marker_visible(true);
        controller.set_marker_icon("star", 48);

        assert_eq!(raster.glyph().unwrap().anchor, (24, 24));
        let marker = vector.marker().unwrap();
        assert_eq!(marker.anchor, MarkerAnchor::Center);

        controller.set_marker_size(60, "pin");
        assert_eq!(raster.glyph().unwrap().anchor, (30, 60));
        assert_eq!(vector.marker().unwrap().anchor, MarkerAnchor::Bottom);
    }

    #[test]
    fn test_restyle_from_state_colors_by_render_mode() {
        let (mut controller, _rx, raster, vector) = setup();
        let themes = ActiveThemes {
            raster: RasterTheme {
                text_color: Some("#00ff00".to_string()),
            },
            vector: test_theme("dark"),
        };
        let mut snapshot = StateSnapshot {
            marker_icon: "heart".to_string(),
            marker_size: 1.5,
            marker_lat: 48.85,
            marker_lon: 2.35,
            show_marker: true,
            render_mode: RenderMode::Artistic,
        };

        controller.restyle_marker_from_state(&snapshot, &themes);
        let glyph = raster.glyph().unwrap();
        assert_eq!(glyph.size, 60, "40px base scaled by 1.5");
        assert!(glyph.markup.contains("color: #777777"), "artistic mode uses road_primary");
        assert!(raster.marker_attached());
        let marker = vector.marker().unwrap();
        assert_eq!((marker.lon, marker.lat), (2.35, 48.85));

        snapshot.render_mode = RenderMode::Raster;
        controller.restyle_marker_from_state(&snapshot, &themes);
        assert!(
            raster.glyph().unwrap().markup.contains("color: #00ff00"),
            "raster mode uses the tile theme's text color"
        );

        snapshot.show_marker = false;
        controller.restyle_marker_from_state(&snapshot, &themes);
        assert!(!raster.marker_attached());
        assert!(vector.marker().is_none());
    }

    #[test]
    fn test_tile_url_and_resize() {
        let (mut controller, _rx, raster, vector) = setup();
        controller.set_tile_url("https://other/{z}/{x}/{y}.png");
        assert_eq!(raster.tile_url(), "https://other/{z}/{x}/{y}.png");

        controller.resize_to_container();
        assert_eq!(raster.invalidations(), 1);
        assert_eq!(vector.resizes(), 1);
    }

    #[tokio::test]
    async fn test_probes_resolve_before_initialization() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let controller = DualMap::new(tx);
        controller.wait_for_primary_idle(Duration::from_secs(5)).await;
        controller.wait_for_secondary_idle(Duration::from_secs(5)).await;
    }
}
