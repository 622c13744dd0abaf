//! Adapter over the vector (artistic) renderer.
//!
//! Besides viewport and marker duties this adapter owns live theme
//! switching. The renderer cannot accept a second style while the first is
//! still loading without undefined visual results, so applications run
//! through a small state machine: at most one application is in flight, and
//! a single pending slot holds the newest superseded request. The last
//! requested theme always wins and the caller never blocks.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::backend::{MarkerAnchor, MarkerGlyph, VectorBackend};
use crate::icon::{IconKind, DEFAULT_MARKER_SIZE};
use crate::style::{empty_style, generate_style, StyleDocument};
use crate::theme::Theme;

/// Whether a style application is currently in flight on the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SwapState {
    Idle,
    Applying,
}

/// A superseded style request waiting for the in-flight one to finish.
#[derive(Debug, Clone)]
struct PendingStyle {
    name: String,
    style: StyleDocument,
}

/// Owns the vector renderer's viewport, marker, and style.
pub struct SecondaryAdapter {
    backend: Arc<dyn VectorBackend>,
    /// Most recently requested theme name, recorded eagerly.
    requested_theme: Option<String>,
    /// Name of the last style that fully finished loading.
    settled_theme: Option<String>,
    swap: SwapState,
    pending: Option<PendingStyle>,
    glyph: MarkerGlyph,
    anchor: MarkerAnchor,
    marker_visible: bool,
    /// Marker position in renderer-native (lon, lat) order, kept so the
    /// marker element can be recreated in place.
    marker_pos: (f64, f64),
}

impl SecondaryAdapter {
    /// Initializes the renderer with an empty style (no sources, no
    /// layers) so the first theme application behaves like any other, and
    /// stages the default marker without attaching it.
    pub fn new(backend: Arc<dyn VectorBackend>, lon: f64, lat: f64, zoom: f64) -> Self {
        if let Err(err) = backend.set_style(&empty_style()) {
            warn!(%err, "vector renderer rejected the empty bootstrap style");
        }
        backend.jump_to(lon, lat, zoom);
        Self {
            backend,
            requested_theme: None,
            settled_theme: None,
            swap: SwapState::Idle,
            pending: None,
            glyph: MarkerGlyph::new(IconKind::Pin, DEFAULT_MARKER_SIZE),
            anchor: MarkerAnchor::Bottom,
            marker_visible: false,
            marker_pos: (lon, lat),
        }
    }

    /// Requests a theme switch.
    ///
    /// A repeat of the settled theme while nothing is in flight is a
    /// no-op. While an application is in flight the repeat is honored
    /// instead, so a silently failed attempt can be retried by the caller.
    pub fn apply_theme(&mut self, theme: &Theme) {
        if self.swap == SwapState::Idle && self.settled_theme.as_deref() == Some(theme.name.as_str())
        {
            return;
        }

        self.requested_theme = Some(theme.name.clone());
        let style = generate_style(theme);

        match self.swap {
            SwapState::Applying => {
                // Last write wins: whatever was queued before is dropped.
                self.pending = Some(PendingStyle {
                    name: theme.name.clone(),
                    style: style.clone(),
                });
                debug!(theme = %theme.name, "style swap in flight; request queued");
                if let Err(err) = self.backend.set_style(&style) {
                    warn!(theme = %theme.name, %err, "immediate re-apply failed; pending request kept");
                }
            }
            SwapState::Idle => {
                self.swap = SwapState::Applying;
                if let Err(err) = self.backend.set_style(&style) {
                    warn!(theme = %theme.name, %err, "style application failed; queued for retry");
                    self.pending = Some(PendingStyle {
                        name: theme.name.clone(),
                        style,
                    });
                }
            }
        }
    }

    /// Handles the renderer's "style finished loading" signal.
    pub fn on_style_loaded(&mut self) {
        match self.pending.take() {
            Some(next) => {
                debug!(theme = %next.name, "applying superseding style request");
                self.requested_theme = Some(next.name.clone());
                if let Err(err) = self.backend.set_style(&next.style) {
                    warn!(theme = %next.name, %err, "deferred style application failed; kept for retry");
                    self.pending = Some(next);
                }
                // Still applying either way
            }
            None => {
                self.settled_theme = self.requested_theme.clone();
                self.swap = SwapState::Idle;
            }
        }
    }

    /// The most recently requested theme name.
    pub fn current_theme_name(&self) -> Option<&str> {
        self.requested_theme.as_deref()
    }

    pub fn jump_to(&self, lon: f64, lat: f64, zoom: f64) {
        self.backend.jump_to(lon, lat, zoom);
    }

    /// Current center in (lon, lat) order.
    pub fn center(&self) -> (f64, f64) {
        self.backend.center()
    }

    pub fn zoom(&self) -> f64 {
        self.backend.zoom()
    }

    /// Replaces the marker glyph. The renderer marker is recreated rather
    /// than mutated because its anchoring depends on the icon shape; the
    /// backend re-wires drag reporting on creation.
    pub fn set_marker_glyph(&mut self, glyph: MarkerGlyph, anchor: MarkerAnchor) {
        self.glyph = glyph;
        self.anchor = anchor;
        self.recreate_marker();
    }

    pub fn set_marker_visible(&mut self, visible: bool) {
        self.marker_visible = visible;
        self.recreate_marker();
    }

    pub fn set_marker_position(&mut self, lon: f64, lat: f64) {
        self.marker_pos = (lon, lat);
        self.backend.set_marker_position(lon, lat);
    }

    /// Records a drag the renderer performed on its own marker. The
    /// renderer already shows the new position, so only the cache moves;
    /// without it the next recreation would snap the marker back.
    pub fn note_dragged(&mut self, lon: f64, lat: f64) {
        self.marker_pos = (lon, lat);
    }

    pub fn marker_visible(&self) -> bool {
        self.marker_visible
    }

    /// Applies a full marker restyle in one recreation.
    pub fn restyle_marker(
        &mut self,
        glyph: MarkerGlyph,
        anchor: MarkerAnchor,
        lon: f64,
        lat: f64,
        visible: bool,
    ) {
        self.glyph = glyph;
        self.anchor = anchor;
        self.marker_pos = (lon, lat);
        self.marker_visible = visible;
        self.recreate_marker();
    }

    fn recreate_marker(&self) {
        self.backend.remove_marker();
        if self.marker_visible {
            let (lon, lat) = self.marker_pos;
            self.backend.create_marker(&self.glyph, lon, lat, self.anchor);
        }
    }

    pub fn resize(&self) {
        self.backend.resize();
    }

    /// Resolves on the renderer's next render-idle signal or the timeout,
    /// whichever comes first. A failed subscription resolves immediately.
    /// Never fails.
    pub async fn wait_until_render_idle(&self, timeout: Duration) {
        let idle = match self.backend.subscribe_render_idle() {
            Ok(rx) => rx,
            Err(err) => {
                debug!(%err, "render-idle subscription failed; treating renderer as idle");
                return;
            }
        };
        tokio::select! {
            _ = idle => {}
            _ = tokio::time::sleep(timeout) => {}
        }
    }
}
