//! DualMap - keeps a raster tile map and a vector "artistic" map in step.
//!
//! Two independently-clocked renderers present the same geographic
//! viewport and marker; the vector renderer's visual theme can be swapped
//! live. The library owns the hard coordination: the bidirectional view
//! synchronizer (latched against feedback loops), the asynchronous
//! style-swap protocol (last requested theme wins, nothing is lost, the
//! caller never blocks), and bounded-wait readiness probes for knowing when
//! visual output is stable.
//!
//! Rendering itself stays with the host: implement [`backend::RasterBackend`]
//! and [`backend::VectorBackend`] over your renderers and forward their
//! events into [`DualMap`]. Simulated backends for tests and demos live in
//! [`backend::sim`].

pub mod adapter;
pub mod backend;
pub mod icon;
pub mod style;
pub mod sync;
pub mod theme;

pub use backend::{BackendError, MarkerGlyph, PrimaryEvent, SecondaryEvent};
pub use icon::IconKind;
pub use style::{generate_style, StyleDocument};
pub use sync::{DualMap, MapConfig, StateSnapshot, StateUpdate, ZOOM_OFFSET};
pub use theme::{ActiveThemes, RasterTheme, RenderMode, Theme};
