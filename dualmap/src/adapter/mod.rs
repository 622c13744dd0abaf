//! Per-renderer adapters.
//!
//! Each adapter owns its backend handle and renderer-local state (marker
//! glyph and visibility, and for the vector side the style-swap state
//! machine). The adapters never talk to each other; cross-renderer
//! propagation is the synchronizer's job.

mod primary;
mod secondary;

pub use primary::PrimaryAdapter;
pub use secondary::SecondaryAdapter;
