//! Marker icon catalog.
//!
//! Maps a symbolic icon name to a renderable SVG glyph and an anchor-point
//! rule. The catalog is deliberately closed: unknown names silently fall
//! back to the pin rather than erroring, because marker rendering is
//! best-effort and the caller's state may carry icon names from older
//! versions of the host application.

/// Base marker size in pixels before the size scale is applied.
pub const DEFAULT_MARKER_SIZE: u32 = 40;

const PIN_SVG: &str = r#"<svg class="marker-pin" fill="currentColor" viewBox="0 0 24 24" xmlns="http://www.w3.org/2000/svg"><path d="M12 2C8.13 2 5 5.13 5 9c0 5.25 7 13 7 13s7-7.75 7-13c0-3.87-3.13-7-7-7zm0 9.5c-1.38 0-2.5-1.12-2.5-2.5s1.12-2.5 2.5-2.5 2.5 1.12 2.5 2.5-1.12 2.5-2.5 2.5z"/></svg>"#;

const CIRCLE_SVG: &str = r#"<svg class="marker-pin" fill="currentColor" viewBox="0 0 24 24" xmlns="http://www.w3.org/2000/svg"><path fill-rule="evenodd" clip-rule="evenodd" d="M12 4C7.58172 4 4 7.58172 4 12C4 16.4183 7.58172 20 12 20C16.4183 20 20 16.4183 20 12C20 7.58172 16.4183 4 12 4ZM12 9C10.3431 9 9 10.3431 9 12C9 13.6569 10.3431 15 12 15C13.6569 15 15 13.6569 15 12C15 10.3431 13.6569 9 12 9Z"/></svg>"#;

const HEART_SVG: &str = r#"<svg class="marker-pin" fill="currentColor" viewBox="0 0 24 24" xmlns="http://www.w3.org/2000/svg"><path d="M12 21.35l-1.45-1.32C5.4 15.36 2 12.28 2 8.5 2 5.42 4.42 3 7.5 3c1.74 0 3.41.81 4.5 2.09C13.09 3.81 14.76 3 16.5 3 19.58 3 22 5.42 22 8.5c0 3.78-3.4 6.86-8.55 11.54L12 21.35z"/></svg>"#;

const STAR_SVG: &str = r#"<svg class="marker-pin" fill="currentColor" viewBox="0 0 24 24" xmlns="http://www.w3.org/2000/svg"><path d="M12 17.27L18.18 21l-1.64-7.03L22 9.24l-7.19-.61L12 2 9.19 8.63 2 9.24l5.46 4.73L5.82 21z"/></svg>"#;

const DOT_SVG: &str = r#"<svg class="marker-pin" fill="currentColor" viewBox="0 0 24 24" xmlns="http://www.w3.org/2000/svg"><circle cx="12" cy="12" r="2"/></svg>"#;

/// The set of marker glyphs the catalog knows how to render.
///
/// `Dot` is the glyph behind the "none" icon name: a minimal dot so the
/// marker position stays discoverable even when the user opts out of a
/// visible shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IconKind {
    Pin,
    Circle,
    Heart,
    Star,
    Dot,
}

impl IconKind {
    /// Parses an icon name, falling back to [`IconKind::Pin`] for anything
    /// the catalog does not recognize. There is no error path.
    pub fn from_name(name: &str) -> Self {
        match name {
            "circle" => IconKind::Circle,
            "heart" => IconKind::Heart,
            "star" => IconKind::Star,
            "none" => IconKind::Dot,
            _ => IconKind::Pin,
        }
    }

    /// The canonical name for this icon.
    pub fn name(&self) -> &'static str {
        match self {
            IconKind::Pin => "pin",
            IconKind::Circle => "circle",
            IconKind::Heart => "heart",
            IconKind::Star => "star",
            IconKind::Dot => "none",
        }
    }

    /// The raw SVG fragment for this icon.
    pub fn markup(&self) -> &'static str {
        match self {
            IconKind::Pin => PIN_SVG,
            IconKind::Circle => CIRCLE_SVG,
            IconKind::Heart => HEART_SVG,
            IconKind::Star => STAR_SVG,
            IconKind::Dot => DOT_SVG,
        }
    }

    /// Anchor offset in pixels for a glyph rendered at `size`.
    ///
    /// The pin points at its location, so it anchors at its bottom-center;
    /// every other glyph is symmetric and anchors at its geometric center.
    pub fn anchor(&self, size: u32) -> (u32, u32) {
        match self {
            IconKind::Pin => (size / 2, size),
            _ => (size / 2, size / 2),
        }
    }
}

/// Returns the icon markup with the stock class attribute replaced by
/// inline sizing and color, for hosts that style markers per theme.
pub fn styled_markup(kind: IconKind, size: u32, color: &str) -> String {
    kind.markup().replacen(
        r#"class="marker-pin""#,
        &format!(r#"style="width: {size}px; height: {size}px; color: {color};""#),
        1,
    )
}
