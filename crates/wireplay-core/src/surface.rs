//! Collaborator interfaces the core renders through.
//!
//! The core never touches a widget toolkit. Everything it wants drawn,
//! logged, or announced goes through the three traits below; the production
//! terminal frontend and the test harness each bring their own
//! implementations. Implementations are only ever called from the
//! interactive flow (via [`crate::EventRouter`]), so they need no internal
//! synchronization.

use crate::interpolate::Point;

/// RGB color carried by steps, tokens, markers, and log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    /// Red component.
    pub r: u8,
    /// Green component.
    pub g: u8,
    /// Blue component.
    pub b: u8,
}

impl Color {
    /// Packet/token yellow.
    pub const YELLOW: Self = Self::rgb(0xff, 0xff, 0x00);
    /// Bright lime.
    pub const LIME: Self = Self::rgb(0x00, 0xff, 0x00);
    /// Muted lime-green used for server markers.
    pub const LIME_GREEN: Self = Self::rgb(0x32, 0xcd, 0x32);
    /// Cyan.
    pub const CYAN: Self = Self::rgb(0x00, 0xff, 0xff);
    /// Red.
    pub const RED: Self = Self::rgb(0xff, 0x00, 0x00);
    /// Orange.
    pub const ORANGE: Self = Self::rgb(0xff, 0xa5, 0x00);
    /// White.
    pub const WHITE: Self = Self::rgb(0xff, 0xff, 0xff);
    /// Sky blue marker fill.
    pub const SKY: Self = Self::rgb(0x5d, 0xad, 0xe2);
    /// Rose marker fill.
    pub const ROSE: Self = Self::rgb(0xf1, 0x94, 0x8a);
    /// Mint marker fill.
    pub const MINT: Self = Self::rgb(0x58, 0xd6, 0x8d);

    /// Construct a color from its RGB components.
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// Visual style of an endpoint marker.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkerStyle {
    /// Fill color of the marker dot.
    pub color: Color,
    /// Marker radius in surface units.
    pub radius: f64,
}

impl MarkerStyle {
    /// Construct a marker style.
    #[must_use]
    pub const fn new(color: Color, radius: f64) -> Self {
        Self { color, radius }
    }
}

/// Opaque handle to a token drawn on the surface.
///
/// Handles are minted by the surface implementation and round-tripped back
/// through [`RenderSurface::remove_token`]; the core attaches no meaning to
/// the inner value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TokenHandle(u64);

impl TokenHandle {
    /// Wrap a raw surface-assigned id.
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw surface-assigned id.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// The drawable area: endpoint markers plus the moving token.
pub trait RenderSurface {
    /// Place (or re-place) the marker for a named endpoint.
    fn place_endpoint_marker(&mut self, name: &str, position: Point, style: MarkerStyle);

    /// Draw a token at `position` and return its handle.
    fn draw_token(&mut self, position: Point, color: Color) -> TokenHandle;

    /// Remove a previously drawn token.
    fn remove_token(&mut self, handle: TokenHandle);

    /// Clear markers and tokens ahead of a fresh run.
    fn clear_all(&mut self);
}

/// Append-only text log shown next to the animation.
pub trait LogSink {
    /// Append one line in the given color.
    fn append_line(&mut self, text: &str, color: Color);
}

/// Single-line status display under the animation.
pub trait StatusReporter {
    /// Replace the status text.
    fn set_status(&mut self, text: &str);
}
