//! Terminal-side models implementing the core's collaborator traits.
//!
//! These are plain view models: the event router mutates them on the
//! interactive flow, the render pass reads them. No widget state lives here.

use std::collections::BTreeMap;

use wireplay_core::{
    Color, LogSink, MarkerStyle, Point, RenderSurface, StatusReporter, TokenHandle,
};

/// An endpoint marker as placed on the canvas.
#[derive(Debug, Clone)]
pub struct Marker {
    /// Endpoint name, drawn as the caption.
    pub name: String,
    /// Marker position in world coordinates (y grows downward).
    pub position: Point,
    /// Marker appearance.
    pub style: MarkerStyle,
}

/// A token currently visible on the canvas.
#[derive(Debug, Clone, Copy)]
pub struct TokenDot {
    /// Token position in world coordinates.
    pub position: Point,
    /// Token fill color.
    pub color: Color,
}

/// Drawable scene: markers plus live tokens.
#[derive(Debug, Default)]
pub struct CanvasModel {
    markers: Vec<Marker>,
    tokens: BTreeMap<u64, TokenDot>,
    next_handle: u64,
}

impl CanvasModel {
    /// Create an empty scene.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Markers in placement order.
    pub fn markers(&self) -> impl Iterator<Item = &Marker> {
        self.markers.iter()
    }

    /// Live tokens in handle order.
    pub fn tokens(&self) -> impl Iterator<Item = &TokenDot> {
        self.tokens.values()
    }

    /// World-coordinate bounds covering all markers, padded so labels and
    /// tokens stay inside the frame. Falls back to the classic 600x500
    /// canvas when nothing is placed yet.
    #[must_use]
    pub fn bounds(&self) -> (f64, f64, f64, f64) {
        if self.markers.is_empty() {
            return (0.0, 600.0, 0.0, 500.0);
        }

        let mut min_x = f64::MAX;
        let mut max_x = f64::MIN;
        let mut min_y = f64::MAX;
        let mut max_y = f64::MIN;
        for marker in &self.markers {
            min_x = min_x.min(marker.position.x);
            max_x = max_x.max(marker.position.x);
            min_y = min_y.min(marker.position.y);
            max_y = max_y.max(marker.position.y);
        }

        const MARGIN: f64 = 80.0;
        (min_x - MARGIN, max_x + MARGIN, min_y - MARGIN, max_y + MARGIN)
    }
}

impl RenderSurface for CanvasModel {
    fn place_endpoint_marker(&mut self, name: &str, position: Point, style: MarkerStyle) {
        self.markers.push(Marker { name: name.to_string(), position, style });
    }

    fn draw_token(&mut self, position: Point, color: Color) -> TokenHandle {
        self.next_handle += 1;
        self.tokens.insert(self.next_handle, TokenDot { position, color });
        TokenHandle::new(self.next_handle)
    }

    fn remove_token(&mut self, handle: TokenHandle) {
        self.tokens.remove(&handle.raw());
    }

    fn clear_all(&mut self) {
        self.markers.clear();
        self.tokens.clear();
    }
}

/// Append-only colored log lines.
#[derive(Debug, Default)]
pub struct LogModel {
    lines: Vec<(String, Color)>,
}

impl LogModel {
    /// Create a log seeded with the traditional first line.
    #[must_use]
    pub fn new() -> Self {
        let mut model = Self::default();
        model.append_line("Log initialized...", Color::rgb(0x8e, 0xca, 0xe6));
        model
    }

    /// All lines, oldest first.
    #[must_use]
    pub fn lines(&self) -> &[(String, Color)] {
        &self.lines
    }
}

impl LogSink for LogModel {
    fn append_line(&mut self, text: &str, color: Color) {
        self.lines.push((text.to_string(), color));
    }
}

/// The single status line.
#[derive(Debug)]
pub struct StatusModel {
    text: String,
}

impl StatusModel {
    /// Create a status line with the waiting message.
    #[must_use]
    pub fn new() -> Self {
        Self { text: "Waiting to start...".to_string() }
    }

    /// Current status text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }
}

impl Default for StatusModel {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusReporter for StatusModel {
    fn set_status(&mut self, text: &str) {
        self.text = text.to_string();
    }
}
