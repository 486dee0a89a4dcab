//! Events the runner emits toward the rendering side.
//!
//! Emission order is delivery order: the dispatch bridge preserves FIFO and
//! the router applies events on the interactive flow in the order they
//! arrive. Frames are ephemeral; nothing here is persisted.

use crate::{
    interpolate::Point,
    surface::{Color, MarkerStyle},
};

/// Marker placement data carried by [`RunEvent::RunStarted`].
#[derive(Debug, Clone, PartialEq)]
pub struct EndpointMarker {
    /// Endpoint name, drawn as the marker caption.
    pub name: String,
    /// Marker position.
    pub position: Point,
    /// Marker appearance.
    pub style: MarkerStyle,
}

/// One interpolated token sample within a step's animation.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenFrame {
    /// Index of the step being animated.
    pub step_index: usize,
    /// Frame index in `0..=frame_count`.
    pub frame_index: u32,
    /// Last frame index of this step.
    pub frame_count: u32,
    /// Interpolated token position.
    pub position: Point,
    /// Token color.
    pub color: Color,
}

impl TokenFrame {
    /// Whether this is the step's final frame. Final-frame tokens stay on
    /// the surface; earlier ones are replaced by their successor.
    #[must_use]
    pub const fn is_final(&self) -> bool {
        self.frame_index == self.frame_count
    }
}

/// Ordered events produced by the sequence runner.
#[derive(Debug, Clone, PartialEq)]
pub enum RunEvent {
    /// A run began: clear the surface and place the endpoint markers.
    RunStarted {
        /// Markers to place, in declaration order.
        markers: Vec<EndpointMarker>,
    },

    /// Pre-step status text.
    Status {
        /// The text to show.
        text: String,
    },

    /// One animation frame of the moving token.
    Frame(TokenFrame),

    /// A step finished animating; log its label as sent.
    StepSent {
        /// Index of the completed step.
        step_index: usize,
        /// The step's label.
        label: String,
        /// The step's color, reused for the log line.
        color: Color,
    },

    /// The whole sequence finished. Carries the terminal message for both
    /// the final log line and the final status text.
    RunCompleted {
        /// The sequence's declared terminal message.
        terminal_message: String,
    },

    /// The run was abandoned mid-flight.
    RunAborted {
        /// Human-readable reason, surfaced on the log and status line.
        reason: String,
    },
}
