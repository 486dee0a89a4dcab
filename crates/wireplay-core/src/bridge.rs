//! Dispatch bridge: the only path from the execution flow to the
//! interactive flow.
//!
//! A FIFO channel whose sender lives in the execution flow and whose
//! receiver is drained by the interactive flow on its own loop iterations,
//! so surface mutation happens only where it is allowed. Delivery preserves
//! emission order; frame `i + 1` of a step is never handed over before
//! frame `i`.
//!
//! The channel is unbounded on purpose: the runner's own pacing waits bound
//! how far emission can run ahead of delivery, so no independent queue-depth
//! limit is needed.

use tokio::sync::mpsc;

use crate::{
    error::DispatchError,
    event::RunEvent,
    surface::{Color, LogSink, RenderSurface, StatusReporter, TokenHandle},
};

/// Create a connected bridge pair.
#[must_use]
pub fn channel() -> (EventSender, EventReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (EventSender { tx }, EventReceiver { rx })
}

/// Execution-flow half of the bridge.
#[derive(Debug, Clone)]
pub struct EventSender {
    tx: mpsc::UnboundedSender<RunEvent>,
}

impl EventSender {
    /// Hand an event to the interactive flow, preserving emission order.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::Closed`] if the interactive side dropped its
    /// receiver. The caller abandons the run; there is no retry.
    pub fn dispatch(&self, event: RunEvent) -> Result<(), DispatchError> {
        self.tx.send(event).map_err(|_| DispatchError::Closed)
    }
}

/// Interactive-flow half of the bridge.
#[derive(Debug)]
pub struct EventReceiver {
    rx: mpsc::UnboundedReceiver<RunEvent>,
}

impl EventReceiver {
    /// Drain every event dispatched so far, in emission order. Non-blocking;
    /// called once per interactive loop iteration.
    pub fn drain(&mut self) -> Vec<RunEvent> {
        let mut out = Vec::new();
        while let Ok(event) = self.rx.try_recv() {
            out.push(event);
        }
        out
    }

    /// Await the next event. Used by drivers that block on delivery instead
    /// of polling (the test harness, mostly).
    pub async fn recv(&mut self) -> Option<RunEvent> {
        self.rx.recv().await
    }
}

/// Folds bridge-delivered events onto the surface collaborators.
///
/// Owns the token bookkeeping: each frame's token replaces the previous
/// one, and a step's final token stays on the surface until the next run
/// clears it, matching the original canvas behavior.
#[derive(Debug, Default)]
pub struct EventRouter {
    /// Token from the previous frame, pending removal on the next one.
    live_token: Option<TokenHandle>,
}

impl EventRouter {
    /// Create a router with no live token.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one event to the collaborators. Must be called from the
    /// interactive flow only.
    pub fn apply(
        &mut self,
        event: &RunEvent,
        surface: &mut dyn RenderSurface,
        log: &mut dyn LogSink,
        status: &mut dyn StatusReporter,
    ) {
        match event {
            RunEvent::RunStarted { markers } => {
                self.live_token = None;
                surface.clear_all();
                for marker in markers {
                    surface.place_endpoint_marker(&marker.name, marker.position, marker.style);
                }
            },

            RunEvent::Status { text } => status.set_status(text),

            RunEvent::Frame(frame) => {
                if let Some(previous) = self.live_token.take() {
                    surface.remove_token(previous);
                }
                let handle = surface.draw_token(frame.position, frame.color);
                if !frame.is_final() {
                    self.live_token = Some(handle);
                }
            },

            RunEvent::StepSent { label, color, .. } => {
                log.append_line(&format!("{label} sent"), *color);
            },

            RunEvent::RunCompleted { terminal_message } => {
                log.append_line(terminal_message, Color::WHITE);
                status.set_status(terminal_message);
            },

            RunEvent::RunAborted { reason } => {
                log.append_line(reason, Color::RED);
                status.set_status(reason);
            },
        }
    }
}
