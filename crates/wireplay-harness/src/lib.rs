//! Deterministic test harness for the wireplay replay engine.
//!
//! Everything timing-related in the core goes through the `Environment`
//! trait, so the harness swaps in a virtual clock: sleeps complete
//! instantly, their requested durations are recorded, and a whole replay
//! runs in microseconds of wall time while remaining bit-for-bit
//! reproducible.
//!
//! The recording sinks capture every surface/log/status call on a single
//! ordered tape, so tests can assert cross-sink ordering, not just
//! per-sink content.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use std::{
    sync::{Arc, Mutex, PoisonError},
    time::{Duration, Instant},
};

use wireplay_core::{
    Color, DispatchError, Environment, EventRouter, LogSink, MarkerStyle, Point, RenderSurface,
    RunController, RunEvent, RunState, RunnerConfig, Script, StartError, StatusReporter,
    TokenHandle, channel,
};

/// Virtual-clock environment: `sleep` completes instantly and records the
/// requested duration; `now` advances by exactly the slept amount.
#[derive(Debug, Clone)]
pub struct TestEnv {
    inner: Arc<Mutex<TestClock>>,
}

#[derive(Debug)]
struct TestClock {
    base: Instant,
    elapsed: Duration,
    waits: Vec<Duration>,
}

impl TestEnv {
    /// Create a fresh virtual clock.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(TestClock {
                base: Instant::now(),
                elapsed: Duration::ZERO,
                waits: Vec::new(),
            })),
        }
    }

    /// Every sleep the driver requested, in request order.
    #[must_use]
    pub fn recorded_waits(&self) -> Vec<Duration> {
        self.lock().waits.clone()
    }

    /// Total virtual time slept so far.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.lock().elapsed
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, TestClock> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}

impl Environment for TestEnv {
    fn now(&self) -> Instant {
        let clock = self.lock();
        clock.base + clock.elapsed
    }

    fn sleep(&self, duration: Duration) -> impl std::future::Future<Output = ()> + Send {
        let mut clock = self.lock();
        clock.waits.push(duration);
        clock.elapsed += duration;
        std::future::ready(())
    }
}

/// One observed call on any of the three collaborator traits.
#[derive(Debug, Clone, PartialEq)]
pub enum SinkCall {
    /// `place_endpoint_marker` on the surface.
    Marker {
        /// Endpoint name.
        name: String,
        /// Marker position.
        position: Point,
    },
    /// `draw_token` on the surface.
    DrawToken {
        /// Token position.
        position: Point,
        /// Token color.
        color: Color,
    },
    /// `remove_token` on the surface.
    RemoveToken(
        /// The removed handle's raw id.
        u64,
    ),
    /// `clear_all` on the surface.
    Clear,
    /// `append_line` on the log sink.
    Line {
        /// Line text.
        text: String,
        /// Line color.
        color: Color,
    },
    /// `set_status` on the status reporter.
    Status {
        /// Status text.
        text: String,
    },
}

#[derive(Debug, Clone, Default)]
struct Tape(Arc<Mutex<Vec<SinkCall>>>);

impl Tape {
    fn push(&self, call: SinkCall) {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).push(call);
    }

    fn calls(&self) -> Vec<SinkCall> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

/// Recording `RenderSurface`.
#[derive(Debug)]
pub struct RecordingSurface {
    tape: Tape,
    next_handle: u64,
}

impl RenderSurface for RecordingSurface {
    fn place_endpoint_marker(&mut self, name: &str, position: Point, _style: MarkerStyle) {
        self.tape.push(SinkCall::Marker { name: name.to_string(), position });
    }

    fn draw_token(&mut self, position: Point, color: Color) -> TokenHandle {
        self.next_handle += 1;
        self.tape.push(SinkCall::DrawToken { position, color });
        TokenHandle::new(self.next_handle)
    }

    fn remove_token(&mut self, handle: TokenHandle) {
        self.tape.push(SinkCall::RemoveToken(handle.raw()));
    }

    fn clear_all(&mut self) {
        self.tape.push(SinkCall::Clear);
    }
}

/// Recording `LogSink`.
#[derive(Debug)]
pub struct RecordingLog {
    tape: Tape,
}

impl LogSink for RecordingLog {
    fn append_line(&mut self, text: &str, color: Color) {
        self.tape.push(SinkCall::Line { text: text.to_string(), color });
    }
}

/// Recording `StatusReporter`.
#[derive(Debug)]
pub struct RecordingStatus {
    tape: Tape,
}

impl StatusReporter for RecordingStatus {
    fn set_status(&mut self, text: &str) {
        self.tape.push(SinkCall::Status { text: text.to_string() });
    }
}

/// The three recording sinks sharing one ordered tape.
#[derive(Debug)]
pub struct Recorder {
    /// Recording surface.
    pub surface: RecordingSurface,
    /// Recording log sink.
    pub log: RecordingLog,
    /// Recording status reporter.
    pub status: RecordingStatus,
    tape: Tape,
}

impl Recorder {
    /// Create a recorder with an empty tape.
    #[must_use]
    pub fn new() -> Self {
        let tape = Tape::default();
        Self {
            surface: RecordingSurface { tape: tape.clone(), next_handle: 0 },
            log: RecordingLog { tape: tape.clone() },
            status: RecordingStatus { tape: tape.clone() },
            tape,
        }
    }

    /// Every observed call, in observation order.
    #[must_use]
    pub fn calls(&self) -> Vec<SinkCall> {
        self.tape.calls()
    }

    /// Log-line texts, in order.
    #[must_use]
    pub fn log_lines(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                SinkCall::Line { text, .. } => Some(text),
                _ => None,
            })
            .collect()
    }

    /// The last status text set, if any.
    #[must_use]
    pub fn final_status(&self) -> Option<String> {
        self.calls()
            .into_iter()
            .rev()
            .find_map(|call| match call {
                SinkCall::Status { text } => Some(text),
                _ => None,
            })
    }
}

impl Default for Recorder {
    fn default() -> Self {
        Self::new()
    }
}

/// Everything observable from one run.
#[derive(Debug)]
pub struct RunTrace {
    /// Raw events in delivery order.
    pub events: Vec<RunEvent>,
    /// Sink calls after routing, in application order.
    pub calls: Vec<SinkCall>,
    /// Pacing waits the driver requested, in order.
    pub waits: Vec<Duration>,
    /// Run state after the execution flow finished.
    pub final_state: RunState,
    /// Outcome of the execution flow itself.
    pub outcome: Result<(), DispatchError>,
}

/// Run `script` to completion on a virtual clock and capture everything.
///
/// # Errors
///
/// Returns the [`StartError`] when the run is rejected before it begins.
pub async fn run_script(script: Script, config: RunnerConfig) -> Result<RunTrace, StartError> {
    let (sender, mut receiver) = channel();
    let env = TestEnv::new();
    let controller = RunController::new(script, config, env.clone(), sender);

    let run = controller.start_run()?;
    let outcome = run.await;

    let events = receiver.drain();
    let mut recorder = Recorder::new();
    let mut router = EventRouter::new();
    for event in &events {
        router.apply(event, &mut recorder.surface, &mut recorder.log, &mut recorder.status);
    }

    Ok(RunTrace {
        events,
        calls: recorder.calls(),
        waits: env.recorded_waits(),
        final_state: controller.state(),
        outcome,
    })
}
