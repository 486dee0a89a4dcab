//! The sequence runner: the state machine that walks a script.
//!
//! # Architecture
//!
//! - **Sans-IO**: [`SequenceRunner::advance`] returns operations instead of
//!   performing I/O or sleeping.
//! - **Deterministic**: the same script and config produce the same
//!   operation stream on every run.
//! - **Single writer**: the run phase lives in a [`RunStateCell`]; the only
//!   writers are the guarded `Idle|Complete → Running` claim and the
//!   execution flow's own transitions.
//!
//! # Per-step protocol
//!
//! For each step, in sequence order, no skipping, no reordering:
//!
//! 1. emit the step's status text, when declared;
//! 2. for frame `i = 0..=N`: emit the interpolated frame, then wait one
//!    frame interval — the pacing is a scheduling contract, not cosmetic;
//! 3. emit the "`label` sent" log event;
//! 4. wait the step's post-delay;
//! 5. after the last step, transition to `Complete` and emit the terminal
//!    message.
//!
//! # Overlap policy
//!
//! A start request while a run is `Running` is **rejected** and has no other
//! effect ("ignore while Running"). This keeps a single execution flow
//! driving the surface at all times.

use std::{
    sync::{Arc, Mutex, PoisonError},
    time::Duration,
};

use crate::{
    bridge::EventSender,
    env::Environment,
    error::{DispatchError, InvalidReferenceError, ReferenceViolation, StartError},
    event::{EndpointMarker, RunEvent, TokenFrame},
    interpolate::FramePath,
    script::Script,
    surface::Color,
};

/// Lifecycle phase of the single active run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    /// No run has started (or the last start attempt failed validation).
    Idle,
    /// A run's execution flow is in flight.
    Running,
    /// The last run finished (normally or by abandonment).
    Complete,
}

/// Snapshot of the runner's externally visible state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunState {
    /// Current phase.
    pub phase: RunPhase,
    /// Index of the step being animated, when `Running`.
    pub current_step: Option<usize>,
}

impl RunState {
    const fn idle() -> Self {
        Self { phase: RunPhase::Idle, current_step: None }
    }
}

/// Single-writer cell holding the run state.
///
/// Readers take snapshots; the overlap policy is enforced here by
/// [`RunStateCell::try_begin`], which claims `Running` atomically.
#[derive(Debug)]
pub struct RunStateCell {
    inner: Mutex<RunState>,
}

impl Default for RunStateCell {
    fn default() -> Self {
        Self::new()
    }
}

impl RunStateCell {
    /// Create a cell in the `Idle` phase.
    #[must_use]
    pub fn new() -> Self {
        Self { inner: Mutex::new(RunState::idle()) }
    }

    /// Read the current state.
    #[must_use]
    pub fn snapshot(&self) -> RunState {
        *self.lock()
    }

    /// Claim the `Running` phase.
    ///
    /// # Errors
    ///
    /// Returns [`StartError::AlreadyRunning`] while a run is in flight; the
    /// in-flight run is unaffected.
    pub fn try_begin(&self) -> Result<(), StartError> {
        let mut state = self.lock();
        match state.phase {
            RunPhase::Running => Err(StartError::AlreadyRunning),
            RunPhase::Idle | RunPhase::Complete => {
                *state = RunState { phase: RunPhase::Running, current_step: None };
                Ok(())
            },
        }
    }

    fn enter_step(&self, index: usize) {
        self.lock().current_step = Some(index);
    }

    fn complete(&self) {
        let mut state = self.lock();
        state.phase = RunPhase::Complete;
        state.current_step = None;
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, RunState> {
        // A poisoned lock only means a panicking test thread; the state
        // itself is a plain copy type and stays coherent.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Per-run tunables. The only configuration the core accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunnerConfig {
    /// Motion samples per step (`N`): frames run `0..=N`.
    pub frames_per_step: u32,
    /// Pacing wait between consecutive frames of one step.
    pub frame_interval: Duration,
}

impl RunnerConfig {
    /// Default motion samples per step.
    pub const DEFAULT_FRAMES_PER_STEP: u32 = 30;
    /// Default per-frame pacing interval.
    pub const DEFAULT_FRAME_INTERVAL: Duration = Duration::from_millis(50);
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            frames_per_step: Self::DEFAULT_FRAMES_PER_STEP,
            frame_interval: Self::DEFAULT_FRAME_INTERVAL,
        }
    }
}

/// Operations handed to the driver, in execution order.
#[derive(Debug, Clone, PartialEq)]
pub enum RunnerOp {
    /// Dispatch this event across the bridge.
    Emit(RunEvent),
    /// Suspend the execution flow for this long.
    Wait(Duration),
}

/// A step with its endpoint references resolved to positions.
#[derive(Debug, Clone)]
struct ResolvedStep {
    path: FramePath,
    color: Color,
    label: String,
    status: Option<String>,
    post_delay: Duration,
}

/// Cursor into the per-step protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    /// Announce the run: clear the surface, place the markers.
    Start,
    /// Emit the step's status text, if any.
    Announce { step: usize },
    /// Emit frame `frame` of step `step`, then pace.
    Animate { step: usize, frame: u32 },
    /// Log the step's label as sent.
    Record { step: usize },
    /// Wait the step's narrative delay.
    Settle { step: usize },
    /// Emit the terminal message and transition to `Complete`.
    Finish,
    /// Nothing left to do.
    Done,
}

/// The core state machine. Owns the cursor; shares the [`RunStateCell`]
/// with whoever needs read access to the phase.
#[derive(Debug)]
pub struct SequenceRunner {
    markers: Vec<EndpointMarker>,
    steps: Vec<ResolvedStep>,
    terminal_message: String,
    config: RunnerConfig,
    state: Arc<RunStateCell>,
    stage: Stage,
}

impl SequenceRunner {
    /// Validate the script, resolve its steps, and claim the `Running`
    /// phase.
    ///
    /// # Errors
    ///
    /// - [`StartError::Validation`] when any step references an unknown
    ///   endpoint; the phase is left untouched (`Idle` stays `Idle`).
    /// - [`StartError::AlreadyRunning`] while a run is in flight.
    pub fn begin(
        script: &Script,
        config: RunnerConfig,
        state: Arc<RunStateCell>,
    ) -> Result<Self, StartError> {
        let steps = resolve_steps(script, config.frames_per_step)?;
        state.try_begin()?;

        tracing::debug!(steps = steps.len(), "run claimed");

        Ok(Self {
            markers: script.markers(),
            steps,
            terminal_message: script.sequence.terminal_message().to_string(),
            config,
            state,
            stage: Stage::Start,
        })
    }

    /// Read the externally visible state.
    #[must_use]
    pub fn state(&self) -> RunState {
        self.state.snapshot()
    }

    /// One micro-transition of the per-step protocol.
    ///
    /// Returns the operations for the driver to execute in order, or `None`
    /// once the run is complete. A batch may be empty (a step with no status
    /// text announces nothing).
    pub fn advance(&mut self) -> Option<Vec<RunnerOp>> {
        match self.stage {
            Stage::Done => None,

            Stage::Start => {
                self.stage = if self.steps.is_empty() {
                    Stage::Finish
                } else {
                    Stage::Announce { step: 0 }
                };
                Some(vec![RunnerOp::Emit(RunEvent::RunStarted {
                    markers: self.markers.clone(),
                })])
            },

            Stage::Announce { step } => {
                self.state.enter_step(step);
                self.stage = Stage::Animate { step, frame: 0 };
                let ops = self.steps[step]
                    .status
                    .clone()
                    .map(|text| RunnerOp::Emit(RunEvent::Status { text }))
                    .into_iter()
                    .collect();
                Some(ops)
            },

            Stage::Animate { step, frame } => {
                let resolved = &self.steps[step];
                let frame_count = resolved.path.frame_count();
                debug_assert!(frame <= frame_count);

                self.stage = if frame < frame_count {
                    Stage::Animate { step, frame: frame + 1 }
                } else {
                    Stage::Record { step }
                };

                Some(vec![
                    RunnerOp::Emit(RunEvent::Frame(TokenFrame {
                        step_index: step,
                        frame_index: frame,
                        frame_count,
                        position: resolved.path.at(frame),
                        color: resolved.color,
                    })),
                    RunnerOp::Wait(self.config.frame_interval),
                ])
            },

            Stage::Record { step } => {
                self.stage = Stage::Settle { step };
                let resolved = &self.steps[step];
                Some(vec![RunnerOp::Emit(RunEvent::StepSent {
                    step_index: step,
                    label: resolved.label.clone(),
                    color: resolved.color,
                })])
            },

            Stage::Settle { step } => {
                self.stage = if step + 1 < self.steps.len() {
                    Stage::Announce { step: step + 1 }
                } else {
                    Stage::Finish
                };
                Some(vec![RunnerOp::Wait(self.steps[step].post_delay)])
            },

            Stage::Finish => {
                self.stage = Stage::Done;
                self.state.complete();
                tracing::debug!("run complete");
                Some(vec![RunnerOp::Emit(RunEvent::RunCompleted {
                    terminal_message: self.terminal_message.clone(),
                })])
            },
        }
    }

    /// Abandon the run: the phase is forced to `Complete` and the returned
    /// error event should be emitted best-effort. No retry, no rollback —
    /// frames already rendered stay as last drawn.
    pub fn abort(&mut self, reason: impl Into<String>) -> RunnerOp {
        let reason = reason.into();
        tracing::warn!(%reason, "run abandoned");
        self.stage = Stage::Done;
        self.state.complete();
        RunnerOp::Emit(RunEvent::RunAborted { reason })
    }
}

/// Resolve every step's endpoint references, collecting **all** violations
/// rather than stopping at the first.
fn resolve_steps(
    script: &Script,
    frames_per_step: u32,
) -> Result<Vec<ResolvedStep>, InvalidReferenceError> {
    let mut violations = Vec::new();
    let mut steps = Vec::with_capacity(script.sequence.len());

    for (step_index, step) in script.sequence.steps().enumerate() {
        let mut position = |name: &str| match script.registry.resolve(name) {
            Ok(endpoint) => Some(endpoint.position),
            Err(_) => {
                violations.push(ReferenceViolation { step_index, endpoint: name.to_string() });
                None
            },
        };

        let from = position(&step.from);
        let to = position(&step.to);

        if let (Some(from), Some(to)) = (from, to) {
            steps.push(ResolvedStep {
                path: FramePath::new(from, to, frames_per_step),
                color: step.color,
                label: step.label.clone(),
                status: step.status.clone(),
                post_delay: step.post_delay,
            });
        }
    }

    if violations.is_empty() {
        Ok(steps)
    } else {
        Err(InvalidReferenceError { violations })
    }
}

/// Drive a runner to completion on the execution flow.
///
/// Performs every pacing wait through `env` and hands every event to the
/// bridge. On a dispatch failure the run is abandoned: phase forced to
/// `Complete`, abort event emitted best-effort, error returned. Never
/// retries.
pub async fn drive<E: Environment>(
    mut runner: SequenceRunner,
    env: E,
    events: EventSender,
) -> Result<(), DispatchError> {
    while let Some(ops) = runner.advance() {
        for op in ops {
            match op {
                RunnerOp::Emit(event) => {
                    if let Err(err) = events.dispatch(event) {
                        let abort = runner.abort("replay aborted: event delivery failed");
                        if let RunnerOp::Emit(event) = abort {
                            let _ = events.dispatch(event);
                        }
                        return Err(err);
                    }
                },
                RunnerOp::Wait(duration) => env.sleep(duration).await,
            }
        }
    }
    Ok(())
}
