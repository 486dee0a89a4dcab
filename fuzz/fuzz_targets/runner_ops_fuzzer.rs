//! Fuzz target for the [`SequenceRunner`] state machine
//!
//! Prevent phase-lattice violations under arbitrary control interleavings
//!
//! # Strategy
//!
//! - Control sequences: arbitrary interleavings of begin, advance, and
//!   abort against one shared state cell
//! - Script shapes: generated endpoint counts, step lists (including steps
//!   that reference endpoints that don't exist), frame counts
//!
//! # Invariants
//!
//! - Phase only moves `Idle → Running → Complete`; `Running` is never
//!   re-entered without an explicit successful begin
//! - `begin` during `Running` MUST reject with `AlreadyRunning`
//! - A script with unresolved references MUST reject with `Validation` and
//!   leave the phase untouched
//! - Frame indices within a step are strictly increasing from 0
//! - Step indices in `StepSent` events are strictly increasing from 0
//! - `advance` after completion returns `None` forever
//! - NEVER panic

#![no_main]

use std::{sync::Arc, time::Duration};

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use wireplay_core::{
    Color, Endpoint, EndpointRegistry, MarkerStyle, Point, RunEvent, RunPhase, RunStateCell,
    RunnerConfig, RunnerOp, Script, Sequence, SequenceRunner, StartError, Step,
};

#[derive(Debug, Clone, Arbitrary)]
enum ControlOp {
    Begin,
    Advance { times: u8 },
    Abort,
    AdvanceToEnd,
}

#[derive(Debug, Clone, Arbitrary)]
struct FuzzedStep {
    from: u8,
    to: u8,
    delay_ms: u8,
}

#[derive(Debug, Clone, Arbitrary)]
struct FuzzInput {
    endpoint_count: u8,
    steps: Vec<FuzzedStep>,
    frames_per_step: u8,
    ops: Vec<ControlOp>,
}

fn build_script(input: &FuzzInput) -> Script {
    let endpoint_count = usize::from(input.endpoint_count % 6);
    let mut registry = EndpointRegistry::new();
    for i in 0..endpoint_count {
        let endpoint = Endpoint::new(
            format!("ep{i}"),
            Point::new(i as f64 * 50.0, 70.0),
            MarkerStyle::new(Color::CYAN, 10.0),
        );
        let _ = registry.register(endpoint);
    }

    let steps: Vec<Step> = input
        .steps
        .iter()
        .take(8)
        .enumerate()
        .map(|(i, s)| {
            // May reference endpoints past the registered range; begin must
            // then reject with a validation error instead of panicking.
            Step::new(
                format!("ep{}", s.from % 8),
                format!("ep{}", s.to % 8),
                Color::YELLOW,
                format!("MSG-{i}"),
            )
            .with_post_delay(Duration::from_millis(u64::from(s.delay_ms)))
        })
        .collect();

    Script::new(registry, Sequence::new(steps, "fuzz replay complete"))
}

/// Tracks emission-order invariants across one run.
#[derive(Default)]
struct EventChecker {
    last_frame: Option<(usize, u32)>,
    last_step_sent: Option<usize>,
}

impl EventChecker {
    fn reset(&mut self) {
        self.last_frame = None;
        self.last_step_sent = None;
    }

    fn check(&mut self, event: &RunEvent) {
        match event {
            RunEvent::Frame(frame) => {
                match self.last_frame {
                    Some((step, index)) if frame.step_index == step => {
                        assert_eq!(frame.frame_index, index + 1, "frame skipped within step");
                    }
                    _ => assert_eq!(frame.frame_index, 0, "step must start at frame 0"),
                }
                self.last_frame = Some((frame.step_index, frame.frame_index));
            }
            RunEvent::StepSent { step_index, .. } => {
                let expected = self.last_step_sent.map_or(0, |s| s + 1);
                assert_eq!(*step_index, expected, "steps must be visited in order");
                self.last_step_sent = Some(*step_index);
            }
            _ => {}
        }
    }
}

fuzz_target!(|input: FuzzInput| {
    let script = build_script(&input);
    let config = RunnerConfig {
        frames_per_step: u32::from(input.frames_per_step % 16),
        frame_interval: Duration::from_millis(1),
    };

    let state = Arc::new(RunStateCell::new());
    let mut runner: Option<SequenceRunner> = None;
    let mut checker = EventChecker::default();

    for op in input.ops.iter().take(64) {
        match op {
            ControlOp::Begin => {
                let before = state.snapshot().phase;
                match SequenceRunner::begin(&script, config, Arc::clone(&state)) {
                    Ok(new_runner) => {
                        assert_ne!(before, RunPhase::Running, "begin succeeded while Running");
                        assert_eq!(state.snapshot().phase, RunPhase::Running);
                        runner = Some(new_runner);
                        checker.reset();
                    }
                    Err(StartError::AlreadyRunning) => {
                        assert_eq!(before, RunPhase::Running, "spurious AlreadyRunning");
                    }
                    Err(StartError::Validation(_)) => {
                        // Validation failures must not move the phase.
                        assert_eq!(state.snapshot().phase, before);
                    }
                }
            }
            ControlOp::Advance { times } => {
                if let Some(r) = runner.as_mut() {
                    for _ in 0..(*times % 32) {
                        match r.advance() {
                            Some(ops) => {
                                for op in ops {
                                    if let RunnerOp::Emit(event) = op {
                                        checker.check(&event);
                                    }
                                }
                            }
                            None => {
                                assert_eq!(state.snapshot().phase, RunPhase::Complete);
                                break;
                            }
                        }
                    }
                }
            }
            ControlOp::AdvanceToEnd => {
                if let Some(r) = runner.as_mut() {
                    while let Some(ops) = r.advance() {
                        for op in ops {
                            if let RunnerOp::Emit(event) = op {
                                checker.check(&event);
                            }
                        }
                    }
                    assert_eq!(state.snapshot().phase, RunPhase::Complete);
                    assert!(r.advance().is_none(), "advance after completion must stay None");
                }
            }
            ControlOp::Abort => {
                if let Some(r) = runner.as_mut() {
                    let op = r.abort("fuzzed abort");
                    assert!(matches!(op, RunnerOp::Emit(RunEvent::RunAborted { .. })));
                    assert_eq!(state.snapshot().phase, RunPhase::Complete);
                    assert!(r.advance().is_none());
                }
            }
        }
    }
});
