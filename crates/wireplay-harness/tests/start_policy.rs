//! Start-policy and validation-gate tests.
//!
//! The documented overlap policy: a start request while a run is `Running`
//! is ignored (rejected with `AlreadyRunning`) and leaves the in-flight run
//! untouched. A script that fails validation never leaves `Idle`.

use std::time::Duration;

use wireplay_core::{
    Color, Endpoint, EndpointRegistry, MarkerStyle, Point, RunController, RunPhase,
    RunnerConfig, Script, Sequence, StartError, Step, channel, three_way_handshake,
};
use wireplay_harness::TestEnv;

fn fast_config() -> RunnerConfig {
    RunnerConfig { frames_per_step: 3, frame_interval: Duration::from_millis(10) }
}

#[tokio::test]
async fn start_while_running_is_ignored_every_time() {
    let (sender, mut receiver) = channel();
    let controller = RunController::new(
        three_way_handshake(),
        fast_config(),
        TestEnv::new(),
        sender,
    );

    // Claimed but not yet driven: the phase is already Running.
    let run = controller.start_run().expect("first start rejected");
    assert_eq!(controller.state().phase, RunPhase::Running);

    for attempt in 0..100 {
        match controller.start_run() {
            Err(StartError::AlreadyRunning) => {},
            other => panic!("attempt {attempt}: expected AlreadyRunning, got {:?}", other.err()),
        }
    }

    // The in-flight run is unaffected and completes normally.
    run.await.expect("run failed");
    assert_eq!(controller.state().phase, RunPhase::Complete);
    assert!(!receiver.drain().is_empty());

    // Complete -> Running is allowed again.
    let again = controller.start_run().expect("restart rejected");
    again.await.expect("second run failed");
    assert_eq!(controller.state().phase, RunPhase::Complete);
}

#[tokio::test]
async fn phase_never_skips_running() {
    let (sender, _receiver) = channel();
    let controller = RunController::new(
        three_way_handshake(),
        fast_config(),
        TestEnv::new(),
        sender,
    );

    assert_eq!(controller.state().phase, RunPhase::Idle);
    let run = controller.start_run().expect("start rejected");
    assert_eq!(controller.state().phase, RunPhase::Running);
    run.await.expect("run failed");
    assert_eq!(controller.state().phase, RunPhase::Complete);
}

#[test]
fn validation_failure_keeps_phase_idle_and_emits_nothing() {
    let mut registry = EndpointRegistry::new();
    registry
        .register(Endpoint::new(
            "Client",
            Point::new(100.0, 70.0),
            MarkerStyle::new(Color::CYAN, 15.0),
        ))
        .expect("register failed");

    // "Server" and "Mallory" are never registered.
    let sequence = Sequence::new(
        vec![
            Step::new("Client", "Server", Color::YELLOW, "SYN"),
            Step::new("Mallory", "Client", Color::RED, "SPOOF"),
        ],
        "unreachable",
    );
    let script = Script::new(registry, sequence);

    let (sender, mut receiver) = channel();
    let controller =
        RunController::new(script, fast_config(), TestEnv::new(), sender);

    match controller.start_run() {
        Err(StartError::Validation(err)) => {
            let endpoints: Vec<&str> =
                err.violations.iter().map(|v| v.endpoint.as_str()).collect();
            assert_eq!(endpoints, vec!["Server", "Mallory"]);
        },
        other => panic!("expected validation failure, got {:?}", other.err()),
    }

    assert_eq!(controller.state().phase, RunPhase::Idle);
    assert!(receiver.drain().is_empty());

    // Repeated attempts keep failing the same way; Running is never entered.
    for _ in 0..10 {
        assert!(matches!(controller.start_run(), Err(StartError::Validation(_))));
        assert_eq!(controller.state().phase, RunPhase::Idle);
    }
}

#[tokio::test]
async fn dropping_the_receiver_mid_setup_abandons_the_run() {
    let (sender, receiver) = channel();
    let controller = RunController::new(
        three_way_handshake(),
        fast_config(),
        TestEnv::new(),
        sender,
    );

    let run = controller.start_run().expect("start rejected");
    drop(receiver);

    let outcome = run.await;
    assert!(outcome.is_err(), "dispatch into a closed bridge must fail");
    // Abandonment still lands the phase in Complete, so a new run can start.
    assert_eq!(controller.state().phase, RunPhase::Complete);
}
