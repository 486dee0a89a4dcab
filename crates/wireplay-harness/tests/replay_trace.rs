//! End-to-end trace tests for a full scripted replay.
//!
//! The scenario: three endpoints A, B, C and a four-step exchange
//! A→B SYN, B→A SYN-ACK, B→C ACK, C→B FIN. After the run completes, the
//! log holds exactly four "sent" lines in step order plus one terminal
//! line, and the status reporter ends on the declared terminal message.

use std::time::Duration;

use wireplay_core::{
    Color, Endpoint, EndpointRegistry, MarkerStyle, Point, RunEvent, RunPhase, RunnerConfig,
    Script, Sequence, Step,
};
use wireplay_harness::{SinkCall, run_script};

const TERMINAL: &str = "Exchange torn down.";

fn abc_script() -> Script {
    let mut registry = EndpointRegistry::new();
    let style = MarkerStyle::new(Color::CYAN, 15.0);
    for (name, x, y) in [("A", 100.0, 70.0), ("B", 300.0, 200.0), ("C", 500.0, 70.0)] {
        registry
            .register(Endpoint::new(name, Point::new(x, y), style))
            .expect("register failed");
    }

    let delay = Duration::from_millis(200);
    let sequence = Sequence::new(
        vec![
            Step::new("A", "B", Color::YELLOW, "SYN").with_post_delay(delay),
            Step::new("B", "A", Color::LIME, "SYN-ACK").with_post_delay(delay),
            Step::new("B", "C", Color::CYAN, "ACK").with_post_delay(delay),
            Step::new("C", "B", Color::ORANGE, "FIN").with_post_delay(delay),
        ],
        TERMINAL,
    );

    Script::new(registry, sequence)
}

fn small_config() -> RunnerConfig {
    RunnerConfig { frames_per_step: 10, frame_interval: Duration::from_millis(50) }
}

#[tokio::test]
async fn log_holds_four_sent_lines_plus_terminal() {
    let trace = run_script(abc_script(), small_config()).await.expect("start rejected");
    assert_eq!(trace.outcome, Ok(()));

    let lines: Vec<String> = trace
        .calls
        .iter()
        .filter_map(|call| match call {
            SinkCall::Line { text, .. } => Some(text.clone()),
            _ => None,
        })
        .collect();

    assert_eq!(
        lines,
        vec!["SYN sent", "SYN-ACK sent", "ACK sent", "FIN sent", TERMINAL]
    );
}

#[tokio::test]
async fn final_status_is_the_terminal_message() {
    let trace = run_script(abc_script(), small_config()).await.expect("start rejected");

    let last_status = trace
        .calls
        .iter()
        .rev()
        .find_map(|call| match call {
            SinkCall::Status { text } => Some(text.clone()),
            _ => None,
        })
        .expect("no status observed");

    assert_eq!(last_status, TERMINAL);
    assert_eq!(trace.final_state.phase, RunPhase::Complete);
}

#[tokio::test]
async fn every_step_is_visited_once_in_order() {
    let trace = run_script(abc_script(), small_config()).await.expect("start rejected");

    let visited: Vec<usize> = trace
        .events
        .iter()
        .filter_map(|event| match event {
            RunEvent::StepSent { step_index, .. } => Some(*step_index),
            _ => None,
        })
        .collect();

    assert_eq!(visited, vec![0, 1, 2, 3]);
}

#[tokio::test]
async fn frames_run_zero_to_n_and_land_on_both_endpoints() {
    let config = small_config();
    let trace = run_script(abc_script(), config).await.expect("start rejected");

    let expected = [
        (Point::new(100.0, 70.0), Point::new(300.0, 200.0)),
        (Point::new(300.0, 200.0), Point::new(100.0, 70.0)),
        (Point::new(300.0, 200.0), Point::new(500.0, 70.0)),
        (Point::new(500.0, 70.0), Point::new(300.0, 200.0)),
    ];

    for (step_index, (from, to)) in expected.iter().enumerate() {
        let frames: Vec<_> = trace
            .events
            .iter()
            .filter_map(|event| match event {
                RunEvent::Frame(f) if f.step_index == step_index => Some(f),
                _ => None,
            })
            .collect();

        assert_eq!(frames.len(), config.frames_per_step as usize + 1);

        let indices: Vec<u32> = frames.iter().map(|f| f.frame_index).collect();
        let expected_indices: Vec<u32> = (0..=config.frames_per_step).collect();
        assert_eq!(indices, expected_indices, "step {step_index} frame order");

        // Exact endpoint landings, no floating residue.
        assert_eq!(frames[0].position, *from, "step {step_index} origin");
        assert_eq!(
            frames[frames.len() - 1].position,
            *to,
            "step {step_index} destination"
        );
    }
}

#[tokio::test]
async fn pacing_waits_match_the_schedule() {
    let config = small_config();
    let trace = run_script(abc_script(), config).await.expect("start rejected");

    // Per step: N + 1 frame-pacing waits plus one narrative delay.
    let per_step = config.frames_per_step as usize + 1;
    assert_eq!(trace.waits.len(), 4 * (per_step + 1));

    let frame_waits =
        trace.waits.iter().filter(|w| **w == config.frame_interval).count();
    let narrative_waits =
        trace.waits.iter().filter(|w| **w == Duration::from_millis(200)).count();
    assert_eq!(frame_waits, 4 * per_step);
    assert_eq!(narrative_waits, 4);
}

#[tokio::test]
async fn surface_is_cleared_and_markers_placed_before_any_token() {
    let trace = run_script(abc_script(), small_config()).await.expect("start rejected");

    let first_token = trace
        .calls
        .iter()
        .position(|c| matches!(c, SinkCall::DrawToken { .. }))
        .expect("no tokens drawn");

    let prefix = &trace.calls[..first_token];
    assert_eq!(prefix[0], SinkCall::Clear);
    let marker_names: Vec<&str> = prefix
        .iter()
        .filter_map(|c| match c {
            SinkCall::Marker { name, .. } => Some(name.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(marker_names, vec!["A", "B", "C"]);
}

#[tokio::test]
async fn interim_tokens_are_removed_and_final_tokens_retained() {
    let config = small_config();
    let trace = run_script(abc_script(), config).await.expect("start rejected");

    let drawn = trace
        .calls
        .iter()
        .filter(|c| matches!(c, SinkCall::DrawToken { .. }))
        .count();
    let removed = trace
        .calls
        .iter()
        .filter(|c| matches!(c, SinkCall::RemoveToken(_)))
        .count();

    let per_step = config.frames_per_step as usize + 1;
    assert_eq!(drawn, 4 * per_step);
    // Each step keeps its final token on the surface.
    assert_eq!(removed, 4 * (per_step - 1));
}
