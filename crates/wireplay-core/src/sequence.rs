//! The ordered, immutable list of protocol steps.

use std::time::Duration;

use crate::{
    endpoint::EndpointRegistry,
    error::{InvalidReferenceError, ReferenceViolation},
    surface::Color,
};

/// One directed, labeled move from one endpoint to another.
///
/// Steps are immutable value objects: a run only ever reads them.
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    /// Name of the endpoint the token departs from.
    pub from: String,
    /// Name of the endpoint the token arrives at.
    pub to: String,
    /// Token and log-line color.
    pub color: Color,
    /// Label logged as "`label` sent" once the step's animation finishes.
    pub label: String,
    /// Status line announced before the step animates, when present.
    pub status: Option<String>,
    /// Narrative pause after the step completes. Distinct from the per-frame
    /// pacing interval.
    pub post_delay: Duration,
}

impl Step {
    /// Default narrative pause between steps.
    pub const DEFAULT_POST_DELAY: Duration = Duration::from_millis(1000);

    /// Construct a step with the default post-delay and no status text.
    pub fn new(
        from: impl Into<String>,
        to: impl Into<String>,
        color: Color,
        label: impl Into<String>,
    ) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            color,
            label: label.into(),
            status: None,
            post_delay: Self::DEFAULT_POST_DELAY,
        }
    }

    /// Attach the status line announced before the step runs.
    #[must_use]
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    /// Override the narrative pause after the step.
    #[must_use]
    pub fn with_post_delay(mut self, delay: Duration) -> Self {
        self.post_delay = delay;
        self
    }
}

/// An ordered, immutable sequence of steps plus the terminal message shown
/// when the replay completes.
///
/// The same `Sequence` may back any number of independent runs: iteration is
/// lazy, finite, and restartable.
#[derive(Debug, Clone, PartialEq)]
pub struct Sequence {
    steps: Vec<Step>,
    terminal_message: String,
}

impl Sequence {
    /// Construct a sequence.
    pub fn new(steps: Vec<Step>, terminal_message: impl Into<String>) -> Self {
        Self { steps, terminal_message: terminal_message.into() }
    }

    /// Check every step's endpoint references against `registry`.
    ///
    /// Runs to the end and reports **all** violations, so one pass over the
    /// error is enough to fix a broken script.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidReferenceError`] when any reference fails to resolve.
    pub fn validate(&self, registry: &EndpointRegistry) -> Result<(), InvalidReferenceError> {
        let mut violations = Vec::new();

        for (step_index, step) in self.steps.iter().enumerate() {
            for endpoint in [&step.from, &step.to] {
                if !registry.contains(endpoint) {
                    violations
                        .push(ReferenceViolation { step_index, endpoint: endpoint.clone() });
                }
            }
        }

        if violations.is_empty() { Ok(()) } else { Err(InvalidReferenceError { violations }) }
    }

    /// Steps in order. Restartable: each call yields a fresh iterator.
    pub fn steps(&self) -> impl Iterator<Item = &Step> {
        self.steps.iter()
    }

    /// The step at `index`, if any.
    #[must_use]
    pub fn step(&self, index: usize) -> Option<&Step> {
        self.steps.get(index)
    }

    /// Number of steps.
    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether the sequence has no steps.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Message logged and shown as status once the last step settles.
    #[must_use]
    pub fn terminal_message(&self) -> &str {
        &self.terminal_message
    }
}

#[cfg(test)]
mod tests {
    use crate::{endpoint::Endpoint, interpolate::Point, surface::MarkerStyle};

    use super::*;

    fn registry_with(names: &[&str]) -> EndpointRegistry {
        let mut registry = EndpointRegistry::new();
        for (i, name) in names.iter().enumerate() {
            let style = MarkerStyle::new(Color::CYAN, 15.0);
            registry
                .register(Endpoint::new(*name, Point::new(i as f64 * 100.0, 70.0), style))
                .expect("register failed");
        }
        registry
    }

    #[test]
    fn valid_sequence_passes() {
        let registry = registry_with(&["client", "server"]);
        let sequence = Sequence::new(
            vec![
                Step::new("client", "server", Color::YELLOW, "SYN"),
                Step::new("server", "client", Color::LIME, "SYN-ACK"),
            ],
            "Connection established!",
        );

        assert!(sequence.validate(&registry).is_ok());
    }

    #[test]
    fn validate_collects_every_violation() {
        let registry = registry_with(&["client"]);
        let sequence = Sequence::new(
            vec![
                Step::new("client", "server", Color::YELLOW, "SYN"),
                Step::new("mallory", "client", Color::RED, "FAKE"),
            ],
            "done",
        );

        let err = sequence.validate(&registry).expect_err("expected violations");
        assert_eq!(
            err.violations,
            vec![
                ReferenceViolation { step_index: 0, endpoint: "server".to_string() },
                ReferenceViolation { step_index: 1, endpoint: "mallory".to_string() },
            ]
        );
    }

    #[test]
    fn step_iteration_is_restartable() {
        let sequence = Sequence::new(
            vec![
                Step::new("a", "b", Color::YELLOW, "one"),
                Step::new("b", "a", Color::LIME, "two"),
            ],
            "done",
        );

        let first: Vec<_> = sequence.steps().map(|s| s.label.clone()).collect();
        let second: Vec<_> = sequence.steps().map(|s| s.label.clone()).collect();
        assert_eq!(first, second);
        assert_eq!(first, vec!["one", "two"]);
    }

    #[test]
    fn step_builder_applies_options() {
        let step = Step::new("a", "b", Color::ORANGE, "Fake ACK")
            .with_status("Attacker sends fake ACK...")
            .with_post_delay(Duration::from_millis(250));

        assert_eq!(step.status.as_deref(), Some("Attacker sends fake ACK..."));
        assert_eq!(step.post_delay, Duration::from_millis(250));
    }
}
