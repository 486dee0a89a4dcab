//! Error taxonomy for the replay core.
//!
//! Every failure either prevents a run from starting (registry misuse,
//! unresolved references, overlapping start) or terminates the in-progress
//! run visibly (dispatch failure). Nothing is retried: the replay is a
//! deterministic script, not a system tolerating transient faults.

use thiserror::Error;

/// Registry misuse. Programmer error; fail fast, never retried.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// An endpoint with this name is already registered.
    #[error("duplicate endpoint: {name}")]
    DuplicateEndpoint {
        /// The colliding endpoint name.
        name: String,
    },

    /// No endpoint with this name is registered.
    #[error("unknown endpoint: {name}")]
    UnknownEndpoint {
        /// The name that failed to resolve.
        name: String,
    },
}

/// A step referencing an endpoint the registry does not hold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceViolation {
    /// Index of the offending step within its sequence.
    pub step_index: usize,
    /// The endpoint name that failed to resolve.
    pub endpoint: String,
}

impl std::fmt::Display for ReferenceViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "step {} -> {}", self.step_index, self.endpoint)
    }
}

/// Sequence/registry mismatch, reported before any run starts.
///
/// Carries **every** violation, not just the first, so a broken script can
/// be fixed in one pass.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{} unresolved endpoint reference(s): {}", violations.len(), describe(violations))]
pub struct InvalidReferenceError {
    /// All unresolved references, in step order.
    pub violations: Vec<ReferenceViolation>,
}

fn describe(violations: &[ReferenceViolation]) -> String {
    violations.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
}

/// Why a start request was refused. Surfaced synchronously to the caller;
/// the run phase is left untouched.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StartError {
    /// The script failed pre-run validation; the phase stays `Idle`.
    #[error("validation failed: {0}")]
    Validation(#[from] InvalidReferenceError),

    /// A run is already in progress. Overlapping starts are ignored by
    /// policy; the in-flight run is unaffected.
    #[error("a run is already in progress")]
    AlreadyRunning,
}

/// Event delivery across the bridge failed mid-run.
///
/// Not retried: the run is abandoned, its phase forced to `Complete`, and an
/// error event emitted best-effort.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum DispatchError {
    /// The interactive side dropped its receiver before delivery.
    #[error("event channel closed before delivery")]
    Closed,
}
