//! Start-run entry point wiring script, state, bridge, and environment.

use std::sync::Arc;

use crate::{
    bridge::EventSender,
    env::Environment,
    error::{DispatchError, StartError},
    runner::{RunState, RunStateCell, RunnerConfig, SequenceRunner, drive},
    script::Script,
};

/// The UI-facing handle for starting runs.
///
/// Owns the script, config, and the single [`RunStateCell`] backing all of
/// this visualization's runs. `start_run` is the whole trigger surface: no
/// arguments, and the caller learns synchronously whether the run was
/// accepted.
#[derive(Debug, Clone)]
pub struct RunController<E: Environment> {
    script: Arc<Script>,
    config: RunnerConfig,
    env: E,
    events: EventSender,
    state: Arc<RunStateCell>,
}

impl<E: Environment> RunController<E> {
    /// Build a controller around a script and the sending half of the
    /// dispatch bridge.
    pub fn new(script: Script, config: RunnerConfig, env: E, events: EventSender) -> Self {
        Self {
            script: Arc::new(script),
            config,
            env,
            events,
            state: Arc::new(RunStateCell::new()),
        }
    }

    /// Snapshot of the run phase and current step.
    #[must_use]
    pub fn state(&self) -> RunState {
        self.state.snapshot()
    }

    /// Request a run.
    ///
    /// On success returns the execution-flow future; the caller spawns it
    /// (or awaits it off the interactive flow) and must never block its
    /// interactive loop on it.
    ///
    /// # Errors
    ///
    /// - [`StartError::Validation`] if the script fails pre-run validation;
    ///   no run begins and the phase is untouched.
    /// - [`StartError::AlreadyRunning`] while a run is in flight (the
    ///   documented ignore-while-Running policy).
    pub fn start_run(
        &self,
    ) -> Result<
        impl std::future::Future<Output = Result<(), DispatchError>> + Send + use<E>,
        StartError,
    > {
        let runner =
            SequenceRunner::begin(&self.script, self.config, Arc::clone(&self.state))?;
        Ok(drive(runner, self.env.clone(), self.events.clone()))
    }
}
