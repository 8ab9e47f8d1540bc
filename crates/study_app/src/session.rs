use std::time::Duration;

use anyhow::{bail, Result};
use study_core::{update, Domain, Msg, Notice, WorkflowState};

use crate::effects::EffectRunner;

/// One mounted workflow: the pure state plus the runner executing its effects.
/// Completions are applied one at a time, on the caller's thread.
pub struct Session {
    state: WorkflowState,
    runner: EffectRunner,
    timeout: Duration,
}

impl Session {
    pub fn new(domain: Domain, runner: EffectRunner, timeout: Duration) -> Self {
        Self {
            state: WorkflowState::new(domain),
            runner,
            timeout,
        }
    }

    pub fn state(&self) -> &WorkflowState {
        &self.state
    }

    pub fn dispatch(&mut self, msg: Msg) {
        let placeholder = WorkflowState::new(self.state.domain());
        let state = std::mem::replace(&mut self.state, placeholder);
        let (state, effects) = update(state, msg);
        self.state = state;
        self.runner.enqueue(effects);
    }

    /// Apply completions until nothing is in flight.
    pub fn settle(&mut self) -> Result<()> {
        while self.runner.in_flight() > 0 {
            match self.runner.next_msg(self.timeout) {
                Some(msg) => self.dispatch(msg),
                None => bail!(
                    "no response from the server after {}s",
                    self.timeout.as_secs()
                ),
            }
        }
        Ok(())
    }

    /// Dispatch, settle, and turn an error notice into an error.
    pub fn run(&mut self, msg: Msg) -> Result<()> {
        self.dispatch(msg);
        self.settle()?;
        match self.state().view().notice {
            Some(Notice::Error(err)) => bail!(err),
            _ => Ok(()),
        }
    }

    pub fn unmount(mut self) {
        self.dispatch(Msg::Unmounted);
    }
}
