use crate::{error::OrionError, Step};
use anyhow::Result;

/// The complete step sequence of one episode.
///
/// Built once at the end of an episode and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct Trajectory<S> {
    states: Vec<S>,
    actions: Vec<usize>,
    rewards: Vec<f32>,
    final_state: S,
}

impl<S> Trajectory<S> {
    /// Builds a trajectory from the steps of an episode and the state observed
    /// after the last step.
    ///
    /// Fails with [`OrionError::EmptyTrajectory`] if `steps` is empty.
    pub fn new(steps: Vec<Step<S>>, final_state: S) -> Result<Self> {
        if steps.is_empty() {
            return Err(OrionError::EmptyTrajectory.into());
        }

        let n = steps.len();
        let mut states = Vec::with_capacity(n);
        let mut actions = Vec::with_capacity(n);
        let mut rewards = Vec::with_capacity(n);
        for step in steps {
            states.push(step.state);
            actions.push(step.action);
            rewards.push(step.reward);
        }

        Ok(Self {
            states,
            actions,
            rewards,
            final_state,
        })
    }

    /// The number of steps.
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Always `false`; a trajectory has at least one step.
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// States in step order.
    pub fn states(&self) -> &[S] {
        &self.states
    }

    /// Action indices in step order.
    pub fn actions(&self) -> &[usize] {
        &self.actions
    }

    /// Rewards in step order.
    pub fn rewards(&self) -> &[f32] {
        &self.rewards
    }

    /// State observed after the last step.
    pub fn final_state(&self) -> &S {
        &self.final_state
    }

    /// Sum of the rewards.
    pub fn total_reward(&self) -> f32 {
        self.rewards.iter().sum()
    }
}
