//! Policy.
use super::Env;
use anyhow::Result;

/// A policy on an environment.
///
/// Policy is a mapping from a processed state to an action.
pub trait Policy<E: Env> {
    /// State the policy acts on, typically a stack of preprocessed frames.
    type State: Clone;

    /// Sample an action given a state.
    fn sample(&mut self, state: &Self::State) -> Result<E::Act>;
}
