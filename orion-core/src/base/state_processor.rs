//! Conversion of raw observations into agent states.
use super::Env;
use anyhow::Result;

/// Turns raw observations of an environment into states for the agent.
///
/// The processor keeps a window of the most recent preprocessed frames.
/// [`StateProcessor::reset`] fills the whole window with the initial
/// observation, so that the first state of an episode has the same depth as
/// every following state.
pub trait StateProcessor<E: Env> {
    /// Configuration.
    type Config: Clone;

    /// The state produced by the processor.
    type State: Clone;

    /// Builds the processor.
    fn build(config: &Self::Config) -> Result<Self>
    where
        Self: Sized;

    /// Starts a new episode with its initial observation and returns the initial state.
    fn reset(&mut self, init_obs: &E::Obs) -> Result<Self::State>;

    /// Shifts a new observation into the window.
    fn push(&mut self, obs: &E::Obs) -> Result<()>;

    /// Returns the state built from the current window.
    fn state(&self) -> Result<Self::State>;
}
