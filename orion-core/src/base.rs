//! Core functionalities.
mod agent;
mod env;
mod frame;
mod policy;
mod state_processor;
mod step;
pub use agent::Agent;
pub use env::Env;
pub use frame::RawFrame;
pub use policy::Policy;
pub use state_processor::StateProcessor;
use std::fmt::Debug;
pub use step::{EnvStep, Info};

/// An observation emitted by an environment.
///
/// Vectorized environments are not supported, so an observation always
/// corresponds to a single environment.
pub trait Obs: Clone + Debug {}

/// A discrete action of an environment.
///
/// Actions are identified by an index in `[0, n_actions)`, which is what the
/// replay memory stores and what the action-value function is indexed with.
pub trait Act: Clone + Debug {
    /// Constructs the action with the given index.
    fn from_index(ix: usize) -> Self;

    /// Returns the index of the action.
    fn index(&self) -> usize;
}

impl Act for usize {
    fn from_index(ix: usize) -> Self {
        ix
    }

    fn index(&self) -> usize {
        *self
    }
}
