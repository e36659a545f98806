//! Replay memory of complete episodes.
//!
//! Unlike a transition replay buffer, the memory keeps whole trajectories.
//! A training batch is built by sampling trajectories and flattening them
//! into one sequence of steps, keeping the offset of the last step of every
//! trajectory (its boundary). The boundaries are where the reward-to-go
//! recursion restarts and where the next state is taken from the stored final
//! state instead of the following step.
mod base;
mod batch;
mod config;
mod trajectory;
pub use base::ReplayMemory;
pub use batch::TrajectoryBatch;
pub use config::ReplayMemoryConfig;
pub use trajectory::Trajectory;
