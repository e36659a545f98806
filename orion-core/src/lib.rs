#![warn(missing_docs)]
//! Core of an episodic deep Q-learning engine for pixel-observation games.
//!
//! This crate is independent of any tensor backend. It provides
//!
//! * the interfaces between the environment, the state processor and the agent
//!   ([`Env`], [`StateProcessor`], [`Policy`], [`Agent`]),
//! * per-episode step accumulation ([`EpisodeBuffer`]),
//! * the trajectory replay memory and the flattening of sampled trajectories
//!   into a single batch with per-trajectory boundaries ([`replay_memory`]),
//! * reward-to-go, normalization and bootstrapped targets ([`returns`]),
//! * the exploration schedule ([`ExplorationSchedule`]),
//! * the episode-level training loop ([`Trainer`]),
//! * checkpoint discovery ([`checkpoint`]) and metrics records ([`record`]).
pub mod checkpoint;
pub mod error;
pub mod record;
pub mod replay_memory;
pub mod returns;

mod base;
pub use base::{Act, Agent, EnvStep, Env, Info, Obs, Policy, RawFrame, StateProcessor};

mod episode_buffer;
pub use episode_buffer::{EpisodeBuffer, Step};

mod exploration;
pub use exploration::{ExplorationConfig, ExplorationSchedule};

mod trainer;
pub use trainer::{Phase, Trainer, TrainerConfig};
