//! A falling-ball game rendering grayscale frames.
//!
//! A ball falls one cell per step from a random column of the top row. The
//! agent moves a paddle along the bottom row and gets a reward of 1 for every
//! ball it catches. The episode ends at the first missed ball, or after
//! `max_balls` catches.
//!
//! ```
//! use orion_catch_env::{CatchAct, CatchEnv, CatchEnvConfig};
//! use orion_core::Env as _;
//!
//! let config = CatchEnvConfig::default();
//! let mut env = CatchEnv::build(&config, 42).unwrap();
//! let frame = env.reset().unwrap();
//! assert_eq!(frame.height, config.height * config.scale);
//!
//! let (step, _) = env.step(&CatchAct::Stay).unwrap();
//! assert!(step.reward >= 0.0);
//! ```
mod act;
mod config;
mod env;
pub use act::CatchAct;
pub use config::CatchEnvConfig;
pub use env::CatchEnv;
