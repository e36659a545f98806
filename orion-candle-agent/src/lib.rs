//! Candle backend of the orion engine.
//!
//! * [`cnn::Cnn`], a convolutional action-value function built from explicit
//!   layer descriptors,
//! * [`dqn::DqnModel`], which owns the parameters and the optimizer of an
//!   action-value function,
//! * [`dqn::VisionDqn`], the agent performing Q-learning updates on batches of
//!   whole trajectories,
//! * [`preprocess::FrameStack`], turning raw frames into stacked tensors.
pub mod cnn;
pub mod dqn;
pub mod model;
pub mod opt;
pub mod preprocess;
pub mod util;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::convert::TryFrom;

#[derive(Clone, Debug, Copy, Deserialize, Serialize, PartialEq, Default)]
/// Device for using candle.
///
/// This enum is added because [`candle_core::Device`] does not support serialization.
pub enum Device {
    /// The main CPU device.
    #[default]
    Cpu,

    /// The GPU device with the given ordinal.
    Cuda(usize),
}

impl TryFrom<Device> for candle_core::Device {
    type Error = candle_core::Error;

    fn try_from(device: Device) -> Result<Self, Self::Error> {
        match device {
            Device::Cpu => Ok(candle_core::Device::Cpu),
            Device::Cuda(n) => candle_core::Device::new_cuda(n),
        }
    }
}
