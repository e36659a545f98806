//! Convolutional action-value function.
mod base;
mod config;
pub use base::Cnn;
pub use config::{CnnConfig, ConvLayerConfig, Padding};
