use crate::util::OutDim;
use anyhow::Result;
use orion_core::error::OrionError;
use serde::{Deserialize, Serialize};

/// Padding of a convolutional layer.
#[derive(Debug, Deserialize, Serialize, PartialEq, Eq, Clone, Copy)]
pub enum Padding {
    /// Zero padding keeping the spatial size. Requires an odd kernel and stride 1.
    Same,

    /// No padding.
    Valid,
}

/// A convolutional layer, followed by a ReLU.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct ConvLayerConfig {
    /// Number of output channels.
    pub out_channels: usize,

    /// Size of the square kernel.
    pub kernel: usize,

    /// Stride.
    #[serde(default = "default_stride")]
    pub stride: usize,

    /// Padding.
    #[serde(default = "default_padding")]
    pub padding: Padding,
}

fn default_stride() -> usize {
    1
}

fn default_padding() -> Padding {
    Padding::Same
}

impl ConvLayerConfig {
    /// A stride-1 layer with `Same` padding.
    pub fn new(out_channels: usize, kernel: usize) -> Self {
        Self {
            out_channels,
            kernel,
            stride: default_stride(),
            padding: default_padding(),
        }
    }

    /// Sets the stride.
    pub fn stride(mut self, v: usize) -> Self {
        self.stride = v;
        self
    }

    /// Sets the padding.
    pub fn padding(mut self, v: Padding) -> Self {
        self.padding = v;
        self
    }

    /// Padding added on each side.
    pub(super) fn pad(&self) -> usize {
        match self.padding {
            Padding::Same => (self.kernel - 1) / 2,
            Padding::Valid => 0,
        }
    }

    /// Output size of a spatial dimension of size `n`.
    pub(super) fn out_size(&self, n: usize) -> Result<usize> {
        let padded = n + 2 * self.pad();
        if padded < self.kernel {
            return Err(OrionError::ShapeMismatch(format!(
                "kernel {} larger than padded input {}",
                self.kernel, padded
            ))
            .into());
        }
        Ok((padded - self.kernel) / self.stride + 1)
    }
}

/// Configuration of [`Cnn`](super::Cnn).
///
/// The network is the convolutional layers in order, each followed by a ReLU,
/// then the flattened features through the hidden linear layers, each followed
/// by a ReLU, and a final linear layer with `out_dim` outputs.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct CnnConfig {
    /// Number of stacked frames, the input channels.
    pub n_stack: usize,

    /// Height and width of a preprocessed frame.
    pub in_shape: (usize, usize),

    /// Convolutional layers.
    pub conv: Vec<ConvLayerConfig>,

    /// Widths of the hidden linear layers.
    pub hidden: Vec<usize>,

    /// Number of actions.
    pub out_dim: usize,
}

impl Default for CnnConfig {
    fn default() -> Self {
        Self {
            n_stack: 4,
            in_shape: (88, 21),
            conv: vec![
                ConvLayerConfig::new(64, 5),
                ConvLayerConfig::new(64, 3),
                ConvLayerConfig::new(32, 3),
            ],
            hidden: vec![64],
            out_dim: 5,
        }
    }
}

impl OutDim for CnnConfig {
    fn get_out_dim(&self) -> usize {
        self.out_dim
    }

    fn set_out_dim(&mut self, v: usize) {
        self.out_dim = v;
    }
}

impl CnnConfig {
    /// Sets the number of stacked frames.
    pub fn n_stack(mut self, v: usize) -> Self {
        self.n_stack = v;
        self
    }

    /// Sets the shape of a preprocessed frame.
    pub fn in_shape(mut self, v: (usize, usize)) -> Self {
        self.in_shape = v;
        self
    }

    /// Sets the convolutional layers.
    pub fn conv(mut self, v: Vec<ConvLayerConfig>) -> Self {
        self.conv = v;
        self
    }

    /// Sets the hidden linear layers.
    pub fn hidden(mut self, v: Vec<usize>) -> Self {
        self.hidden = v;
        self
    }

    /// Sets the number of actions.
    pub fn out_dim(mut self, v: usize) -> Self {
        self.out_dim = v;
        self
    }

    /// Checks the layer descriptors.
    pub fn validate(&self) -> Result<()> {
        if self.n_stack == 0 || self.out_dim == 0 {
            return Err(OrionError::InvalidConfig(
                "n_stack and out_dim must be positive".to_string(),
            )
            .into());
        }
        for (i, c) in self.conv.iter().enumerate() {
            if c.kernel == 0 || c.stride == 0 || c.out_channels == 0 {
                return Err(OrionError::InvalidConfig(format!(
                    "conv layer {}: kernel, stride and channels must be positive",
                    i
                ))
                .into());
            }
            if c.padding == Padding::Same && (c.kernel % 2 == 0 || c.stride != 1) {
                return Err(OrionError::InvalidConfig(format!(
                    "conv layer {}: same padding needs an odd kernel and stride 1",
                    i
                ))
                .into());
            }
        }
        Ok(())
    }

    /// Width of the flattened output of the convolutional layers.
    pub fn flatten_dim(&self) -> Result<usize> {
        let (mut h, mut w) = self.in_shape;
        let mut channels = self.n_stack;
        for c in self.conv.iter() {
            h = c.out_size(h)?;
            w = c.out_size(w)?;
            channels = c.out_channels;
        }
        Ok(channels * h * w)
    }
}
