//! Frame preprocessing and frame stacking.
use crate::Device;
use anyhow::Result;
use candle_core::Tensor;
use orion_core::{error::OrionError, Env, RawFrame, StateProcessor};
use serde::{Deserialize, Serialize};
use std::{collections::VecDeque, convert::TryFrom};

/// Rows `top..bottom` and columns `left..right` of a frame.
#[derive(Debug, Deserialize, Serialize, PartialEq, Eq, Clone, Copy)]
pub struct CropWindow {
    /// First row.
    pub top: usize,

    /// One past the last row.
    pub bottom: usize,

    /// First column.
    pub left: usize,

    /// One past the last column.
    pub right: usize,
}

impl CropWindow {
    /// Constructs a window from row and column ranges.
    pub fn new(rows: std::ops::Range<usize>, cols: std::ops::Range<usize>) -> Self {
        Self {
            top: rows.start,
            bottom: rows.end,
            left: cols.start,
            right: cols.end,
        }
    }

    fn check(&self, frame: &RawFrame) -> Result<()> {
        if self.top >= self.bottom
            || self.left >= self.right
            || self.bottom > frame.height
            || self.right > frame.width
        {
            return Err(OrionError::ShapeMismatch(format!(
                "crop {}..{} x {}..{} of a {}x{} frame",
                self.top, self.bottom, self.left, self.right, frame.height, frame.width
            ))
            .into());
        }
        Ok(())
    }
}

/// Configuration of [`Preprocess`].
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct PreprocessConfig {
    /// Region kept from each frame. The whole frame is kept if `None`.
    pub crop: Option<CropWindow>,

    /// Size and stride of the max pooling window applied after cropping.
    pub max_pooling: Option<usize>,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            crop: Some(CropWindow::new(27..203, 22..64)),
            max_pooling: Some(2),
        }
    }
}

impl PreprocessConfig {
    /// Sets the crop window.
    pub fn crop(mut self, v: Option<CropWindow>) -> Self {
        self.crop = v;
        self
    }

    /// Sets the max pooling window.
    pub fn max_pooling(mut self, v: Option<usize>) -> Self {
        self.max_pooling = v;
        self
    }

    /// Shape of a preprocessed frame given the shape of a raw frame.
    pub fn out_shape(&self, height: usize, width: usize) -> (usize, usize) {
        let (h, w) = match &self.crop {
            Some(c) => (c.bottom - c.top, c.right - c.left),
            None => (height, width),
        };
        match self.max_pooling {
            Some(k) if k > 1 => (h / k, w / k),
            _ => (h, w),
        }
    }
}

/// Crops a raw frame, scales it to `[0, 1]` and applies max pooling.
///
/// The output is a `[height, width]` F32 tensor. The transformation is
/// deterministic and has no state.
pub struct Preprocess {
    config: PreprocessConfig,
    device: candle_core::Device,
}

impl Preprocess {
    /// Constructs the transformation.
    pub fn new(config: PreprocessConfig, device: candle_core::Device) -> Self {
        Self { config, device }
    }

    /// Transforms a frame.
    pub fn apply(&self, frame: &RawFrame) -> Result<Tensor> {
        let crop = match &self.config.crop {
            Some(crop) => {
                crop.check(frame)?;
                *crop
            }
            None => CropWindow::new(0..frame.height, 0..frame.width),
        };
        let (h, w) = (crop.bottom - crop.top, crop.right - crop.left);

        let mut pixels = Vec::with_capacity(h * w);
        for row in crop.top..crop.bottom {
            let start = row * frame.width;
            pixels.extend(
                frame.pixels[start + crop.left..start + crop.right]
                    .iter()
                    .map(|p| *p as f32 / 255.0),
            );
        }
        let x = Tensor::from_vec(pixels, (h, w), &self.device)?;

        match self.config.max_pooling {
            Some(k) if k > 1 => {
                if h < k || w < k {
                    return Err(OrionError::ShapeMismatch(format!(
                        "max pooling {} of a {}x{} crop",
                        k, h, w
                    ))
                    .into());
                }
                Ok(x.reshape((1, 1, h, w))?
                    .max_pool2d(k)?
                    .reshape((h / k, w / k))?)
            }
            _ => Ok(x),
        }
    }
}

/// Configuration of [`FrameStack`].
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct FrameStackConfig {
    /// Number of stacked frames.
    pub n_stack: usize,

    /// Preprocessing of each frame.
    pub preprocess: PreprocessConfig,

    /// Device of the produced states.
    #[serde(default)]
    pub device: Device,
}

impl Default for FrameStackConfig {
    fn default() -> Self {
        Self {
            n_stack: 4,
            preprocess: PreprocessConfig::default(),
            device: Device::Cpu,
        }
    }
}

impl FrameStackConfig {
    /// Sets the number of stacked frames.
    pub fn n_stack(mut self, v: usize) -> Self {
        self.n_stack = v;
        self
    }

    /// Sets the preprocessing.
    pub fn preprocess(mut self, v: PreprocessConfig) -> Self {
        self.preprocess = v;
        self
    }

    /// Sets the device.
    pub fn device(mut self, v: Device) -> Self {
        self.device = v;
        self
    }
}

/// Keeps the `n_stack` most recent preprocessed frames.
///
/// States are `[1, n_stack, height, width]` tensors, the oldest frame first.
pub struct FrameStack {
    n_stack: usize,
    preprocess: Preprocess,
    frames: VecDeque<Tensor>,
}

impl<E> StateProcessor<E> for FrameStack
where
    E: Env,
    E::Obs: AsRef<RawFrame>,
{
    type Config = FrameStackConfig;
    type State = Tensor;

    fn build(config: &Self::Config) -> Result<Self> {
        if config.n_stack == 0 {
            return Err(OrionError::InvalidConfig("n_stack must be positive".to_string()).into());
        }
        let device = candle_core::Device::try_from(config.device)?;
        Ok(Self {
            n_stack: config.n_stack,
            preprocess: Preprocess::new(config.preprocess.clone(), device),
            frames: VecDeque::with_capacity(config.n_stack),
        })
    }

    fn reset(&mut self, init_obs: &E::Obs) -> Result<Tensor> {
        let frame = self.preprocess.apply(init_obs.as_ref())?;
        self.frames.clear();
        for _ in 0..self.n_stack {
            self.frames.push_back(frame.clone());
        }
        <Self as StateProcessor<E>>::state(self)
    }

    fn push(&mut self, obs: &E::Obs) -> Result<()> {
        let frame = self.preprocess.apply(obs.as_ref())?;
        if self.frames.len() == self.n_stack {
            self.frames.pop_front();
        }
        self.frames.push_back(frame);
        Ok(())
    }

    fn state(&self) -> Result<Tensor> {
        if self.frames.len() != self.n_stack {
            return Err(OrionError::ShapeMismatch(format!(
                "{} frames in a stack of {}",
                self.frames.len(),
                self.n_stack
            ))
            .into());
        }
        let frames = self.frames.iter().cloned().collect::<Vec<_>>();
        Ok(Tensor::stack(&frames, 0)?.unsqueeze(0)?)
    }
}
