//! Configuration of [`CatchEnv`](crate::CatchEnv).
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Configuration of [`CatchEnv`](crate::CatchEnv).
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct CatchEnvConfig {
    /// Number of rows of the board.
    pub height: usize,

    /// Number of columns of the board.
    pub width: usize,

    /// Width of the paddle in cells.
    pub paddle_width: usize,

    /// Pixels per cell side in rendered frames.
    pub scale: usize,

    /// Catches after which the episode ends.
    pub max_balls: usize,
}

impl Default for CatchEnvConfig {
    fn default() -> Self {
        Self {
            height: 16,
            width: 8,
            paddle_width: 2,
            scale: 4,
            max_balls: 10,
        }
    }
}

impl CatchEnvConfig {
    /// Sets the number of rows.
    pub fn height(mut self, v: usize) -> Self {
        self.height = v;
        self
    }

    /// Sets the number of columns.
    pub fn width(mut self, v: usize) -> Self {
        self.width = v;
        self
    }

    /// Sets the width of the paddle.
    pub fn paddle_width(mut self, v: usize) -> Self {
        self.paddle_width = v;
        self
    }

    /// Sets the number of pixels per cell side.
    pub fn scale(mut self, v: usize) -> Self {
        self.scale = v;
        self
    }

    /// Sets the number of catches ending an episode.
    pub fn max_balls(mut self, v: usize) -> Self {
        self.max_balls = v;
        self
    }

    /// Height and width of rendered frames.
    pub fn frame_shape(&self) -> (usize, usize) {
        (self.height * self.scale, self.width * self.scale)
    }

    /// Constructs [`CatchEnvConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`CatchEnvConfig`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}
