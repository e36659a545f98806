//! Falling-ball environment.
use crate::{CatchAct, CatchEnvConfig};
use anyhow::{bail, Result};
use log::trace;
use orion_core::{error::OrionError, record::Record, Env, EnvStep, RawFrame};
use rand::{rngs::SmallRng, Rng, SeedableRng};

const BALL: u8 = 255;
const PADDLE: u8 = 128;

/// Falling-ball environment.
///
/// Observations are grayscale frames of `height * scale` rows and
/// `width * scale` columns.
pub struct CatchEnv {
    config: CatchEnvConfig,
    rng: SmallRng,
    ball_row: usize,
    ball_col: usize,
    paddle_col: usize,
    caught: usize,
    done: bool,
}

impl CatchEnv {
    fn spawn_ball(&mut self) {
        self.ball_row = 0;
        self.ball_col = self.rng.gen_range(0..self.config.width);
    }

    fn paddle_covers(&self, col: usize) -> bool {
        col >= self.paddle_col && col < self.paddle_col + self.config.paddle_width
    }

    /// Number of balls caught in the current episode.
    pub fn caught(&self) -> usize {
        self.caught
    }

    /// Column of the falling ball.
    pub fn ball_col(&self) -> usize {
        self.ball_col
    }

    /// Leftmost column of the paddle.
    pub fn paddle_col(&self) -> usize {
        self.paddle_col
    }

    /// Renders the board.
    pub fn render(&self) -> RawFrame {
        let (h, w) = self.config.frame_shape();
        let scale = self.config.scale;
        let mut frame = RawFrame::zeros(h, w);
        let mut fill = |row: usize, col: usize, value: u8| {
            for r in row * scale..(row + 1) * scale {
                let start = r * w + col * scale;
                frame.pixels[start..start + scale].fill(value);
            }
        };

        let bottom = self.config.height - 1;
        for col in self.paddle_col..self.paddle_col + self.config.paddle_width {
            fill(bottom, col, PADDLE);
        }
        fill(self.ball_row, self.ball_col, BALL);
        frame
    }
}

impl Env for CatchEnv {
    type Config = CatchEnvConfig;
    type Obs = RawFrame;
    type Act = CatchAct;
    type Info = ();

    fn build(config: &Self::Config, seed: i64) -> Result<Self> {
        if config.height < 2
            || config.scale == 0
            || config.paddle_width == 0
            || config.paddle_width > config.width
        {
            return Err(OrionError::InvalidConfig(format!("{:?}", config)).into());
        }
        let mut env = Self {
            config: config.clone(),
            rng: SmallRng::seed_from_u64(seed as u64),
            ball_row: 0,
            ball_col: 0,
            paddle_col: 0,
            caught: 0,
            done: true,
        };
        env.spawn_ball();
        Ok(env)
    }

    fn reset(&mut self) -> Result<RawFrame> {
        self.paddle_col = (self.config.width - self.config.paddle_width) / 2;
        self.caught = 0;
        self.done = false;
        self.spawn_ball();
        Ok(self.render())
    }

    fn step(&mut self, a: &CatchAct) -> Result<(EnvStep<Self>, Record)> {
        if self.done {
            bail!("The episode has ended, call reset() first");
        }

        let max_col = (self.config.width - self.config.paddle_width) as isize;
        self.paddle_col = (self.paddle_col as isize + a.delta()).clamp(0, max_col) as usize;
        self.ball_row += 1;

        let mut reward = 0.0;
        if self.ball_row == self.config.height - 1 {
            if self.paddle_covers(self.ball_col) {
                reward = 1.0;
                self.caught += 1;
                trace!("Caught ball {}", self.caught);
                if self.caught >= self.config.max_balls {
                    self.done = true;
                } else {
                    self.spawn_ball();
                }
            } else {
                self.done = true;
            }
        }

        let step = EnvStep::new(self.render(), *a, reward, self.done, false, ());
        Ok((step, Record::empty()))
    }

    fn n_actions(&self) -> usize {
        CatchAct::N
    }
}
