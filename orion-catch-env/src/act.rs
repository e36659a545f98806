//! Action for [`CatchEnv`](crate::CatchEnv).
use orion_core::Act;

/// Move of the paddle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatchAct {
    /// Stay in place.
    Stay,

    /// One cell to the left.
    Left,

    /// One cell to the right.
    Right,
}

impl CatchAct {
    /// The number of actions.
    pub const N: usize = 3;

    pub(crate) fn delta(&self) -> isize {
        match self {
            Self::Stay => 0,
            Self::Left => -1,
            Self::Right => 1,
        }
    }
}

impl Act for CatchAct {
    /// Indices out of range wrap around.
    fn from_index(ix: usize) -> Self {
        match ix % Self::N {
            0 => Self::Stay,
            1 => Self::Left,
            _ => Self::Right,
        }
    }

    fn index(&self) -> usize {
        match self {
            Self::Stay => 0,
            Self::Left => 1,
            Self::Right => 2,
        }
    }
}
