//! Steps of the episode in progress.

/// A `(state, action, reward)` tuple of one agent decision.
///
/// The reward is the sum of the rewards over the skipped frames of the
/// decision.
#[derive(Debug, Clone)]
pub struct Step<S> {
    /// State the action was selected in.
    pub state: S,

    /// Index of the selected action.
    pub action: usize,

    /// Reward received after the action.
    pub reward: f32,
}

/// Accumulates the steps of the current episode only.
///
/// The buffer is drained at the end of every episode, whether or not the
/// episode is committed to the replay memory.
#[derive(Debug)]
pub struct EpisodeBuffer<S> {
    steps: Vec<Step<S>>,
}

impl<S> Default for EpisodeBuffer<S> {
    fn default() -> Self {
        Self { steps: Vec::new() }
    }
}

impl<S> EpisodeBuffer<S> {
    /// Constructs an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a step.
    pub fn push(&mut self, state: S, action: usize, reward: f32) {
        self.steps.push(Step {
            state,
            action,
            reward,
        });
    }

    /// Returns all steps in order and leaves the buffer empty.
    pub fn drain(&mut self) -> Vec<Step<S>> {
        std::mem::take(&mut self.steps)
    }

    /// The number of steps in the buffer.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Returns `true` if the buffer has no step.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Sum of the rewards in the buffer.
    pub fn total_reward(&self) -> f32 {
        self.steps.iter().map(|s| s.reward).sum()
    }
}
