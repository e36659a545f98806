//! Flattening of sampled trajectories.
use super::Trajectory;

/// Sampled trajectories laid out as one flat sequence of steps.
///
/// Every field is a contiguous buffer indexed by the position in the
/// concatenated sequence. `boundaries[j]` is the position of the last step of
/// the `j`-th sampled trajectory, in sampling order.
///
/// `next_states[i]` is `states[i + 1]` inside a trajectory and the final
/// state of the trajectory at its boundary.
#[derive(Debug, Clone)]
pub struct TrajectoryBatch<S> {
    states: Vec<S>,
    next_states: Vec<S>,
    actions: Vec<usize>,
    rewards: Vec<f32>,
    boundaries: Vec<usize>,
    is_boundary: Vec<bool>,
}

impl<S: Clone> TrajectoryBatch<S> {
    /// Concatenates trajectories in the given order.
    pub fn assemble(trajectories: &[&Trajectory<S>]) -> Self {
        let n = trajectories.iter().map(|t| t.len()).sum();
        let mut states = Vec::with_capacity(n);
        let mut next_states = Vec::with_capacity(n);
        let mut actions = Vec::with_capacity(n);
        let mut rewards = Vec::with_capacity(n);
        let mut boundaries = Vec::with_capacity(trajectories.len());
        let mut is_boundary = vec![false; n];

        for t in trajectories {
            states.extend_from_slice(t.states());
            next_states.extend(t.states().iter().skip(1).cloned());
            next_states.push(t.final_state().clone());
            actions.extend_from_slice(t.actions());
            rewards.extend_from_slice(t.rewards());

            let last = states.len() - 1;
            boundaries.push(last);
            is_boundary[last] = true;
        }

        Self {
            states,
            next_states,
            actions,
            rewards,
            boundaries,
            is_boundary,
        }
    }
}

impl<S> TrajectoryBatch<S> {
    /// Total number of steps.
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Returns `true` if the batch has no step.
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Number of trajectories in the batch.
    pub fn n_trajectories(&self) -> usize {
        self.boundaries.len()
    }

    /// States `s_t`.
    pub fn states(&self) -> &[S] {
        &self.states
    }

    /// Next states `s_t+1`.
    pub fn next_states(&self) -> &[S] {
        &self.next_states
    }

    /// Action indices `a_t`.
    pub fn actions(&self) -> &[usize] {
        &self.actions
    }

    /// Rewards `r_t` as observed.
    pub fn rewards(&self) -> &[f32] {
        &self.rewards
    }

    /// Position of the last step of each trajectory.
    pub fn boundaries(&self) -> &[usize] {
        &self.boundaries
    }

    /// Per-position boundary flags.
    pub fn is_boundary(&self) -> &[bool] {
        &self.is_boundary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Step;

    fn trajectory(states: &[i32], final_state: i32) -> Trajectory<i32> {
        let steps = states
            .iter()
            .map(|s| Step {
                state: *s,
                action: (*s as usize) % 3,
                reward: *s as f32,
            })
            .collect();
        Trajectory::new(steps, final_state).unwrap()
    }

    #[test]
    fn test_assemble() {
        let t1 = trajectory(&[10, 11, 12], 13);
        let t2 = trajectory(&[20], 21);
        let t3 = trajectory(&[30, 31], 32);
        let batch = TrajectoryBatch::assemble(&[&t1, &t2, &t3]);

        assert_eq!(batch.len(), 6);
        assert_eq!(batch.n_trajectories(), 3);
        assert_eq!(batch.states(), &[10, 11, 12, 20, 30, 31]);
        assert_eq!(batch.next_states(), &[11, 12, 13, 21, 31, 32]);
        assert_eq!(batch.actions(), &[1, 2, 0, 2, 0, 1]);
        assert_eq!(batch.rewards(), &[10., 11., 12., 20., 30., 31.]);
        assert_eq!(batch.boundaries(), &[2, 3, 5]);
        assert_eq!(
            batch.is_boundary(),
            &[false, false, true, true, false, true]
        );
    }

    #[test]
    fn test_assemble_keeps_sampling_order() {
        let t1 = trajectory(&[1], 2);
        let t2 = trajectory(&[5, 6], 7);
        let batch = TrajectoryBatch::assemble(&[&t2, &t1]);
        assert_eq!(batch.states(), &[5, 6, 1]);
        assert_eq!(batch.boundaries(), &[1, 2]);
    }
}
