//! Reward-to-go and regression targets over a flattened batch.
//!
//! All functions operate on per-position slices of a
//! [`TrajectoryBatch`](crate::replay_memory::TrajectoryBatch) and use its
//! boundary flags to keep trajectories apart.

/// Added to the standard deviation in [`normalize`].
pub const NORMALIZE_EPS: f32 = 1e-7;

/// Replaces rewards with their discounted reward-to-go, in place.
///
/// A single backward sweep. At the last step of every trajectory the
/// accumulator restarts from `punishment`, i.e. every trajectory is treated as
/// an episode that ended in a loss, whatever its observed terminal reward.
/// Then `acc = acc * discount + reward * incentive` is stored at the position.
pub fn reward_to_go(
    rewards: &mut [f32],
    is_boundary: &[bool],
    discount: f32,
    punishment: f32,
    incentive: f32,
) {
    debug_assert_eq!(rewards.len(), is_boundary.len());
    let mut acc = 0f32;
    for i in (0..rewards.len()).rev() {
        if is_boundary[i] {
            acc = punishment;
        }
        acc = acc * discount + rewards[i] * incentive;
        rewards[i] = acc;
    }
}

/// Standardizes values in place with their batch mean and standard deviation.
///
/// The standard deviation is the sample (n - 1) estimate, taken as zero for
/// fewer than two values. [`NORMALIZE_EPS`] keeps a zero-variance batch finite.
pub fn normalize(values: &mut [f32]) {
    let n = values.len();
    if n == 0 {
        return;
    }
    let mean = values.iter().sum::<f32>() / n as f32;
    let std = if n < 2 {
        0.0
    } else {
        let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f32>() / (n - 1) as f32;
        var.sqrt()
    };
    let denom = std + NORMALIZE_EPS;
    values.iter_mut().for_each(|v| *v = (*v - mean) / denom);
}

/// Builds the Q-learning regression targets.
///
/// `returns[i] + gamma * max_next[i]` inside a trajectory and `returns[i]`
/// alone at a boundary, where there is no next state to bootstrap from.
pub fn bootstrap_targets(
    returns: &[f32],
    max_next: &[f32],
    gamma: f32,
    is_boundary: &[bool],
) -> Vec<f32> {
    debug_assert_eq!(returns.len(), max_next.len());
    debug_assert_eq!(returns.len(), is_boundary.len());
    returns
        .iter()
        .zip(max_next.iter())
        .zip(is_boundary.iter())
        .map(|((r, q), b)| if *b { *r } else { r + gamma * q })
        .collect()
}
