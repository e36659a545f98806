//! Bounded FIFO memory of trajectories.
use super::{ReplayMemoryConfig, Trajectory, TrajectoryBatch};
use rand::{rngs::SmallRng, seq::index, SeedableRng};
use std::collections::VecDeque;

/// A fixed-capacity, insertion-ordered collection of trajectories.
///
/// Inserting into a full memory evicts the oldest trajectory first, so
/// `len() <= capacity()` always holds. Sampling reads trajectories without
/// removing them.
pub struct ReplayMemory<S> {
    capacity: usize,
    trajectories: VecDeque<Trajectory<S>>,
    rng: SmallRng,
}

impl<S> ReplayMemory<S> {
    /// Builds an empty memory.
    pub fn build(config: &ReplayMemoryConfig) -> Self {
        Self {
            capacity: config.capacity,
            trajectories: VecDeque::with_capacity(config.capacity),
            rng: SmallRng::seed_from_u64(config.seed),
        }
    }

    /// Inserts a trajectory, evicting the oldest one if the memory is full.
    pub fn insert(&mut self, trajectory: Trajectory<S>) {
        if self.capacity == 0 {
            return;
        }
        if self.trajectories.len() == self.capacity {
            self.trajectories.pop_front();
        }
        self.trajectories.push_back(trajectory);
    }

    /// Samples up to `k` distinct trajectories uniformly at random.
    ///
    /// If `k` exceeds the number of stored trajectories, every trajectory is
    /// returned (in random order). An empty memory yields an empty sample.
    pub fn sample(&mut self, k: usize) -> Vec<&Trajectory<S>> {
        let n = self.trajectories.len();
        let k = k.min(n);
        index::sample(&mut self.rng, n, k)
            .into_iter()
            .map(|ix| &self.trajectories[ix])
            .collect()
    }

    /// The number of stored trajectories.
    pub fn len(&self) -> usize {
        self.trajectories.len()
    }

    /// The number of stored trajectories.
    pub fn size(&self) -> usize {
        self.len()
    }

    /// Returns `true` if no trajectory is stored.
    pub fn is_empty(&self) -> bool {
        self.trajectories.is_empty()
    }

    /// The maximum number of trajectories.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Iterates over the trajectories from the oldest to the newest.
    pub fn iter(&self) -> impl Iterator<Item = &Trajectory<S>> {
        self.trajectories.iter()
    }
}

impl<S: Clone> ReplayMemory<S> {
    /// Samples up to `size` trajectories and flattens them into a batch.
    ///
    /// Returns `None` if the memory is empty.
    pub fn batch(&mut self, size: usize) -> Option<TrajectoryBatch<S>> {
        if self.is_empty() || size == 0 {
            return None;
        }
        let sampled = self.sample(size);
        Some(TrajectoryBatch::assemble(&sampled))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Step;
    use std::collections::HashSet;

    /// A trajectory whose states are all `id` and whose length is `len`.
    fn trajectory(id: usize, len: usize) -> Trajectory<usize> {
        let steps = (0..len)
            .map(|_| Step {
                state: id,
                action: 0,
                reward: 0.0,
            })
            .collect();
        Trajectory::new(steps, id).unwrap()
    }

    fn memory(capacity: usize) -> ReplayMemory<usize> {
        ReplayMemory::build(&ReplayMemoryConfig::default().capacity(capacity))
    }

    #[test]
    fn test_capacity_and_eviction_order() {
        let capacity = 4;
        let mut memory = memory(capacity);
        for id in 0..=capacity {
            memory.insert(trajectory(id, 1));
            assert!(memory.len() <= capacity);
        }
        let ids = memory.iter().map(|t| *t.final_state()).collect::<Vec<_>>();
        assert_eq!(ids, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_lengths_after_eviction() {
        let mut memory = memory(3);
        for (id, len) in [2, 5, 1, 4].into_iter().enumerate() {
            memory.insert(trajectory(id, len));
        }
        let lens = memory.iter().map(|t| t.len()).collect::<Vec<_>>();
        assert_eq!(lens, vec![5, 1, 4]);
    }

    #[test]
    fn test_sample_clamps_without_duplicates() {
        let mut memory = memory(10);
        for id in 0..5 {
            memory.insert(trajectory(id, 1));
        }
        let sampled = memory.sample(8);
        assert_eq!(sampled.len(), 5);
        let ids = sampled
            .iter()
            .map(|t| *t.final_state())
            .collect::<HashSet<_>>();
        assert_eq!(ids.len(), 5);

        assert_eq!(memory.sample(3).len(), 3);
        assert_eq!(memory.len(), 5);
    }

    #[test]
    fn test_empty_memory() {
        let mut memory = memory(3);
        assert!(memory.sample(4).is_empty());
        assert!(memory.batch(4).is_none());
    }

    #[test]
    fn test_sample_is_roughly_uniform() {
        let mut memory = memory(4);
        for id in 0..4 {
            memory.insert(trajectory(id, 1));
        }
        let mut counts = [0usize; 4];
        for _ in 0..4000 {
            for t in memory.sample(1) {
                counts[*t.final_state()] += 1;
            }
        }
        for c in counts {
            assert!(c > 800 && c < 1200, "{:?}", counts);
        }
    }
}
