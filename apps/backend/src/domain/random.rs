//! Injectable randomness.
//!
//! Question draws, winner picks and join codes all go through
//! [`RandomSource`] so tests can script outcomes.

use std::collections::VecDeque;

use parking_lot::Mutex;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

pub trait RandomSource: Send + Sync {
    /// Uniform index in `0..upper`. `upper` is always > 0.
    fn next_index(&self, upper: usize) -> usize;
}

/// ChaCha-backed source; seeded for reproducible runs, OS entropy otherwise.
pub struct ChaChaSource {
    rng: Mutex<ChaCha8Rng>,
}

impl ChaChaSource {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(s) => ChaCha8Rng::seed_from_u64(s),
            None => ChaCha8Rng::from_os_rng(),
        };
        Self {
            rng: Mutex::new(rng),
        }
    }
}

impl Default for ChaChaSource {
    fn default() -> Self {
        Self::new(None)
    }
}

impl RandomSource for ChaChaSource {
    fn next_index(&self, upper: usize) -> usize {
        if upper <= 1 {
            return 0;
        }
        self.rng.lock().random_range(0..upper)
    }
}

/// Replays a fixed script of indices, each reduced modulo `upper`.
/// Falls back to 0 once the script runs out.
#[derive(Default)]
pub struct ScriptedSource {
    script: Mutex<VecDeque<usize>>,
}

impl ScriptedSource {
    pub fn new(script: impl IntoIterator<Item = usize>) -> Self {
        Self {
            script: Mutex::new(script.into_iter().collect()),
        }
    }

    pub fn push(&self, index: usize) {
        self.script.lock().push_back(index);
    }
}

impl RandomSource for ScriptedSource {
    fn next_index(&self, upper: usize) -> usize {
        if upper == 0 {
            return 0;
        }
        self.script.lock().pop_front().unwrap_or(0) % upper
    }
}

/// Pick `count` distinct items from `items` (partial Fisher-Yates).
/// Returns fewer when `items` is shorter than `count`.
pub fn sample_distinct<T: Clone>(rng: &dyn RandomSource, items: &[T], count: usize) -> Vec<T> {
    let mut pool: Vec<T> = items.to_vec();
    let take = count.min(pool.len());
    for i in 0..take {
        let j = i + rng.next_index(pool.len() - i);
        pool.swap(i, j);
    }
    pool.truncate(take);
    pool
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn seeded_sources_repeat() {
        let a = ChaChaSource::new(Some(7));
        let b = ChaChaSource::new(Some(7));
        let xs: Vec<usize> = (0..16).map(|_| a.next_index(100)).collect();
        let ys: Vec<usize> = (0..16).map(|_| b.next_index(100)).collect();
        assert_eq!(xs, ys);
        assert!(xs.iter().all(|&x| x < 100));
    }

    #[test]
    fn scripted_source_replays_then_defaults() {
        let src = ScriptedSource::new([3, 9]);
        assert_eq!(src.next_index(5), 3);
        assert_eq!(src.next_index(5), 4);
        assert_eq!(src.next_index(5), 0);
    }

    #[test]
    fn sample_distinct_never_repeats() {
        let src = ChaChaSource::new(Some(42));
        let items: Vec<u32> = (0..20).collect();
        let picked = sample_distinct(&src, &items, 8);
        assert_eq!(picked.len(), 8);
        let unique: HashSet<_> = picked.iter().collect();
        assert_eq!(unique.len(), 8);
    }

    #[test]
    fn sample_distinct_caps_at_input_len() {
        let src = ScriptedSource::default();
        let picked = sample_distinct(&src, &[1, 2], 5);
        assert_eq!(picked, vec![1, 2]);
    }
}
