//! Swappable randomness for adverse-weather sampling and fault injection.
//!
//! Everything random in the dispatch loop draws from a [`RandomSource`].  The
//! production source is [`SimRng`], a seeded `SmallRng`, so the same seed
//! always replays the same run.  Tests use [`ScriptedRandom`] to force a
//! specific sequence of draws.

use std::collections::VecDeque;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// A source of uniform draws.
///
/// `Send` so the dispatcher can move behind a mutex shared with the
/// scheduler's tasks.
pub trait RandomSource: Send {
    /// A uniform value in `[0, 1)`.
    fn next_f64(&mut self) -> f64;

    /// A uniform index in `0..len`.  `len` must be non-zero.
    fn pick_index(&mut self, len: usize) -> usize;

    /// `true` with probability `p` (clamped to [0, 1]).
    fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p.clamp(0.0, 1.0)
    }
}

impl<R: RandomSource + ?Sized> RandomSource for Box<R> {
    fn next_f64(&mut self) -> f64 {
        (**self).next_f64()
    }

    fn pick_index(&mut self, len: usize) -> usize {
        (**self).pick_index(len)
    }
}

// ── SimRng ────────────────────────────────────────────────────────────────────

/// Seeded simulation RNG.
pub struct SimRng(SmallRng);

impl SimRng {
    pub fn new(seed: u64) -> Self {
        SimRng(SmallRng::seed_from_u64(seed))
    }
}

impl RandomSource for SimRng {
    #[inline]
    fn next_f64(&mut self) -> f64 {
        self.0.r#gen::<f64>()
    }

    #[inline]
    fn pick_index(&mut self, len: usize) -> usize {
        self.0.gen_range(0..len)
    }
}

// ── ScriptedRandom ────────────────────────────────────────────────────────────

/// Replays a fixed list of draws, then repeats `fallback` forever.
///
/// `pick_index` consumes one draw `u` and maps it to `floor(u * len)`.
#[derive(Debug, Clone)]
pub struct ScriptedRandom {
    draws:    VecDeque<f64>,
    fallback: f64,
}

impl ScriptedRandom {
    pub fn new(draws: impl IntoIterator<Item = f64>, fallback: f64) -> Self {
        Self {
            draws: draws.into_iter().collect(),
            fallback,
        }
    }

    /// A source that always returns `value`.
    pub fn constant(value: f64) -> Self {
        Self::new([], value)
    }

    /// Draws left before the fallback kicks in.
    pub fn remaining(&self) -> usize {
        self.draws.len()
    }
}

impl RandomSource for ScriptedRandom {
    fn next_f64(&mut self) -> f64 {
        self.draws.pop_front().unwrap_or(self.fallback)
    }

    fn pick_index(&mut self, len: usize) -> usize {
        let u = self.next_f64().clamp(0.0, 1.0);
        ((u * len as f64) as usize).min(len.saturating_sub(1))
    }
}
