//! Random draws for the router and the markup engine.
//!
//! Nothing in the pipeline touches entropy directly; every roll goes
//! through a `RandomService` so hosts can seed it and tests can script it.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::VecDeque;

pub trait RandomService {
    /// Uniform integer in `lo..=hi`.
    ///
    /// `byte_width` caps the draw at the largest value that many bytes can
    /// hold (1 = 255, 2 = 65535, 3 = 16777215). An empty range yields `lo`.
    fn uniform_int(&mut self, byte_width: u8, lo: u32, hi: u32) -> u32;

    /// Sum of `count` rolls of a `faces`-sided die.
    fn dice_roll(&mut self, count: u32, faces: u32) -> u32 {
        (0..count).map(|_| self.uniform_int(1, 1, faces)).sum()
    }

    /// One roll on 1..=100.
    fn percentile(&mut self) -> u32 {
        self.uniform_int(1, 1, 100)
    }
}

/// Largest value representable in `byte_width` bytes.
pub fn width_max(byte_width: u8) -> u32 {
    match byte_width {
        0 => 0,
        1 => 0xFF,
        2 => 0xFFFF,
        3 => 0xFF_FFFF,
        _ => u32::MAX,
    }
}

/// Smallest byte width able to hold `hi`, capped at three bytes.
pub fn byte_width_for(hi: u32) -> u8 {
    if hi > 0xFFFF {
        3
    } else if hi > 0xFF {
        2
    } else {
        1
    }
}

fn bounded(byte_width: u8, lo: u32, hi: u32) -> (u32, u32) {
    let hi = hi.min(width_max(byte_width));
    if lo > hi {
        (lo, lo)
    } else {
        (lo, hi)
    }
}

/// `StdRng`-backed service; deterministic when built from a seed.
pub struct SeededRandom {
    rng: StdRng,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }
}

impl RandomService for SeededRandom {
    fn uniform_int(&mut self, byte_width: u8, lo: u32, hi: u32) -> u32 {
        let (lo, hi) = bounded(byte_width, lo, hi);
        self.rng.gen_range(lo..=hi)
    }
}

/// Replays a fixed queue of values.
///
/// Each value is clamped into the requested range. Once the queue runs dry
/// every draw returns the low end of its range.
#[derive(Debug, Clone, Default)]
pub struct ScriptedRandom {
    queue: VecDeque<u32>,
    drawn: usize,
}

impl ScriptedRandom {
    pub fn new<I: IntoIterator<Item = u32>>(values: I) -> Self {
        Self {
            queue: values.into_iter().collect(),
            drawn: 0,
        }
    }

    pub fn remaining(&self) -> usize {
        self.queue.len()
    }

    /// Number of draws served so far, including ones past the end of the queue.
    pub fn drawn(&self) -> usize {
        self.drawn
    }
}

impl RandomService for ScriptedRandom {
    fn uniform_int(&mut self, byte_width: u8, lo: u32, hi: u32) -> u32 {
        let (lo, hi) = bounded(byte_width, lo, hi);
        self.drawn += 1;
        match self.queue.pop_front() {
            Some(v) => v.clamp(lo, hi),
            None => lo,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_is_deterministic() {
        let mut a = SeededRandom::new(42);
        let mut b = SeededRandom::new(42);
        let xs: Vec<u32> = (0..20).map(|_| a.uniform_int(1, 1, 100)).collect();
        let ys: Vec<u32> = (0..20).map(|_| b.uniform_int(1, 1, 100)).collect();
        assert_eq!(xs, ys);
    }

    #[test]
    fn seeded_stays_in_range() {
        let mut rng = SeededRandom::new(7);
        for _ in 0..1000 {
            let v = rng.uniform_int(1, 3, 9);
            assert!((3..=9).contains(&v));
        }
    }

    #[test]
    fn byte_width_caps_high_end() {
        let mut rng = SeededRandom::new(1);
        for _ in 0..500 {
            assert!(rng.uniform_int(1, 200, 1000) <= 255);
        }
    }

    #[test]
    fn empty_range_returns_low() {
        let mut rng = SeededRandom::new(1);
        assert_eq!(rng.uniform_int(1, 50, 10), 50);
        let mut scripted = ScriptedRandom::new([3]);
        assert_eq!(scripted.uniform_int(1, 50, 10), 50);
    }

    #[test]
    fn scripted_clamps_and_runs_dry() {
        let mut rng = ScriptedRandom::new([150, 0, 42]);
        assert_eq!(rng.uniform_int(1, 1, 100), 100);
        assert_eq!(rng.uniform_int(1, 1, 100), 1);
        assert_eq!(rng.uniform_int(1, 1, 100), 42);
        assert_eq!(rng.remaining(), 0);
        assert_eq!(rng.uniform_int(1, 5, 100), 5);
        assert_eq!(rng.drawn(), 4);
    }

    #[test]
    fn dice_roll_sums_faces() {
        let mut rng = ScriptedRandom::new([2, 5, 6]);
        assert_eq!(rng.dice_roll(3, 6), 13);
    }

    #[test]
    fn width_for_bounds() {
        assert_eq!(byte_width_for(255), 1);
        assert_eq!(byte_width_for(256), 2);
        assert_eq!(byte_width_for(65535), 2);
        assert_eq!(byte_width_for(65536), 3);
    }
}
