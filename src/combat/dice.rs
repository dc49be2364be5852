//! Dice rolling system
//!
//! Every random decision in a battle goes through a [`Roller`]:
//! - `d6`: a single six-sided die
//! - `d66`: the sum of two d6 (2..=12, triangular)
//! - `d100_check`: percentage threshold check
//!
//! `range_inclusive` and `pick` exist for the two places that need a
//! uniform integer (weapon-break durability damage and skill-connect
//! candidate choice). Each helper consumes exactly one `random()` draw
//! per die, so replacing `random()` replaces the whole RNG stream.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Highest natural d66 result; an attacker rolling it always hits
pub const NATURAL_MAX: i32 = 12;

/// Source of uniform randomness for combat
pub trait Roller {
    /// Uniform float in `[0, 1)`
    fn random(&mut self) -> f64;

    /// Roll a single d6
    fn d6(&mut self) -> i32 {
        let face = (self.random() * 6.0).floor() as i32;
        face.clamp(0, 5) + 1
    }

    /// Roll 2d6 and sum them
    fn d66(&mut self) -> i32 {
        self.d6() + self.d6()
    }

    /// Roll 1..=100 and succeed when the roll is at or under `threshold`.
    ///
    /// Thresholds at or below 0 never succeed and at or above 100 always
    /// succeed; neither consumes a draw.
    fn d100_check(&mut self, threshold: f64) -> bool {
        if threshold <= 0.0 {
            return false;
        }
        if threshold >= 100.0 {
            return true;
        }
        let roll = ((self.random() * 100.0).floor() as i32).clamp(0, 99) + 1;
        f64::from(roll) <= threshold
    }

    /// Uniform integer in `min..=max` (bounds are swapped if reversed)
    fn range_inclusive(&mut self, min: i32, max: i32) -> i32 {
        let (lo, hi) = if min <= max { (min, max) } else { (max, min) };
        let span = i64::from(hi) - i64::from(lo) + 1;
        let offset = ((self.random() * span as f64).floor() as i64).clamp(0, span - 1);
        (i64::from(lo) + offset) as i32
    }

    /// Uniform index in `0..len`; `len` must be non-zero
    fn pick(&mut self, len: usize) -> usize {
        let idx = (self.random() * len as f64).floor() as usize;
        idx.min(len.saturating_sub(1))
    }
}

impl<R: Roller + ?Sized> Roller for &mut R {
    fn random(&mut self) -> f64 {
        (**self).random()
    }
}

/// Check if a d66 roll is a natural 12
pub fn is_natural_max(roll: i32) -> bool {
    roll == NATURAL_MAX
}

/// [`Roller`] backed by any `rand` generator
#[derive(Debug, Clone)]
pub struct RandRoller<R> {
    rng: R,
}

impl<R: Rng> RandRoller<R> {
    /// Wrap an existing generator
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl RandRoller<StdRng> {
    /// Deterministic roller for replays and tests
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }
}

impl RandRoller<rand::rngs::ThreadRng> {
    /// Roller using the thread-local generator
    pub fn thread() -> Self {
        Self::new(rand::rng())
    }
}

impl<R: Rng> Roller for RandRoller<R> {
    fn random(&mut self) -> f64 {
        self.rng.random::<f64>()
    }
}

/// Replays a fixed sequence of `random()` values, cycling when exhausted
#[derive(Debug, Clone, Default)]
pub struct ScriptedRoller {
    values: Vec<f64>,
    cursor: usize,
    draws: usize,
}

impl ScriptedRoller {
    /// Create a roller from raw `[0, 1)` values
    pub fn new(values: impl Into<Vec<f64>>) -> Self {
        Self {
            values: values.into(),
            cursor: 0,
            draws: 0,
        }
    }

    /// Always return the same value
    pub fn constant(value: f64) -> Self {
        Self::new(vec![value])
    }

    /// Build from d6 faces (each face is one draw)
    pub fn faces(faces: &[i32]) -> Self {
        Self::new(faces.iter().map(|&f| face(f)).collect::<Vec<_>>())
    }

    /// Append one d6 face
    pub fn then_face(mut self, f: i32) -> Self {
        self.values.push(face(f));
        self
    }

    /// Append a d66 total as two faces
    pub fn then_d66(mut self, total: i32) -> Self {
        let (a, b) = split_d66(total);
        self.values.push(face(a));
        self.values.push(face(b));
        self
    }

    /// Append a d100 roll
    pub fn then_percent(mut self, roll: i32) -> Self {
        self.values.push(percent(roll));
        self
    }

    /// Append a raw value
    pub fn then_value(mut self, value: f64) -> Self {
        self.values.push(value);
        self
    }

    /// Number of values consumed so far
    pub fn draws(&self) -> usize {
        self.draws
    }
}

impl Roller for ScriptedRoller {
    fn random(&mut self) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        let value = self.values[self.cursor % self.values.len()];
        self.cursor += 1;
        self.draws += 1;
        value
    }
}

/// Raw value that makes `d6` land on `n`
pub fn face(n: i32) -> f64 {
    (f64::from(n.clamp(1, 6)) - 0.5) / 6.0
}

/// Raw value that makes the d100 roll land on `n`
pub fn percent(n: i32) -> f64 {
    (f64::from(n.clamp(1, 100)) - 0.5) / 100.0
}

/// Split a 2..=12 total into two faces
pub fn split_d66(total: i32) -> (i32, i32) {
    let total = total.clamp(2, 12);
    let first = (total - 1).min(6);
    (first, total - first)
}
