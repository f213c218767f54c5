//! Deterministic random number generation.
//!
//! RULE: Nothing on the desk may call any platform RNG.
//! All randomness flows through DeskRng instances derived
//! from the single master seed the desk was opened with.
//!
//! Each consumer gets its own stream, seeded deterministically
//! from (master_seed XOR stream_index). This means:
//!   - Adding a new stream never changes existing streams.
//!   - Each stream is fully reproducible in isolation.
//!   - Each population generation draws from its own epoch of the
//!     generator stream, so regenerated populations are independent.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64Mcg;
use std::ops::{Range, RangeInclusive};

const STREAM_MIX: u64 = 0x9e37_79b9_7f4a_7c15;
const EPOCH_MIX: u64 = 0xbf58_476d_1ce4_e5b9;

/// A named, deterministic RNG for a single consumer.
pub struct DeskRng {
    pub name: &'static str,
    inner: Pcg64Mcg,
}

impl DeskRng {
    /// Create a stream RNG from the master seed and a stable
    /// stream index. The index must never change once assigned.
    pub fn new(master_seed: u64, stream_index: u64) -> Self {
        let derived_seed = master_seed ^ stream_index.wrapping_mul(STREAM_MIX);
        Self {
            name: "unnamed",
            inner: Pcg64Mcg::seed_from_u64(derived_seed),
        }
    }

    pub fn with_name(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }

    /// Roll a float in [0.0, 1.0).
    pub fn next_f64(&mut self) -> f64 {
        self.inner.gen::<f64>()
    }

    /// Roll a u64 in [0, n).
    pub fn next_u64_below(&mut self, n: u64) -> u64 {
        assert!(n > 0, "n must be > 0");
        self.inner.gen_range(0..n)
    }

    /// Roll an index into a collection of length `len`.
    pub fn pick_index(&mut self, len: usize) -> usize {
        self.next_u64_below(len as u64) as usize
    }

    /// Roll a float in the half-open range `[start, end)`.
    pub fn f64_in(&mut self, range: Range<f64>) -> f64 {
        range.start + self.next_f64() * (range.end - range.start)
    }

    /// Roll an integer in a half-open range. Empty ranges return `start`.
    pub fn i64_in(&mut self, range: Range<i64>) -> i64 {
        if range.is_empty() {
            return range.start;
        }
        self.inner.gen_range(range)
    }

    /// Roll an integer in an inclusive range. Empty ranges return `start`.
    pub fn i64_between(&mut self, range: RangeInclusive<i64>) -> i64 {
        if range.is_empty() {
            return *range.start();
        }
        self.inner.gen_range(range)
    }
}

/// All RNG streams for a single desk, indexed by stable slot.
pub struct RngBank {
    master_seed: u64,
}

impl RngBank {
    pub fn new(master_seed: u64) -> Self {
        Self { master_seed }
    }

    pub fn master_seed(&self) -> u64 {
        self.master_seed
    }

    pub fn for_stream(&self, slot: StreamSlot) -> DeskRng {
        self.for_stream_at(slot, 0)
    }

    /// Stream for a slot at a given epoch. Epoch 0 is identical to
    /// `for_stream`; later epochs are independent of it.
    pub fn for_stream_at(&self, slot: StreamSlot, epoch: u64) -> DeskRng {
        let seed = self.master_seed ^ epoch.wrapping_mul(EPOCH_MIX);
        DeskRng::new(seed, slot as u64).with_name(slot.name())
    }
}

/// Stable stream slot assignments.
/// NEVER reorder or remove entries, only append.
/// Reordering changes every stream's seed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u64)]
pub enum StreamSlot {
    Generator = 0,
    Feed = 1,
    Trend = 2,
}

impl StreamSlot {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Generator => "generator",
            Self::Feed => "feed",
            Self::Trend => "trend",
        }
    }
}
