//! Applicant name selection from a fixed pool.
//!
//! All selection is deterministic (same RNG seed = same names).

use crate::rng::DeskRng;

/// The reference pool. Names repeat across a population by design of the
/// data set; ids, not names, identify records.
pub fn default_name_pool() -> Vec<String> {
    [
        "John Smith",
        "Sarah Johnson",
        "Michael Brown",
        "Emily Davis",
        "David Wilson",
        "Jessica Garcia",
        "Robert Miller",
        "Ashley Martinez",
        "Christopher Lopez",
        "Amanda Anderson",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

/// Uniform picker over a borrowed pool of display names.
pub struct NameGenerator<'a> {
    pool: &'a [String],
}

impl<'a> NameGenerator<'a> {
    /// `pool` must be non-empty; `DeskConfig::validate` enforces it.
    pub fn new(pool: &'a [String]) -> Self {
        Self { pool }
    }

    pub fn pick(&self, rng: &mut DeskRng) -> &'a str {
        match self.pool.len() {
            0 => "",
            len => &self.pool[rng.pick_index(len)],
        }
    }
}
