use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::{Board, CellState, Color};

// ============================================================================
// Spawn Source Trait
// ============================================================================

/// Source of the choices made when new pieces appear.
pub trait SpawnSource {
    /// Returns an index in `0..len`. `len` is never zero.
    fn pick(&mut self, len: usize) -> usize;
}

/// Uniform choices from a standard RNG.
pub struct RandomSource {
    rng: StdRng,
}

impl RandomSource {
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl SpawnSource for RandomSource {
    fn pick(&mut self, len: usize) -> usize {
        self.rng.gen_range(0..len)
    }
}

/// Replays a fixed list of indices, wrapping around at the end.
///
/// Each index is reduced modulo the requested range, so scripts stay valid as
/// the board fills up.
pub struct SequenceSource {
    picks: Vec<usize>,
    index: usize,
}

impl SequenceSource {
    pub fn new(picks: Vec<usize>) -> Self {
        Self { picks, index: 0 }
    }
}

impl SpawnSource for SequenceSource {
    fn pick(&mut self, len: usize) -> usize {
        if self.picks.is_empty() {
            return 0;
        }
        let pick = self.picks[self.index % self.picks.len()];
        self.index += 1;
        pick % len
    }
}

// ============================================================================
// Spawning
// ============================================================================

/// Drops up to `count` pieces on random free cells.
///
/// For each piece a free cell is chosen first, then its color. Returns `false`
/// as soon as a piece has nowhere to go, leaving the pieces placed so far on
/// the board.
pub fn spawn_batch(
    board: &mut Board,
    palette: &[Color],
    source: &mut dyn SpawnSource,
    count: usize,
) -> bool {
    for _ in 0..count {
        let free = board.free_cells();
        if free.is_empty() {
            return false;
        }
        let cell = free[source.pick(free.len())];
        let color = palette[source.pick(palette.len())];
        board.set(cell, CellState::Filled(color));
    }
    true
}
