//! Scripted random draws for exact scheduler tests.

use stormrunner_core::RandomSource;

/// [`RandomSource`] that replays a fixed list of draws, cycling when exhausted.
///
/// Draws are clamped into `[0, 1)`.
#[derive(Debug, Clone)]
pub struct ScriptedRandom {
    draws: Vec<f32>,
    cursor: usize,
}

impl ScriptedRandom {
    /// Replay `draws` in order. Panics if `draws` is empty.
    pub fn new(draws: &[f32]) -> Self {
        assert!(!draws.is_empty(), "ScriptedRandom needs at least one draw");
        let draws = draws
            .iter()
            .map(|d| d.clamp(0.0, 1.0 - f32::EPSILON))
            .collect();
        Self { draws, cursor: 0 }
    }

    /// Number of draws consumed so far.
    pub fn taken(&self) -> usize {
        self.cursor
    }
}

impl RandomSource for ScriptedRandom {
    fn next_unit(&mut self) -> f32 {
        let value = self.draws[self.cursor % self.draws.len()];
        self.cursor += 1;
        value
    }
}
