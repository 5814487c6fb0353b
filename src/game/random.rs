use rand::Rng;

const MULTIPLIER: u32 = 0x015A_4E35;

/// The linear congruential generator behind the `random` opcode. Games rely
/// on reseeding it with a fixed value to get repeatable sequences.
#[derive(Debug, Clone)]
pub struct ZRandom {
    state: u32,
}

impl ZRandom {
    /// Seed from the configured value, or from the thread RNG.
    pub fn new(seed: Option<u32>) -> ZRandom {
        let state = seed.unwrap_or_else(|| rand::thread_rng().gen());
        ZRandom { state }
    }

    pub fn seed(&mut self, seed: u32) {
        self.state = seed;
    }

    /// A value uniformly in 1..=range. `range` must be positive.
    pub fn next(&mut self, range: u16) -> u16 {
        self.state = self.state.wrapping_mul(MULTIPLIER).wrapping_add(1);
        let value = ((self.state >> 16) & 0x7fff) as u16;
        value % range.max(1) + 1
    }
}
