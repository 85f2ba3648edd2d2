//! Deterministic FNV-1a state hashing for replay comparison.

use fixed_point::{Q16, Q48};

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// Folds little-endian integers into a 64-bit FNV-1a hash.
#[derive(Clone, Copy, Debug)]
pub struct StateHasher {
    state: u64,
}

impl StateHasher {
    pub const fn new() -> Self {
        Self { state: FNV_OFFSET }
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.state ^= u64::from(b);
            self.state = self.state.wrapping_mul(FNV_PRIME);
        }
    }

    pub fn write_u8(&mut self, value: u8) {
        self.write_bytes(&[value]);
    }

    pub fn write_u32(&mut self, value: u32) {
        self.write_bytes(&value.to_le_bytes());
    }

    pub fn write_u64(&mut self, value: u64) {
        self.write_bytes(&value.to_le_bytes());
    }

    pub fn write_q16(&mut self, value: Q16) {
        self.write_bytes(&value.raw().to_le_bytes());
    }

    pub fn write_q48(&mut self, value: Q48) {
        self.write_bytes(&value.raw().to_le_bytes());
    }

    pub fn finish(&self) -> u64 {
        self.state
    }
}

/// Types that fold their full state into a [`StateHasher`].
pub trait HashState {
    fn hash_state(&self, hasher: &mut StateHasher);
}

impl<const B: usize> HashState for crate::Histogram<B> {
    fn hash_state(&self, hasher: &mut StateHasher) {
        for &count in self.counts() {
            hasher.write_u32(count);
        }
    }
}

impl Default for StateHasher {
    fn default() -> Self {
        Self::new()
    }
}
