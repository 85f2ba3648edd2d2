//! Aggregation helpers: wide means and ratio histograms.

use fixed_point::{Q16, Q48, FRAC_BITS};
use serde::{Serialize, Serializer};

/// Maps a ratio onto `bins` buckets as `floor(clamp01(ratio) * (bins - 1))`,
/// clamped to the last bucket.
pub fn hist_bin(ratio: Q16, bins: usize) -> usize {
    if bins == 0 {
        return 0;
    }
    let clamped = ratio.clamp01().raw() as u64;
    let scaled = (clamped * (bins as u64 - 1)) >> FRAC_BITS;
    (scaled as usize).min(bins - 1)
}

/// Running mean of unit ratios using a q48.16 accumulator.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WideMean {
    sum: Q48,
    count: u32,
}

impl WideMean {
    pub fn push(&mut self, value: Q16) {
        self.sum = self.sum.saturating_add(value.widen());
        self.count = self.count.saturating_add(1);
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    /// Mean narrowed back to q16.16 and clamped to `[0, ONE]`; zero when empty.
    pub fn mean(&self) -> Q16 {
        self.sum.div_int(u64::from(self.count)).narrow().clamp01()
    }
}

/// Fixed-bin counter histogram.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Histogram<const B: usize>([u32; B]);

impl<const B: usize> Histogram<B> {
    pub const fn new() -> Self {
        Self([0; B])
    }

    /// Counts a ratio in the bucket chosen by [`hist_bin`].
    pub fn record_ratio(&mut self, ratio: Q16) {
        self.record_index(hist_bin(ratio, B));
    }

    /// Counts directly into a bucket; out-of-range indices are ignored.
    pub fn record_index(&mut self, index: usize) {
        if let Some(slot) = self.0.get_mut(index) {
            *slot = slot.saturating_add(1);
        }
    }

    pub fn counts(&self) -> &[u32; B] {
        &self.0
    }

    pub fn total(&self) -> u64 {
        self.0.iter().map(|&c| u64::from(c)).sum()
    }
}

impl<const B: usize> Default for Histogram<B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const B: usize> Serialize for Histogram<B> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.0.iter())
    }
}
