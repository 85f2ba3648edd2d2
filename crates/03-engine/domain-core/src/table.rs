//! Fixed-capacity entity storage.

/// Inline array of `N` records plus a live count.
///
/// Capacity is fixed at compile time. Inserting past it is refused rather
/// than growing, and bulk loads silently keep the first `N` rows.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BoundedTable<T: Copy + Default, const N: usize> {
    rows: [T; N],
    len: usize,
}

impl<T: Copy + Default, const N: usize> BoundedTable<T, N> {
    /// Creates an empty table with every slot defaulted.
    pub fn new() -> Self {
        Self {
            rows: [T::default(); N],
            len: 0,
        }
    }

    /// Copies at most `N` rows from `src`; the rest are dropped.
    pub fn from_slice_truncating(src: &[T]) -> Self {
        let mut table = Self::new();
        table.load_truncating(src);
        table
    }

    /// Replaces the contents with at most `N` rows from `src`. Returns the
    /// number of rows dropped.
    pub fn load_truncating(&mut self, src: &[T]) -> usize {
        self.rows = [T::default(); N];
        let take = src.len().min(N);
        self.rows[..take].copy_from_slice(&src[..take]);
        self.len = take;
        src.len() - take
    }

    /// Appends a row; returns `false` when the table is full.
    pub fn push(&mut self, row: T) -> bool {
        if self.len == N {
            return false;
        }
        self.rows[self.len] = row;
        self.len += 1;
        true
    }

    /// Removes the row at `index` by moving the last row into its slot.
    /// Row order is not preserved.
    pub fn swap_remove(&mut self, index: usize) -> Option<T> {
        if index >= self.len {
            return None;
        }
        let removed = self.rows[index];
        self.len -= 1;
        self.rows[index] = self.rows[self.len];
        self.rows[self.len] = T::default();
        Some(removed)
    }

    /// Drops every live row. Storage is retained.
    pub fn clear(&mut self) {
        self.rows = [T::default(); N];
        self.len = 0;
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_full(&self) -> bool {
        self.len == N
    }

    pub const fn capacity(&self) -> usize {
        N
    }

    pub fn as_slice(&self) -> &[T] {
        &self.rows[..self.len]
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.rows[..self.len]
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.as_slice().get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.as_mut_slice().get_mut(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.as_slice().iter()
    }

    /// Index of the first live row matching `pred`.
    pub fn position(&self, pred: impl FnMut(&T) -> bool) -> Option<usize> {
        self.as_slice().iter().position(pred)
    }
}

impl<T: Copy + Default, const N: usize> Default for BoundedTable<T, N> {
    fn default() -> Self {
        Self::new()
    }
}
