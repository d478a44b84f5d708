//! Error cache for the SMO solver
//!
//! Holds `E = output(x) - y` for every non-bound example of the working set,
//! keyed by the example's index. Bound examples have no entry; their error is
//! recomputed from the SVM output when needed.

/// Cached errors indexed by working-set position
#[derive(Debug, Clone, Default)]
pub struct ErrorCache {
    errors: Vec<Option<f64>>,
    len: usize,
}

impl ErrorCache {
    /// Create an empty cache for a working set of `n` examples
    pub fn new(n: usize) -> Self {
        Self {
            errors: vec![None; n],
            len: 0,
        }
    }

    /// Get the cached error for example `i`
    pub fn get(&self, i: usize) -> Option<f64> {
        self.errors.get(i).copied().flatten()
    }

    /// Store the error for example `i`
    ///
    /// # Panics
    /// Panics if `i` is outside the working set the cache was created for
    pub fn put(&mut self, i: usize, error: f64) {
        if self.errors[i].replace(error).is_none() {
            self.len += 1;
        }
    }

    /// Drop the entry for example `i`, if any
    pub fn remove(&mut self, i: usize) {
        if let Some(slot) = self.errors.get_mut(i) {
            if slot.take().is_some() {
                self.len -= 1;
            }
        }
    }

    /// Is there an entry for example `i`?
    pub fn contains(&self, i: usize) -> bool {
        self.get(i).is_some()
    }

    /// Number of cached entries
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Cached entries in index order
    pub fn iter(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.errors
            .iter()
            .enumerate()
            .filter_map(|(i, e)| e.map(|e| (i, e)))
    }

    /// Mutable access to cached entries in index order
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (usize, &mut f64)> + '_ {
        self.errors
            .iter_mut()
            .enumerate()
            .filter_map(|(i, e)| e.as_mut().map(|e| (i, e)))
    }

    /// Index of the entry with the smallest error; the first one on ties
    pub fn argmin(&self) -> Option<usize> {
        self.iter()
            .fold(None, |best: Option<(usize, f64)>, (i, e)| match best {
                Some((_, b)) if b <= e => best,
                _ => Some((i, e)),
            })
            .map(|(i, _)| i)
    }

    /// Index of the entry with the largest error; the first one on ties
    pub fn argmax(&self) -> Option<usize> {
        self.iter()
            .fold(None, |best: Option<(usize, f64)>, (i, e)| match best {
                Some((_, b)) if b >= e => best,
                _ => Some((i, e)),
            })
            .map(|(i, _)| i)
    }
}
