//! A sorted-array mapping between discrete position spaces.
//!
//! Used to translate positions in a rewritten grammar's rule storage back
//! to positions in the storage of the grammar it was rewritten from.

/// A sorted sequence of `(key, value)` pairs. Any key `k` between two
/// recorded keys maps to the preceding pair's value plus the distance from
/// the preceding key, so runs of linearly increasing mappings cost one pair.
#[derive(Clone, Debug, Default)]
pub struct DiscreteMap {
    entries: Vec<(u32, u32)>,
}

impl DiscreteMap {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the mapping `key -> value`.
    ///
    /// The entry is suppressed when linear continuation of the previous
    /// entry already yields `value`.
    ///
    /// # Panics
    ///
    /// Panics unless `key` is greater than every previously recorded key.
    pub fn append_mapping(&mut self, key: u32, value: u32) {
        if let Some(&(last_key, last_value)) = self.entries.last() {
            assert!(key > last_key, "mapping keys must be appended in order");
            if value == last_value + (key - last_key) {
                return;
            }
        }
        self.entries.push((key, value));
    }

    /// Looks the given key up.
    ///
    /// # Panics
    ///
    /// Panics in debug builds when `key` precedes the first recorded key.
    pub fn get(&self, key: u32) -> u32 {
        let idx = self.entries.partition_point(|&(k, _)| k <= key);
        debug_assert!(idx > 0, "key {} precedes the mapped range", key);
        let (k, v) = self.entries[idx - 1];
        v + (key - k)
    }

    /// Returns the number of recorded pairs.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Checks whether no pair was recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
