use crate::error::StoreError;

/// Chaining hash table keyed by small non-negative integers.
///
/// Every bucket is a (possibly empty) chain of `(key, value)` entries and the
/// bucket for a key is `key % bucket_count`. Location and package data are
/// both stored in one of these.
#[derive(Debug, Clone)]
pub struct ChainingTable<V> {
    buckets: Vec<Vec<(usize, V)>>,
    len: usize,
}

impl<V> ChainingTable<V> {
    /// Create a table with `bucket_count` empty chains (at least one).
    pub fn new(bucket_count: usize) -> Self {
        let bucket_count = bucket_count.max(1);
        let mut buckets = Vec::with_capacity(bucket_count);
        buckets.resize_with(bucket_count, Vec::new);
        Self { buckets, len: 0 }
    }

    fn bucket_of(&self, key: usize) -> usize {
        key % self.buckets.len()
    }

    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Insert or replace the value stored under `key`.
    ///
    /// Returns the previous value when the key was already present.
    pub fn insert(&mut self, key: usize, value: V) -> Option<V> {
        let bucket = self.bucket_of(key);
        let chain = &mut self.buckets[bucket];

        if let Some(entry) = chain.iter_mut().find(|(k, _)| *k == key) {
            return Some(std::mem::replace(&mut entry.1, value));
        }

        chain.push((key, value));
        self.len += 1;
        None
    }

    pub fn lookup(&self, key: usize) -> Option<&V> {
        self.buckets[self.bucket_of(key)]
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v)
    }

    pub fn lookup_mut(&mut self, key: usize) -> Option<&mut V> {
        let bucket = self.bucket_of(key);
        self.buckets[bucket]
            .iter_mut()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: usize) -> bool {
        self.lookup(key).is_some()
    }

    /// Apply `edit` to the value stored under `key`.
    ///
    /// The closure picks which field of the value it rewrites. An absent key is
    /// reported as [`StoreError::KeyNotFound`] and nothing is touched.
    pub fn update<F>(&mut self, key: usize, edit: F) -> Result<(), StoreError>
    where
        F: FnOnce(&mut V),
    {
        match self.lookup_mut(key) {
            Some(value) => {
                edit(value);
                Ok(())
            }
            None => Err(StoreError::KeyNotFound { key }),
        }
    }

    /// Delete the entry for `key`. Returns `false` if there was none.
    pub fn remove(&mut self, key: usize) -> bool {
        let bucket = self.bucket_of(key);
        let chain = &mut self.buckets[bucket];

        match chain.iter().position(|(k, _)| *k == key) {
            Some(pos) => {
                chain.remove(pos);
                self.len -= 1;
                true
            }
            None => false,
        }
    }

    /// All keys in ascending order.
    pub fn keys(&self) -> Vec<usize> {
        let mut keys: Vec<usize> = self.iter().map(|(k, _)| k).collect();
        keys.sort_unstable();
        keys
    }

    /// Entries in bucket order, then insertion order within a chain.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &V)> {
        self.buckets
            .iter()
            .flat_map(|chain| chain.iter().map(|(k, v)| (*k, v)))
    }
}
