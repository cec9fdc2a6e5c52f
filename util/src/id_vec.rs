use std::marker::PhantomData;

/// Vec wrapper that uses typed indexes.
///
/// Removed entries leave an empty slot behind, and slots are never reused,
/// so an id that outlives its value simply stops resolving.
#[derive(Debug, Clone)]
pub struct IdVec<K, V> {
    vec: Vec<Option<V>>,
    live: usize,
    _phantom: PhantomData<K>,
}

impl<K, V> Default for IdVec<K, V> {
    fn default() -> Self {
        Self::with_capacity(0)
    }
}

impl<K, V> IdVec<K, V> {
    /// Create a new `IdVec` with the given capacity.
    pub fn with_capacity(cap: usize) -> Self {
        Self {
            vec: Vec::with_capacity(cap),
            live: 0,
            _phantom: PhantomData,
        }
    }

    /// Number of values currently stored (not counting removed slots).
    #[inline]
    pub fn len(&self) -> usize {
        self.live
    }

    /// True if no values are stored.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Iterate through immutable references to stored values
    pub fn values(&self) -> impl Iterator<Item = &V> + '_ {
        self.vec.iter().flatten()
    }

    /// Iterate through mutable references to stored values
    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut V> + '_ {
        self.vec.iter_mut().flatten()
    }

    /// Remove every value. Ids handed out before this call never resolve again.
    pub fn clear(&mut self) {
        for slot in &mut self.vec {
            *slot = None;
        }
        self.live = 0;
    }
}

impl<K: From<usize>, V> IdVec<K, V> {
    /// Id that the next call to `push` will return.
    #[inline]
    pub fn next_id(&self) -> K {
        self.vec.len().into()
    }

    /// Push `v` into the underlying vec, and return an id that can be used to retrieve it later.
    #[inline]
    pub fn push(&mut self, v: V) -> K {
        let id = self.vec.len().into();
        self.vec.push(Some(v));
        self.live += 1;
        id
    }

    /// Iterate through ids and values, in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (K, &V)> + '_ {
        self.vec
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|v| (i.into(), v)))
    }

    /// Ids of all stored values, in insertion order.
    pub fn ids(&self) -> Vec<K> {
        self.iter().map(|(k, _)| k).collect()
    }
}

impl<K: Into<usize>, V> IdVec<K, V> {
    /// Get the value with id `k`, if it is still present.
    #[inline]
    pub fn get(&self, k: K) -> Option<&V> {
        self.vec.get(k.into()).and_then(Option::as_ref)
    }

    /// Get a mutable reference to value with id `k`, if it is still present.
    #[inline]
    pub fn get_mut(&mut self, k: K) -> Option<&mut V> {
        self.vec.get_mut(k.into()).and_then(Option::as_mut)
    }

    /// True if `k` currently resolves to a value.
    #[inline]
    pub fn contains(&self, k: K) -> bool {
        self.get(k).is_some()
    }

    /// Take the value with id `k` out, leaving its slot empty.
    pub fn remove(&mut self, k: K) -> Option<V> {
        let removed = self.vec.get_mut(k.into()).and_then(Option::take);
        if removed.is_some() {
            self.live -= 1;
        }
        removed
    }
}
