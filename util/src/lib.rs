//! Small utilities shared by the phyloflow crates.

mod id_vec;
pub use id_vec::IdVec;

mod timer;
pub use timer::Timer;

/// Fx hashing: fast, and the same iteration order on every run.
pub type Hasher = std::hash::BuildHasherDefault<rustc_hash::FxHasher>;
pub type HashMap<K, V> = std::collections::HashMap<K, V, Hasher>;
pub type HashSet<T> = std::collections::HashSet<T, Hasher>;

/// An empty [`HashMap`] with room for `capacity` entries.
pub fn map_with_capacity<K, V>(capacity: usize) -> HashMap<K, V> {
    HashMap::with_capacity_and_hasher(capacity, Hasher::default())
}

/// An empty [`HashSet`] with room for `capacity` entries.
pub fn set_with_capacity<T>(capacity: usize) -> HashSet<T> {
    HashSet::with_capacity_and_hasher(capacity, Hasher::default())
}
