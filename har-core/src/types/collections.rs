//! Fast hash-map/set aliases used throughout the pipeline.
//!
//! Plain `rustc_hash::FxHashMap` — entry counts are small (hundreds, not
//! millions) so we don't need anything fancier than a non-cryptographic hasher.

pub type FxHashMap<K, V> = std::collections::HashMap<K, V, rustc_hash::FxBuildHasher>;
pub type FxHashSet<T> = std::collections::HashSet<T, rustc_hash::FxBuildHasher>;
