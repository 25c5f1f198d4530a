//! Name interner for qualified type names, type-parameter names and
//! annotation names.
//!
//! Names are interned into a sharded pool and handed around as `Atom`
//! indices, so that comparing two class names is an integer comparison.
//! Qualified names are kept in their internal form (`java/lang/Object`),
//! which is the form every signature and unique key is built from.

use rustc_hash::{FxHashMap, FxHasher};
use serde::Serialize;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, RwLock};

/// An interned name.
///
/// Atoms are cheap to copy and compare. Use [`ShardedInterner::resolve`]
/// to get the text back.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Default, PartialOrd, Ord)]
pub struct Atom(pub u32);

impl Atom {
    /// The empty name.
    pub const NONE: Atom = Atom(0);

    #[inline]
    pub fn is_none(self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub fn index(self) -> u32 {
        self.0
    }
}

const SHARD_BITS: u32 = 4;
const SHARD_COUNT: usize = 1 << SHARD_BITS;
const SHARD_MASK: u32 = (SHARD_COUNT as u32) - 1;

/// Names that nearly every analysis touches.
const COMMON_NAMES: &[&str] = &[
    "java/lang/Object",
    "java/lang/String",
    "java/lang/Number",
    "java/lang/Integer",
    "java/lang/Cloneable",
    "java/io/Serializable",
    "java/lang/Comparable",
    "java/util/List",
    "java/util/Map",
    "java/util/Collection",
    "T",
    "E",
    "K",
    "V",
    "U",
    "R",
    "NonNull",
    "Nullable",
];

#[derive(Default)]
struct ShardState {
    map: FxHashMap<Arc<str>, Atom>,
    strings: Vec<Arc<str>>,
}

struct InternerShard {
    state: RwLock<ShardState>,
}

/// Sharded name interner, safe to share across analysis threads.
pub struct ShardedInterner {
    shards: [InternerShard; SHARD_COUNT],
}

impl ShardedInterner {
    /// Create an interner with the empty name pre-interned as [`Atom::NONE`].
    pub fn new() -> Self {
        let shards: [InternerShard; SHARD_COUNT] = std::array::from_fn(|_| InternerShard {
            state: RwLock::new(ShardState::default()),
        });

        if let Ok(mut state) = shards[0].state.write() {
            let empty: Arc<str> = Arc::from("");
            state.strings.push(empty.clone());
            state.map.insert(empty, Atom::NONE);
        }

        ShardedInterner { shards }
    }

    /// Intern `s`, returning the existing atom when it was seen before.
    pub fn intern(&self, s: &str) -> Atom {
        if s.is_empty() {
            return Atom::NONE;
        }

        let shard_idx = Self::shard_for(s);
        let Ok(mut state) = self.shards[shard_idx].state.write() else {
            return Atom::NONE;
        };

        if let Some(&atom) = state.map.get(s) {
            return atom;
        }

        let local_index = state.strings.len() as u32;
        if local_index > (u32::MAX >> SHARD_BITS) {
            return Atom::NONE;
        }

        let atom = Atom((local_index << SHARD_BITS) | (shard_idx as u32 & SHARD_MASK));
        let owned: Arc<str> = Arc::from(s);
        state.strings.push(owned.clone());
        state.map.insert(owned, atom);
        atom
    }

    /// Resolve an atom. Unknown atoms resolve to the empty string.
    pub fn resolve(&self, atom: Atom) -> Arc<str> {
        self.try_resolve(atom).unwrap_or_else(|| Arc::from(""))
    }

    pub fn try_resolve(&self, atom: Atom) -> Option<Arc<str>> {
        let shard_idx = (atom.0 & SHARD_MASK) as usize;
        let local_index = (atom.0 >> SHARD_BITS) as usize;
        let state = self.shards.get(shard_idx)?.state.read().ok()?;
        state.strings.get(local_index).cloned()
    }

    /// Number of interned names, including the empty name.
    pub fn len(&self) -> usize {
        self.shards
            .iter()
            .map(|shard| shard.state.read().map(|s| s.strings.len()).unwrap_or(0))
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() <= 1
    }

    /// Pre-intern the well-known Java names.
    pub fn intern_common(&self) {
        for name in COMMON_NAMES {
            self.intern(name);
        }
    }

    #[inline]
    fn shard_for(s: &str) -> usize {
        let mut hasher = FxHasher::default();
        s.hash(&mut hasher);
        (hasher.finish() as usize) & (SHARD_COUNT - 1)
    }
}

impl Default for ShardedInterner {
    fn default() -> Self {
        Self::new()
    }
}
