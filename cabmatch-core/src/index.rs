//! Identifier to position lookups built once per run.

use std::collections::HashMap;
use std::hash::Hash;

/// Injective map from identifiers to their position in an input list.
#[derive(Debug, Clone)]
pub(crate) struct IndexLookup<K> {
    positions: HashMap<K, usize>,
}

impl<K> IndexLookup<K>
where
    K: Eq + Hash + Clone,
{
    /// Index `keys` by position, returning the first repeated key on failure.
    pub(crate) fn try_from_keys<'a, I>(keys: I) -> Result<Self, K>
    where
        I: IntoIterator<Item = &'a K>,
        K: 'a,
    {
        let iter = keys.into_iter();
        let mut positions = HashMap::with_capacity(iter.size_hint().0);
        for (idx, key) in iter.enumerate() {
            if positions.insert(key.clone(), idx).is_some() {
                return Err(key.clone());
            }
        }
        Ok(Self { positions })
    }

    pub(crate) fn position(&self, key: &K) -> Option<usize> {
        self.positions.get(key).copied()
    }

    pub(crate) fn len(&self) -> usize {
        self.positions.len()
    }
}
