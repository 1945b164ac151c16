use std::collections::HashMap;

use ahash::RandomState;
use serde::{Deserialize, Serialize};

/// Sparse bag-of-words vector
/// `(token id, count)` pairs sorted by id, zero counts are never stored.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BowVector {
    entries: Vec<(u32, u32)>,
}

impl BowVector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from an id -> count table
    pub(crate) fn from_counts(counts: HashMap<u32, u32, RandomState>) -> Self {
        let mut entries: Vec<(u32, u32)> = counts.into_iter().filter(|&(_, count)| count > 0).collect();
        entries.sort_unstable_by_key(|&(id, _)| id);
        Self { entries }
    }

    /// Build from arbitrary `(id, count)` pairs, summing duplicates
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (u32, u32)>,
    {
        let mut counts: HashMap<u32, u32, RandomState> = HashMap::default();
        for (id, count) in pairs {
            *counts.entry(id).or_insert(0) += count;
        }
        Self::from_counts(counts)
    }

    /// Number of distinct ids
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Count of `id`, 0 if absent
    #[inline]
    pub fn get(&self, id: u32) -> u32 {
        match self.entries.binary_search_by_key(&id, |&(i, _)| i) {
            Ok(pos) => self.entries[pos].1,
            Err(_) => 0,
        }
    }

    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, (u32, u32)> {
        self.entries.iter()
    }

    #[inline]
    pub fn as_slice(&self) -> &[(u32, u32)] {
        &self.entries
    }

    pub fn ids(&self) -> impl Iterator<Item = u32> + '_ {
        self.entries.iter().map(|&(id, _)| id)
    }

    /// Sum of all counts
    pub fn total(&self) -> u64 {
        self.entries.iter().map(|&(_, count)| count as u64).sum()
    }

    /// Dense counts of length `dim`, ids at or past `dim` are ignored
    pub fn to_dense(&self, dim: usize) -> Vec<u32> {
        let mut dense = vec![0; dim];
        for &(id, count) in &self.entries {
            if let Some(slot) = dense.get_mut(id as usize) {
                *slot = count;
            }
        }
        dense
    }
}

impl From<BowVector> for Vec<(u32, u32)> {
    fn from(vec: BowVector) -> Self {
        vec.entries
    }
}

impl<'a> IntoIterator for &'a BowVector {
    type Item = &'a (u32, u32);
    type IntoIter = std::slice::Iter<'a, (u32, u32)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
