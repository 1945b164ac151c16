use std::collections::{HashMap, HashSet};

use ahash::RandomState;
use indexmap::IndexMap;
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::vectorizer::bow::BowVector;

/// Corpus statistics of one vocabulary entry
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenStats {
    /// number of distinct documents containing the token
    pub doc_freq: u64,
    /// raw number of occurrences across the corpus
    pub collection_freq: u64,
}

/// Vocabulary pruning rules, applied in field order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PruneConfig {
    /// drop tokens present in more than this share of the documents that
    /// have at least one token
    pub no_above: f64,
    /// drop tokens present in exactly one document
    pub drop_singletons: bool,
    /// drop tokens present in fewer documents than this
    pub no_below: Option<u64>,
    /// keep only this many tokens, highest document frequency first
    pub keep_n: Option<usize>,
}

impl Default for PruneConfig {
    fn default() -> Self {
        Self {
            no_above: 0.8,
            drop_singletons: true,
            no_below: None,
            keep_n: None,
        }
    }
}

impl PruneConfig {
    /// Keep every token
    pub fn none() -> Self {
        Self {
            no_above: 1.0,
            drop_singletons: false,
            no_below: None,
            keep_n: None,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.no_above > 0.0 && self.no_above <= 1.0) {
            return Err(ConfigError::InvalidRatio(self.no_above));
        }
        Ok(())
    }
}

/// Single-pass accumulator for vocabulary construction
///
/// Ids are handed out in order of first appearance, so for a fixed
/// document order the result is deterministic.
#[derive(Debug, Default)]
pub struct VocabularyBuilder {
    tokens: IndexMap<String, TokenStats, RandomState>,
    num_docs: u64,
    num_nonempty_docs: u64,
    num_pos: u64,
    num_nnz: u64,
}

impl VocabularyBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Account for one document given as its full token list
    pub fn add_document<S: AsRef<str>>(&mut self, tokens: &[S]) {
        let mut seen: HashSet<usize, RandomState> = HashSet::default();
        for token in tokens {
            let token = token.as_ref();
            let idx = match self.tokens.get_index_of(token) {
                Some(idx) => idx,
                None => self.tokens.insert_full(token.to_string(), TokenStats::default()).0,
            };
            let stats = &mut self.tokens[idx];
            stats.collection_freq += 1;
            if seen.insert(idx) {
                stats.doc_freq += 1;
            }
        }
        self.num_docs += 1;
        if !tokens.is_empty() {
            self.num_nonempty_docs += 1;
        }
        self.num_pos += tokens.len() as u64;
        self.num_nnz += seen.len() as u64;
    }

    pub fn num_docs(&self) -> u64 {
        self.num_docs
    }

    /// Documents with at least one token, the ratio rule's denominator
    pub fn num_nonempty_docs(&self) -> u64 {
        self.num_nonempty_docs
    }

    /// Stop accumulating, prune and compact
    pub fn finish(self, prune: &PruneConfig) -> Vocabulary {
        let mut vocab = Vocabulary {
            tokens: self.tokens,
            num_docs: self.num_docs,
            num_nonempty_docs: self.num_nonempty_docs,
            num_pos: self.num_pos,
            num_nnz: self.num_nnz,
        };
        vocab.prune(prune);
        vocab
    }
}

/// Frozen token <-> id bijection with document statistics
///
/// A token's id is its position, so ids are always `0..len()`.
/// Removing tokens shifts the survivors down while keeping their relative
/// order: the survivor with the smaller old id gets the smaller new id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Vocabulary {
    #[serde(with = "indexmap::map::serde_seq")]
    tokens: IndexMap<String, TokenStats, RandomState>,
    num_docs: u64,
    num_nonempty_docs: u64,
    num_pos: u64,
    num_nnz: u64,
}

/// construction and pruning
impl Vocabulary {
    /// Build and prune from per-document token lists
    pub fn build<I, D, S>(documents: I, prune: &PruneConfig) -> Self
    where
        I: IntoIterator<Item = D>,
        D: AsRef<[S]>,
        S: AsRef<str>,
    {
        let mut builder = VocabularyBuilder::new();
        for doc in documents {
            builder.add_document(doc.as_ref());
        }
        builder.finish(prune)
    }

    /// Apply the pruning rules of `config`
    ///
    /// The ratio rule divides by the number of documents with at least one
    /// token, so documents without tokens leave other tokens' pruning
    /// unchanged. It is skipped when there are none.
    pub fn prune(&mut self, config: &PruneConfig) {
        let before = self.len();
        let num_docs = self.num_nonempty_docs;

        if num_docs > 0 {
            let removed = self.filter_tokens(|_, stats| stats.doc_freq as f64 / num_docs as f64 > config.no_above);
            debug!("dropped {} tokens above document ratio {}", removed, config.no_above);
        }
        if let Some(no_below) = config.no_below {
            let removed = self.filter_tokens(|_, stats| stats.doc_freq < no_below);
            debug!("dropped {} tokens below {} documents", removed, no_below);
        }
        if config.drop_singletons {
            let removed = self.filter_tokens(|_, stats| stats.doc_freq == 1);
            debug!("dropped {} single-document tokens", removed);
        }
        if let Some(keep_n) = config.keep_n {
            let removed = self.keep_most_common(keep_n);
            debug!("dropped {} tokens beyond the {} most common", removed, keep_n);
        }
        info!("vocabulary pruned from {} to {} tokens", before, self.len());
    }

    /// Remove every token for which `remove` returns true, then compact.
    ///
    /// # Returns
    /// * `usize` - number of tokens removed
    pub fn filter_tokens<F>(&mut self, mut remove: F) -> usize
    where
        F: FnMut(&str, &TokenStats) -> bool,
    {
        let before = self.tokens.len();
        self.tokens.retain(|token, stats| !remove(token, stats));
        before - self.tokens.len()
    }

    /// Keep the `n` tokens with the highest document frequency,
    /// ties broken by the smaller id
    fn keep_most_common(&mut self, n: usize) -> usize {
        if self.tokens.len() <= n {
            return 0;
        }
        let mut order: Vec<usize> = (0..self.tokens.len()).collect();
        order.sort_by(|&a, &b| self.tokens[b].doc_freq.cmp(&self.tokens[a].doc_freq).then(a.cmp(&b)));
        let mut keep = vec![false; self.tokens.len()];
        for &idx in order.iter().take(n) {
            keep[idx] = true;
        }
        let mut idx = 0;
        self.filter_tokens(|_, _| {
            let drop = !keep[idx];
            idx += 1;
            drop
        })
    }
}

/// lookup
impl Vocabulary {
    #[inline]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Documents seen while building
    #[inline]
    pub fn num_docs(&self) -> u64 {
        self.num_docs
    }

    /// Documents with at least one token, the ratio rule's denominator
    pub fn num_nonempty_docs(&self) -> u64 {
        self.num_nonempty_docs
    }

    /// Tokens processed while building, before pruning
    #[inline]
    pub fn num_pos(&self) -> u64 {
        self.num_pos
    }

    /// Sum over documents of distinct tokens, before pruning
    #[inline]
    pub fn num_nnz(&self) -> u64 {
        self.num_nnz
    }

    #[inline]
    pub fn contains(&self, token: &str) -> bool {
        self.tokens.contains_key(token)
    }

    #[inline]
    pub fn token_to_id(&self, token: &str) -> Option<u32> {
        self.tokens.get_index_of(token).map(|idx| idx as u32)
    }

    #[inline]
    pub fn id_to_token(&self, id: u32) -> Option<&str> {
        self.tokens.get_index(id as usize).map(|(token, _)| token.as_str())
    }

    #[inline]
    pub fn stats(&self, id: u32) -> Option<TokenStats> {
        self.tokens.get_index(id as usize).map(|(_, stats)| *stats)
    }

    #[inline]
    pub fn doc_freq(&self, id: u32) -> Option<u64> {
        self.stats(id).map(|stats| stats.doc_freq)
    }

    #[inline]
    pub fn collection_freq(&self, id: u32) -> Option<u64> {
        self.stats(id).map(|stats| stats.collection_freq)
    }

    /// `(id, token, stats)` in id order
    pub fn iter(&self) -> impl Iterator<Item = (u32, &str, TokenStats)> + '_ {
        self.tokens
            .iter()
            .enumerate()
            .map(|(idx, (token, stats))| (idx as u32, token.as_str(), *stats))
    }

    /// The `n` tokens with the highest document frequency, ties by id
    pub fn most_common(&self, n: usize) -> Vec<(&str, u64)> {
        let mut list: Vec<(u32, &str, u64)> = self.iter().map(|(id, token, stats)| (id, token, stats.doc_freq)).collect();
        list.sort_by(|a, b| b.2.cmp(&a.2).then(a.0.cmp(&b.0)));
        list.into_iter().take(n).map(|(_, token, df)| (token, df)).collect()
    }

    /// Count known tokens, unknown tokens are dropped
    pub fn doc2bow<S: AsRef<str>>(&self, tokens: &[S]) -> BowVector {
        let mut counts: HashMap<u32, u32, RandomState> = HashMap::default();
        for id in tokens.iter().filter_map(|token| self.token_to_id(token.as_ref())) {
            *counts.entry(id).or_insert(0) += 1;
        }
        BowVector::from_counts(counts)
    }

    /// Id of each token, `None` for unknown tokens
    pub fn doc2idx<S: AsRef<str>>(&self, tokens: &[S]) -> Vec<Option<u32>> {
        tokens.iter().map(|token| self.token_to_id(token.as_ref())).collect()
    }
}
