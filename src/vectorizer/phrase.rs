use std::collections::HashMap;

use ahash::RandomState;
use indexmap::IndexMap;
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::vectorizer::{source::SentenceSource, token::TokenFrequency};

/// Phrase detection parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhraseConfig {
    /// pairs seen fewer times than this are never merged,
    /// also subtracted from the pair count when scoring
    pub min_count: u64,
    /// minimum score for a pair to be merged
    pub threshold: f64,
    /// joins the two halves of a merged pair
    pub delimiter: String,
}

impl Default for PhraseConfig {
    fn default() -> Self {
        Self {
            min_count: 5,
            threshold: 10.0,
            delimiter: "_".to_string(),
        }
    }
}

impl PhraseConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.threshold.is_finite() {
            return Err(ConfigError::InvalidThreshold(self.threshold));
        }
        // an alphabetic delimiter could join a pair into an existing token
        if self.delimiter.is_empty() || self.delimiter.chars().any(char::is_alphabetic) {
            return Err(ConfigError::InvalidDelimiter);
        }
        Ok(())
    }
}

/// Collocation score of an adjacent pair
///
/// `(pair_count - min_count) * total / (a_count * b_count)`
///
/// # Returns
/// * `None` - the pair can not be a phrase: a zero denominator, an empty
///   corpus, or fewer than `min_count` joint occurrences
#[inline]
pub fn score(pair_count: u64, a_count: u64, b_count: u64, total: u64, min_count: u64) -> Option<f64> {
    if a_count == 0 || b_count == 0 || total == 0 || pair_count < min_count {
        return None;
    }
    Some((pair_count - min_count) as f64 * total as f64 / (a_count as f64 * b_count as f64))
}

/// Single-pass accumulator of unigram and adjacent-pair counts
#[derive(Debug, Clone, Default)]
pub struct PhraseDetector {
    unigrams: TokenFrequency,
    pairs: HashMap<(String, String), u64, RandomState>,
}

impl PhraseDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count the tokens and adjacent pairs of one sentence
    pub fn add_sentence<S: AsRef<str>>(&mut self, sentence: &[S]) {
        self.unigrams.add_tokens(sentence);
        for pair in sentence.windows(2) {
            let key = (pair[0].as_ref().to_string(), pair[1].as_ref().to_string());
            *self.pairs.entry(key).or_insert(0) += 1;
        }
    }

    #[inline]
    pub fn total_tokens(&self) -> u64 {
        self.unigrams.token_total_count()
    }

    #[inline]
    pub fn token_count(&self, token: &str) -> u64 {
        self.unigrams.token_count(token)
    }

    /// Joint count of the adjacent pair `(a, b)`
    pub fn pair_count(&self, a: &str, b: &str) -> u64 {
        self.pairs.get(&(a.to_string(), b.to_string())).copied().unwrap_or(0)
    }

    /// Score every observed pair and keep the ones that qualify.
    /// The accumulator is consumed; only the frozen table survives.
    pub fn freeze(self, config: &PhraseConfig) -> Phraser {
        let total = self.total_tokens();
        let mut found: Vec<((String, String), f64)> = self
            .pairs
            .into_iter()
            .filter_map(|((a, b), pair_count)| {
                let s = score(
                    pair_count,
                    self.unigrams.token_count(&a),
                    self.unigrams.token_count(&b),
                    total,
                    config.min_count,
                )?;
                (s >= config.threshold).then_some(((a, b), s))
            })
            .collect();
        // HashMapの順序は不定なので固定する
        found.sort_by(|x, y| x.0.cmp(&y.0));

        let mut phrases: IndexMap<String, Followers> = IndexMap::new();
        for ((a, b), s) in found {
            debug!("phrase {}{}{} score {:.3}", a, config.delimiter, b, s);
            phrases.entry(a).or_default().0.insert(b, s);
        }
        Phraser {
            phrases,
            delimiter: config.delimiter.clone(),
        }
    }
}

/// second token -> score
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
struct Followers(#[serde(with = "indexmap::map::serde_seq")] IndexMap<String, f64>);

/// Frozen merge rule for adjacent token pairs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Phraser {
    /// first token -> second token -> score
    #[serde(with = "indexmap::map::serde_seq")]
    phrases: IndexMap<String, Followers>,
    delimiter: String,
}

impl Phraser {
    /// Merge rule that never merges
    pub fn empty(delimiter: &str) -> Self {
        Self {
            phrases: IndexMap::new(),
            delimiter: delimiter.to_string(),
        }
    }

    /// One full pass over `sentences`, then freeze
    pub fn learn<I>(sentences: I, config: &PhraseConfig) -> Self
    where
        I: IntoIterator<Item = Vec<String>>,
    {
        let mut detector = PhraseDetector::new();
        for sentence in sentences {
            detector.add_sentence(&sentence);
        }
        detector.freeze(config)
    }

    #[inline]
    pub fn contains(&self, a: &str, b: &str) -> bool {
        self.score_of(a, b).is_some()
    }

    #[inline]
    pub fn score_of(&self, a: &str, b: &str) -> Option<f64> {
        self.phrases.get(a).and_then(|second| second.0.get(b)).copied()
    }

    pub fn delimiter(&self) -> &str {
        &self.delimiter
    }

    pub fn len(&self) -> usize {
        self.phrases.values().map(|second| second.0.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.phrases.is_empty()
    }

    /// `(first, second, score)` sorted by pair
    pub fn phrases(&self) -> impl Iterator<Item = (&str, &str, f64)> + '_ {
        self.phrases
            .iter()
            .flat_map(|(a, second)| second.0.iter().map(move |(b, &s)| (a.as_str(), b.as_str(), s)))
    }

    /// Joined form of a pair
    #[inline]
    pub fn join(&self, a: &str, b: &str) -> String {
        let mut joined = String::with_capacity(a.len() + self.delimiter.len() + b.len());
        joined.push_str(a);
        joined.push_str(&self.delimiter);
        joined.push_str(b);
        joined
    }

    /// Merge phrases left to right
    ///
    /// A merged pair consumes both tokens, so in `a b c` with both `a b`
    /// and `b c` known only `a_b c` is produced.
    pub fn apply<S: AsRef<str>>(&self, tokens: &[S]) -> Vec<String> {
        let mut out = Vec::with_capacity(tokens.len());
        let mut i = 0;
        while i < tokens.len() {
            let a = tokens[i].as_ref();
            if let Some(b) = tokens.get(i + 1).map(|t| t.as_ref()) {
                if self.contains(a, b) {
                    out.push(self.join(a, b));
                    i += 2;
                    continue;
                }
            }
            out.push(a.to_string());
            i += 1;
        }
        out
    }
}

/// Bigram and trigram merge rules, applied in that order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhraseModel {
    bigrams: Phraser,
    trigrams: Phraser,
}

impl PhraseModel {
    /// Model that leaves every sentence unchanged
    pub fn identity() -> Self {
        let delimiter = PhraseConfig::default().delimiter;
        Self {
            bigrams: Phraser::empty(&delimiter),
            trigrams: Phraser::empty(&delimiter),
        }
    }

    /// Learn both stages.
    ///
    /// Two full traversals of `source`: raw sentences for the bigram rule,
    /// then bigram-merged sentences for the trigram rule.
    pub fn learn<S>(source: &S, config: &PhraseConfig) -> Result<Self, ConfigError>
    where
        S: SentenceSource + ?Sized,
    {
        config.validate()?;
        let bigrams = Phraser::learn(source.sentences(), config);
        info!("learned {} bigram phrases", bigrams.len());
        let trigrams = Phraser::learn(source.sentences().map(|sent| bigrams.apply(&sent)), config);
        info!("learned {} trigram phrases", trigrams.len());
        Ok(Self { bigrams, trigrams })
    }

    pub fn from_parts(bigrams: Phraser, trigrams: Phraser) -> Self {
        Self { bigrams, trigrams }
    }

    pub fn bigrams(&self) -> &Phraser {
        &self.bigrams
    }

    pub fn trigrams(&self) -> &Phraser {
        &self.trigrams
    }

    /// Apply the bigram rule, then the trigram rule
    #[inline]
    pub fn apply<S: AsRef<str>>(&self, tokens: &[S]) -> Vec<String> {
        let merged = self.bigrams.apply(tokens);
        self.trigrams.apply(&merged)
    }
}
