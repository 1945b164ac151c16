use ahash::RandomState;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// TokenFrequency
/// Counts token occurrences, keeping first-appearance order.
///
/// Used for the unigram side of phrase scoring and for per-document
/// term counts handed to downstream frequency analysis.
///
/// # Examples
/// ```
/// use bow_corpus::TokenFrequency;
/// let mut freq = TokenFrequency::new();
/// freq.add_tokens(&["fiscal", "quarter", "fiscal"]);
///
/// assert_eq!(freq.token_count("fiscal"), 2);
/// assert_eq!(freq.token_total_count(), 3);
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct TokenFrequency {
    #[serde(with = "indexmap::map::serde_seq")]
    token_count: IndexMap<String, u64, RandomState>,
    total_token_count: u64,
}

/// Tokenの追加
impl TokenFrequency {
    pub fn new() -> Self {
        TokenFrequency {
            token_count: IndexMap::with_hasher(RandomState::new()),
            total_token_count: 0,
        }
    }

    /// Count one occurrence of `token`
    #[inline]
    pub fn add_token(&mut self, token: &str) -> &mut Self {
        match self.token_count.get_mut(token) {
            Some(count) => *count += 1,
            None => {
                self.token_count.insert(token.to_string(), 1);
            }
        }
        self.total_token_count += 1;
        self
    }

    /// Count every token of the slice
    #[inline]
    pub fn add_tokens<T>(&mut self, tokens: &[T]) -> &mut Self
    where
        T: AsRef<str>,
    {
        for token in tokens {
            self.add_token(token.as_ref());
        }
        self
    }
}

/// 統計情報の取得
impl TokenFrequency {
    /// Occurrences of `token`, 0 if never seen
    #[inline]
    pub fn token_count(&self, token: &str) -> u64 {
        self.token_count.get(token).copied().unwrap_or(0)
    }

    /// Sum of all counts
    #[inline]
    pub fn token_total_count(&self) -> u64 {
        self.total_token_count
    }

    /// Number of distinct tokens
    #[inline]
    pub fn token_num(&self) -> usize {
        self.token_count.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.token_count.is_empty()
    }

    #[inline]
    pub fn contains_token(&self, token: &str) -> bool {
        self.token_count.contains_key(token)
    }

    /// `(token, count)` in first-appearance order
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> + '_ {
        self.token_count.iter().map(|(token, &count)| (token.as_str(), count))
    }

    /// Distinct tokens in first-appearance order
    #[inline]
    pub fn token_set_ref_str(&self) -> Vec<&str> {
        self.token_count.keys().map(|s| s.as_str()).collect()
    }

    /// Tokens sorted by count (desc), ties keep first-appearance order
    pub fn sorted_frequency_vector(&self) -> Vec<(&str, u64)> {
        let mut token_list: Vec<(&str, u64)> = self.iter().collect();
        token_list.sort_by(|a, b| b.1.cmp(&a.1));
        token_list
    }
}

impl<S: AsRef<str>> FromIterator<S> for TokenFrequency {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut freq = TokenFrequency::new();
        for token in iter {
            freq.add_token(token.as_ref());
        }
        freq
    }
}
