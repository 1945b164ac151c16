use std::{collections::HashSet, fmt::Debug, fs, path::Path, sync::Arc};

use log::debug;

use crate::error::{ConfigError, Error, Result};
use crate::vectorizer::analyzer::LinguisticToken;

/// Token -> token normalisation applied after filtering
pub trait Stemmer: Send + Sync {
    fn stem(&self, word: &str) -> String;
}

impl<F> Stemmer for F
where
    F: Fn(&str) -> String + Send + Sync,
{
    #[inline]
    fn stem(&self, word: &str) -> String {
        self(word)
    }
}

/// Value of a key-based filter option
#[derive(Clone)]
pub enum FilterOption {
    Words(HashSet<String>),
    Stemmer(Arc<dyn Stemmer>),
}

impl FilterOption {
    pub fn words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        FilterOption::Words(words.into_iter().map(Into::into).collect())
    }

    pub fn stemmer<S>(stemmer: S) -> Self
    where
        S: Stemmer + 'static,
    {
        FilterOption::Stemmer(Arc::new(stemmer))
    }
}

impl Debug for FilterOption {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FilterOption::Words(words) => f.debug_tuple("Words").field(words).finish(),
            FilterOption::Stemmer(_) => f.write_str("Stemmer(..)"),
        }
    }
}

/// Token filter configuration
///
/// Every stage is optional, an absent stage imposes no constraint.
/// Stages run in this order:
/// 1. drop tokens that are not alphabetic
/// 2. `stopwords`: drop tokens whose case-folded form is listed
/// 3. `postags`: keep only tokens whose grammatical tag is listed
/// 4. `entities`: drop tokens whose entity tag is listed
/// 5. case-fold, then apply `stemmer`
#[derive(Clone, Default)]
pub struct FilterConfig {
    pub stopwords: Option<HashSet<String>>,
    pub postags: Option<HashSet<String>>,
    pub entities: Option<HashSet<String>>,
    pub stemmer: Option<Arc<dyn Stemmer>>,
}

impl Debug for FilterConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilterConfig")
            .field("stopwords", &self.stopwords.as_ref().map(HashSet::len))
            .field("postags", &self.postags)
            .field("entities", &self.entities)
            .field("stemmer", &self.stemmer.is_some())
            .finish()
    }
}

/// builder
impl FilterConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_stopwords<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.stopwords = Some(words.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_postags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.postags = Some(tags.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_entities<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.entities = Some(labels.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_stemmer<S>(mut self, stemmer: S) -> Self
    where
        S: Stemmer + 'static,
    {
        self.stemmer = Some(Arc::new(stemmer));
        self
    }

    /// Build from `(key, value)` options.
    ///
    /// Recognized keys are `stopwords`, `postags`, `entities` (word sets)
    /// and `stemmer`. Unknown keys are ignored.
    ///
    /// # Errors
    /// `ConfigError::InvalidOption` when a recognized key carries the wrong
    /// kind of value, or any error from `validate`.
    pub fn from_options<I, K>(options: I) -> std::result::Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (K, FilterOption)>,
        K: AsRef<str>,
    {
        let mut config = Self::default();
        for (key, value) in options {
            let key = key.as_ref();
            match (key, value) {
                ("stopwords", FilterOption::Words(words)) => config.stopwords = Some(words),
                ("postags", FilterOption::Words(tags)) => config.postags = Some(tags),
                ("entities", FilterOption::Words(labels)) => config.entities = Some(labels),
                ("stemmer", FilterOption::Stemmer(stemmer)) => config.stemmer = Some(stemmer),
                ("stopwords" | "postags" | "entities", _) => {
                    return Err(ConfigError::InvalidOption { key: key.to_string(), expected: "a word set" });
                }
                ("stemmer", _) => {
                    return Err(ConfigError::InvalidOption { key: key.to_string(), expected: "a stemmer" });
                }
                (other, _) => debug!("ignoring unknown filter option `{}`", other),
            }
        }
        config.validate()?;
        Ok(config)
    }

    /// Check the configuration for caller mistakes
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if let Some(stopwords) = &self.stopwords {
            // 小文字化後のtokenと比較するので大文字を含むものは一致しない
            if let Some(word) = stopwords.iter().find(|w| w.to_lowercase() != **w) {
                return Err(ConfigError::StopwordNotLowercase(word.clone()));
            }
        }
        if let Some(tags) = &self.postags {
            if tags.is_empty() {
                return Err(ConfigError::EmptyAllowList("postags"));
            }
        }
        Ok(())
    }
}

/// filtering
impl FilterConfig {
    /// Decide whether a token survives the filter stages (before case-folding/stemming)
    #[inline]
    pub fn keep<T: LinguisticToken>(&self, token: &T) -> bool {
        if !token.is_alpha() {
            return false;
        }
        if let Some(stopwords) = &self.stopwords {
            if stopwords.contains(token.lower()) {
                return false;
            }
        }
        if let Some(tags) = &self.postags {
            if !tags.contains(token.pos()) {
                return false;
            }
        }
        if let Some(labels) = &self.entities {
            if labels.contains(token.ent_type()) {
                return false;
            }
        }
        true
    }

    /// Filter one sentence into case-folded (and optionally stemmed) words
    ///
    /// # Arguments
    /// * `tokens` - analyzer tokens of one sentence
    ///
    /// # Returns
    /// * `Vec<String>` - surviving words in sentence order
    pub fn filter_tokens<T: LinguisticToken>(&self, tokens: &[T]) -> Vec<String> {
        tokens
            .iter()
            .filter(|tok| self.keep(*tok))
            .map(|tok| match &self.stemmer {
                Some(stemmer) => stemmer.stem(tok.lower()),
                None => tok.lower().to_string(),
            })
            .collect()
    }
}

/// Read a newline separated stopword list.
/// Blank lines and lines starting with `#` are skipped, entries are case-folded.
pub fn load_stopwords<P: AsRef<Path>>(path: P) -> Result<HashSet<String>> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| Error::Io { path: path.to_path_buf(), source })?;
    Ok(text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_lowercase)
        .collect())
}
