pub mod analyzer;
pub mod bow;
pub mod filter;
pub mod phrase;
pub mod serde;
pub mod source;
pub mod token;
pub mod vocab;

#[cfg(test)]
mod tests;

use std::{iter::FusedIterator, path::Path};

use ::serde::{Deserialize, Serialize};
use log::info;

use crate::error::{ConfigError, Result};
use crate::vectorizer::{
    analyzer::{Analyzer, SimpleAnalyzer},
    bow::BowVector,
    filter::FilterConfig,
    phrase::{PhraseConfig, PhraseModel},
    source::{DocumentSource, DocumentStream, Documents, SentenceStream},
    token::TokenFrequency,
    vocab::{PruneConfig, Vocabulary, VocabularyBuilder},
};

/// Construction parameters of a `CorpusVectorizer`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorpusConfig {
    pub phrase: PhraseConfig,
    pub prune: PruneConfig,
    /// file extension of the documents, without the dot
    pub extension: String,
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            phrase: PhraseConfig::default(),
            prune: PruneConfig::default(),
            extension: "txt".to_string(),
        }
    }
}

impl CorpusConfig {
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        self.phrase.validate()?;
        self.prune.validate()
    }
}

/// Streaming bag-of-words corpus over a directory of text files
///
/// Construction reads the whole corpus three times:
/// two passes to learn the bigram and trigram phrase rules,
/// one pass to build and prune the vocabulary.
/// After that the phrase model and vocabulary are frozen.
///
/// Each call to `iter` reads every document again and yields one
/// `BowVector` per document, in document-name order. Nothing is cached
/// between traversals, memory use is bounded by one document.
#[derive(Debug)]
pub struct CorpusVectorizer<A = SimpleAnalyzer> {
    source: DocumentSource,
    analyzer: A,
    filter: FilterConfig,
    phrases: PhraseModel,
    vocabulary: Vocabulary,
}

impl<A> CorpusVectorizer<A>
where
    A: Analyzer,
{
    /// Build with the default phrase and pruning parameters
    pub fn new<P: AsRef<Path>>(dir: P, analyzer: A, filter: FilterConfig) -> Result<Self> {
        Self::with_config(dir, analyzer, filter, &CorpusConfig::default())
    }

    /// Build the corpus
    ///
    /// # Errors
    /// * `Error::Config` - invalid filter, phrase or pruning configuration
    /// * `Error::Io` / `Error::NotADirectory` - the directory can not be listed
    ///
    /// Unreadable documents are logged and treated as empty.
    pub fn with_config<P: AsRef<Path>>(dir: P, analyzer: A, filter: FilterConfig, config: &CorpusConfig) -> Result<Self> {
        filter.validate()?;
        config.validate()?;
        let source = DocumentSource::open(dir, &config.extension)?;

        let sentences = SentenceStream::new(&source, &analyzer, &filter);
        let phrases = PhraseModel::learn(&sentences, &config.phrase)?;

        let mut builder = VocabularyBuilder::new();
        for (_, tokens) in DocumentStream::new(sentences, Some(&phrases)) {
            builder.add_document(&tokens);
        }
        let vocabulary = builder.finish(&config.prune);
        info!(
            "corpus ready: {} documents, {} tokens in vocabulary",
            source.len(),
            vocabulary.len()
        );

        Ok(Self::from_parts(source, analyzer, filter, phrases, vocabulary))
    }

    /// Assemble from already frozen parts
    pub(crate) fn from_parts(
        source: DocumentSource,
        analyzer: A,
        filter: FilterConfig,
        phrases: PhraseModel,
        vocabulary: Vocabulary,
    ) -> Self {
        Self { source, analyzer, filter, phrases, vocabulary }
    }

    /// Start a traversal: one vector per document, in document order
    pub fn iter(&self) -> BowIter<'_, A> {
        BowIter {
            documents: self.documents().iter(),
            vocabulary: &self.vocabulary,
        }
    }

    /// Like `iter`, paired with the document name
    pub fn named(&self) -> impl Iterator<Item = (&str, BowVector)> + '_ {
        self.documents()
            .iter()
            .map(move |(name, tokens)| (name, self.vocabulary.doc2bow(&tokens)))
    }

    /// Per-document counts of the phrase-merged tokens, pruned tokens included
    pub fn token_frequencies(&self) -> impl Iterator<Item = (&str, TokenFrequency)> + '_ {
        self.documents()
            .iter()
            .map(|(name, tokens)| (name, tokens.iter().collect::<TokenFrequency>()))
    }

    /// Filtered sentences, before phrase merging
    pub fn sentences(&self) -> SentenceStream<'_, A> {
        SentenceStream::new(&self.source, &self.analyzer, &self.filter)
    }

    /// Phrase-merged token list of every document
    pub fn documents(&self) -> DocumentStream<'_, A> {
        DocumentStream::new(self.sentences(), Some(&self.phrases))
    }

    /// Vectorize text that is not part of the corpus with the frozen model
    pub fn vectorize_text(&self, text: &str) -> BowVector {
        let tokens: Vec<String> = self
            .sentences()
            .text_sentences(text)
            .iter()
            .flat_map(|sent| self.phrases.apply(sent))
            .collect();
        self.vocabulary.doc2bow(&tokens)
    }
}

impl<A> CorpusVectorizer<A> {
    pub fn phrases(&self) -> &PhraseModel {
        &self.phrases
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    pub fn filter(&self) -> &FilterConfig {
        &self.filter
    }

    pub fn analyzer(&self) -> &A {
        &self.analyzer
    }

    pub fn directory(&self) -> &Path {
        self.source.dir()
    }

    pub fn doc_names(&self) -> Vec<&str> {
        self.source.doc_names()
    }

    /// Number of documents
    #[inline]
    pub fn len(&self) -> usize {
        self.source.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.source.is_empty()
    }
}

impl<'a, A> IntoIterator for &'a CorpusVectorizer<A>
where
    A: Analyzer,
{
    type Item = BowVector;
    type IntoIter = BowIter<'a, A>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// One traversal of a `CorpusVectorizer`
pub struct BowIter<'a, A> {
    documents: Documents<'a, A>,
    vocabulary: &'a Vocabulary,
}

impl<A> Iterator for BowIter<'_, A>
where
    A: Analyzer,
{
    type Item = BowVector;

    fn next(&mut self) -> Option<Self::Item> {
        let (_, tokens) = self.documents.next()?;
        Some(self.vocabulary.doc2bow(&tokens))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.documents.size_hint()
    }
}

impl<A> ExactSizeIterator for BowIter<'_, A> where A: Analyzer {}

impl<A> FusedIterator for BowIter<'_, A> where A: Analyzer {}
