/// This crate turns a directory of plain-text documents into a streaming
/// bag-of-words corpus, with automatic detection of multi-word phrases.
pub mod vectorizer;
pub mod error;

/// Corpus Vectorizer
/// The top-level struct of this crate.
/// It reads a directory of text documents and yields one sparse
/// bag-of-words vector per document, in document-name order.
///
/// Construction performs three full passes over the documents:
/// - bigram phrase detection
/// - trigram phrase detection over bigram-merged sentences
/// - vocabulary construction, pruning and compaction
///
/// After that the phrase model and the vocabulary are frozen.
/// Every traversal re-reads the documents from storage, so the corpus text
/// is never held in memory at once and the corpus can be iterated any
/// number of times with identical results.
///
/// `CorpusVectorizer<A>` has one generic parameter:
/// - `A`: the analyzer providing sentences and tagged tokens (default `SimpleAnalyzer`)
pub use vectorizer::{CorpusConfig, CorpusVectorizer, BowIter};

/// Corpus Model
/// A reference-free snapshot of a built corpus: the phrase model, the
/// vocabulary and the document list.
/// It can be encoded with CBOR and bound to a directory again without
/// repeating the construction passes.
pub use vectorizer::serde::CorpusModel;

/// Analyzer and token traits
/// The linguistic capability the pipeline depends on but does not
/// implement: sentence segmentation and per-token alphabetic flag,
/// case-folded form, grammatical tag and entity tag.
/// `SimpleAnalyzer` is a rule-based implementation without tagging.
pub use vectorizer::analyzer::{Analyzer, LinguisticToken, SimpleAnalyzer, Token};

/// Token filter configuration
/// Stopwords, grammatical allow-list, entity deny-list and stemming.
pub use vectorizer::filter::{FilterConfig, FilterOption, Stemmer};

/// Phrase detection
/// - `Phraser`: one frozen merge rule for adjacent token pairs
/// - `PhraseModel`: bigram rule followed by trigram rule
pub use vectorizer::phrase::{PhraseConfig, PhraseDetector, PhraseModel, Phraser};

/// Vocabulary
/// Token <-> dense id bijection with document frequencies, and the rules
/// used to prune it.
pub use vectorizer::vocab::{PruneConfig, TokenStats, Vocabulary, VocabularyBuilder};

/// Sparse bag-of-words vector
pub use vectorizer::bow::BowVector;

/// Token Frequency structure
/// Occurrence counts of tokens, in first-appearance order.
pub use vectorizer::token::TokenFrequency;

/// Document listing and restartable sentence/document streams
pub use vectorizer::source::{DocumentSource, DocumentStream, SentenceSource, SentenceStream};

pub use error::{ConfigError, Error, Result};
