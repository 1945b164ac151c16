use std::path::Path;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::vectorizer::{
    analyzer::Analyzer,
    filter::FilterConfig,
    phrase::PhraseModel,
    source::DocumentSource,
    vocab::Vocabulary,
    CorpusVectorizer,
};

/// Frozen artifacts of a `CorpusVectorizer` without its analyzer, filter or
/// directory handle
///
/// Lets a built corpus be stored and later bound to a directory again
/// without repeating the three construction passes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorpusModel {
    /// document names the model was built on, in order
    pub doc_names: Vec<String>,
    pub extension: String,
    pub phrases: PhraseModel,
    pub vocabulary: Vocabulary,
}

impl CorpusModel {
    /// Attach the model to a directory.
    ///
    /// The filter should be the one the model was built with; only its
    /// validity is checked here. A document list that differs from the one
    /// the model was built on is logged, not rejected.
    pub fn bind<A, P>(self, dir: P, analyzer: A, filter: FilterConfig) -> Result<CorpusVectorizer<A>>
    where
        A: Analyzer,
        P: AsRef<Path>,
    {
        filter.validate()?;
        let source = DocumentSource::open(dir, &self.extension)?;
        if source.doc_names() != self.doc_names {
            warn!(
                "{} holds {} documents, the model was built on {} different ones",
                source.dir().display(),
                source.len(),
                self.doc_names.len()
            );
        }
        Ok(CorpusVectorizer::from_parts(source, analyzer, filter, self.phrases, self.vocabulary))
    }

    pub fn to_cbor(&self) -> Result<Vec<u8>> {
        Ok(serde_cbor::to_vec(self)?)
    }

    pub fn from_cbor(bytes: &[u8]) -> Result<Self> {
        Ok(serde_cbor::from_slice(bytes)?)
    }
}

impl<A> CorpusVectorizer<A> {
    /// Snapshot of the frozen phrase model and vocabulary
    pub fn to_model(&self) -> CorpusModel {
        CorpusModel {
            doc_names: self.doc_names().into_iter().map(str::to_string).collect(),
            extension: self.source.extension().to_string(),
            phrases: self.phrases().clone(),
            vocabulary: self.vocabulary().clone(),
        }
    }
}
