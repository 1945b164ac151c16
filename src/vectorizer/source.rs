use std::{fs, iter::FusedIterator, path::{Path, PathBuf}};

use log::{info, trace, warn};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::vectorizer::{analyzer::Analyzer, filter::FilterConfig, phrase::PhraseModel};

/// One stored document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// file stem, the document identity
    pub name: String,
    pub path: PathBuf,
}

/// Ordered list of the documents of a corpus directory
///
/// The list is resolved once when opened: the directory is treated as
/// immutable for the lifetime of the corpus. Document contents are not
/// kept, every traversal reads them again.
#[derive(Debug, Clone)]
pub struct DocumentSource {
    dir: PathBuf,
    extension: String,
    documents: Vec<Document>,
}

impl DocumentSource {
    /// List the regular files of `dir` with the given extension,
    /// sorted by file name.
    ///
    /// # Errors
    /// The directory itself is missing, unreadable or not a directory.
    pub fn open<P: AsRef<Path>>(dir: P, extension: &str) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        let meta = fs::metadata(&dir).map_err(|source| Error::Io { path: dir.clone(), source })?;
        if !meta.is_dir() {
            return Err(Error::NotADirectory(dir));
        }
        let entries = fs::read_dir(&dir).map_err(|source| Error::Io { path: dir.clone(), source })?;

        let mut paths = Vec::new();
        for entry in entries {
            let path = match entry {
                Ok(entry) => entry.path(),
                Err(e) => {
                    warn!("skipping unreadable entry in {}: {}", dir.display(), e);
                    continue;
                }
            };
            if path.is_file() && path.extension().is_some_and(|ext| ext == extension) {
                paths.push(path);
            }
        }
        // file name order, names usually start with a date
        paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

        let documents: Vec<Document> = paths
            .into_iter()
            .map(|path| Document {
                name: path
                    .file_stem()
                    .map(|stem| stem.to_string_lossy().into_owned())
                    .unwrap_or_default(),
                path,
            })
            .collect();
        info!("found {} documents in {}", documents.len(), dir.display());
        Ok(Self { dir, extension: extension.to_string(), documents })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn doc_names(&self) -> Vec<&str> {
        self.documents.iter().map(|doc| doc.name.as_str()).collect()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

/// Read a document as UTF-8.
/// A failed read is logged and yields empty text.
pub fn read_text(path: &Path) -> String {
    match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) => {
            warn!("failed to read {}: {}", path.display(), e);
            String::new()
        }
    }
}

/// Producer of sentence token lists that can be traversed any number of times
pub trait SentenceSource {
    type Iter<'s>: Iterator<Item = Vec<String>>
    where
        Self: 's;

    /// Start a fresh traversal
    fn sentences(&self) -> Self::Iter<'_>;
}

impl SentenceSource for [Vec<String>] {
    type Iter<'s> = std::iter::Cloned<std::slice::Iter<'s, Vec<String>>>;

    fn sentences(&self) -> Self::Iter<'_> {
        self.iter().cloned()
    }
}

impl SentenceSource for Vec<Vec<String>> {
    type Iter<'s> = std::iter::Cloned<std::slice::Iter<'s, Vec<String>>>;

    fn sentences(&self) -> Self::Iter<'_> {
        self.iter().cloned()
    }
}

/// Filtered sentences of every document, in document order
pub struct SentenceStream<'a, A> {
    source: &'a DocumentSource,
    analyzer: &'a A,
    filter: &'a FilterConfig,
}

impl<A> Clone for SentenceStream<'_, A> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<A> Copy for SentenceStream<'_, A> {}

impl<'a, A> SentenceStream<'a, A>
where
    A: Analyzer,
{
    pub fn new(source: &'a DocumentSource, analyzer: &'a A, filter: &'a FilterConfig) -> Self {
        Self { source, analyzer, filter }
    }

    pub fn source(&self) -> &'a DocumentSource {
        self.source
    }

    /// Start a traversal; each call re-reads every document
    pub fn iter(&self) -> Sentences<'a, A> {
        Sentences {
            stream: *self,
            next_doc: 0,
            pending: Vec::new().into_iter(),
        }
    }

    /// Filtered sentences of one document text
    pub fn text_sentences(&self, text: &str) -> Vec<Vec<String>> {
        self.analyzer
            .sentences(text)
            .iter()
            .map(|sent| self.filter.filter_tokens(sent))
            .collect()
    }

    /// Filtered sentences of one stored document
    pub fn document_sentences(&self, doc: &Document) -> Vec<Vec<String>> {
        trace!("reading {}", doc.path.display());
        let text = read_text(&doc.path);
        self.text_sentences(&text)
    }
}

impl<'a, A> SentenceSource for SentenceStream<'a, A>
where
    A: Analyzer,
{
    type Iter<'s> = Sentences<'a, A> where Self: 's;

    fn sentences(&self) -> Self::Iter<'_> {
        self.iter()
    }
}

impl<'a, A> IntoIterator for SentenceStream<'a, A>
where
    A: Analyzer,
{
    type Item = Vec<String>;
    type IntoIter = Sentences<'a, A>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// One traversal of a `SentenceStream`
/// Holds at most the sentences of one document.
pub struct Sentences<'a, A> {
    stream: SentenceStream<'a, A>,
    next_doc: usize,
    pending: std::vec::IntoIter<Vec<String>>,
}

impl<A> Iterator for Sentences<'_, A>
where
    A: Analyzer,
{
    type Item = Vec<String>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(sent) = self.pending.next() {
                return Some(sent);
            }
            let doc = self.stream.source.documents.get(self.next_doc)?;
            self.next_doc += 1;
            self.pending = self.stream.document_sentences(doc).into_iter();
        }
    }
}

impl<A> FusedIterator for Sentences<'_, A> where A: Analyzer {}

/// Per-document token lists: the sentences of a document concatenated,
/// optionally passed through a phrase model first
pub struct DocumentStream<'a, A> {
    sentences: SentenceStream<'a, A>,
    phrases: Option<&'a PhraseModel>,
}

impl<A> Clone for DocumentStream<'_, A> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<A> Copy for DocumentStream<'_, A> {}

impl<'a, A> DocumentStream<'a, A>
where
    A: Analyzer,
{
    pub fn new(sentences: SentenceStream<'a, A>, phrases: Option<&'a PhraseModel>) -> Self {
        Self { sentences, phrases }
    }

    /// Start a traversal; each call re-reads every document
    pub fn iter(&self) -> Documents<'a, A> {
        Documents { stream: *self, next_doc: 0 }
    }

    /// Token list of one stored document
    pub fn document_tokens(&self, doc: &Document) -> Vec<String> {
        let mut words = Vec::new();
        for sent in self.sentences.document_sentences(doc) {
            match self.phrases {
                Some(model) => words.extend(model.apply(&sent)),
                None => words.extend(sent),
            }
        }
        words
    }
}

impl<'a, A> IntoIterator for DocumentStream<'a, A>
where
    A: Analyzer,
{
    type Item = (&'a str, Vec<String>);
    type IntoIter = Documents<'a, A>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// One traversal of a `DocumentStream`
pub struct Documents<'a, A> {
    stream: DocumentStream<'a, A>,
    next_doc: usize,
}

impl<'a, A> Iterator for Documents<'a, A>
where
    A: Analyzer,
{
    type Item = (&'a str, Vec<String>);

    fn next(&mut self) -> Option<Self::Item> {
        let source: &'a DocumentSource = self.stream.sentences.source;
        let doc = source.documents.get(self.next_doc)?;
        self.next_doc += 1;
        Some((doc.name.as_str(), self.stream.document_tokens(doc)))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let rest = self.stream.sentences.source.len().saturating_sub(self.next_doc);
        (rest, Some(rest))
    }
}

impl<A> ExactSizeIterator for Documents<'_, A> where A: Analyzer {}

impl<A> FusedIterator for Documents<'_, A> where A: Analyzer {}
