use std::{collections::HashMap, rc::Rc, sync::Arc};

use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;

/// Per-token view exposed by a linguistic analyzer.
///
/// This is the whole surface the filter needs from a tokenizer/tagger;
/// any analyzer whose tokens implement it can drive the pipeline.
pub trait LinguisticToken {
    /// true if every character of the token is alphabetic
    fn is_alpha(&self) -> bool;
    /// case-folded surface form
    fn lower(&self) -> &str;
    /// grammatical category tag, empty if the analyzer does not tag
    fn pos(&self) -> &str;
    /// named-entity category tag, empty if none
    fn ent_type(&self) -> &str;
}

/// Sentence segmentation + tokenization capability.
///
/// The pipeline calls this once per document per traversal and never
/// caches the result.
pub trait Analyzer {
    type Token: LinguisticToken;

    /// Split `text` into sentences, each a sequence of tokens,
    /// in reading order.
    fn sentences(&self, text: &str) -> Vec<Vec<Self::Token>>;
}

impl<A> Analyzer for &A
where
    A: Analyzer + ?Sized,
{
    type Token = A::Token;

    #[inline]
    fn sentences(&self, text: &str) -> Vec<Vec<Self::Token>> {
        (**self).sentences(text)
    }
}

impl<A> Analyzer for Rc<A>
where
    A: Analyzer + ?Sized,
{
    type Token = A::Token;

    #[inline]
    fn sentences(&self, text: &str) -> Vec<Vec<Self::Token>> {
        (**self).sentences(text)
    }
}

impl<A> Analyzer for Arc<A>
where
    A: Analyzer + ?Sized,
{
    type Token = A::Token;

    #[inline]
    fn sentences(&self, text: &str) -> Vec<Vec<Self::Token>> {
        (**self).sentences(text)
    }
}

/// Owned token record
/// Analyzers that do not need a richer token type can emit this.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub text: String,
    pub lower: String,
    pub is_alpha: bool,
    pub pos: String,
    pub ent_type: String,
}

impl Token {
    /// Build an untagged token from its surface form
    pub fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
            lower: text.to_lowercase(),
            is_alpha: !text.is_empty() && text.chars().all(char::is_alphabetic),
            pos: String::new(),
            ent_type: String::new(),
        }
    }

    pub fn with_pos(mut self, pos: &str) -> Self {
        self.pos = pos.to_string();
        self
    }

    pub fn with_entity(mut self, ent_type: &str) -> Self {
        self.ent_type = ent_type.to_string();
        self
    }
}

impl LinguisticToken for Token {
    #[inline]
    fn is_alpha(&self) -> bool {
        self.is_alpha
    }

    #[inline]
    fn lower(&self) -> &str {
        &self.lower
    }

    #[inline]
    fn pos(&self) -> &str {
        &self.pos
    }

    #[inline]
    fn ent_type(&self) -> &str {
        &self.ent_type
    }
}

/// Rule based analyzer
///
/// - sentences: Unicode sentence boundaries (UAX #29)
/// - tokens: Unicode word boundaries, whitespace segments dropped,
///   punctuation kept as non-alphabetic tokens
/// - no grammatical tagging (`pos` is always empty)
/// - entity tags come from an optional gazetteer keyed by lowercase form
///
/// Good enough for plain English-like text; plug a real tagger in through
/// `Analyzer` when POS filtering is needed.
#[derive(Debug, Clone, Default)]
pub struct SimpleAnalyzer {
    gazetteer: HashMap<String, String>,
}

impl SimpleAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach entity labels to known words.
    ///
    /// # Arguments
    /// * `entries` - `(word, label)` pairs, the word is case-folded before insertion
    pub fn with_entities<I, W, L>(mut self, entries: I) -> Self
    where
        I: IntoIterator<Item = (W, L)>,
        W: AsRef<str>,
        L: Into<String>,
    {
        for (word, label) in entries {
            self.gazetteer.insert(word.as_ref().to_lowercase(), label.into());
        }
        self
    }

    /// Tokenize a single sentence
    pub fn tokenize(&self, sentence: &str) -> Vec<Token> {
        sentence
            .split_word_bounds()
            .filter(|seg| !seg.trim().is_empty())
            .map(|seg| {
                let token = Token::new(seg);
                match self.gazetteer.get(&token.lower) {
                    Some(label) => token.with_entity(label),
                    None => token,
                }
            })
            .collect()
    }
}

impl Analyzer for SimpleAnalyzer {
    type Token = Token;

    fn sentences(&self, text: &str) -> Vec<Vec<Token>> {
        text.unicode_sentences()
            .map(|sent| self.tokenize(sent))
            .filter(|tokens| !tokens.is_empty())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lowers(sent: &[Token]) -> Vec<&str> {
        sent.iter().map(|t| t.lower()).collect()
    }

    #[test]
    fn splits_sentences_and_words() {
        let analyzer = SimpleAnalyzer::new();
        let sents = analyzer.sentences("The fiscal quarter ended. Revenue grew!  Why?");
        assert_eq!(sents.len(), 3);
        assert_eq!(lowers(&sents[0]), vec!["the", "fiscal", "quarter", "ended", "."]);
        assert_eq!(lowers(&sents[1]), vec!["revenue", "grew", "!"]);
        assert_eq!(lowers(&sents[2]), vec!["why", "?"]);
    }

    #[test]
    fn alphabetic_flag() {
        assert!(Token::new("Quarter").is_alpha());
        assert!(!Token::new("2024").is_alpha());
        assert!(!Token::new("Q3").is_alpha());
        assert!(!Token::new(",").is_alpha());
        assert!(!Token::new("").is_alpha());
    }

    #[test]
    fn empty_text_has_no_sentences() {
        let analyzer = SimpleAnalyzer::new();
        assert!(analyzer.sentences("").is_empty());
        assert!(analyzer.sentences("   \n\t ").is_empty());
    }

    #[test]
    fn gazetteer_tags_entities() {
        let analyzer = SimpleAnalyzer::new().with_entities([("Chile", "LOC"), ("BANCO", "ORG")]);
        let sents = analyzer.sentences("Banco de chile");
        let tags: Vec<&str> = sents[0].iter().map(|t| t.ent_type()).collect();
        assert_eq!(tags, vec!["ORG", "", "LOC"]);
        assert!(sents[0].iter().all(|t| t.pos().is_empty()));
    }

    #[test]
    fn shared_analyzer_forwards() {
        let analyzer = Arc::new(SimpleAnalyzer::new());
        let by_ref = &analyzer;
        assert_eq!(by_ref.sentences("one two.").len(), 1);
    }
}
