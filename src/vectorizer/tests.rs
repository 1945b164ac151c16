use std::{fs, path::Path};

use tempfile::TempDir;

use crate::error::{ConfigError, Error};
use crate::vectorizer::{
    analyzer::SimpleAnalyzer,
    bow::BowVector,
    filter::FilterConfig,
    serde::CorpusModel,
    vocab::PruneConfig,
    CorpusConfig, CorpusVectorizer,
};

/// Distinct alphabetic filler word for index `n`
fn filler_word(mut n: usize) -> String {
    let mut word = String::from("q");
    loop {
        word.push((b'a' + (n % 26) as u8) as char);
        n /= 26;
        if n == 0 {
            break;
        }
    }
    word
}

fn write_docs(dir: &Path, docs: &[(String, String)]) {
    for (name, text) in docs {
        fs::write(dir.join(format!("{}.txt", name)), text).unwrap();
    }
}

/// Ten reports. Every document has four sentences of "The" plus nine
/// one-off filler words. On top of that:
/// - documents 0..6 contain "Fiscal quarter."
/// - documents 0..5 contain "Growth slowed."
/// - document 7 contains "Zebra."
///
/// Token total is 423, so "fiscal quarter" (6 joint, 6 + 6 single)
/// scores 423 / 36 and is merged. "growth slowed" only reaches min_count.
fn reports() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    let mut next = 0;
    let docs: Vec<(String, String)> = (0..10)
        .map(|i| {
            let mut text = String::new();
            for _ in 0..4 {
                let words: Vec<String> = (0..9)
                    .map(|_| {
                        next += 1;
                        filler_word(next)
                    })
                    .collect();
                text.push_str(&format!("The {}. ", words.join(" ")));
            }
            if i < 6 {
                text.push_str("Fiscal quarter. ");
            }
            if i < 5 {
                text.push_str("Growth slowed. ");
            }
            if i == 7 {
                text.push_str("Zebra.");
            }
            (format!("2021-{:02}-01", i + 1), text)
        })
        .collect();
    write_docs(dir.path(), &docs);
    dir
}

fn build(dir: &Path) -> CorpusVectorizer {
    CorpusVectorizer::new(dir, SimpleAnalyzer::new(), FilterConfig::new()).unwrap()
}

#[test]
fn phrases_are_detected_across_documents() {
    let dir = reports();
    let corpus = build(dir.path());
    assert!(corpus.phrases().bigrams().contains("fiscal", "quarter"));
    assert!(!corpus.phrases().bigrams().contains("growth", "slowed"));
    assert!(corpus.phrases().trigrams().is_empty());

    let (_, first) = corpus.documents().iter().next().unwrap();
    assert!(first.contains(&"fiscal_quarter".to_string()));
    assert!(!first.contains(&"fiscal".to_string()));
    assert!(!first.contains(&"quarter".to_string()));
}

#[test]
fn vocabulary_is_pruned_and_compact() {
    let dir = reports();
    let corpus = build(dir.path());
    let vocab = corpus.vocabulary();

    assert_eq!(vocab.num_docs(), 10);
    assert!(!vocab.contains("the"));
    assert!(!vocab.contains("zebra"));
    assert!(!vocab.contains(&filler_word(1)));
    assert_eq!(
        vocab.iter().map(|(id, token, _)| (id, token)).collect::<Vec<_>>(),
        vec![(0, "fiscal_quarter"), (1, "growth"), (2, "slowed")]
    );
}

#[test]
fn vectors_follow_document_order() {
    let dir = reports();
    let corpus = build(dir.path());
    let vectors: Vec<BowVector> = corpus.iter().collect();
    assert_eq!(vectors.len(), 10);
    for vec in &vectors[..5] {
        assert_eq!(vec.as_slice(), &[(0, 1), (1, 1), (2, 1)]);
    }
    assert_eq!(vectors[5].as_slice(), &[(0, 1)]);
    for vec in &vectors[6..] {
        assert!(vec.is_empty());
    }

    let names: Vec<&str> = corpus.named().map(|(name, _)| name).collect();
    assert_eq!(names, corpus.doc_names());
    assert_eq!(names[0], "2021-01-01");
    assert_eq!(names[9], "2021-10-01");
}

#[test]
fn traversals_are_deterministic_and_restartable() {
    let dir = reports();
    let corpus = build(dir.path());
    let first: Vec<BowVector> = corpus.iter().collect();
    let second: Vec<BowVector> = (&corpus).into_iter().collect();
    let mut third = Vec::new();
    for vec in &corpus {
        third.push(vec);
    }
    assert_eq!(first, second);
    assert_eq!(first, third);
    assert_eq!(corpus.iter().len(), 10);

    // partially consumed traversals leave nothing behind
    let mut partial = corpus.iter();
    partial.next();
    drop(partial);
    assert_eq!(corpus.iter().collect::<Vec<_>>(), first);
}

#[test]
fn independent_builds_agree() {
    let dir = reports();
    let a = build(dir.path());
    let b = build(dir.path());
    assert_eq!(a.vocabulary(), b.vocabulary());
    assert_eq!(a.phrases(), b.phrases());
    assert_eq!(a.iter().collect::<Vec<_>>(), b.iter().collect::<Vec<_>>());
}

#[test]
fn empty_directory_yields_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let corpus = build(dir.path());
    assert!(corpus.is_empty());
    assert!(corpus.vocabulary().is_empty());
    assert_eq!(corpus.iter().count(), 0);
    assert!(corpus.phrases().bigrams().is_empty());
}

#[test]
fn punctuation_only_document_gives_empty_vector() {
    // "rates" is in every document with tokens, "bank report" in two
    let docs: Vec<(String, String)> = (0..4)
        .map(|i| {
            let mut text = format!("Rates rose. {} figures.", filler_word(i));
            if i < 2 {
                text.push_str(" Bank report.");
            }
            (format!("doc{}", i), text)
        })
        .collect();
    let plain = tempfile::tempdir().unwrap();
    write_docs(plain.path(), &docs);
    let degenerate = tempfile::tempdir().unwrap();
    write_docs(degenerate.path(), &docs);
    write_docs(degenerate.path(), &[("doc9".to_string(), "... !!! ,,, 42 ???".to_string())]);

    let without = build(plain.path());
    let with = build(degenerate.path());

    let vectors: Vec<BowVector> = with.iter().collect();
    assert_eq!(vectors.len(), 5);
    assert!(vectors[4].is_empty());
    assert_eq!(with.vocabulary().num_docs(), 5);
    assert_eq!(with.vocabulary().num_nonempty_docs(), 4);

    // the empty document does not change what survives pruning
    let tokens = |corpus: &CorpusVectorizer| -> Vec<String> {
        corpus.vocabulary().iter().map(|(_, token, _)| token.to_string()).collect()
    };
    assert_eq!(tokens(&with), vec!["bank", "report"]);
    assert_eq!(tokens(&with), tokens(&without));
    assert_eq!(vectors[..4], without.iter().collect::<Vec<_>>()[..]);
}

#[test]
fn unreadable_document_is_treated_as_empty() {
    let dir = reports();
    fs::write(dir.path().join("2021-05-15.txt"), [0xc3, 0x28, 0xa0, 0xa1]).unwrap();
    let corpus = build(dir.path());
    assert_eq!(corpus.len(), 11);
    let vectors: Vec<BowVector> = corpus.iter().collect();
    assert!(vectors[5].is_empty());
    assert_eq!(corpus.vocabulary().num_docs(), 11);
}

#[test]
fn missing_directory_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let err = CorpusVectorizer::new(dir.path().join("absent"), SimpleAnalyzer::new(), FilterConfig::new()).unwrap_err();
    assert!(matches!(err, Error::Io { .. }));
}

#[test]
fn configuration_misuse_is_reported() {
    let dir = reports();
    let err = CorpusVectorizer::new(dir.path(), SimpleAnalyzer::new(), FilterConfig::new().with_stopwords(["The"]))
        .unwrap_err();
    assert!(matches!(err, Error::Config(ConfigError::StopwordNotLowercase(_))));

    let config = CorpusConfig {
        prune: PruneConfig { no_above: 2.0, ..PruneConfig::default() },
        ..CorpusConfig::default()
    };
    let err = CorpusVectorizer::with_config(dir.path(), SimpleAnalyzer::new(), FilterConfig::new(), &config).unwrap_err();
    assert!(matches!(err, Error::Config(ConfigError::InvalidRatio(_))));
}

#[test]
fn stopwords_and_stemmer_flow_through() {
    let dir = reports();
    let filter = FilterConfig::new()
        .with_stopwords(["slowed"])
        .with_stemmer(|w: &str| w.strip_suffix("th").filter(|s| s.len() > 2).unwrap_or(w).to_string());
    let corpus = CorpusVectorizer::new(dir.path(), SimpleAnalyzer::new(), filter).unwrap();
    let tokens: Vec<&str> = corpus.vocabulary().iter().map(|(_, t, _)| t).collect();
    assert_eq!(tokens, vec!["fiscal_quarter", "grow"]);
}

#[test]
fn entity_filter_with_gazetteer() {
    let dir = reports();
    let analyzer = SimpleAnalyzer::new().with_entities([("growth", "MISC")]);
    let corpus = CorpusVectorizer::new(dir.path(), analyzer, FilterConfig::new().with_entities(["MISC"])).unwrap();
    assert!(!corpus.vocabulary().contains("growth"));
    assert!(corpus.vocabulary().contains("slowed"));
}

#[test]
fn token_frequencies_include_pruned_tokens() {
    let dir = reports();
    let corpus = build(dir.path());
    let (name, freq) = corpus.token_frequencies().next().unwrap();
    assert_eq!(name, "2021-01-01");
    assert_eq!(freq.token_count("the"), 4);
    assert_eq!(freq.token_count("fiscal_quarter"), 1);
    assert_eq!(freq.token_total_count(), 4 + 36 + 1 + 2);
}

#[test]
fn new_text_uses_frozen_model() {
    let dir = reports();
    let corpus = build(dir.path());
    let vec = corpus.vectorize_text("The fiscal quarter was long. Growth, growth and growth. Fiscal.");
    assert_eq!(vec.as_slice(), &[(0, 1), (1, 3)]);
    // the model does not change
    assert!(!corpus.vocabulary().contains("long"));
}

#[test]
fn model_snapshot_rebinds_without_relearning() {
    let dir = reports();
    let corpus = build(dir.path());
    let model = corpus.to_model();
    let bytes = model.to_cbor().unwrap();
    let restored = CorpusModel::from_cbor(&bytes).unwrap();
    assert_eq!(restored, model);

    let rebound = restored.bind(dir.path(), SimpleAnalyzer::new(), FilterConfig::new()).unwrap();
    assert_eq!(rebound.vocabulary(), corpus.vocabulary());
    assert_eq!(rebound.iter().collect::<Vec<_>>(), corpus.iter().collect::<Vec<_>>());

    assert!(matches!(CorpusModel::from_cbor(&[0xff, 0x00]), Err(Error::Encode(_))));
}
