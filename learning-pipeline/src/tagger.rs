use common::{error::AppError, text::normalize};

/// One token of source text with the tagger's part-of-speech guess.
/// `tag` is `None` when the tagger could not classify the token; the
/// lexicon substitutes its sentinel value on insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaggedTerm {
    pub text: String,
    pub tag: Option<String>,
}

/// Tokenizer/tagger collaborator. Produces a finite sequence of
/// (term, tag) pairs in source order. Implementations may fail as a whole;
/// there is no partial extraction.
pub trait TermTagger: Send + Sync {
    fn tag(&self, text: &str) -> Result<Vec<TaggedTerm>, AppError>;
}

/// Whitespace tokenizer with a crude Spanish suffix heuristic for tags.
/// Deliberately shallow: anything beyond this level of analysis belongs in
/// a real NLP collaborator.
#[derive(Debug, Default, Clone)]
pub struct HeuristicTagger;

/// Adjective suffixes the heuristic recognizes, masculine and feminine.
const ADJECTIVE_SUFFIXES: &[&str] = &[
    "oso", "osa", "ico", "ica", "ivo", "iva", "able", "ible", "al", "ante", "ente",
];

impl HeuristicTagger {
    fn guess_tag(word: &str) -> Option<String> {
        if word.chars().count() < 3 || word.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }

        if word.ends_with("mente") {
            return Some("adverb".to_string());
        }
        if word.ends_with("ar") || word.ends_with("er") || word.ends_with("ir") {
            return Some("verb".to_string());
        }
        if ADJECTIVE_SUFFIXES.iter().any(|s| word.ends_with(s)) {
            return Some("adjective".to_string());
        }

        Some("noun".to_string())
    }
}

impl TermTagger for HeuristicTagger {
    fn tag(&self, text: &str) -> Result<Vec<TaggedTerm>, AppError> {
        let terms = text
            .split_whitespace()
            .map(|token| TaggedTerm {
                text: token.to_string(),
                tag: Self::guess_tag(&normalize(token)),
            })
            .collect();

        Ok(terms)
    }
}
