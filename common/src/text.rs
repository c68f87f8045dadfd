use unicode_normalization::UnicodeNormalization;

/// Characters stripped from raw terms before they enter the lexicon.
/// Covers ASCII punctuation plus the Spanish inverted marks and the
/// typographic quotes Wikipedia extracts tend to carry.
const STRIPPED_PUNCTUATION: &[char] = &[
    '.', ',', ';', ':', '!', '?', '¡', '¿', '"', '\'', '«', '»', '(', ')', '[', ']', '{', '}',
    '…', '“', '”', '‘', '’', '—', '–',
];

/// Minimum character length for a term to be worth keeping.
const MIN_TERM_CHARS: usize = 3;

/// Canonicalizes a raw extracted token: NFC-normalizes, lowercases, strips
/// the fixed punctuation set and trims surrounding whitespace.
///
/// Pure and total; empty input yields empty output. Idempotent, so values
/// read back from the store can be passed through again safely.
pub fn normalize(raw: &str) -> String {
    raw.nfc()
        .flat_map(char::to_lowercase)
        .filter(|c| !STRIPPED_PUNCTUATION.contains(c))
        .collect::<String>()
        .trim()
        .to_string()
}

/// Whether a candidate term should enter the lexicon for the given topic.
///
/// Rejects terms shorter than three characters and terms that normalize to
/// the current topic, so a cycle never records its own seed as vocabulary.
pub fn is_acceptable(term: &str, topic: &str) -> bool {
    let normalized = normalize(term);
    normalized.chars().count() >= MIN_TERM_CHARS && normalized != normalize(topic)
}
