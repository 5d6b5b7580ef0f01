/// High-frequency English words typed from muscle memory.
const COMMON_WORDS: &[&str] = &[
    "the", "be", "to", "of", "and", "a", "in", "that", "have", "it", "for", "not", "on", "with",
    "he", "as", "you", "do", "at", "this", "but", "his", "by", "from", "they", "we", "say", "her",
    "she", "or", "an", "will", "my", "one", "all", "would", "there", "their", "what", "so", "up",
    "out", "if", "about", "who", "get", "which", "go", "me", "when", "make", "can", "like", "time",
    "no", "just", "him", "know", "take", "people", "into", "year", "your", "good", "some", "could",
    "them", "see", "other", "than", "then", "now", "look", "only", "come", "its", "over", "think",
    "also", "back", "after", "use", "two", "how", "our", "work", "first", "well", "way", "even",
    "new", "want", "because",
];

/// Letter pairs frequent enough to be typed as a single burst.
const COMMON_BIGRAMS: &[&str] = &[
    "th", "he", "in", "er", "an", "re", "on", "at", "en", "nd", "ti", "es", "or", "te", "of", "ed",
    "is", "it", "al", "ar", "st", "to", "nt", "ng", "se", "ha", "as", "ou", "io", "le", "ve", "co",
    "me", "de", "hi", "ri", "ro", "ic", "ne", "ea", "ra", "ce",
];

const AWKWARD_LETTERS: &str = "zxqj";
const TRAILING_PUNCTUATION: &[char] = &['.', ',', '!', '?', ';', ':'];
const COMPLEX_WORD_MIN_LEN: usize = 9;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WordDifficulty {
    Common,
    Normal,
    Complex,
}

pub fn word_difficulty(word: &str) -> WordDifficulty {
    let word = word.trim_end_matches(TRAILING_PUNCTUATION).to_lowercase();

    if COMMON_WORDS.contains(&word.as_str()) {
        return WordDifficulty::Common;
    }

    let is_long = word.chars().count() >= COMPLEX_WORD_MIN_LEN;
    let has_awkward_letter = word.chars().any(|c| AWKWARD_LETTERS.contains(c));
    if is_long || has_awkward_letter {
        WordDifficulty::Complex
    } else {
        WordDifficulty::Normal
    }
}

pub fn is_common_bigram(a: char, b: char) -> bool {
    let bigram: String = a.to_lowercase().chain(b.to_lowercase()).collect();
    COMMON_BIGRAMS.contains(&bigram.as_str())
}
