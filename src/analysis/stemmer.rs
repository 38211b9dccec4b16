//! Stemming algorithms for reducing words to their root forms.

/// Trait for stemming algorithms.
pub trait Stemmer: Send + Sync {
    /// Stem a lowercase word to its root form.
    fn stem(&self, word: &str) -> String;

    /// Get the name of this stemmer.
    fn name(&self) -> &'static str;
}

/// Porter stemming algorithm for English.
///
/// Words that are not plain ASCII letters are returned unchanged, as are
/// words of two characters or fewer.
#[derive(Debug, Clone, Copy, Default)]
pub struct PorterStemmer;

const STEP2_RULES: &[(&str, &str)] = &[
    ("ational", "ate"),
    ("tional", "tion"),
    ("enci", "ence"),
    ("anci", "ance"),
    ("izer", "ize"),
    ("abli", "able"),
    ("alli", "al"),
    ("entli", "ent"),
    ("eli", "e"),
    ("ousli", "ous"),
    ("ization", "ize"),
    ("ation", "ate"),
    ("ator", "ate"),
    ("alism", "al"),
    ("iveness", "ive"),
    ("fulness", "ful"),
    ("ousness", "ous"),
    ("aliti", "al"),
    ("iviti", "ive"),
    ("biliti", "ble"),
];

const STEP3_RULES: &[(&str, &str)] = &[
    ("icate", "ic"),
    ("ative", ""),
    ("alize", "al"),
    ("iciti", "ic"),
    ("ical", "ic"),
    ("ful", ""),
    ("ness", ""),
];

// Ordered so that a longer suffix is tried before any suffix it ends with.
const STEP4_SUFFIXES: &[&str] = &[
    "al", "ance", "ence", "er", "ic", "able", "ible", "ant", "ement", "ment", "ent", "ion", "ou",
    "ism", "ate", "iti", "ous", "ive", "ize",
];

impl PorterStemmer {
    /// Create a new Porter stemmer.
    pub fn new() -> Self {
        PorterStemmer
    }

    fn step1a(word: &mut Vec<u8>) {
        if word.ends_with(b"sses") || word.ends_with(b"ies") {
            word.truncate(word.len() - 2);
        } else if word.ends_with(b"s") && !word.ends_with(b"ss") {
            word.pop();
        }
    }

    fn step1b(word: &mut Vec<u8>) {
        if word.ends_with(b"eed") {
            if measure(&word[..word.len() - 3]) > 0 {
                word.pop();
            }
            return;
        }

        let removed = if word.ends_with(b"ed") && contains_vowel(&word[..word.len() - 2]) {
            word.truncate(word.len() - 2);
            true
        } else if word.ends_with(b"ing") && contains_vowel(&word[..word.len() - 3]) {
            word.truncate(word.len() - 3);
            true
        } else {
            false
        };

        if !removed {
            return;
        }

        if word.ends_with(b"at") || word.ends_with(b"bl") || word.ends_with(b"iz") {
            word.push(b'e');
        } else if ends_double_consonant(word) && !matches!(word.last(), Some(b'l' | b's' | b'z')) {
            word.pop();
        } else if measure(word) == 1 && ends_cvc(word) {
            word.push(b'e');
        }
    }

    fn step1c(word: &mut Vec<u8>) {
        let len = word.len();
        if word.ends_with(b"y") && contains_vowel(&word[..len - 1]) {
            word[len - 1] = b'i';
        }
    }

    fn replace_rules(word: &mut Vec<u8>, rules: &[(&str, &str)]) {
        for (suffix, replacement) in rules {
            if word.ends_with(suffix.as_bytes()) {
                let stem_len = word.len() - suffix.len();
                if measure(&word[..stem_len]) > 0 {
                    word.truncate(stem_len);
                    word.extend_from_slice(replacement.as_bytes());
                }
                return;
            }
        }
    }

    fn step4(word: &mut Vec<u8>) {
        for suffix in STEP4_SUFFIXES {
            if word.ends_with(suffix.as_bytes()) {
                let stem_len = word.len() - suffix.len();
                let stem = &word[..stem_len];
                let allowed = *suffix != "ion" || matches!(stem.last(), Some(b's' | b't'));
                if allowed && measure(stem) > 1 {
                    word.truncate(stem_len);
                }
                return;
            }
        }
    }

    fn step5(word: &mut Vec<u8>) {
        if word.ends_with(b"e") {
            let stem = &word[..word.len() - 1];
            let m = measure(stem);
            if m > 1 || (m == 1 && !ends_cvc(stem)) {
                word.pop();
            }
        }

        if measure(word) > 1 && ends_double_consonant(word) && word.ends_with(b"l") {
            word.pop();
        }
    }
}

impl Stemmer for PorterStemmer {
    fn stem(&self, word: &str) -> String {
        if word.len() <= 2 || !word.bytes().all(|b| b.is_ascii_lowercase()) {
            return word.to_string();
        }

        let mut bytes = word.as_bytes().to_vec();
        Self::step1a(&mut bytes);
        Self::step1b(&mut bytes);
        Self::step1c(&mut bytes);
        Self::replace_rules(&mut bytes, STEP2_RULES);
        Self::replace_rules(&mut bytes, STEP3_RULES);
        Self::step4(&mut bytes);
        Self::step5(&mut bytes);

        // only ASCII letters ever enter or leave the buffer
        String::from_utf8(bytes).unwrap_or_else(|_| word.to_string())
    }

    fn name(&self) -> &'static str {
        "porter"
    }
}

fn is_consonant(word: &[u8], i: usize) -> bool {
    match word[i] {
        b'a' | b'e' | b'i' | b'o' | b'u' => false,
        b'y' => i == 0 || !is_consonant(word, i - 1),
        _ => true,
    }
}

/// Number of vowel-consonant sequences in `word`.
fn measure(word: &[u8]) -> usize {
    let len = word.len();
    let mut i = 0;
    while i < len && is_consonant(word, i) {
        i += 1;
    }

    let mut m = 0;
    loop {
        while i < len && !is_consonant(word, i) {
            i += 1;
        }
        if i >= len {
            return m;
        }
        while i < len && is_consonant(word, i) {
            i += 1;
        }
        m += 1;
    }
}

fn contains_vowel(word: &[u8]) -> bool {
    (0..word.len()).any(|i| !is_consonant(word, i))
}

fn ends_double_consonant(word: &[u8]) -> bool {
    let len = word.len();
    len >= 2 && word[len - 1] == word[len - 2] && is_consonant(word, len - 1)
}

fn ends_cvc(word: &[u8]) -> bool {
    let len = word.len();
    len >= 3
        && is_consonant(word, len - 3)
        && !is_consonant(word, len - 2)
        && is_consonant(word, len - 1)
        && !matches!(word[len - 1], b'w' | b'x' | b'y')
}
