//! The vocabulary: candidate words and their per-cell characters.

use smallvec::SmallVec;

use crate::MAX_SLOT_LENGTH;

/// An identifier for a given word, based on its index in the word list.
pub type WordId = usize;

/// A word that can be chosen for a slot. The characters are stored unpacked
/// so that overlap checks can index into them directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Word {
    pub string: String,
    pub chars: SmallVec<[char; MAX_SLOT_LENGTH]>,
}

impl Word {
    fn new(string: String) -> Word {
        let chars = string.chars().collect();
        Word { string, chars }
    }
}

/// An ordered, duplicate-free vocabulary. Word ids follow insertion order,
/// which is what fixes the solver's iteration order over domains.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WordList {
    words: Vec<Word>,
}

impl WordList {
    /// Build a word list, lowercasing every entry and dropping duplicates
    /// while keeping the first occurrence.
    pub fn new(words: impl IntoIterator<Item = impl Into<String>>) -> WordList {
        let mut seen = std::collections::HashSet::new();
        let words = words
            .into_iter()
            .map(|word| word.into().to_lowercase())
            .filter(|word| seen.insert(word.clone()))
            .map(Word::new)
            .collect();
        WordList { words }
    }

    /// Parse a plain-text word list: one word per line, trimmed, with blank
    /// lines skipped.
    pub fn parse(text: &str) -> WordList {
        WordList::new(text.lines().map(str::trim).filter(|line| !line.is_empty()))
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn word(&self, id: WordId) -> &Word {
        &self.words[id]
    }

    pub fn words(&self) -> &[Word] {
        &self.words
    }

    /// The id of the given word, if present. Intended for tests and callers
    /// that want to inspect a solution by string.
    pub fn id_of(&self, string: &str) -> Option<WordId> {
        self.words.iter().position(|word| word.string == string)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parsing_trims_lowercases_and_dedupes() {
        let words = WordList::parse("CAT\n  dog \n\ncat\nart\n");

        let strings: Vec<_> = words.words().iter().map(|w| w.string.as_str()).collect();
        assert_eq!(strings, vec!["cat", "dog", "art"]);
        assert_eq!(words.id_of("dog"), Some(1));
        assert_eq!(words.id_of("bird"), None);
    }

    #[test]
    fn words_expose_per_cell_chars() {
        let words = WordList::new(["cat"]);
        assert_eq!(words.word(0).chars.as_slice(), &['c', 'a', 't']);
    }
}
