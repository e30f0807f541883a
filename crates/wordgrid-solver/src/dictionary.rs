//! Word lists grouped by length.

use std::collections::{HashMap, HashSet};

/// Identifier of a word inside a [`Dictionary`].
///
/// Identifiers are assigned in insertion order and stay stable for the
/// lifetime of the dictionary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WordId(usize);

impl WordId {
    /// Returns the position of the word in insertion order.
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

/// A set of candidate words, indexed by length.
///
/// Words are trimmed and lowercased on insertion. Empty entries and
/// duplicates are dropped, so the same word can never fill two grid entries.
///
/// # Examples
///
/// ```
/// use wordgrid_solver::Dictionary;
///
/// let dict = Dictionary::from_iter(["Cat", "dog", "cat", "", "tea "]);
/// assert_eq!(dict.len(), 3);
/// assert_eq!(dict.words_of_len(3).len(), 3);
/// assert!(dict.words_of_len(4).is_empty());
/// ```
#[derive(Debug, Clone, Default)]
pub struct Dictionary {
    words: Vec<Vec<char>>,
    by_len: HashMap<usize, Vec<WordId>>,
}

impl Dictionary {
    /// Creates an empty dictionary.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of distinct words.
    #[must_use]
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Returns `true` if the dictionary holds no words.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Returns the letters of a word.
    ///
    /// # Panics
    ///
    /// Panics if `id` was not produced by this dictionary.
    #[must_use]
    pub fn word(&self, id: WordId) -> &[char] {
        &self.words[id.0]
    }

    /// Returns the identifiers of all words with exactly `len` letters.
    #[must_use]
    pub fn words_of_len(&self, len: usize) -> &[WordId] {
        self.by_len.get(&len).map_or(&[], Vec::as_slice)
    }

    fn extend_words<I, S>(&mut self, words: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen: HashSet<Vec<char>> = self.words.iter().cloned().collect();
        for raw in words {
            let word: Vec<char> = raw.as_ref().trim().to_lowercase().chars().collect();
            if word.is_empty() || !seen.insert(word.clone()) {
                continue;
            }
            let id = WordId(self.words.len());
            self.by_len.entry(word.len()).or_default().push(id);
            self.words.push(word);
        }
    }
}

impl<S> FromIterator<S> for Dictionary
where
    S: AsRef<str>,
{
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut dict = Self::new();
        dict.extend_words(iter);
        dict
    }
}

impl<S> Extend<S> for Dictionary
where
    S: AsRef<str>,
{
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        self.extend_words(iter);
    }
}
