use std::collections::HashMap;

use crate::{Dictionary, WordId};

/// A word that fits a search step, split into the letters the step must write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Candidate {
    pub(crate) word: WordId,
    /// Letters at the positions that are not yet known, in reading order.
    pub(crate) fill: Vec<char>,
}

/// Lookup table for words of one length, keyed by the letters at a fixed set
/// of known positions.
#[derive(Debug, Clone)]
pub(crate) struct WordIndex {
    entries: HashMap<Vec<char>, Vec<Candidate>>,
}

impl WordIndex {
    /// Builds the index for `len`-letter words.
    ///
    /// `known` must be sorted ascending and every position must be `< len`.
    pub(crate) fn new(known: &[usize], len: usize, dict: &Dictionary) -> Self {
        debug_assert!(known.windows(2).all(|w| w[0] < w[1]));
        debug_assert!(known.iter().all(|&pos| pos < len));

        let mut is_known = vec![false; len];
        for &pos in known {
            is_known[pos] = true;
        }

        let mut entries: HashMap<Vec<char>, Vec<Candidate>> = HashMap::new();
        for &word in dict.words_of_len(len) {
            let letters = dict.word(word);
            let key = known.iter().map(|&pos| letters[pos]).collect();
            let fill = letters
                .iter()
                .zip(&is_known)
                .filter(|(_, fixed)| !**fixed)
                .map(|(&letter, _)| letter)
                .collect();
            entries
                .entry(key)
                .or_default()
                .push(Candidate { word, fill });
        }

        Self { entries }
    }

    /// Returns the candidates whose known positions hold `letters`, in
    /// dictionary order.
    pub(crate) fn candidates(&self, letters: &[char]) -> &[Candidate] {
        self.entries.get(letters).map_or(&[], Vec::as_slice)
    }
}
