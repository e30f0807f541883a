//! Grid descriptions and their validated form.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{GridError, GridParseError};

/// Raw grid description.
///
/// Each entry lists the slots one word occupies, in reading order. Slots are
/// plain indices; a slot listed by several words is a crossing. On the wire a
/// spec is a nested array, e.g. `[[0, 1, 2], [2, 3, 4]]`.
///
/// The text form used by [`FromStr`] has one word per line, with slot indices
/// separated by commas or whitespace. Blank lines and `#` comments are
/// ignored.
///
/// # Examples
///
/// ```
/// use wordgrid_solver::GridSpec;
///
/// let spec: GridSpec = "
///     ## across
///     0, 1, 2
///     ## down
///     2 3 4
/// "
/// .parse()?;
/// assert_eq!(spec.words(), [vec![0, 1, 2], vec![2, 3, 4]]);
/// # Ok::<(), wordgrid_solver::GridParseError>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GridSpec {
    words: Vec<Vec<usize>>,
}

impl GridSpec {
    /// Creates a spec from per-word slot lists.
    #[must_use]
    pub fn new(words: Vec<Vec<usize>>) -> Self {
        Self { words }
    }

    /// Returns the per-word slot lists.
    #[must_use]
    pub fn words(&self) -> &[Vec<usize>] {
        &self.words
    }
}

impl From<Vec<Vec<usize>>> for GridSpec {
    fn from(words: Vec<Vec<usize>>) -> Self {
        Self::new(words)
    }
}

impl FromStr for GridSpec {
    type Err = GridParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut words = Vec::new();
        for (i, line) in s.lines().enumerate() {
            let content = line.split_once('#').map_or(line, |(before, _)| before);
            let slots = content
                .split(|c: char| c == ',' || c.is_whitespace())
                .filter(|token| !token.is_empty())
                .map(|token| {
                    token.parse::<usize>().map_err(|_| GridParseError {
                        line: i + 1,
                        token: token.to_owned(),
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;
            if !slots.is_empty() {
                words.push(slots);
            }
        }
        Ok(Self { words })
    }
}

/// A validated grid, ready to be solved.
///
/// # Examples
///
/// ```
/// use wordgrid_solver::{GridSpec, SlotGrid};
///
/// let spec = GridSpec::new(vec![vec![0, 1], vec![2, 3], vec![0, 2], vec![1, 3]]);
/// let grid = SlotGrid::new(&spec)?;
/// assert_eq!(grid.slot_count(), 4);
/// assert_eq!(grid.word_count(), 4);
/// assert_eq!(grid.words_at(0), [0, 2]);
/// # Ok::<(), wordgrid_solver::GridError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotGrid {
    words: Vec<Vec<usize>>,
    slot_to_words: Vec<Vec<usize>>,
}

impl SlotGrid {
    /// Validates a spec.
    ///
    /// The slot count is one more than the highest slot index; slots that no
    /// word uses stay blank in a solution. Slot indices must be below the
    /// total number of slot references, so the grid never grows larger than
    /// its description.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::NoWords`] for an empty spec,
    /// [`GridError::EmptyWord`] if a word has no slots,
    /// [`GridError::RepeatedSlot`] if a word lists a slot twice, and
    /// [`GridError::SlotOutOfRange`] if a slot index is too large.
    pub fn new(spec: &GridSpec) -> Result<Self, GridError> {
        if spec.words.is_empty() {
            return Err(GridError::NoWords);
        }

        let limit: usize = spec.words.iter().map(Vec::len).sum();
        let mut slot_count = 0;
        for (word, slots) in spec.words.iter().enumerate() {
            if slots.is_empty() {
                return Err(GridError::EmptyWord { word });
            }
            for (i, &slot) in slots.iter().enumerate() {
                if slot >= limit {
                    return Err(GridError::SlotOutOfRange { word, slot, limit });
                }
                if slots[..i].contains(&slot) {
                    return Err(GridError::RepeatedSlot { word, slot });
                }
                // `slot < limit`, so this cannot overflow.
                slot_count = usize::max(slot_count, slot + 1);
            }
        }

        let mut slot_to_words = vec![Vec::new(); slot_count];
        for (word, slots) in spec.words.iter().enumerate() {
            for &slot in slots {
                slot_to_words[slot].push(word);
            }
        }

        Ok(Self {
            words: spec.words.clone(),
            slot_to_words,
        })
    }

    /// Returns the number of letter slots.
    #[must_use]
    pub fn slot_count(&self) -> usize {
        self.slot_to_words.len()
    }

    /// Returns the number of words.
    #[must_use]
    pub fn word_count(&self) -> usize {
        self.words.len()
    }

    /// Returns the slots of a word in reading order.
    ///
    /// # Panics
    ///
    /// Panics if `word` is out of range.
    #[must_use]
    pub fn word_slots(&self, word: usize) -> &[usize] {
        &self.words[word]
    }

    /// Returns the words that cross at `slot`.
    ///
    /// # Panics
    ///
    /// Panics if `slot` is out of range.
    #[must_use]
    pub fn words_at(&self, slot: usize) -> &[usize] {
        &self.slot_to_words[slot]
    }
}

impl TryFrom<&GridSpec> for SlotGrid {
    type Error = GridError;

    fn try_from(spec: &GridSpec) -> Result<Self, Self::Error> {
        Self::new(spec)
    }
}
