/// Errors that can occur while validating a [`GridSpec`](crate::GridSpec).
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum GridError {
    /// The grid does not contain any word.
    #[display("grid has no words")]
    NoWords,
    /// A word does not occupy any slot.
    #[display("word {word} has no slots")]
    EmptyWord {
        /// Index of the offending word.
        word: usize,
    },
    /// A word occupies the same slot more than once.
    #[display("word {word} uses slot {slot} more than once")]
    RepeatedSlot {
        /// Index of the offending word.
        word: usize,
        /// The repeated slot.
        slot: usize,
    },
    /// A slot index is not below the number of slot references in the grid.
    #[display("word {word} uses slot {slot}, but slot indices must be below {limit}")]
    SlotOutOfRange {
        /// Index of the offending word.
        word: usize,
        /// The out-of-range slot.
        slot: usize,
        /// Total number of slot references across all words.
        limit: usize,
    },
}

/// Errors that can occur while parsing a [`GridSpec`](crate::GridSpec) from text.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("line {line}: invalid slot index {token:?}")]
pub struct GridParseError {
    /// One-based line number.
    pub line: usize,
    /// The token that failed to parse.
    pub token: String,
}
