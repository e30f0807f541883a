//! Crossword-style word grid solver.
//!
//! A grid is described by a [`GridSpec`]: a list of words, each of which
//! occupies an ordered list of letter slots. Slots shared between words must
//! hold the same letter. The solver fills every slot so that each word of the
//! grid is a distinct entry of a [`Dictionary`].
//!
//! # Examples
//!
//! ```
//! use wordgrid_solver::{Dictionary, GridSpec, SlotGrid, solve};
//!
//! // "cat" across, then a down word starting on its last letter.
//! let spec: GridSpec = "0 1 2\n2 3 4".parse()?;
//! let grid = SlotGrid::new(&spec)?;
//! let dict = Dictionary::from_iter(["cat", "tea"]);
//!
//! let solution = solve(&grid, &dict).expect("grid should be solvable");
//! assert_eq!(solution.words(&grid), ["cat", "tea"]);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub use self::{dictionary::*, error::*, grid::*, solver::*};

mod dictionary;
mod error;
mod grid;
mod index;
mod solver;
