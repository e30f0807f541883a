//! Backtracking search over a [`SlotGrid`].

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{Dictionary, SlotGrid, WordId, index::Candidate, index::WordIndex};

/// Letter placed in slots no word covers.
pub const BLANK: char = ' ';

/// A filled grid: one letter per slot.
///
/// Serializes as an array of one-letter strings, indexed by slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Solution {
    letters: Vec<char>,
}

impl Solution {
    /// Returns the letter of every slot.
    #[must_use]
    pub fn letters(&self) -> &[char] {
        &self.letters
    }

    /// Returns the letters of one grid word.
    ///
    /// # Panics
    ///
    /// Panics if `word` is out of range or `grid` is not the grid this
    /// solution was produced for.
    #[must_use]
    pub fn word(&self, grid: &SlotGrid, word: usize) -> String {
        grid.word_slots(word)
            .iter()
            .map(|&slot| self.letters[slot])
            .collect()
    }

    /// Returns every grid word, in grid order.
    #[must_use]
    pub fn words(&self, grid: &SlotGrid) -> Vec<String> {
        (0..grid.word_count()).map(|w| self.word(grid, w)).collect()
    }
}

/// One word placement of the search.
#[derive(Debug)]
struct Step {
    index: WordIndex,
    /// Slots already written by earlier steps, in reading order.
    inputs: Vec<usize>,
    /// Slots this step writes, in reading order.
    outputs: Vec<usize>,
}

#[derive(Debug)]
struct SearchPlan {
    steps: Vec<Step>,
    slot_count: usize,
}

impl SearchPlan {
    /// Orders the words so each step is as constrained as possible.
    ///
    /// Every slot a step covers adds one constraint to each word through
    /// that slot, whether the step writes the slot or only reads it. The next
    /// word is the one with the most constraints, then the longest, then the
    /// highest index.
    fn new(grid: &SlotGrid, dict: &Dictionary) -> Self {
        let mut constraints = vec![0_usize; grid.word_count()];
        let mut remaining: Vec<usize> = (0..grid.word_count()).collect();
        let mut known = vec![false; grid.slot_count()];
        let mut steps = Vec::with_capacity(grid.word_count());

        loop {
            let Some((pos, word)) = remaining
                .iter()
                .copied()
                .enumerate()
                .max_by_key(|&(_, w)| (constraints[w], grid.word_slots(w).len(), w))
            else {
                break;
            };
            remaining.swap_remove(pos);

            let slots = grid.word_slots(word);
            let mut known_positions = Vec::new();
            let mut inputs = Vec::new();
            let mut outputs = Vec::new();
            for (i, &slot) in slots.iter().enumerate() {
                if known[slot] {
                    known_positions.push(i);
                    inputs.push(slot);
                } else {
                    known[slot] = true;
                    outputs.push(slot);
                }
                for &other in grid.words_at(slot) {
                    constraints[other] += 1;
                }
            }

            steps.push(Step {
                index: WordIndex::new(&known_positions, slots.len(), dict),
                inputs,
                outputs,
            });
        }

        Self {
            steps,
            slot_count: grid.slot_count(),
        }
    }
}

#[derive(Debug, Clone)]
struct SearchState {
    letters: Vec<char>,
    chosen: Vec<WordId>,
}

impl SearchState {
    fn new(plan: &SearchPlan) -> Self {
        Self {
            letters: vec![BLANK; plan.slot_count],
            chosen: Vec::with_capacity(plan.steps.len()),
        }
    }

    fn place(&mut self, step: &Step, candidate: &Candidate) {
        self.chosen.push(candidate.word);
        for (&slot, &letter) in step.outputs.iter().zip(&candidate.fill) {
            self.letters[slot] = letter;
        }
    }

    /// Fills steps `depth..` depth-first. On failure the state is restored
    /// to what it was on entry.
    fn extend(&mut self, plan: &SearchPlan, depth: usize) -> bool {
        let Some(step) = plan.steps.get(depth) else {
            return true;
        };

        let key: Vec<char> = step.inputs.iter().map(|&slot| self.letters[slot]).collect();
        for candidate in step.index.candidates(&key) {
            if self.chosen.contains(&candidate.word) {
                continue;
            }
            self.place(step, candidate);
            if self.extend(plan, depth + 1) {
                return true;
            }
            self.chosen.pop();
        }
        false
    }

    fn into_solution(self) -> Solution {
        Solution {
            letters: self.letters,
        }
    }
}

/// Solves a grid on the current thread.
///
/// Returns the first solution in search order, or `None` if the dictionary
/// cannot fill the grid.
///
/// # Examples
///
/// ```
/// use wordgrid_solver::{Dictionary, GridSpec, SlotGrid, solve};
///
/// let grid = SlotGrid::new(&GridSpec::new(vec![vec![0, 1, 2], vec![2, 3, 4]]))?;
///
/// let dict = Dictionary::from_iter(["cat", "dog"]);
/// assert!(solve(&grid, &dict).is_none());
/// # Ok::<(), wordgrid_solver::GridError>(())
/// ```
#[must_use]
pub fn solve(grid: &SlotGrid, dict: &Dictionary) -> Option<Solution> {
    let plan = SearchPlan::new(grid, dict);
    let mut state = SearchState::new(&plan);
    state.extend(&plan, 0).then(|| state.into_solution())
}

/// Solves a grid on the current rayon thread pool.
///
/// The candidates of the first step are explored in parallel. The result is
/// the same solution [`solve`] returns, whatever the number of threads.
///
/// Run it inside [`rayon::ThreadPool::install`] to choose the pool; otherwise
/// the global pool is used.
#[must_use]
pub fn solve_parallel(grid: &SlotGrid, dict: &Dictionary) -> Option<Solution> {
    let plan = SearchPlan::new(grid, dict);
    let Some(first) = plan.steps.first() else {
        return Some(SearchState::new(&plan).into_solution());
    };

    first
        .index
        .candidates(&[])
        .par_iter()
        .find_map_first(|candidate| {
            let mut state = SearchState::new(&plan);
            state.place(first, candidate);
            state
                .extend(&plan, 1)
                .then(|| state.into_solution())
        })
}
