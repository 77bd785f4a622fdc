//! Backtracking search over partial assignments, on top of the domains pruned
//! by the consistency engine. Variable ordering is minimum-remaining-values
//! with a max-degree tie-break, value ordering is least-constraining-value,
//! and a pairwise consistency predicate guards every tentative assignment.
//!
//! Failure is a normal outcome here, not an error: an unsolvable structure
//! surfaces as `None`, and only malformed collaborator input is rejected as
//! an [`InputError`].

use std::cmp::Reverse;

use instant::{Duration, Instant};
use log::debug;

use crate::consistency::DomainStore;
use crate::structure::{InputError, SlotId, Structure};
use crate::word_list::{WordId, WordList};

/// A partial mapping from slots to chosen words. Grows one slot at a time
/// during search; removal on backtrack restores the prior state exactly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    choices: Vec<Option<WordId>>,
    assigned: usize,
}

impl Assignment {
    pub(crate) fn new(slot_count: usize) -> Assignment {
        Assignment {
            choices: vec![None; slot_count],
            assigned: 0,
        }
    }

    /// Number of slots with an assigned word.
    pub fn len(&self) -> usize {
        self.assigned
    }

    pub fn is_empty(&self) -> bool {
        self.assigned == 0
    }

    /// Complete when every slot of the puzzle has an assigned word.
    pub fn is_complete(&self) -> bool {
        self.assigned == self.choices.len()
    }

    pub fn get(&self, slot: SlotId) -> Option<WordId> {
        self.choices[slot]
    }

    /// The assigned `(slot, word)` pairs, in ascending slot order.
    pub fn iter(&self) -> impl Iterator<Item = (SlotId, WordId)> + '_ {
        self.choices
            .iter()
            .enumerate()
            .filter_map(|(slot, choice)| choice.map(|word| (slot, word)))
    }

    fn set(&mut self, slot: SlotId, word: WordId) {
        debug_assert!(self.choices[slot].is_none(), "slot assigned twice");
        self.choices[slot] = Some(word);
        self.assigned += 1;
    }

    fn clear(&mut self, slot: SlotId) {
        debug_assert!(self.choices[slot].is_some(), "clearing an unassigned slot");
        self.choices[slot] = None;
        self.assigned -= 1;
    }
}

/// Counters describing a single solve.
#[derive(Debug, Clone, Default)]
pub struct Statistics {
    /// Recursion frames entered with an incomplete assignment.
    pub states: u64,
    /// Frames that exhausted every candidate and reported failure upward.
    pub backtracks: u64,
    pub duration: Duration,
}

/// A solver session: one structure, one vocabulary, one domain store, one
/// recursion stack. Sessions are built per call and never shared, so two
/// concurrent solves of different puzzles cannot interfere.
pub struct Solver<'a> {
    structure: &'a Structure,
    words: &'a WordList,
    domains: DomainStore,
    statistics: Statistics,
}

impl<'a> Solver<'a> {
    /// Build a session, failing fast on malformed collaborator input: a
    /// zero-length slot, an asymmetric overlap table, or an empty vocabulary.
    pub fn new(structure: &'a Structure, words: &'a WordList) -> Result<Solver<'a>, InputError> {
        structure.validate()?;
        if words.is_empty() {
            return Err(InputError::EmptyWordList);
        }

        Ok(Solver {
            structure,
            words,
            domains: DomainStore::new(structure, words),
            statistics: Statistics::default(),
        })
    }

    /// Enforce node and arc consistency, then search. Returns a complete
    /// assignment, or `None` if the puzzle has no solution.
    pub fn solve(&mut self) -> Option<Assignment> {
        let start = Instant::now();

        self.domains.enforce_node_consistency(self.structure, self.words);
        let result = if self
            .domains
            .enforce_arc_consistency(self.structure, self.words, None)
        {
            let mut assignment = Assignment::new(self.structure.slot_count());
            self.backtrack(&mut assignment).then_some(assignment)
        } else {
            // Propagation emptied a domain; no assignment can exist.
            None
        };

        self.statistics.duration = start.elapsed();
        debug!("solve finished: {:?}", self.statistics);
        result
    }

    pub fn statistics(&self) -> &Statistics {
        &self.statistics
    }

    /// Classic backtracking: pick a slot, try its candidates in order, recurse
    /// on consistency, undo on failure. Returns whether `assignment` was
    /// completed; on failure the assignment is exactly as it was on entry.
    fn backtrack(&mut self, assignment: &mut Assignment) -> bool {
        if assignment.is_complete() {
            return true;
        }
        self.statistics.states += 1;

        let slot = self.select_unassigned_slot(assignment);
        for word in self.order_candidates(slot, assignment) {
            assignment.set(slot, word);
            if self.is_consistent(assignment) && self.backtrack(assignment) {
                return true;
            }
            assignment.clear(slot);
        }

        self.statistics.backtracks += 1;
        false
    }

    /// Minimum-remaining-values: the unassigned slot with the fewest
    /// candidates left, breaking ties by maximum degree and then by lowest
    /// slot id (`min_by_key` keeps the first minimum).
    fn select_unassigned_slot(&self, assignment: &Assignment) -> SlotId {
        (0..self.structure.slot_count())
            .filter(|&slot| assignment.get(slot).is_none())
            .min_by_key(|&slot| {
                (
                    self.domains.size(slot),
                    Reverse(self.structure.neighbors(slot).len()),
                )
            })
            .expect("slot selection on a complete assignment")
    }

    /// Least-constraining-value: order a slot's candidates ascending by how
    /// many values each would rule out among unassigned neighboring slots,
    /// where a neighbor's domain containing that exact word counts as one
    /// ruled-out value. The sort is stable, so ties keep word-id order.
    fn order_candidates(&self, slot: SlotId, assignment: &Assignment) -> Vec<WordId> {
        let mut candidates: Vec<WordId> = self.domains.candidates(slot).collect();
        candidates.sort_by_key(|&word| {
            self.structure
                .neighbors(slot)
                .iter()
                .filter(|&&neighbor| {
                    assignment.get(neighbor).is_none() && self.domains.contains(neighbor, word)
                })
                .count()
        });
        candidates
    }

    /// The consistency predicate over a (possibly partial) assignment: every
    /// assigned word fits its slot's length, no two slots share a word, and
    /// crossing slots agree on the shared cell. The length check is redundant
    /// once node consistency has run, but the predicate holds it as an
    /// explicit invariant since nothing else enforces it during search.
    fn is_consistent(&self, assignment: &Assignment) -> bool {
        for (x, word_x) in assignment.iter() {
            let chars_x = &self.words.word(word_x).chars;
            if chars_x.len() != self.structure.slot(x).length {
                return false;
            }

            for (y, word_y) in assignment.iter() {
                if x == y {
                    continue;
                }
                if word_x == word_y {
                    return false;
                }
                if let Some((i, j)) = self.structure.overlap(x, y) {
                    let chars_y = &self.words.word(word_y).chars;
                    match (chars_x.get(i), chars_y.get(j)) {
                        (Some(a), Some(b)) if a == b => {}
                        _ => return false,
                    }
                }
            }
        }
        true
    }
}

/// Fill the structure from the vocabulary. `Ok(None)` means the instance has
/// no solution; `Err` means the inputs themselves were malformed.
pub fn solve(structure: &Structure, words: &WordList) -> Result<Option<Assignment>, InputError> {
    let mut solver = Solver::new(structure, words)?;
    Ok(solver.solve())
}
