//! Crossword grid filling, treated as a constraint-satisfaction problem.
//!
//! A [`structure::Structure`] describes the geometry of a grid: the slots that
//! need words and the cells where they cross. A [`word_list::WordList`] is the
//! vocabulary. The solver narrows each slot's candidate set with node and arc
//! consistency ([`consistency`]) and then runs a backtracking search with
//! variable- and value-ordering heuristics ([`search`]) to find a complete
//! assignment, or to establish that none exists.
//!
//! Given a fixed structure and word list, the whole pipeline is deterministic:
//! slots iterate in id order, domains in word-list order, sorts are stable,
//! and remaining ties in slot selection resolve to the lowest id.

pub mod consistency;
pub mod render;
pub mod search;
pub mod structure;
pub mod word_list;

/// Should we run extra checks to validate that we're never in an invalid state
/// during propagation and search? This can be enabled with
/// `--features check_invariants` when debugging or making risky algorithm
/// changes.
pub const CHECK_INVARIANTS: bool = cfg!(feature = "check_invariants");

/// The expected maximum number of slots appearing in a grid.
pub const MAX_SLOT_COUNT: usize = 256;

/// The expected maximum length for a single slot.
pub const MAX_SLOT_LENGTH: usize = 21;
