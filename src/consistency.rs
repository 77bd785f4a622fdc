//! The domain store and the consistency engine that prunes it: node
//! consistency (word length must match slot length) and an AC-3 style
//! arc-consistency propagation over the structure's overlap table.
//!
//! Domains only ever shrink, and only the passes in this module shrink them;
//! the backtracking search reads domains but never writes them. Every pass
//! builds a fresh filtered set instead of removing words while iterating.

use std::collections::{HashSet, VecDeque};

use bit_set::BitSet;
use log::debug;

use crate::structure::{SlotId, Structure};
use crate::word_list::{WordId, WordList};
use crate::CHECK_INVARIANTS;

/// Mutable mapping from each slot to its current candidate word set. Created
/// once per solve with every slot holding the full vocabulary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainStore {
    /// Indexed by `SlotId`; each set holds `WordId`s.
    domains: Vec<BitSet>,
}

impl DomainStore {
    pub fn new(structure: &Structure, words: &WordList) -> DomainStore {
        let full: BitSet = (0..words.len()).collect();
        DomainStore {
            domains: structure.slots().iter().map(|_| full.clone()).collect(),
        }
    }

    /// Number of candidates left for a slot.
    pub fn size(&self, slot: SlotId) -> usize {
        self.domains[slot].len()
    }

    pub fn contains(&self, slot: SlotId, word: WordId) -> bool {
        self.domains[slot].contains(word)
    }

    /// The candidates for a slot, in ascending word-id order.
    pub fn candidates(&self, slot: SlotId) -> impl Iterator<Item = WordId> + '_ {
        self.domains[slot].iter()
    }

    /// Remove from every slot's domain the words whose length differs from
    /// the slot's length. A pure per-slot filter; running it again on an
    /// already node-consistent store changes nothing.
    pub fn enforce_node_consistency(&mut self, structure: &Structure, words: &WordList) {
        for slot in structure.slots() {
            let filtered: BitSet = self.domains[slot.id]
                .iter()
                .filter(|&word_id| words.word(word_id).chars.len() == slot.length)
                .collect();
            self.domains[slot.id] = filtered;
        }
    }

    /// Make slot `x` arc-consistent with slot `y`: remove from x's domain
    /// every word with no supporting word in y's domain at the overlap
    /// positions. Returns whether x's domain changed. Pairs with no overlap
    /// are trivially consistent and never revised.
    pub fn revise(&mut self, x: SlotId, y: SlotId, structure: &Structure, words: &WordList) -> bool {
        let (xi, yj) = match structure.overlap(x, y) {
            Some(overlap) => overlap,
            None => return false,
        };

        // The characters y's remaining candidates can still place in the
        // shared cell.
        let support: HashSet<char> = self.domains[y]
            .iter()
            .filter_map(|word_id| words.word(word_id).chars.get(yj).copied())
            .collect();

        let revised: BitSet = self.domains[x]
            .iter()
            .filter(|&word_id| match words.word(word_id).chars.get(xi) {
                Some(c) => support.contains(c),
                None => false,
            })
            .collect();

        if CHECK_INVARIANTS {
            assert!(revised.is_subset(&self.domains[x]), "revise grew a domain");
        }

        let changed = revised.len() != self.domains[x].len();
        self.domains[x] = revised;
        changed
    }

    /// AC-3: propagate arc consistency to a global fixpoint. The worklist
    /// starts as all ordered pairs of distinct slots, or as the given subset.
    /// Returns false as soon as any domain empties (no solution possible);
    /// true once the worklist drains with every domain non-empty.
    pub fn enforce_arc_consistency(
        &mut self,
        structure: &Structure,
        words: &WordList,
        arcs: Option<Vec<(SlotId, SlotId)>>,
    ) -> bool {
        let mut worklist: VecDeque<(SlotId, SlotId)> = match arcs {
            Some(arcs) => arcs.into(),
            None => {
                let slot_count = structure.slot_count();
                (0..slot_count)
                    .flat_map(|x| (0..slot_count).filter(move |&y| y != x).map(move |y| (x, y)))
                    .collect()
            }
        };

        while let Some((x, y)) = worklist.pop_front() {
            if !self.revise(x, y, structure, words) {
                continue;
            }
            if self.domains[x].is_empty() {
                debug!("slot {x} wiped out while revising against slot {y}");
                return false;
            }
            // Shrinking x may invalidate support that its other crossings
            // established earlier.
            for &z in structure.neighbors(x) {
                if z != y {
                    worklist.push_back((z, x));
                }
            }
        }

        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structure::Direction::{Across, Down};
    use proptest::prelude::*;

    /// Across slot at (0, 0) crossing a down slot at (0, 2): the across
    /// word's last letter must equal the down word's first letter.
    fn crossing_pair() -> Structure {
        Structure::from_slots([((0, 0), Across, 3), ((0, 2), Down, 3)]).unwrap()
    }

    fn store(structure: &Structure, words: &WordList) -> DomainStore {
        let mut domains = DomainStore::new(structure, words);
        domains.enforce_node_consistency(structure, words);
        domains
    }

    /// Every word left in every domain has a supporting word in every
    /// crossing domain.
    fn assert_arc_consistent(domains: &DomainStore, structure: &Structure, words: &WordList) {
        for x in 0..structure.slot_count() {
            for &y in structure.neighbors(x) {
                let (xi, yj) = structure.overlap(x, y).unwrap();
                for word_x in domains.candidates(x) {
                    let supported = domains.candidates(y).any(|word_y| {
                        words.word(word_x).chars[xi] == words.word(word_y).chars[yj]
                    });
                    assert!(
                        supported,
                        "{} in slot {x} has no support in slot {y}",
                        words.word(word_x).string
                    );
                }
            }
        }
    }

    #[test]
    fn node_consistency_keeps_only_matching_lengths() {
        let structure =
            Structure::from_slots([((0, 0), Across, 3), ((0, 0), Down, 4)]).unwrap();
        let words = WordList::new(["cat", "dogs", "art", "be"]);

        let domains = store(&structure, &words);

        for slot in structure.slots() {
            for word_id in domains.candidates(slot.id) {
                assert_eq!(words.word(word_id).chars.len(), slot.length);
            }
        }
        assert_eq!(domains.size(0), 2);
        assert_eq!(domains.size(1), 1);
    }

    #[test]
    fn node_consistency_is_idempotent() {
        let structure = crossing_pair();
        let words = WordList::new(["cat", "dogs", "art", "be"]);

        let mut domains = store(&structure, &words);
        let once = domains.clone();
        domains.enforce_node_consistency(&structure, &words);

        assert_eq!(domains, once);
    }

    #[test]
    fn revise_removes_words_without_support() {
        let structure = crossing_pair();
        let words = WordList::new(["cat", "car", "art", "dog", "rat"]);
        let mut domains = store(&structure, &words);

        // The down slot must start with one of the across words' last
        // letters {t, r, g}; only "rat" qualifies.
        let changed = domains.revise(1, 0, &structure, &words);

        assert!(changed);
        let remaining: Vec<_> = domains.candidates(1).collect();
        assert_eq!(remaining, vec![words.id_of("rat").unwrap()]);
    }

    #[test]
    fn revise_reports_no_change_when_all_words_are_supported() {
        let structure = crossing_pair();
        let words = WordList::new(["tar", "rat"]);
        let mut domains = store(&structure, &words);

        // Across last letters {r, t} support both down candidates.
        assert!(!domains.revise(1, 0, &structure, &words));
        assert_eq!(domains.size(1), 2);
    }

    #[test]
    fn revise_skips_pairs_with_no_overlap() {
        let structure =
            Structure::from_slots([((0, 0), Across, 3), ((2, 0), Across, 3)]).unwrap();
        let words = WordList::new(["cat", "dog"]);
        let mut domains = store(&structure, &words);

        assert!(!domains.revise(0, 1, &structure, &words));
        assert_eq!(domains.size(0), 2);
    }

    #[test]
    fn propagation_reaches_an_arc_consistent_fixpoint() {
        let structure = crossing_pair();
        let words = WordList::new(["cat", "car", "art", "dog", "rat", "tam"]);
        let mut domains = store(&structure, &words);

        assert!(domains.enforce_arc_consistency(&structure, &words, None));
        assert_arc_consistent(&domains, &structure, &words);
        // "dog" survives in neither slot: no down word starts with g, and no
        // across word ends with d.
        let dog = words.id_of("dog").unwrap();
        assert!(!domains.contains(0, dog));
        assert!(!domains.contains(1, dog));
    }

    #[test]
    fn propagation_fails_fast_on_an_emptied_domain() {
        // The down slot needs a word starting with the across word's middle
        // letter ('a' or 'o'), and none exists.
        let structure =
            Structure::from_slots([((0, 0), Across, 3), ((0, 1), Down, 3)]).unwrap();
        let words = WordList::new(["cat", "dog"]);
        let mut domains = store(&structure, &words);

        assert!(!domains.enforce_arc_consistency(&structure, &words, None));
    }

    #[test]
    fn caller_supplied_arcs_limit_the_initial_worklist() {
        let structure = crossing_pair();
        let words = WordList::new(["cat", "car", "art", "rat"]);
        let mut domains = store(&structure, &words);

        // Only revise the across slot against the down slot; the down slot's
        // own unsupported words stay put.
        assert!(domains.enforce_arc_consistency(&structure, &words, Some(vec![(0, 1)])));

        // Across words ending in a letter no down word starts with are gone.
        let art = words.id_of("art").unwrap();
        assert!(!domains.contains(0, art));
        // The down slot was never the target of a revision here.
        assert_eq!(domains.size(1), 4);
    }

    proptest! {
        #[test]
        fn node_consistency_is_idempotent_for_any_vocabulary(
            raw in proptest::collection::vec("[a-z]{1,6}", 1..40),
        ) {
            let structure = crossing_pair();
            let words = WordList::new(raw);

            let mut domains = DomainStore::new(&structure, &words);
            domains.enforce_node_consistency(&structure, &words);
            let once = domains.clone();
            domains.enforce_node_consistency(&structure, &words);

            prop_assert_eq!(domains, once);
        }

        #[test]
        fn propagation_only_shrinks_domains(
            raw in proptest::collection::vec("[a-z]{1,6}", 1..40),
        ) {
            let structure = crossing_pair();
            let words = WordList::new(raw);

            let mut domains = DomainStore::new(&structure, &words);
            domains.enforce_node_consistency(&structure, &words);
            let before = domains.clone();
            domains.enforce_arc_consistency(&structure, &words, None);

            for slot in 0..structure.slot_count() {
                prop_assert!(domains.size(slot) <= before.size(slot));
                prop_assert!(domains.domains[slot].is_subset(&before.domains[slot]));
            }
        }
    }
}
