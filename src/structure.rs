//! Static grid geometry: slots, the overlap table between crossing slots, and
//! parsing of template strings into a [`Structure`]. Everything here is
//! immutable once built; the solver only reads it.

use std::collections::{HashMap, HashSet};
use std::hash::{Hash, Hasher};

use smallvec::SmallVec;

use crate::{MAX_SLOT_COUNT, MAX_SLOT_LENGTH};

/// An identifier for a given slot, based on its index in the Structure's
/// `slots` field.
pub type SlotId = usize;

/// Zero-indexed (row, column) coords for a cell in the grid, where row 0 is
/// the top row.
pub type GridCoord = (usize, usize);

/// A pair of character offsets `(i, j)` at which two crossing slots must
/// agree: position `i` of the first slot's word shares a cell with position
/// `j` of the second slot's word.
pub type Overlap = (usize, usize);

/// Direction that a slot is facing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Across,
    Down,
}

/// A slot in the grid: a maximal run of open cells in one direction, the unit
/// a word is assigned to.
///
/// Identity is the geometry alone — two slots are equal iff their start cell,
/// direction, and length all match. The `id` is positional bookkeeping within
/// one `Structure` and takes no part in equality or hashing.
#[derive(Debug, Clone)]
pub struct Slot {
    pub id: SlotId,
    pub start: GridCoord,
    pub direction: Direction,
    pub length: usize,
}

impl Slot {
    /// Generate the coords for each cell of this slot, in word order.
    pub fn cell_coords(&self) -> impl Iterator<Item = GridCoord> + '_ {
        let (row, col) = self.start;
        (0..self.length).map(move |cell_idx| match self.direction {
            Direction::Across => (row, col + cell_idx),
            Direction::Down => (row + cell_idx, col),
        })
    }
}

impl PartialEq for Slot {
    fn eq(&self, other: &Self) -> bool {
        self.start == other.start
            && self.direction == other.direction
            && self.length == other.length
    }
}

impl Eq for Slot {}

impl Hash for Slot {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.start.hash(state);
        self.direction.hash(state);
        self.length.hash(state);
    }
}

/// Precondition violations in collaborator-supplied input. These indicate a
/// bug in whatever produced the structure or word list, not an unsolvable
/// puzzle, so the solver rejects them up front instead of reporting
/// "no solution".
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum InputError {
    #[display("slot {slot} has zero length")]
    ZeroLengthSlot { slot: SlotId },

    #[display("slots {a} and {b} run in the same direction through a shared cell")]
    OverlappingParallelSlots { a: SlotId, b: SlotId },

    #[display("overlap table is asymmetric for slots {a} and {b}")]
    AsymmetricOverlap { a: SlotId, b: SlotId },

    #[display("word list is empty")]
    EmptyWordList,
}

/// An immutable grid description: the slot set, the overlap table between
/// every pair of slots, and the open cells (kept around for rendering).
pub struct Structure {
    slots: SmallVec<[Slot; MAX_SLOT_COUNT]>,
    /// `overlaps[x][y]` is the character-offset pair for slots x and y, or
    /// `None` when they share no cell. Symmetric by construction:
    /// `overlaps[x][y] == Some((i, j))` implies `overlaps[y][x] == Some((j, i))`.
    overlaps: Vec<Vec<Option<Overlap>>>,
    /// For each slot, the ids of the slots it crosses, in ascending order.
    neighbors: Vec<SmallVec<[SlotId; MAX_SLOT_LENGTH]>>,
    rows: usize,
    cols: usize,
    open_cells: HashSet<GridCoord>,
}

impl Structure {
    /// Build a structure from `(start, direction, length)` triples, deriving
    /// the overlap table from the cell geometry. Slot ids follow the input
    /// order.
    pub fn from_slots(
        entries: impl IntoIterator<Item = (GridCoord, Direction, usize)>,
    ) -> Result<Structure, InputError> {
        let slots: SmallVec<[Slot; MAX_SLOT_COUNT]> = entries
            .into_iter()
            .enumerate()
            .map(|(id, (start, direction, length))| Slot {
                id,
                start,
                direction,
                length,
            })
            .collect();

        for slot in &slots {
            if slot.length == 0 {
                return Err(InputError::ZeroLengthSlot { slot: slot.id });
            }
        }

        // Map each cell to the slots passing through it so that we can derive
        // the overlap table.
        let mut cell_slots: HashMap<GridCoord, Vec<(SlotId, usize)>> = HashMap::new();
        for slot in &slots {
            for (cell_idx, coord) in slot.cell_coords().enumerate() {
                cell_slots.entry(coord).or_default().push((slot.id, cell_idx));
            }
        }

        let slot_count = slots.len();
        let mut overlaps: Vec<Vec<Option<Overlap>>> = vec![vec![None; slot_count]; slot_count];

        for entries in cell_slots.values() {
            for (idx, &(a, a_cell)) in entries.iter().enumerate() {
                for &(b, b_cell) in &entries[idx + 1..] {
                    if slots[a].direction == slots[b].direction {
                        return Err(InputError::OverlappingParallelSlots { a, b });
                    }
                    overlaps[a][b] = Some((a_cell, b_cell));
                    overlaps[b][a] = Some((b_cell, a_cell));
                }
            }
        }

        let neighbors: Vec<SmallVec<[SlotId; MAX_SLOT_LENGTH]>> = (0..slot_count)
            .map(|x| (0..slot_count).filter(|&y| overlaps[x][y].is_some()).collect())
            .collect();

        let open_cells: HashSet<GridCoord> =
            slots.iter().flat_map(|slot| slot.cell_coords()).collect();
        let rows = open_cells.iter().map(|&(row, _)| row + 1).max().unwrap_or(0);
        let cols = open_cells.iter().map(|&(_, col)| col + 1).max().unwrap_or(0);

        Ok(Structure {
            slots,
            overlaps,
            neighbors,
            rows,
            cols,
            open_cells,
        })
    }

    /// Parse a structure from a string template, with `#` representing a
    /// block and any other non-whitespace character an open cell. Maximal
    /// runs of two or more open cells become slots: across runs first in
    /// row-major order, then down runs in column-major order. Lines are
    /// trimmed and blank lines skipped; short lines are padded with blocks.
    pub fn parse(template: &str) -> Result<Structure, InputError> {
        let grid: Vec<Vec<char>> = template
            .lines()
            .filter_map(|line| {
                let line = line.trim();
                if line.is_empty() {
                    None
                } else {
                    Some(line.chars().collect())
                }
            })
            .collect();

        let rows = grid.len();
        let cols = grid.iter().map(|line| line.len()).max().unwrap_or(0);
        let open = |row: usize, col: usize| {
            grid[row].get(col).map(|&c| c != '#').unwrap_or(false)
        };

        let mut entries: Vec<(GridCoord, Direction, usize)> = vec![];

        let mut push_runs = |cells: Vec<GridCoord>, direction: Direction| {
            let mut run: Vec<GridCoord> = vec![];
            for coord in cells.into_iter().chain([(usize::MAX, usize::MAX)]) {
                if coord.0 != usize::MAX && open(coord.0, coord.1) {
                    run.push(coord);
                } else {
                    if run.len() > 1 {
                        entries.push((run[0], direction, run.len()));
                    }
                    run.clear();
                }
            }
        };

        for row in 0..rows {
            push_runs((0..cols).map(|col| (row, col)).collect(), Direction::Across);
        }
        for col in 0..cols {
            push_runs((0..rows).map(|row| (row, col)).collect(), Direction::Down);
        }

        let mut structure = Structure::from_slots(entries)?;

        // Keep isolated open cells visible to the renderer even though no
        // slot covers them.
        for row in 0..rows {
            for col in 0..cols {
                if open(row, col) {
                    structure.open_cells.insert((row, col));
                }
            }
        }
        structure.rows = structure.rows.max(rows);
        structure.cols = structure.cols.max(cols);

        Ok(structure)
    }

    /// Re-check the collaborator preconditions on an already-built structure:
    /// positive slot lengths and a symmetric overlap table.
    pub fn validate(&self) -> Result<(), InputError> {
        for slot in &self.slots {
            if slot.length == 0 {
                return Err(InputError::ZeroLengthSlot { slot: slot.id });
            }
        }

        for x in 0..self.slots.len() {
            for y in 0..self.slots.len() {
                let symmetric = match (self.overlaps[x][y], self.overlaps[y][x]) {
                    (Some((i, j)), Some((j2, i2))) => i == i2 && j == j2,
                    (None, None) => true,
                    _ => false,
                };
                if !symmetric {
                    return Err(InputError::AsymmetricOverlap { a: x, b: y });
                }
            }
        }

        Ok(())
    }

    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    pub fn slot(&self, id: SlotId) -> &Slot {
        &self.slots[id]
    }

    /// The overlap between two distinct slots, if they cross.
    pub fn overlap(&self, x: SlotId, y: SlotId) -> Option<Overlap> {
        self.overlaps[x][y]
    }

    /// Ids of the slots crossing `x`, in ascending order.
    pub fn neighbors(&self, x: SlotId) -> &[SlotId] {
        &self.neighbors[x]
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn is_open(&self, coord: GridCoord) -> bool {
        self.open_cells.contains(&coord)
    }
}
