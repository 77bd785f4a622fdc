//! Turn a structure and a (possibly partial) assignment into a text grid:
//! `#` for blocks, `.` for open cells with no letter yet, letters for
//! assigned cells.

use crate::search::Assignment;
use crate::structure::Structure;
use crate::word_list::WordList;

pub fn render(structure: &Structure, words: &WordList, assignment: &Assignment) -> String {
    let mut grid: Vec<Vec<char>> = (0..structure.rows())
        .map(|row| {
            (0..structure.cols())
                .map(|col| if structure.is_open((row, col)) { '.' } else { '#' })
                .collect()
        })
        .collect();

    for (slot_id, word_id) in assignment.iter() {
        let word = words.word(word_id);
        for (cell_idx, (row, col)) in structure.slot(slot_id).cell_coords().enumerate() {
            grid[row][col] = word.chars[cell_idx];
        }
    }

    grid.into_iter()
        .map(|row| row.into_iter().collect::<String>())
        .collect::<Vec<_>>()
        .join("\n")
}
