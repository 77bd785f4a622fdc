//! CLI driver: parse a grid template and a word list from files, solve, and
//! print the filled grid (or "No solution.").

use std::fs;
use std::path::PathBuf;
use std::process;

use clap::Parser;

use crossfill::render::render;
use crossfill::search::Solver;
use crossfill::structure::Structure;
use crossfill::word_list::WordList;

#[derive(Parser)]
#[command(name = "crossfill")]
#[command(about = "Fill a crossword grid with words from a word list")]
#[command(version)]
struct Cli {
    /// Grid template file: '#' for blocks, any other character for open cells
    structure: PathBuf,

    /// Word list file, one word per line
    words: PathBuf,

    /// Also write the filled grid to this file
    #[arg(long)]
    output: Option<PathBuf>,
}

fn read_file(path: &PathBuf) -> String {
    fs::read_to_string(path).unwrap_or_else(|err| {
        eprintln!("error: cannot read {}: {err}", path.display());
        process::exit(2);
    })
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let structure = Structure::parse(&read_file(&cli.structure)).unwrap_or_else(|err| {
        eprintln!("error: invalid structure: {err}");
        process::exit(2);
    });
    let words = WordList::parse(&read_file(&cli.words));

    let mut solver = Solver::new(&structure, &words).unwrap_or_else(|err| {
        eprintln!("error: {err}");
        process::exit(2);
    });

    match solver.solve() {
        Some(assignment) => {
            log::debug!("{:?}", solver.statistics());
            let grid = render(&structure, &words, &assignment);
            println!("{grid}");
            if let Some(path) = &cli.output {
                fs::write(path, grid).unwrap_or_else(|err| {
                    eprintln!("error: cannot write {}: {err}", path.display());
                    process::exit(2);
                });
            }
        }
        None => {
            println!("No solution.");
            process::exit(1);
        }
    }
}
