// Code lints

#![warn(trivial_casts)]
#![warn(trivial_numeric_casts)]
#![warn(unreachable_pub)]
#![warn(unused_import_braces)]
#![warn(unused_lifetimes)]
#![warn(unused_qualifications)]

// Doc lints

#![warn(missing_docs)]

//! This crate implements a generalized Sudoku engine for square grids of
//! arbitrary size. It supports the following key features:
//!
//! * Grids of any size whose block ("quadrant") shape can be derived from
//! the square root of the side length, such as 4x4, 6x6, 9x9, 12x12, and
//! 25x25
//! * Incremental per-group occupancy and candidate tallies, driving cheap
//! validity, completeness, and solved-state queries as well as change
//! notifications for a rendering layer
//! * Solving by constraint propagation (naked and hidden singles)
//! interleaved with scored backtracking
//! * Stepped execution with a yield hook for visualization, and background
//! execution on an owned grid copy for responsive frontends
//! * Generation of fully solved grids from a single random seed under a
//! growing wall-clock budget
//!
//! Rendering, input handling, and persistence are deliberately out of scope;
//! external collaborators exchange puzzle content with the engine through
//! the [State] value type and subscribe to [GridEvent] notifications.
//!
//! Note that in this introduction we will mostly be using 4x4 grids due to
//! their simpler nature. These are divided in 4 2x2 blocks, each with the
//! digits 1 to 4, just like each row and column.
//!
//! # Parsing and printing grids
//!
//! See [Grid::parse] for the exact format of a grid code.
//!
//! Codes can be used to exchange grids in tests and tooling, while pretty
//! prints can be used to display a grid in a clearer manner. An example of
//! how to parse and display a grid is provided below.
//!
//! ```
//! use sudoku_quadrants::Grid;
//!
//! let grid = Grid::parse("4;2, ,3, , ,1, , ,1, , ,4, ,2, ,3").unwrap();
//! println!("{}", grid);
//! ```
//!
//! # Solving
//!
//! The [Engine] solves a grid in place. It propagates forced digits until no
//! more can be found, then branches on the highest-scored candidate
//! placement, rolling back dead ends through [State] snapshots.
//!
//! ```
//! use sudoku_quadrants::{Engine, Grid, Outcome};
//!
//! // A riddle posed by our app:
//! // ╔═══╤═══╦═══╤═══╗
//! // ║   │   ║   │ 4 ║
//! // ╟───┼───╫───┼───╢
//! // ║   │ 4 ║ 3 │   ║
//! // ╠═══╪═══╬═══╪═══╣
//! // ║   │ 3 ║   │   ║
//! // ╟───┼───╫───┼───╢
//! // ║   │   ║ 1 │   ║
//! // ╚═══╧═══╩═══╧═══╝
//! let mut grid = Grid::parse("4; , , ,4, ,4,3, , ,3, , , , ,1, ").unwrap();
//! let engine = Engine::new();
//!
//! assert_eq!(Outcome::Solved, engine.solve(&mut grid));
//!
//! // The solution we expect:
//! // ╔═══╤═══╦═══╤═══╗
//! // ║ 3 │ 1 ║ 2 │ 4 ║
//! // ╟───┼───╫───┼───╢
//! // ║ 2 │ 4 ║ 3 │ 1 ║
//! // ╠═══╪═══╬═══╪═══╣
//! // ║ 1 │ 3 ║ 4 │ 2 ║
//! // ╟───┼───╫───┼───╢
//! // ║ 4 │ 2 ║ 1 │ 3 ║
//! // ╚═══╧═══╩═══╧═══╝
//! let expected = Grid::parse("4;3,1,2,4,2,4,3,1,1,3,4,2,4,2,1,3").unwrap();
//! assert_eq!(expected.snapshot().numbers(), grid.snapshot().numbers());
//! ```
//!
//! Dead-end branches during the search are expected control flow and are
//! never surfaced as errors. The engine reports [Outcome::Unsolvable] once
//! the search space is exhausted, [Outcome::NoSolutionWithinBudget] when the
//! cycle budget runs out first, and [Outcome::Aborted] when cancelled
//! cooperatively via [Engine::abort].
//!
//! For frontends, [Engine::solve_stepped] yields to a hook at every
//! suspension point of the same search, and [Engine::solve_in_background]
//! runs it on an independent grid copy in a worker thread, so a concurrently
//! rendering consumer never observes a grid mid-mutation.
//!
//! # Generating
//!
//! A [Generator] fills a grid with random, fully solved content by seeding
//! one random cell and letting the same search machinery fill the rest. A
//! wall-clock budget bounds each attempt and grows by 1.1 on every timeout,
//! because an unlucky seed can make an attempt pathologically slow.
//!
//! ```
//! use sudoku_quadrants::{Engine, Generator, Grid, Outcome};
//!
//! use std::time::Duration;
//!
//! let engine = Engine::new();
//! let mut generator = Generator::new_default();
//! let mut grid = Grid::empty(4).unwrap();
//!
//! let outcome = generator.generate(&mut grid, Duration::from_secs(5),
//!     &engine);
//!
//! assert_eq!(Outcome::Solved, outcome);
//! assert!(grid.is_solved());
//! ```
//!
//! # Note regarding performance
//!
//! The search mutates cell values thousands of times per second. It is
//! strongly recommended to use at least `opt-level = 2`, even in tests that
//! solve or generate grids larger than 4x4.

pub mod cell;
pub mod error;
pub mod generator;
pub mod grid;
pub mod group;
pub mod notepad;
pub mod solver;
pub mod state;

pub use crate::cell::Cell;
pub use crate::error::{ParseError, ParseResult, SudokuError, SudokuResult};
pub use crate::generator::{generate_in_background, Generator};
pub use crate::grid::{Grid, GridEvent};
pub use crate::group::{Group, GroupKind};
pub use crate::notepad::{Notepad, NotepadIter};
pub use crate::solver::{
    BackgroundRun,
    Engine,
    Outcome,
    StepEvent,
    DEFAULT_CYCLE_LIMIT,
    DEFAULT_MAX_DEPTH
};
pub use crate::state::State;

#[cfg(test)]
mod random_tests;
