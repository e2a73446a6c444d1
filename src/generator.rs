//! This module contains logic for generating random puzzles.
//!
//! Generation reuses the solving machinery: the grid is emptied, exactly one
//! randomly chosen cell is assigned one randomly chosen digit, and the
//! engine's propagate-and-branch search fills in the rest. A wall-clock
//! budget governs each attempt, because an unlucky seed can make a grid
//! pathologically slow to fill; attempts that exceed the budget are
//! abandoned and retried with a 1.1 times longer budget, indefinitely. The
//! caller bounds this loop through [Engine::abort] if desired.

use crate::error::SudokuError;
use crate::grid::Grid;
use crate::solver::{BackgroundRun, Engine, Outcome, SearchStep, StepEvent};
use crate::state::State;

use log::{debug, warn};

use rand::Rng;
use rand::rngs::ThreadRng;

use std::time::{Duration, Instant};

/// A generator fills grids with random, fully solved content. It uses a
/// random number generator to choose the seed cell and digit of each
/// attempt. For most cases, sensible defaults are provided by
/// [Generator::new_default].
///
/// ```
/// use sudoku_quadrants::{Engine, Generator, Grid, Outcome};
///
/// use std::time::Duration;
///
/// let engine = Engine::new();
/// let mut generator = Generator::new_default();
/// let mut grid = Grid::empty(4).unwrap();
///
/// let outcome = generator.generate(&mut grid, Duration::from_secs(5),
///     &engine);
///
/// assert_eq!(Outcome::Solved, outcome);
/// assert!(grid.is_solved());
/// ```
pub struct Generator<R: Rng> {
    rng: R
}

impl Generator<ThreadRng> {

    /// Creates a new generator that uses a [ThreadRng] to choose random
    /// seeds.
    pub fn new_default() -> Generator<ThreadRng> {
        Generator::new(rand::thread_rng())
    }
}

impl<R: Rng> Generator<R> {

    /// Creates a new generator that uses the given random number generator
    /// to choose random seeds.
    pub fn new(rng: R) -> Generator<R> {
        Generator {
            rng
        }
    }

    /// Fills the given grid with random, fully solved content. Any previous
    /// content is discarded: every cell is reset to empty and unlocked
    /// before the first attempt.
    ///
    /// Each attempt seeds one random cell with one random digit in
    /// `[1, size]` and runs the engine's search under the wall-clock budget.
    /// Attempts that exceed the budget are abandoned and retried with a 1.1
    /// times longer budget and a fresh seed, indefinitely; every retry is
    /// logged as an operational warning. Use [Engine::abort] from another
    /// thread (or see
    /// [generate_in_background](fn.generate_in_background.html)) to impose
    /// an outer bound.
    ///
    /// # Arguments
    ///
    /// * `grid`: The grid to fill. On [Outcome::Solved] it holds the
    /// generated solution.
    /// * `budget`: The wall-clock budget of the first attempt.
    /// * `engine`: The engine whose search and limits are used, and whose
    /// abort flag cancels the generation.
    pub fn generate(&mut self, grid: &mut Grid, budget: Duration,
            engine: &Engine) -> Outcome {
        engine.begin();

        // A zero budget would never grow by the backoff factor.
        let mut budget = budget.max(Duration::from_millis(1));
        let size = grid.size();
        let mut noop = |_: &StepEvent| {};
        let mut attempt = 0u32;

        loop {
            attempt += 1;
            grid.clear();

            let column = self.rng.gen_range(0..size);
            let row = self.rng.gen_range(0..size);
            let digit = self.rng.gen_range(1..=size);
            grid.set_value(column, row, digit).unwrap();

            let deadline = Instant::now() + budget;

            match engine.attempt(grid, Some(deadline), &mut noop) {
                SearchStep::Solved => {
                    debug!("generated a {0}x{0} grid on attempt {1}", size,
                        attempt);
                    return Outcome::Solved;
                },
                SearchStep::TimedOut => {
                    budget = budget.mul_f64(1.1);
                    warn!("generation attempt {} exceeded its budget, \
                        retrying with {:?}", attempt, budget);
                },
                SearchStep::DeadEnd => {
                    debug!("generation seed was unsatisfiable, reseeding");
                },
                SearchStep::Aborted => return Outcome::Aborted,
                SearchStep::BudgetExhausted =>
                    return Outcome::NoSolutionWithinBudget,
                SearchStep::DepthExceeded => {
                    warn!("generation exceeded the recursion ceiling");
                    return Outcome::Failed(SudokuError::MaxRecursionExceeded);
                }
            }
        }
    }
}

/// Generates a grid of the given size on a worker thread, mirroring
/// [Engine::solve_in_background](crate::Engine::solve_in_background). The
/// worker uses its own [ThreadRng]; the returned handle can abort the run
/// and join it for the resulting [State].
pub fn generate_in_background(engine: &Engine, size: usize, budget: Duration)
        -> BackgroundRun {
    let worker = engine.clone();

    BackgroundRun::spawn(engine.clone(), move || {
        match Grid::empty(size) {
            Ok(mut grid) => {
                let outcome = Generator::new_default()
                    .generate(&mut grid, budget, &worker);
                (grid.snapshot(), outcome)
            },
            Err(error) => (State::new(Vec::new()), Outcome::Failed(error))
        }
    })
}
