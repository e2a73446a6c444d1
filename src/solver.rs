//! This module contains the engine that solves grids by constraint
//! propagation interleaved with scored backtracking.
//!
//! The central type is the [Engine], which runs one search invocation at a
//! time against a [Grid](crate::Grid). Three execution modes share a single
//! search function: [Engine::solve] runs to completion on the caller's
//! control flow, [Engine::solve_stepped] additionally yields to a hook at
//! every suspension point (useful for visualization and slow-motion), and
//! [Engine::solve_in_background] executes the run on an independent,
//! fully-owned copy of the grid in a worker thread, so that the UI-facing
//! grid is never observed mid-mutation.
//!
//! Dead-end branches are the normal mechanism of the backtracking search and
//! are never surfaced as errors. Only two conditions are reported as
//! operational failures: exceeding the hard recursion ceiling (a fatal
//! [SudokuError::MaxRecursionExceeded]) and exhausting the cycle budget
//! ([Outcome::NoSolutionWithinBudget], which a caller may retry with a
//! larger budget).

use crate::error::SudokuError;
use crate::grid::Grid;
use crate::state::State;

use log::{debug, warn};

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Instant;

/// The default cap on committed-cell operations per top-level invocation.
pub const DEFAULT_CYCLE_LIMIT: u64 = 100_000;

/// The default hard ceiling on recursion depth. Exceeding it aborts the
/// whole invocation with [SudokuError::MaxRecursionExceeded] instead of
/// retrying sibling branches.
pub const DEFAULT_MAX_DEPTH: usize = 1020;

/// The result of one engine invocation, as returned by [Engine::solve],
/// [Engine::solve_stepped], and
/// [Generator::generate](crate::generator::Generator::generate).
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Outcome {

    /// The grid was completed: every row, column, and block is valid and
    /// complete.
    Solved,

    /// The search space was exhausted without finding a solution, proving
    /// that the puzzle has no solution under its current clues.
    Unsolvable,

    /// The cycle budget ran out before the search finished. In contrast to
    /// [Outcome::Unsolvable], nothing was proven; retrying with a larger
    /// budget may succeed.
    NoSolutionWithinBudget,

    /// The invocation was cancelled cooperatively via [Engine::abort].
    Aborted,

    /// A fatal engine error occurred and the invocation was aborted as a
    /// whole.
    Failed(SudokuError)
}

/// Events passed to the hook of [Engine::solve_stepped] at the suspension
/// points of the search. In stepped mode, the hook is the place to render
/// intermediate grid states or insert delays; the abort flag is checked
/// immediately after each event.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum StepEvent {

    /// The engine accepted the invocation and is about to search.
    Started,

    /// A full propagation pass over all empty cells finished.
    PropagationPass {

        /// The number of cells committed during this pass by naked-single
        /// and collapsed hidden-single detection.
        committed: usize
    },

    /// A branch candidate was committed and the engine is about to recurse.
    Branched {

        /// The column (x-coordinate) of the branching cell.
        column: usize,

        /// The row (y-coordinate) of the branching cell.
        row: usize,

        /// The committed candidate digit.
        digit: usize,

        /// The constraint score that put this candidate at the front of the
        /// ordering.
        score: usize
    },

    /// The engine finished; the outcome is returned from the invocation.
    Finished
}

/// The internal result of one recursive search call. Dead ends are part of
/// this vocabulary because they are expected control flow, not errors; the
/// public [Outcome] is derived from this at the invocation boundary.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum SearchStep {
    Solved,
    DeadEnd,
    Aborted,
    BudgetExhausted,
    TimedOut,
    DepthExceeded
}

/// The per-invocation bookkeeping passed through every recursive call:
/// cycle counting, recursion depth, the optional wall-clock deadline, and
/// the shared abort flag.
pub(crate) struct SearchContext {
    cycles: u64,
    cycle_limit: u64,
    depth: usize,
    max_depth: usize,
    deadline: Option<Instant>,
    abort: Arc<AtomicBool>
}

impl SearchContext {

    fn new(engine: &Engine, deadline: Option<Instant>) -> SearchContext {
        SearchContext {
            cycles: 0,
            cycle_limit: engine.cycle_limit,
            depth: 0,
            max_depth: engine.max_depth,
            deadline,
            abort: Arc::clone(&engine.abort)
        }
    }

    fn aborted(&self) -> bool {
        self.abort.load(Ordering::Relaxed)
    }

    fn timed_out(&self) -> bool {
        match self.deadline {
            Some(deadline) => Instant::now() >= deadline,
            None => false
        }
    }

    /// Counts one committed-cell operation. Returns `false` once the cycle
    /// budget is exhausted.
    fn record_commit(&mut self) -> bool {
        self.cycles += 1;
        self.cycles <= self.cycle_limit
    }
}

struct Candidate {
    index: usize,
    digit: usize,
    score: usize
}

/// One recursive search call on the given grid.
///
/// Propagation always fully drains before a branch decision is made: notes
/// are recomputed for every empty cell, hidden singles are collapsed from
/// the groups' note tallies, and naked singles are committed, until a full
/// pass commits zero cells. Only then is a branch opened: the grid is
/// snapshotted, every remaining `(cell, digit)` candidate is scored by how
/// strongly the provisional placement constrains its peers, and the
/// candidates are tried in descending score order with the snapshot restored
/// after every dead end.
fn search(grid: &mut Grid, ctx: &mut SearchContext,
        hook: &mut dyn FnMut(&StepEvent)) -> SearchStep {
    loop {
        if ctx.aborted() {
            return SearchStep::Aborted;
        }

        if ctx.timed_out() {
            return SearchStep::TimedOut;
        }

        let empty = grid.empty_unlocked_cells();

        for &idx in empty.iter() {
            let (column, row) = grid.coordinates(idx);
            grid.refresh_notes(column, row).unwrap();

            if grid.cell_at(idx).notes().is_empty() {
                return SearchStep::DeadEnd;
            }
        }

        // Hidden singles: a digit noted by exactly one cell of a group can
        // only go there, so that cell's notepad collapses to it and the next
        // naked-single scan resolves it.
        for &idx in empty.iter() {
            let cell = grid.cell_at(idx);
            let handles = cell.group_handles();
            let mut unique = None;

            'digits: for digit in cell.notes().iter() {
                for &handle in handles.iter() {
                    if grid.groups()[handle].digit_note_count(digit) == 1 {
                        unique = Some(digit);
                        break 'digits;
                    }
                }
            }

            if let Some(digit) = unique {
                grid.collapse_notes(idx, digit);
            }
        }

        let mut committed = 0;

        for &idx in empty.iter() {
            let cell = grid.cell_at(idx);

            if cell.is_empty() && cell.notes().len() == 1 {
                let digit = cell.notes().smallest().unwrap();
                let (column, row) = grid.coordinates(idx);
                grid.set_value(column, row, digit).unwrap();
                committed += 1;

                if !ctx.record_commit() {
                    return SearchStep::BudgetExhausted;
                }
            }
        }

        hook(&StepEvent::PropagationPass { committed });

        if ctx.aborted() {
            return SearchStep::Aborted;
        }

        if grid.is_solved() {
            return SearchStep::Solved;
        }

        if committed == 0 {
            break;
        }
    }

    if ctx.depth >= ctx.max_depth {
        return SearchStep::DepthExceeded;
    }

    let snapshot = grid.snapshot();
    let mut candidates = Vec::new();

    for idx in grid.empty_unlocked_cells() {
        let (column, row) = grid.coordinates(idx);
        let digits: Vec<usize> = grid.cell_at(idx).notes().iter().collect();
        let own_candidates = digits.len();

        for digit in digits {
            grid.set_value(column, row, digit).unwrap();
            let score = grid.constraint_score(idx) + own_candidates;
            grid.set_value(column, row, 0).unwrap();

            candidates.push(Candidate {
                index: idx,
                digit,
                score
            });
        }
    }

    // Higher scores are expected to prune the search tree fastest and are
    // tried first. Ties order by lower digit, then lower (row-major) cell
    // index, so the candidate order is fully deterministic.
    candidates.sort_by(|a, b| b.score.cmp(&a.score)
        .then(a.digit.cmp(&b.digit))
        .then(a.index.cmp(&b.index)));

    for candidate in candidates {
        if ctx.aborted() {
            return SearchStep::Aborted;
        }

        if ctx.timed_out() {
            return SearchStep::TimedOut;
        }

        let (column, row) = grid.coordinates(candidate.index);
        grid.set_value(column, row, candidate.digit).unwrap();

        if !ctx.record_commit() {
            return SearchStep::BudgetExhausted;
        }

        hook(&StepEvent::Branched {
            column,
            row,
            digit: candidate.digit,
            score: candidate.score
        });

        if ctx.aborted() {
            return SearchStep::Aborted;
        }

        ctx.depth += 1;
        let step = search(grid, ctx, hook);
        ctx.depth -= 1;

        match step {
            SearchStep::DeadEnd => {
                // Sibling candidates must start from an identical base
                // state, so the rollback happens before the next attempt.
                grid.restore(&snapshot).unwrap();
            },
            other => return other
        }
    }

    SearchStep::DeadEnd
}

/// The solving engine. An engine holds the per-invocation limits and the
/// cooperative abort flag; the abort flag is shared by clones, which makes a
/// clone a handle for cancelling a running invocation from another thread.
///
/// At most one invocation may run against a given grid (or its background
/// copy) at a time. The engine does not enforce this; the caller is
/// responsible for serializing solve and generate requests per puzzle
/// session, cancelling any active invocation before starting the next.
///
/// ```
/// use sudoku_quadrants::{Engine, Grid, Outcome};
///
/// let puzzle = "4;\
///      , , ,4,\
///      ,4,3, ,\
///      ,3, , ,\
///      , ,1, ";
/// let mut grid = Grid::parse(puzzle).unwrap();
/// let engine = Engine::new();
///
/// assert_eq!(Outcome::Solved, engine.solve(&mut grid));
/// assert!(grid.is_solved());
///
/// let expected = Grid::parse("4;\
///     3,1,2,4,\
///     2,4,3,1,\
///     1,3,4,2,\
///     4,2,1,3").unwrap();
/// assert_eq!(expected.snapshot().numbers(), grid.snapshot().numbers());
/// ```
#[derive(Clone)]
pub struct Engine {
    cycle_limit: u64,
    max_depth: usize,
    abort: Arc<AtomicBool>
}

impl Engine {

    /// Creates a new engine with the default cycle limit and recursion
    /// ceiling.
    pub fn new() -> Engine {
        Engine::with_limits(DEFAULT_CYCLE_LIMIT, DEFAULT_MAX_DEPTH)
    }

    /// Creates a new engine with the given limits.
    ///
    /// # Arguments
    ///
    /// * `cycle_limit`: The maximum number of committed-cell operations per
    /// invocation. Exceeding it yields [Outcome::NoSolutionWithinBudget].
    /// * `max_depth`: The hard recursion ceiling. Exceeding it is a fatal
    /// engine error.
    pub fn with_limits(cycle_limit: u64, max_depth: usize) -> Engine {
        Engine {
            cycle_limit,
            max_depth,
            abort: Arc::new(AtomicBool::new(false))
        }
    }

    /// Requests cooperative cancellation of the currently running
    /// invocation. The flag is checked at every suspension point; once it is
    /// observed, all pending recursive frames unwind without further
    /// mutation beyond the rollback already in flight. Starting the next
    /// invocation re-arms the engine.
    pub fn abort(&self) {
        self.abort.store(true, Ordering::Relaxed);
    }

    pub(crate) fn begin(&self) {
        self.abort.store(false, Ordering::Relaxed);
    }

    /// Runs one search attempt without managing the abort flag or entry
    /// snapshot. Shared by the solve paths and the generator's retry loop.
    pub(crate) fn attempt(&self, grid: &mut Grid, deadline: Option<Instant>,
            hook: &mut dyn FnMut(&StepEvent)) -> SearchStep {
        let mut ctx = SearchContext::new(self, deadline);
        search(grid, &mut ctx, hook)
    }

    fn run(&self, grid: &mut Grid, hook: &mut dyn FnMut(&StepEvent))
            -> Outcome {
        self.begin();
        hook(&StepEvent::Started);

        let entry = grid.snapshot();
        let step = self.attempt(grid, None, hook);
        let outcome = match step {
            SearchStep::Solved => Outcome::Solved,
            SearchStep::DeadEnd => {
                grid.restore(&entry).unwrap();
                Outcome::Unsolvable
            },
            SearchStep::Aborted => Outcome::Aborted,
            SearchStep::BudgetExhausted | SearchStep::TimedOut => {
                debug!("cycle budget of {} exhausted without a solution",
                    self.cycle_limit);
                grid.restore(&entry).unwrap();
                Outcome::NoSolutionWithinBudget
            },
            SearchStep::DepthExceeded => {
                warn!("search exceeded the recursion ceiling of {}",
                    self.max_depth);
                grid.restore(&entry).unwrap();
                Outcome::Failed(SudokuError::MaxRecursionExceeded)
            }
        };

        hook(&StepEvent::Finished);
        outcome
    }

    /// Solves the given grid in place, running on the caller's control flow
    /// until one of the [Outcome]s is reached. On [Outcome::Solved] the grid
    /// holds the solution; on every other outcome except [Outcome::Aborted]
    /// it is restored to its entry state.
    pub fn solve(&self, grid: &mut Grid) -> Outcome {
        let mut noop = |_: &StepEvent| {};
        self.run(grid, &mut noop)
    }

    /// Solves the given grid like [Engine::solve], additionally yielding to
    /// the given hook at every suspension point: after each propagation
    /// pass, after committing a branch candidate, and at start and finish.
    /// The abort flag is checked right after each yield, so a hook that
    /// calls [Engine::abort] stops the search promptly.
    pub fn solve_stepped(&self, grid: &mut Grid,
            mut hook: impl FnMut(&StepEvent)) -> Outcome {
        self.run(grid, &mut hook)
    }

    /// Solves the puzzle described by the given state on a worker thread,
    /// operating on an independent grid hydrated from the state. No state is
    /// shared with any UI-facing grid while the run is in flight; on
    /// completion, [BackgroundRun::join] hands back a snapshot which the
    /// caller can adopt atomically via
    /// [Grid::restore](crate::Grid::restore).
    pub fn solve_in_background(&self, state: State) -> BackgroundRun {
        let worker = self.clone();

        BackgroundRun::spawn(self.clone(), move || {
            match Grid::from_state(&state) {
                Ok(mut grid) => {
                    let outcome = worker.solve(&mut grid);
                    (grid.snapshot(), outcome)
                },
                Err(error) => (state, Outcome::Failed(error))
            }
        })
    }
}

impl Default for Engine {
    fn default() -> Engine {
        Engine::new()
    }
}

/// A handle to a solve or generate run executing on a worker thread.
/// Dropping the handle detaches the run; use [BackgroundRun::join] to wait
/// for the result.
pub struct BackgroundRun {
    handle: JoinHandle<(State, Outcome)>,
    engine: Engine
}

impl BackgroundRun {

    pub(crate) fn spawn(engine: Engine,
            work: impl FnOnce() -> (State, Outcome) + Send + 'static)
            -> BackgroundRun {
        BackgroundRun {
            handle: thread::spawn(work),
            engine
        }
    }

    /// Requests cooperative cancellation of this run, see [Engine::abort].
    pub fn abort(&self) {
        self.engine.abort();
    }

    /// Indicates whether the run has finished and [BackgroundRun::join]
    /// would return without blocking.
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Blocks until the run finishes and returns the resulting state
    /// together with the outcome. On [Outcome::Solved], the state holds the
    /// completed grid and its solved flag is set.
    pub fn join(self) -> (State, Outcome) {
        self.handle.join().expect("background search thread panicked")
    }
}

#[cfg(test)]
mod tests {

    use super::*;

    use crate::grid::GridEvent;

    fn solve_and_expect(puzzle: &str, solution: &str) {
        let mut grid = Grid::parse(puzzle).unwrap();
        let engine = Engine::new();

        assert_eq!(Outcome::Solved, engine.solve(&mut grid));

        let expected = Grid::parse(solution).unwrap();
        assert_eq!(expected.snapshot().numbers(), grid.snapshot().numbers(),
            "Engine produced a wrong solution.");
    }

    // The classic example is taken from the World Puzzle Federation Sudoku
    // GP 2020 Round 8 (Puzzle 2).
    // Puzzles: https://gp.worldpuzzle.org/sites/default/files/Puzzles/2020/2020_SudokuRound8.pdf
    // Solutions: https://gp.worldpuzzle.org/sites/default/files/Puzzles/2020/2020_SudokuRound8_SB.pdf

    #[test]
    fn engine_solves_classic_9x9() {
        let puzzle = "9;\
             , , , ,8,1, , , ,\
             , ,2, , ,7,8, , ,\
             ,5,3, , , ,1,7, ,\
            3,7, , , , , , , ,\
            6, , , , , , , ,3,\
             , , , , , , ,2,4,\
             ,6,9, , , ,2,3, ,\
             , ,5,9, , ,4, , ,\
             , , ,6,5, , , , ";
        let solution = "9;\
            7,4,6,2,8,1,3,5,9,\
            9,1,2,5,3,7,8,4,6,\
            8,5,3,4,9,6,1,7,2,\
            3,7,4,1,2,5,6,9,8,\
            6,2,8,7,4,9,5,1,3,\
            5,9,1,3,6,8,7,2,4,\
            1,6,9,8,7,4,2,3,5,\
            2,8,5,9,1,3,4,6,7,\
            4,3,7,6,5,2,9,8,1";
        solve_and_expect(puzzle, solution);
    }

    #[test]
    fn engine_solves_6x6() {
        let puzzle = "6;\
            1, ,3, , ,6,\
             ,5, ,1, , ,\
            2, , ,5,6, ,\
             ,6,4, , ,1,\
             , ,2,6, ,5,\
            6, , , ,1, ";
        let mut grid = Grid::parse(puzzle).unwrap();
        let engine = Engine::new();

        assert_eq!(Outcome::Solved, engine.solve(&mut grid));
        assert!(grid.is_solved());

        // The givens survive as fixed constraints.
        assert_eq!(1, grid.value(0, 0).unwrap());
        assert_eq!(6, grid.value(1, 3).unwrap());
    }

    #[test]
    fn engine_solves_empty_grid() {
        let mut grid = Grid::empty(9).unwrap();
        let engine = Engine::new();

        assert_eq!(Outcome::Solved, engine.solve(&mut grid));
        assert!(grid.is_solved());
    }

    #[test]
    fn already_solved_grid_reports_solved() {
        let mut grid = Grid::parse("4;\
            1,2,3,4,\
            3,4,1,2,\
            2,1,4,3,\
            4,3,2,1").unwrap();
        let engine = Engine::new();

        assert_eq!(Outcome::Solved, engine.solve(&mut grid));
    }

    #[test]
    fn contradictory_grid_is_unsolvable_and_restored() {
        let puzzle = "4;\
            1, ,1, ,\
             , , , ,\
             , , , ,\
             , , , ";
        let mut grid = Grid::parse(puzzle).unwrap();
        let engine = Engine::new();

        assert_eq!(Outcome::Unsolvable, engine.solve(&mut grid));

        // The entry state is restored after the exhaustive search.
        assert_eq!(2, grid.count_clues());
        assert_eq!(1, grid.value(0, 0).unwrap());
        assert_eq!(1, grid.value(2, 0).unwrap());
    }

    #[test]
    fn cell_without_candidates_is_unsolvable() {
        // The top-left cell sees all four digits through its row, column,
        // and block.
        let puzzle = "4;\
             ,1,2,3,\
            4, , , ,\
             , , , ,\
             , , , ";
        let mut grid = Grid::parse(puzzle).unwrap();
        let engine = Engine::new();

        assert_eq!(Outcome::Unsolvable, engine.solve(&mut grid));
    }

    #[test]
    fn zero_cycle_budget_reports_no_solution_within_budget() {
        let mut grid = Grid::parse("4;1,,,,,,,,,,,,,,,").unwrap();
        let engine = Engine::with_limits(0, DEFAULT_MAX_DEPTH);

        assert_eq!(Outcome::NoSolutionWithinBudget, engine.solve(&mut grid));

        // Nothing of the attempt remains on the grid.
        assert_eq!(1, grid.count_clues());
    }

    #[test]
    fn zero_depth_ceiling_fails_on_first_branch() {
        // An empty 4x4 grid offers no singles, so the engine must branch
        // immediately, which the ceiling forbids.
        let mut grid = Grid::empty(4).unwrap();
        let engine = Engine::with_limits(DEFAULT_CYCLE_LIMIT, 0);

        assert_eq!(Outcome::Failed(SudokuError::MaxRecursionExceeded),
            engine.solve(&mut grid));
    }

    #[test]
    fn hook_observes_start_passes_and_finish() {
        let mut grid = Grid::parse("4;\
             , , ,4,\
             ,4,3, ,\
             ,3, , ,\
             , ,1, ").unwrap();
        let engine = Engine::new();
        let mut events = Vec::new();

        let outcome = engine.solve_stepped(&mut grid,
            |event| events.push(*event));

        assert_eq!(Outcome::Solved, outcome);
        assert_eq!(Some(&StepEvent::Started), events.first());
        assert_eq!(Some(&StepEvent::Finished), events.last());
        assert!(events.iter().any(|event| matches!(event,
            StepEvent::PropagationPass { .. })));
    }

    #[test]
    fn aborting_from_hook_stops_the_search() {
        let mut grid = Grid::empty(9).unwrap();
        let engine = Engine::new();
        let handle = engine.clone();

        let outcome = engine.solve_stepped(&mut grid, move |event| {
            if let StepEvent::PropagationPass { .. } = event {
                handle.abort();
            }
        });

        assert_eq!(Outcome::Aborted, outcome);
        assert!(!grid.is_solved());
    }

    #[test]
    fn propagation_drains_before_branching() {
        // This puzzle is solvable by naked singles alone, so no Branched
        // event may ever be raised.
        let puzzle = "4;\
            1,2,3, ,\
            3, ,1,2,\
            2,1, ,3,\
             ,3,2,1";
        let mut grid = Grid::parse(puzzle).unwrap();
        let engine = Engine::new();
        let mut branched = false;

        let outcome = engine.solve_stepped(&mut grid, |event| {
            if let StepEvent::Branched { .. } = event {
                branched = true;
            }
        });

        assert_eq!(Outcome::Solved, outcome);
        assert!(!branched);
    }

    #[test]
    fn solver_mutations_are_observable() {
        let mut grid = Grid::parse("4;\
            1,2,3, ,\
            3, ,1,2,\
            2,1, ,3,\
             ,3,2,1").unwrap();

        let changes = std::rc::Rc::new(std::cell::RefCell::new(0));
        let sink = std::rc::Rc::clone(&changes);
        grid.observe(move |event| {
            if let GridEvent::ValueChanged { .. } = event {
                *sink.borrow_mut() += 1;
            }
        });

        let engine = Engine::new();
        assert_eq!(Outcome::Solved, engine.solve(&mut grid));
        assert_eq!(4, *changes.borrow());
    }

    #[test]
    fn background_run_returns_solved_state() {
        let state = Grid::parse("4;\
             , , ,4,\
             ,4,3, ,\
             ,3, , ,\
             , ,1, ").unwrap().snapshot();
        let engine = Engine::new();

        let run = engine.solve_in_background(state);
        let (solved_state, outcome) = run.join();

        assert_eq!(Outcome::Solved, outcome);
        assert!(solved_state.solved());

        // The caller adopts the result atomically.
        let mut grid = Grid::empty(4).unwrap();
        grid.restore(&solved_state).unwrap();
        assert!(grid.is_solved());
    }

    #[test]
    fn background_run_reports_invalid_state() {
        let state = State::new(vec![vec![0; 5]; 5]);
        let engine = Engine::new();

        let (returned, outcome) = engine.solve_in_background(state.clone())
            .join();

        assert_eq!(Outcome::Failed(SudokuError::InvalidSize), outcome);
        assert_eq!(state, returned);
    }

    #[test]
    fn locked_empty_cells_are_never_written() {
        let mut grid = Grid::empty(4).unwrap();
        grid.set_locked(0, 0, true).unwrap();
        let engine = Engine::new();

        let outcome = engine.solve(&mut grid);

        assert_eq!(Outcome::Unsolvable, outcome);
        assert_eq!(0, grid.value(0, 0).unwrap());
    }

    #[test]
    fn sequential_invocations_reuse_the_engine() {
        let engine = Engine::new();

        let mut first = Grid::parse("4; ,2,3,4,3,4,1,2,2,1,4,3,4,3,2,1")
            .unwrap();
        assert_eq!(Outcome::Solved, engine.solve(&mut first));

        engine.abort();

        // The abort request above targets no running invocation; the next
        // invocation re-arms the engine instead of failing spuriously.
        let mut second = Grid::parse("4; ,2,3,4,3,4,1,2,2,1,4,3,4,3,2,1")
            .unwrap();
        assert_eq!(Outcome::Solved, engine.solve(&mut second));
    }

    #[test]
    fn outcome_is_deterministic_for_equal_inputs() {
        let puzzle = "6;\
            1, ,3, , ,6,\
             ,5, ,1, , ,\
            2, , ,5,6, ,\
             ,6,4, , ,1,\
             , ,2,6, ,5,\
            6, , , ,1, ";
        let engine = Engine::new();

        let mut first = Grid::parse(puzzle).unwrap();
        let mut second = Grid::parse(puzzle).unwrap();

        assert_eq!(Outcome::Solved, engine.solve(&mut first));
        assert_eq!(Outcome::Solved, engine.solve(&mut second));
        assert_eq!(first.snapshot(), second.snapshot());
    }

    #[test]
    fn engine_clones_share_the_abort_flag() {
        let engine = Engine::new();
        let clone = engine.clone();

        clone.abort();
        assert!(engine.abort.load(Ordering::Relaxed));

        engine.begin();
        assert!(!clone.abort.load(Ordering::Relaxed));
    }

    #[test]
    fn stepped_and_plain_solve_agree() {
        let puzzle = "9;\
             , , , ,8,1, , , ,\
             , ,2, , ,7,8, , ,\
             ,5,3, , , ,1,7, ,\
            3,7, , , , , , , ,\
            6, , , , , , , ,3,\
             , , , , , , ,2,4,\
             ,6,9, , , ,2,3, ,\
             , ,5,9, , ,4, , ,\
             , , ,6,5, , , , ";

        let engine = Engine::new();
        let mut plain = Grid::parse(puzzle).unwrap();
        let mut stepped = Grid::parse(puzzle).unwrap();
        let mut passes = 0u32;

        assert_eq!(Outcome::Solved, engine.solve(&mut plain));
        assert_eq!(Outcome::Solved, engine.solve_stepped(&mut stepped,
            |event| {
                if let StepEvent::PropagationPass { .. } = event {
                    passes += 1;
                }
            }));

        assert_eq!(plain.snapshot().numbers(), stepped.snapshot().numbers());
        assert!(passes > 0);
    }
}
