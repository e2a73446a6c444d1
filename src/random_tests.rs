use crate::generator::Generator;
use crate::grid::Grid;
use crate::solver::{Engine, Outcome};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use std::time::Duration;

const SINGLE_CLUE_RUNS: usize = 100;
const FUZZ_RUNS: usize = 20;
const FUZZ_OPS: usize = 200;
const FUZZ_CHECK_INTERVAL: usize = 50;

#[test]
fn single_clue_4x4_grids_always_solve() {
    let engine = Engine::new();
    let mut rng = ChaCha8Rng::seed_from_u64(0x5eed);

    for run in 0..SINGLE_CLUE_RUNS {
        let mut grid = Grid::empty(4).unwrap();
        let column = rng.gen_range(0..4);
        let row = rng.gen_range(0..4);
        let digit = rng.gen_range(1..=4);
        grid.set_value(column, row, digit).unwrap();

        assert_eq!(Outcome::Solved, engine.solve(&mut grid),
            "Run {} with seed cell ({}, {}) = {} was not solved.", run,
            column, row, digit);
        assert!(grid.is_solved());
        assert_eq!(digit, grid.value(column, row).unwrap());
    }
}

/// Recounts every group tally from the member cells' actual state and
/// compares with the incrementally maintained values.
fn assert_tallies_consistent(grid: &Grid) {
    for group in grid.groups() {
        let mut valid = true;

        for digit in 1..=grid.size() {
            let occupancy = group.members().iter()
                .filter(|&&member| grid.cell_at(member).value() == digit)
                .count();
            let noted = group.members().iter()
                .filter(|&&member| {
                    let cell = grid.cell_at(member);
                    cell.is_empty() && cell.notes().contains(digit)
                })
                .count();

            assert_eq!(occupancy, group.digit_occupancy(digit),
                "Occupancy of digit {} diverged in {:?} group {}.", digit,
                group.kind(), group.index());
            assert_eq!(noted, group.digit_note_count(digit),
                "Note count of digit {} diverged in {:?} group {}.", digit,
                group.kind(), group.index());

            if occupancy > 1 {
                valid = false;
            }
        }

        let filled = group.members().iter()
            .filter(|&&member| !grid.cell_at(member).is_empty())
            .count();

        assert_eq!(valid, group.is_valid());
        assert_eq!(filled == group.members().len(), group.is_complete());
    }
}

#[test]
fn incremental_tallies_match_brute_force_recount() {
    let mut rng = ChaCha8Rng::seed_from_u64(97);
    let sizes = [4usize, 6, 9];

    for _ in 0..FUZZ_RUNS {
        let size = sizes[rng.gen_range(0..sizes.len())];
        let mut grid = Grid::empty(size).unwrap();

        for op in 0..FUZZ_OPS {
            let column = rng.gen_range(0..size);
            let row = rng.gen_range(0..size);

            match rng.gen_range(0..6) {
                0 => {
                    let value = rng.gen_range(0..=size);
                    grid.set_value(column, row, value).unwrap();
                },
                1 => {
                    grid.increment(column, row).unwrap();
                },
                2 => {
                    grid.decrement(column, row).unwrap();
                },
                3 => {
                    let digit = rng.gen_range(1..=size);
                    let active = rng.gen::<bool>();
                    grid.set_note(column, row, digit, active).unwrap();
                },
                4 => {
                    grid.refresh_notes(column, row).unwrap();
                },
                _ => {
                    grid.clear_notes(column, row).unwrap();
                }
            }

            if op % FUZZ_CHECK_INTERVAL == 0 {
                assert_tallies_consistent(&grid);
            }
        }

        assert_tallies_consistent(&grid);
    }
}

#[test]
fn snapshot_restore_round_trips_random_grids() {
    let mut rng = ChaCha8Rng::seed_from_u64(31);
    let sizes = [4usize, 6, 9];

    for _ in 0..20 {
        let size = sizes[rng.gen_range(0..sizes.len())];
        let mut grid = Grid::empty(size).unwrap();

        for _ in 0..(size * size / 2) {
            let column = rng.gen_range(0..size);
            let row = rng.gen_range(0..size);
            let value = rng.gen_range(0..=size);
            grid.set_value(column, row, value).unwrap();
        }

        let state = grid.snapshot();
        let mut other = Grid::empty(size).unwrap();
        other.restore(&state).unwrap();

        assert_eq!(state, other.snapshot());
    }
}

#[test]
fn generation_succeeds_across_sizes() {
    let engine = Engine::new();

    for &size in [4usize, 6, 9].iter() {
        let mut generator =
            Generator::new(ChaCha8Rng::seed_from_u64(size as u64));
        let mut grid = Grid::empty(size).unwrap();

        assert_eq!(Outcome::Solved,
            generator.generate(&mut grid, Duration::from_secs(2), &engine),
            "Generation of a {0}x{0} grid failed.", size);
        assert!(grid.is_solved());
    }
}

#[test]
fn solving_a_thinned_generated_grid_succeeds() {
    let engine = Engine::new();
    let mut rng = ChaCha8Rng::seed_from_u64(5);

    for _ in 0..10 {
        let mut generator =
            Generator::new(ChaCha8Rng::seed_from_u64(rng.gen::<u64>()));
        let mut grid = Grid::empty(6).unwrap();

        assert_eq!(Outcome::Solved,
            generator.generate(&mut grid, Duration::from_secs(2), &engine));

        // Punching holes into a complete grid keeps it satisfiable, so the
        // engine has to find some completion again.
        for _ in 0..12 {
            let column = rng.gen_range(0..6);
            let row = rng.gen_range(0..6);
            grid.set_value(column, row, 0).unwrap();
        }

        assert_eq!(Outcome::Solved, engine.solve(&mut grid));
        assert!(grid.is_solved());
    }
}
