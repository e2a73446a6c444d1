//! This module contains the [State] value type, the only representation of a
//! puzzle that crosses the boundary to external collaborators.

use serde::{Deserialize, Serialize};

use std::collections::BTreeMap;

/// A plain snapshot of a puzzle: the matrix of committed digits (0 encodes
/// an empty cell) together with a solved flag and pass-through metadata. A
/// state carries no object identity, it is a value that can be copied,
/// serialized and exchanged freely.
///
/// States serve two purposes. They are the unit of exchange with importers,
/// exporters, and rendering layers, and they are the unit of save/restore
/// the backtracking search uses to roll back speculative moves (see
/// [Grid::snapshot](../struct.Grid.html#method.snapshot) and
/// [Grid::restore](../struct.Grid.html#method.restore)).
///
/// The engine only interprets `numbers`; `difficulty` and `properties` are
/// carried through unchanged for the surrounding application.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct State {
    numbers: Vec<Vec<usize>>,
    #[serde(default)]
    solved: bool,
    #[serde(default)]
    difficulty: f64,
    #[serde(default)]
    properties: BTreeMap<String, String>
}

impl State {

    /// Creates a new state from a matrix of digits, with the solved flag
    /// unset, a difficulty of 0, and no properties.
    pub fn new(numbers: Vec<Vec<usize>>) -> State {
        State {
            numbers,
            solved: false,
            difficulty: 0.0,
            properties: BTreeMap::new()
        }
    }

    /// Gets the matrix of digits, indexed as `numbers[row][column]`, where 0
    /// encodes an empty cell.
    pub fn numbers(&self) -> &Vec<Vec<usize>> {
        &self.numbers
    }

    /// Gets the side length of the matrix held by this state.
    pub fn side(&self) -> usize {
        self.numbers.len()
    }

    /// Indicates whether this state was marked as solved when it was taken.
    pub fn solved(&self) -> bool {
        self.solved
    }

    /// Sets the solved flag of this state.
    pub fn set_solved(&mut self, solved: bool) {
        self.solved = solved;
    }

    /// Gets the difficulty score attached to this state. The engine does not
    /// interpret this value.
    pub fn difficulty(&self) -> f64 {
        self.difficulty
    }

    /// Sets the difficulty score attached to this state.
    pub fn set_difficulty(&mut self, difficulty: f64) {
        self.difficulty = difficulty;
    }

    /// Gets the free-form properties attached to this state. The engine does
    /// not interpret these.
    pub fn properties(&self) -> &BTreeMap<String, String> {
        &self.properties
    }

    /// Gets a mutable reference to the free-form properties attached to this
    /// state.
    pub fn properties_mut(&mut self) -> &mut BTreeMap<String, String> {
        &mut self.properties
    }
}

#[cfg(test)]
mod tests {

    use super::*;

    fn example_state() -> State {
        let mut state = State::new(vec![
            vec![1, 0, 0, 4],
            vec![0, 0, 2, 0],
            vec![0, 3, 0, 0],
            vec![2, 0, 0, 1]
        ]);
        state.set_solved(false);
        state.set_difficulty(2.5);
        state.properties_mut()
            .insert(String::from("author"), String::from("generator"));
        state
    }

    #[test]
    fn json_round_trip_preserves_everything() {
        let state = example_state();
        let json = serde_json::to_string(&state).unwrap();
        let parsed: State = serde_json::from_str(&json).unwrap();
        assert_eq!(state, parsed);
    }

    #[test]
    fn missing_metadata_fields_default() {
        let json = "{\"numbers\":[[0,0],[0,0]]}";
        let parsed: State = serde_json::from_str(json).unwrap();
        assert_eq!(2, parsed.side());
        assert!(!parsed.solved());
        assert_eq!(0.0, parsed.difficulty());
        assert!(parsed.properties().is_empty());
    }

    #[test]
    fn states_are_plain_values() {
        let state = example_state();
        let copy = state.clone();
        assert_eq!(state, copy);
        assert_eq!(4, copy.side());
        assert_eq!(Some(&String::from("generator")),
            copy.properties().get("author"));
    }
}
