//! This module contains the [Grid], which owns the cells of a puzzle and the
//! row, column, and block groups derived from its size.

use crate::cell::Cell;
use crate::error::{ParseError, ParseResult, SudokuError, SudokuResult};
use crate::group::{Group, GroupKind};
use crate::state::State;

use std::cell::Cell as StdCell;
use std::collections::BTreeMap;
use std::fmt::{self, Display, Formatter};

/// A notification raised by a [Grid] when its observable state changes.
/// Listeners registered with [Grid::observe](struct.Grid.html#method.observe)
/// receive these synchronously, in the order the changes occurred.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum GridEvent {

    /// A cell's committed value changed.
    ValueChanged {

        /// The column (x-coordinate) of the changed cell.
        column: usize,

        /// The row (y-coordinate) of the changed cell.
        row: usize,

        /// The value before the change, where 0 encodes an empty cell.
        old: usize,

        /// The value after the change, where 0 encodes an empty cell.
        new: usize
    },

    /// A group's validity transitioned.
    ValidityChanged {

        /// The kind of the affected group.
        kind: GroupKind,

        /// The index of the affected group within its family.
        index: usize,

        /// Whether the group is valid after the transition.
        valid: bool
    }
}

fn index(column: usize, row: usize, size: usize) -> usize {
    row * size + column
}

/// Computes the block shape for a grid of the given size as
/// `(ceil(sqrt(size)), floor(sqrt(size)))` and verifies that it tiles the
/// grid.
fn block_shape(size: usize) -> SudokuResult<(usize, usize)> {
    if size == 0 {
        return Err(SudokuError::InvalidSize);
    }

    let sqrt = (size as f64).sqrt();
    let block_width = sqrt.ceil() as usize;
    let block_height = sqrt.floor() as usize;

    if block_width * block_height != size {
        Err(SudokuError::InvalidSize)
    }
    else {
        Ok((block_width, block_height))
    }
}

/// A square puzzle grid of cells that are organized into rows, columns, and
/// rectangular blocks ("quadrants"). The block dimensions are derived from
/// the grid size: a grid of size `n` has blocks of width `ceil(sqrt(n))` and
/// height `floor(sqrt(n))`, so sizes are valid exactly when those two
/// factors multiply back to `n` (1, 4, 6, 9, 12, 25, ...). A 6x6 grid, for
/// example, is divided into 3x2 blocks:
///
/// ```text
/// ╔═══╤═══╤═══╦═══╤═══╤═══╗
/// ║   │   │   ║   │   │   ║
/// ╟───┼───┼───╫───┼───┼───╢
/// ║   │   │   ║   │   │   ║
/// ╠═══╪═══╪═══╬═══╪═══╪═══╣
/// ║   │   │   ║   │   │   ║
/// ╟───┼───┼───╫───┼───┼───╢
/// ║   │   │   ║   │   │   ║
/// ╠═══╪═══╪═══╬═══╪═══╪═══╣
/// ║   │   │   ║   │   │   ║
/// ╟───┼───┼───╫───┼───┼───╢
/// ║   │   │   ║   │   │   ║
/// ╚═══╧═══╧═══╩═══╧═══╧═══╝
/// ```
///
/// Every cell belongs to exactly one row, one column, and one block, all
/// assigned at construction. The grid is the single point of mutation: cell
/// values and notes change only through its methods, which keep the groups'
/// occupancy and note tallies in sync incrementally and notify registered
/// observers.
///
/// A grid is constructed once per puzzle session and mutated in place. The
/// [State](struct.State.html) value type is used to move puzzle content in
/// and out, see [Grid::snapshot](#method.snapshot) and
/// [Grid::restore](#method.restore).
pub struct Grid {
    size: usize,
    block_width: usize,
    block_height: usize,
    cells: Vec<Cell>,
    groups: Vec<Group>,
    solved_memo: StdCell<Option<bool>>,
    difficulty: f64,
    properties: BTreeMap<String, String>,
    listeners: Vec<Box<dyn FnMut(&GridEvent)>>
}

fn digit_width(size: usize) -> usize {
    size.to_string().len()
}

fn cell_text(value: usize, width: usize) -> String {
    if value == 0 {
        " ".repeat(width)
    }
    else {
        format!("{:>1$}", value, width)
    }
}

fn line(grid: &Grid, start: char, thick_sep: char, thin_sep: char,
        segment: impl Fn(usize) -> String, pad: char, end: char,
        newline: bool) -> String {
    let size = grid.size();
    let mut result = String::new();

    for x in 0..size {
        if x == 0 {
            result.push(start);
        }
        else if x % grid.block_width == 0 {
            result.push(thick_sep);
        }
        else {
            result.push(thin_sep);
        }

        result.push(pad);
        result.push_str(segment(x).as_str());
        result.push(pad);
    }

    result.push(end);

    if newline {
        result.push('\n');
    }

    result
}

fn top_row(grid: &Grid, width: usize) -> String {
    line(grid, '╔', '╦', '╤', |_| "═".repeat(width), '═', '╗', true)
}

fn thin_separator_line(grid: &Grid, width: usize) -> String {
    line(grid, '╟', '╫', '┼', |_| "─".repeat(width), '─', '╢', true)
}

fn thick_separator_line(grid: &Grid, width: usize) -> String {
    line(grid, '╠', '╬', '╪', |_| "═".repeat(width), '═', '╣', true)
}

fn bottom_row(grid: &Grid, width: usize) -> String {
    line(grid, '╚', '╩', '╧', |_| "═".repeat(width), '═', '╝', false)
}

fn content_row(grid: &Grid, y: usize, width: usize) -> String {
    line(grid, '║', '║', '│',
        |x| cell_text(grid.cells[index(x, y, grid.size)].value(), width), ' ',
        '║', true)
}

impl Display for Grid {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let width = digit_width(self.size);
        let top_row = top_row(self, width);
        let thin_separator_line = thin_separator_line(self, width);
        let thick_separator_line = thick_separator_line(self, width);
        let bottom_row = bottom_row(self, width);

        for y in 0..self.size {
            if y == 0 {
                f.write_str(top_row.as_str())?;
            }
            else if y % self.block_height == 0 {
                f.write_str(thick_separator_line.as_str())?;
            }
            else {
                f.write_str(thin_separator_line.as_str())?;
            }

            f.write_str(content_row(self, y, width).as_str())?;
        }

        f.write_str(bottom_row.as_str())?;
        Ok(())
    }
}

impl fmt::Debug for Grid {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Grid")
            .field("size", &self.size)
            .field("block_width", &self.block_width)
            .field("block_height", &self.block_height)
            .field("cells", &self.cells)
            .finish()
    }
}

/// Two grids are equal if they have the same dimensions and every cell
/// holds the same value, lock flag, and notes. Registered listeners and
/// cached query results do not participate in the comparison.
impl PartialEq for Grid {
    fn eq(&self, other: &Grid) -> bool {
        self.size == other.size &&
            self.block_width == other.block_width &&
            self.block_height == other.block_height &&
            self.cells == other.cells
    }
}

fn to_string(value: usize) -> String {
    if value == 0 {
        String::from("")
    }
    else {
        value.to_string()
    }
}

impl Grid {

    /// Creates a new grid from a matrix of seed digits, indexed as
    /// `numbers[row][column]` with 0 encoding an empty cell. The grid size
    /// and the block shape are derived from the matrix side length; cells
    /// holding a non-zero seed digit are locked.
    ///
    /// # Errors
    ///
    /// * `SudokuError::InvalidSize` If the matrix is not square or its side
    /// length cannot be decomposed into the derived block shape.
    /// * `SudokuError::OutOfRangeDigit` If a seed digit exceeds the side
    /// length.
    pub fn new(numbers: Vec<Vec<usize>>) -> SudokuResult<Grid> {
        let size = numbers.len();
        let (block_width, block_height) = block_shape(size)?;

        for row in numbers.iter() {
            if row.len() != size {
                return Err(SudokuError::InvalidSize);
            }
        }

        let mut groups = Vec::with_capacity(3 * size);

        for i in 0..size {
            groups.push(Group::new(GroupKind::Row, i, size));
        }

        for i in 0..size {
            groups.push(Group::new(GroupKind::Column, i, size));
        }

        for i in 0..size {
            groups.push(Group::new(GroupKind::Block, i, size));
        }

        let mut cells = Vec::with_capacity(size * size);

        for row in 0..size {
            for column in 0..size {
                let value = numbers[row][column];

                if value > size {
                    return Err(SudokuError::OutOfRangeDigit);
                }

                let block =
                    (row / block_height) * block_height + column / block_width;
                let handles = [row, size + column, 2 * size + block];
                let cell_index = index(column, row, size);

                for &handle in handles.iter() {
                    groups[handle].attach(cell_index);

                    if value != 0 {
                        groups[handle].record_value_change(0, value);
                    }
                }

                cells.push(Cell::new(size, value, value != 0, handles));
            }
        }

        Ok(Grid {
            size,
            block_width,
            block_height,
            cells,
            groups,
            solved_memo: StdCell::new(None),
            difficulty: 0.0,
            properties: BTreeMap::new(),
            listeners: Vec::new()
        })
    }

    /// Creates a new, empty grid of the given size with no locked cells.
    ///
    /// # Errors
    ///
    /// * `SudokuError::InvalidSize` If the size cannot be decomposed into
    /// the derived block shape.
    pub fn empty(size: usize) -> SudokuResult<Grid> {
        Grid::new(vec![vec![0; size]; size])
    }

    /// Hydrates a fresh grid from a [State], for example to obtain the
    /// offline copy a background run operates on. Cells holding non-zero
    /// digits are locked; the state's difficulty and properties are adopted
    /// as pass-through metadata, while its solved flag is ignored in favor
    /// of a fresh computation.
    ///
    /// # Errors
    ///
    /// See [Grid::new](#method.new).
    pub fn from_state(state: &State) -> SudokuResult<Grid> {
        let mut grid = Grid::new(state.numbers().clone())?;
        grid.difficulty = state.difficulty();
        grid.properties = state.properties().clone();
        Ok(grid)
    }

    /// Parses a code encoding a grid. The code has to be of the format
    /// `<size>;<cells>` where `<cells>` is a comma-separated list of
    /// entries, which are either empty or a number. The entries are assigned
    /// left-to-right, top-to-bottom, where each row is completed before the
    /// next one is started. Whitespace in the entries is ignored to allow
    /// for more intuitive formatting. The number of entries must be the
    /// square of the size.
    ///
    /// As an example, the code `4;1, ,2, , ,3, ,4, , , ,3, ,1, ,2` parses to
    /// the following grid:
    ///
    /// ```text
    /// ╔═══╤═══╦═══╤═══╗
    /// ║ 1 │   ║ 2 │   ║
    /// ╟───┼───╫───┼───╢
    /// ║   │ 3 ║   │ 4 ║
    /// ╠═══╪═══╬═══╪═══╣
    /// ║   │   ║ 3 │   ║
    /// ╟───┼───╫───┼───╢
    /// ║   │ 1 ║   │ 2 ║
    /// ╚═══╧═══╩═══╧═══╝
    /// ```
    ///
    /// # Errors
    ///
    /// Any specialization of `ParseError` (see that documentation).
    pub fn parse(code: &str) -> ParseResult<Grid> {
        let parts: Vec<&str> = code.split(';').collect();

        if parts.len() != 2 {
            return Err(ParseError::WrongNumberOfParts);
        }

        let size = parts[0].trim().parse::<usize>()?;

        if block_shape(size).is_err() {
            return Err(ParseError::InvalidSize);
        }

        let entries: Vec<&str> = parts[1].split(',').collect();

        if entries.len() != size * size {
            return Err(ParseError::WrongNumberOfCells);
        }

        let mut numbers = vec![vec![0usize; size]; size];

        for (i, entry) in entries.iter().enumerate() {
            let entry = entry.trim();

            if entry.is_empty() {
                continue;
            }

            let number = entry.parse::<usize>()?;

            if number == 0 || number > size {
                return Err(ParseError::InvalidNumber);
            }

            numbers[i / size][i % size] = number;
        }

        Grid::new(numbers).map_err(|_| ParseError::InvalidSize)
    }

    /// Converts the grid into a `String` in a way that is consistent with
    /// [Grid::parse](#method.parse). That is, a grid that is converted to a
    /// string and parsed again holds the same digits.
    pub fn to_parseable_string(&self) -> String {
        let mut s = format!("{};", self.size);
        let cells = self.cells.iter()
            .map(|cell| to_string(cell.value()))
            .collect::<Vec<String>>()
            .join(",");
        s.push_str(cells.as_str());
        s
    }

    /// Gets the side length of this grid.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Gets the width (number of columns) of one block of this grid,
    /// derived as `ceil(sqrt(size))`.
    pub fn block_width(&self) -> usize {
        self.block_width
    }

    /// Gets the height (number of rows) of one block of this grid, derived
    /// as `floor(sqrt(size))`.
    pub fn block_height(&self) -> usize {
        self.block_height
    }

    fn checked_index(&self, column: usize, row: usize) -> SudokuResult<usize> {
        if column >= self.size || row >= self.size {
            Err(SudokuError::OutOfBounds)
        }
        else {
            Ok(index(column, row, self.size))
        }
    }

    /// Gets the committed value of the cell at the specified position, where
    /// 0 encodes an empty cell.
    ///
    /// # Arguments
    ///
    /// * `column`: The column (x-coordinate) of the desired cell. Must be in
    /// the range `[0, size[`.
    /// * `row`: The row (y-coordinate) of the desired cell. Must be in the
    /// range `[0, size[`.
    ///
    /// # Errors
    ///
    /// If either `column` or `row` are not in the specified range. In that
    /// case, `SudokuError::OutOfBounds` is returned.
    pub fn value(&self, column: usize, row: usize) -> SudokuResult<usize> {
        Ok(self.cells[self.checked_index(column, row)?].value())
    }

    /// Gets a reference to the [Cell] at the specified position.
    ///
    /// # Errors
    ///
    /// If either `column` or `row` are greater than or equal to the size. In
    /// that case, `SudokuError::OutOfBounds` is returned.
    pub fn cell(&self, column: usize, row: usize) -> SudokuResult<&Cell> {
        Ok(&self.cells[self.checked_index(column, row)?])
    }

    /// Gets all groups of this grid: the rows, followed by the columns,
    /// followed by the blocks, each family ordered by index.
    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    /// Gets the group of the given kind with the given index within its
    /// family.
    ///
    /// # Errors
    ///
    /// If `index` is greater than or equal to the size. In that case,
    /// `SudokuError::OutOfBounds` is returned.
    pub fn group(&self, kind: GroupKind, index: usize)
            -> SudokuResult<&Group> {
        if index >= self.size {
            return Err(SudokuError::OutOfBounds);
        }

        let handle = match kind {
            GroupKind::Row => index,
            GroupKind::Column => self.size + index,
            GroupKind::Block => 2 * self.size + index
        };

        Ok(&self.groups[handle])
    }

    /// Registers a listener that is invoked synchronously for every
    /// [GridEvent] this grid raises.
    ///
    /// ```
    /// use sudoku_quadrants::{Grid, GridEvent};
    ///
    /// use std::cell::RefCell;
    /// use std::rc::Rc;
    ///
    /// let mut grid = Grid::empty(4).unwrap();
    /// let events = Rc::new(RefCell::new(Vec::new()));
    /// let sink = Rc::clone(&events);
    /// grid.observe(move |event| sink.borrow_mut().push(*event));
    ///
    /// grid.set_value(0, 0, 3).unwrap();
    ///
    /// assert_eq!(
    ///     vec![GridEvent::ValueChanged { column: 0, row: 0, old: 0, new: 3 }],
    ///     *events.borrow());
    /// ```
    pub fn observe(&mut self, listener: impl FnMut(&GridEvent) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    fn emit(&mut self, events: &[GridEvent]) {
        for event in events {
            for listener in self.listeners.iter_mut() {
                listener(event);
            }
        }
    }

    /// The single internal mutator every value change funnels through. It
    /// updates the three owning groups' occupancy and note tallies,
    /// invalidates the solved memo, and notifies listeners.
    pub(crate) fn write_value(&mut self, idx: usize, new: usize) {
        let old = self.cells[idx].value();

        if old == new {
            return;
        }

        let handles = self.cells[idx].group_handles();
        self.cells[idx].set_value_raw(new);

        let (column, row) = self.coordinates(idx);
        let mut events = vec![GridEvent::ValueChanged {
            column,
            row,
            old,
            new
        }];

        for &handle in handles.iter() {
            if let Some(valid) = self.groups[handle]
                    .record_value_change(old, new) {
                let group = &self.groups[handle];
                events.push(GridEvent::ValidityChanged {
                    kind: group.kind(),
                    index: group.index(),
                    valid
                });
            }
        }

        // The noted-by tallies only count empty cells, so a cell's active
        // notes leave the tallies when it is filled and re-enter when it is
        // emptied again.
        if old == 0 || new == 0 {
            let entering_empty = new == 0;
            let digits: Vec<usize> = self.cells[idx].notes().iter().collect();

            for digit in digits {
                for &handle in handles.iter() {
                    self.groups[handle]
                        .record_note_change(digit, entering_empty);
                }
            }
        }

        self.solved_memo.set(None);
        self.emit(&events);
    }

    /// Sets the value of the cell at the specified position, where 0 clears
    /// the cell. Values greater than the grid size are silently clamped to
    /// it; this is the setter used for programmatic state restoration. Lock
    /// flags are not consulted.
    ///
    /// # Arguments
    ///
    /// * `column`: The column (x-coordinate) of the assigned cell. Must be
    /// in the range `[0, size[`.
    /// * `row`: The row (y-coordinate) of the assigned cell. Must be in the
    /// range `[0, size[`.
    /// * `value`: The value to assign, clamped to `[0, size]`.
    ///
    /// # Errors
    ///
    /// If either `column` or `row` are not in the specified range. In that
    /// case, `SudokuError::OutOfBounds` is returned.
    pub fn set_value(&mut self, column: usize, row: usize, value: usize)
            -> SudokuResult<()> {
        let idx = self.checked_index(column, row)?;
        self.write_value(idx, value.min(self.size));
        Ok(())
    }

    /// Cyclically steps the value of the cell at the specified position
    /// upwards: incrementing past the grid size wraps around to an empty
    /// cell. This is the stepping used for interactive input. Returns the
    /// new value.
    ///
    /// # Errors
    ///
    /// If either `column` or `row` are greater than or equal to the size. In
    /// that case, `SudokuError::OutOfBounds` is returned.
    pub fn increment(&mut self, column: usize, row: usize)
            -> SudokuResult<usize> {
        let idx = self.checked_index(column, row)?;
        let value = self.cells[idx].value();
        let new = if value >= self.size { 0 } else { value + 1 };
        self.write_value(idx, new);
        Ok(new)
    }

    /// Cyclically steps the value of the cell at the specified position
    /// downwards: decrementing an empty cell wraps around to the grid size.
    /// Returns the new value.
    ///
    /// # Errors
    ///
    /// If either `column` or `row` are greater than or equal to the size. In
    /// that case, `SudokuError::OutOfBounds` is returned.
    pub fn decrement(&mut self, column: usize, row: usize)
            -> SudokuResult<usize> {
        let idx = self.checked_index(column, row)?;
        let value = self.cells[idx].value();
        let new = if value == 0 { self.size } else { value - 1 };
        self.write_value(idx, new);
        Ok(new)
    }

    /// Locks or unlocks the cell at the specified position. The engine
    /// treats locked cells as fixed constraints and never overwrites them.
    ///
    /// # Errors
    ///
    /// If either `column` or `row` are greater than or equal to the size. In
    /// that case, `SudokuError::OutOfBounds` is returned.
    pub fn set_locked(&mut self, column: usize, row: usize, locked: bool)
            -> SudokuResult<()> {
        let idx = self.checked_index(column, row)?;
        self.cells[idx].set_locked(locked);
        Ok(())
    }

    /// Resets every cell to empty and unlocked, preparing the grid for
    /// generation or a fresh session.
    pub fn clear(&mut self) {
        for idx in 0..self.cells.len() {
            self.write_value(idx, 0);
            self.cells[idx].set_locked(false);
        }
    }

    /// Activates or deactivates a candidate digit in the notepad of the
    /// cell at the specified position, keeping the owning groups' note
    /// tallies in sync. Requesting the state the candidate is already in is
    /// a no-op. Returns whether the notepad changed.
    ///
    /// # Errors
    ///
    /// * `SudokuError::OutOfBounds` If either `column` or `row` are greater
    /// than or equal to the size.
    /// * `SudokuError::OutOfRangeDigit` If `digit` is not in the range
    /// `[1, size]`.
    pub fn set_note(&mut self, column: usize, row: usize, digit: usize,
            active: bool) -> SudokuResult<bool> {
        let idx = self.checked_index(column, row)?;
        let changed = self.cells[idx].notes_mut().set(digit, active)?;

        if changed && self.cells[idx].is_empty() {
            let handles = self.cells[idx].group_handles();

            for &handle in handles.iter() {
                self.groups[handle].record_note_change(digit, active);
            }
        }

        Ok(changed)
    }

    /// Deactivates all candidate digits of the cell at the specified
    /// position, removing each previously-active digit individually so that
    /// the owning groups' tallies stay correct.
    ///
    /// # Errors
    ///
    /// If either `column` or `row` are greater than or equal to the size. In
    /// that case, `SudokuError::OutOfBounds` is returned.
    pub fn clear_notes(&mut self, column: usize, row: usize)
            -> SudokuResult<()> {
        let idx = self.checked_index(column, row)?;
        let digits: Vec<usize> = self.cells[idx].notes().iter().collect();
        let handles = self.cells[idx].group_handles();
        let empty = self.cells[idx].is_empty();

        for digit in digits {
            self.cells[idx].notes_mut().set(digit, false).unwrap();

            if empty {
                for &handle in handles.iter() {
                    self.groups[handle].record_note_change(digit, false);
                }
            }
        }

        Ok(())
    }

    /// Recomputes the notepad of the cell at the specified position from
    /// scratch: candidate `d` is active if and only if no owning group
    /// currently contains a committed `d`. This is a no-op for filled cells.
    ///
    /// # Errors
    ///
    /// If either `column` or `row` are greater than or equal to the size. In
    /// that case, `SudokuError::OutOfBounds` is returned.
    pub fn refresh_notes(&mut self, column: usize, row: usize)
            -> SudokuResult<()> {
        let idx = self.checked_index(column, row)?;

        if !self.cells[idx].is_empty() {
            return Ok(());
        }

        let handles = self.cells[idx].group_handles();

        for digit in 1..=self.size {
            let excluded = handles.iter()
                .any(|&handle| self.groups[handle].contains(digit));
            let changed =
                self.cells[idx].notes_mut().set(digit, !excluded).unwrap();

            if changed {
                for &handle in handles.iter() {
                    self.groups[handle].record_note_change(digit, !excluded);
                }
            }
        }

        Ok(())
    }

    /// Counts the digits in `[1, size]` that at least one owning group of
    /// the cell at the specified position already excludes, that is, holds
    /// as a committed value. The engine sums this quantity over the peers of
    /// a prospective placement to score how strongly the placement
    /// constrains the rest of the board.
    ///
    /// # Errors
    ///
    /// If either `column` or `row` are greater than or equal to the size. In
    /// that case, `SudokuError::OutOfBounds` is returned.
    pub fn excluded_digits(&self, column: usize, row: usize)
            -> SudokuResult<usize> {
        let idx = self.checked_index(column, row)?;
        Ok(self.excluded_count(idx))
    }

    pub(crate) fn excluded_count(&self, idx: usize) -> usize {
        let handles = self.cells[idx].group_handles();

        (1..=self.size)
            .filter(|&digit| handles.iter()
                .any(|&handle| self.groups[handle].contains(digit)))
            .count()
    }

    /// Sums [Grid::excluded_count] over the distinct empty peers of the
    /// given cell, i.e. the union of its three groups' members minus the
    /// cell itself.
    pub(crate) fn constraint_score(&self, idx: usize) -> usize {
        let handles = self.cells[idx].group_handles();
        let mut seen = vec![false; self.cells.len()];
        let mut score = 0;

        for &handle in handles.iter() {
            for &member in self.groups[handle].members() {
                if member == idx || seen[member] {
                    continue;
                }

                seen[member] = true;

                if self.cells[member].is_empty() {
                    score += self.excluded_count(member);
                }
            }
        }

        score
    }

    pub(crate) fn collapse_notes(&mut self, idx: usize, keep: usize) {
        let digits: Vec<usize> = self.cells[idx].notes().iter().collect();
        let handles = self.cells[idx].group_handles();

        for digit in digits {
            if digit == keep {
                continue;
            }

            self.cells[idx].notes_mut().set(digit, false).unwrap();

            for &handle in handles.iter() {
                self.groups[handle].record_note_change(digit, false);
            }
        }
    }

    pub(crate) fn cell_at(&self, idx: usize) -> &Cell {
        &self.cells[idx]
    }

    pub(crate) fn coordinates(&self, idx: usize) -> (usize, usize) {
        (idx % self.size, idx / self.size)
    }

    pub(crate) fn empty_unlocked_cells(&self) -> Vec<usize> {
        (0..self.cells.len())
            .filter(|&idx| {
                let cell = &self.cells[idx];
                cell.is_empty() && !cell.is_locked()
            })
            .collect()
    }

    /// Exports the current puzzle content as a [State]: the full matrix of
    /// digits, the solved flag as reported by [Grid::is_solved], and the
    /// pass-through metadata this grid carries. Runs in `O(size²)`.
    pub fn snapshot(&self) -> State {
        let mut numbers = vec![vec![0usize; self.size]; self.size];

        for row in 0..self.size {
            for column in 0..self.size {
                numbers[row][column] =
                    self.cells[index(column, row, self.size)].value();
            }
        }

        let mut state = State::new(numbers);
        state.set_solved(self.is_solved());
        state.set_difficulty(self.difficulty);
        *state.properties_mut() = self.properties.clone();
        state
    }

    /// Overwrites every cell's value from the given state, adopting its
    /// metadata and solved flag. Cells outside a smaller state's matrix are
    /// cleared. Out-of-range digits are clamped like in
    /// [Grid::set_value](#method.set_value). This path deliberately bypasses
    /// lock checks: generation and backtracking must be able to stamp
    /// arbitrary values, including onto cells that are locked afterwards.
    ///
    /// # Errors
    ///
    /// If the state's side length exceeds this grid's size. In that case,
    /// `SudokuError::SizeMismatch` is returned and the grid is unchanged.
    pub fn restore(&mut self, state: &State) -> SudokuResult<()> {
        let side = state.side();

        if side > self.size {
            return Err(SudokuError::SizeMismatch);
        }

        for row in 0..self.size {
            for column in 0..self.size {
                let value = if row < side {
                    state.numbers()[row].get(column).copied().unwrap_or(0)
                }
                else {
                    0
                };

                self.write_value(index(column, row, self.size),
                    value.min(self.size));
            }
        }

        self.difficulty = state.difficulty();
        self.properties = state.properties().clone();
        self.solved_memo.set(Some(state.solved()));
        Ok(())
    }

    /// Indicates whether this grid is solved, that is, every row, column,
    /// and block is valid and complete. The result is memoized until the
    /// next mutation, so repeated queries are cheap and free of side
    /// effects.
    pub fn is_solved(&self) -> bool {
        if let Some(solved) = self.solved_memo.get() {
            return solved;
        }

        let solved = self.groups.iter()
            .all(|group| group.is_valid() && group.is_complete());
        self.solved_memo.set(Some(solved));
        solved
    }

    /// Indicates whether any group of this grid is currently invalid, that
    /// is, holds some digit more than once. Unlike
    /// [Grid::is_solved](#method.is_solved), completeness is not required,
    /// which makes this query suitable for live edit-time warnings.
    pub fn has_violation(&self) -> bool {
        self.groups.iter().any(|group| !group.is_valid())
    }

    /// Counts the number of non-empty cells in this grid.
    pub fn count_clues(&self) -> usize {
        self.cells.iter().filter(|cell| !cell.is_empty()).count()
    }

    /// Indicates whether every cell of this grid is filled with a digit.
    pub fn is_full(&self) -> bool {
        !self.cells.iter().any(|cell| cell.is_empty())
    }
}
