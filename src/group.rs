//! This module contains the definition of a [Group], the constraint unit
//! representing one row, column, or block of a grid.

/// An enumeration of the three families of groups a grid derives from its
/// size.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum GroupKind {

    /// A horizontal line of cells.
    Row,

    /// A vertical line of cells.
    Column,

    /// A rectangular sub-block ("quadrant") of cells whose dimensions are
    /// derived from the square root of the grid size.
    Block
}

/// A row, column, or block of a grid: an ordered collection of member cells
/// together with incrementally maintained per-digit tallies.
///
/// For every digit `d` of the grid, a group tracks how many of its committed
/// member cells hold `d` (the *occupancy*) and how many of its empty member
/// cells currently note `d` as a candidate. Both tallies are updated by the
/// owning grid on every cell mutation, which keeps all queries on this type
/// constant-time. Validity (no digit committed more than once) is recomputed
/// on every occupancy change, never from outside; the recording method
/// reports transitions so the grid can raise a validity-changed
/// notification.
///
/// A group with zero members is vacuously valid and complete.
#[derive(Clone, Debug)]
pub struct Group {
    kind: GroupKind,
    index: usize,
    members: Vec<usize>,
    occupancy: Vec<usize>,
    noted_by: Vec<usize>,
    filled: usize,
    overfilled: usize,
    valid: bool
}

impl Group {

    pub(crate) fn new(kind: GroupKind, index: usize, size: usize) -> Group {
        Group {
            kind,
            index,
            members: Vec::with_capacity(size),
            occupancy: vec![0; size + 1],
            noted_by: vec![0; size + 1],
            filled: 0,
            overfilled: 0,
            valid: true
        }
    }

    /// Registers a cell as a member of this group. The cell's current value
    /// and notes must be recorded separately; membership itself carries no
    /// tally information. The grid attaches every cell to its three groups
    /// once at construction.
    pub fn attach(&mut self, cell: usize) {
        self.members.push(cell);
    }

    /// Reverses [Group::attach](#method.attach). The cell's value and note
    /// contributions must be backed out of the tallies first. The standard
    /// row, column, and block families never detach cells; their assignment
    /// is fixed for the lifetime of the grid.
    pub fn detach(&mut self, cell: usize) {
        self.members.retain(|&member| member != cell);
    }

    /// Gets the kind of this group (row, column, or block).
    pub fn kind(&self) -> GroupKind {
        self.kind
    }

    /// Gets the index of this group within its family, e.g. the row number
    /// for a row group.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Gets the member cells of this group as indices into the owning grid's
    /// row-major cell array, in attachment order.
    pub fn members(&self) -> &[usize] {
        &self.members
    }

    /// Indicates whether no digit is committed more than once among the
    /// member cells of this group.
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Indicates whether no member cell of this group is empty.
    pub fn is_complete(&self) -> bool {
        self.filled == self.members.len()
    }

    /// Gets the number of committed member cells holding the given digit.
    /// Digits outside the grid's range have an occupancy of 0.
    pub fn digit_occupancy(&self, digit: usize) -> usize {
        self.occupancy.get(digit).copied().unwrap_or(0)
    }

    /// Gets the number of empty member cells whose notepad currently marks
    /// the given digit as a candidate. Digits outside the grid's range have
    /// a note count of 0.
    pub fn digit_note_count(&self, digit: usize) -> usize {
        self.noted_by.get(digit).copied().unwrap_or(0)
    }

    /// Indicates whether at least one committed member cell holds the given
    /// digit.
    pub fn contains(&self, digit: usize) -> bool {
        self.digit_occupancy(digit) > 0
    }

    /// Records that a member cell's value changed from `old` to `new`, where
    /// 0 encodes an empty cell. Returns the new validity if the change
    /// caused a validity transition and `None` otherwise.
    pub(crate) fn record_value_change(&mut self, old: usize, new: usize)
            -> Option<bool> {
        if old == new {
            return None;
        }

        if old != 0 {
            self.occupancy[old] -= 1;

            if self.occupancy[old] == 1 {
                self.overfilled -= 1;
            }

            self.filled -= 1;
        }

        if new != 0 {
            self.occupancy[new] += 1;

            if self.occupancy[new] == 2 {
                self.overfilled += 1;
            }

            self.filled += 1;
        }

        self.recompute_validity()
    }

    /// Records that a candidate digit of an empty member cell was activated
    /// or deactivated.
    pub(crate) fn record_note_change(&mut self, digit: usize, active: bool) {
        if active {
            self.noted_by[digit] += 1;
        }
        else {
            self.noted_by[digit] -= 1;
        }
    }

    fn recompute_validity(&mut self) -> Option<bool> {
        let valid = self.overfilled == 0;

        if valid != self.valid {
            self.valid = valid;
            Some(valid)
        }
        else {
            None
        }
    }
}

#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn empty_group_is_vacuously_valid_and_complete() {
        let group = Group::new(GroupKind::Row, 0, 4);
        assert!(group.is_valid());
        assert!(group.is_complete());
        assert_eq!(0, group.digit_occupancy(1));
        assert_eq!(0, group.digit_note_count(1));
    }

    #[test]
    fn attach_and_detach_change_membership() {
        let mut group = Group::new(GroupKind::Column, 2, 4);
        group.attach(3);
        group.attach(7);
        assert_eq!(&[3, 7], group.members());
        assert!(!group.is_complete());

        group.detach(3);
        assert_eq!(&[7], group.members());
    }

    #[test]
    fn occupancy_follows_value_changes() {
        let mut group = Group::new(GroupKind::Block, 0, 4);
        group.attach(0);
        group.attach(1);

        assert_eq!(None, group.record_value_change(0, 3));
        assert_eq!(1, group.digit_occupancy(3));
        assert!(group.contains(3));
        assert!(!group.is_complete());

        assert_eq!(None, group.record_value_change(0, 2));
        assert!(group.is_complete());

        assert_eq!(None, group.record_value_change(2, 4));
        assert_eq!(0, group.digit_occupancy(2));
        assert_eq!(1, group.digit_occupancy(4));
        assert!(group.is_complete());
    }

    #[test]
    fn validity_transitions_are_reported_once() {
        let mut group = Group::new(GroupKind::Row, 1, 4);
        group.attach(0);
        group.attach(1);
        group.attach(2);

        assert_eq!(None, group.record_value_change(0, 1));
        assert_eq!(Some(false), group.record_value_change(0, 1));
        // A third 1 keeps the group invalid, so no transition is reported.
        assert_eq!(None, group.record_value_change(0, 1));

        assert_eq!(None, group.record_value_change(1, 0));
        assert_eq!(Some(true), group.record_value_change(1, 2));
        assert!(group.is_valid());
    }

    #[test]
    fn note_tallies_follow_note_changes() {
        let mut group = Group::new(GroupKind::Row, 0, 4);
        group.attach(0);
        group.attach(1);

        group.record_note_change(2, true);
        group.record_note_change(2, true);
        assert_eq!(2, group.digit_note_count(2));

        group.record_note_change(2, false);
        assert_eq!(1, group.digit_note_count(2));
        assert_eq!(0, group.digit_note_count(3));
    }

    #[test]
    fn out_of_range_digits_have_zero_tallies() {
        let group = Group::new(GroupKind::Row, 0, 4);
        assert_eq!(0, group.digit_occupancy(0));
        assert_eq!(0, group.digit_occupancy(5));
        assert_eq!(0, group.digit_note_count(17));
        assert!(!group.contains(5));
    }
}
