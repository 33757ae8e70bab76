//! Directional resize arithmetic, kept apart from the grid so it can be tested alone.

/// Side of the grid that grows or shrinks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Column 0 side. Existing columns shift.
    Left,
    /// Last column side. Existing columns stay put.
    Right,
    /// Row 0 side. Existing rows shift.
    Top,
    /// Last row side. Existing rows stay put.
    Bottom,
}

/// Grid axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    /// Columns
    X,
    /// Rows
    Y,
}

impl Direction {
    /// Axis whose length this direction changes.
    pub fn axis(self) -> Axis {
        match self {
            Direction::Left | Direction::Right => Axis::X,
            Direction::Top | Direction::Bottom => Axis::Y,
        }
    }

    /// Whether resizing on this side moves the existing cells along its axis.
    pub fn shifts_origin(self) -> bool {
        matches!(self, Direction::Left | Direction::Top)
    }
}

/// New `(columns, rows)` after adding `count` on `direction`'s side, or `None` when a
/// dimension would drop to zero or below or overflow.
pub fn resized_dimensions(columns: u32, rows: u32, direction: Direction, count: i32) -> Option<(u32, u32)> {
    let grow = |len: u32| -> Option<u32> {
        let len = i64::from(len) + i64::from(count);
        if len <= 0 {
            return None;
        }
        u32::try_from(len).ok()
    };
    match direction.axis() {
        Axis::X => Some((grow(columns)?, rows)),
        Axis::Y => Some((columns, grow(rows)?)),
    }
}

/// Where coordinate `old` on `axis` lands after that axis went from `old_len` to `new_len`
/// by resizing on `direction`'s side. `None` when it falls outside `[0, new_len)`.
///
/// Axes that `direction` does not touch map to themselves.
pub fn remap(old: u32, old_len: u32, new_len: u32, direction: Direction, axis: Axis) -> Option<u32> {
    let new = if direction.axis() == axis && direction.shifts_origin() {
        i64::from(old) + i64::from(new_len) - i64::from(old_len)
    } else {
        i64::from(old)
    };
    if new < 0 || new >= i64::from(new_len) {
        return None;
    }
    Some(new as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn growing_left_shifts_columns() {
        assert_eq!(remap(0, 4, 6, Direction::Left, Axis::X), Some(2));
        assert_eq!(remap(3, 4, 6, Direction::Left, Axis::X), Some(5));
    }

    #[test]
    fn shrinking_left_drops_low_columns() {
        assert_eq!(remap(0, 4, 2, Direction::Left, Axis::X), None);
        assert_eq!(remap(1, 4, 2, Direction::Left, Axis::X), None);
        assert_eq!(remap(2, 4, 2, Direction::Left, Axis::X), Some(0));
        assert_eq!(remap(3, 4, 2, Direction::Left, Axis::X), Some(1));
    }

    #[test]
    fn right_keeps_indices() {
        assert_eq!(remap(1, 4, 6, Direction::Right, Axis::X), Some(1));
        assert_eq!(remap(1, 4, 2, Direction::Right, Axis::X), Some(1));
        assert_eq!(remap(2, 4, 2, Direction::Right, Axis::X), None);
    }

    #[test]
    fn top_and_bottom_follow_left_and_right() {
        assert_eq!(remap(0, 2, 3, Direction::Top, Axis::Y), Some(1));
        assert_eq!(remap(0, 2, 3, Direction::Bottom, Axis::Y), Some(0));
        assert_eq!(remap(0, 3, 1, Direction::Bottom, Axis::Y), Some(0));
        assert_eq!(remap(1, 3, 1, Direction::Bottom, Axis::Y), None);
    }

    #[test]
    fn other_axis_is_untouched() {
        assert_eq!(remap(3, 5, 5, Direction::Left, Axis::Y), Some(3));
        assert_eq!(remap(3, 5, 5, Direction::Top, Axis::X), Some(3));
    }

    #[test]
    fn dimensions_reject_non_positive_results() {
        assert_eq!(resized_dimensions(4, 4, Direction::Right, -2), Some((2, 4)));
        assert_eq!(resized_dimensions(4, 4, Direction::Top, 3), Some((4, 7)));
        assert_eq!(resized_dimensions(4, 4, Direction::Left, -4), None);
        assert_eq!(resized_dimensions(4, 4, Direction::Bottom, -9), None);
        assert_eq!(resized_dimensions(4, 4, Direction::Left, 0), Some((4, 4)));
    }
}
