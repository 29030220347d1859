//! Pagination and selection over a flat list of commands.
//!
//! Page numbers are 1-based; the selection is a 0-based index into the
//! visible page. Wraparound arithmetic shifts to 0-based, applies the
//! modulo and shifts back.

/// Direction of a selection move or page turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Previous,
    Next,
}

impl Direction {
    fn offset(self) -> isize {
        match self {
            Direction::Previous => -1,
            Direction::Next => 1,
        }
    }
}

/// Number of pages needed for `len` commands; never less than one.
///
/// A zero capacity is treated as a capacity of one.
pub fn total_pages(len: usize, capacity: usize) -> usize {
    len.div_ceil(capacity.max(1)).max(1)
}

/// The commands visible on 1-based `page`, clipped to the partition.
pub fn get_page(partition: &[String], page: usize, capacity: usize) -> &[String] {
    let capacity = capacity.max(1);
    let start = page.saturating_sub(1).saturating_mul(capacity).min(partition.len());
    let end = page.saturating_mul(capacity).min(partition.len());
    &partition[start..end]
}

/// Turn from `current` one page in `direction`, wrapping at both ends.
pub fn turn_page(current: usize, direction: Direction, total: usize) -> usize {
    let total = total.max(1) as isize;
    let zero_based = current as isize - 1 + direction.offset();
    zero_based.rem_euclid(total) as usize + 1
}

/// Move the selection within a page of `page_size` entries.
///
/// Returns the new selection and, when the move wrapped off the edge of the
/// page, the direction the page must turn. Moving on an empty page is a no-op.
pub fn move_selection(
    current: usize,
    direction: Direction,
    page_size: usize,
) -> (usize, Option<Direction>) {
    if page_size == 0 {
        return (current, None);
    }
    let size = page_size as isize;
    let new = (current as isize + direction.offset()).rem_euclid(size) as usize;
    let wrapped = match direction {
        Direction::Next => new == 0,
        Direction::Previous => new == page_size - 1,
    };
    (new, wrapped.then_some(direction))
}

/// The selected command, or `None` when `selection` is outside the page.
pub fn get_selected(
    partition: &[String],
    page: usize,
    selection: usize,
    capacity: usize,
) -> Option<&str> {
    get_page(partition, page, capacity)
        .get(selection)
        .map(String::as_str)
}

/// Current page and selection for whatever partition is being shown.
///
/// The pager does not own the partition; every operation takes the
/// partition it should be evaluated against so a turn triggered by a
/// selection move always sees the page that is current after the turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pager {
    page: usize,
    selected: usize,
    capacity: usize,
}

impl Pager {
    pub fn new(capacity: usize) -> Self {
        Self {
            page: 1,
            selected: 0,
            capacity: capacity.max(1),
        }
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Back to the first entry of the first page.
    pub fn reset(&mut self) {
        self.page = 1;
        self.selected = 0;
    }

    pub fn total_pages(&self, len: usize) -> usize {
        total_pages(len, self.capacity)
    }

    pub fn commands<'a>(&self, partition: &'a [String]) -> &'a [String] {
        get_page(partition, self.page, self.capacity)
    }

    pub fn selected_command<'a>(&self, partition: &'a [String]) -> Option<&'a str> {
        get_selected(partition, self.page, self.selected, self.capacity)
    }

    /// Change the page capacity (e.g. after a resize), keeping the position valid.
    pub fn set_capacity(&mut self, capacity: usize, partition: &[String]) {
        self.capacity = capacity.max(1);
        self.clamp(partition);
    }

    /// Turn the page. The selection is kept when it still fits the new page.
    pub fn turn(&mut self, direction: Direction, partition: &[String]) {
        self.page = turn_page(self.page, direction, self.total_pages(partition.len()));
        self.clamp(partition);
        tracing::debug!(page = self.page, ?direction, "turned page");
    }

    /// Move the selection, turning the page when it runs off either edge.
    pub fn move_selected(&mut self, direction: Direction, partition: &[String]) {
        let page_size = self.commands(partition).len();
        let (selected, turn) = move_selection(self.selected, direction, page_size);
        self.selected = selected;

        if let Some(direction) = turn {
            self.page = turn_page(self.page, direction, self.total_pages(partition.len()));
            // Bounds come from the page we just turned to.
            self.selected = match direction {
                Direction::Next => 0,
                Direction::Previous => self.commands(partition).len().saturating_sub(1),
            };
        }
    }

    /// Pull page and selection back inside the partition after it shrank.
    pub fn clamp(&mut self, partition: &[String]) {
        self.page = self.page.clamp(1, self.total_pages(partition.len()));
        let page_size = self.commands(partition).len();
        self.selected = self.selected.min(page_size.saturating_sub(1));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn commands(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("cmd {i}")).collect()
    }

    #[test]
    fn test_total_pages() {
        assert_eq!(total_pages(25, 7), 4);
        assert_eq!(total_pages(21, 7), 3);
        assert_eq!(total_pages(0, 7), 1);
        assert_eq!(total_pages(1, 7), 1);
        assert_eq!(total_pages(3, 0), 3);
    }

    #[test]
    fn test_get_page_clips_last_page() {
        let partition = commands(25);
        assert_eq!(get_page(&partition, 1, 7).len(), 7);
        assert_eq!(get_page(&partition, 4, 7), &partition[21..25]);
        assert!(get_page(&partition, 5, 7).is_empty());
    }

    #[test]
    fn test_exact_multiple_last_page_is_full() {
        let partition = commands(21);
        assert_eq!(total_pages(partition.len(), 7), 3);
        assert_eq!(get_page(&partition, 3, 7).len(), 7);
    }

    #[test]
    fn test_empty_partition_has_one_empty_page() {
        let partition: Vec<String> = Vec::new();
        assert_eq!(total_pages(0, 7), 1);
        assert!(get_page(&partition, 1, 7).is_empty());
        assert_eq!(get_selected(&partition, 1, 0, 7), None);
    }

    #[test]
    fn test_turn_page_wraps() {
        let cases = [
            (1, Direction::Next, 2),
            (2, Direction::Next, 3),
            (3, Direction::Next, 4),
            (4, Direction::Next, 1),
            (4, Direction::Previous, 3),
            (3, Direction::Previous, 2),
            (2, Direction::Previous, 1),
            (1, Direction::Previous, 4),
        ];
        for (current, direction, expected) in cases {
            assert_eq!(turn_page(current, direction, 4), expected, "{current} {direction:?}");
        }
    }

    #[test]
    fn test_turning_total_pages_times_is_identity() {
        for start in 1..=4 {
            let mut page = start;
            for _ in 0..4 {
                page = turn_page(page, Direction::Next, 4);
            }
            assert_eq!(page, start);
        }
    }

    #[test]
    fn test_move_selection_on_empty_page_is_noop() {
        assert_eq!(move_selection(0, Direction::Next, 0), (0, None));
        assert_eq!(move_selection(0, Direction::Previous, 0), (0, None));
    }

    #[test]
    fn test_move_selection_signals_turns_only_at_edges() {
        assert_eq!(move_selection(5, Direction::Next, 7), (6, None));
        assert_eq!(move_selection(6, Direction::Next, 7), (0, Some(Direction::Next)));
        assert_eq!(move_selection(1, Direction::Previous, 7), (0, None));
        assert_eq!(
            move_selection(0, Direction::Previous, 7),
            (6, Some(Direction::Previous))
        );
        assert_eq!(move_selection(0, Direction::Next, 1), (0, Some(Direction::Next)));
    }

    #[test]
    fn test_pager_selection_moves_across_pages() {
        let partition = commands(25);
        let cases = [
            (0, Direction::Next, 1, 1),
            (5, Direction::Next, 6, 1),
            (6, Direction::Next, 0, 2),
            (6, Direction::Previous, 5, 1),
            (1, Direction::Previous, 0, 1),
            (0, Direction::Previous, 3, 4),
        ];
        for (selected, direction, expected_selected, expected_page) in cases {
            let mut pager = Pager::new(7);
            pager.selected = selected;
            pager.move_selected(direction, &partition);
            assert_eq!(pager.selected(), expected_selected, "{selected} {direction:?}");
            assert_eq!(pager.page(), expected_page, "{selected} {direction:?}");
        }
    }

    #[test]
    fn test_pager_next_off_short_last_page_wraps_to_first() {
        let partition = commands(25);
        let mut pager = Pager::new(7);
        pager.page = 4;
        pager.selected = 2;
        pager.move_selected(Direction::Next, &partition);
        assert_eq!((pager.page(), pager.selected()), (4, 3));
        pager.move_selected(Direction::Next, &partition);
        assert_eq!((pager.page(), pager.selected()), (1, 0));
    }

    #[test]
    fn test_pager_next_off_full_last_page_wraps_to_first() {
        let partition = commands(21);
        let mut pager = Pager::new(7);
        pager.page = 3;
        pager.selected = 5;
        pager.move_selected(Direction::Next, &partition);
        assert_eq!((pager.page(), pager.selected()), (3, 6));
        pager.move_selected(Direction::Next, &partition);
        assert_eq!((pager.page(), pager.selected()), (1, 0));
    }

    #[test]
    fn test_pager_previous_uses_new_page_size() {
        let partition = commands(25);
        let mut pager = Pager::new(7);
        pager.move_selected(Direction::Previous, &partition);
        assert_eq!((pager.page(), pager.selected()), (4, 3));
        assert_eq!(pager.selected_command(&partition), Some("cmd 24"));
    }

    #[test]
    fn test_pager_single_page_wraps_in_place() {
        let partition = commands(3);
        let mut pager = Pager::new(7);
        pager.move_selected(Direction::Previous, &partition);
        assert_eq!((pager.page(), pager.selected()), (1, 2));
        pager.move_selected(Direction::Next, &partition);
        assert_eq!((pager.page(), pager.selected()), (1, 0));
    }

    #[test]
    fn test_pager_turn_clamps_selection_to_shorter_page() {
        let partition = commands(25);
        let mut pager = Pager::new(7);
        pager.selected = 6;
        pager.turn(Direction::Previous, &partition);
        assert_eq!((pager.page(), pager.selected()), (4, 3));
        pager.turn(Direction::Next, &partition);
        assert_eq!((pager.page(), pager.selected()), (1, 3));
    }

    #[test]
    fn test_pager_clamp_after_shrink() {
        let mut partition = commands(8);
        let mut pager = Pager::new(7);
        pager.page = 2;
        partition.truncate(7);
        pager.clamp(&partition);
        assert_eq!((pager.page(), pager.selected()), (1, 0));

        pager.selected = 6;
        partition.pop();
        pager.clamp(&partition);
        assert_eq!(pager.selected(), 5);
    }

    #[test]
    fn test_pager_set_capacity() {
        let partition = commands(25);
        let mut pager = Pager::new(7);
        pager.page = 4;
        pager.set_capacity(20, &partition);
        assert_eq!(pager.page(), 2);
        assert_eq!(pager.commands(&partition).len(), 5);
        pager.set_capacity(0, &partition);
        assert_eq!(pager.capacity(), 1);
    }
}
