//! Windowed table model: which rows of a long list are materialized.
//!
//! A view owns one `ViewWindow` per table. The window holds the ordered
//! row keys, a fixed row height, the viewport size in rows, a buffer of
//! extra rows rendered above/below the viewport to absorb fast scrolling,
//! and the current materialized range `[start, end)`. Rows outside the
//! range are represented by two spacers sized so that
//!
//! ```text
//! spacer_top + (end - start) * row_height + spacer_bottom == len * row_height
//! ```
//!
//! holds for every scroll position, keeping the total scroll extent
//! correct no matter how few rows are real.
//!
//! The window never owns row data; it tracks identities (`RowKey`) so a
//! data refresh can tell which already-materialized rows survived and must
//! not be rebuilt.

use std::collections::BTreeSet;
use std::ops::Range;

/// Identity of one row; the store-local work-item id in practice.
pub type RowKey = u64;

/// Fixed geometry of a windowed table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowParams {
    /// Height of every row, in pixels (or terminal cells).
    pub row_height: u64,
    /// Rows that fit in the viewport at once.
    pub visible_rows: usize,
    /// Extra rows materialized above and below the viewport.
    pub buffer_rows: usize,
}

impl WindowParams {
    pub fn new(row_height: u64, visible_rows: usize, buffer_rows: usize) -> Self {
        Self {
            row_height: row_height.max(1),
            visible_rows: visible_rows.max(1),
            buffer_rows,
        }
    }
}

impl Default for WindowParams {
    fn default() -> Self {
        Self::new(28, 14, 4)
    }
}

/// Which rows a recompute materialized and released.
///
/// Rows present before and after a recompute appear in neither list; the
/// view must leave them untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowDelta {
    pub mounted: Vec<RowKey>,
    pub unmounted: Vec<RowKey>,
}

impl RowDelta {
    pub fn is_empty(&self) -> bool {
        self.mounted.is_empty() && self.unmounted.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct ViewWindow {
    rows: Vec<RowKey>,
    params: WindowParams,
    scroll_px: u64,
    range: Range<usize>,
    mounted: BTreeSet<RowKey>,
}

impl ViewWindow {
    pub fn new(params: WindowParams) -> Self {
        Self {
            rows: Vec::new(),
            params,
            scroll_px: 0,
            range: 0..0,
            mounted: BTreeSet::new(),
        }
    }

    pub fn with_rows(rows: Vec<RowKey>, params: WindowParams) -> (Self, RowDelta) {
        let mut window = Self::new(params);
        let delta = window.update_data(rows);
        (window, delta)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub const fn params(&self) -> WindowParams {
        self.params
    }

    pub const fn scroll_px(&self) -> u64 {
        self.scroll_px
    }

    /// The materialized index range, clamped to `[0, len]`.
    pub const fn range(&self) -> &Range<usize> {
        &self.range
    }

    /// Keys of the materialized rows, in list order.
    pub fn visible_keys(&self) -> &[RowKey] {
        &self.rows[self.range.clone()]
    }

    pub fn total_height(&self) -> u64 {
        self.rows.len() as u64 * self.params.row_height
    }

    pub fn spacer_top(&self) -> u64 {
        self.range.start as u64 * self.params.row_height
    }

    pub fn spacer_bottom(&self) -> u64 {
        (self.rows.len() - self.range.end) as u64 * self.params.row_height
    }

    fn max_scroll(&self) -> u64 {
        let viewport = self.params.visible_rows as u64 * self.params.row_height;
        self.total_height().saturating_sub(viewport)
    }

    /// Move the scroll position and rematerialize only what entered or
    /// left the range.
    pub fn set_scroll(&mut self, scroll_px: u64) -> RowDelta {
        self.scroll_px = scroll_px.min(self.max_scroll());
        self.recompute_range()
    }

    /// Scroll by a signed number of rows (keyboard navigation).
    pub fn scroll_rows(&mut self, delta_rows: i64) -> RowDelta {
        let delta_px = delta_rows.unsigned_abs() * self.params.row_height;
        let target = if delta_rows < 0 {
            self.scroll_px.saturating_sub(delta_px)
        } else {
            self.scroll_px.saturating_add(delta_px)
        };
        self.set_scroll(target)
    }

    /// Bring the list tail into view (e.g. to focus a just-created row).
    pub fn scroll_to_end(&mut self) -> RowDelta {
        self.set_scroll(self.max_scroll())
    }

    /// Replace the row list in place, preserving the scroll position when
    /// the new extent still contains it (clamping otherwise) and keeping
    /// every surviving row materialized rather than rebuilding the slice.
    pub fn update_data(&mut self, rows: Vec<RowKey>) -> RowDelta {
        self.rows = rows;
        self.scroll_px = self.scroll_px.min(self.max_scroll());
        self.recompute_range()
    }

    /// Append one row. When the materialized range already reached the old
    /// tail the range grows over the new row, so a caller can scroll to
    /// the end and focus it without a rebuild; the scroll position itself
    /// is not moved.
    pub fn append_row(&mut self, key: RowKey) -> RowDelta {
        let at_tail = self.range.end == self.rows.len();
        self.rows.push(key);
        if at_tail {
            return self.apply_range(self.range.start..self.rows.len());
        }
        self.recompute_range()
    }

    fn recompute_range(&mut self) -> RowDelta {
        let len = self.rows.len();
        let first_visible = (self.scroll_px / self.params.row_height) as usize;
        let start = first_visible
            .saturating_sub(self.params.buffer_rows)
            .min(len);
        let end = first_visible
            .saturating_add(self.params.visible_rows)
            .saturating_add(self.params.buffer_rows)
            .min(len);
        self.apply_range(start..end)
    }

    fn apply_range(&mut self, range: Range<usize>) -> RowDelta {
        self.range = range;
        let next: BTreeSet<RowKey> = self.rows[self.range.clone()].iter().copied().collect();

        let mounted = next.difference(&self.mounted).copied().collect();
        let unmounted = self.mounted.difference(&next).copied().collect();
        self.mounted = next;
        RowDelta { mounted, unmounted }
    }
}

#[cfg(test)]
mod tests {
    use super::{RowKey, ViewWindow, WindowParams};

    fn keys(n: u64) -> Vec<RowKey> {
        (1..=n).collect()
    }

    fn params() -> WindowParams {
        WindowParams::new(10, 5, 2)
    }

    fn assert_extent(window: &ViewWindow) {
        let rendered =
            (window.range().end - window.range().start) as u64 * window.params().row_height;
        assert_eq!(
            window.spacer_top() + rendered + window.spacer_bottom(),
            window.total_height(),
            "spacer sum broke at scroll {}",
            window.scroll_px()
        );
    }

    #[test]
    fn empty_window_has_zero_extent() {
        let (window, delta) = ViewWindow::with_rows(Vec::new(), params());
        assert!(delta.is_empty());
        assert_eq!(*window.range(), 0..0);
        assert_eq!(window.total_height(), 0);
        assert_extent(&window);
    }

    #[test]
    fn initial_window_materializes_head_plus_buffer() {
        let (window, delta) = ViewWindow::with_rows(keys(100), params());
        assert_eq!(*window.range(), 0..7); // visible 5 + trailing buffer 2
        assert_eq!(delta.mounted, vec![1, 2, 3, 4, 5, 6, 7]);
        assert!(delta.unmounted.is_empty());
        assert_extent(&window);
    }

    #[test]
    fn scrolling_mounts_entering_rows_and_releases_leaving_ones() {
        let (mut window, _) = ViewWindow::with_rows(keys(100), params());

        // One row down: row 8 enters, nothing leaves yet (leading buffer).
        let delta = window.set_scroll(10);
        assert_eq!(delta.mounted, vec![8]);
        assert!(delta.unmounted.is_empty());
        assert_extent(&window);

        // Deep jump: everything is swapped.
        let delta = window.set_scroll(500);
        assert_eq!(*window.range(), 48..57);
        assert!(delta.mounted.starts_with(&[49]));
        assert!(delta.unmounted.contains(&1));
        assert_extent(&window);

        // Scrolling a single row within the buffered range keeps the
        // overlap untouched.
        let delta = window.set_scroll(510);
        assert_eq!(delta.mounted, vec![58]);
        assert_eq!(delta.unmounted, vec![49]);
        assert_extent(&window);
    }

    #[test]
    fn scroll_is_clamped_to_extent() {
        let (mut window, _) = ViewWindow::with_rows(keys(20), params());
        window.set_scroll(1_000_000);
        // 20 rows * 10px - 5 visible * 10px
        assert_eq!(window.scroll_px(), 150);
        assert_eq!(window.range().end, 20);
        assert_extent(&window);

        // Shorter than the viewport: no scrolling at all.
        let (mut short, _) = ViewWindow::with_rows(keys(3), params());
        short.set_scroll(40);
        assert_eq!(short.scroll_px(), 0);
        assert_eq!(*short.range(), 0..3);
        assert_extent(&short);
    }

    #[test]
    fn update_data_preserves_scroll_on_filter_change() {
        let (mut window, _) = ViewWindow::with_rows(keys(100), params());
        window.set_scroll(300);
        let before = window.scroll_px();

        // Filter drops every other row but the extent still covers the
        // scroll position.
        let filtered: Vec<RowKey> = (1..=100).filter(|k| k % 2 == 0).collect();
        window.update_data(filtered);
        assert_eq!(window.scroll_px(), before);
        assert_extent(&window);
    }

    #[test]
    fn update_data_keeps_surviving_rows_mounted() {
        let (mut window, _) = ViewWindow::with_rows(keys(100), params());
        window.set_scroll(300); // range 28..37

        // Same identities at the same positions: nothing mounts or
        // unmounts, scroll untouched.
        let delta = window.update_data(keys(100));
        assert!(delta.is_empty());
        assert_eq!(window.scroll_px(), 300);
    }

    #[test]
    fn update_data_clamps_scroll_when_list_shrinks() {
        let (mut window, _) = ViewWindow::with_rows(keys(100), params());
        window.set_scroll(900);
        window.update_data(keys(10));
        assert_eq!(window.scroll_px(), 50);
        assert_eq!(window.range().end, 10);
        assert_extent(&window);
    }

    #[test]
    fn append_at_tail_grows_the_range_without_moving_scroll() {
        let (mut window, _) = ViewWindow::with_rows(keys(6), params());
        // Whole list fits: range reaches the tail.
        assert_eq!(*window.range(), 0..6);

        let delta = window.append_row(7);
        assert_eq!(delta.mounted, vec![7]);
        assert!(delta.unmounted.is_empty());
        assert_eq!(*window.range(), 0..7);
        assert_eq!(window.scroll_px(), 0);
        assert_extent(&window);

        // The caller may then bring the new row into view.
        window.scroll_to_end();
        assert_eq!(window.scroll_px(), 20);
        assert_extent(&window);
    }

    #[test]
    fn append_far_below_the_window_changes_nothing_visible() {
        let (mut window, _) = ViewWindow::with_rows(keys(100), params());
        let delta = window.append_row(101);
        assert!(delta.is_empty());
        assert_eq!(window.len(), 101);
        assert_extent(&window);
    }
}
