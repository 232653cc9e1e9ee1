//! Windowing invariants that must hold for every geometry and scroll
//! position, not just the handful of unit scenarios.

use proptest::prelude::*;
use rollout_core::window::{RowKey, ViewWindow, WindowParams};

fn params_strategy() -> impl Strategy<Value = WindowParams> {
    (1..40u64, 1..30usize, 0..10usize)
        .prop_map(|(h, v, b)| WindowParams::new(h, v, b))
}

proptest! {
    #[test]
    fn spacer_sum_equals_total_extent_for_every_scroll(
        params in params_strategy(),
        len in 0..400u64,
        scrolls in proptest::collection::vec(0..20_000u64, 1..12)
    ) {
        let rows: Vec<RowKey> = (1..=len).collect();
        let (mut window, _) = ViewWindow::with_rows(rows, params);

        for scroll in scrolls {
            window.set_scroll(scroll);
            let rendered =
                (window.range().end - window.range().start) as u64 * params.row_height;
            prop_assert_eq!(
                window.spacer_top() + rendered + window.spacer_bottom(),
                window.total_height()
            );
            prop_assert!(window.range().end <= window.len());
        }
    }

    #[test]
    fn refresh_with_identical_rows_never_moves_the_window(
        params in params_strategy(),
        len in 1..400u64,
        scroll in 0..20_000u64
    ) {
        let rows: Vec<RowKey> = (1..=len).collect();
        let (mut window, _) = ViewWindow::with_rows(rows.clone(), params);
        window.set_scroll(scroll);

        let before_scroll = window.scroll_px();
        let before_range = window.range().clone();

        let delta = window.update_data(rows);
        prop_assert!(delta.is_empty());
        prop_assert_eq!(window.scroll_px(), before_scroll);
        prop_assert_eq!(window.range(), &before_range);
    }

    #[test]
    fn filtering_to_a_subset_preserves_the_scroll_offset(
        params in params_strategy(),
        len in 20..400u64,
        scroll in 0..2_000u64
    ) {
        let rows: Vec<RowKey> = (1..=len).collect();
        let (mut window, _) = ViewWindow::with_rows(rows, params);
        window.set_scroll(scroll);
        let clamped = window.scroll_px();

        // Keep half the rows; the offset survives whenever the shrunken
        // extent still contains it, and clamps to the new end otherwise.
        let filtered: Vec<RowKey> = (1..=len).filter(|k| k % 2 == 1).collect();
        let filtered_len = filtered.len() as u64;
        window.update_data(filtered);

        let viewport = params.visible_rows as u64 * params.row_height;
        let max_scroll = (filtered_len * params.row_height).saturating_sub(viewport);
        prop_assert_eq!(window.scroll_px(), clamped.min(max_scroll));
    }

    #[test]
    fn appending_grows_the_extent_without_moving_scroll(
        params in params_strategy(),
        len in 1..200u64
    ) {
        let rows: Vec<RowKey> = (1..=len).collect();
        let (mut window, _) = ViewWindow::with_rows(rows, params);
        window.scroll_to_end();
        let before_scroll = window.scroll_px();

        window.append_row(len + 1);
        prop_assert_eq!(window.len() as u64, len + 1);
        prop_assert_eq!(window.scroll_px(), before_scroll);
        // The freshly appended tail row is materialized and reachable.
        prop_assert_eq!(window.range().end, window.len());

        window.scroll_to_end();
        let rendered =
            (window.range().end - window.range().start) as u64 * params.row_height;
        prop_assert_eq!(
            window.spacer_top() + rendered + window.spacer_bottom(),
            window.total_height()
        );
    }
}
