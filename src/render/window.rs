use crate::config::RenderConfig;
use crate::render::strategy::Strategy;
use serde::Serialize;
use std::ops::{Range, RangeInclusive};

/// Page buttons shown at once in the pagination bar.
pub const MAX_PAGE_BUTTONS: usize = 5;

/// Half-open row range `[start_index, end_index)` materialized for display.
///
/// Spacers are only non-zero for virtual windows: they stand in for the rows above
/// and below the window so the scrollbar keeps the proportions of the full table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderWindow {
    pub strategy: Strategy,
    pub start_index: usize,
    pub end_index: usize,
    pub leading_spacer: u64,
    pub trailing_spacer: u64,
}

impl RenderWindow {
    fn plain(strategy: Strategy, start_index: usize, end_index: usize) -> Self {
        Self {
            strategy,
            start_index,
            end_index,
            leading_spacer: 0,
            trailing_spacer: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.end_index - self.start_index
    }

    pub fn is_empty(&self) -> bool {
        self.start_index == self.end_index
    }

    pub fn range(&self) -> Range<usize> {
        self.start_index..self.end_index
    }
}

pub fn total_pages(row_count: usize, items_per_page: usize) -> usize {
    row_count.div_ceil(items_per_page.max(1))
}

/// Clamp a 1-based page into `[1, max(1, total_pages)]`.
pub fn clamp_page(page: usize, row_count: usize, items_per_page: usize) -> usize {
    page.clamp(1, total_pages(row_count, items_per_page).max(1))
}

pub fn full_window(row_count: usize) -> RenderWindow {
    RenderWindow::plain(Strategy::Full, 0, row_count)
}

pub fn paginated_window(row_count: usize, page: usize, config: &RenderConfig) -> RenderWindow {
    let per_page = config.items_per_page.max(1);
    let page = clamp_page(page, row_count, per_page);
    let start = ((page - 1) * per_page).min(row_count);
    let end = start.saturating_add(per_page).min(row_count);
    RenderWindow::plain(Strategy::Paginated, start, end)
}

pub fn virtual_window(row_count: usize, scroll_offset: f64, config: &RenderConfig) -> RenderWindow {
    let item_height = config.item_height.max(1);
    let offset = sanitize_offset(scroll_offset);
    let start = ((offset / f64::from(item_height)).floor() as usize).min(row_count);
    let end = start
        .saturating_add(config.rows_per_viewport())
        .saturating_add(config.buffer_rows)
        .min(row_count);
    let item_height = u64::from(item_height);
    RenderWindow {
        strategy: Strategy::Virtual,
        start_index: start,
        end_index: end,
        leading_spacer: start as u64 * item_height,
        trailing_spacer: (row_count - end) as u64 * item_height,
    }
}

/// Negative, NaN and infinite offsets collapse to the top of the table.
pub(crate) fn sanitize_offset(offset: f64) -> f64 {
    if offset.is_finite() && offset > 0.0 {
        offset
    } else {
        0.0
    }
}

pub fn select_window(
    row_count: usize,
    strategy: Strategy,
    page: usize,
    scroll_offset: f64,
    config: &RenderConfig,
) -> RenderWindow {
    match strategy {
        Strategy::Full => full_window(row_count),
        Strategy::Paginated => paginated_window(row_count, page, config),
        Strategy::Virtual => virtual_window(row_count, scroll_offset, config),
    }
}

/// Contiguous slice of `rows` covered by `window`.
pub fn select_rows<'a, T>(rows: &'a [T], window: &RenderWindow) -> &'a [T] {
    let end = window.end_index.min(rows.len());
    let start = window.start_index.min(end);
    &rows[start..end]
}

/// Page numbers to offer as buttons, centred on `current` where possible.
pub fn page_buttons(current: usize, total: usize) -> RangeInclusive<usize> {
    let start = current.saturating_sub(MAX_PAGE_BUTTONS / 2).max(1);
    let end = total.min(start + MAX_PAGE_BUTTONS - 1);
    start..=end
}

/// State of the pagination bar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageSummary {
    pub current_page: usize,
    pub total_pages: usize,
    /// 1-based index of the first row on the page, 0 when there are none.
    pub first_row: usize,
    pub last_row: usize,
    pub total_rows: usize,
    pub buttons: Vec<usize>,
    pub has_previous: bool,
    pub has_next: bool,
}

pub fn page_summary(row_count: usize, page: usize, config: &RenderConfig) -> PageSummary {
    let total = total_pages(row_count, config.items_per_page);
    let window = paginated_window(row_count, page, config);
    let current = clamp_page(page, row_count, config.items_per_page);
    PageSummary {
        current_page: current,
        total_pages: total,
        first_row: if window.is_empty() { 0 } else { window.start_index + 1 },
        last_row: window.end_index,
        total_rows: row_count,
        buttons: page_buttons(current, total).collect(),
        has_previous: current > 1,
        has_next: current < total,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn config() -> RenderConfig {
        RenderConfig::default()
    }

    #[test]
    fn full_window_covers_everything() {
        let window = select_window(321, Strategy::Full, 7, 9999.0, &config());
        assert_eq!(window.range(), 0..321);
        assert_eq!(window.leading_spacer + window.trailing_spacer, 0);
    }

    #[rstest]
    #[case(2500, 1, 0..100)]
    #[case(2500, 2, 100..200)]
    #[case(2500, 25, 2400..2500)]
    #[case(2550, 26, 2500..2550)]
    #[case(2550, 0, 0..100)]
    #[case(2550, 99, 2500..2550)]
    #[case(0, 3, 0..0)]
    fn paginated_windows(#[case] rows: usize, #[case] page: usize, #[case] expected: Range<usize>) {
        assert_eq!(paginated_window(rows, page, &config()).range(), expected);
    }

    #[test]
    fn adjacent_pages_are_contiguous_and_sized() {
        let rows = 4321;
        let total = total_pages(rows, 100);
        assert_eq!(total, 44);
        let mut expected_start = 0;
        for page in 1..=total {
            let window = paginated_window(rows, page, &config());
            assert_eq!(window.start_index, expected_start);
            assert_eq!(window.len(), 100.min(rows - window.start_index));
            expected_start = window.end_index;
        }
        assert_eq!(expected_start, rows);
    }

    #[rstest]
    #[case(0.0, 0..15)]
    #[case(39.9, 0..15)]
    #[case(40.0, 1..16)]
    #[case(4000.0, 100..115)]
    #[case(-250.0, 0..15)]
    #[case(f64::NAN, 0..15)]
    #[case(f64::INFINITY, 0..15)]
    fn virtual_window_tracks_scroll(#[case] offset: f64, #[case] expected: Range<usize>) {
        assert_eq!(virtual_window(6000, offset, &config()).range(), expected);
    }

    #[test]
    fn virtual_window_clamps_at_the_bottom() {
        let window = virtual_window(6000, 6000.0 * 40.0 - 100.0, &config());
        assert_eq!(window.range(), 5997..6000);

        let past_end = virtual_window(6000, 1e12, &config());
        assert_eq!(past_end.range(), 6000..6000);
        assert_eq!(past_end.trailing_spacer, 0);
    }

    #[test]
    fn spacers_preserve_total_scroll_height() {
        let config = config();
        let rows = 7777;
        for offset in (0..(rows as u64 * 40 + 2000)).step_by(997) {
            let window = virtual_window(rows, offset as f64, &config);
            assert!(window.start_index <= window.end_index);
            assert!(window.end_index <= rows);
            let rendered = window.len() as u64 * 40;
            assert_eq!(
                window.leading_spacer + rendered + window.trailing_spacer,
                rows as u64 * 40,
                "offset = {offset}"
            );
        }
    }

    #[test]
    fn select_rows_is_an_ordered_slice() {
        let rows: Vec<usize> = (0..250).collect();
        let window = paginated_window(rows.len(), 2, &config());
        assert_eq!(select_rows(&rows, &window), &rows[100..200]);
    }

    #[test]
    fn select_rows_tolerates_windows_larger_than_rows() {
        let rows = vec![1, 2, 3];
        let window = full_window(10);
        assert_eq!(select_rows(&rows, &window), &[1, 2, 3]);
    }

    #[rstest]
    #[case(1, 40, 1..=5)]
    #[case(2, 40, 1..=5)]
    #[case(3, 40, 1..=5)]
    #[case(10, 40, 8..=12)]
    #[case(40, 40, 38..=40)]
    #[case(1, 2, 1..=2)]
    fn page_buttons_centre_on_current(
        #[case] current: usize,
        #[case] total: usize,
        #[case] expected: RangeInclusive<usize>,
    ) {
        assert_eq!(page_buttons(current, total), expected);
    }

    #[test]
    fn page_summary_for_last_partial_page() {
        let summary = page_summary(1234, 13, &config());
        assert_eq!(
            summary,
            PageSummary {
                current_page: 13,
                total_pages: 13,
                first_row: 1201,
                last_row: 1234,
                total_rows: 1234,
                buttons: vec![11, 12, 13],
                has_previous: true,
                has_next: false,
            }
        );
    }
}
