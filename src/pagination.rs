//! Page arithmetic for the pager row.

use std::ops::RangeInclusive;

/// Most page-number buttons shown at once.
pub const MAX_PAGE_BUTTONS: u32 = 5;

/// Number of pages needed to show `total_count` items, `page_size` at a time.
///
/// A zero page size yields zero pages rather than dividing by zero.
pub fn total_pages(total_count: u64, page_size: u32) -> u32 {
    if page_size == 0 {
        return 0;
    }
    let pages = total_count.div_ceil(u64::from(page_size));
    u32::try_from(pages).unwrap_or(u32::MAX)
}

/// The page numbers to offer as buttons around `current`.
///
/// Shows every page when there are at most `MAX_PAGE_BUTTONS`. Otherwise the
/// window is pinned to the first (or last) five pages while `current` is
/// within three pages of that edge, and centred on `current` in between.
/// `current` is clamped into `1..=total_pages` first.
pub fn page_window(current: u32, total_pages: u32) -> RangeInclusive<u32> {
    if total_pages == 0 {
        return RangeInclusive::new(1, 0);
    }
    if total_pages <= MAX_PAGE_BUTTONS {
        return 1..=total_pages;
    }

    let current = current.clamp(1, total_pages);
    let half = MAX_PAGE_BUTTONS / 2;
    let edge = half + 1;

    if current - 1 <= edge {
        1..=MAX_PAGE_BUTTONS
    } else if total_pages - current <= edge {
        (total_pages - MAX_PAGE_BUTTONS + 1)..=total_pages
    } else {
        (current - half)..=(current + half)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn window(current: u32, total: u32) -> Vec<u32> {
        page_window(current, total).collect()
    }

    #[test]
    fn test_total_pages_rounds_up() {
        assert_eq!(total_pages(45, 12), 4);
        assert_eq!(total_pages(48, 12), 4);
        assert_eq!(total_pages(49, 12), 5);
        assert_eq!(total_pages(0, 12), 0);
        assert_eq!(total_pages(1, 12), 1);
    }

    #[test]
    fn test_total_pages_zero_page_size() {
        assert_eq!(total_pages(45, 0), 0);
    }

    #[test]
    fn test_window_few_pages_shows_all() {
        assert_eq!(window(1, 4), vec![1, 2, 3, 4]);
        assert_eq!(window(4, 4), vec![1, 2, 3, 4]);
        assert_eq!(window(3, 5), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_window_near_end() {
        assert_eq!(window(7, 10), vec![6, 7, 8, 9, 10]);
        assert_eq!(window(10, 10), vec![6, 7, 8, 9, 10]);
    }

    #[test]
    fn test_window_near_start() {
        assert_eq!(window(1, 10), vec![1, 2, 3, 4, 5]);
        assert_eq!(window(4, 10), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_window_centred_in_middle() {
        assert_eq!(window(5, 10), vec![3, 4, 5, 6, 7]);
        assert_eq!(window(6, 10), vec![4, 5, 6, 7, 8]);
        assert_eq!(window(50, 100), vec![48, 49, 50, 51, 52]);
    }

    #[test]
    fn test_window_empty_and_out_of_range() {
        assert!(window(1, 0).is_empty());
        assert_eq!(window(0, 10), vec![1, 2, 3, 4, 5]);
        assert_eq!(window(99, 10), vec![6, 7, 8, 9, 10]);
    }

    proptest! {
        #[test]
        fn prop_window_is_contiguous_bounded_and_contains_current(
            total in 1u32..500,
            current_seed in 0u32..500,
        ) {
            let current = current_seed % total + 1;
            let pages = window(current, total);

            prop_assert_eq!(pages.len() as u32, total.min(MAX_PAGE_BUTTONS));
            prop_assert!(pages.contains(&current));
            prop_assert!(pages.iter().all(|p| (1..=total).contains(p)));
            prop_assert!(pages.windows(2).all(|w| w[1] == w[0] + 1));
        }

        #[test]
        fn prop_pages_cover_total_exactly(total in 0u64..10_000, size in 1u32..100) {
            let pages = u64::from(total_pages(total, size));
            prop_assert!(pages * u64::from(size) >= total);
            if pages > 0 {
                prop_assert!((pages - 1) * u64::from(size) < total);
            }
        }
    }
}
