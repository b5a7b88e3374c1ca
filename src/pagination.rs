use serde::Serialize;

fn get_pages(
    total_pages: usize,
    current_page: usize,
    left_edge: usize,
    left_current: usize,
    right_current: usize,
    right_edge: usize,
) -> Vec<Option<usize>> {
    let last_page = total_pages;

    if last_page == 0 {
        return vec![];
    }

    let mut pages = Vec::new();

    let left_end = (1 + left_edge).min(last_page + 1);
    pages.extend((1..left_end).map(Some));

    let mid_start = left_end.max(current_page.saturating_sub(left_current));
    let mid_end = current_page
        .saturating_add(right_current + 1)
        .min(last_page + 1);

    if mid_start > left_end {
        pages.push(None);
    }
    pages.extend((mid_start..mid_end).map(Some));

    let right_start = mid_end.max(last_page.saturating_sub(right_edge) + 1);

    if right_start > mid_end {
        pages.push(None);
    }
    pages.extend((right_start..=last_page).map(Some));

    pages
}

/// One page of rows plus everything the pager needs to render itself.
///
/// `first_row`/`last_row` are 1-based and both zero when there are no rows.
#[derive(Debug, Serialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    /// Page links; `None` marks an elided range.
    pub pages: Vec<Option<usize>>,
    pub page: usize,
    pub per_page: usize,
    pub total: usize,
    pub total_pages: usize,
    pub first_row: usize,
    pub last_row: usize,
    pub has_previous: bool,
    pub has_next: bool,
}

impl<T> Paginated<T> {
    pub fn new(items: Vec<T>, current_page: usize, per_page: usize, total: usize) -> Self {
        let current_page = current_page.max(1);
        let total_pages = if per_page == 0 {
            0
        } else {
            total.div_ceil(per_page)
        };

        let pages = get_pages(total_pages, current_page, 2, 2, 4, 2);

        let (first_row, last_row) = if total == 0 || items.is_empty() {
            (0, 0)
        } else {
            let first = (current_page - 1).saturating_mul(per_page).saturating_add(1);
            (first, first.saturating_add(items.len() - 1).min(total))
        };

        Self {
            items,
            pages,
            page: current_page,
            per_page,
            total,
            total_pages,
            first_row,
            last_row,
            has_previous: current_page > 1,
            has_next: current_page < total_pages,
        }
    }

    /// Converts the rows while keeping the pager untouched.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Paginated<U> {
        Paginated {
            items: self.items.into_iter().map(f).collect(),
            pages: self.pages,
            page: self.page,
            per_page: self.per_page,
            total: self.total,
            total_pages: self.total_pages,
            first_row: self.first_row,
            last_row: self.last_row,
            has_previous: self.has_previous,
            has_next: self.has_next,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last_partial_page_reports_row_range() {
        let page = Paginated::new(vec![1, 2, 3, 4, 5], 3, 20, 45);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.first_row, 41);
        assert_eq!(page.last_row, 45);
        assert!(page.has_previous);
        assert!(!page.has_next);
    }

    #[test]
    fn empty_result_has_no_pages() {
        let page: Paginated<u8> = Paginated::new(vec![], 1, 20, 0);
        assert_eq!(page.total_pages, 0);
        assert!(page.pages.is_empty());
        assert_eq!((page.first_row, page.last_row), (0, 0));
        assert!(!page.has_previous);
        assert!(!page.has_next);
    }

    #[test]
    fn long_pagers_are_elided() {
        assert_eq!(
            get_pages(20, 10, 2, 2, 4, 2),
            vec![
                Some(1),
                Some(2),
                None,
                Some(8),
                Some(9),
                Some(10),
                Some(11),
                Some(12),
                Some(13),
                Some(14),
                None,
                Some(19),
                Some(20),
            ]
        );
    }

    #[test]
    fn map_keeps_pager() {
        let page = Paginated::new(vec![1, 2], 1, 20, 2).map(|n| n * 10);
        assert_eq!(page.items, vec![10, 20]);
        assert_eq!(page.total, 2);
        assert_eq!(page.last_row, 2);
    }
}
