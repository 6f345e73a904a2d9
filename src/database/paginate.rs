use serde::{Deserialize, Serialize};

use crate::config;

/// Uniform envelope for paginated query results. `count` is always the total
/// number of matches before pagination, not the page length.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Paginate<T> {
    pub current_page: i64,
    pub total_pages: i64,
    pub count: i64,
    pub items: Vec<T>,
}

impl<T> Paginate<T> {
    /// Re-wrap the same page window around converted items.
    pub fn map_items<U>(self, f: impl FnOnce(Vec<T>) -> Vec<U>) -> Paginate<U> {
        Paginate {
            current_page: self.current_page,
            total_pages: self.total_pages,
            count: self.count,
            items: f(self.items),
        }
    }
}

/// Client-supplied pagination request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageOptions {
    #[serde(default)]
    pub current_page: i64,
    #[serde(default = "default_page_size")]
    pub page_size: i64,
}

fn default_page_size() -> i64 {
    config::config().api.default_page_size
}

impl Default for PageOptions {
    fn default() -> Self {
        Self {
            current_page: 0,
            page_size: default_page_size(),
        }
    }
}

/// A clamped page window ready to hand to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageBounds {
    pub page: i64,
    pub total_pages: i64,
    pub skip: i64,
}

/// Clamps a candidate page index against the match count.
///
/// `total_pages = ceil(count / page_size)`; the resolved page always lands in
/// `[0, max(total_pages - 1, 0)]` and the skip offset is `page * page_size`.
/// Out-of-range input is never an error.
pub fn page_bounds(requested_page: i64, page_size: i64, count: i64) -> PageBounds {
    let total_pages = if page_size <= 0 {
        0
    } else {
        (count + page_size - 1) / page_size
    };

    let page = if total_pages == 0 || requested_page < 0 {
        0
    } else if requested_page >= total_pages {
        total_pages - 1
    } else {
        requested_page
    };

    PageBounds {
        page,
        total_pages,
        skip: page * page_size,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_pages_is_ceiling_of_count_over_page_size() {
        assert_eq!(page_bounds(0, 10, 95).total_pages, 10);
        assert_eq!(page_bounds(0, 10, 100).total_pages, 10);
        assert_eq!(page_bounds(0, 10, 101).total_pages, 11);
        assert_eq!(page_bounds(0, 1, 3).total_pages, 3);
        assert_eq!(page_bounds(0, 7, 0).total_pages, 0);
    }

    #[test]
    fn overrun_page_clamps_to_last() {
        // count=95, pageSize=10, requestedPage=12 -> totalPages=10, page=9, skip=90
        let bounds = page_bounds(12, 10, 95);
        assert_eq!(
            bounds,
            PageBounds {
                page: 9,
                total_pages: 10,
                skip: 90
            }
        );
    }

    #[test]
    fn page_equal_to_total_pages_clamps_to_last() {
        let bounds = page_bounds(10, 10, 95);
        assert_eq!(bounds.page, 9);
        assert_eq!(bounds.skip, 90);
    }

    #[test]
    fn negative_page_clamps_to_zero() {
        let bounds = page_bounds(-3, 10, 95);
        assert_eq!(bounds.page, 0);
        assert_eq!(bounds.skip, 0);
    }

    #[test]
    fn empty_result_set_stays_on_page_zero() {
        // count=0, pageSize=10, requestedPage=0 -> totalPages=0, page=0
        let bounds = page_bounds(0, 10, 0);
        assert_eq!(
            bounds,
            PageBounds {
                page: 0,
                total_pages: 0,
                skip: 0
            }
        );
    }

    #[test]
    fn resolved_page_is_always_in_range() {
        for count in [0i64, 1, 9, 10, 11, 95, 100] {
            for page_size in [1i64, 3, 10, 50] {
                for requested in [-5i64, 0, 1, 7, 10, 12, 1000] {
                    let b = page_bounds(requested, page_size, count);
                    let upper = (b.total_pages - 1).max(0);
                    assert!(b.page >= 0 && b.page <= upper);
                    assert_eq!(b.skip, b.page * page_size);
                }
            }
        }
    }

    #[test]
    fn map_items_preserves_window() {
        let page = Paginate {
            current_page: 2,
            total_pages: 5,
            count: 42,
            items: vec![1, 2, 3],
        };
        let mapped = page.map_items(|items| items.into_iter().map(|i| i * 10).collect::<Vec<_>>());
        assert_eq!(mapped.current_page, 2);
        assert_eq!(mapped.count, 42);
        assert_eq!(mapped.items, vec![10, 20, 30]);
    }

    #[test]
    fn envelope_serializes_camel_case() {
        let page = Paginate {
            current_page: 0,
            total_pages: 1,
            count: 1,
            items: vec!["x"],
        };
        let v = serde_json::to_value(&page).unwrap();
        assert!(v.get("currentPage").is_some());
        assert!(v.get("totalPages").is_some());
        assert!(v.get("count").is_some());
        assert!(v.get("items").is_some());
    }
}
