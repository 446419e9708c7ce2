//! Pagination parameters and the shared page envelope for all listings

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_PAGE_SIZE: i64 = 20;

/// Normalized pagination parameters. `new` substitutes defaults for missing
/// or non-positive values, so `skip` can never go negative.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PaginationParams {
    pub page: i64,
    pub page_size: i64,
}

impl PaginationParams {
    pub fn new(page: Option<i64>, page_size: Option<i64>) -> Self {
        let page = match page {
            Some(page) if page >= 1 => page,
            _ => DEFAULT_PAGE,
        };
        let page_size = match page_size {
            Some(page_size) if page_size >= 1 => page_size,
            _ => DEFAULT_PAGE_SIZE,
        };
        Self { page, page_size }
    }

    pub fn skip(&self) -> i64 {
        (self.page - 1) * self.page_size
    }
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// One page of a listing plus the pre-pagination total
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: i64,
    pub page_size: i64,
    pub total_pages: i64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: i64, params: PaginationParams) -> Self {
        Self {
            items,
            total,
            page: params.page,
            page_size: params.page_size,
            total_pages: total_pages(total, params.page_size),
        }
    }
}

fn total_pages(total: i64, page_size: i64) -> i64 {
    (total + page_size - 1) / page_size
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_applied_for_missing_values() {
        let params = PaginationParams::new(None, None);
        assert_eq!(params.page, 1);
        assert_eq!(params.page_size, 20);
        assert_eq!(params.skip(), 0);
    }

    #[test]
    fn non_positive_values_normalized_to_defaults() {
        let params = PaginationParams::new(Some(0), Some(-5));
        assert_eq!(params.page, 1);
        assert_eq!(params.page_size, 20);
    }

    #[test]
    fn skip_is_page_minus_one_times_page_size() {
        let params = PaginationParams::new(Some(3), Some(25));
        assert_eq!(params.skip(), 50);
    }

    #[test]
    fn total_pages_rounds_up() {
        let page = Page::new(vec![1, 2, 3], 45, PaginationParams::new(Some(1), Some(20)));
        assert_eq!(page.total_pages, 3);
    }

    #[test]
    fn zero_total_gives_zero_pages() {
        let page: Page<i32> = Page::new(vec![], 0, PaginationParams::default());
        assert_eq!(page.total_pages, 0);
        assert_eq!(page.total, 0);
    }
}
