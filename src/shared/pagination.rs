/// Page of results returned by list queries
#[derive(Debug)]
pub struct PaginatedResult<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
    pub total_pages: u32,
}

impl<T> PaginatedResult<T> {
    pub fn new(items: Vec<T>, total: u64, page: u32, limit: u32) -> Self {
        let total_pages = total.div_ceil(u64::from(limit.max(1))) as u32;
        Self {
            items,
            total,
            page,
            limit,
            total_pages,
        }
    }
}

/// Clamp raw page/limit query values to sane bounds.
pub fn normalize_page(page: Option<u32>, limit: Option<u32>) -> (u32, u32) {
    let page = page.unwrap_or(1).max(1);
    let limit = limit.unwrap_or(50).clamp(1, 100);
    (page, limit)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_pages_rounds_up() {
        let page = PaginatedResult::new(vec![1, 2], 101, 1, 50);
        assert_eq!(page.total_pages, 3);
    }

    #[test]
    fn normalize_clamps() {
        assert_eq!(normalize_page(None, None), (1, 50));
        assert_eq!(normalize_page(Some(0), Some(1000)), (1, 100));
    }
}
