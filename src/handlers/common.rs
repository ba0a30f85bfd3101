/// Clamps raw pagination parameters the way every list endpoint does:
/// 1-based page, limit capped at 100.
pub fn page_limits(page: Option<u64>, limit: Option<u64>) -> (u64, u64) {
    let page = page.unwrap_or(1).max(1);
    let limit = limit.unwrap_or(20).clamp(1, 100);
    (page, limit)
}

/// Total pages for a paginated response.
pub fn total_pages(total: u64, limit: u64) -> u64 {
    total.div_ceil(limit)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_limits_clamp_out_of_range_values() {
        assert_eq!(page_limits(None, None), (1, 20));
        assert_eq!(page_limits(Some(0), Some(0)), (1, 1));
        assert_eq!(page_limits(Some(3), Some(500)), (3, 100));
    }

    #[test]
    fn total_pages_rounds_up() {
        assert_eq!(total_pages(0, 20), 0);
        assert_eq!(total_pages(41, 20), 3);
    }
}
