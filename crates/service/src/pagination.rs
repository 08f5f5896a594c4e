//! Pagination utilities for the service layer.

/// Pagination parameters as they arrive from query strings.
#[derive(Clone, Copy, Debug)]
pub struct Pagination {
    /// 1-based page index
    pub page: u32,
    /// items per page, capped at 100
    pub per_page: u32,
}

impl Pagination {
    /// Clamp to sane bounds and convert to SeaORM's 0-based `(page, per_page)`.
    pub fn normalize(self) -> (u64, u64) {
        let page = self.page.max(1);
        let per_page = self.per_page.clamp(1, 100);
        (u64::from(page - 1), u64::from(per_page))
    }
}

impl Default for Pagination {
    fn default() -> Self { Self { page: 1, per_page: 20 } }
}
