use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_LIMIT: i64 = 10;
pub const MAX_LIMIT: i64 = 100;

/// 1-indexed page request.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Pagination {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_page() -> i64 {
    DEFAULT_PAGE
}
fn default_limit() -> i64 {
    DEFAULT_LIMIT
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl Pagination {
    pub fn new(page: Option<i64>, limit: Option<i64>) -> Self {
        Self {
            page: page.unwrap_or(DEFAULT_PAGE),
            limit: limit.unwrap_or(DEFAULT_LIMIT),
        }
        .normalized()
    }

    pub fn normalized(self) -> Self {
        Self {
            page: self.page.max(1),
            limit: self.limit.clamp(1, MAX_LIMIT),
        }
    }

    /// Rows to skip. Saturates instead of overflowing for absurd page numbers.
    pub fn offset(&self) -> i64 {
        self.page.saturating_sub(1).saturating_mul(self.limit)
    }
}

pub fn total_pages(total: i64, limit: i64) -> i64 {
    if limit <= 0 {
        return 0;
    }
    (total + limit - 1) / limit
}

#[derive(Debug, Serialize)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
    pub total_pages: i64,
}

impl<T> Paginated<T> {
    pub fn new(data: Vec<T>, total: i64, p: Pagination) -> Self {
        Self {
            data,
            total,
            page: p.page,
            limit: p.limit,
            total_pages: total_pages(total, p.limit),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_pages_is_ceiling() {
        assert_eq!(total_pages(0, 10), 0);
        assert_eq!(total_pages(1, 10), 1);
        assert_eq!(total_pages(10, 10), 1);
        assert_eq!(total_pages(11, 10), 2);
        assert_eq!(total_pages(95, 7), 14);
    }

    #[test]
    fn defaults_and_clamping() {
        let p = Pagination::new(None, None);
        assert_eq!((p.page, p.limit), (1, 10));
        assert_eq!(p.offset(), 0);

        let p = Pagination::new(Some(0), Some(1000));
        assert_eq!((p.page, p.limit), (1, MAX_LIMIT));

        let p = Pagination::new(Some(3), Some(20));
        assert_eq!(p.offset(), 40);
    }

    #[test]
    fn huge_page_does_not_overflow() {
        let p = Pagination::new(Some(i64::MAX), Some(MAX_LIMIT));
        assert_eq!(p.page, i64::MAX);
        assert_eq!(p.offset(), i64::MAX);

        let p = Pagination { page: i64::MIN, limit: -5 }.normalized();
        assert_eq!((p.page, p.limit), (1, 1));
        assert_eq!(p.offset(), 0);
    }

    #[test]
    fn pages_cover_every_row_once() {
        let rows: Vec<i64> = (1..=23).collect();
        let limit = 5;
        let pages = total_pages(rows.len() as i64, limit);
        let mut seen = Vec::new();
        for page in 1..=pages {
            let p = Pagination::new(Some(page), Some(limit));
            seen.extend(
                rows.iter()
                    .skip(p.offset() as usize)
                    .take(p.limit as usize)
                    .copied(),
            );
        }
        assert_eq!(seen, rows);
    }
}
