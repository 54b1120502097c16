use serde::Serialize;
use std::num::NonZeroU64;

/// Page number and size requested by a client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: NonZeroU64,
    pub limit: NonZeroU64,
}

impl Pagination {
    pub const DEFAULT_LIMIT: NonZeroU64 = match NonZeroU64::new(6) {
        Some(n) => n,
        None => panic!("DEFAULT_LIMIT is accidentally set to 0"),
    };
    pub const MAX_LIMIT: u64 = 100;

    #[must_use]
    pub const fn first(limit: NonZeroU64) -> Self {
        Self {
            page: NonZeroU64::MIN,
            limit,
        }
    }

    #[must_use]
    pub fn offset(&self) -> u64 {
        (self.page.get() - 1).saturating_mul(self.limit.get())
    }

    #[must_use]
    pub fn has_next(&self, count: u64) -> bool {
        self.offset().saturating_add(self.limit.get()) < count
    }

    #[must_use]
    pub fn has_previous(&self) -> bool {
        self.page.get() > 1
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::first(Self::DEFAULT_LIMIT)
    }
}

/// Paginated response body: `{count, next, previous, results}`.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Page<T> {
    pub count: u64,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<T>,
}
