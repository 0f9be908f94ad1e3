/// Pagination window
use serde::{Deserialize, Serialize};

/// Skip/limit window over a listing, with a 1-based page number
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    /// Page number, starting at 1
    pub page: u32,

    /// Maximum number of items per page
    pub limit: u32,
}

impl Page {
    /// Create a page window
    pub fn new(page: u32, limit: u32) -> Self {
        Self { page, limit }
    }

    /// Number of items to skip
    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.limit)
    }
}

impl Default for Page {
    fn default() -> Self {
        Self { page: 1, limit: 10 }
    }
}
