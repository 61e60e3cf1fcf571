use rocket::FromForm;
use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_SIZE: u32 = 50;
pub const MAX_PAGE_SIZE: u32 = 500;

/// Pagination query parameters. Pages are numbered from 1.
/// Out-of-range values are clamped rather than rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromForm)]
pub struct PaginationRequest {
    #[field(default = 1)]
    page_num: u32,
    #[field(default = DEFAULT_PAGE_SIZE)]
    page_size: u32,
}

impl PaginationRequest {
    pub fn new(page_num: u32, page_size: u32) -> Self {
        Self {
            page_num: page_num.max(1),
            page_size: page_size.clamp(1, MAX_PAGE_SIZE),
        }
    }

    pub fn page_num(&self) -> u32 {
        self.page_num.max(1)
    }

    pub fn page_size(&self) -> u32 {
        self.page_size.clamp(1, MAX_PAGE_SIZE)
    }

    /// How many items precede this page.
    pub fn skip(&self) -> usize {
        (self.page_num() as usize - 1) * self.page_size() as usize
    }

    /// Cut this page out of `items` and wrap it with the pagination metadata.
    pub fn paginate<T: Clone>(&self, items: &[T]) -> Paginated<T> {
        let page = items
            .iter()
            .skip(self.skip())
            .take(self.page_size() as usize)
            .cloned()
            .collect();
        Paginated {
            pagination: PaginationResult {
                page_num: self.page_num(),
                page_size: self.page_size(),
                total: items.len(),
            },
            items: page,
        }
    }
}

impl Default for PaginationRequest {
    fn default() -> Self {
        Self::new(1, DEFAULT_PAGE_SIZE)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationResult {
    pub page_num: u32,
    pub page_size: u32,
    pub total: usize,
}

/// One page of results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paginated<T> {
    pub pagination: PaginationResult,
    pub items: Vec<T>,
}
