use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

pub const MAX_PAGE_SIZE: u32 = 100;

#[derive(Debug, Clone, Copy, Deserialize, IntoParams, ToSchema)]
pub struct PaginationParams {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self {
            page: default_page(),
            page_size: default_page_size(),
        }
    }
}

fn default_page() -> u32 {
    1
}

fn default_page_size() -> u32 {
    10
}

impl PaginationParams {
    pub fn validate(&self) -> Result<(), String> {
        if self.page < 1 {
            return Err("page must be >= 1".to_string());
        }
        if self.page_size < 1 || self.page_size > MAX_PAGE_SIZE {
            return Err(format!("page_size must be between 1 and {}", MAX_PAGE_SIZE));
        }
        Ok(())
    }

    pub fn offset(&self) -> u32 {
        (self.page - 1).saturating_mul(self.page_size)
    }

    pub fn limit(&self) -> u32 {
        self.page_size
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PaginationMeta {
    pub page: u32,
    pub page_size: u32,
    pub total_items: i64,
    pub total_pages: u32,
}

impl PaginationMeta {
    pub fn new(page: u32, page_size: u32, total_items: i64) -> Self {
        let total_pages = if total_items <= 0 {
            0
        } else {
            (total_items as u64).div_ceil(u64::from(page_size)) as u32
        };
        Self {
            page,
            page_size,
            total_items,
            total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let params: PaginationParams = serde_json::from_str("{}").unwrap();
        assert_eq!(params.page, 1);
        assert_eq!(params.page_size, 10);
        assert!(params.validate().is_ok());
        assert_eq!(params.offset(), 0);
    }

    #[test]
    fn test_rejects_out_of_range() {
        let params = PaginationParams { page: 0, page_size: 10 };
        assert!(params.validate().is_err());

        let params = PaginationParams { page: 1, page_size: 101 };
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_offset_and_total_pages() {
        let params = PaginationParams { page: 3, page_size: 20 };
        assert_eq!(params.offset(), 40);
        assert_eq!(params.limit(), 20);

        assert_eq!(PaginationMeta::new(1, 10, 0).total_pages, 0);
        assert_eq!(PaginationMeta::new(1, 10, 10).total_pages, 1);
        assert_eq!(PaginationMeta::new(1, 10, 11).total_pages, 2);
    }
}
