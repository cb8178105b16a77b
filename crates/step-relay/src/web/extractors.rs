//! Request parameter extraction and validation

use serde::Deserialize;
use utoipa::IntoParams;

/// Pagination query parameters (1-based page numbering)
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct PaginationParams {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
}

fn default_page() -> u32 {
    1
}

fn default_limit() -> u32 {
    50
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self {
            page: default_page(),
            limit: default_limit(),
        }
    }
}

impl PaginationParams {
    pub fn validate(&self) -> Result<(), String> {
        if self.page < 1 {
            return Err("page must be >= 1".to_string());
        }
        if self.limit < 1 || self.limit > 1000 {
            return Err("limit must be between 1 and 1000".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let params = PaginationParams::default();
        assert_eq!(params.page, 1);
        assert_eq!(params.limit, 50);
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_validation_bounds() {
        let params = PaginationParams { page: 0, limit: 50 };
        assert!(params.validate().is_err());

        let params = PaginationParams {
            page: 1,
            limit: 2000,
        };
        assert!(params.validate().is_err());
    }
}
