use axum::http::Uri;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use super::error::ApiError;

pub const PAGE_SIZE: i64 = 6;
pub const MAX_PAGE_SIZE: i64 = 60;

#[derive(Debug, Default, Clone, Copy, Deserialize, IntoParams)]
pub struct PageParams {
    /// Page number, starting at 1 (default: 1)
    pub page: Option<i64>,
    /// Items per page (default: 6, max: 60)
    pub limit: Option<i64>,
}

impl PageParams {
    pub fn page(&self) -> i64 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(PAGE_SIZE).clamp(1, MAX_PAGE_SIZE)
    }

    pub fn offset(&self) -> i64 {
        (self.page() - 1).saturating_mul(self.limit())
    }

    /// Pages past the end are an error, except the first page of an empty
    /// result set.
    pub fn check_in_range(&self, returned: usize) -> Result<(), ApiError> {
        if returned == 0 && self.page() > 1 {
            return Err(ApiError::not_found("Invalid page."));
        }
        Ok(())
    }
}

/// One page of results with absolute links to its neighbours.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Page<T> {
    /// Total number of items available
    pub count: i64,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<T>,
}

impl<T> Page<T> {
    pub fn new(results: Vec<T>, count: i64, params: &PageParams, site_url: &str, uri: &Uri) -> Self {
        let page = params.page();
        let has_next = page.saturating_mul(params.limit()) < count;

        Page {
            count,
            next: has_next.then(|| page_url(site_url, uri, page + 1)),
            previous: (page > 1).then(|| page_url(site_url, uri, page - 1)),
            results,
        }
    }
}

/// Rebuild the request URL with `page` replaced. Page 1 drops the parameter.
pub fn page_url(site_url: &str, uri: &Uri, page: i64) -> String {
    let mut pairs: Vec<String> = uri
        .query()
        .unwrap_or_default()
        .split('&')
        .filter(|pair| !pair.is_empty() && *pair != "page" && !pair.starts_with("page="))
        .map(str::to_string)
        .collect();

    if page > 1 {
        pairs.push(format!("page={}", page));
    }

    if pairs.is_empty() {
        format!("{}{}", site_url, uri.path())
    } else {
        format!("{}{}?{}", site_url, uri.path(), pairs.join("&"))
    }
}
