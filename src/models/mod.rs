//! Data schemas shared by the repository, the handlers and the generated
//! TypeScript bindings.

pub mod admin;
pub mod catalog;
pub mod learner;
pub mod quiz;
pub mod user;

pub use crate::locale::Locale;
pub use admin::*;
pub use catalog::*;
pub use learner::*;
pub use quiz::*;
pub use user::*;

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utoipa::ToSchema;

/// Pagination
///
/// Paging metadata attached to every paginated listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub total_pages: i64,
}

impl Pagination {
    pub fn new(page: i64, limit: i64, total: i64) -> Self {
        let total_pages = if limit > 0 { (total + limit - 1) / limit } else { 0 };
        Self {
            page,
            limit,
            total,
            total_pages,
        }
    }
}

/// A single page of results together with its paging metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub pagination: Pagination,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, page: i64, limit: i64, total: i64) -> Self {
        Self {
            items,
            pagination: Pagination::new(page, limit, total),
        }
    }
}

const MAX_PAGE_LIMIT: i64 = 100;
const MAX_PAGE: i64 = i64::MAX / MAX_PAGE_LIMIT;

/// Clamps raw `page`/`limit` query values into a usable `(page, limit, offset)` triple.
///
/// `page` is capped so the offset cannot overflow; pages past the end come back empty.
pub fn page_window(page: Option<i64>, limit: Option<i64>, default_limit: i64) -> (i64, i64, i64) {
    let page = page.unwrap_or(1).clamp(1, MAX_PAGE);
    let limit = limit.unwrap_or(default_limit).clamp(1, MAX_PAGE_LIMIT);
    (page, limit, (page - 1) * limit)
}

/// Returns the trimmed value when the field is present and not blank.
pub(crate) fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}
