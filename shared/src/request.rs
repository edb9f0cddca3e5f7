//! Request types for list endpoints
//!
//! Query parameters understood by every paginated list endpoint.

use serde::{Deserialize, Serialize};

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

/// Combined pagination, ordering and filter query
///
/// Unset fields are left out of the query string so the server applies its
/// own defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    /// Page number (1-based)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    /// Items per page
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    /// Sort field, e.g. `createdAt`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<SortOrder>,
    /// Status filter in the resource's own vocabulary
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Search keyword
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    /// Category filter (menu listings)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl ListQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn sort(mut self, field: impl Into<String>, order: SortOrder) -> Self {
        self.sort_by = Some(field.into());
        self.sort_order = Some(order);
        self
    }

    /// Newest first by creation time
    pub fn newest_first(self) -> Self {
        self.sort("createdAt", SortOrder::Desc)
    }

    pub fn status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    pub fn search(mut self, keyword: impl Into<String>) -> Self {
        self.search = Some(keyword.into());
        self
    }

    pub fn category(mut self, category_id: impl Into<String>) -> Self {
        self.category = Some(category_id.into());
        self
    }
}
