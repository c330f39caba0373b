use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

pub const MAX_ITEMS_PER_PAGE: i64 = 100;

/// Keeps `(page - 1) * itemsPerPage` well inside the `i64` range the database binds offsets as.
pub const MAX_PAGE: u64 = 1_000_000_000;

/// `itemsPerPage=-1` asks for every matching row on a single page.
pub const ALL_ITEMS: i64 = -1;

fn default_page() -> u64 {
    1
}

fn default_items_per_page() -> i64 {
    10
}

fn validate_page(value: u64) -> Result<(), ValidationError> {
    if (1..=MAX_PAGE).contains(&value) {
        return Ok(());
    }

    Err(ValidationError::new("range")
        .with_message(format!("page must be between 1 and {MAX_PAGE}").into()))
}

fn validate_items_per_page(value: i64) -> Result<(), ValidationError> {
    if value == ALL_ITEMS || (1..=MAX_ITEMS_PER_PAGE).contains(&value) {
        return Ok(());
    }

    Err(ValidationError::new("range").with_message(
        format!("itemsPerPage must be -1 or between 1 and {MAX_ITEMS_PER_PAGE}").into(),
    ))
}

/// Search, filter, sort and pagination parameters shared by every list endpoint.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CommonParams {
    #[serde(
        default = "default_page",
        deserialize_with = "crate::serde::deserialize_number"
    )]
    #[validate(custom(function = "validate_page"))]
    pub page: u64,
    #[serde(
        default = "default_items_per_page",
        deserialize_with = "crate::serde::deserialize_number"
    )]
    #[validate(custom(function = "validate_items_per_page"))]
    pub items_per_page: i64,
    /// Free-text search over the entity's search columns.
    #[serde(default)]
    pub q: Option<String>,
    #[serde(default, deserialize_with = "crate::serde::deserialize_comma_list")]
    pub sort_by: Vec<String>,
    /// Aligned with `sort_by`; missing entries mean ascending.
    #[serde(default, deserialize_with = "crate::serde::deserialize_comma_list")]
    pub descending: Vec<bool>,
    /// JSON filter tree, see `crate::search::filter`.
    #[serde(default)]
    pub filter: Option<String>,
}

impl CommonParams {
    pub fn new(page: u64, items_per_page: i64) -> Self {
        Self {
            page,
            items_per_page,
            ..Default::default()
        }
    }

    /// Row limit for the page, `None` when every row was requested.
    pub fn limit(&self) -> Option<u64> {
        (self.items_per_page != ALL_ITEMS).then_some(self.items_per_page as u64)
    }

    pub fn offset(&self) -> u64 {
        match self.limit() {
            Some(limit) => self.page.saturating_sub(1).saturating_mul(limit),
            None => 0,
        }
    }

    pub fn search_term(&self) -> Option<&str> {
        self.q.as_deref().map(str::trim).filter(|q| !q.is_empty())
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub items_per_page: i64,
    pub page: u64,
    pub total: u64,
}

impl<T> Page<T> {
    pub fn from_params(params: &CommonParams, total: u64, items: Vec<T>) -> Self {
        Self {
            items,
            items_per_page: params.items_per_page,
            page: if params.limit().is_some() { params.page } else { 1 },
            total,
        }
    }

    /// Swaps the items while keeping the counters, for conversions that need I/O.
    pub fn with_items<U>(self, items: Vec<U>) -> Page<U> {
        Page {
            items,
            items_per_page: self.items_per_page,
            page: self.page,
            total: self.total,
        }
    }
}
