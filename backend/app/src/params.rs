//! Request extractors that reject with [`crate::common::ApiError`] and plug into `axum-valid`.

pub mod json;
pub mod pagination;
pub mod path;
pub mod query;
pub mod valid;

pub use json::Json;
pub use pagination::{CommonParams, Page};
pub use path::Path;
pub use query::Query;
pub use valid::Valid;
