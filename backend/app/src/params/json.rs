use axum::extract::FromRequest;
use axum_valid::HasValidate;

use crate::common::error::ApiError;

/// JSON body whose parse failures surface as `ApiError::Json`.
#[derive(Debug, Clone, FromRequest)]
#[from_request(via(axum::extract::Json), rejection(ApiError))]
pub struct Json<T>(pub T);

impl<T> HasValidate for Json<T> {
    type Validate = T;

    fn get_validate(&self) -> &Self::Validate {
        &self.0
    }
}
