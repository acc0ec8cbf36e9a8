//! Custom Axum extractors.
//!
//! Wraps the stock JSON extractor so malformed request bodies (bad
//! JSON, unknown enum values such as an invalid `status`) surface as
//! 400 Bad Request with the standard `{code, message}` error body,
//! instead of axum's default 422.

use crate::error::AppError;
use axum::{
    async_trait,
    extract::{FromRequest, Request},
    response::{IntoResponse, Response},
};
use serde::{de::DeserializeOwned, Serialize};

/// JSON body extractor with domain error responses.
///
/// Drop-in for `axum::Json` on both sides: extraction failures become
/// [`AppError::bad_request`], responses serialize exactly like the
/// stock type.
#[derive(Debug, Clone, Copy)]
pub struct Json<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for Json<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match axum::Json::<T>::from_request(req, state).await {
            Ok(axum::Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(AppError::bad_request(rejection.body_text())),
        }
    }
}

impl<T> IntoResponse for Json<T>
where
    T: Serialize,
{
    fn into_response(self) -> Response {
        axum::Json(self.0).into_response()
    }
}
