//! Custom extractors whose rejections are structured `ApiError`s.

use axum::{
    async_trait,
    extract::{FromRequestParts, Query},
    http::request::Parts,
};
use serde::de::DeserializeOwned;

use crate::error::ApiError;

/// Query string extractor.
///
/// Behaves like [`Query`], but a query string that does not deserialize
/// (a duplicate field such as `?id=..&uuid=..`, for instance) is rejected
/// with `INVALID_INPUT` instead of axum's plain-text response.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiQuery<T>(pub T);

#[async_trait]
impl<S, T> FromRequestParts<S> for ApiQuery<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| {
                ApiError::invalid_input("Invalid query string").with_details(serde_json::json!({
                    "reason": rejection.body_text(),
                }))
            })?;
        Ok(ApiQuery(value))
    }
}
