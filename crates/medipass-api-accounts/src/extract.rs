//! Request-body extraction.
//!
//! Axum's stock `Json` extractor reports malformed or missing bodies
//! with its own rejection (422 for deserialization failures). Account
//! endpoints report every bad request as a 400 validation problem, so
//! handlers take [`ApiJson`] instead.

use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};
use axum::{async_trait, Json};
use serde::de::DeserializeOwned;

use crate::error::ApiAccountsError;

/// JSON body extractor whose rejection is a 400 validation problem.
#[derive(Debug)]
pub struct ApiJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiAccountsError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(ApiJson(value)),
            Err(rejection) => Err(ApiAccountsError::Validation(body_error_message(&rejection))),
        }
    }
}

fn body_error_message(rejection: &JsonRejection) -> String {
    match rejection {
        JsonRejection::JsonDataError(e) => format!("Invalid request body: {e}"),
        JsonRejection::JsonSyntaxError(_) => "Request body is not valid JSON".to_string(),
        JsonRejection::MissingJsonContentType(_) => {
            "Request body must be application/json".to_string()
        }
        _ => "Invalid request body".to_string(),
    }
}
