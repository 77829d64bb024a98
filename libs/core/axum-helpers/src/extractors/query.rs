//! Query string extractor that answers with the shared error envelope.

use crate::errors::AppError;
use axum::extract::{FromRequestParts, Query};
use axum::http::request::Parts;
use serde::de::DeserializeOwned;

/// `Query<T>` whose rejection is a 400 `{ "message" }` body.
pub struct QueryParams<T>(pub T);

impl<T, S> FromRequestParts<S> for QueryParams<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(params) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|e| AppError::BadRequest(format!("Parámetros de consulta inválidos: {}", e.body_text())))?;
        Ok(QueryParams(params))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        Router,
        body::Body,
        http::{Request, StatusCode},
        routing::get,
    };
    use http_body_util::BodyExt;
    use serde::Deserialize;
    use serde_json::Value;
    use tower::ServiceExt;

    #[derive(Deserialize)]
    struct Filter {
        page: Option<u32>,
    }

    async fn handler(QueryParams(filter): QueryParams<Filter>) -> String {
        filter.page.unwrap_or(1).to_string()
    }

    async fn get_uri(uri: &str) -> (StatusCode, Vec<u8>) {
        let response = Router::new()
            .route("/", get(handler))
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, bytes.to_vec())
    }

    #[tokio::test]
    async fn test_valid_query_passes() {
        let (status, body) = get_uri("/?page=3").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, b"3");
    }

    #[tokio::test]
    async fn test_invalid_query_is_400_message() {
        let (status, body) = get_uri("/?page=abc").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let body: Value = serde_json::from_slice(&body).unwrap();
        assert!(body["message"].as_str().unwrap().starts_with("Parámetros de consulta inválidos"));
    }
}
