//! Success envelope shared by every endpoint.
//!
//! ```json
//! { "message": "Inventario actualizado", "code": 200, "data": { ... } }
//! ```
//!
//! The HTTP status always equals `code`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    pub message: String,
    pub code: u16,
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn new(message: impl Into<String>, status: StatusCode, data: Option<T>) -> Self {
        Self {
            message: message.into(),
            code: status.as_u16(),
            data,
        }
    }

    /// 200 with a payload.
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self::new(message, StatusCode::OK, Some(data))
    }

    /// 201 with the created resource.
    pub fn created(message: impl Into<String>, data: T) -> Self {
        Self::new(message, StatusCode::CREATED, Some(data))
    }

    pub fn status(&self) -> StatusCode {
        StatusCode::from_u16(self.code).unwrap_or(StatusCode::OK)
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (self.status(), Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use serde_json::{Value, json};

    #[tokio::test]
    async fn test_created_sets_status_and_code() {
        let response = ApiResponse::created("Producto creado con éxito", json!({"id": 1})).into_response();
        assert_eq!(response.status(), StatusCode::CREATED);

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(
            body,
            json!({ "message": "Producto creado con éxito", "code": 201, "data": { "id": 1 } })
        );
    }

    #[test]
    fn test_empty_data_serializes_as_null() {
        let envelope: ApiResponse<()> = ApiResponse::new("ok", StatusCode::OK, None);
        assert_eq!(
            serde_json::to_value(&envelope).unwrap(),
            json!({ "message": "ok", "code": 200, "data": null })
        );
    }
}
