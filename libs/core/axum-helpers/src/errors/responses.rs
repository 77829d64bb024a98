//! Reusable OpenAPI response types for consistent API documentation.

use super::ErrorResponse;
#[allow(unused_imports)]
use serde_json::json;
use utoipa::ToResponse;

#[derive(ToResponse)]
#[response(
    description = "Internal Server Error",
    content_type = "application/json",
    example = json!({ "message": "Error interno del servidor" })
)]
pub struct InternalServerErrorResponse(pub ErrorResponse);

#[derive(ToResponse)]
#[response(
    description = "Unprocessable Entity - field validation failed",
    content_type = "application/json",
    example = json!({
        "message": "Los datos proporcionados no son válidos",
        "errors": {
            "nombre": ["El nombre ya existe"],
            "precio": ["El precio debe ser un número"]
        }
    })
)]
pub struct ValidationErrorResponse(pub ErrorResponse);

#[derive(ToResponse)]
#[response(
    description = "Bad Request - malformed JSON body or path id",
    content_type = "application/json",
    example = json!({ "message": "Identificador inválido: abc" })
)]
pub struct BadRequestResponse(pub ErrorResponse);

#[derive(ToResponse)]
#[response(
    description = "Resource not found",
    content_type = "application/json",
    example = json!({ "message": "Producto no encontrado" })
)]
pub struct NotFoundResponse(pub ErrorResponse);

#[derive(ToResponse)]
#[response(
    description = "Unprocessable Entity - the request conflicts with current state",
    content_type = "application/json",
    example = json!({ "message": "No se puede reducir la cantidad por debajo de 0" })
)]
pub struct UnprocessableEntityResponse(pub ErrorResponse);

