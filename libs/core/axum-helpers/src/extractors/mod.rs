//! Custom extractors for Axum handlers.
//!
//! Every rejection is an [`AppError`](crate::AppError), so clients always get the
//! `{ "message" }` error body.

pub mod id_path;
pub mod query;
pub mod validated_json;

pub use id_path::IdPath;
pub use query::QueryParams;
pub use validated_json::{JsonBody, ValidatedJson};
