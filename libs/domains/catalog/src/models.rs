use axum_helpers::FieldErrors;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::borrow::Cow;
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationError};

use crate::error::{CatalogError, CatalogResult};

/// Listing page size.
pub const PAGE_SIZE: u64 = 10;

/// Highest page whose offset still fits a signed 64-bit `OFFSET`.
pub const MAX_PAGE: u64 = i64::MAX as u64 / PAGE_SIZE + 1;

/// Longest accepted product name, in characters.
pub const MAX_NAME_LENGTH: usize = 255;

/// Client-facing messages.
pub mod messages {
    pub const LISTED: &str = "Lista de productos";
    pub const CREATED: &str = "Producto creado con éxito";
    pub const CREATE_FAILED: &str = "No se pudo crear el producto";
    pub const INVENTORY_UPDATED: &str = "Inventario actualizado";
    pub const INVENTORY_NOT_FOUND: &str = "Inventario no encontrado";
    pub const NEGATIVE_STOCK: &str = "No se puede reducir la cantidad por debajo de 0";
    pub const STATUS_UPDATED: &str = "Estado del producto actualizado";
    pub const PRODUCT_NOT_FOUND: &str = "Producto no encontrado";

    pub const NAME_REQUIRED: &str = "Nombre es requerido";
    pub const NAME_TOO_LONG: &str = "El nombre no debe exceder los 255 caracteres";
    pub const NAME_TAKEN: &str = "El nombre ya existe";
    pub const PRICE_REQUIRED: &str = "El precio es requerido";
    pub const PRICE_NOT_NUMERIC: &str = "El precio debe ser un número";
    pub const PRICE_NEGATIVE: &str = "El precio no puede ser negativo";
    pub const IMAGE_REQUIRED: &str = "La imagen es requerida";
    pub const QUANTITY_REQUIRED: &str = "La cantidad es requerida";
    pub const QUANTITY_NOT_NUMERIC: &str = "La cantidad debe ser un número";
    pub const QUANTITY_NOT_INTEGER: &str = "La cantidad debe ser un número entero";
    pub const QUANTITY_NEGATIVE: &str = "La cantidad no puede ser negativa";
    pub const CATEGORY_MISSING: &str = "La categoría no existe";
}

/// Catalog product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Product {
    pub id: i64,
    #[serde(rename = "nombre")]
    #[schema(example = "Widget")]
    pub name: String,
    #[serde(rename = "precio")]
    #[schema(example = 9.99)]
    pub price: f64,
    pub image: String,
    pub category_id: Option<i64>,
    /// `false` once soft-deleted
    #[serde(rename = "activo")]
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Category {
    pub id: i64,
    #[serde(rename = "nombre")]
    pub name: String,
}

/// Stock counter of a single product
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct InventoryRecord {
    pub id: i64,
    pub product_id: i64,
    #[serde(rename = "cantidad")]
    pub quantity: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Product with its category and inventory record, as listed and created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ProductView {
    #[serde(flatten)]
    pub product: Product,
    #[serde(rename = "categoria")]
    pub category: Option<Category>,
    #[serde(rename = "inventario")]
    pub inventory: Option<InventoryRecord>,
}

/// One page of a listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub total: u64,
    pub current_page: u64,
    pub per_page: u64,
    pub last_page: u64,
}

impl<T> Page<T> {
    pub fn new(data: Vec<T>, total: u64, current_page: u64, per_page: u64) -> Self {
        Self {
            data,
            total,
            current_page,
            per_page,
            last_page: total.div_ceil(per_page.max(1)).max(1),
        }
    }
}

/// Query string of `GET /productos`.
///
/// Values arrive as text and are interpreted by [`ListQuery::into_filter`].
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListQuery {
    /// Only products of this category
    #[serde(default, deserialize_with = "empty_as_none")]
    #[param(value_type = Option<i64>)]
    pub category_id: Option<String>,
    /// Case-insensitive substring of the product name
    #[serde(default, deserialize_with = "empty_as_none")]
    pub name: Option<String>,
    /// 1-based page number; invalid or < 1 means 1, capped at `MAX_PAGE`
    #[serde(default)]
    #[param(value_type = Option<u64>)]
    pub page: Option<String>,
}

impl ListQuery {
    pub fn into_filter(self) -> CatalogResult<ProductFilter> {
        let category_id = match self.category_id {
            Some(raw) => Some(
                raw.trim()
                    .parse::<i64>()
                    .map_err(|_| CatalogError::InvalidFilter(format!("category_id inválido: {}", raw)))?,
            ),
            None => None,
        };

        let page = self
            .page
            .and_then(|raw| raw.trim().parse::<u64>().ok())
            .filter(|page| *page >= 1)
            .map(|page| page.min(MAX_PAGE))
            .unwrap_or(1);

        Ok(ProductFilter {
            category_id,
            name: self.name,
            page,
        })
    }
}

/// Filters for listing active products
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductFilter {
    pub category_id: Option<i64>,
    pub name: Option<String>,
    /// 1-based
    pub page: u64,
}

impl Default for ProductFilter {
    fn default() -> Self {
        Self {
            category_id: None,
            name: None,
            page: 1,
        }
    }
}

impl ProductFilter {
    /// Lower-cased name fragment, `None` when absent or blank.
    pub fn name_fragment(&self) -> Option<String> {
        self.name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_lowercase)
    }

    pub fn offset(&self) -> u64 {
        (self.page.clamp(1, MAX_PAGE) - 1) * PAGE_SIZE
    }
}

fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.trim().is_empty()))
}

/// Body of `POST /productos`.
///
/// Numeric fields accept JSON numbers or numeric strings, so their type
/// errors are reported per field instead of rejecting the whole body.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct CreateProduct {
    #[validate(
        required(message = "Nombre es requerido"),
        custom(function = "validate_name")
    )]
    #[schema(value_type = String, example = "Widget")]
    pub nombre: Option<String>,

    #[validate(
        required(message = "El precio es requerido"),
        custom(function = "validate_price")
    )]
    #[schema(value_type = f64, example = 9.99)]
    pub precio: Option<Value>,

    #[validate(
        required(message = "La imagen es requerida"),
        custom(function = "validate_image")
    )]
    #[schema(value_type = String, example = "https://cdn.example.com/widget.png")]
    pub image: Option<String>,

    #[validate(
        required(message = "La cantidad es requerida"),
        custom(function = "validate_quantity")
    )]
    #[schema(value_type = i64, example = 5)]
    pub cantidad: Option<Value>,

    #[serde(default)]
    pub category_id: Option<i64>,
}

/// A create request that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    pub name: String,
    pub price: f64,
    pub image: String,
    pub quantity: i64,
    pub category_id: Option<i64>,
}

impl TryFrom<CreateProduct> for NewProduct {
    type Error = FieldErrors;

    fn try_from(input: CreateProduct) -> Result<Self, Self::Error> {
        if let Err(errors) = input.validate() {
            return Err(FieldErrors::from(&errors));
        }

        let mut errors = FieldErrors::new();

        let name = input.nombre.map(|n| n.trim().to_string()).unwrap_or_default();
        let image = input.image.map(|i| i.trim().to_string()).unwrap_or_default();
        let price = input.precio.as_ref().map(parse_number);
        let quantity = input.cantidad.as_ref().map(parse_integer);

        let price = match price {
            Some(Ok(price)) => price,
            _ => {
                errors.add("precio", messages::PRICE_NOT_NUMERIC);
                0.0
            }
        };
        let quantity = match quantity {
            Some(Ok(quantity)) => quantity,
            _ => {
                errors.add("cantidad", messages::QUANTITY_NOT_NUMERIC);
                0
            }
        };
        errors.into_result()?;

        Ok(NewProduct {
            name,
            price,
            image,
            quantity,
            category_id: input.category_id,
        })
    }
}

/// Body of `PATCH /productos/{id}/inventario`: a signed quantity delta.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct AdjustInventory {
    #[validate(
        required(message = "La cantidad es requerida"),
        custom(function = "validate_delta")
    )]
    #[schema(value_type = i64, example = -3)]
    pub cantidad: Option<Value>,
}

impl AdjustInventory {
    pub fn new(delta: i64) -> Self {
        Self {
            cantidad: Some(Value::from(delta)),
        }
    }

    /// The validated delta.
    pub fn delta(&self) -> CatalogResult<i64> {
        match self.cantidad.as_ref().map(parse_integer) {
            Some(Ok(delta)) => Ok(delta),
            Some(Err(NumberError::Blank)) | None => Err(CatalogError::field(
                "cantidad",
                messages::QUANTITY_REQUIRED,
            )),
            Some(Err(NumberError::NotInteger)) => Err(CatalogError::field(
                "cantidad",
                messages::QUANTITY_NOT_INTEGER,
            )),
            Some(Err(NumberError::NotNumeric)) => Err(CatalogError::field(
                "cantidad",
                messages::QUANTITY_NOT_NUMERIC,
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NumberError {
    Blank,
    NotNumeric,
    NotInteger,
}

fn parse_number(value: &Value) -> Result<f64, NumberError> {
    match value {
        Value::Number(n) => n.as_f64().ok_or(NumberError::NotNumeric),
        Value::String(s) if s.trim().is_empty() => Err(NumberError::Blank),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|n| n.is_finite())
            .ok_or(NumberError::NotNumeric),
        _ => Err(NumberError::NotNumeric),
    }
}

fn parse_integer(value: &Value) -> Result<i64, NumberError> {
    if let Value::Number(n) = value {
        if let Some(i) = n.as_i64() {
            return Ok(i);
        }
    }
    if let Value::String(s) = value {
        if let Ok(i) = s.trim().parse::<i64>() {
            return Ok(i);
        }
    }

    let n = parse_number(value)?;
    // 2^63 is exactly representable; anything at or above it overflows i64
    if n.fract() != 0.0 || n < i64::MIN as f64 || n >= i64::MAX as f64 {
        return Err(NumberError::NotInteger);
    }
    Ok(n as i64)
}

fn field_error(code: &'static str, message: &'static str) -> ValidationError {
    ValidationError::new(code).with_message(Cow::Borrowed(message))
}

fn validate_name(name: &str) -> Result<(), ValidationError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(field_error("required", messages::NAME_REQUIRED));
    }
    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(field_error("max", messages::NAME_TOO_LONG));
    }
    Ok(())
}

fn validate_image(image: &str) -> Result<(), ValidationError> {
    if image.trim().is_empty() {
        return Err(field_error("required", messages::IMAGE_REQUIRED));
    }
    Ok(())
}

fn validate_price(value: &Value) -> Result<(), ValidationError> {
    match parse_number(value) {
        Ok(price) if price < 0.0 => Err(field_error("min", messages::PRICE_NEGATIVE)),
        Ok(_) => Ok(()),
        Err(NumberError::Blank) => Err(field_error("required", messages::PRICE_REQUIRED)),
        Err(_) => Err(field_error("numeric", messages::PRICE_NOT_NUMERIC)),
    }
}

fn validate_quantity(value: &Value) -> Result<(), ValidationError> {
    match parse_integer(value) {
        Ok(quantity) if quantity < 0 => Err(field_error("min", messages::QUANTITY_NEGATIVE)),
        Ok(_) => Ok(()),
        Err(NumberError::Blank) => Err(field_error("required", messages::QUANTITY_REQUIRED)),
        Err(NumberError::NotInteger) => {
            Err(field_error("integer", messages::QUANTITY_NOT_INTEGER))
        }
        Err(NumberError::NotNumeric) => {
            Err(field_error("numeric", messages::QUANTITY_NOT_NUMERIC))
        }
    }
}

fn validate_delta(value: &Value) -> Result<(), ValidationError> {
    match parse_integer(value) {
        Ok(_) => Ok(()),
        Err(NumberError::Blank) => Err(field_error("required", messages::QUANTITY_REQUIRED)),
        Err(NumberError::NotInteger) => {
            Err(field_error("integer", messages::QUANTITY_NOT_INTEGER))
        }
        Err(NumberError::NotNumeric) => {
            Err(field_error("numeric", messages::QUANTITY_NOT_NUMERIC))
        }
    }
}
