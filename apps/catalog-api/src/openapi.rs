use utoipa::OpenApi;

/// Root document; each domain contributes its own paths under a prefix.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Catalog API",
        description = "Product catalog and inventory"
    ),
    servers((url = "/api")),
    nest(
        (path = "/productos", api = domain_catalog::ApiDoc)
    )
)]
pub struct ApiDoc;
