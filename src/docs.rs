//! OpenAPI documentation artifact.
//!
//! Built once at startup from the registered routes; the served document
//! therefore always reflects the route set at the moment of generation.

use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "API Gateway",
        description = "HTTP and message-queue facing edge in front of the internal services"
    ),
    paths(crate::http::handlers::health, crate::http::handlers::docs),
    tags(
        (name = "health", description = "Liveness probes"),
        (name = "docs", description = "API documentation")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_exactly_the_registered_routes() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&str> = doc.paths.paths.keys().map(String::as_str).collect();
        assert_eq!(paths.len(), 2);
        assert!(paths.contains(&"/health"));
        assert!(paths.contains(&"/api/docs"));
    }
}
