/// OpenAPI documentation for Nova Story Service
use actix_web::HttpResponse;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::OpenApi;

use crate::handlers::{health, stories};
use crate::models::Story;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Nova Story Service API",
        version = "1.0.0",
        description = "Stories backed by media objects in S3. Lists stories globally, per user, per social graph and grouped by owner; creates stories from uploaded images or videos; deletes stories together with their media.",
        contact(
            name = "Nova Team",
            email = "support@nova.app"
        ),
        license(
            name = "MIT"
        )
    ),
    servers(
        (url = "http://localhost:8083", description = "Development server"),
    ),
    paths(
        health::health,
        health::liveness,
        stories::list_stories,
        stories::list_my_stories,
        stories::list_user_stories,
        stories::list_social_stories,
        stories::list_grouped_stories,
        stories::create_story,
        stories::delete_story,
    ),
    components(schemas(Story, stories::StoryUploadForm)),
    tags(
        (name = "health", description = "Service health checks"),
        (name = "stories", description = "Story listing, creation and deletion"),
    ),
    modifiers(&SecurityAddon),
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("HS256 JWT whose subject is the user id"))
                        .build(),
                ),
            )
        }
    }
}

pub async fn openapi_json() -> actix_web::Result<HttpResponse> {
    let body = ApiDoc::openapi().to_json().map_err(|e| {
        tracing::error!("OpenAPI serialization failed: {}", e);
        actix_web::error::ErrorInternalServerError("OpenAPI serialization error")
    })?;

    Ok(HttpResponse::Ok()
        .content_type("application/json")
        .body(body))
}
