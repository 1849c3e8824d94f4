/// HTTP handlers for story-service
///
/// - Stories: list, group, create and delete story media posts
/// - Health: dependency probes and liveness
///
/// [`configure_api`] registers every route so the binary and the integration
/// tests serve the same surface.
pub mod health;
pub mod stories;

pub use health::{HealthProbe, HealthState};

use crate::metrics::serve_metrics;
use crate::middleware::JwtAuthMiddleware;
use crate::openapi::openapi_json;
use actix_web::web;

pub fn configure_api(auth: JwtAuthMiddleware) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg: &mut web::ServiceConfig| {
        cfg.route("/metrics", web::get().to(serve_metrics))
            .route("/api/v1/openapi.json", web::get().to(openapi_json))
            .route("/api/v1/health", web::get().to(health::health))
            .route("/api/v1/health/live", web::get().to(health::liveness))
            .service(
                web::scope("/api/v1/stories")
                    .wrap(auth)
                    .service(
                        web::resource("")
                            .route(web::get().to(stories::list_stories))
                            .route(web::post().to(stories::create_story)),
                    )
                    .route("/mine", web::get().to(stories::list_my_stories))
                    .route("/follows", web::get().to(stories::list_social_stories))
                    .route("/grouped", web::get().to(stories::list_grouped_stories))
                    .route("/user/{user_id}", web::get().to(stories::list_user_stories))
                    .route("/{story_id}", web::delete().to(stories::delete_story)),
            );
    }
}
