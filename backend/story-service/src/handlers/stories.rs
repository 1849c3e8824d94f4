/// Story handlers - HTTP endpoints for story operations
use crate::error::{AppError, Result};
use crate::middleware::UserId;
use crate::models::{ApiResponse, MediaUpload, Story, StoryDraft};
use crate::services::StoriesService;
use actix_multipart::Multipart;
use actix_web::{web, HttpResponse};
use futures_util::stream::StreamExt;
use utoipa::ToSchema;
use uuid::Uuid;

/// Multipart field carrying the media file
pub const MEDIA_FIELD: &str = "url";

/// Multipart form accepted by the create route
#[derive(ToSchema)]
pub struct StoryUploadForm {
    /// Image or video file
    #[schema(value_type = String, format = Binary)]
    pub url: Vec<u8>,
}

/// List every story
#[utoipa::path(
    get,
    path = "/api/v1/stories",
    tag = "stories",
    responses(
        (status = 200, description = "All stories in store order", body = [Story]),
        (status = 401, description = "Missing or invalid token"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_stories(service: web::Data<StoriesService>) -> Result<HttpResponse> {
    let stories = service.list_all().await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(stories)))
}

/// List the caller's own stories
#[utoipa::path(
    get,
    path = "/api/v1/stories/mine",
    tag = "stories",
    responses(
        (status = 200, description = "Caller's stories", body = [Story]),
        (status = 401, description = "Missing or invalid token"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_my_stories(
    service: web::Data<StoriesService>,
    user: UserId,
) -> Result<HttpResponse> {
    let stories = service.list_mine(user.0).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(stories)))
}

/// List stories of a given user
#[utoipa::path(
    get,
    path = "/api/v1/stories/user/{user_id}",
    tag = "stories",
    params(("user_id" = Uuid, Path, description = "Owner id")),
    responses(
        (status = 200, description = "Stories owned by the user", body = [Story]),
        (status = 401, description = "Missing or invalid token"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_user_stories(
    service: web::Data<StoriesService>,
    user_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let stories = service.list_by_user(*user_id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(stories)))
}

/// List stories of the caller's followers and followings
#[utoipa::path(
    get,
    path = "/api/v1/stories/follows",
    tag = "stories",
    responses(
        (status = 200, description = "Stories from the caller's social graph", body = [Story]),
        (status = 401, description = "Missing or invalid token"),
        (status = 404, description = "Caller has no account"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_social_stories(
    service: web::Data<StoriesService>,
    user: UserId,
) -> Result<HttpResponse> {
    let stories = service.list_by_social_graph(user.0).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(stories)))
}

/// All stories grouped by owner
#[utoipa::path(
    get,
    path = "/api/v1/stories/grouped",
    tag = "stories",
    responses(
        (status = 200, description = "Object keyed by user id, each value a list of stories"),
        (status = 401, description = "Missing or invalid token"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_grouped_stories(service: web::Data<StoriesService>) -> Result<HttpResponse> {
    let grouped = service.list_grouped().await?;
    tracing::debug!(
        users = grouped.owner_count(),
        stories = grouped.story_count(),
        "grouped stories by owner"
    );
    Ok(HttpResponse::Ok().json(ApiResponse::success(grouped)))
}

/// Create a story from an uploaded media file
#[utoipa::path(
    post,
    path = "/api/v1/stories",
    tag = "stories",
    request_body(content = StoryUploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Story created", body = Story),
        (status = 400, description = "Missing, empty or unsupported media"),
        (status = 401, description = "Missing or invalid token"),
        (status = 404, description = "Caller has no account"),
        (status = 413, description = "Media exceeds the upload limit"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_story(
    service: web::Data<StoriesService>,
    user: UserId,
    payload: Multipart,
) -> Result<HttpResponse> {
    let mut draft = StoryDraft::default();
    service.attach_user(user.0, &mut draft).await?;

    let upload = read_media(payload, service.settings().max_upload_bytes).await?;
    let story = service.create_story(draft, upload).await?;

    Ok(HttpResponse::Created().json(ApiResponse::success(story)))
}

/// Delete one of the caller's stories
#[utoipa::path(
    delete,
    path = "/api/v1/stories/{story_id}",
    tag = "stories",
    params(("story_id" = Uuid, Path, description = "Story id")),
    responses(
        (status = 204, description = "Story deleted"),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Caller does not own the story (forbidden policy)"),
        (status = 404, description = "Story missing or not owned by the caller"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_story(
    service: web::Data<StoriesService>,
    user: UserId,
    story_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    service.delete_story(user.0, *story_id).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Pull the media field out of the form. Other fields are drained and
/// ignored; the size limit is enforced while streaming.
async fn read_media(mut payload: Multipart, max_bytes: usize) -> Result<MediaUpload> {
    let mut upload: Option<MediaUpload> = None;

    while let Some(item) = payload.next().await {
        let mut field = item?;

        if field.name() != Some(MEDIA_FIELD) || upload.is_some() {
            while let Some(chunk) = field.next().await {
                chunk?;
            }
            continue;
        }

        let file_name = field
            .content_disposition()
            .and_then(|cd| cd.get_filename())
            .map(str::to_string);
        let content_type = field
            .content_type()
            .map(|mime| mime.essence_str().to_string())
            .unwrap_or_else(|| mime::APPLICATION_OCTET_STREAM.essence_str().to_string());

        let mut bytes = Vec::new();
        while let Some(chunk) = field.next().await {
            let chunk = chunk?;
            if bytes.len() + chunk.len() > max_bytes {
                return Err(AppError::PayloadTooLarge(format!(
                    "Media exceeds the {} byte limit",
                    max_bytes
                )));
            }
            bytes.extend_from_slice(&chunk);
        }

        upload = Some(MediaUpload {
            file_name,
            content_type,
            bytes,
        });
    }

    upload.ok_or_else(|| AppError::BadRequest("Please upload a media file".to_string()))
}
