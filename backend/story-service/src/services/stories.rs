use crate::config::{OwnershipDenial, SocialGraphUnion, StoriesConfig};
use crate::db::{OrphanedMediaRepository, StoryRepository, UserRepository};
use crate::error::{AppError, Result};
use crate::metrics::stories as metrics;
use crate::models::{MediaUpload, NewStory, StoriesByUser, Story, StoryDraft, UserProfile};
use crate::services::social_graph::{distinct_ids, repeat_by_multiplicity};
use crate::storage::MediaStore;
use s3_utils::S3Config;
use std::sync::Arc;
use uuid::Uuid;

/// Collaborators the stories service delegates to
#[derive(Clone)]
pub struct StoryStores {
    pub stories: Arc<dyn StoryRepository>,
    pub users: Arc<dyn UserRepository>,
    pub media: Arc<dyn MediaStore>,
    pub orphans: Arc<dyn OrphanedMediaRepository>,
}

pub struct StoriesService {
    stores: StoryStores,
    bucket: S3Config,
    settings: StoriesConfig,
}

fn account_missing() -> AppError {
    AppError::NotFound("Please create an account".to_string())
}

impl StoriesService {
    pub fn new(stores: StoryStores, bucket: S3Config, settings: StoriesConfig) -> Self {
        Self {
            stores,
            bucket,
            settings,
        }
    }

    pub fn settings(&self) -> &StoriesConfig {
        &self.settings
    }

    /// Resolve the caller's account
    pub async fn resolve_caller(&self, caller_id: Uuid) -> Result<UserProfile> {
        self.stores
            .users
            .find_by_id(caller_id)
            .await?
            .ok_or_else(account_missing)
    }

    /// User-attachment step: resolve the caller and make them the draft's owner
    /// unless one was already supplied.
    pub async fn attach_user(&self, caller_id: Uuid, draft: &mut StoryDraft) -> Result<()> {
        let user = self.resolve_caller(caller_id).await?;
        draft.attach_owner(user);
        Ok(())
    }

    /// Ownership-check step. Returns the story when the caller owns it.
    pub async fn check_owner(&self, caller_id: Uuid, story_id: Uuid) -> Result<Story> {
        let story = self
            .stores
            .stories
            .find_by_id(story_id)
            .await?
            .ok_or_else(|| AppError::NotFound("No story found with that ID".to_string()))?;

        if story.user_id == caller_id {
            return Ok(story);
        }

        tracing::debug!(%story_id, %caller_id, owner_id = %story.user_id, "ownership check denied");
        Err(match self.settings.ownership_denial {
            OwnershipDenial::NotFound => {
                AppError::NotFound("You are not owner of this story".to_string())
            }
            OwnershipDenial::Forbidden => {
                AppError::Forbidden("You are not owner of this story".to_string())
            }
        })
    }

    pub async fn list_all(&self) -> Result<Vec<Story>> {
        self.stores.stories.find_all().await
    }

    pub async fn list_mine(&self, caller_id: Uuid) -> Result<Vec<Story>> {
        self.stores.stories.find_by_owner(caller_id).await
    }

    pub async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<Story>> {
        self.stores.stories.find_by_owner(user_id).await
    }

    /// Stories of everyone one hop away: followers plus followings
    pub async fn list_by_social_graph(&self, caller_id: Uuid) -> Result<Vec<Story>> {
        let graph = self
            .stores
            .users
            .find_social_graph(caller_id)
            .await?
            .ok_or_else(account_missing)?;

        let counterparts = graph.counterpart_ids();
        let owners = distinct_ids(&counterparts);
        tracing::debug!(
            %caller_id,
            followers = graph.followers.len(),
            followings = graph.followings.len(),
            distinct_owners = owners.len(),
            "listing social graph stories"
        );

        let stories = self.stores.stories.find_by_owners(&owners).await?;

        Ok(match self.settings.social_graph_union {
            SocialGraphUnion::Distinct => stories,
            SocialGraphUnion::Concatenate => repeat_by_multiplicity(stories, &counterparts),
        })
    }

    /// Every story, grouped by owner
    pub async fn list_grouped(&self) -> Result<StoriesByUser> {
        let stories = self.stores.stories.find_all().await?;
        Ok(StoriesByUser::group(stories))
    }

    /// Upload the media and insert the story for the draft's owner
    pub async fn create_story(&self, draft: StoryDraft, upload: MediaUpload) -> Result<Story> {
        let owner = draft.owner.ok_or_else(account_missing)?;
        validate_upload(&upload, self.settings.max_upload_bytes)?;

        let key = media_key(owner.id, upload.file_name.as_deref());
        self.stores
            .media
            .put_object(&key, upload.bytes, &upload.content_type)
            .await?;
        let url = self.bucket.object_url(&key);

        let new_story = NewStory {
            user_id: owner.id,
            url,
        };

        match self.stores.stories.insert(new_story).await {
            Ok(story) => {
                metrics::record_story_created();
                tracing::info!(story_id = %story.id, user_id = %owner.id, %key, "story created");
                Ok(story)
            }
            Err(err) => {
                tracing::error!(
                    user_id = %owner.id,
                    %key,
                    error = %err,
                    "story insert failed after upload"
                );
                if let Err(cleanup_err) = self.stores.media.delete_object(&key).await {
                    tracing::warn!(%key, error = %cleanup_err, "failed to remove uploaded media");
                }
                Err(err)
            }
        }
    }

    /// Delete a story the caller owns: media first (best effort), then the record
    pub async fn delete_story(&self, caller_id: Uuid, story_id: Uuid) -> Result<()> {
        let story = self.check_owner(caller_id, story_id).await?;

        self.remove_media(&story).await;

        if !self.stores.stories.delete(story.id).await? {
            return Err(AppError::NotFound("No story found with that ID".to_string()));
        }

        metrics::record_story_deleted();
        tracing::info!(%story_id, user_id = %caller_id, "story deleted");
        Ok(())
    }

    /// Never fails. Outcomes are logged and counted; failed deletions are
    /// written to the orphaned-media ledger for the sweeper.
    async fn remove_media(&self, story: &Story) {
        let Some(key) = self.bucket.object_key_from_url(&story.url) else {
            metrics::record_media_deletion("skipped");
            tracing::warn!(
                story_id = %story.id,
                url = %story.url,
                bucket = %self.bucket.bucket,
                "story url is outside the media bucket; skipping object deletion"
            );
            return;
        };

        match self.stores.media.delete_object(key).await {
            Ok(()) => {
                metrics::record_media_deletion("deleted");
                tracing::info!(story_id = %story.id, %key, "story media deleted");
            }
            Err(err) => {
                metrics::record_media_deletion("failed");
                tracing::warn!(
                    story_id = %story.id,
                    %key,
                    error = %err,
                    "story media deletion failed"
                );

                if let Err(ledger_err) = self.stores.orphans.record(key, &err.to_string()).await {
                    tracing::error!(%key, error = %ledger_err, "failed to record orphaned media");
                }
            }
        }
    }
}

fn validate_upload(upload: &MediaUpload, max_bytes: usize) -> Result<()> {
    if upload.bytes.is_empty() {
        return Err(AppError::BadRequest("Uploaded media is empty".to_string()));
    }
    if upload.bytes.len() > max_bytes {
        return Err(AppError::PayloadTooLarge(format!(
            "Media exceeds the {} byte limit",
            max_bytes
        )));
    }

    let mime: mime::Mime = upload
        .content_type
        .parse()
        .map_err(|_| AppError::BadRequest("Invalid media content type".to_string()))?;
    if mime.type_() != mime::IMAGE && mime.type_() != mime::VIDEO {
        return Err(AppError::BadRequest(
            "Only image and video uploads are supported".to_string(),
        ));
    }
    Ok(())
}

/// `stories/<owner>/<uuid>[.<ext>]`
fn media_key(owner: Uuid, file_name: Option<&str>) -> String {
    let ext = file_name
        .and_then(|name| name.rsplit_once('.'))
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .filter(|ext| {
            !ext.is_empty() && ext.len() <= 8 && ext.chars().all(|c| c.is_ascii_alphanumeric())
        });

    match ext {
        Some(ext) => format!("stories/{}/{}.{}", owner, Uuid::new_v4(), ext),
        None => format!("stories/{}/{}", owner, Uuid::new_v4()),
    }
}
