use async_trait::async_trait;
use chrono::{Duration, Utc};
use s3_utils::{S3Error, S3Result};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use story_service::db::{OrphanedMediaRepository, StoryRepository, UserRepository};
use story_service::error::{AppError, Result};
use story_service::models::{
    FollowerEdge, FollowingEdge, NewStory, OrphanedMedia, SocialGraph, Story, UserProfile,
};
use story_service::storage::MediaStore;
use uuid::Uuid;

/// Stories in insertion order; each insert gets a strictly later timestamp
#[derive(Clone, Default)]
pub struct FakeStoryRepository {
    rows: Arc<Mutex<Vec<Story>>>,
    fail_inserts: Arc<AtomicBool>,
}

impl FakeStoryRepository {
    pub fn seed(&self, user_id: Uuid, url: &str) -> Story {
        let mut rows = self.rows.lock().unwrap();
        let story = Story {
            id: Uuid::new_v4(),
            user_id,
            url: url.to_string(),
            created_at: Utc::now() + Duration::milliseconds(rows.len() as i64),
        };
        rows.push(story.clone());
        story
    }

    pub fn all(&self) -> Vec<Story> {
        self.rows.lock().unwrap().clone()
    }

    pub fn fail_inserts(&self, fail: bool) {
        self.fail_inserts.store(fail, Ordering::SeqCst);
    }

    fn select(&self, keep: impl Fn(&Story) -> bool) -> Vec<Story> {
        self.rows
            .lock()
            .unwrap()
            .iter()
            .filter(|story| keep(story))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl StoryRepository for FakeStoryRepository {
    async fn insert(&self, story: NewStory) -> Result<Story> {
        if self.fail_inserts.load(Ordering::SeqCst) {
            return Err(AppError::DatabaseError("insert rejected".to_string()));
        }
        Ok(self.seed(story.user_id, &story.url))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Story>> {
        Ok(self.select(|story| story.id == id).into_iter().next())
    }

    async fn find_all(&self) -> Result<Vec<Story>> {
        Ok(self.all())
    }

    async fn find_by_owner(&self, user_id: Uuid) -> Result<Vec<Story>> {
        Ok(self.select(|story| story.user_id == user_id))
    }

    async fn find_by_owners(&self, user_ids: &[Uuid]) -> Result<Vec<Story>> {
        Ok(self.select(|story| user_ids.contains(&story.user_id)))
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|story| story.id != id);
        Ok(rows.len() != before)
    }
}

#[derive(Clone, Default)]
pub struct FakeUserRepository {
    users: Arc<Mutex<HashMap<Uuid, UserProfile>>>,
    /// (follower, following) pairs
    follows: Arc<Mutex<Vec<(Uuid, Uuid)>>>,
}

impl FakeUserRepository {
    pub fn add_user(&self, username: &str) -> Uuid {
        let id = Uuid::new_v4();
        self.users.lock().unwrap().insert(
            id,
            UserProfile {
                id,
                username: username.to_string(),
                created_at: Utc::now(),
            },
        );
        id
    }

    pub fn follow(&self, follower: Uuid, following: Uuid) {
        self.follows.lock().unwrap().push((follower, following));
    }
}

#[async_trait]
impl UserRepository for FakeUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<UserProfile>> {
        Ok(self.users.lock().unwrap().get(&id).cloned())
    }

    async fn find_social_graph(&self, id: Uuid) -> Result<Option<SocialGraph>> {
        let Some(user) = self.users.lock().unwrap().get(&id).cloned() else {
            return Ok(None);
        };
        let follows = self.follows.lock().unwrap();
        let now = Utc::now();

        let followers = follows
            .iter()
            .filter(|(_, following)| *following == id)
            .map(|(follower, _)| FollowerEdge {
                id: Uuid::new_v4(),
                follower_id: *follower,
                created_at: now,
            })
            .collect();
        let followings = follows
            .iter()
            .filter(|(follower, _)| *follower == id)
            .map(|(_, following)| FollowingEdge {
                id: Uuid::new_v4(),
                target_id: *following,
                created_at: now,
            })
            .collect();

        Ok(Some(SocialGraph {
            user,
            followers,
            followings,
        }))
    }
}

/// Object store keyed by object key; deletions can be made to fail for
/// every key or for selected keys
#[derive(Clone, Default)]
pub struct FakeMediaStore {
    objects: Arc<Mutex<HashMap<String, (String, Vec<u8>)>>>,
    fail_deletes: Arc<AtomicBool>,
    denied_keys: Arc<Mutex<HashSet<String>>>,
    delete_attempts: Arc<Mutex<Vec<String>>>,
}

impl FakeMediaStore {
    pub fn keys(&self) -> Vec<String> {
        self.objects.lock().unwrap().keys().cloned().collect()
    }

    pub fn content_type(&self, key: &str) -> Option<String> {
        self.objects
            .lock()
            .unwrap()
            .get(key)
            .map(|(content_type, _)| content_type.clone())
    }

    pub fn insert(&self, key: &str) {
        self.objects
            .lock()
            .unwrap()
            .insert(key.to_string(), ("image/jpeg".to_string(), vec![1]));
    }

    pub fn fail_deletes(&self, fail: bool) {
        self.fail_deletes.store(fail, Ordering::SeqCst);
    }

    /// Deleting `key` always fails, as with a permission error
    pub fn deny_delete(&self, key: &str) {
        self.denied_keys.lock().unwrap().insert(key.to_string());
    }

    pub fn delete_attempts(&self) -> Vec<String> {
        self.delete_attempts.lock().unwrap().clone()
    }
}

#[async_trait]
impl MediaStore for FakeMediaStore {
    async fn put_object(&self, key: &str, body: Vec<u8>, content_type: &str) -> S3Result<()> {
        self.objects
            .lock()
            .unwrap()
            .insert(key.to_string(), (content_type.to_string(), body));
        Ok(())
    }

    async fn delete_object(&self, key: &str) -> S3Result<()> {
        self.delete_attempts.lock().unwrap().push(key.to_string());
        if self.denied_keys.lock().unwrap().contains(key) {
            return Err(S3Error::Delete {
                key: key.to_string(),
                message: "AccessDenied".to_string(),
            });
        }
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(S3Error::Delete {
                key: key.to_string(),
                message: "simulated outage".to_string(),
            });
        }
        self.objects.lock().unwrap().remove(key);
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct FakeOrphanLedger {
    entries: Arc<Mutex<Vec<OrphanedMedia>>>,
}

impl FakeOrphanLedger {
    pub fn entries(&self) -> Vec<OrphanedMedia> {
        self.entries.lock().unwrap().clone()
    }
}

#[async_trait]
impl OrphanedMediaRepository for FakeOrphanLedger {
    async fn record(&self, object_key: &str, reason: &str) -> Result<()> {
        self.entries.lock().unwrap().push(OrphanedMedia {
            id: Uuid::new_v4(),
            object_key: object_key.to_string(),
            reason: reason.to_string(),
            attempts: 0,
            created_at: Utc::now(),
            last_attempt_at: None,
        });
        Ok(())
    }

    /// Same order as the SQL ledger: never attempted first, then least
    /// recently attempted, then oldest
    async fn list_pending(&self, limit: i64) -> Result<Vec<OrphanedMedia>> {
        let mut entries = self.entries();
        entries.sort_by_key(|entry| (entry.last_attempt_at, entry.created_at));
        entries.truncate(limit.max(1) as usize);
        Ok(entries)
    }

    async fn resolve(&self, id: Uuid) -> Result<()> {
        self.entries.lock().unwrap().retain(|entry| entry.id != id);
        Ok(())
    }

    async fn mark_failed(&self, id: Uuid, reason: &str) -> Result<()> {
        if let Some(entry) = self
            .entries
            .lock()
            .unwrap()
            .iter_mut()
            .find(|entry| entry.id == id)
        {
            entry.attempts += 1;
            entry.reason = reason.to_string();
            entry.last_attempt_at = Some(Utc::now());
        }
        Ok(())
    }
}
