/// Data models for story-service
///
/// - Story: a user-authored media post pointing at an object in the media bucket
/// - UserProfile / SocialGraph: the caller and their one-hop follow edges
/// - OrphanedMedia: an object whose deletion failed after its story was removed
/// - ApiResponse: the `{ status, data: { data } }` envelope used by every route
use chrono::{DateTime, Utc};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::HashMap;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Story {
    pub id: Uuid,
    /// Owning user
    pub user_id: Uuid,
    /// Public URL of the media object
    pub url: String,
    pub created_at: DateTime<Utc>,
}

/// Story record about to be inserted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewStory {
    pub user_id: Uuid,
    pub url: String,
}

/// Pending story write. The owner is filled in by the user-attachment step
/// unless the caller already supplied one.
#[derive(Debug, Clone, Default)]
pub struct StoryDraft {
    pub owner: Option<UserProfile>,
}

impl StoryDraft {
    pub fn attach_owner(&mut self, user: UserProfile) {
        if self.owner.is_none() {
            self.owner = Some(user);
        }
    }
}

/// Media file received with a create request
#[derive(Debug, Clone)]
pub struct MediaUpload {
    pub file_name: Option<String>,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: Uuid,
    pub username: String,
    pub created_at: DateTime<Utc>,
}

/// Someone following the user. The counterpart is the follower.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FollowerEdge {
    pub id: Uuid,
    pub follower_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Someone the user follows. The counterpart is the followed target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FollowingEdge {
    pub id: Uuid,
    pub target_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// A user with both edge sets populated
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialGraph {
    pub user: UserProfile,
    pub followers: Vec<FollowerEdge>,
    pub followings: Vec<FollowingEdge>,
}

impl SocialGraph {
    /// Counterpart ids, followers first then followings. One hop only, and
    /// duplicates are kept; callers decide how to combine them.
    pub fn counterpart_ids(&self) -> Vec<Uuid> {
        self.followers
            .iter()
            .map(|edge| edge.follower_id)
            .chain(self.followings.iter().map(|edge| edge.target_id))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrphanedMedia {
    pub id: Uuid,
    pub object_key: String,
    pub reason: String,
    pub attempts: i32,
    pub created_at: DateTime<Utc>,
    pub last_attempt_at: Option<DateTime<Utc>>,
}

/// Stories grouped by owner.
///
/// Groups keep the order in which their owner first appeared and each group
/// keeps the order stories were read in. Serializes as a JSON object keyed by
/// user id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoriesByUser {
    groups: Vec<(Uuid, Vec<Story>)>,
}

impl StoriesByUser {
    pub fn group(stories: impl IntoIterator<Item = Story>) -> Self {
        let mut groups: Vec<(Uuid, Vec<Story>)> = Vec::new();
        let mut index: HashMap<Uuid, usize> = HashMap::new();

        for story in stories {
            match index.get(&story.user_id) {
                Some(&slot) => groups[slot].1.push(story),
                None => {
                    index.insert(story.user_id, groups.len());
                    groups.push((story.user_id, vec![story]));
                }
            }
        }

        Self { groups }
    }

    pub fn owner_count(&self) -> usize {
        self.groups.len()
    }

    pub fn story_count(&self) -> usize {
        self.groups.iter().map(|(_, stories)| stories.len()).sum()
    }
}

impl Serialize for StoriesByUser {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.groups.len()))?;
        for (owner, stories) in &self.groups {
            map.serialize_entry(owner, stories)?;
        }
        map.end()
    }
}

/// Inner `data` object of the response envelope
#[derive(Debug, Serialize)]
pub struct DataEnvelope<T> {
    pub data: T,
}

/// `{ "status": "success", "data": { "data": ... } }`
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub status: &'static str,
    pub data: DataEnvelope<T>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            status: "success",
            data: DataEnvelope { data },
        }
    }
}
