/// Business logic layer for story-service
///
/// - Stories service: attachment, ownership checks, listings, creation, deletion
/// - Social graph helpers: combining follower/following counterparts
pub mod social_graph;
pub mod stories;

pub use stories::{StoriesService, StoryStores};
