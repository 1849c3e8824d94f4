//! Combining one-hop follow counterparts into a story query.

use crate::models::Story;
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

/// First occurrence of each id, in order
pub fn distinct_ids(ids: &[Uuid]) -> Vec<Uuid> {
    let mut seen = HashSet::with_capacity(ids.len());
    ids.iter().copied().filter(|id| seen.insert(*id)).collect()
}

/// Repeat every story as many times as its owner occurs in `ids`, keeping
/// store order. Stories whose owner is absent from `ids` are dropped.
pub fn repeat_by_multiplicity(stories: Vec<Story>, ids: &[Uuid]) -> Vec<Story> {
    let mut multiplicity: HashMap<Uuid, usize> = HashMap::new();
    for id in ids {
        *multiplicity.entry(*id).or_default() += 1;
    }

    let mut out = Vec::with_capacity(stories.len());
    for story in stories {
        let times = multiplicity.get(&story.user_id).copied().unwrap_or(0);
        for _ in 0..times {
            out.push(story.clone());
        }
    }
    out
}
