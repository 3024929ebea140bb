//! Locally persisted wall posts plus the set of posts this device wrote

use std::cmp::Reverse;
use std::collections::BTreeSet;
use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, warn};
use wallstore::{LocalStore, StoreExt};

use crate::domain::{IntentType, WallPost};

/// Storage key of the post collection, most recent first
pub const POSTS_KEY: &str = "whisperwall_posts";

/// Storage key of the ownership id set
pub const MY_IDS_KEY: &str = "whisperwall_my_ids";

/// Wall posts and ownership set over a [`LocalStore`]
///
/// Ownership is a convenience for the local UI, not an access control: the
/// storage is local and unauthenticated.
pub struct WallRepository {
    store: Arc<dyn LocalStore>,
    posts: Vec<WallPost>,
    /// Stored entries this build cannot decode; written back untouched
    undecoded: Vec<Value>,
    mine: BTreeSet<String>,
    /// False when the stored collection could not be read at all
    posts_writable: bool,
    mine_writable: bool,
}

impl WallRepository {
    /// Load both collections
    ///
    /// An unreadable document reads as empty and is never overwritten. Single
    /// posts that fail to decode are hidden but kept in storage.
    pub fn open(store: Arc<dyn LocalStore>) -> Self {
        let (posts, undecoded, posts_writable) = match store.try_load::<Vec<Value>>(POSTS_KEY) {
            Ok(entries) => {
                let (posts, undecoded) = split_entries(entries.unwrap_or_default());
                (posts, undecoded, true)
            }
            Err(e) => {
                warn!(error = %e, "WallRepository::open: wall posts unreadable, leaving them in place");
                (Vec::new(), Vec::new(), false)
            }
        };
        let (mine, mine_writable) = match store.try_load::<Vec<String>>(MY_IDS_KEY) {
            Ok(ids) => (ids.unwrap_or_default().into_iter().collect(), true),
            Err(e) => {
                warn!(error = %e, "WallRepository::open: ownership set unreadable, leaving it in place");
                (BTreeSet::new(), false)
            }
        };
        debug!(
            posts = posts.len(),
            undecoded = undecoded.len(),
            mine = mine.len(),
            "WallRepository::open: loaded"
        );
        Self {
            store,
            posts,
            undecoded,
            mine,
            posts_writable,
            mine_writable,
        }
    }

    /// Publish a post and record it as ours
    ///
    /// `original_content` is kept only for VENT posts; blank labels are dropped.
    pub fn create(
        &mut self,
        content: impl Into<String>,
        intent: IntentType,
        custom_label: Option<String>,
        original_content: Option<String>,
    ) -> WallPost {
        let post = WallPost {
            id: uuid::Uuid::now_v7().to_string(),
            content: content.into(),
            intent,
            timestamp: chrono::Utc::now().timestamp_millis(),
            custom_label: custom_label.filter(|l| !l.trim().is_empty()),
            original_content: original_content.filter(|_| intent == IntentType::Vent),
        };
        debug!(id = %post.id, %intent, "create: called");

        self.posts.insert(0, post.clone());
        self.mine.insert(post.id.clone());
        self.persist_posts();
        self.persist_mine();

        info!(id = %post.id, %intent, "Published wall post");
        post
    }

    /// Remove a post, ours or not; also forgets its ownership
    ///
    /// Returns whether a post with that id existed.
    pub fn delete(&mut self, id: &str) -> bool {
        debug!(%id, "delete: called");
        let before = self.posts.len();
        self.posts.retain(|p| p.id != id);
        let removed = self.posts.len() != before;
        let owned = self.mine.remove(id);

        if removed {
            self.persist_posts();
        }
        if owned {
            self.persist_mine();
        }
        info!(%id, %removed, "Deleted wall post");
        removed
    }

    /// Every post, most recent first
    pub fn list(&self) -> &[WallPost] {
        &self.posts
    }

    pub fn get(&self, id: &str) -> Option<&WallPost> {
        self.posts.iter().find(|p| p.id == id)
    }

    pub fn is_mine(&self, id: &str) -> bool {
        self.mine.contains(id)
    }

    /// Posts this device wrote, most recent first
    pub fn my_posts(&self) -> Vec<&WallPost> {
        self.posts.iter().filter(|p| self.is_mine(&p.id)).collect()
    }

    /// Ids in the ownership set
    pub fn my_ids(&self) -> impl Iterator<Item = &str> {
        self.mine.iter().map(String::as_str)
    }

    fn persist_posts(&self) {
        if !self.posts_writable {
            warn!("persist_posts: stored posts were unreadable, not overwriting them");
            return;
        }
        let mut entries = Vec::with_capacity(self.posts.len() + self.undecoded.len());
        for post in &self.posts {
            match serde_json::to_value(post) {
                Ok(value) => entries.push(value),
                Err(e) => {
                    warn!(id = %post.id, error = %e, "persist_posts: failed to encode post");
                    return;
                }
            }
        }
        entries.extend(self.undecoded.iter().cloned());
        // Stable, so decoded posts keep their order among equal timestamps
        entries.sort_by_key(|e| Reverse(e.get("timestamp").and_then(Value::as_i64).unwrap_or(i64::MIN)));

        if let Err(e) = self.store.save(POSTS_KEY, &entries) {
            warn!(error = %e, "persist_posts: failed to save wall posts");
        }
    }

    fn persist_mine(&self) {
        if !self.mine_writable {
            warn!("persist_mine: stored ownership set was unreadable, not overwriting it");
            return;
        }
        let ids: Vec<&String> = self.mine.iter().collect();
        if let Err(e) = self.store.save(MY_IDS_KEY, &ids) {
            warn!(error = %e, "persist_mine: failed to save ownership set");
        }
    }
}

/// Decode stored entries one by one, setting aside the ones that fail
fn split_entries(entries: Vec<Value>) -> (Vec<WallPost>, Vec<Value>) {
    let mut posts = Vec::with_capacity(entries.len());
    let mut undecoded = Vec::new();
    for entry in entries {
        match WallPost::deserialize(&entry) {
            Ok(post) => posts.push(post),
            Err(e) => {
                warn!(error = %e, "split_entries: keeping undecodable post as stored");
                undecoded.push(entry);
            }
        }
    }
    (posts, undecoded)
}
