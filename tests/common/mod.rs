//! Shared test doubles for integration tests.
//!
//! Provides [`MemoryPostStore`] and [`MemoryImageStore`], in-memory stand-ins
//! for the two remote services with call counters and switchable failures,
//! plus [`TestHarness`] wiring them into a [`PostFeed`].

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use parking_lot::Mutex;

use postboard::feed::PostFeed;
use postboard::images::ImageStore;
use postboard::store::{NewPost, PostStore};
use postboard_common::{
    DeletionHandle, Error, Identity, ImagePayload, ImageRef, Post, PostId, Result, UserId,
};

// ---------------------------------------------------------------------------
// Post store
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct MemoryPostStore {
    posts: Mutex<Vec<Post>>,
    next_id: AtomicUsize,
    bearer_token: Mutex<Option<String>>,
    pub create_calls: AtomicUsize,
    pub list_calls: AtomicUsize,
    pub delete_calls: AtomicUsize,
    pub fail_create: AtomicBool,
    pub fail_list: AtomicBool,
    pub fail_delete: AtomicBool,
}

impl MemoryPostStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Total number of calls of any kind.
    pub fn calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
            + self.list_calls.load(Ordering::SeqCst)
            + self.delete_calls.load(Ordering::SeqCst)
    }

    /// Token the feed last handed to the store.
    pub fn bearer_token(&self) -> Option<String> {
        self.bearer_token.lock().clone()
    }

    /// Every stored post, in insertion order.
    pub fn stored(&self) -> Vec<Post> {
        self.posts.lock().clone()
    }

    /// Server clock: one second per created post, so creation times are
    /// strictly increasing.
    fn server_time(n: usize) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::seconds(n as i64)
    }
}

#[async_trait]
impl PostStore for MemoryPostStore {
    fn set_bearer_token(&self, token: Option<String>) {
        *self.bearer_token.lock() = token;
    }

    async fn create(&self, post: NewPost) -> Result<Post> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_create.load(Ordering::SeqCst) {
            return Err(Error::store("create rejected"));
        }

        let n = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let stored = Post {
            id: PostId::new(format!("post-{n}")),
            title: post.title,
            content: post.content,
            image: post.image,
            author_id: post.author_id,
            author_email: Some(post.author_email),
            created_at: Self::server_time(n),
        };
        self.posts.lock().push(stored.clone());
        Ok(stored)
    }

    async fn try_list_by_author(&self, author_id: &UserId) -> Result<Vec<Post>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_list.load(Ordering::SeqCst) {
            return Err(Error::store("query failed"));
        }

        let mut posts: Vec<Post> = self
            .posts
            .lock()
            .iter()
            .filter(|p| &p.author_id == author_id)
            .cloned()
            .collect();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(posts)
    }

    async fn delete_by_id(&self, post_id: &PostId) -> Result<()> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(Error::store("delete rejected"));
        }

        let mut posts = self.posts.lock();
        let before = posts.len();
        posts.retain(|p| &p.id != post_id);
        if posts.len() == before {
            return Err(Error::not_found(post_id.to_string()));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Image store
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct MemoryImageStore {
    images: Mutex<HashMap<String, String>>,
    next_id: AtomicUsize,
    pub upload_calls: AtomicUsize,
    pub delete_calls: AtomicUsize,
    pub fail_upload: AtomicBool,
    pub fail_delete: AtomicBool,
}

impl MemoryImageStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn calls(&self) -> usize {
        self.upload_calls.load(Ordering::SeqCst) + self.delete_calls.load(Ordering::SeqCst)
    }

    pub fn contains(&self, handle: &DeletionHandle) -> bool {
        self.images.lock().contains_key(handle.as_str())
    }

    pub fn len(&self) -> usize {
        self.images.lock().len()
    }
}

#[async_trait]
impl ImageStore for MemoryImageStore {
    async fn upload(&self, payload: &ImagePayload) -> Result<ImageRef> {
        self.upload_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_upload.load(Ordering::SeqCst) {
            return Err(Error::upload("500 Internal Server Error"));
        }

        let n = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let handle = format!("posts/img-{n}");
        let url = format!("https://cdn.test/{}/{}", handle, payload.file_name);
        self.images.lock().insert(handle.clone(), url.clone());
        Ok(ImageRef::new(url, DeletionHandle::new(handle)))
    }

    async fn delete(&self, handle: &DeletionHandle) -> Result<()> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(Error::deletion("503 Service Unavailable"));
        }

        match self.images.lock().remove(handle.as_str()) {
            Some(_) => Ok(()),
            None => Err(Error::deletion(format!("unknown handle {handle}"))),
        }
    }
}

// ---------------------------------------------------------------------------
// Harness
// ---------------------------------------------------------------------------

pub struct TestHarness {
    pub store: Arc<MemoryPostStore>,
    pub images: Arc<MemoryImageStore>,
    pub feed: PostFeed,
}

impl TestHarness {
    pub fn new() -> Self {
        let store = MemoryPostStore::new();
        let images = MemoryImageStore::new();
        let feed = PostFeed::new(store.clone(), images.clone());
        Self {
            store,
            images,
            feed,
        }
    }

    /// Harness with `user` already signed in.
    pub async fn signed_in(user: &Identity) -> Self {
        let harness = Self::new();
        harness.feed.set_user(Some(user.clone())).await;
        harness
    }

    /// Network calls made to either service so far.
    pub fn network_calls(&self) -> usize {
        self.store.calls() + self.images.calls()
    }
}

pub fn alice() -> Identity {
    Identity::new("user-a", Some("alice@example.com".into()))
}

pub fn bob() -> Identity {
    Identity::new("user-b", Some("bob@example.com".into()))
}

/// Smallest byte string recognised as a PNG.
pub fn png_payload(name: &str) -> ImagePayload {
    ImagePayload::new(
        vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0],
        name,
    )
    .with_content_type("image/png")
}
