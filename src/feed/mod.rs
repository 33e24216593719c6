//! Post synchronization layer.
//!
//! [`PostFeed`] owns the in-memory, newest-first sequence of the signed-in
//! user's posts and keeps it consistent with the document store. It is the
//! only component that mutates the sequence, and it does so only after the
//! remote call of the operation that initiated the change has completed.
//! Operations racing each other (a refresh against a delete, say) resolve as
//! last-writer-wins.

mod types;

pub use types::*;

use parking_lot::RwLock;
use postboard_common::validate::{validate_author, validate_create};
use postboard_common::{CreatePostRequest, Error, Identity, Post, PostId, Result, UserId};
use std::sync::Arc;
use tokio::sync::broadcast;

use crate::images::ImageStore;
use crate::messages::{Failure, Messages};
use crate::store::{NewPost, PostStore};

#[derive(Default)]
struct FeedState {
    user: Option<Identity>,
    posts: Vec<Post>,
    in_flight: usize,
    error: Option<String>,
}

pub struct PostFeed {
    store: Arc<dyn PostStore>,
    images: Arc<dyn ImageStore>,
    messages: Messages,
    state: RwLock<FeedState>,
    event_tx: broadcast::Sender<FeedEvent>,
}

impl PostFeed {
    pub fn new(store: Arc<dyn PostStore>, images: Arc<dyn ImageStore>) -> Self {
        let (event_tx, _) = broadcast::channel(64);

        Self {
            store,
            images,
            messages: Messages::default(),
            state: RwLock::new(FeedState::default()),
            event_tx,
        }
    }

    /// Use `messages` for user-visible error text.
    pub fn with_messages(mut self, messages: Messages) -> Self {
        self.messages = messages;
        self
    }

    pub fn subscribe(&self) -> broadcast::Receiver<FeedEvent> {
        self.event_tx.subscribe()
    }

    fn broadcast(&self, event: FeedEvent) {
        if self.event_tx.send(event).is_err() {
            tracing::debug!("No subscribers for feed event");
        }
    }

    // ------------------------------------------------------------------
    // Snapshots
    // ------------------------------------------------------------------

    /// Snapshot of the current sequence, newest first.
    pub fn posts(&self) -> Vec<Post> {
        self.state.read().posts.clone()
    }

    pub fn user(&self) -> Option<Identity> {
        self.state.read().user.clone()
    }

    /// Whether any operation is waiting on a remote call.
    pub fn is_loading(&self) -> bool {
        self.state.read().in_flight > 0
    }

    /// User-visible message of the last failed operation.
    pub fn error(&self) -> Option<String> {
        self.state.read().error.clone()
    }

    fn begin(&self) {
        let mut state = self.state.write();
        state.in_flight += 1;
        state.error = None;
    }

    fn finish(&self) {
        let mut state = self.state.write();
        state.in_flight = state.in_flight.saturating_sub(1);
    }

    fn fail(&self, failure: Failure) {
        let message = self.messages.failure(failure).to_string();
        self.state.write().error = Some(message.clone());
        self.broadcast(FeedEvent::OperationFailed { message });
    }

    // ------------------------------------------------------------------
    // Session
    // ------------------------------------------------------------------

    /// Switch the signed-in user.
    ///
    /// Signing out clears the sequence without contacting the store. A
    /// different user reloads it; the same user only updates the stored
    /// identity. Either way the identity's ID token authenticates the store
    /// requests that follow.
    pub async fn set_user(&self, user: Option<Identity>) {
        self.store
            .set_bearer_token(user.as_ref().and_then(|u| u.id_token.clone()));

        let changed_to = {
            let mut state = self.state.write();
            let previous = state.user.as_ref().map(|u| u.user_id.clone());
            let next = user.as_ref().map(|u| u.user_id.clone());
            state.user = user;

            match next {
                None => {
                    state.posts.clear();
                    None
                }
                Some(id) if previous.as_ref() != Some(&id) => Some(id),
                Some(_) => return,
            }
        };

        match changed_to {
            Some(user_id) => {
                tracing::info!(user = %user_id, "Signed-in user changed");
                self.refresh_for(&user_id).await;
            }
            None => {
                tracing::info!("Signed out; clearing posts");
                self.broadcast(FeedEvent::PostsReplaced { count: 0 });
            }
        }
    }

    /// Record `user` as signed in without loading their posts.
    ///
    /// For callers that only create posts. Switching to a different user
    /// still drops the previous user's sequence.
    pub fn adopt_user(&self, user: Identity) {
        self.store.set_bearer_token(user.id_token.clone());

        let mut state = self.state.write();
        if state.user.as_ref().map(|u| &u.user_id) != Some(&user.user_id) {
            state.posts.clear();
        }
        state.user = Some(user);
    }

    // ------------------------------------------------------------------
    // Operations
    // ------------------------------------------------------------------

    /// Reload the signed-in user's posts. No-op when nobody is signed in.
    pub async fn refresh(&self) {
        let user_id = self.state.read().user.as_ref().map(|u| u.user_id.clone());
        if let Some(user_id) = user_id {
            self.refresh_for(&user_id).await;
        }
    }

    /// Replace the sequence with the posts of `user_id`.
    ///
    /// Query failures are not reported: they read as an empty list.
    pub async fn refresh_for(&self, user_id: &UserId) {
        self.begin();
        let posts = self.store.list_by_author(user_id).await;
        let count = posts.len();
        {
            let mut state = self.state.write();
            state.posts = posts;
        }
        self.finish();

        tracing::debug!(user = %user_id, count, "Posts refreshed");
        self.broadcast(FeedEvent::PostsReplaced { count });
    }

    /// Create a post as the signed-in user.
    pub async fn create_post(&self, request: CreatePostRequest) -> Result<Post> {
        match self.user() {
            Some(identity) => self.create_post_as(&identity, request).await,
            None => {
                self.fail(Failure::NotAuthenticated);
                Err(Error::validation("user is not authenticated"))
            }
        }
    }

    /// Create a post authored by `identity` and prepend it to the sequence.
    ///
    /// The image, if any, is uploaded before the record is created; an upload
    /// failure aborts the whole operation. A record failure after a successful
    /// upload leaves the uploaded image in place.
    pub async fn create_post_as(&self, identity: &Identity, request: CreatePostRequest) -> Result<Post> {
        if let Err(e) = validate_author(identity) {
            self.fail(Failure::NotAuthenticated);
            return Err(e);
        }
        if identity.id_token.is_some() {
            self.store.set_bearer_token(identity.id_token.clone());
        }

        self.begin();
        let result = self.try_create(identity, request).await;
        self.finish();

        match result {
            Ok(post) => {
                self.state.write().posts.insert(0, post.clone());
                self.broadcast(FeedEvent::PostCreated { post: post.clone() });
                Ok(post)
            }
            Err(e) => {
                if e.is_validation() {
                    tracing::debug!("Create rejected: {}", e);
                } else {
                    tracing::error!("Failed to create post: {}", e);
                }
                self.fail(Failure::Create);
                Err(e)
            }
        }
    }

    async fn try_create(&self, identity: &Identity, request: CreatePostRequest) -> Result<Post> {
        let valid = validate_create(identity, request)?;

        let image = match valid.image {
            Some(ref payload) => Some(self.images.upload(payload).await?),
            None => None,
        };
        let uploaded = image.as_ref().map(|i| i.deletion_handle.clone());

        let new_post = NewPost {
            author_id: identity.user_id.clone(),
            author_email: valid.author_email,
            title: valid.title,
            content: valid.content,
            image,
        };

        self.store.create(new_post).await.map_err(|e| {
            if let Some(handle) = uploaded {
                tracing::warn!(public_id = %handle, "Post creation failed; uploaded image is orphaned");
            }
            e
        })
    }

    /// Delete a post and, best-effort, its image.
    ///
    /// The image is looked up in the in-memory sequence. Failing to delete it
    /// is logged and does not stop the record deletion. When the record
    /// deletion fails the sequence is left untouched.
    pub async fn delete_post(&self, post_id: &PostId) -> Result<()> {
        if post_id.is_empty() {
            self.fail(Failure::Delete);
            return Err(Error::validation("post id is empty"));
        }

        let image = {
            let state = self.state.read();
            state
                .posts
                .iter()
                .find(|p| &p.id == post_id)
                .and_then(|p| p.image.clone())
        };

        self.begin();

        if let Some(image) = image {
            if let Err(e) = self.images.delete(&image.deletion_handle).await {
                tracing::warn!(
                    public_id = %image.deletion_handle,
                    "Failed to delete image of post {}: {}",
                    post_id,
                    e
                );
            }
        }

        let result = self.store.delete_by_id(post_id).await;
        self.finish();

        match result {
            Ok(()) => {
                self.state.write().posts.retain(|p| &p.id != post_id);
                self.broadcast(FeedEvent::PostDeleted { id: post_id.clone() });
                Ok(())
            }
            Err(e) => {
                tracing::error!("Failed to delete post {}: {}", post_id, e);
                self.fail(Failure::Delete);
                Err(e)
            }
        }
    }
}
