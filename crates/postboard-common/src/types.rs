//! Core type definitions for posts, attached images, and the signed-in user.

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::ids::{PostId, UserId};

/// Opaque handle returned by the image host, required to delete that image.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeletionHandle(String);

impl DeletionHandle {
    pub fn new(handle: impl Into<String>) -> Self {
        Self(handle.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeletionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Reference to an image stored by the image host.
///
/// Both fields are always present: an image that cannot be deleted later is
/// never attached to a post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRef {
    /// Public URL the image is served from.
    pub url: String,
    /// Handle used to delete the image.
    pub deletion_handle: DeletionHandle,
}

impl ImageRef {
    pub fn new(url: impl Into<String>, deletion_handle: DeletionHandle) -> Self {
        Self {
            url: url.into(),
            deletion_handle,
        }
    }
}

/// A persisted, user-authored post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    /// Store-assigned identifier.
    pub id: PostId,
    pub title: String,
    pub content: String,
    /// Attached image, if one was uploaded at creation time.
    pub image: Option<ImageRef>,
    /// Owner of the post. Never changes after creation.
    pub author_id: UserId,
    /// Contact address copied from the identity at creation time.
    pub author_email: Option<String>,
    /// Creation time. Server-assigned; approximated locally right after
    /// creation.
    pub created_at: DateTime<Utc>,
}

impl Post {
    pub fn has_image(&self) -> bool {
        self.image.is_some()
    }
}

/// Raw image attached to a create request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePayload {
    pub bytes: Bytes,
    /// Original file name, forwarded to the image host.
    pub file_name: String,
    /// MIME type, if the caller knows it.
    pub content_type: Option<String>,
}

impl ImagePayload {
    pub fn new(bytes: impl Into<Bytes>, file_name: impl Into<String>) -> Self {
        Self {
            bytes: bytes.into(),
            file_name: file_name.into(),
            content_type: None,
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Input for creating a post. Consumed to produce a [`Post`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatePostRequest {
    pub title: String,
    pub content: String,
    pub image: Option<ImagePayload>,
}

impl CreatePostRequest {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            image: None,
        }
    }

    pub fn with_image(mut self, image: ImagePayload) -> Self {
        self.image = Some(image);
        self
    }
}

/// The signed-in user, as handed over by the identity platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: UserId,
    pub email: Option<String>,
    /// Bearer token accepted by the document store, when it enforces auth.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_token: Option<String>,
}

impl Identity {
    pub fn new(user_id: impl Into<UserId>, email: Option<String>) -> Self {
        Self {
            user_id: user_id.into(),
            email,
            id_token: None,
        }
    }

    pub fn with_id_token(mut self, token: impl Into<String>) -> Self {
        self.id_token = Some(token.into());
        self
    }
}
