//! Input checks applied before any network call.

use crate::error::{Error, Result};
use crate::types::{CreatePostRequest, Identity, ImagePayload};

/// A create request that passed validation, with trimmed text and the
/// author's email resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidCreate {
    pub title: String,
    pub content: String,
    pub author_email: String,
    pub image: Option<ImagePayload>,
}

/// Check that `identity` may author posts and return its trimmed email.
///
/// The identity must carry a non-empty user ID and email.
pub fn validate_author(identity: &Identity) -> Result<String> {
    if identity.user_id.is_empty() {
        return Err(Error::validation("user is not authenticated"));
    }

    match identity.email.as_deref().map(str::trim) {
        Some(email) if !email.is_empty() => Ok(email.to_string()),
        _ => Err(Error::validation("user has no email address")),
    }
}

/// Validate the author and the request for a post creation.
///
/// Title and content are trimmed; both must be non-empty afterwards.
pub fn validate_create(identity: &Identity, request: CreatePostRequest) -> Result<ValidCreate> {
    let author_email = validate_author(identity)?;

    let title = request.title.trim();
    if title.is_empty() {
        return Err(Error::validation("title is empty"));
    }

    let content = request.content.trim();
    if content.is_empty() {
        return Err(Error::validation("content is empty"));
    }

    if let Some(ref image) = request.image {
        if image.is_empty() {
            return Err(Error::validation("image payload is empty"));
        }
    }

    Ok(ValidCreate {
        title: title.to_string(),
        content: content.to_string(),
        author_email,
        image: request.image,
    })
}
