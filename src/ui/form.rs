use std::path::Path;

use anyhow::{Context, Result};
use postboard_common::{CreatePostRequest, ImagePayload};

use crate::feed::PostFeed;
use crate::images::sniff_content_type;

/// State of the "new post" form.
#[derive(Debug, Default)]
pub struct CreatePostForm {
    pub title: String,
    pub content: String,
    selected_image: Option<ImagePayload>,
    is_submitting: bool,
}

impl CreatePostForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected_image(&self) -> Option<&ImagePayload> {
        self.selected_image.as_ref()
    }

    pub fn is_submitting(&self) -> bool {
        self.is_submitting
    }

    /// Submitting is disabled while anything is in flight or while the
    /// trimmed title or content is empty.
    pub fn is_disabled(&self, loading: bool) -> bool {
        loading || self.is_submitting || self.title.trim().is_empty() || self.content.trim().is_empty()
    }

    /// Attach the image at `path`.
    pub async fn select_image(&mut self, path: &Path) -> Result<()> {
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read image: {}", path.display()))?;

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "image".to_string());

        let mut payload = ImagePayload::new(bytes, file_name);
        if let Some(mime) = sniff_content_type(&payload.bytes) {
            payload = payload.with_content_type(mime);
        }

        self.selected_image = Some(payload);
        Ok(())
    }

    pub fn remove_image(&mut self) {
        self.selected_image = None;
    }

    fn reset(&mut self) {
        self.title.clear();
        self.content.clear();
        self.selected_image = None;
    }

    /// Start a submission: the request to send, or `None` when the trimmed
    /// title or content is empty or a submission is already running.
    ///
    /// Until [`CreatePostForm::finish_submit`] is called the form reports
    /// [`is_submitting`](CreatePostForm::is_submitting) and stays disabled.
    pub fn begin_submit(&mut self) -> Option<CreatePostRequest> {
        let title = self.title.trim();
        let content = self.content.trim();
        if self.is_submitting || title.is_empty() || content.is_empty() {
            return None;
        }

        let mut request = CreatePostRequest::new(title, content);
        if let Some(ref image) = self.selected_image {
            request = request.with_image(image.clone());
        }

        self.is_submitting = true;
        Some(request)
    }

    /// End a submission. The fields are cleared only when the post was
    /// created; on failure they are kept.
    pub fn finish_submit(&mut self, created: bool) {
        if created {
            self.reset();
        }
        self.is_submitting = false;
    }

    /// Submit the form through `feed`.
    ///
    /// Returns `false` without contacting the feed when the form cannot be
    /// submitted. On failure the feed carries the error.
    pub async fn submit(&mut self, feed: &PostFeed) -> bool {
        let Some(request) = self.begin_submit() else {
            return false;
        };

        let created = feed.create_post(request).await.is_ok();
        self.finish_submit(created);
        created
    }
}
