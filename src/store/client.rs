use crate::config::StoreConfig;
use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use postboard_common::{Error, ImageRef, Post, PostId, Result, UserId};
use rand::distributions::Alphanumeric;
use rand::Rng;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use std::time::Duration;

use super::firestore::{
    post_fields, post_from_document, CommitRequest, Document, ErrorResponse, FieldTransform,
    Precondition, RunQueryRequest, RunQueryResponse, StructuredQuery, Value, Write,
    FIELD_AUTHOR_ID, FIELD_CREATED_AT,
};

/// Length of generated document IDs, matching Firestore auto-IDs.
const DOCUMENT_ID_LEN: usize = 20;

/// Fields of a post about to be created.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub author_id: UserId,
    pub author_email: String,
    pub title: String,
    pub content: String,
    pub image: Option<ImageRef>,
}

/// Operations offered by the document store for post records.
#[async_trait]
pub trait PostStore: Send + Sync {
    /// Insert a post. The store assigns the ID and the authoritative creation
    /// time; the returned `created_at` is the local clock at return.
    async fn create(&self, post: NewPost) -> Result<Post>;

    /// Posts of `author_id`, newest first.
    async fn try_list_by_author(&self, author_id: &UserId) -> Result<Vec<Post>>;

    /// Remove a post record.
    async fn delete_by_id(&self, post_id: &PostId) -> Result<()>;

    /// Credential sent with subsequent requests, replacing any previous one.
    /// Stores that do not authenticate ignore it.
    fn set_bearer_token(&self, _token: Option<String>) {}

    /// Posts of `author_id`, newest first, or an empty list when the query
    /// fails.
    ///
    /// The failure is logged and not reported: callers cannot tell "no posts"
    /// from "query failed". Use [`PostStore::try_list_by_author`] when the
    /// difference matters.
    async fn list_by_author(&self, author_id: &UserId) -> Vec<Post> {
        match self.try_list_by_author(author_id).await {
            Ok(posts) => posts,
            Err(e) => {
                tracing::warn!("Failed to list posts for '{}': {}", author_id, e);
                Vec::new()
            }
        }
    }
}

/// [`PostStore`] backed by the Firestore REST v1 API.
pub struct FirestorePostStore {
    client: Client,
    base_url: String,
    project_id: String,
    database: String,
    collection: String,
    api_key: Option<String>,
    bearer_token: RwLock<Option<String>>,
}

impl FirestorePostStore {
    pub fn new(config: &StoreConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!("Failed to build HTTP client with timeout: {}", e);
                Client::new()
            });

        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            project_id: config.project_id.clone(),
            database: config.database.clone(),
            collection: config.collection.clone(),
            api_key: config.api_key.clone().filter(|k| !k.is_empty()),
            bearer_token: RwLock::new(None),
        }
    }

    /// Send the signed-in user's ID token with every request.
    pub fn with_bearer_token(mut self, token: Option<String>) -> Self {
        *self.bearer_token.get_mut() = token;
        self
    }

    /// `projects/{p}/databases/{d}/documents`
    fn documents_path(&self) -> String {
        format!(
            "projects/{}/databases/{}/documents",
            self.project_id, self.database
        )
    }

    fn document_name(&self, id: &str) -> String {
        format!("{}/{}/{}", self.documents_path(), self.collection, id)
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        let request = match self.api_key {
            Some(ref key) => request.query(&[("key", key.as_str())]),
            None => request,
        };
        match *self.bearer_token.read() {
            Some(ref token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response> {
        self.authorize(request)
            .send()
            .await
            .map_err(|e| Error::network(e.to_string()))
    }

    fn generate_id() -> String {
        rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(DOCUMENT_ID_LEN)
            .map(char::from)
            .collect()
    }
}

/// Turn a non-success response into a store error, keeping the API's message.
async fn error_from_response(response: Response) -> Error {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorResponse>(&body)
        .map(|e| format!("{} {}", e.error.status, e.error.message))
        .unwrap_or(body);

    if status == StatusCode::NOT_FOUND {
        Error::not_found(message)
    } else {
        Error::store(format!("{status}: {message}"))
    }
}

#[async_trait]
impl PostStore for FirestorePostStore {
    fn set_bearer_token(&self, token: Option<String>) {
        *self.bearer_token.write() = token;
    }

    async fn create(&self, post: NewPost) -> Result<Post> {
        let id = Self::generate_id();
        let fields = post_fields(
            &post.author_id,
            &post.author_email,
            &post.title,
            &post.content,
            post.image.as_ref(),
        );

        let body = CommitRequest {
            writes: vec![Write {
                update: Document {
                    name: self.document_name(&id),
                    fields,
                    create_time: None,
                },
                update_transforms: vec![FieldTransform::request_time(FIELD_CREATED_AT)],
                current_document: Some(Precondition { exists: false }),
            }],
        };

        let url = self.url(&format!("{}:commit", self.documents_path()));
        tracing::debug!(url = %url, id = %id, "Committing new post");

        let response = self.send(self.client.post(&url).json(&body)).await?;
        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        tracing::info!(id = %id, author = %post.author_id, "Post created");

        Ok(Post {
            id: PostId::new(id),
            title: post.title,
            content: post.content,
            image: post.image,
            author_id: post.author_id,
            author_email: Some(post.author_email),
            created_at: Utc::now(),
        })
    }

    async fn try_list_by_author(&self, author_id: &UserId) -> Result<Vec<Post>> {
        let body = RunQueryRequest {
            structured_query: StructuredQuery::equal_desc(
                &self.collection,
                FIELD_AUTHOR_ID,
                Value::string(author_id.as_str()),
                FIELD_CREATED_AT,
            ),
        };

        let url = self.url(&format!("{}:runQuery", self.documents_path()));
        tracing::debug!(url = %url, author = %author_id, "Querying posts");

        let response = self.send(self.client.post(&url).json(&body)).await?;
        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        let results: Vec<RunQueryResponse> = response
            .json()
            .await
            .map_err(|e| Error::store(format!("unreadable query response: {e}")))?;

        let now = Utc::now();
        let posts = results
            .iter()
            .filter_map(|r| r.document.as_ref())
            .filter_map(|doc| {
                let post = post_from_document(doc, now);
                if post.is_none() {
                    tracing::warn!(name = %doc.name, "Skipping malformed post document");
                }
                post
            })
            .collect::<Vec<_>>();

        tracing::debug!(count = posts.len(), author = %author_id, "Posts loaded");
        Ok(posts)
    }

    async fn delete_by_id(&self, post_id: &PostId) -> Result<()> {
        let url = self.url(&self.document_name(post_id.as_str()));
        tracing::debug!(url = %url, "Deleting post");

        let request = self
            .client
            .delete(&url)
            .query(&[("currentDocument.exists", "true")]);
        let response = self.send(request).await?;
        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        tracing::info!(id = %post_id, "Post deleted");
        Ok(())
    }
}
