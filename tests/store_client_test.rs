//! Tests for the document store client against a mock REST endpoint.

use assert_matches::assert_matches;
use postboard::config::{Config, StoreConfig};
use postboard::store::{FirestorePostStore, NewPost, PostStore};
use postboard_common::{
    CreatePostRequest, DeletionHandle, Error, Identity, ImageRef, PostId, UserId,
};
use serde_json::{json, Value};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const DOCUMENTS: &str = "/v1/projects/demo/databases/(default)/documents";

fn config_for(server: &MockServer) -> StoreConfig {
    StoreConfig {
        base_url: format!("{}/v1", server.uri()),
        project_id: "demo".to_string(),
        timeout_secs: 5,
        ..Default::default()
    }
}

fn new_post() -> NewPost {
    NewPost {
        author_id: UserId::new("user-a"),
        author_email: "alice@example.com".to_string(),
        title: "Hello".to_string(),
        content: "World".to_string(),
        image: Some(ImageRef::new(
            "https://cdn.test/posts/abc.png",
            DeletionHandle::new("posts/abc"),
        )),
    }
}

fn document(id: &str, title: &str, created_at: &str) -> Value {
    json!({
        "document": {
            "name": format!("projects/demo/databases/(default)/documents/posts/{id}"),
            "fields": {
                "title": { "stringValue": title },
                "content": { "stringValue": "body" },
                "authorUID": { "stringValue": "user-a" },
                "authorEmail": { "stringValue": "alice@example.com" },
                "createdAt": { "timestampValue": created_at }
            },
            "createTime": created_at,
            "updateTime": created_at
        },
        "readTime": "2024-05-01T00:00:00Z"
    })
}

// ============================================================================
// Create
// ============================================================================

#[tokio::test]
async fn create_commits_document_with_server_timestamp() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(format!("{DOCUMENTS}:commit")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "writeResults": [{ "updateTime": "2024-05-01T00:00:00Z" }],
            "commitTime": "2024-05-01T00:00:00Z"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let store = FirestorePostStore::new(&config_for(&server));
    let post = store.create(new_post()).await.unwrap();

    assert_eq!(post.id.as_str().len(), 20);
    assert!(post.id.as_str().chars().all(|c| c.is_ascii_alphanumeric()));
    assert_eq!(post.title, "Hello");
    assert_eq!(post.author_email.as_deref(), Some("alice@example.com"));

    let requests = server.received_requests().await.unwrap();
    let body: Value = serde_json::from_slice(&requests[0].body).unwrap();
    let write = &body["writes"][0];

    assert_eq!(
        write["update"]["name"],
        format!("projects/demo/databases/(default)/documents/posts/{}", post.id)
    );
    let fields = &write["update"]["fields"];
    assert_eq!(fields["title"]["stringValue"], "Hello");
    assert_eq!(fields["content"]["stringValue"], "World");
    assert_eq!(fields["authorUID"]["stringValue"], "user-a");
    assert_eq!(fields["authorEmail"]["stringValue"], "alice@example.com");
    assert_eq!(
        fields["image"]["mapValue"]["fields"]["publicId"]["stringValue"],
        "posts/abc"
    );
    assert!(fields.get("createdAt").is_none());

    assert_eq!(write["updateTransforms"][0]["fieldPath"], "createdAt");
    assert_eq!(write["updateTransforms"][0]["setToServerValue"], "REQUEST_TIME");
    assert_eq!(write["currentDocument"]["exists"], false);
}

#[tokio::test]
async fn create_sends_key_and_bearer_token() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(format!("{DOCUMENTS}:commit")))
        .and(query_param("key", "web-key"))
        .and(header("authorization", "Bearer id-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let config = StoreConfig {
        api_key: Some("web-key".to_string()),
        ..config_for(&server)
    };
    let store = FirestorePostStore::new(&config).with_bearer_token(Some("id-token".to_string()));

    store.create(new_post()).await.unwrap();
}

#[tokio::test]
async fn signed_in_identity_token_authenticates_requests() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(format!("{DOCUMENTS}:runQuery")))
        .and(header("authorization", "Bearer user-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(format!("{DOCUMENTS}:commit")))
        .and(header("authorization", "Bearer user-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let config = Config {
        store: config_for(&server),
        ..Default::default()
    };
    let feed = postboard::build_feed(&config);
    let identity = Identity::new("user-a", Some("alice@example.com".into()))
        .with_id_token("user-token");

    feed.set_user(Some(identity)).await;
    feed.create_post(CreatePostRequest::new("Hello", "World"))
        .await
        .unwrap();
}

#[tokio::test]
async fn create_rejection_is_store_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(format!("{DOCUMENTS}:commit")))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "error": {
                "code": 403,
                "message": "Missing or insufficient permissions.",
                "status": "PERMISSION_DENIED"
            }
        })))
        .mount(&server)
        .await;

    let store = FirestorePostStore::new(&config_for(&server));
    let result = store.create(new_post()).await;

    assert_matches!(result, Err(Error::Store(msg)) if msg.contains("PERMISSION_DENIED"));
}

#[tokio::test]
async fn unreachable_store_is_network_error() {
    let store = FirestorePostStore::new(&StoreConfig {
        base_url: "http://127.0.0.1:1/v1".to_string(),
        project_id: "demo".to_string(),
        timeout_secs: 5,
        ..Default::default()
    });

    let result = store.create(new_post()).await;

    assert_matches!(result, Err(Error::Network(_)));
}

// ============================================================================
// List
// ============================================================================

#[tokio::test]
async fn list_queries_by_author_newest_first() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(format!("{DOCUMENTS}:runQuery")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            document("newer", "Second", "2024-05-02T10:00:00Z"),
            document("older", "First", "2024-05-01T10:00:00Z"),
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let store = FirestorePostStore::new(&config_for(&server));
    let posts = store
        .try_list_by_author(&UserId::new("user-a"))
        .await
        .unwrap();

    assert_eq!(posts.len(), 2);
    assert_eq!(posts[0].id.as_str(), "newer");
    assert_eq!(posts[1].id.as_str(), "older");
    assert!(posts[0].created_at > posts[1].created_at);
    assert!(posts[0].image.is_none());

    let requests = server.received_requests().await.unwrap();
    let body: Value = serde_json::from_slice(&requests[0].body).unwrap();
    let query = &body["structuredQuery"];
    assert_eq!(query["from"][0]["collectionId"], "posts");
    assert_eq!(query["where"]["fieldFilter"]["field"]["fieldPath"], "authorUID");
    assert_eq!(query["where"]["fieldFilter"]["op"], "EQUAL");
    assert_eq!(query["where"]["fieldFilter"]["value"]["stringValue"], "user-a");
    assert_eq!(query["orderBy"][0]["field"]["fieldPath"], "createdAt");
    assert_eq!(query["orderBy"][0]["direction"], "DESCENDING");
}

#[tokio::test]
async fn list_with_no_matches_is_empty() {
    let server = MockServer::start().await;

    // An empty result still yields one element carrying only the read time.
    Mock::given(method("POST"))
        .and(path(format!("{DOCUMENTS}:runQuery")))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([{ "readTime": "2024-05-01T00:00:00Z" }])),
        )
        .mount(&server)
        .await;

    let store = FirestorePostStore::new(&config_for(&server));
    let posts = store
        .try_list_by_author(&UserId::new("user-a"))
        .await
        .unwrap();

    assert!(posts.is_empty());
}

#[tokio::test]
async fn list_skips_malformed_documents() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(format!("{DOCUMENTS}:runQuery")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            document("good", "Title", "2024-05-02T10:00:00Z"),
            {
                "document": {
                    "name": "projects/demo/databases/(default)/documents/posts/bad",
                    "fields": { "content": { "stringValue": "no title" } }
                }
            }
        ])))
        .mount(&server)
        .await;

    let store = FirestorePostStore::new(&config_for(&server));
    let posts = store.list_by_author(&UserId::new("user-a")).await;

    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].id.as_str(), "good");
}

#[tokio::test]
async fn list_tolerates_extra_field_types() {
    let server = MockServer::start().await;

    let mut tagged = document("tagged", "Tagged", "2024-05-03T10:00:00Z");
    tagged["document"]["fields"]["tags"] = json!({
        "arrayValue": { "values": [{ "stringValue": "rust" }, { "stringValue": "blog" }] }
    });
    tagged["document"]["fields"]["location"] = json!({
        "geoPointValue": { "latitude": 40.4168, "longitude": -3.7038 }
    });

    Mock::given(method("POST"))
        .and(path(format!("{DOCUMENTS}:runQuery")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            tagged,
            document("plain", "Plain", "2024-05-02T10:00:00Z"),
        ])))
        .mount(&server)
        .await;

    let store = FirestorePostStore::new(&config_for(&server));
    let posts = store
        .try_list_by_author(&UserId::new("user-a"))
        .await
        .unwrap();

    let ids: Vec<_> = posts.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec!["tagged", "plain"]);
}

#[tokio::test]
async fn failed_query_lists_as_empty() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(format!("{DOCUMENTS}:runQuery")))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal"))
        .mount(&server)
        .await;

    let store = FirestorePostStore::new(&config_for(&server));

    assert!(store.list_by_author(&UserId::new("user-a")).await.is_empty());
    assert_matches!(
        store.try_list_by_author(&UserId::new("user-a")).await,
        Err(Error::Store(_))
    );
}

// ============================================================================
// Delete
// ============================================================================

#[tokio::test]
async fn delete_requires_existing_document() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path(format!("{DOCUMENTS}/posts/abc123")))
        .and(query_param("currentDocument.exists", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let store = FirestorePostStore::new(&config_for(&server));
    store.delete_by_id(&PostId::new("abc123")).await.unwrap();
}

#[tokio::test]
async fn delete_missing_document_is_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path(format!("{DOCUMENTS}/posts/gone")))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": {
                "code": 404,
                "message": "No document to update",
                "status": "NOT_FOUND"
            }
        })))
        .mount(&server)
        .await;

    let store = FirestorePostStore::new(&config_for(&server));
    let result = store.delete_by_id(&PostId::new("gone")).await;

    assert_matches!(result, Err(Error::NotFound(_)));
}
