//! Firestore REST v1 wire types and the post document mapping.
//!
//! Firestore encodes every field as a single-key object naming its type
//! (`{"stringValue": "..."}`), which maps onto an externally tagged enum.
//! Post documents keep the field names of the existing collection:
//! `title`, `content`, `image { url, publicId }`, `authorUID`, `authorEmail`
//! and `createdAt`.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use postboard_common::{DeletionHandle, ImageRef, Post, PostId, UserId};
use serde::{Deserialize, Serialize};

pub const FIELD_TITLE: &str = "title";
pub const FIELD_CONTENT: &str = "content";
pub const FIELD_IMAGE: &str = "image";
pub const FIELD_IMAGE_URL: &str = "url";
pub const FIELD_IMAGE_HANDLE: &str = "publicId";
pub const FIELD_AUTHOR_ID: &str = "authorUID";
pub const FIELD_AUTHOR_EMAIL: &str = "authorEmail";
pub const FIELD_CREATED_AT: &str = "createdAt";

// ---------------------------------------------------------------------------
// Values and documents
// ---------------------------------------------------------------------------

/// A typed Firestore value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Value {
    NullValue(()),
    BooleanValue(bool),
    IntegerValue(String),
    DoubleValue(f64),
    StringValue(String),
    /// RFC 3339 timestamp.
    TimestampValue(String),
    /// Base64-encoded bytes.
    BytesValue(String),
    /// Resource name of another document.
    ReferenceValue(String),
    GeoPointValue(LatLng),
    ArrayValue(ArrayValue),
    MapValue(MapValue),
}

impl Value {
    pub fn string(s: impl Into<String>) -> Self {
        Value::StringValue(s.into())
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::StringValue(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            Value::TimestampValue(ts) => DateTime::parse_from_rfc3339(ts)
                .ok()
                .map(|dt| dt.with_timezone(&Utc)),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Value::MapValue(map) => Some(&map.fields),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArrayValue {
    #[serde(default)]
    pub values: Vec<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    #[serde(default)]
    pub latitude: f64,
    #[serde(default)]
    pub longitude: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MapValue {
    #[serde(default)]
    pub fields: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    /// Full resource name: `projects/{p}/databases/{d}/documents/{collection}/{id}`.
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub fields: BTreeMap<String, Value>,
    #[serde(default, skip_serializing)]
    pub create_time: Option<String>,
}

impl Document {
    /// Last segment of the resource name.
    pub fn id(&self) -> &str {
        self.name.rsplit('/').next().unwrap_or_default()
    }
}

// ---------------------------------------------------------------------------
// Requests and responses
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct CommitRequest {
    pub writes: Vec<Write>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Write {
    pub update: Document,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub update_transforms: Vec<FieldTransform>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_document: Option<Precondition>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldTransform {
    pub field_path: String,
    pub set_to_server_value: &'static str,
}

impl FieldTransform {
    /// Set `field_path` to the time the server processes the request.
    pub fn request_time(field_path: &str) -> Self {
        Self {
            field_path: field_path.to_string(),
            set_to_server_value: "REQUEST_TIME",
        }
    }
}

#[derive(Debug, Serialize)]
pub struct Precondition {
    pub exists: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunQueryRequest {
    pub structured_query: StructuredQuery,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuredQuery {
    pub from: Vec<CollectionSelector>,
    #[serde(rename = "where")]
    pub filter: Filter,
    pub order_by: Vec<Order>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionSelector {
    pub collection_id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Filter {
    pub field_filter: FieldFilter,
}

#[derive(Debug, Serialize)]
pub struct FieldFilter {
    pub field: FieldReference,
    pub op: &'static str,
    pub value: Value,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldReference {
    pub field_path: String,
}

#[derive(Debug, Serialize)]
pub struct Order {
    pub field: FieldReference,
    pub direction: &'static str,
}

impl StructuredQuery {
    /// Documents of `collection` whose `field` equals `value`, newest
    /// `order_field` first.
    pub fn equal_desc(collection: &str, field: &str, value: Value, order_field: &str) -> Self {
        Self {
            from: vec![CollectionSelector {
                collection_id: collection.to_string(),
            }],
            filter: Filter {
                field_filter: FieldFilter {
                    field: FieldReference {
                        field_path: field.to_string(),
                    },
                    op: "EQUAL",
                    value,
                },
            },
            order_by: vec![Order {
                field: FieldReference {
                    field_path: order_field.to_string(),
                },
                direction: "DESCENDING",
            }],
        }
    }
}

/// One element of the `runQuery` response stream. Elements that only report
/// progress carry no document.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunQueryResponse {
    #[serde(default)]
    pub document: Option<Document>,
}

/// Error envelope returned by the REST API.
#[derive(Debug, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorStatus,
}

#[derive(Debug, Deserialize)]
pub struct ErrorStatus {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub message: String,
}

// ---------------------------------------------------------------------------
// Post mapping
// ---------------------------------------------------------------------------

/// Fields of a new post document. `createdAt` is left to a server transform.
pub fn post_fields(
    author_id: &UserId,
    author_email: &str,
    title: &str,
    content: &str,
    image: Option<&ImageRef>,
) -> BTreeMap<String, Value> {
    let mut fields = BTreeMap::new();
    fields.insert(FIELD_TITLE.to_string(), Value::string(title));
    fields.insert(FIELD_CONTENT.to_string(), Value::string(content));
    fields.insert(FIELD_AUTHOR_ID.to_string(), Value::string(author_id.as_str()));
    fields.insert(FIELD_AUTHOR_EMAIL.to_string(), Value::string(author_email));

    if let Some(image) = image {
        let mut image_fields = BTreeMap::new();
        image_fields.insert(FIELD_IMAGE_URL.to_string(), Value::string(&image.url));
        image_fields.insert(
            FIELD_IMAGE_HANDLE.to_string(),
            Value::string(image.deletion_handle.as_str()),
        );
        fields.insert(
            FIELD_IMAGE.to_string(),
            Value::MapValue(MapValue {
                fields: image_fields,
            }),
        );
    }

    fields
}

/// Decode a post document.
///
/// Returns `None` for documents missing the title, content or author. An
/// image is only attached when both its URL and handle are present. A missing
/// `createdAt` (write still pending on the server) reads as `now`.
pub fn post_from_document(doc: &Document, now: DateTime<Utc>) -> Option<Post> {
    let field_str = |name: &str| doc.fields.get(name).and_then(Value::as_str);

    let title = field_str(FIELD_TITLE)?;
    let content = field_str(FIELD_CONTENT)?;
    let author_id = field_str(FIELD_AUTHOR_ID)?;

    let image = doc
        .fields
        .get(FIELD_IMAGE)
        .and_then(Value::as_map)
        .and_then(|image| {
            let url = image.get(FIELD_IMAGE_URL).and_then(Value::as_str)?;
            let handle = image.get(FIELD_IMAGE_HANDLE).and_then(Value::as_str)?;
            Some(ImageRef::new(url, DeletionHandle::new(handle)))
        });

    let created_at = doc
        .fields
        .get(FIELD_CREATED_AT)
        .and_then(Value::as_timestamp)
        .unwrap_or(now);

    Some(Post {
        id: PostId::new(doc.id()),
        title: title.to_string(),
        content: content.to_string(),
        image,
        author_id: UserId::new(author_id),
        author_email: field_str(FIELD_AUTHOR_EMAIL).map(str::to_string),
        created_at,
    })
}
