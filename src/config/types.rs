use postboard_common::Identity;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub images: ImagesConfig,

    #[serde(default)]
    pub session: SessionConfig,

    #[serde(default)]
    pub display: DisplayConfig,
}

/// Document store connection settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StoreConfig {
    /// REST root of the document store, without trailing slash.
    #[serde(default = "default_store_url")]
    pub base_url: String,

    #[serde(default)]
    pub project_id: String,

    #[serde(default = "default_database")]
    pub database: String,

    /// Collection holding post documents.
    #[serde(default = "default_collection")]
    pub collection: String,

    /// Web API key sent as the `key` query parameter.
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_store_url() -> String {
    "https://firestore.googleapis.com/v1".to_string()
}

fn default_database() -> String {
    "(default)".to_string()
}

fn default_collection() -> String {
    "posts".to_string()
}

fn default_timeout() -> u64 {
    30
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            base_url: default_store_url(),
            project_id: String::new(),
            database: default_database(),
            collection: default_collection(),
            api_key: None,
            timeout_secs: default_timeout(),
        }
    }
}

/// Image upload proxy settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ImagesConfig {
    /// Endpoint accepting `POST` uploads and `DELETE` requests.
    #[serde(default = "default_images_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_images_endpoint() -> String {
    "http://localhost:3000/api/upload".to_string()
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            endpoint: default_images_endpoint(),
            timeout_secs: default_timeout(),
        }
    }
}

/// Identity handed over by the identity platform.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SessionConfig {
    #[serde(default)]
    pub user_id: Option<String>,

    #[serde(default)]
    pub email: Option<String>,

    /// ID token forwarded to the document store as a bearer token.
    #[serde(default)]
    pub id_token: Option<String>,
}

impl SessionConfig {
    /// The signed-in identity, or `None` when no user ID is configured.
    pub fn identity(&self) -> Option<Identity> {
        let user_id = self.user_id.as_deref().map(str::trim).filter(|u| !u.is_empty())?;
        let mut identity = Identity::new(user_id, self.email.clone());
        if let Some(ref token) = self.id_token {
            identity = identity.with_id_token(token.clone());
        }
        Some(identity)
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DisplayConfig {
    #[serde(default)]
    pub locale: Locale,
}

/// Language of user-visible messages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    Es,
    En,
}
