//! Postboard-Common: Shared post model, identifiers, and error types.
//!
//! This crate provides the types that flow between the postboard store
//! clients, the post feed, and the presentation layer:
//!
//! - **Typed IDs**: String wrappers for store-assigned post IDs and user IDs
//! - **Model**: [`Post`], [`ImageRef`], [`Identity`], [`CreatePostRequest`]
//! - **Validation**: Input checks applied before any network call
//! - **Error Handling**: The shared error taxonomy and result alias
//!
//! # Examples
//!
//! ```
//! use postboard_common::{CreatePostRequest, Identity, Error};
//! use postboard_common::validate::validate_create;
//!
//! let identity = Identity::new("uid-1", Some("ana@example.com".into()));
//! let request = CreatePostRequest::new("  Hello ", "World");
//!
//! let valid = validate_create(&identity, request).unwrap();
//! assert_eq!(valid.title, "Hello");
//!
//! let err = validate_create(&identity, CreatePostRequest::new(" ", "x")).unwrap_err();
//! assert!(matches!(err, Error::Validation(_)));
//! ```

pub mod error;
pub mod ids;
pub mod types;
pub mod validate;

pub use error::{Error, Result};
pub use ids::*;
pub use types::*;
