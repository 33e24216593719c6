//! Document store client for post records.
//!
//! [`PostStore`] is the seam the post feed depends on; [`FirestorePostStore`]
//! implements it against the Firestore REST API. Listing swallows query
//! failures into an empty result (see [`PostStore::list_by_author`]).

mod client;
pub mod firestore;

pub use client::{FirestorePostStore, NewPost, PostStore};
