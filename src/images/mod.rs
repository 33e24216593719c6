//! Image hosting client.
//!
//! Uploads post images to the hosting service's upload proxy and deletes them
//! again by their deletion handle. The [`ImageStore`] trait is the seam the
//! post feed depends on, so tests can substitute an in-memory double.

mod client;

pub use client::{sniff_content_type, HttpImageStore, ImageStore};
