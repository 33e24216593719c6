//! Postboard - Authenticated blogging client
//!
//! This library crate exposes the store clients, the post feed and the
//! terminal presentation for integration testing.

pub mod config;
pub mod feed;
pub mod images;
pub mod messages;
pub mod store;
pub mod ui;

use std::sync::Arc;

use config::Config;
use feed::PostFeed;
use images::HttpImageStore;
use messages::Messages;
use store::FirestorePostStore;

/// Build a feed wired to the HTTP clients described by `config`.
///
/// No user is signed in yet; the ID token of the identity passed to
/// [`PostFeed::set_user`] is what authenticates store requests.
pub fn build_feed(config: &Config) -> PostFeed {
    let store = FirestorePostStore::new(&config.store);
    let images = HttpImageStore::new(&config.images);

    PostFeed::new(Arc::new(store), Arc::new(images))
        .with_messages(Messages::new(config.display.locale))
}
