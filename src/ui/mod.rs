//! Terminal presentation: the post creation form and the post list.
//!
//! Both read feed snapshots and issue requests through [`crate::feed::PostFeed`];
//! neither mutates the post sequence itself.

mod form;
mod list;

pub use form::CreatePostForm;
pub use list::PostList;
