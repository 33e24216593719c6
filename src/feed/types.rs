use postboard_common::{Post, PostId};

/// Change notification broadcast by [`super::PostFeed`].
#[derive(Debug, Clone)]
pub enum FeedEvent {
    /// The whole sequence was replaced (refresh, user change, sign-out).
    PostsReplaced { count: usize },
    /// A post was created and prepended.
    PostCreated { post: Post },
    /// A post was deleted and removed.
    PostDeleted { id: PostId },
    /// An operation failed; `message` is the user-visible text.
    OperationFailed { message: String },
}
