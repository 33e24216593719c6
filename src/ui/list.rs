use std::fmt::Write;

use postboard_common::Post;

use crate::messages::Messages;

/// Text rendering of a post sequence.
pub struct PostList {
    messages: Messages,
}

impl PostList {
    pub fn new(messages: Messages) -> Self {
        Self { messages }
    }

    pub fn render(&self, posts: &[Post]) -> String {
        if posts.is_empty() {
            return format!("{}\n", self.messages.empty_list());
        }

        let mut out = String::new();
        let _ = writeln!(out, "{}", self.messages.list_header(posts.len()));

        for post in posts {
            out.push('\n');
            self.render_post(&mut out, post);
        }
        out
    }

    fn render_post(&self, out: &mut String, post: &Post) {
        let _ = writeln!(out, "[{}] {}", post.id, post.title);
        if let Some(ref image) = post.image {
            let _ = writeln!(out, "  {}", image.url);
        }
        for line in post.content.lines() {
            let _ = writeln!(out, "  {}", line);
        }
        let _ = writeln!(out, "  {}", self.messages.created_on(post.created_at));
    }
}
