use crate::auth::AuthenticatedUser;
use crate::flash::FlashMessage;
use crate::models::Comment;
use crate::views::{escape, layout};

/// Newest comments across every list, each shown as a snippet linking to its task.
pub fn recent_page(user: &AuthenticatedUser, comments: &[Comment], flashes: &[FlashMessage]) -> String {
    let items: String = comments
        .iter()
        .map(|comment| {
            format!(
                "<li><a href=\"/task/{}/\">{}</a></li>\n",
                comment.task_id,
                escape(&comment.snippet())
            )
        })
        .collect();

    let body = if items.is_empty() {
        "<h1>Recent comments</h1>\n<p>No comments (yet).</p>\n".to_string()
    } else {
        format!("<h1>Recent comments</h1>\n<ul class=\"comment-snippets\">\n{}</ul>\n", items)
    };
    layout::page("Recent comments", Some(user), flashes, &body)
}
