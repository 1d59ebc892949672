use crate::auth::AuthenticatedUser;
use crate::flash::FlashMessage;
use crate::views::escape;

const FOOTER_PREFIX: &str = "CITS5501-Todo, 2018.";

/// Wraps `body` in the site chrome: navigation, flash alerts and the footer.
///
/// `user` is `None` on the login page and on error pages.
pub fn page(
    title: &str,
    user: Option<&AuthenticatedUser>,
    flashes: &[FlashMessage],
    body: &str,
) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{title} | Todo</title>
</head>
<body>
{nav}
<main role="main" class="container">
{alerts}{body}
</main>
<footer class="footer">
<p class="text-muted">{footer}</p>
</footer>
</body>
</html>
"#,
        title = escape(title),
        nav = navigation(user),
        alerts = alerts(flashes),
        body = body,
        footer = footer(user),
    )
}

/// Standalone page for an `AppError`.
pub fn error_page(title: &str, detail: &str) -> String {
    let body = format!(
        r#"<h1>{}</h1>
<div class="alert alert-danger" role="alert">{}</div>
<p><a href="/">Back to your lists</a></p>
"#,
        escape(title),
        escape(detail)
    );
    page(title, None, &[], &body)
}

fn navigation(user: Option<&AuthenticatedUser>) -> String {
    let mut links = String::new();
    match user {
        Some(user) => {
            if user.role.is_administrator() {
                links.push_str(r#"<li class="nav-item"><a class="nav-link" href="/comments/">Recent comments</a></li>"#);
            }
            links.push_str(r#"<li class="nav-item"><a class="nav-link" href="/logout/">Log out</a></li>"#);
        }
        None => {
            links.push_str(r#"<li class="nav-item"><a class="nav-link" href="/login/">Log in</a></li>"#);
        }
    }
    format!(
        r#"<nav class="navbar"><a class="navbar-brand" href="/">Todo</a><ul class="navbar-nav">{}</ul></nav>"#,
        links
    )
}

fn alerts(flashes: &[FlashMessage]) -> String {
    flashes
        .iter()
        .map(|flash| {
            format!(
                "<div class=\"alert {}\" role=\"alert\">{}</div>\n",
                flash.level.css_class(),
                escape(&flash.text)
            )
        })
        .collect()
}

fn footer(user: Option<&AuthenticatedUser>) -> String {
    match user {
        Some(user) => format!("{} Logged in as &quot;{}&quot;", FOOTER_PREFIX, escape(&user.username)),
        None => FOOTER_PREFIX.to_string(),
    }
}
