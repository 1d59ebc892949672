use crate::flash::FlashMessage;
use crate::views::{escape, layout};

/// Shown after a failed login; wording matches the form's error banner.
pub const LOGIN_FAILED: &str =
    "Please enter a correct username and password. Note that both fields may be case-sensitive.";

pub fn login_page(username: &str, flashes: &[FlashMessage]) -> String {
    let body = format!(
        r#"<h1>Log in</h1>
<form method="post" action="/login/" id="login-form">
<div class="form-group">
<label for="id_username">Username</label>
<input type="text" name="username" id="id_username" value="{}" autofocus required>
</div>
<div class="form-group">
<label for="id_password">Password</label>
<input type="password" name="password" id="id_password" required>
</div>
<button type="submit" class="btn btn-primary">Log in</button>
</form>
"#,
        escape(username)
    );
    layout::page("Log in", None, flashes, &body)
}
