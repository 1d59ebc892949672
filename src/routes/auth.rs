use crate::{
    auth::{generate_token, verify_password, LoginRequest, AUTH_COOKIE},
    error::{AppError, LOGIN_PATH},
    flash::{FlashMessage, Level},
    models::User,
    routes::{html, see_other},
    state::AppState,
    views::login::{login_page, LOGIN_FAILED},
};
use actix_web::{
    cookie::{Cookie, SameSite},
    get, post, web, HttpResponse, Responder,
};
use validator::Validate;

/// Login form
#[get("/login/")]
pub async fn login_form() -> impl Responder {
    html(login_page("", &[]))
}

/// Log a user in
///
/// Checks the credentials and, on success, stores a session token in the `todo_session`
/// cookie and redirects to the index. A failed attempt re-renders the form with an error.
#[post("/login/")]
pub async fn login(
    state: web::Data<AppState>,
    login_data: web::Form<LoginRequest>,
) -> Result<HttpResponse, AppError> {
    let login_data = login_data.into_inner();
    if login_data.validate().is_err() {
        return Ok(login_failed(&login_data.username));
    }

    let user = match User::find_by_username(&state.pool, &login_data.username).await? {
        Some(user) => user,
        None => {
            log::warn!("Login attempt for unknown user {}", login_data.username);
            return Ok(login_failed(&login_data.username));
        }
    };

    if !verify_password(&login_data.password, &user.password_hash)? {
        log::warn!("Wrong password for {}", user.username);
        return Ok(login_failed(&login_data.username));
    }

    let token = generate_token(&user, &state.auth.jwt_secret, state.auth.token_ttl)?;
    let cookie = Cookie::build(AUTH_COOKIE, token)
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .finish();

    log::info!("{} logged in", user.username);
    let mut response = see_other("/");
    response.add_cookie(&cookie).map_err(|e| {
        AppError::InternalServerError(format!("Failed to set session cookie: {}", e))
    })?;
    Ok(response)
}

fn login_failed(username: &str) -> HttpResponse {
    let flashes = [FlashMessage {
        level: Level::Danger,
        text: LOGIN_FAILED.to_string(),
    }];
    html(login_page(username, &flashes))
}

/// Log out
///
/// Expires the session cookie and sends the browser back to the login page.
#[get("/logout/")]
pub async fn logout() -> Result<HttpResponse, AppError> {
    let mut cookie = Cookie::build(AUTH_COOKIE, "").path("/").finish();
    cookie.make_removal();

    let mut response = see_other(LOGIN_PATH);
    response.add_cookie(&cookie).map_err(|e| {
        AppError::InternalServerError(format!("Failed to clear session cookie: {}", e))
    })?;
    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{http::StatusCode, test, App};

    #[actix_rt::test]
    async fn test_logout_clears_cookie() {
        let app = test::init_service(App::new().service(logout)).await;

        let req = test::TestRequest::get().uri("/logout/").to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        assert_eq!(resp.headers().get("Location").unwrap(), LOGIN_PATH);
        let cleared = resp
            .response()
            .cookies()
            .find(|c| c.name() == AUTH_COOKIE)
            .unwrap();
        assert_eq!(cleared.value(), "");
    }

    #[actix_rt::test]
    async fn test_login_form_renders() {
        let app = test::init_service(App::new().service(login_form)).await;

        let req = test::TestRequest::get().uri("/login/").to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());

        let body = test::read_body(resp).await;
        let body = String::from_utf8(body.to_vec()).unwrap();
        assert!(body.contains(r#"name="username""#));
        assert!(body.contains(r#"name="password""#));
    }
}
