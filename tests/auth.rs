use std::sync::Arc;

use actix_web::cookie::Cookie;
use actix_web::http::StatusCode;
use actix_web::middleware::Logger;
use actix_web::{test, web, App};
use todo_lists::auth::AUTH_COOKIE;
use todo_lists::clock::SystemClock;
use todo_lists::views::login::LOGIN_FAILED;
use todo_lists::{routes, AppState};

fn body_text(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

#[actix_rt::test]
async fn test_login_and_logout_flow() {
    let state = AppState::ephemeral(Arc::new(SystemClock)).await.unwrap();
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .wrap(Logger::default())
            .configure(routes::config),
    )
    .await;

    // Anonymous visitors are sent to the login page
    let req = test::TestRequest::get().uri("/").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(resp.headers().get("Location").unwrap(), "/login/");

    // Log in as the administrator
    let req = test::TestRequest::post()
        .uri("/login/")
        .set_form([("username", "staffer"), ("password", "staffer")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(resp.headers().get("Location").unwrap(), "/");
    let session = resp
        .response()
        .cookies()
        .find(|c| c.name() == AUTH_COOKIE)
        .map(|c| c.into_owned())
        .expect("Login should set the session cookie");
    assert!(session.http_only().unwrap_or(false));

    // The index greets the user by name
    let req = test::TestRequest::get()
        .uri("/")
        .cookie(session.clone())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_text(&test::read_body(resp).await);
    assert!(body.contains("<h1>Todo Lists</h1>"), "Body: {}", body);
    assert!(body.contains(
        r#"<p class="text-muted">CITS5501-Todo, 2018. Logged in as &quot;staffer&quot;</p>"#
    ));

    // Logging out expires the cookie
    let req = test::TestRequest::get()
        .uri("/logout/")
        .cookie(session)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(resp.headers().get("Location").unwrap(), "/login/");
    let cleared = resp
        .response()
        .cookies()
        .find(|c| c.name() == AUTH_COOKIE)
        .unwrap();
    assert_eq!(cleared.value(), "");
}

#[actix_rt::test]
async fn test_wrong_password_shows_the_error_banner() {
    let state = AppState::ephemeral(Arc::new(SystemClock)).await.unwrap();
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .configure(routes::config),
    )
    .await;

    for (username, password) in [("staffer", "wrong"), ("nobody", "staffer"), ("Staffer", "staffer")] {
        let req = test::TestRequest::post()
            .uri("/login/")
            .set_form([("username", username), ("password", password)])
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(resp
            .response()
            .cookies()
            .all(|c| c.name() != AUTH_COOKIE));

        let body = body_text(&test::read_body(resp).await);
        assert!(body.contains("alert-danger"));
        assert!(body.contains(LOGIN_FAILED));
    }
}

#[actix_rt::test]
async fn test_invalid_session_cookie_redirects_to_login() {
    let state = AppState::ephemeral(Arc::new(SystemClock)).await.unwrap();
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .configure(routes::config),
    )
    .await;

    let req = test::TestRequest::get()
        .uri("/comments/")
        .cookie(Cookie::new(AUTH_COOKIE, "not-a-token"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(resp.headers().get("Location").unwrap(), "/login/");
}

#[actix_rt::test]
async fn test_health_needs_no_session() {
    let state = AppState::ephemeral(Arc::new(SystemClock)).await.unwrap();
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .configure(routes::config),
    )
    .await;

    let req = test::TestRequest::get().uri("/health").to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());

    let json: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(json["status"], "ok");
}
