use std::net::SocketAddr;

use axum::{
    handler::HandlerWithoutStateExt,
    http::{header, HeaderValue},
    middleware,
    response::Html,
    routing::get,
    Router,
};
use tower_cookies::CookieManagerLayer;
use tower_http::{services::ServeDir, set_header::SetResponseHeaderLayer, trace::TraceLayer};

use crate::auth::extractors::{require_auth, SessionContext};
use crate::config::AppConfig;
use crate::error::AppError;
use crate::state::AppState;
use crate::{auth, scores, views};

pub fn build_app(state: AppState) -> Router {
    let protected = scores::protected_router()
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    let assets = ServeDir::new(&state.config.static_dir).not_found_service(not_found.into_service());

    Router::new()
        .route("/", get(home))
        .route("/health", get(|| async { "ok" }))
        .merge(auth::router())
        .merge(scores::router())
        .merge(protected)
        .nest_service("/static", assets)
        .fallback(not_found)
        .with_state(state)
        .layer(CookieManagerLayer::new())
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-cache, no-store, must-revalidate"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::EXPIRES,
            HeaderValue::from_static("0"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::PRAGMA,
            HeaderValue::from_static("no-cache"),
        ))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    let method = req.method().clone();
                    let uri = req.uri().clone();
                    tracing::info_span!("http_request", %method, uri = %uri, status = tracing::field::Empty)
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &tracing::Span| {
                        let status = res.status();
                        span.record("status", tracing::field::display(status));
                        if status.is_server_error() {
                            tracing::error!(%status, ?latency, "response");
                        } else {
                            tracing::info!(%status, ?latency, "response");
                        }
                    },
                ),
        )
}

async fn home(ctx: SessionContext) -> Html<String> {
    Html(views::home_page(ctx.user_id.is_some()))
}

async fn not_found() -> AppError {
    AppError::NotFound
}

pub async fn serve(app: Router, config: &AppConfig) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;

    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "ctrl-c handler unavailable");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "SIGTERM handler unavailable");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
        response::Response,
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    async fn app() -> (Router, AppState) {
        let state = AppState::for_tests().await;
        (build_app(state.clone()), state)
    }

    fn session_cookie(res: &Response) -> Option<String> {
        res.headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .find(|v| v.starts_with("keystrike_session=") && !v.starts_with("keystrike_session=;"))
            .and_then(|v| v.split(';').next())
            .map(str::to_string)
    }

    fn form(uri: &str, body: &str, cookie: Option<&str>) -> Request<Body> {
        let mut req = Request::post(uri).header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(c) = cookie {
            req = req.header(header::COOKIE, c);
        }
        req.body(Body::from(body.to_string())).unwrap()
    }

    fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
        let mut req = Request::get(uri);
        if let Some(c) = cookie {
            req = req.header(header::COOKIE, c);
        }
        req.body(Body::empty()).unwrap()
    }

    fn score(body: Option<Value>, cookie: Option<&str>) -> Request<Body> {
        let mut req = Request::post("/api/save_score");
        if let Some(c) = cookie {
            req = req.header(header::COOKIE, c);
        }
        match body {
            Some(v) => req
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(v.to_string()))
                .unwrap(),
            None => req.body(Body::empty()).unwrap(),
        }
    }

    async fn json_body(res: Response) -> Value {
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn text_body(res: Response) -> String {
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    async fn register(app: &Router, name: &str) -> String {
        let res = app
            .clone()
            .oneshot(form("/register", &format!("username={name}&password=pw&confirmation=pw"), None))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        session_cookie(&res).expect("session cookie")
    }

    fn assert_no_cache(res: &Response) {
        assert_eq!(res.headers()[header::CACHE_CONTROL], "no-cache, no-store, must-revalidate");
        assert_eq!(res.headers()[header::EXPIRES], "0");
        assert_eq!(res.headers()[header::PRAGMA], "no-cache");
    }

    async fn attempts(state: &AppState) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM history")
            .fetch_one(&state.db)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn every_response_disables_caching() {
        let (app, _) = app().await;
        for uri in ["/", "/login", "/register", "/leaderboard", "/nowhere", "/static/missing.js"] {
            let res = app.clone().oneshot(get(uri, None)).await.unwrap();
            assert_no_cache(&res);
        }
        let res = app.clone().oneshot(score(None, None)).await.unwrap();
        assert_no_cache(&res);
    }

    #[tokio::test]
    async fn unknown_route_renders_not_found() {
        let (app, _) = app().await;
        let res = app.oneshot(get("/does-not-exist", None)).await.unwrap();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        assert!(text_body(res).await.contains("404"));
    }

    #[tokio::test]
    async fn gated_pages_redirect_guests_to_login() {
        let (app, _) = app().await;
        for uri in ["/leaderboard", "/profile"] {
            let res = app.clone().oneshot(get(uri, None)).await.unwrap();
            assert_eq!(res.status(), StatusCode::SEE_OTHER);
            assert_eq!(res.headers()[header::LOCATION], "/login");
        }
    }

    #[tokio::test]
    async fn register_signs_in_and_unlocks_profile() {
        let (app, _) = app().await;
        let cookie = register(&app, "ada").await;
        let res = app.clone().oneshot(get("/profile", Some(&cookie))).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert!(text_body(res).await.contains("ada"));
    }

    #[tokio::test]
    async fn duplicate_registration_flashes_message() {
        let (app, state) = app().await;
        register(&app, "ada").await;
        let res = app
            .clone()
            .oneshot(form("/register", "username=ada&password=x&confirmation=x", None))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert!(session_cookie(&res).is_none());
        assert!(text_body(res).await.contains("Username already exists"));
        let n: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE name = 'ada'")
            .fetch_one(&state.db)
            .await
            .unwrap();
        assert_eq!(n, 1);
    }

    #[tokio::test]
    async fn mismatched_confirmation_is_rejected() {
        let (app, _) = app().await;
        let res = app
            .oneshot(form("/register", "username=ada&password=a&confirmation=b", None))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert!(text_body(res).await.contains("Passwords do not match"));
    }

    #[tokio::test]
    async fn login_invalidates_the_previous_session() {
        let (app, _) = app().await;
        let old = register(&app, "ada").await;

        let res = app
            .clone()
            .oneshot(form("/login", "username=ada&password=pw", Some(&old)))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        let new = session_cookie(&res).expect("new session");
        assert_ne!(old, new);

        let res = app.clone().oneshot(get("/profile", Some(&old))).await.unwrap();
        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        let res = app.clone().oneshot(get("/profile", Some(&new))).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn wrong_password_is_generic_and_unauthenticated() {
        let (app, _) = app().await;
        let old = register(&app, "ada").await;

        let res = app
            .clone()
            .oneshot(form("/login", "username=ada&password=nope", Some(&old)))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert!(session_cookie(&res).is_none());
        assert!(text_body(res).await.contains("Invalid username or password"));

        let res = app
            .clone()
            .oneshot(form("/login", "username=nobody&password=pw", None))
            .await
            .unwrap();
        assert!(text_body(res).await.contains("Invalid username or password"));

        let res = app.clone().oneshot(get("/leaderboard", Some(&old))).await.unwrap();
        assert_eq!(res.status(), StatusCode::SEE_OTHER);
    }

    #[tokio::test]
    async fn logout_twice_is_harmless() {
        let (app, _) = app().await;
        let cookie = register(&app, "ada").await;
        for _ in 0..2 {
            let res = app.clone().oneshot(get("/logout", Some(&cookie))).await.unwrap();
            assert_eq!(res.status(), StatusCode::SEE_OTHER);
            assert_eq!(res.headers()[header::LOCATION], "/");
        }
        let res = app.clone().oneshot(get("/logout", None)).await.unwrap();
        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        let res = app.clone().oneshot(get("/profile", Some(&cookie))).await.unwrap();
        assert_eq!(res.status(), StatusCode::SEE_OTHER);
    }

    #[tokio::test]
    async fn guest_score_is_echoed_and_not_stored() {
        let (app, state) = app().await;
        let res = app
            .oneshot(score(Some(json!({"wpm": 72, "accuracy": 96, "mode": "time-30"})), None))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let body = json_body(res).await;
        assert_eq!(body["max_wpm"], 72.0);
        assert_eq!(body["message"], "Guest User");
        assert_eq!(attempts(&state).await, 0);
    }

    #[tokio::test]
    async fn signed_in_score_returns_mode_best() {
        let (app, state) = app().await;
        let cookie = register(&app, "ada").await;

        for (wpm, expected) in [(80.0, 80.0), (70.0, 80.0), (95.0, 95.0)] {
            let res = app
                .clone()
                .oneshot(score(Some(json!({"wpm": wpm, "accuracy": 97.5, "mode": "time-30"})), Some(&cookie)))
                .await
                .unwrap();
            assert_eq!(res.status(), StatusCode::OK);
            let body = json_body(res).await;
            assert_eq!(body["max_wpm"], expected);
            assert!(body.get("message").is_none());
        }
        assert_eq!(attempts(&state).await, 3);
    }

    #[tokio::test]
    async fn malformed_score_body_is_rejected() {
        let (app, state) = app().await;
        let cookie = register(&app, "ada").await;

        let res = app.clone().oneshot(score(None, Some(&cookie))).await.unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(res).await["error"], "Invalid Request");

        let res = app
            .clone()
            .oneshot(score(Some(json!({"mode": "time-30"})), Some(&cookie)))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(res).await["error"], "Invalid Request");

        assert_eq!(attempts(&state).await, 0);
    }

    #[tokio::test]
    async fn leaderboard_lists_signed_in_scores() {
        let (app, _) = app().await;
        let ada = register(&app, "ada").await;
        let bob = register(&app, "bob").await;
        for (cookie, wpm) in [(&ada, 101.0), (&bob, 64.0)] {
            app.clone()
                .oneshot(score(Some(json!({"wpm": wpm, "mode": "time-30"})), Some(cookie)))
                .await
                .unwrap();
        }

        let res = app.clone().oneshot(get("/leaderboard", Some(&bob))).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let html = text_body(res).await;
        let ada_at = html.find("<td>ada</td>").expect("ada listed");
        let bob_at = html.find("<td>bob</td>").expect("bob listed");
        assert!(ada_at < bob_at);
    }

    #[tokio::test]
    async fn health_is_ok() {
        let (app, _) = app().await;
        let res = app.oneshot(get("/health", None)).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
    }
}
