// src/test_support.rs
// Helpers for driving the full router in tests.
use crate::{
    db::create_memory_pool,
    services::{doctor_service, pdf_service::PdfRenderer},
    state::AppState,
    web::routes::{create_app, create_session_store},
};
use axum::{
    body::Body,
    http::{header, Request},
    response::Response,
    Router,
};
use sqlx::SqlitePool;
use tower::ServiceExt;
use tower_sessions::cookie::Key;

pub const TEST_FONT_DIR: &str = "./fonts";

pub struct TestApp {
    pub app: Router,
    pub pool: SqlitePool,
}

impl TestApp {
    pub async fn new() -> Self {
        let pool = create_memory_pool().await.unwrap();
        let store = create_session_store(&pool).await.unwrap();
        let state = AppState {
            db_pool: pool.clone(),
            pdf_renderer: PdfRenderer::new(TEST_FONT_DIR),
        };
        Self {
            app: create_app(state, store, Key::generate()),
            pool,
        }
    }

    pub async fn add_doctor(&self, username: &str, password: &str) -> i64 {
        doctor_service::create_doctor(&self.pool, username, password).await.unwrap()
    }

    pub async fn get(&self, path: &str, cookie: Option<&str>) -> Response {
        let mut builder = Request::builder().method("GET").uri(path);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    pub async fn post_form(&self, path: &str, body: &str, cookie: Option<&str>) -> Response {
        let mut builder = Request::builder()
            .method("POST")
            .uri(path)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.send(builder.body(Body::from(body.to_string())).unwrap()).await
    }

    pub async fn send(&self, request: Request<Body>) -> Response {
        self.app.clone().oneshot(request).await.unwrap()
    }

    /// Logs in and returns the session cookie (`name=value`), panicking if none was issued.
    pub async fn login(&self, username: &str, password: &str) -> String {
        let response = self
            .post_form("/login", &format!("username={}&password={}", username, password), None)
            .await;
        assert_eq!(location(&response), Some("/dashboard"), "login of {username} failed");
        session_cookie(&response).expect("login did not set a session cookie")
    }
}

/// `name=value` part of the first Set-Cookie header.
pub fn session_cookie(response: &Response) -> Option<String> {
    response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(str::to_string)
}

pub fn location(response: &Response) -> Option<&str> {
    response.headers().get(header::LOCATION).and_then(|v| v.to_str().ok())
}

pub async fn body_bytes(response: Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

pub async fn body_string(response: Response) -> String {
    String::from_utf8(body_bytes(response).await).unwrap()
}
