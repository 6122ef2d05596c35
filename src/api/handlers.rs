//! HTTP request handlers
//!
//! Page handlers fetch from the upstream API and render HTML; action
//! handlers validate, proxy, and return JSON. Upstream failures surface
//! the upstream `{error}` message or a generic fallback.

use super::render;
use super::session;
use super::types::{ErrorResponse, LogoutResponse, ProfileImageRequest, SessionResponse, SuccessResponse};
use super::AppState;
use crate::models::{Conversation, Item, Person, User};
use crate::upstream::{
    Credentials, ItemPayload, NewPerson, PersonUpdate, SignupRequest, UpstreamError,
    UpstreamErrorKind,
};
use crate::validate::{self, ValidationError};
use axum::{
    extract::{rejection::JsonRejection, FromRequest, Path, Request, State},
    http::StatusCode,
    middleware,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post, put},
    Json, Router,
};
use axum_extra::extract::cookie::CookieJar;

/// Create the front-end router
pub fn create_router(state: AppState) -> Router {
    // Pages sit behind the redirect middleware; the fetch endpoints
    // answer 401 JSON instead of redirecting.
    let pages = Router::new()
        .route("/", get(landing_page))
        .route("/login", get(login_page))
        .route("/signup", get(signup_page))
        .route("/dashboard", get(dashboard_page))
        .route("/profile", get(profile_page))
        .route("/people", get(people_page))
        .route("/people/add", get(add_person_page))
        .route("/people/:id", get(person_page))
        .route("/conversations", get(conversations_page))
        .route("/conversations/:id", get(conversation_page))
        .layer(middleware::from_fn(session::route_guard));

    // JSON actions backing the pages
    let actions = Router::new()
        .route("/api/login", post(login))
        .route("/api/signup", post(signup))
        .route("/api/logout", post(logout))
        .route("/api/session", get(current_session))
        .route("/api/profile/image", post(update_profile_image))
        .route("/api/items", get(list_items).post(create_item))
        .route("/api/items/:id", put(update_item).delete(delete_item))
        .route("/api/people", get(list_people).post(create_person))
        .route(
            "/api/people/:id",
            get(get_person).put(update_person).delete(delete_person),
        )
        .route("/api/conversations", get(list_conversations))
        .route(
            "/api/conversations/:id",
            get(get_conversation).delete(delete_conversation),
        )
        .route("/version", get(get_version));

    Router::new().merge(pages).merge(actions).with_state(state)
}

fn require_token(jar: &CookieJar) -> Result<String, AppError> {
    session::token_from(jar).ok_or_else(|| AppError::Unauthorized("Not authenticated".to_string()))
}

// ============================================================
// Pages
// ============================================================

async fn landing_page() -> Html<String> {
    render::landing()
}

async fn login_page() -> Html<String> {
    render::login_form()
}

async fn signup_page() -> Html<String> {
    render::signup_form()
}

async fn dashboard_page(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<Response, AppError> {
    let token = require_token(&jar)?;
    let user = match state.upstream.me(&token).await {
        Ok(user) => user,
        Err(e) if e.kind == UpstreamErrorKind::Auth => {
            return Ok(session::expire_and_redirect(jar))
        }
        Err(e) => return Err(e.into()),
    };

    // The dashboard still renders when the item fetch fails
    let items = match state.upstream.list_items(&token).await {
        Ok(items) => items,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load items");
            Vec::new()
        }
    };

    Ok(render::dashboard(&user, &items).into_response())
}

async fn profile_page(State(state): State<AppState>, jar: CookieJar) -> Result<Response, AppError> {
    let token = require_token(&jar)?;
    match state.upstream.me(&token).await {
        Ok(user) => Ok(render::profile(&user).into_response()),
        Err(e) if e.kind == UpstreamErrorKind::Auth => Ok(session::expire_and_redirect(jar)),
        Err(e) => Err(e.into()),
    }
}

async fn people_page(State(state): State<AppState>, jar: CookieJar) -> Result<Response, AppError> {
    let token = require_token(&jar)?;
    let people = match state.upstream.list_people(&token).await {
        Ok(people) => people,
        Err(e) if e.kind == UpstreamErrorKind::Auth => {
            return Ok(session::expire_and_redirect(jar))
        }
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load people");
            Vec::new()
        }
    };
    Ok(render::people(&people).into_response())
}

async fn add_person_page() -> Html<String> {
    render::add_person_form()
}

async fn person_page(
    State(state): State<AppState>,
    Path(id): Path<String>,
    jar: CookieJar,
) -> Result<Response, AppError> {
    let token = require_token(&jar)?;
    match state.upstream.get_person(&token, &id).await {
        Ok(person) => Ok(render::person_detail(&person).into_response()),
        Err(e) if e.kind == UpstreamErrorKind::Auth => Ok(session::expire_and_redirect(jar)),
        // A person that cannot be loaded sends the browser back to the list
        Err(e) => {
            tracing::warn!(error = %e, person = %id, "Failed to load person");
            Ok(Redirect::temporary("/people").into_response())
        }
    }
}

async fn conversations_page(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<Response, AppError> {
    let token = require_token(&jar)?;
    let conversations = match state.upstream.list_conversations(&token).await {
        Ok(conversations) => conversations,
        Err(e) if e.kind == UpstreamErrorKind::Auth => {
            return Ok(session::expire_and_redirect(jar))
        }
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load conversations");
            Vec::new()
        }
    };
    Ok(render::conversations(&conversations).into_response())
}

async fn conversation_page(
    State(state): State<AppState>,
    Path(id): Path<String>,
    jar: CookieJar,
) -> Result<Response, AppError> {
    let token = require_token(&jar)?;
    match state.upstream.get_conversation(&token, &id).await {
        Ok(conversation) => Ok(render::conversation_detail(&conversation).into_response()),
        Err(e) if e.kind == UpstreamErrorKind::Auth => Ok(session::expire_and_redirect(jar)),
        Err(e) if e.kind == UpstreamErrorKind::NotFound => Ok((
            StatusCode::NOT_FOUND,
            render::conversation_missing("Conversation not found"),
        )
            .into_response()),
        Err(e) => {
            tracing::warn!(error = %e, conversation = %id, "Failed to load conversation");
            Ok((
                StatusCode::BAD_GATEWAY,
                render::conversation_missing("Failed to load conversation"),
            )
                .into_response())
        }
    }
}

// ============================================================
// Auth actions
// ============================================================

async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    AppJson(credentials): AppJson<Credentials>,
) -> Result<(CookieJar, Json<SessionResponse>), AppError> {
    let auth = state.upstream.login(&credentials).await?;
    let jar = jar.add(session::session_cookie(auth.token));
    Ok((
        jar,
        Json(SessionResponse {
            user: auth.user,
            redirect: "/dashboard",
        }),
    ))
}

async fn signup(
    State(state): State<AppState>,
    jar: CookieJar,
    AppJson(request): AppJson<SignupRequest>,
) -> Result<(CookieJar, Json<SessionResponse>), AppError> {
    validate::validate_signup(
        &request.email,
        &request.password,
        &request.name,
        request.profile_image.as_deref(),
        &request.primary_caregiver.name,
        &request.primary_caregiver.relationship,
        &request.primary_caregiver.contact,
    )?;

    let auth = state.upstream.signup(&request).await?;
    let jar = jar.add(session::session_cookie(auth.token));
    Ok((
        jar,
        Json(SessionResponse {
            user: auth.user,
            redirect: "/dashboard",
        }),
    ))
}

async fn logout(jar: CookieJar) -> (CookieJar, Json<LogoutResponse>) {
    let jar = jar.remove(session::expired_session_cookie());
    (jar, Json(LogoutResponse { redirect: "/" }))
}

/// The auth-context `checkAuth`: resolve the current user from the cookie.
/// A rejected token clears the cookie so the next page load hits login.
async fn current_session(State(state): State<AppState>, jar: CookieJar) -> Response {
    let Some(token) = session::token_from(&jar) else {
        return AppError::Unauthorized("Not authenticated".to_string()).into_response();
    };

    match state.upstream.me(&token).await {
        Ok(user) => Json(user).into_response(),
        Err(e) if e.kind == UpstreamErrorKind::Auth => {
            let jar = jar.remove(session::expired_session_cookie());
            (jar, AppError::Unauthorized(e.message)).into_response()
        }
        Err(e) => AppError::from(e).into_response(),
    }
}

async fn update_profile_image(
    State(state): State<AppState>,
    jar: CookieJar,
    AppJson(request): AppJson<ProfileImageRequest>,
) -> Result<Json<User>, AppError> {
    let token = require_token(&jar)?;
    validate::validate_image(&request.image)?;
    let user = state
        .upstream
        .update_profile_image(&token, &request.image)
        .await?;
    Ok(Json(user))
}

// ============================================================
// Items
// ============================================================

async fn list_items(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<Json<Vec<Item>>, AppError> {
    let token = require_token(&jar)?;
    Ok(Json(state.upstream.list_items(&token).await?))
}

async fn create_item(
    State(state): State<AppState>,
    jar: CookieJar,
    AppJson(item): AppJson<ItemPayload>,
) -> Result<Json<Item>, AppError> {
    let token = require_token(&jar)?;
    if item.title.trim().is_empty() {
        return Err(ValidationError::TitleRequired.into());
    }
    Ok(Json(state.upstream.create_item(&token, &item).await?))
}

async fn update_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
    jar: CookieJar,
    AppJson(item): AppJson<ItemPayload>,
) -> Result<Json<Item>, AppError> {
    let token = require_token(&jar)?;
    if item.title.trim().is_empty() {
        return Err(ValidationError::TitleRequired.into());
    }
    Ok(Json(state.upstream.update_item(&token, &id, &item).await?))
}

async fn delete_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
    jar: CookieJar,
) -> Result<Json<SuccessResponse>, AppError> {
    let token = require_token(&jar)?;
    state.upstream.delete_item(&token, &id).await?;
    Ok(Json(SuccessResponse { success: true }))
}

// ============================================================
// People
// ============================================================

async fn list_people(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<Json<Vec<Person>>, AppError> {
    let token = require_token(&jar)?;
    Ok(Json(state.upstream.list_people(&token).await?))
}

async fn get_person(
    State(state): State<AppState>,
    Path(id): Path<String>,
    jar: CookieJar,
) -> Result<Json<Person>, AppError> {
    let token = require_token(&jar)?;
    Ok(Json(state.upstream.get_person(&token, &id).await?))
}

async fn create_person(
    State(state): State<AppState>,
    jar: CookieJar,
    AppJson(person): AppJson<NewPerson>,
) -> Result<Json<Person>, AppError> {
    let token = require_token(&jar)?;
    validate::validate_new_person(&person.name, &person.relation, &person.summary, &person.photo)?;
    Ok(Json(state.upstream.create_person(&token, &person).await?))
}

async fn update_person(
    State(state): State<AppState>,
    Path(id): Path<String>,
    jar: CookieJar,
    AppJson(update): AppJson<PersonUpdate>,
) -> Result<Json<Person>, AppError> {
    let token = require_token(&jar)?;
    validate::validate_person_update(
        update.name.as_deref(),
        update.relation.as_deref(),
        update.summary.as_deref(),
        update.photo.as_deref(),
    )?;
    Ok(Json(
        state.upstream.update_person(&token, &id, &update).await?,
    ))
}

async fn delete_person(
    State(state): State<AppState>,
    Path(id): Path<String>,
    jar: CookieJar,
) -> Result<Json<SuccessResponse>, AppError> {
    let token = require_token(&jar)?;
    state.upstream.delete_person(&token, &id).await?;
    Ok(Json(SuccessResponse { success: true }))
}

// ============================================================
// Conversations
// ============================================================

async fn list_conversations(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<Json<Vec<Conversation>>, AppError> {
    let token = require_token(&jar)?;
    Ok(Json(state.upstream.list_conversations(&token).await?))
}

async fn get_conversation(
    State(state): State<AppState>,
    Path(id): Path<String>,
    jar: CookieJar,
) -> Result<Json<Conversation>, AppError> {
    let token = require_token(&jar)?;
    Ok(Json(state.upstream.get_conversation(&token, &id).await?))
}

async fn delete_conversation(
    State(state): State<AppState>,
    Path(id): Path<String>,
    jar: CookieJar,
) -> Result<Json<SuccessResponse>, AppError> {
    let token = require_token(&jar)?;
    state.upstream.delete_conversation(&token, &id).await?;
    Ok(Json(SuccessResponse { success: true }))
}

// ============================================================
// Version
// ============================================================

async fn get_version() -> &'static str {
    concat!("memento-web ", env!("CARGO_PKG_VERSION"))
}

// ============================================================
// Error Handling
// ============================================================

/// JSON body extractor whose rejection carries the `{error}` body instead
/// of axum's plain-text response
struct AppJson<T>(T);

#[axum::async_trait]
impl<S, T> FromRequest<S> for AppJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;
        Ok(Self(value))
    }
}

#[derive(Debug)]
enum AppError {
    BadRequest(String),
    Unauthorized(String),
    NotFound(String),
    BadGateway(String),
    Internal(String),
}

impl From<UpstreamError> for AppError {
    fn from(e: UpstreamError) -> Self {
        match e.kind {
            UpstreamErrorKind::Auth => AppError::Unauthorized(e.message),
            UpstreamErrorKind::NotFound => AppError::NotFound(e.message),
            UpstreamErrorKind::InvalidRequest => AppError::BadRequest(e.message),
            UpstreamErrorKind::ServerError | UpstreamErrorKind::Network => {
                AppError::BadGateway(e.message)
            }
            UpstreamErrorKind::Unknown => AppError::Internal(e.message),
        }
    }
}

impl From<ValidationError> for AppError {
    fn from(e: ValidationError) -> Self {
        AppError::BadRequest(e.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::BadGateway(msg) => (StatusCode::BAD_GATEWAY, msg),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(ErrorResponse::new(message));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::upstream::{MementoClient, UpstreamConfig};
    use axum::body::{to_bytes, Body};
    use axum::http::{header, HeaderMap, Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    const TOKEN: &str = "tok-1";

    fn mock_user() -> Value {
        json!({
            "id": "u1",
            "email": "pat@example.com",
            "name": "Pat",
            "timezone": "America/New_York",
            "primaryCaregiver": {
                "name": "Sam",
                "relationship": "spouse",
                "contact": "555-0100"
            }
        })
    }

    fn authorized(headers: &HeaderMap) -> bool {
        headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            == Some("Bearer tok-1")
    }

    fn unauthorized_response() -> Response {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({"error": "Not authenticated"})),
        )
            .into_response()
    }

    /// Stand-in for the Memento API, bound to an ephemeral port
    async fn spawn_upstream() -> String {
        let app = Router::new()
            .route(
                "/login",
                post(|Json(body): Json<Value>| async move {
                    if body["email"] == "pat@example.com" && body["password"] == "secret1" {
                        Json(json!({"token": TOKEN, "user": mock_user()})).into_response()
                    } else {
                        (
                            StatusCode::UNAUTHORIZED,
                            Json(json!({"error": "Invalid credentials"})),
                        )
                            .into_response()
                    }
                }),
            )
            .route(
                "/me",
                get(|headers: HeaderMap| async move {
                    if authorized(&headers) {
                        Json(mock_user()).into_response()
                    } else {
                        unauthorized_response()
                    }
                }),
            )
            .route(
                "/items",
                get(|headers: HeaderMap| async move {
                    if authorized(&headers) {
                        Json(json!([{
                            "_id": "i1",
                            "title": "Water the plants",
                            "description": "Every Tuesday",
                            "created_at": "2025-01-01T00:00:00Z"
                        }]))
                        .into_response()
                    } else {
                        unauthorized_response()
                    }
                }),
            )
            .route(
                "/people",
                post(|headers: HeaderMap, Json(body): Json<Value>| async move {
                    if !authorized(&headers) {
                        return unauthorized_response();
                    }
                    Json(json!({
                        "_id": "p1",
                        "name": body["name"],
                        "relation": body["relation"],
                        "summary": body["summary"],
                        "photo": body["photo"],
                        "created_at": "2025-01-01T00:00:00Z",
                        "updated_at": "2025-01-01T00:00:00Z"
                    }))
                    .into_response()
                }),
            )
            .route(
                "/conversations/:id",
                get(
                    |headers: HeaderMap, Path(id): Path<String>| async move {
                        if !authorized(&headers) {
                            return unauthorized_response();
                        }
                        if id == "c1" {
                            Json(json!({
                                "_id": "c1",
                                "summary": "Talked about the garden",
                                "transcript": [
                                    {"speaker": "user", "text": "hello"},
                                    {"speaker": "assistant", "text": "hi"}
                                ],
                                "createdAt": "2025-06-01T15:04:00Z"
                            }))
                            .into_response()
                        } else {
                            (
                                StatusCode::NOT_FOUND,
                                Json(json!({"error": "Conversation not found"})),
                            )
                                .into_response()
                        }
                    },
                ),
            );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    async fn test_router() -> Router {
        let base_url = spawn_upstream().await;
        let client = MementoClient::new(&UpstreamConfig { base_url });
        create_router(AppState::new(client))
    }

    fn get_page(uri: &str, cookie: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        builder.body(Body::empty()).unwrap()
    }

    fn post_json(uri: &str, cookie: Option<&str>, body: Value) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn body_text(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn location(response: &Response) -> &str {
        response
            .headers()
            .get(header::LOCATION)
            .unwrap()
            .to_str()
            .unwrap()
    }

    fn set_cookie(response: &Response) -> &str {
        response
            .headers()
            .get(header::SET_COOKIE)
            .unwrap()
            .to_str()
            .unwrap()
    }

    #[tokio::test]
    async fn anonymous_protected_page_redirects_to_login() {
        let app = test_router().await;
        for uri in ["/dashboard", "/people", "/conversations", "/profile"] {
            let response = app.clone().oneshot(get_page(uri, None)).await.unwrap();
            assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT, "{uri}");
            assert_eq!(location(&response), "/login", "{uri}");
        }
    }

    #[tokio::test]
    async fn authenticated_auth_pages_redirect_to_dashboard() {
        let app = test_router().await;
        for uri in ["/", "/login", "/signup"] {
            let response = app
                .clone()
                .oneshot(get_page(uri, Some("token=tok-1")))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT, "{uri}");
            assert_eq!(location(&response), "/dashboard", "{uri}");
        }
    }

    #[tokio::test]
    async fn landing_and_auth_pages_render_for_anonymous() {
        let app = test_router().await;
        for (uri, needle) in [
            ("/", "Memento"),
            ("/login", "Welcome back"),
            ("/signup", "Primary Caregiver Information"),
        ] {
            let response = app.clone().oneshot(get_page(uri, None)).await.unwrap();
            assert_eq!(response.status(), StatusCode::OK, "{uri}");
            let html = body_text(response).await;
            assert!(html.contains(needle), "{uri}");
        }
    }

    #[tokio::test]
    async fn dashboard_renders_user_and_items() {
        let app = test_router().await;
        let response = app
            .oneshot(get_page("/dashboard", Some("token=tok-1")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains("Welcome, Pat"));
        assert!(html.contains("Water the plants"));
        assert!(html.contains("Sam"));
    }

    #[tokio::test]
    async fn rejected_token_expires_cookie_and_redirects() {
        let app = test_router().await;
        let response = app
            .oneshot(get_page("/dashboard", Some("token=stale")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(location(&response), "/login");
        let cookie = set_cookie(&response);
        assert!(cookie.starts_with("token="));
        assert!(cookie.contains("Max-Age=0"));
    }

    #[tokio::test]
    async fn login_sets_session_cookie() {
        let app = test_router().await;
        let response = app
            .oneshot(post_json(
                "/api/login",
                None,
                json!({"email": "pat@example.com", "password": "secret1"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let cookie = set_cookie(&response).to_string();
        assert!(cookie.starts_with("token=tok-1"));
        assert!(cookie.contains("SameSite=Strict"));
        assert!(cookie.contains("Path=/"));
        assert!(cookie.contains("Max-Age=604800"));

        let body = body_json(response).await;
        assert_eq!(body["redirect"], "/dashboard");
        assert_eq!(body["user"]["email"], "pat@example.com");
    }

    #[tokio::test]
    async fn login_failure_surfaces_upstream_message() {
        let app = test_router().await;
        let response = app
            .oneshot(post_json(
                "/api/login",
                None,
                json!({"email": "pat@example.com", "password": "wrong"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = body_json(response).await;
        assert_eq!(body["error"], "Invalid credentials");
    }

    #[tokio::test]
    async fn form_encoded_submission_gets_json_error() {
        let app = test_router().await;
        let request = Request::builder()
            .method("POST")
            .uri("/api/login")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from("email=pat%40example.com&password=secret1"))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn logout_clears_cookie() {
        let app = test_router().await;
        let response = app
            .oneshot(post_json("/api/logout", Some("token=tok-1"), json!({})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let cookie = set_cookie(&response);
        assert!(cookie.starts_with("token="));
        assert!(cookie.contains("Max-Age=0"));
        let body = body_json(response).await;
        assert_eq!(body["redirect"], "/");
    }

    #[tokio::test]
    async fn actions_without_cookie_are_unauthorized() {
        let app = test_router().await;
        let response = app
            .oneshot(get_page("/api/items", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = body_json(response).await;
        assert_eq!(body["error"], "Not authenticated");
    }

    #[tokio::test]
    async fn create_person_validates_before_proxying() {
        let app = test_router().await;
        let response = app
            .oneshot(post_json(
                "/api/people",
                Some("token=tok-1"),
                json!({"name": "", "relation": "friend", "summary": "s", "photo": ""}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"], "Name is required");
    }

    #[tokio::test]
    async fn create_person_forwards_bearer_token() {
        use base64::engine::general_purpose::STANDARD;
        use base64::Engine as _;

        let app = test_router().await;
        let photo = format!("data:image/png;base64,{}", STANDARD.encode(b"pixels"));
        let response = app
            .oneshot(post_json(
                "/api/people",
                Some("token=tok-1"),
                json!({
                    "name": "Ana",
                    "relation": "friend",
                    "summary": "Neighbor from the old house",
                    "photo": photo
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["_id"], "p1");
        assert_eq!(body["name"], "Ana");
    }

    #[tokio::test]
    async fn item_create_requires_title() {
        let app = test_router().await;
        let response = app
            .oneshot(post_json(
                "/api/items",
                Some("token=tok-1"),
                json!({"title": "  ", "description": "d"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"], "Title is required");
    }

    #[tokio::test]
    async fn profile_image_rejects_non_image_payload() {
        let app = test_router().await;
        let response = app
            .oneshot(post_json(
                "/api/profile/image",
                Some("token=tok-1"),
                json!({"image": "data:text/plain;base64,aGVsbG8="}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"], "Please upload an image file");
    }

    #[tokio::test]
    async fn conversation_api_passes_through_not_found() {
        let app = test_router().await;
        let response = app
            .oneshot(get_page("/api/conversations/missing", Some("token=tok-1")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = body_json(response).await;
        assert_eq!(body["error"], "Conversation not found");
    }

    #[tokio::test]
    async fn conversation_page_renders_transcript() {
        let app = test_router().await;
        let response = app
            .oneshot(get_page("/conversations/c1", Some("token=tok-1")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains("Talked about the garden"));
        assert!(html.contains("<b>You</b>"));
        assert!(html.contains("2 messages"));
    }

    #[tokio::test]
    async fn missing_conversation_page_is_not_found() {
        let app = test_router().await;
        let response = app
            .oneshot(get_page("/conversations/missing", Some("token=tok-1")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let html = body_text(response).await;
        assert!(html.contains("Conversation not found"));
    }

    #[tokio::test]
    async fn session_endpoint_returns_current_user() {
        let app = test_router().await;
        let response = app
            .clone()
            .oneshot(get_page("/api/session", Some("token=tok-1")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["name"], "Pat");

        // Rejected token clears the cookie alongside the 401
        let response = app
            .oneshot(get_page("/api/session", Some("token=stale")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(set_cookie(&response).contains("Max-Age=0"));
    }
}
