//! HTTP routes.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use whatif_domain::{DomainError, Event, EventUpdate, Player, PlayerId, PlayerUpdate, RunStats};

use crate::app::App;
use crate::infrastructure::ports::RepoError;
use crate::use_cases::auth::{LoginInput, RegisterInput};
use crate::use_cases::players::DEFAULT_PAGE_SIZE;
use crate::use_cases::{
    AuthError, ChoiceOutcome, CreateEventInput, EventError, PlayerError,
};

/// Create all HTTP routes.
pub fn routes() -> Router<Arc<App>> {
    Router::new()
        .route("/health", get(health))
        .route("/api/test-db", get(test_db))
        // Auth
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
        .route("/api/auth/profile/{id}", get(profile))
        .route("/api/auth/me", get(me))
        // Players
        .route("/api/players", get(list_players).post(create_player))
        .route("/api/players/search", get(search_players))
        .route(
            "/api/players/username-available/{username}",
            get(username_available),
        )
        .route("/api/players/{id}", get(get_player).patch(update_player))
        .route("/api/players/{id}/deactivate", post(deactivate_player))
        .route("/api/players/{id}/reactivate", post(reactivate_player))
        // Events
        .route("/api/events", get(list_events).post(create_event))
        .route("/api/events/select", post(select_event))
        .route("/api/events/{code}", get(get_event).patch(update_event))
        .route(
            "/api/events/{code}/choices/{choice_id}",
            post(apply_choice),
        )
        .route("/api/events/{code}/auto", post(apply_random_choice))
}

// =============================================================================
// Envelope
// =============================================================================

/// JSON envelope shared by every API response.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    fn ok(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            message: None,
            data: Some(data),
        })
    }

    fn with_message(message: impl Into<String>, data: T) -> Json<Self> {
        Json(Self {
            success: true,
            message: Some(message.into()),
            data: Some(data),
        })
    }
}

type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiError>;

// =============================================================================
// Health
// =============================================================================

async fn health(State(app): State<Arc<App>>) -> Response {
    let timestamp = Utc::now();
    match app.db.ping().await {
        Ok(_) => Json(serde_json::json!({
            "status": "OK",
            "timestamp": timestamp,
            "database": "Connected",
        }))
        .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Health check could not reach the database");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(serde_json::json!({
                    "status": "ERROR",
                    "timestamp": timestamp,
                    "database": "Disconnected",
                })),
            )
                .into_response()
        }
    }
}

async fn test_db(State(app): State<Arc<App>>) -> Result<Json<serde_json::Value>, ApiError> {
    let current_time = app.db.ping().await?;
    let pool = app.db.pool_stats();
    Ok(Json(serde_json::json!({
        "status": "Database connected successfully",
        "current_time": current_time,
        "pool": pool,
    })))
}

// =============================================================================
// Auth
// =============================================================================

#[derive(Debug, Serialize)]
struct SessionBody {
    user: Player,
    token: String,
}

async fn register(
    State(app): State<Arc<App>>,
    Json(input): Json<RegisterInput>,
) -> Result<(StatusCode, Json<ApiResponse<Player>>), ApiError> {
    let player = app.use_cases.auth.register.execute(input).await?;
    Ok((
        StatusCode::CREATED,
        ApiResponse::with_message("User registered successfully", player),
    ))
}

async fn login(
    State(app): State<Arc<App>>,
    Json(input): Json<LoginInput>,
) -> ApiResult<SessionBody> {
    let result = app.use_cases.auth.login.execute(input).await?;
    Ok(ApiResponse::with_message(
        "Login successful",
        SessionBody {
            user: result.player,
            token: result.token,
        },
    ))
}

async fn profile(State(app): State<Arc<App>>, Path(id): Path<String>) -> ApiResult<Player> {
    let player = app
        .use_cases
        .auth
        .profile
        .execute(&PlayerId::from_string(id))
        .await?;
    Ok(ApiResponse::ok(player))
}

async fn me(State(app): State<Arc<App>>, headers: HeaderMap) -> ApiResult<Player> {
    let token = bearer_token(&headers)
        .ok_or_else(|| ApiError::Unauthorized("Authorization token required".into()))?;
    let player = app.use_cases.auth.profile.for_token(token).await?;
    Ok(ApiResponse::ok(player))
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

// =============================================================================
// Players
// =============================================================================

#[derive(Debug, Deserialize)]
struct CreatePlayerBody {
    username: String,
    #[serde(default)]
    email: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PageQuery {
    limit: Option<u32>,
    offset: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct SearchQuery {
    #[serde(default)]
    q: String,
    limit: Option<u32>,
}

#[derive(Debug, Serialize)]
struct PlayerPage {
    players: Vec<Player>,
    total: u64,
}

#[derive(Debug, Serialize)]
struct Availability {
    username: String,
    available: bool,
}

async fn create_player(
    State(app): State<Arc<App>>,
    Json(body): Json<CreatePlayerBody>,
) -> Result<(StatusCode, Json<ApiResponse<Player>>), ApiError> {
    let player = app
        .use_cases
        .players
        .create_player(body.username, body.email)
        .await?;
    Ok((
        StatusCode::CREATED,
        ApiResponse::with_message("Player created", player),
    ))
}

async fn get_player(State(app): State<Arc<App>>, Path(id): Path<String>) -> ApiResult<Player> {
    let player = app
        .use_cases
        .players
        .get_player_by_id(&PlayerId::from_string(id))
        .await?
        .ok_or_else(player_not_found)?;
    Ok(ApiResponse::ok(player))
}

async fn update_player(
    State(app): State<Arc<App>>,
    Path(id): Path<String>,
    Json(update): Json<PlayerUpdate>,
) -> ApiResult<Player> {
    let player = app
        .use_cases
        .players
        .update_player(&PlayerId::from_string(id), update)
        .await?;
    Ok(ApiResponse::with_message("Player updated", player))
}

async fn deactivate_player(
    State(app): State<Arc<App>>,
    Path(id): Path<String>,
) -> ApiResult<()> {
    if !app
        .use_cases
        .players
        .deactivate_player(&PlayerId::from_string(id))
        .await?
    {
        return Err(player_not_found());
    }
    Ok(ApiResponse::with_message("Player deactivated", ()))
}

async fn reactivate_player(
    State(app): State<Arc<App>>,
    Path(id): Path<String>,
) -> ApiResult<()> {
    if !app
        .use_cases
        .players
        .reactivate_player(&PlayerId::from_string(id))
        .await?
    {
        return Err(player_not_found());
    }
    Ok(ApiResponse::with_message("Player reactivated", ()))
}

async fn list_players(
    State(app): State<Arc<App>>,
    Query(page): Query<PageQuery>,
) -> ApiResult<PlayerPage> {
    let players = app
        .use_cases
        .players
        .get_active_players(
            page.limit.unwrap_or(DEFAULT_PAGE_SIZE),
            page.offset.unwrap_or(0),
        )
        .await?;
    let total = app.use_cases.players.active_player_count().await?;
    Ok(ApiResponse::ok(PlayerPage { players, total }))
}

async fn search_players(
    State(app): State<Arc<App>>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Vec<Player>> {
    let pattern = query.q.trim();
    if pattern.is_empty() {
        return Err(ApiError::BadRequest("Search query is required".into()));
    }
    let players = app
        .use_cases
        .players
        .search_players_by_username(pattern, query.limit.unwrap_or(DEFAULT_PAGE_SIZE))
        .await?;
    Ok(ApiResponse::ok(players))
}

async fn username_available(
    State(app): State<Arc<App>>,
    Path(username): Path<String>,
) -> ApiResult<Availability> {
    let available = app
        .use_cases
        .players
        .is_username_available(&username)
        .await?;
    Ok(ApiResponse::ok(Availability {
        username,
        available,
    }))
}

fn player_not_found() -> ApiError {
    ApiError::NotFound(AuthError::NotFound.to_string())
}

// =============================================================================
// Events
// =============================================================================

#[derive(Debug, Deserialize)]
struct SelectEventBody {
    /// Defaults to `stats.age`.
    age: Option<i32>,
    #[serde(default)]
    stats: RunStats,
    /// Extra named values checked by prerequisites, on top of `stats`.
    #[serde(default)]
    flags: BTreeMap<String, f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ChoiceBody {
    stats: RunStats,
}

async fn create_event(
    State(app): State<Arc<App>>,
    Json(input): Json<CreateEventInput>,
) -> Result<(StatusCode, Json<ApiResponse<Event>>), ApiError> {
    let event = app.use_cases.events.create_event(input).await?;
    Ok((
        StatusCode::CREATED,
        ApiResponse::with_message("Event created", event),
    ))
}

async fn list_events(State(app): State<Arc<App>>) -> ApiResult<Vec<Event>> {
    Ok(ApiResponse::ok(app.use_cases.events.list_active().await?))
}

async fn get_event(State(app): State<Arc<App>>, Path(code): Path<String>) -> ApiResult<Event> {
    let event = app
        .use_cases
        .events
        .get_event(&code)
        .await?
        .ok_or_else(|| EventError::NotFound(code))?;
    Ok(ApiResponse::ok(event))
}

async fn update_event(
    State(app): State<Arc<App>>,
    Path(code): Path<String>,
    Json(update): Json<EventUpdate>,
) -> ApiResult<Event> {
    let event = app.use_cases.events.update_event(&code, update).await?;
    Ok(ApiResponse::with_message("Event updated", event))
}

async fn select_event(
    State(app): State<Arc<App>>,
    Json(body): Json<SelectEventBody>,
) -> ApiResult<Event> {
    let age = match body.age {
        Some(age) => age,
        None => whole_years(body.stats.age)
            .ok_or_else(|| ApiError::BadRequest("Age is out of range".into()))?,
    };
    let mut known = body.stats.as_map();
    known.extend(body.flags);

    match app.use_cases.events.select_event(age, &known).await? {
        Some(event) => Ok(ApiResponse::ok(event)),
        None => Ok(Json(ApiResponse {
            success: true,
            message: Some("No eligible event".into()),
            data: None,
        })),
    }
}

fn whole_years(age: f64) -> Option<i32> {
    let years = age.floor();
    (years.is_finite() && years >= f64::from(i32::MIN) && years <= f64::from(i32::MAX))
        .then_some(years as i32)
}

async fn apply_choice(
    State(app): State<Arc<App>>,
    Path((code, choice_id)): Path<(String, String)>,
    Json(body): Json<ChoiceBody>,
) -> ApiResult<ChoiceOutcome> {
    let outcome = app
        .use_cases
        .events
        .apply_choice(&code, &choice_id, body.stats)
        .await?;
    Ok(ApiResponse::ok(outcome))
}

async fn apply_random_choice(
    State(app): State<Arc<App>>,
    Path(code): Path<String>,
    Json(body): Json<ChoiceBody>,
) -> ApiResult<ChoiceOutcome> {
    let outcome = app
        .use_cases
        .events
        .apply_random_choice(&code, body.stats)
        .await?;
    Ok(ApiResponse::ok(outcome))
}

// =============================================================================
// Errors
// =============================================================================

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Unauthorized(String),
    NotFound(String),
    Conflict(String),
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ApiError::Internal(detail) => {
                tracing::error!(error = %detail, "Request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };
        let body = ApiResponse::<()> {
            success: false,
            message: Some(message),
            data: None,
        };
        (status, Json(body)).into_response()
    }
}

impl From<RepoError> for ApiError {
    fn from(e: RepoError) -> Self {
        ApiError::Internal(e.to_string())
    }
}

impl From<DomainError> for ApiError {
    fn from(e: DomainError) -> Self {
        match e.validation_message() {
            Some(msg) => ApiError::BadRequest(msg.to_string()),
            None => ApiError::BadRequest(e.to_string()),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        let message = e.to_string();
        match e {
            AuthError::InvalidInput(msg) => ApiError::BadRequest(msg),
            AuthError::UsernameTaken => ApiError::Conflict(message),
            AuthError::InvalidCredentials => ApiError::Unauthorized(message),
            AuthError::NotFound => ApiError::NotFound(message),
            AuthError::Domain(e) => e.into(),
            AuthError::Repo(e) => e.into(),
            AuthError::Credential(e) => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<PlayerError> for ApiError {
    fn from(e: PlayerError) -> Self {
        match e {
            PlayerError::NotFound(_) => player_not_found(),
            PlayerError::UsernameTaken => ApiError::Conflict(AuthError::UsernameTaken.to_string()),
            PlayerError::Domain(e) => e.into(),
            PlayerError::Repo(e) => e.into(),
        }
    }
}

impl From<EventError> for ApiError {
    fn from(e: EventError) -> Self {
        let message = e.to_string();
        match e {
            EventError::NotFound(_) | EventError::ChoiceNotFound { .. } => {
                ApiError::NotFound(message)
            }
            EventError::AlreadyExists(_) => ApiError::Conflict(message),
            EventError::Domain(e) => e.into(),
            EventError::Repo(e) => e.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::config::EngineConfig;
    use crate::infrastructure::sqlite::Database;
    use axum::body::Body;
    use axum::http::{Method, Request};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    async fn router() -> Router {
        let db = Database::in_memory().await.unwrap();
        let config = EngineConfig::from_lookup(|key| {
            (key == "JWT_SECRET").then(|| "test-secret".to_string())
        });
        routes().with_state(Arc::new(App::new(db, &config)))
    }

    async fn send(
        app: &Router,
        method: Method,
        uri: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> (StatusCode, Value) {
        let mut request = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            request = request.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => request
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => request.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
        send(app, Method::GET, uri, None, None).await
    }

    async fn post(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
        send(app, Method::POST, uri, Some(body), None).await
    }

    fn event_body(code: &str) -> Value {
        json!({
            "eventId": code,
            "type": "random",
            "title": "Playground fight",
            "description": "Someone pushes you at recess",
            "minAge": 5,
            "maxAge": 12,
            "choices": [
                { "id": "push", "text": "Push back", "effects": [{ "stat": "social", "delta": -10 }] },
                { "id": "tell", "text": "Tell a teacher", "effects": [{ "stat": "mood", "delta": 5 }],
                  "chainedEventId": "evt_00010" }
            ]
        })
    }

    mod health {
        use super::*;

        #[tokio::test]
        async fn reports_connected_database() {
            let app = router().await;
            let (status, body) = get(&app, "/health").await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body["status"], "OK");
            assert_eq!(body["database"], "Connected");

            let (status, body) = get(&app, "/api/test-db").await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body["status"], "Database connected successfully");
            assert!(body["current_time"].is_string());
        }
    }

    mod auth {
        use super::*;

        fn registration(username: &str) -> Value {
            json!({
                "username": username,
                "email": "alice@example.com",
                "password": "secret123",
                "confirmPassword": "secret123"
            })
        }

        #[tokio::test]
        async fn register_login_and_me() {
            let app = router().await;

            let (status, body) = post(&app, "/api/auth/register", registration("alice")).await;
            assert_eq!(status, StatusCode::CREATED);
            assert_eq!(body["success"], true);
            assert_eq!(body["message"], "User registered successfully");
            assert_eq!(body["data"]["username"], "alice");
            assert!(body["data"].get("passwordHash").is_none());
            let id = body["data"]["id"].as_str().unwrap().to_string();

            let (status, body) = post(
                &app,
                "/api/auth/login",
                json!({ "username": "alice", "password": "secret123" }),
            )
            .await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body["message"], "Login successful");
            assert!(body["data"]["user"]["lastLogin"].is_string());
            let token = body["data"]["token"].as_str().unwrap().to_string();

            let (status, body) =
                send(&app, Method::GET, "/api/auth/me", None, Some(&token)).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body["data"]["id"], id.as_str());

            let (status, body) = get(&app, &format!("/api/auth/profile/{id}")).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body["data"]["username"], "alice");
        }

        #[tokio::test]
        async fn duplicate_username_conflicts() {
            let app = router().await;
            post(&app, "/api/auth/register", registration("alice")).await;

            let (status, body) = post(&app, "/api/auth/register", registration("alice")).await;
            assert_eq!(status, StatusCode::CONFLICT);
            assert_eq!(body["success"], false);
            assert_eq!(body["message"], "Username already exists");
        }

        #[tokio::test]
        async fn form_errors_are_bad_requests() {
            let app = router().await;
            let (status, body) = post(
                &app,
                "/api/auth/register",
                json!({ "username": "alice", "password": "secret123", "confirmPassword": "other123" }),
            )
            .await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body["message"], "Passwords do not match");

            let (status, body) = post(
                &app,
                "/api/auth/register",
                json!({ "username": "bad name", "password": "secret123", "confirmPassword": "secret123" }),
            )
            .await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(
                body["message"],
                "Username can only contain letters, numbers, and underscores"
            );
        }

        #[tokio::test]
        async fn wrong_password_is_unauthorized() {
            let app = router().await;
            post(&app, "/api/auth/register", registration("alice")).await;

            let (status, body) = post(
                &app,
                "/api/auth/login",
                json!({ "username": "alice", "password": "wrong-pass" }),
            )
            .await;
            assert_eq!(status, StatusCode::UNAUTHORIZED);
            assert_eq!(body["message"], "Invalid username or password");
        }

        #[tokio::test]
        async fn me_requires_a_valid_token() {
            let app = router().await;
            let (status, _) = get(&app, "/api/auth/me").await;
            assert_eq!(status, StatusCode::UNAUTHORIZED);

            let (status, _) =
                send(&app, Method::GET, "/api/auth/me", None, Some("garbage")).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED);
        }

        #[tokio::test]
        async fn unknown_profile_is_not_found() {
            let app = router().await;
            let (status, body) = get(&app, "/api/auth/profile/player_missing").await;
            assert_eq!(status, StatusCode::NOT_FOUND);
            assert_eq!(body["message"], "User not found");
        }
    }

    mod players {
        use super::*;

        async fn create(app: &Router, username: &str) -> String {
            let (status, body) = post(app, "/api/players", json!({ "username": username })).await;
            assert_eq!(status, StatusCode::CREATED);
            body["data"]["id"].as_str().unwrap().to_string()
        }

        #[tokio::test]
        async fn lifecycle() {
            let app = router().await;
            let id = create(&app, "carol").await;

            let (status, body) = send(
                &app,
                Method::PATCH,
                &format!("/api/players/{id}"),
                Some(json!({ "email": "carol@example.com" })),
                None,
            )
            .await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body["data"]["email"], "carol@example.com");

            let (status, _) = post(&app, &format!("/api/players/{id}/deactivate"), json!({})).await;
            assert_eq!(status, StatusCode::OK);
            let (status, _) = get(&app, &format!("/api/players/{id}")).await;
            assert_eq!(status, StatusCode::NOT_FOUND);

            let (_, body) = get(&app, "/api/players/username-available/carol").await;
            assert_eq!(body["data"]["available"], true);

            let (status, _) = post(&app, &format!("/api/players/{id}/reactivate"), json!({})).await;
            assert_eq!(status, StatusCode::OK);
            let (status, body) = get(&app, &format!("/api/players/{id}")).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body["data"]["isActive"], true);
        }

        #[tokio::test]
        async fn list_and_search() {
            let app = router().await;
            for name in ["dave", "davina", "erin"] {
                create(&app, name).await;
            }

            let (status, body) = get(&app, "/api/players?limit=2").await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body["data"]["players"].as_array().unwrap().len(), 2);
            assert_eq!(body["data"]["total"], 3);

            let (_, body) = get(&app, "/api/players/search?q=DAV").await;
            let names: Vec<&str> = body["data"]
                .as_array()
                .unwrap()
                .iter()
                .map(|p| p["username"].as_str().unwrap())
                .collect();
            assert_eq!(names, vec!["dave", "davina"]);

            let (status, _) = get(&app, "/api/players/search?q=").await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
        }

        #[tokio::test]
        async fn invalid_update_is_rejected() {
            let app = router().await;
            let id = create(&app, "frank").await;
            let (status, body) = send(
                &app,
                Method::PATCH,
                &format!("/api/players/{id}"),
                Some(json!({ "username": "x" })),
                None,
            )
            .await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body["message"], "Username must be between 3 and 50 characters");
        }

        #[tokio::test]
        async fn unknown_player_cannot_be_deactivated() {
            let app = router().await;
            let (status, _) = post(&app, "/api/players/player_missing/deactivate", json!({})).await;
            assert_eq!(status, StatusCode::NOT_FOUND);
        }
    }

    mod events {
        use super::*;

        #[tokio::test]
        async fn create_fetch_and_list() {
            let app = router().await;
            let (status, body) = post(&app, "/api/events", event_body("evt_00001")).await;
            assert_eq!(status, StatusCode::CREATED);
            assert_eq!(body["data"]["eventId"], "evt_00001");
            assert_eq!(body["data"]["branchWeight"], 1.0);

            let (status, body) = get(&app, "/api/events/evt_00001").await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body["data"]["type"], "random");

            let (_, body) = get(&app, "/api/events").await;
            assert_eq!(body["data"].as_array().unwrap().len(), 1);

            let (status, _) = post(&app, "/api/events", event_body("evt_00001")).await;
            assert_eq!(status, StatusCode::CONFLICT);

            let (status, _) = get(&app, "/api/events/evt_99999").await;
            assert_eq!(status, StatusCode::NOT_FOUND);
        }

        #[tokio::test]
        async fn invalid_event_is_bad_request() {
            let app = router().await;
            let mut body = event_body("evt_00002");
            body["choices"] = json!([]);
            let (status, body) = post(&app, "/api/events", body).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body["message"], "Event must have between 2 and 4 choices");
        }

        #[tokio::test]
        async fn select_respects_age_window() {
            let app = router().await;
            post(&app, "/api/events", event_body("evt_00001")).await;

            let (status, body) = post(&app, "/api/events/select", json!({ "age": 8 })).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body["data"]["eventId"], "evt_00001");

            let (status, body) = post(
                &app,
                "/api/events/select",
                json!({ "stats": { "age": 40 } }),
            )
            .await;
            assert_eq!(status, StatusCode::OK);
            assert!(body.get("data").is_none());
            assert_eq!(body["message"], "No eligible event");
        }

        #[tokio::test]
        async fn choices_apply_effects() {
            let app = router().await;
            post(&app, "/api/events", event_body("evt_00001")).await;

            let (status, body) = post(
                &app,
                "/api/events/evt_00001/choices/tell",
                json!({ "stats": { "age": 8 } }),
            )
            .await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body["data"]["stats"]["mood"], 55.0);
            assert_eq!(body["data"]["stats"]["age"], 9.0);
            assert_eq!(body["data"]["chainedEventId"], "evt_00010");

            let (status, body) = post(
                &app,
                "/api/events/evt_00001/choices/tell",
                json!({ "stats": { "mood": 1e300, "knowledge": 1.7e308, "age": 8.5 } }),
            )
            .await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body["data"]["stats"]["mood"], 100.0);
            assert_eq!(body["data"]["stats"]["age"], 9.5);

            let (status, _) =
                post(&app, "/api/events/evt_00001/choices/run", json!({})).await;
            assert_eq!(status, StatusCode::NOT_FOUND);

            let (status, body) = post(&app, "/api/events/evt_00001/auto", json!({})).await;
            assert_eq!(status, StatusCode::OK);
            let picked = body["data"]["choiceId"].as_str().unwrap();
            assert!(picked == "push" || picked == "tell");
        }

        #[tokio::test]
        async fn deactivated_event_is_not_listed() {
            let app = router().await;
            post(&app, "/api/events", event_body("evt_00001")).await;

            let (status, body) = send(
                &app,
                Method::PATCH,
                "/api/events/evt_00001",
                Some(json!({ "isActive": false })),
                None,
            )
            .await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body["data"]["isActive"], false);

            let (_, body) = get(&app, "/api/events").await;
            assert!(body["data"].as_array().unwrap().is_empty());
        }
    }
}
