//! HTTP + WebSocket API for peacetalk
//!
//! Endpoints:
//! - GET /health - Health check
//! - GET /state - Current view
//! - POST /account - Register the couple
//! - POST /login, /logout - Session
//! - POST /profile/select - Pick who is at the device
//! - POST /alarm/trigger, /alarm/acknowledge - Alarm
//! - POST /dialogue/start, /dialogue/message, /dialogue/conclude - Road of Peace
//! - WS /ws - Live view updates

use axum::{
    extract::{State, WebSocketUpgrade, ws::{Message, WebSocket}},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};

use crate::core::CoupleApp;
use crate::error::CoupleError;
use crate::types::{CoupleView, Outcome, ProfileId, ProfileInput, RestartTicket};

/// App state shared by all handlers
pub struct AppState {
    pub app: RwLock<CoupleApp>,
    pub update_tx: broadcast::Sender<CoupleView>,
}

/// Register request
#[derive(Debug, Deserialize)]
pub struct AccountRequest {
    pub password: String,
    /// Checked against `password` when present
    pub confirm_password: Option<String>,
    pub profiles: Vec<ProfileInput>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct SelectProfileRequest {
    pub profile_id: String,
}

#[derive(Debug, Deserialize)]
pub struct StartDialogueRequest {
    pub steps: i32,
}

#[derive(Debug, Deserialize)]
pub struct MessageRequest {
    pub content: String,
    #[serde(default)]
    pub is_apology: bool,
    pub apology_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ConcludeRequest {
    pub resolved: bool,
}

/// Response to every command
#[derive(Debug, Serialize)]
pub struct CommandResponse {
    pub outcome: Outcome,
    pub view: CoupleView,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub has_account: bool,
}

/// Error reply: status code plus a JSON `{ error }` body
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

impl From<CoupleError> for ApiError {
    fn from(e: CoupleError) -> Self {
        let status = if e.is_validation() {
            StatusCode::UNPROCESSABLE_ENTITY
        } else {
            tracing::error!(error = %e, "account could not be stored");
            StatusCode::INTERNAL_SERVER_ERROR
        };
        Self::new(status, e.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status, Json(ErrorResponse { error: self.message })).into_response()
    }
}

/// Create the API router
pub fn create_router(app: CoupleApp) -> Router {
    let (update_tx, _) = broadcast::channel(100);
    let state = Arc::new(AppState {
        app: RwLock::new(app),
        update_tx,
    });

    Router::new()
        .route("/health", get(health))
        .route("/state", get(get_state))
        .route("/account", post(create_account))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/profile/select", post(select_profile))
        .route("/alarm/trigger", post(trigger_alarm))
        .route("/alarm/acknowledge", post(acknowledge_alarm))
        .route("/dialogue/start", post(start_dialogue))
        .route("/dialogue/message", post(post_message))
        .route("/dialogue/conclude", post(conclude))
        .route("/ws", get(websocket_handler))
        .with_state(state)
}

/// Health check endpoint
async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let app = state.app.read().await;
    Json(HealthResponse {
        status: "ok".to_string(),
        version: crate::VERSION.to_string(),
        has_account: app.account().is_some(),
    })
}

/// Current view, after running any due restart
async fn get_state(State(state): State<Arc<AppState>>) -> Json<CoupleView> {
    let mut app = state.app.write().await;
    if app.poll().is_some() {
        let _ = state.update_tx.send(app.view());
    }
    Json(app.view())
}

/// Register the couple
async fn create_account(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AccountRequest>,
) -> Result<Json<CommandResponse>, ApiError> {
    let mut app = state.app.write().await;
    match req.confirm_password {
        Some(confirm) => app.register(&req.password, &confirm, &req.profiles)?,
        None => app.create_account(&req.password, &req.profiles)?,
    }
    Ok(respond(&state, &app, Outcome::accepted()))
}

/// Log in with the shared password
async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<CommandResponse>, ApiError> {
    let mut app = state.app.write().await;
    if !app.login(&req.password) {
        return Err(ApiError::new(StatusCode::UNAUTHORIZED, "wrong password"));
    }
    Ok(respond(&state, &app, Outcome::accepted()))
}

async fn logout(State(state): State<Arc<AppState>>) -> Json<CommandResponse> {
    let mut app = state.app.write().await;
    app.logout();
    respond(&state, &app, Outcome::accepted())
}

async fn select_profile(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SelectProfileRequest>,
) -> Json<CommandResponse> {
    let mut app = state.app.write().await;
    let outcome = app.select_profile(&ProfileId::new(req.profile_id));
    respond(&state, &app, outcome)
}

async fn trigger_alarm(State(state): State<Arc<AppState>>) -> Json<CommandResponse> {
    let mut app = state.app.write().await;
    let outcome = app.trigger_alarm();
    respond(&state, &app, outcome)
}

async fn acknowledge_alarm(State(state): State<Arc<AppState>>) -> Json<CommandResponse> {
    let mut app = state.app.write().await;
    let outcome = app.acknowledge_alarm();
    respond(&state, &app, outcome)
}

async fn start_dialogue(
    State(state): State<Arc<AppState>>,
    Json(req): Json<StartDialogueRequest>,
) -> Json<CommandResponse> {
    let mut app = state.app.write().await;
    let outcome = app.start_dialogue(req.steps);
    respond(&state, &app, outcome)
}

/// Post a message; a post that fills the round arms the restart timer
async fn post_message(
    State(state): State<Arc<AppState>>,
    Json(req): Json<MessageRequest>,
) -> Json<CommandResponse> {
    let mut app = state.app.write().await;
    let outcome = app.post_message(&req.content, req.is_apology, req.apology_reason.as_deref());

    // Posts are refused while a restart is pending, so an accepted post that
    // leaves one pending has just scheduled it
    if outcome.is_accepted() {
        if let Some(pending) = app.pending_restart() {
            let delay = app.config().restart_delay.to_std().unwrap_or_default();
            spawn_restart_timer(state.clone(), pending.ticket, delay);
        }
    }
    respond(&state, &app, outcome)
}

async fn conclude(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ConcludeRequest>,
) -> Json<CommandResponse> {
    let mut app = state.app.write().await;
    let outcome = app.conclude(req.resolved);
    respond(&state, &app, outcome)
}

/// Broadcast the new view and wrap it with the outcome
fn respond(state: &AppState, app: &CoupleApp, outcome: Outcome) -> Json<CommandResponse> {
    let view = app.view();
    // No subscribers is fine
    let _ = state.update_tx.send(view.clone());
    Json(CommandResponse { outcome, view })
}

/// Fire `ticket` after `delay`. A ticket that went stale meanwhile is ignored.
fn spawn_restart_timer(state: Arc<AppState>, ticket: RestartTicket, delay: std::time::Duration) {
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        let mut app = state.app.write().await;
        if app.fire_restart(ticket).is_accepted() {
            let _ = state.update_tx.send(app.view());
        }
    });
}

/// WebSocket handler for live updates
async fn websocket_handler(
    State(state): State<Arc<AppState>>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    let rx = state.update_tx.subscribe();
    let initial = state.app.read().await.view();

    ws.on_upgrade(move |socket| async move {
        handle_websocket(socket, initial, rx).await;
    })
}

/// Handle WebSocket connection
async fn handle_websocket(
    mut socket: WebSocket,
    initial: CoupleView,
    mut rx: broadcast::Receiver<CoupleView>,
) {
    if send_view(&mut socket, &initial).await.is_err() {
        return;
    }
    loop {
        match rx.recv().await {
            Ok(view) => {
                if send_view(&mut socket, &view).await.is_err() {
                    break;
                }
            }
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::debug!(skipped, "websocket client lagging");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

async fn send_view(socket: &mut WebSocket, view: &CoupleView) -> Result<(), axum::Error> {
    let json = serde_json::to_string(view).unwrap_or_default();
    socket.send(Message::Text(json)).await
}

/// Run the API server
pub async fn run_server(addr: &str, app: CoupleApp) -> Result<(), Box<dyn std::error::Error>> {
    let router = create_router(app);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "peacetalk API listening");
    println!("🕊 Peace Talk API running on {}", addr);
    println!("  GET  /health             - Health check");
    println!("  GET  /state              - Current view");
    println!("  POST /account            - Register couple");
    println!("  POST /login | /logout    - Session");
    println!("  POST /profile/select     - Select profile");
    println!("  POST /alarm/trigger      - Raise alarm");
    println!("  POST /alarm/acknowledge  - Acknowledge alarm");
    println!("  POST /dialogue/start     - Open Road of Peace");
    println!("  POST /dialogue/message   - Post message");
    println!("  POST /dialogue/conclude  - End dialogue");
    println!("  WS   /ws                 - Live updates");
    axum::serve(listener, router).await?;
    Ok(())
}
