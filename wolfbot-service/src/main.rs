// Copyright (C) 2026 StarHuntingGames
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

use std::{collections::HashMap, net::SocketAddr, sync::Arc, time::Duration};

use anyhow::Context;
use async_trait::async_trait;
use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{debug, info, warn};
use wolfbot_core::{
    COMMANDS, ChatEvent, CommandSpec, GameRules, Outbound, Phase, Session, SessionSnapshot,
    expand_env_vars,
};

type SharedSession = Arc<tokio::sync::Mutex<Session>>;

const DEFAULT_RELAY_TIMEOUT_MS: u64 = 2000;

#[derive(Clone)]
struct AppState {
    rooms: Arc<tokio::sync::Mutex<HashMap<String, SharedSession>>>,
    rules: GameRules,
    seed: Option<u64>,
    relay: Arc<dyn OutboundRelay>,
    relay_timeout: Duration,
}

impl AppState {
    fn new(
        rules: GameRules,
        seed: Option<u64>,
        relay: Arc<dyn OutboundRelay>,
        relay_timeout: Duration,
    ) -> Self {
        Self {
            rooms: Arc::new(tokio::sync::Mutex::new(HashMap::new())),
            rules,
            seed,
            relay,
            relay_timeout,
        }
    }

    /// The room's session, created on first contact. The whole session is
    /// the lock; every event for a room is handled under it.
    async fn room_session(&self, room: &str) -> SharedSession {
        let mut rooms = self.rooms.lock().await;
        rooms
            .entry(room.to_string())
            .or_insert_with(|| {
                let seed = self.seed.unwrap_or_else(rand::random);
                info!(room = %room, seed, "room session created");
                Arc::new(tokio::sync::Mutex::new(Session::new(
                    self.rules.clone(),
                    seed,
                )))
            })
            .clone()
    }

    async fn existing_session(&self, room: &str) -> Option<SharedSession> {
        self.rooms.lock().await.get(room).cloned()
    }

    /// Forget a room whose session holds no game, unless another request
    /// has picked the session up in the meantime.
    async fn release_if_idle(&self, room: &str, session: &SharedSession) {
        let mut rooms = self.rooms.lock().await;
        let Some(current) = rooms.get(room) else {
            return;
        };
        // The map and the caller are the only holders.
        if !Arc::ptr_eq(current, session) || Arc::strong_count(session) > 2 {
            return;
        }
        let idle = session
            .try_lock()
            .map(|session| session.is_idle())
            .unwrap_or(false);
        if idle {
            rooms.remove(room);
            debug!(room = %room, "idle room session dropped");
        }
    }
}

/// Hands the moderator's lines to whatever speaks in the chat room.
#[async_trait]
trait OutboundRelay: Send + Sync {
    async fn deliver(&self, room: &str, messages: &[Outbound]) -> anyhow::Result<()>;
}

#[derive(Clone)]
struct HttpOutboundRelay {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl HttpOutboundRelay {
    fn from_env(timeout: Duration) -> Option<Self> {
        let base_url = std::env::var("CHAT_GATEWAY_BASE_URL")
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())?;

        Some(Self {
            client: reqwest::Client::new(),
            base_url,
            timeout,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }
}

#[async_trait]
impl OutboundRelay for HttpOutboundRelay {
    async fn deliver(&self, room: &str, messages: &[Outbound]) -> anyhow::Result<()> {
        let url = self.endpoint(&format!("v1/rooms/{room}/messages"));
        let response = self
            .client
            .post(url)
            .timeout(self.timeout)
            .json(&serde_json::json!({ "messages": messages }))
            .send()
            .await
            .context("failed to call chat gateway")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<response body unavailable>".to_string());
            anyhow::bail!("chat gateway returned {status}: {body}");
        }

        Ok(())
    }
}

/// Used when no gateway is configured.
struct LoggingRelay;

#[async_trait]
impl OutboundRelay for LoggingRelay {
    async fn deliver(&self, room: &str, messages: &[Outbound]) -> anyhow::Result<()> {
        for message in messages {
            match message {
                Outbound::Public { text } => info!(room = %room, text = %text, "say"),
                Outbound::Private { to, text } => {
                    info!(room = %room, to = %to, text = %text, "whisper")
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct EventRequest {
    event: ChatEvent,
    #[serde(default)]
    received_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct EventResponse {
    room: String,
    phase: Phase,
    messages: Vec<Outbound>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| {
            "wolfbot_service=debug,wolfbot_core=info,tower_http=info".to_string()
        }))
        .init();

    let rules = load_rules().unwrap_or_default();
    info!(
        min_players = rules.min_players(),
        starter_timeout_seconds = rules.starter_timeout_seconds(),
        "game rules loaded"
    );
    let seed = parse_seed(std::env::var("WOLFBOT_SEED").ok())?;
    let relay_timeout = Duration::from_millis(
        std::env::var("CHAT_GATEWAY_TIMEOUT_MS")
            .ok()
            .and_then(|value| value.trim().parse().ok())
            .unwrap_or(DEFAULT_RELAY_TIMEOUT_MS),
    );

    let relay: Arc<dyn OutboundRelay> = match HttpOutboundRelay::from_env(relay_timeout) {
        Some(relay) => {
            info!(base_url = %relay.base_url, "relaying outbound messages to chat gateway");
            Arc::new(relay)
        }
        None => {
            info!("CHAT_GATEWAY_BASE_URL not set; outbound messages are only logged");
            Arc::new(LoggingRelay)
        }
    };

    let app = build_router(AppState::new(rules, seed, relay, relay_timeout));

    let bind_addr = parse_bind_addr("WOLFBOT_BIND", "0.0.0.0:8080")?;
    info!(%bind_addr, "wolfbot-service listening");
    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/v1/commands", get(list_commands_handler))
        .route("/v1/rooms/{room}", get(get_room_handler))
        .route("/v1/rooms/{room}/events", post(room_event_handler))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

fn load_rules() -> Option<GameRules> {
    let path = std::env::var("WOLFBOT_RULES_PATH")
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())?;

    let raw = match std::fs::read_to_string(&path) {
        Ok(raw) => raw,
        Err(error) => {
            warn!(path = %path, error = %error, "failed to read game rules file");
            return None;
        }
    };

    match parse_rules(&raw) {
        Ok(rules) => Some(rules),
        Err(error) => {
            warn!(path = %path, error = %error, "failed to parse game rules yaml");
            None
        }
    }
}

fn parse_rules(raw: &str) -> anyhow::Result<GameRules> {
    if raw.trim().is_empty() {
        anyhow::bail!("game rules file is empty");
    }
    serde_yaml::from_str(&expand_env_vars(raw)).context("invalid game rules")
}

fn parse_seed(value: Option<String>) -> anyhow::Result<Option<u64>> {
    match value.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(raw) => raw
            .parse()
            .map(Some)
            .context(format!("invalid WOLFBOT_SEED {raw:?}")),
    }
}

fn parse_bind_addr(var_name: &str, default: &str) -> anyhow::Result<SocketAddr> {
    let value = std::env::var(var_name)
        .ok()
        .unwrap_or_else(|| default.to_string());
    value.parse().context(format!("invalid {var_name}"))
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({"ok": true, "service": "wolfbot-service"}))
}

async fn list_commands_handler() -> Json<Vec<CommandSpec>> {
    Json(COMMANDS.to_vec())
}

async fn get_room_handler(
    State(state): State<AppState>,
    Path(room): Path<String>,
) -> Result<Json<SessionSnapshot>, ApiError> {
    let session = state
        .existing_session(&room)
        .await
        .ok_or_else(|| ApiError::not_found(format!("room {room} has no session")))?;
    let snapshot = session.lock().await.snapshot();
    Ok(Json(snapshot))
}

async fn room_event_handler(
    State(state): State<AppState>,
    Path(room): Path<String>,
    Json(request): Json<EventRequest>,
) -> Result<Json<EventResponse>, ApiError> {
    validate_event(&request.event)?;
    let at = request.received_at.unwrap_or_else(Utc::now);

    let lock = state.room_session(&room).await;
    let mut session = lock.lock().await;
    let messages = session.handle(&request.event, at);
    let phase = session.phase();
    debug!(room = %room, actor = %request.event.actor(), ?phase, outbound = messages.len(), "event handled");

    // Still under the room lock, so lines reach the gateway in game order.
    if !messages.is_empty() {
        let delivery = state.relay.deliver(&room, &messages);
        match tokio::time::timeout(state.relay_timeout, delivery).await {
            Ok(Ok(())) => {}
            Ok(Err(error)) => {
                warn!(room = %room, error = %error, "failed to relay outbound messages")
            }
            Err(_) => warn!(
                room = %room,
                timeout_ms = state.relay_timeout.as_millis() as u64,
                "relaying outbound messages timed out"
            ),
        }
    }
    drop(session);
    state.release_if_idle(&room, &lock).await;

    Ok(Json(EventResponse {
        room,
        phase,
        messages,
    }))
}

fn validate_event(event: &ChatEvent) -> Result<(), ApiError> {
    let names: Vec<&str> = match event {
        ChatEvent::NickChange { old, new } => vec![old.as_str(), new.as_str()],
        other => vec![other.actor()],
    };
    if names.iter().any(|name| name.trim().is_empty()) {
        return Err(ApiError::bad_request("participant names must not be empty"));
    }
    if let ChatEvent::Message { text, .. } = event
        && text.trim().is_empty()
    {
        return Err(ApiError::bad_request("message text must not be empty"));
    }
    Ok(())
}

#[derive(Debug)]
struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }

    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        warn!(status = %self.status, message = %self.message, "request failed");
        (
            self.status,
            Json(serde_json::json!({"error": self.message})),
        )
            .into_response()
    }
}
