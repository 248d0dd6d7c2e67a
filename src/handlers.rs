// handlers.rs

use crate::{
    commands::Action,
    devices::Device,
    docs::ApiDoc,
    error::AppError,
    models::{AppState, DeviceStatus, SendCommandRequest, WsMessage},
};
use axum::{
    Json, Router,
    extract::{
        Path, State, WebSocketUpgrade,
        ws::{Message, WebSocket},
    },
    response::IntoResponse,
    routing::{get, post},
};
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::{broadcast::error::RecvError, mpsc};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};
use utoipa::OpenApi;
use uuid::Uuid;

pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/devices", get(list_devices))
        .route("/devices/{name}", get(get_device))
        .route("/devices/{name}/actions/{action}", post(invoke_action))
        .route("/devices/{name}/send_command", post(send_command))
        .route("/ws/client", get(handle_client_ws_upgrade))
        .route("/api-doc/openapi.json", get(openapi))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[utoipa::path(
    get,
    path = "/devices",
    responses((status = 200, description = "Every configured relay", body = [DeviceStatus]))
)]
pub async fn list_devices(State(state): State<Arc<AppState>>) -> Json<Vec<DeviceStatus>> {
    Json(state.statuses())
}

#[utoipa::path(
    get,
    path = "/devices/{name}",
    params(("name" = String, Path, description = "Configured device name")),
    responses(
        (status = 200, body = DeviceStatus),
        (status = 404, description = "No such device")
    )
)]
pub async fn get_device(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Json<DeviceStatus>, AppError> {
    Ok(Json(state.device(&name)?.get_status()))
}

#[utoipa::path(
    post,
    path = "/devices/{name}/actions/{action}",
    params(
        ("name" = String, Path, description = "Configured device name"),
        ("action" = Action, Path, description = "Action to perform")
    ),
    responses(
        (status = 200, description = "Command written", body = DeviceStatus),
        (status = 400, description = "Unknown action"),
        (status = 404, description = "No such device"),
        (status = 502, description = "Relay unreachable")
    )
)]
pub async fn invoke_action(
    State(state): State<Arc<AppState>>,
    Path((name, action)): Path<(String, String)>,
) -> Result<Json<DeviceStatus>, AppError> {
    state.device(&name)?;
    let action: Action = action.parse()?;
    let status = state.run_actions(&name, &[action], 1).await?;
    Ok(Json(status))
}

#[utoipa::path(
    post,
    path = "/devices/{name}/send_command",
    params(("name" = String, Path, description = "Configured device name")),
    request_body = SendCommandRequest,
    responses(
        (status = 200, body = DeviceStatus),
        (status = 404, description = "No such device"),
        (status = 422, description = "Empty command list"),
        (status = 502, description = "Relay unreachable")
    )
)]
pub async fn send_command(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    Json(request): Json<SendCommandRequest>,
) -> Result<Json<DeviceStatus>, AppError> {
    require_commands(&request.command)?;
    let status = state
        .run_actions(&name, &request.command, request.num_repeats)
        .await?;
    Ok(Json(status))
}

pub async fn openapi() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}

pub async fn handle_client_ws_upgrade(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    info!("Client connection attempt");
    ws.on_upgrade(|socket| handle_client(socket, state))
}

fn require_commands(command: &[Action]) -> Result<(), AppError> {
    if command.is_empty() {
        return Err(AppError::Validation("command list is empty".into()));
    }
    Ok(())
}

/// Runs one client request. Returns the error to send back, if any.
async fn handle_client_message(state: &AppState, text: &str) -> Option<WsMessage> {
    let result = match serde_json::from_str::<WsMessage>(text) {
        Ok(WsMessage::Invoke { device, action }) => {
            state.run_actions(&device, &[action], 1).await.map(|_| ())
        }
        Ok(WsMessage::SendCommand {
            device,
            command,
            num_repeats,
        }) => match require_commands(&command) {
            Ok(()) => state
                .run_actions(&device, &command, num_repeats)
                .await
                .map(|_| ()),
            Err(e) => Err(e),
        },
        Ok(_) => Err(AppError::Validation("unsupported message type".into())),
        Err(e) => Err(AppError::Validation(format!("Invalid message format: {e}"))),
    };

    result.err().map(|e| WsMessage::Error {
        message: e.to_string(),
        code: e.status_code().as_u16(),
    })
}

async fn handle_client(socket: WebSocket, state: Arc<AppState>) {
    let client_id = Uuid::new_v4();
    info!(%client_id, "Client connected");

    let (mut sender, mut receiver) = socket.split();
    let mut events = state.events.subscribe();
    let (tx, mut rx) = mpsc::unbounded_channel();

    for status in state.statuses() {
        let _ = tx.send(WsMessage::StatusUpdate(status));
    }

    let send_task = tokio::spawn(async move {
        loop {
            let msg = tokio::select! {
                Some(msg) = rx.recv() => msg,
                event = events.recv() => match event {
                    Ok(msg) => msg,
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(%client_id, skipped, "Client fell behind on events");
                        continue;
                    }
                    Err(RecvError::Closed) => break,
                },
            };

            let text = match serde_json::to_string(&msg) {
                Ok(text) => text,
                Err(e) => {
                    error!(%client_id, "Failed to encode message: {}", e);
                    continue;
                }
            };
            if sender.send(Message::Text(text.into())).await.is_err() {
                break;
            }
        }
    });

    let recv_task = tokio::spawn({
        let state = Arc::clone(&state);
        async move {
            while let Some(Ok(msg)) = receiver.next().await {
                let text = match msg {
                    Message::Text(text) => text,
                    Message::Close(_) => break,
                    _ => continue,
                };
                if let Some(reply) = handle_client_message(&state, text.as_str()).await {
                    let _ = tx.send(reply);
                }
            }
        }
    });

    tokio::pin!(send_task, recv_task);
    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    };

    info!(%client_id, "Client disconnected");
}
