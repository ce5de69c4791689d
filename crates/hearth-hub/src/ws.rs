// SPDX-FileCopyrightText: 2026 Hearth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! WebSocket transport for hub sessions.
//!
//! Server -> Client frames are the change messages from [`ChangeMessage`]
//! (one JSON object per text frame). Client -> Server frames carry no
//! meaning and are discarded by the session.
//!
//! [`ChangeMessage`]: crate::message::ChangeMessage

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    Router,
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::Response,
    routing::get,
};
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use hearth_core::{Connection, HearthError};
use tokio_util::sync::CancellationToken;

use crate::hub::Hub;
use crate::session::Session;

/// Shared state for the WebSocket route.
#[derive(Clone)]
pub struct WsState {
    pub hub: Arc<Hub>,
    pub write_timeout: Duration,
    /// Parent token; every session runs on a child of it.
    pub shutdown: CancellationToken,
}

/// An upgraded WebSocket seen as a hub [`Connection`].
pub struct WsConnection {
    sink: SplitSink<WebSocket, Message>,
    stream: SplitStream<WebSocket>,
}

impl WsConnection {
    pub fn new(socket: WebSocket) -> Self {
        let (sink, stream) = socket.split();
        Self { sink, stream }
    }
}

#[async_trait]
impl Connection for WsConnection {
    async fn send_text(&mut self, text: &str) -> Result<(), HearthError> {
        self.sink
            .send(Message::Text(text.to_owned().into()))
            .await
            .map_err(|e| HearthError::Connection {
                message: e.to_string(),
            })
    }

    async fn recv(&mut self) -> Option<String> {
        loop {
            match self.stream.next().await {
                Some(Ok(Message::Text(text))) => return Some(text.as_str().to_owned()),
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => return None,
                // Binary payloads are ignored; ping/pong is handled by the protocol layer.
                Some(Ok(_)) => continue,
            }
        }
    }

    async fn close(&mut self) -> Result<(), HearthError> {
        self.sink.close().await.map_err(|e| HearthError::Connection {
            message: e.to_string(),
        })
    }
}

/// WebSocket upgrade handler.
///
/// Upgrades the HTTP connection and runs one [`Session`] for it.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<WsState>) -> Response {
    ws.on_upgrade(move |socket| async move {
        let session = Session::new(
            state.hub.clone(),
            WsConnection::new(socket),
            state.write_timeout,
        );
        session.run(state.shutdown.child_token()).await;
    })
}

/// Router exposing `GET /ws`.
pub fn router(state: WsState) -> Router {
    Router::new()
        .route("/ws", get(ws_handler))
        .with_state(state)
}
