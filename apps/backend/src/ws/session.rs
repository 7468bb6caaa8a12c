use std::sync::Arc;
use std::time::{Duration, Instant};

use actix::prelude::*;
use actix_web::{web, Error, HttpRequest, HttpResponse};
use actix_web_actors::ws;
use serde::Deserialize;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::AppError;
use crate::errors::ErrorCode;
use crate::state::app_state::AppState;
use crate::ws::protocol::{ClientMsg, Participant, ServerMsg};
use crate::ws::registry::{ConnectionHandle, ConnectionRegistry, Outbound};

const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(20);
const CLIENT_TIMEOUT: Duration = Duration::from_secs(40);

/// `/ws?code=..&player_id=..` or `/ws?code=..&operator=true`.
#[derive(Debug, Deserialize)]
pub struct ConnectQuery {
    pub code: String,
    pub player_id: Option<i64>,
    #[serde(default)]
    pub operator: bool,
}

pub async fn upgrade(
    req: HttpRequest,
    stream: web::Payload,
    query: web::Query<ConnectQuery>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, Error> {
    let query = query.into_inner();
    let (session, participant) = app_state
        .orchestrator()
        .identify_connection(&query.code, query.player_id, query.operator)
        .await
        .map_err(AppError::from)?;

    let ws_session = WsSession::new(session.id, participant, Arc::clone(app_state.registry()));
    ws::start(ws_session, &req, stream)
}

pub struct WsSession {
    conn_id: Uuid,
    session_id: i64,
    participant: Participant,
    registry: Arc<ConnectionRegistry>,
    handle: ConnectionHandle,
    outbound: Option<UnboundedReceiver<Outbound>>,
    last_heartbeat: Instant,
}

impl WsSession {
    fn new(session_id: i64, participant: Participant, registry: Arc<ConnectionRegistry>) -> Self {
        let (handle, outbound) = ConnectionHandle::channel();
        Self {
            conn_id: handle.id(),
            session_id,
            participant,
            registry,
            handle,
            outbound: Some(outbound),
            last_heartbeat: Instant::now(),
        }
    }

    fn send_json(ctx: &mut ws::WebsocketContext<Self>, msg: &ServerMsg) {
        match serde_json::to_string(msg) {
            Ok(payload) => ctx.text(payload),
            Err(err) => warn!(error = %err, "[WS SESSION] failed to serialize outbound message"),
        }
    }

    fn send_error(ctx: &mut ws::WebsocketContext<Self>, code: ErrorCode, message: &str) {
        Self::send_json(
            ctx,
            &ServerMsg::Error {
                code: code.as_str().to_string(),
                message: message.to_string(),
            },
        );
    }

    fn start_heartbeat(&self, ctx: &mut ws::WebsocketContext<Self>) {
        ctx.run_interval(HEARTBEAT_INTERVAL, |actor, ctx| {
            if Instant::now().duration_since(actor.last_heartbeat) > CLIENT_TIMEOUT {
                warn!(
                    conn_id = %actor.conn_id,
                    session_id = actor.session_id,
                    "[WS SESSION] heartbeat timed out"
                );
                ctx.close(Some(ws::CloseReason::from(ws::CloseCode::Normal)));
                ctx.stop();
                return;
            }
            ctx.ping(b"keepalive");
        });
    }
}

impl Actor for WsSession {
    type Context = ws::WebsocketContext<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        self.registry
            .register(self.session_id, self.participant, self.handle.clone());
        if let Some(outbound) = self.outbound.take() {
            ctx.add_stream(UnboundedReceiverStream::new(outbound));
        }

        info!(
            conn_id = %self.conn_id,
            session_id = self.session_id,
            participant = ?self.participant,
            "[WS SESSION] started"
        );
        Self::send_json(
            ctx,
            &ServerMsg::Connected {
                session_id: self.session_id,
                participant: self.participant,
            },
        );
        self.start_heartbeat(ctx);
    }

    fn stopped(&mut self, _ctx: &mut Self::Context) {
        self.registry.unregister(self.conn_id);
        info!(
            conn_id = %self.conn_id,
            session_id = self.session_id,
            "[WS SESSION] stopped"
        );
    }
}

/// Events fanned out through the registry.
impl StreamHandler<Outbound> for WsSession {
    fn handle(&mut self, msg: Outbound, ctx: &mut Self::Context) {
        Self::send_json(ctx, &msg);
    }

    // The sender lives in the registry until `stopped`; nothing to do here.
    fn finished(&mut self, _ctx: &mut Self::Context) {}
}

impl StreamHandler<Result<ws::Message, ws::ProtocolError>> for WsSession {
    fn handle(&mut self, msg: Result<ws::Message, ws::ProtocolError>, ctx: &mut Self::Context) {
        match msg {
            Ok(ws::Message::Ping(payload)) => {
                self.last_heartbeat = Instant::now();
                ctx.pong(&payload);
            }
            Ok(ws::Message::Pong(_)) => {
                self.last_heartbeat = Instant::now();
            }
            Ok(ws::Message::Text(text)) => {
                self.last_heartbeat = Instant::now();
                match serde_json::from_str::<ClientMsg>(&text) {
                    Ok(ClientMsg::Ping) => Self::send_json(ctx, &ServerMsg::Pong),
                    Err(err) => {
                        debug!(conn_id = %self.conn_id, error = %err, "[WS SESSION] unreadable message");
                        Self::send_error(ctx, ErrorCode::BadRequest, "Unrecognized message");
                    }
                }
            }
            Ok(ws::Message::Binary(_)) => {
                self.last_heartbeat = Instant::now();
                Self::send_error(ctx, ErrorCode::BadRequest, "Binary not supported");
            }
            Ok(ws::Message::Close(reason)) => {
                ctx.close(reason);
                ctx.stop();
            }
            Ok(ws::Message::Continuation(_)) | Ok(ws::Message::Nop) => {
                self.last_heartbeat = Instant::now();
            }
            Err(err) => {
                warn!(
                    conn_id = %self.conn_id,
                    session_id = self.session_id,
                    error = %err,
                    "[WS SESSION] protocol error"
                );
                ctx.close(Some(ws::CloseReason::from(ws::CloseCode::Error)));
                ctx.stop();
            }
        }
    }
}
