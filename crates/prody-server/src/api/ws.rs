//! WebSocket endpoint
//!
//! Connection lifecycle: `Connecting -> Authenticated -> (rooms) ->
//! Disconnected`. The handshake requires a valid bearer credential
//! (Authorization header or `token` query parameter, both already decoded by
//! the authentication middleware); without one the socket is closed right
//! after the upgrade and never joins a room. An authenticated connection is
//! registered with the broadcaster under the user/org of its claims and a
//! task pumps its event queue into the session until either side hangs up.

use std::sync::Arc;

use actix_web::{Error, HttpMessage, HttpRequest, HttpResponse, Scope, get, web};
use actix_ws::{CloseCode, CloseReason, Message, MessageStream, Session};
use tracing::{debug, info, warn};

use prody_auth::AuthClaims;
use prody_realtime::Broadcaster;

use crate::middleware::auth::AuthContext;
use crate::model::AppState;

#[get("")]
async fn connect(
    req: HttpRequest,
    stream: web::Payload,
    data: web::Data<AppState>,
) -> Result<HttpResponse, Error> {
    let claims = req
        .extensions()
        .get::<AuthContext>()
        .and_then(|context| context.claims.clone());

    let (response, session, msg_stream) = actix_ws::handle(&req, stream)?;

    match claims {
        Some(claims) => {
            let broadcaster = data.broadcaster.clone();
            actix_web::rt::spawn(run_session(broadcaster, claims, session, msg_stream));
        }
        None => {
            // Never reaches Authenticated; force the connection closed
            warn!("websocket handshake rejected: missing or invalid credential");
            actix_web::rt::spawn(close_unauthorized(session));
        }
    }

    Ok(response)
}

async fn close_unauthorized(session: Session) {
    let _ = session
        .close(Some(CloseReason {
            code: CloseCode::Policy,
            description: Some("unauthorized".to_string()),
        }))
        .await;
}

async fn run_session(
    broadcaster: Arc<Broadcaster>,
    claims: AuthClaims,
    mut session: Session,
    mut msg_stream: MessageStream,
) {
    let (connection_id, mut events) = broadcaster.register(&claims.sub, claims.org_id.as_deref());
    info!(
        user = %claims.sub,
        org = ?claims.org_id,
        connections = broadcaster.connection_count(),
        "websocket connected"
    );

    loop {
        tokio::select! {
            event = events.recv() => {
                match event {
                    Some(frame) => {
                        if session.text(frame).await.is_err() {
                            break;
                        }
                    }
                    None => break,
                }
            }
            message = msg_stream.recv() => {
                match message {
                    Some(Ok(Message::Ping(bytes))) => {
                        if session.pong(&bytes).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(reason))) => {
                        debug!(user = %claims.sub, ?reason, "client closed websocket");
                        break;
                    }
                    // Push-only channel; inbound client payloads are ignored
                    Some(Ok(_)) => {}
                    Some(Err(_)) | None => break,
                }
            }
        }
    }

    broadcaster.unregister(connection_id);
    let _ = session.close(None).await;
    info!(user = %claims.sub, "websocket disconnected");
}

pub fn routes() -> Scope {
    web::scope("/ws").service(connect)
}
