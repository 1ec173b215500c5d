//! TCP IPC server: accept loop and per-connection handler.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio_util::sync::CancellationToken;

use crate::context::AppContext;
use crate::envelope::Envelope;
use crate::ipc::codec::{
    decode_msgpack, encode_msgpack, read_frame, write_frame, MSG_ERROR, MSG_REQUEST, MSG_RESPONSE,
};
use crate::ipc::router::route_request;
use crate::types::{Error, IpcConfig};

/// Decoded request frame payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IpcRequest {
    #[serde(default)]
    pub id: String,
    pub service: String,
    pub method: String,
    #[serde(default)]
    pub body: Value,
    #[serde(default)]
    pub authorization: Option<String>,
}

/// IPC server wrapping the application context.
#[derive(Debug)]
pub struct IpcServer {
    ctx: Arc<AppContext>,
    addr: SocketAddr,
    cancel: CancellationToken,
    ipc_config: IpcConfig,
}

impl IpcServer {
    pub fn new(ctx: Arc<AppContext>, addr: SocketAddr) -> Self {
        let ipc_config = ctx.config().ipc.clone();
        Self {
            ctx,
            addr,
            cancel: CancellationToken::new(),
            ipc_config,
        }
    }

    /// Token that stops the server when cancelled.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Bind and run until cancelled or a fatal error occurs.
    pub async fn serve(&self) -> std::io::Result<()> {
        let listener = TcpListener::bind(self.addr).await?;
        self.serve_listener(listener).await
    }

    /// Run on an already-bound listener.
    pub async fn serve_listener(&self, listener: TcpListener) -> std::io::Result<()> {
        let conn_semaphore = Arc::new(Semaphore::new(self.ipc_config.max_connections));
        tracing::info!(
            "IPC server listening on {} (max_connections={})",
            listener.local_addr()?,
            self.ipc_config.max_connections,
        );

        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => {
                    tracing::info!("IPC server shutting down");
                    break;
                }
                accept = listener.accept() => {
                    let (stream, peer) = accept?;

                    let permit = match conn_semaphore.clone().try_acquire_owned() {
                        Ok(permit) => permit,
                        Err(_) => {
                            tracing::warn!(
                                "Connection from {} rejected: at max_connections ({})",
                                peer,
                                self.ipc_config.max_connections,
                            );
                            drop(stream);
                            continue;
                        }
                    };

                    tracing::debug!("IPC connection from {} (active={})",
                        peer,
                        self.ipc_config.max_connections - conn_semaphore.available_permits(),
                    );
                    let ctx = self.ctx.clone();
                    let cancel = self.cancel.clone();
                    let ipc_config = self.ipc_config.clone();
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(stream, ctx, cancel, ipc_config, permit).await {
                            tracing::warn!("Connection from {} error: {}", peer, e);
                        }
                    });
                }
            }
        }
        Ok(())
    }

    /// Request graceful shutdown.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }
}

/// Authorize, route and wrap one request. Always yields an envelope.
pub async fn process_request(ctx: &AppContext, request: IpcRequest) -> Envelope {
    if let Err(err) = ctx.guard().check(request.authorization.as_deref()) {
        tracing::warn!(service = %request.service, "Rejected unauthorized request");
        return Envelope::failure(&err);
    }
    let body = match request.body {
        Value::Null => Value::Object(serde_json::Map::new()),
        other => other,
    };
    Envelope::from_result(route_request(ctx, &request.service, &request.method, body).await)
}

/// Handle a single TCP connection: read frames, route, write responses.
async fn handle_connection(
    stream: tokio::net::TcpStream,
    ctx: Arc<AppContext>,
    cancel: CancellationToken,
    ipc_config: IpcConfig,
    _permit: OwnedSemaphorePermit,
) -> std::io::Result<()> {
    let (mut reader, mut writer) = stream.into_split();
    let read_timeout = Duration::from_secs(ipc_config.read_timeout_secs);
    let write_timeout = Duration::from_secs(ipc_config.write_timeout_secs);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            frame_result = tokio::time::timeout(read_timeout, read_frame(&mut reader, ipc_config.max_frame_bytes)) => {
                let frame = match frame_result {
                    Err(_elapsed) => {
                        tracing::debug!("Read timeout ({}s), dropping connection", ipc_config.read_timeout_secs);
                        break;
                    }
                    Ok(result) => match result? {
                        Some(f) => f,
                        None => break,
                    },
                };

                let (msg_type, payload_bytes) = frame;
                let (id, envelope) = if msg_type != MSG_REQUEST {
                    let err = Error::validation(format!("Unexpected message type: 0x{:02X}", msg_type));
                    (String::new(), Envelope::failure(&err))
                } else {
                    match decode_msgpack::<IpcRequest>(&payload_bytes) {
                        Ok(request) => {
                            let id = request.id.clone();
                            (id, process_request(&ctx, request).await)
                        }
                        Err(message) => (String::new(), Envelope::failure(&Error::validation(message))),
                    }
                };

                let frame_type = if envelope.success { MSG_RESPONSE } else { MSG_ERROR };
                let encoded = encode_msgpack(&envelope.to_value_with_id(&id))?;
                timed_write(&mut writer, frame_type, &encoded, write_timeout).await?;
            }
        }
    }

    Ok(())
}

/// Write a frame with a timeout. Returns an error if the write takes too long.
async fn timed_write<W: tokio::io::AsyncWriteExt + Unpin>(
    writer: &mut W,
    msg_type: u8,
    payload: &[u8],
    timeout: Duration,
) -> std::io::Result<()> {
    tokio::time::timeout(timeout, write_frame(writer, msg_type, payload))
        .await
        .map_err(|_| {
            tracing::warn!("Write timeout ({}s), dropping connection", timeout.as_secs());
            std::io::Error::new(std::io::ErrorKind::TimedOut, "write timeout")
        })?
}
