//! TCP transport for the decode service.
//!
//! Newline-delimited JSON framing, one task per connection.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::OwnedWriteHalf;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::broadcast;
use tracing::{Instrument, debug, error, info, info_span, warn};

use super::methods::MethodHandler;
use super::protocol::{Request, Response};

/// Longest request line accepted before the rest of it is discarded.
pub const MAX_LINE_BYTES: u64 = 16 * 1024 * 1024;

pub struct Transport {
    listener: TcpListener,
    handler: Arc<MethodHandler>,
}

impl Transport {
    /// Bind the listening socket. Port 0 picks a free port.
    pub async fn bind(bind_addr: SocketAddr, handler: MethodHandler) -> Result<Self> {
        let listener = TcpListener::bind(bind_addr)
            .await
            .with_context(|| format!("Failed to bind RPC listener on {}", bind_addr))?;

        Ok(Self {
            listener,
            handler: Arc::new(handler),
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        self.listener
            .local_addr()
            .context("Failed to read RPC listener address")
    }

    /// Accept connections until the shutdown signal fires.
    pub async fn listen(&self, mut shutdown: broadcast::Receiver<()>) -> Result<()> {
        info!(addr = %self.local_addr()?, "RPC server listening");

        loop {
            tokio::select! {
                accept_result = self.listener.accept() => {
                    match accept_result {
                        Ok((stream, peer_addr)) => {
                            let handler = self.handler.clone();
                            let span = info_span!("rpc_connection", peer = %peer_addr);
                            tokio::spawn(
                                async move {
                                    debug!("Client connected");
                                    let result =
                                        handle_connection(stream, handler, MAX_LINE_BYTES).await;
                                    if let Err(e) = result {
                                        debug!(error = %e, "Connection error");
                                    }
                                    debug!("Client disconnected");
                                }
                                .instrument(span),
                            );
                        }
                        Err(e) => {
                            error!(error = %e, "Failed to accept connection");
                        }
                    }
                }
                _ = shutdown.recv() => {
                    info!("RPC server shutting down");
                    break;
                }
            }
        }

        Ok(())
    }
}

async fn handle_connection(
    stream: TcpStream,
    handler: Arc<MethodHandler>,
    max_line_bytes: u64,
) -> Result<()> {
    let (reader, mut writer) = stream.into_split();
    let mut reader = BufReader::new(reader);
    let mut line = Vec::new();

    loop {
        line.clear();
        let read = (&mut reader)
            .take(max_line_bytes)
            .read_until(b'\n', &mut line)
            .await?;
        if read == 0 {
            break;
        }

        if read as u64 == max_line_bytes && !line.ends_with(b"\n") {
            warn!(limit = max_line_bytes, "Request line too long");
            discard_line(&mut reader, max_line_bytes).await?;
            let response = Response::invalid_request(Value::Null, "request line too long");
            write_response(&mut writer, &response).await?;
            continue;
        }

        let text = String::from_utf8_lossy(&line);
        let trimmed = text.trim();
        if trimmed.is_empty() {
            continue;
        }

        let response = match serde_json::from_str::<Request>(trimmed) {
            Ok(request) => match request.validate() {
                Err(msg) => {
                    warn!(error = msg, "Invalid request");
                    let id = request.id.clone().unwrap_or(Value::Null);
                    Response::invalid_request(id, msg)
                }
                // Notifications are executed but never answered
                Ok(()) if request.is_notification() => {
                    debug!(method = %request.method, "Notification received");
                    handler.handle(request);
                    continue;
                }
                Ok(()) => handler.handle(request),
            },
            Err(e) => {
                warn!(error = %e, "Parse error");
                Response::parse_error()
            }
        };

        write_response(&mut writer, &response).await?;
    }

    Ok(())
}

/// Skip the rest of an oversized line, holding at most `chunk` bytes at once.
async fn discard_line<R: AsyncBufRead + Unpin>(reader: &mut R, chunk: u64) -> Result<()> {
    let mut scratch = Vec::new();
    loop {
        scratch.clear();
        let read = (&mut *reader)
            .take(chunk)
            .read_until(b'\n', &mut scratch)
            .await?;
        if read == 0 || scratch.ends_with(b"\n") {
            return Ok(());
        }
    }
}

async fn write_response(writer: &mut OwnedWriteHalf, response: &Response) -> Result<()> {
    let mut response_json = serde_json::to_string(response)?;
    response_json.push('\n');
    writer.write_all(response_json.as_bytes()).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::context::AppContext;
    use crate::rpc::protocol::INVALID_REQUEST;
    use std::time::Duration;
    use tokio::time::timeout;

    #[tokio::test]
    async fn oversized_line_is_rejected_and_connection_survives() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handler = Arc::new(MethodHandler::new(
            AppContext::new(AppConfig::default()).unwrap(),
        ));

        tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            handle_connection(stream, handler, 64).await
        });

        let stream = TcpStream::connect(addr).await.unwrap();
        let (reader, mut writer) = stream.into_split();
        let mut oversized = "x".repeat(200);
        oversized.push('\n');
        writer.write_all(oversized.as_bytes()).await.unwrap();
        writer
            .write_all(b"{\"jsonrpc\":\"2.0\",\"method\":\"daemon.status\",\"id\":2}\n")
            .await
            .unwrap();

        let mut lines = BufReader::new(reader).lines();
        let first = timeout(Duration::from_secs(1), lines.next_line())
            .await
            .expect("timeout waiting for response")
            .unwrap()
            .expect("first response");
        let second = timeout(Duration::from_secs(1), lines.next_line())
            .await
            .expect("timeout waiting for response")
            .unwrap()
            .expect("second response");

        let first: Response = serde_json::from_str(&first).unwrap();
        assert_eq!(first.error.unwrap().code, INVALID_REQUEST);

        let second: Response = serde_json::from_str(&second).unwrap();
        assert_eq!(second.id, Value::from(2));
        assert!(second.result.is_some());
    }
}
