//! TCP relay server — the wire side of `/simulate/send-packet`'s
//! per-hop forwarding (spec.md §6.2).
//!
//! Each inbound connection carries exactly one JSON [`RelayFrame`], with
//! no length prefix: the sender writes the frame then half-closes, and
//! we read to EOF (bounded by a 5s timeout) rather than look for a
//! delimiter. On a frame with a next hop, we open a fresh connection to
//! that hop's agent and forward the advanced frame; the first hop's
//! connection, on the other hand, was already opened by the controller.

use std::time::Duration;

use sagsin_common::protocol::{node_hostname, RelayFrame, DEFAULT_NODE_TCP_PORT};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::watch;

/// Read timeout for an inbound relay connection.
const READ_TIMEOUT: Duration = Duration::from_secs(5);

/// Bind `0.0.0.0:port` and serve relay frames until `shutdown` fires.
pub async fn serve(node_index: i32, port: u16, mut shutdown: watch::Receiver<bool>) -> anyhow::Result<()> {
    let listener = TcpListener::bind(("0.0.0.0", port)).await?;
    tracing::info!(node_index, port, "relay listening");

    loop {
        tokio::select! {
            accepted = listener.accept() => {
                let (stream, peer) = accepted?;
                tokio::spawn(async move {
                    if let Err(e) = handle_connection(stream).await {
                        tracing::warn!(%peer, error = %e, "relay connection failed");
                    }
                });
            }
            _ = shutdown.changed() => {
                if *shutdown.borrow() {
                    tracing::info!("relay shutting down");
                    return Ok(());
                }
            }
        }
    }
}

async fn handle_connection(mut stream: TcpStream) -> anyhow::Result<()> {
    let mut buf = Vec::new();
    tokio::time::timeout(READ_TIMEOUT, stream.read_to_end(&mut buf)).await??;

    let frame: RelayFrame = serde_json::from_slice(&buf)?;
    tracing::info!(
        session_id = %frame.session_id,
        idx = frame.idx,
        path = ?frame.path,
        "relayed frame received"
    );

    if let Some(next) = frame.advance() {
        let next_node = next.path[next.idx];
        if let Err(e) = forward(next_node, &next).await {
            tracing::warn!(node_id = next_node, error = %e, "forwarding to next hop failed");
        }
    }

    Ok(())
}

async fn forward(node_id: i32, frame: &RelayFrame) -> anyhow::Result<()> {
    let addr = format!("{}:{}", node_hostname(node_id), DEFAULT_NODE_TCP_PORT);
    let mut stream =
        tokio::time::timeout(Duration::from_secs(5), TcpStream::connect(&addr)).await??;
    let payload = serde_json::to_vec(frame)?;
    stream.write_all(&payload).await?;
    stream.shutdown().await?;
    Ok(())
}
