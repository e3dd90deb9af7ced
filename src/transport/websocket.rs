use std::io;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::spawn;
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tokio_tungstenite::accept_async;
use tracing::{debug, info, warn};
use tungstenite::protocol::Message as WsMessage;

use crate::broker::{Broker, Message};
use crate::client::Client;
use crate::transport::message::{ClientMessage, ServerMessage};
use crate::utils::error::BrokerError;

/// Consecutive accept failures tolerated before the server gives up.
const MAX_ACCEPT_FAILURES: u32 = 16;
const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

/// Bind `addr` and serve clients. Only returns on a bind failure or when
/// accepting keeps failing.
pub async fn start_websocket_server(addr: &str, broker: Broker) -> io::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!("WebSocket server listening on ws://{addr}");
    serve(listener, broker).await
}

pub async fn serve(listener: TcpListener, broker: Broker) -> io::Result<()> {
    let mut failures = 0;
    loop {
        match listener.accept().await {
            Ok((stream, peer)) => {
                failures = 0;
                debug!(%peer, "accepted connection");
                spawn(handle_connection(stream, broker.clone()));
            }
            Err(e) if is_connection_error(&e) => {
                warn!("Dropped incoming connection: {e}");
            }
            Err(e) => {
                failures += 1;
                if failures >= MAX_ACCEPT_FAILURES {
                    return Err(e);
                }
                // e.g. EMFILE: wait for descriptors to be released
                warn!(failures, "Failed to accept connection: {e}");
                tokio::time::sleep(ACCEPT_BACKOFF).await;
            }
        }
    }
}

/// Errors that concern a single incoming connection, not the listener.
pub(crate) fn is_connection_error(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::ConnectionRefused
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::Interrupted
            | io::ErrorKind::WouldBlock
    )
}

async fn handle_connection(stream: TcpStream, broker: Broker) {
    let ws_stream = match accept_async(stream).await {
        Ok(ws) => ws,
        Err(e) => {
            warn!("WebSocket handshake error: {e}");
            return;
        }
    };

    let (mut ws_sender, mut ws_receiver) = ws_stream.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<WsMessage>();
    let (client, fetches) = Client::new(tx);
    info!(client = %client.id, "connected");

    // broker → client
    let client_id = client.id.clone();
    spawn(async move {
        while let Some(msg) = rx.recv().await {
            if let Err(e) = ws_sender.send(msg).await {
                warn!(client = %client_id, "Failed to send message: {e}");
                break;
            }
        }
        debug!(client = %client_id, "send loop closed");
    });

    spawn(fetch_loop(broker.clone(), client.clone(), fetches));

    while let Some(Ok(msg)) = ws_receiver.next().await {
        if !msg.is_text() {
            continue;
        }
        if let Ok(text) = msg.to_text() {
            handle_message(&broker, &client, text);
        }
    }

    client.disconnect();
    info!(client = %client.id, "disconnected");
}

/// Apply one client frame to the broker and queue the reply.
///
/// `fetch` frames are only recorded here; `fetch_loop` answers them so a
/// client waiting for a delivery can still acknowledge on the same socket.
pub fn handle_message(broker: &Broker, client: &Client, text: &str) {
    let result = match serde_json::from_str::<ClientMessage>(text) {
        Ok(ClientMessage::Fetch) => {
            client.request_fetch();
            return;
        }
        Ok(ClientMessage::Publish { body }) => broker
            .publish(&client.ctx, Message::new(body))
            .map(|id| ServerMessage::Published { id }),
        Ok(ClientMessage::Acknowledge { id }) => broker
            .acknowledge(&client.ctx, id)
            .map(|()| ServerMessage::Acknowledged { id }),
        Ok(ClientMessage::Requeue { id }) => broker
            .requeue(&client.ctx, id)
            .map(|new_id| ServerMessage::Requeued { id, new_id }),
        Err(err) => {
            warn!(client = %client.id, "Invalid client message: {err} | {text}");
            Ok(ServerMessage::bad_request(err.to_string()))
        }
    };

    let reply = result.unwrap_or_else(|err| {
        debug!(client = %client.id, %err, "request rejected");
        ServerMessage::from(&err)
    });
    client.send(&reply);
}

/// Serve the client's fetch requests one at a time until it disconnects.
///
/// A delivery pulled for a client that vanishes before it is written is
/// not lost: it stays pending and its TTL puts it back on the queue.
pub async fn fetch_loop(broker: Broker, client: Client, mut fetches: UnboundedReceiver<()>) {
    loop {
        let request = tokio::select! {
            _ = client.ctx.done() => break,
            request = fetches.recv() => request,
        };
        if request.is_none() {
            break;
        }

        let reply = match broker.subscribe(&client.ctx) {
            Err(err) => ServerMessage::from(&err),
            Ok(deliveries) => tokio::select! {
                _ = client.ctx.done() => break,
                next = deliveries.recv() => match next {
                    Some(delivery) => ServerMessage::from(delivery),
                    None => ServerMessage::from(&BrokerError::Closed),
                },
            },
        };

        if !client.send(&reply) {
            break;
        }
    }
    debug!(client = %client.id, "fetch loop closed");
}
