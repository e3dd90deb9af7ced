use super::pubsub_client::Client;
use crate::transport::message::ServerMessage;
use tokio::sync::mpsc;
use tungstenite::protocol::Message as WsMessage;

#[test]
fn test_client_new() {
    let (tx, _) = mpsc::unbounded_channel::<WsMessage>();
    let (client, _) = Client::new(tx);
    assert!(client.id.starts_with("client-"));
    assert!(!client.ctx.is_done());
}

#[test]
fn test_client_send_serializes_reply() {
    let (tx, mut rx) = mpsc::unbounded_channel::<WsMessage>();
    let (client, _) = Client::new(tx);

    assert!(client.send(&ServerMessage::Acknowledged { id: 3 }));

    let msg = rx.try_recv().unwrap();
    let text = msg.to_text().unwrap();
    let reply: ServerMessage = serde_json::from_str(text).unwrap();
    assert_eq!(reply, ServerMessage::Acknowledged { id: 3 });
}

#[test]
fn test_client_send_after_socket_closed() {
    let (tx, rx) = mpsc::unbounded_channel::<WsMessage>();
    let (client, _) = Client::new(tx);
    drop(rx);
    assert!(!client.send(&ServerMessage::Acknowledged { id: 3 }));
}

#[test]
fn test_request_fetch_and_disconnect() {
    let (tx, _) = mpsc::unbounded_channel::<WsMessage>();
    let (client, mut requests) = Client::new(tx);

    assert!(client.request_fetch());
    assert!(requests.try_recv().is_ok());

    client.disconnect();
    assert!(client.ctx.is_done());
}
