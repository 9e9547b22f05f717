use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::Response,
};
use futures::{
    sink::SinkExt,
    stream::{SplitSink, StreamExt},
};
use std::collections::HashMap;
use tokio::select;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tokio::time::{interval, Duration};
use tracing::{error, info, warn};

use super::{
    broadcaster::{topics, Broadcaster},
    messages::{ClientMessage, WsMessage},
};

type WsSink = SplitSink<WebSocket, Message>;

/// Handle WebSocket upgrade request
pub async fn websocket_handler(ws: WebSocketUpgrade, State(broadcaster): State<Broadcaster>) -> Response {
    ws.on_upgrade(|socket| handle_socket(socket, broadcaster))
}

/// Per-connection loop: client commands, forwarded topic messages and heartbeats
async fn handle_socket(socket: WebSocket, broadcaster: Broadcaster) {
    let (mut sender, mut receiver) = socket.split();

    // Every subscribed topic forwards into this queue
    let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel::<WsMessage>();
    let mut subscriptions: HashMap<String, JoinHandle<()>> = HashMap::new();

    let mut heartbeat = interval(Duration::from_secs(30));

    info!("WebSocket client connected");

    loop {
        select! {
            msg = receiver.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        if let Err(e) = handle_client_message(
                            &text,
                            &mut subscriptions,
                            &outbound_tx,
                            &mut sender,
                            &broadcaster,
                        ).await {
                            error!("Error handling client message: {}", e);
                            let reply = WsMessage::Error { message: e };
                            if send_json(&mut sender, &reply).await.is_err() {
                                break;
                            }
                        }
                    }
                    Some(Ok(Message::Close(_))) => {
                        info!("WebSocket client disconnected");
                        break;
                    }
                    Some(Ok(Message::Ping(data))) => {
                        if sender.send(Message::Pong(data)).await.is_err() {
                            break;
                        }
                    }
                    Some(Err(e)) => {
                        error!("WebSocket error: {}", e);
                        break;
                    }
                    None => break,
                    _ => {}
                }
            }

            Some(ws_msg) = outbound_rx.recv() => {
                if send_json(&mut sender, &ws_msg).await.is_err() {
                    break;
                }
            }

            _ = heartbeat.tick() => {
                let ping = WsMessage::Ping { timestamp: chrono::Utc::now() };
                if send_json(&mut sender, &ping).await.is_err() {
                    break;
                }
            }
        }
    }

    for (_, task) in subscriptions.drain() {
        task.abort();
    }
    broadcaster.cleanup_empty_channels();

    info!("WebSocket connection closed");
}

async fn send_json(sender: &mut WsSink, message: &WsMessage) -> Result<(), ()> {
    let json = serde_json::to_string(message).map_err(|_| ())?;
    sender.send(Message::Text(json)).await.map_err(|_| ())
}

/// Handle client messages (subscribe/unsubscribe/ping)
async fn handle_client_message(
    text: &str,
    subscriptions: &mut HashMap<String, JoinHandle<()>>,
    outbound: &mpsc::UnboundedSender<WsMessage>,
    sender: &mut WsSink,
    broadcaster: &Broadcaster,
) -> Result<(), String> {
    let client_msg: ClientMessage =
        serde_json::from_str(text).map_err(|e| format!("Invalid message: {}", e))?;

    let response = match client_msg {
        ClientMessage::Subscribe { channel, code } => {
            let topic = build_topic(&channel, &code)?;

            if !subscriptions.contains_key(&topic) {
                let rx = broadcaster.subscribe(&topic);
                let task = tokio::spawn(forward(rx, outbound.clone(), topic.clone()));
                subscriptions.insert(topic.clone(), task);
            }

            info!("Client subscribed to: {}", topic);
            WsMessage::Subscribed { channel, code }
        }
        ClientMessage::Unsubscribe { channel, code } => {
            let topic = build_topic(&channel, &code)?;

            if let Some(task) = subscriptions.remove(&topic) {
                task.abort();
            }

            info!("Client unsubscribed from: {}", topic);
            WsMessage::Unsubscribed { channel, code }
        }
        ClientMessage::Ping => WsMessage::Pong {
            timestamp: chrono::Utc::now(),
        },
    };

    send_json(sender, &response)
        .await
        .map_err(|_| "Failed to send response".to_string())
}

/// Pump one topic into the connection's outbound queue
async fn forward(
    mut rx: broadcast::Receiver<WsMessage>,
    outbound: mpsc::UnboundedSender<WsMessage>,
    topic: String,
) {
    loop {
        match rx.recv().await {
            Ok(msg) => {
                if outbound.send(msg).is_err() {
                    break;
                }
            }
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                warn!(topic = %topic, skipped, "WebSocket subscriber lagged behind");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

/// Build topic string from channel and code
fn build_topic(channel: &str, code: &str) -> Result<String, String> {
    if code.trim().is_empty() {
        return Err(format!("{} channel requires a code", channel));
    }

    match channel {
        "quiz" => Ok(topics::quiz(code)),
        "poll" => Ok(topics::poll(code)),
        _ => Err(format!("Unknown channel: {}", channel)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_topic() {
        assert_eq!(build_topic("quiz", " ab12cd ").unwrap(), "quiz:AB12CD");
        assert_eq!(build_topic("poll", "zz99").unwrap(), "poll:ZZ99");
        assert!(build_topic("orderbook", "X").is_err());
        assert!(build_topic("quiz", "  ").is_err());
    }

    #[tokio::test]
    async fn test_forward_pumps_until_closed() {
        let broadcaster = Broadcaster::new();
        let rx = broadcaster.subscribe("quiz:AB12CD");
        let (tx, mut out) = mpsc::unbounded_channel();

        let task = tokio::spawn(forward(rx, tx, "quiz:AB12CD".to_string()));
        broadcaster.broadcast("quiz:AB12CD", WsMessage::Error { message: "hello".into() });

        let msg = out.recv().await.unwrap();
        assert!(matches!(msg, WsMessage::Error { ref message } if message == "hello"));
        task.abort();
    }
}
