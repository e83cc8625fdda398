use crate::protocol;
use crate::state::AppState;
use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::Response,
};
use futures::sink::SinkExt;
use futures::stream::StreamExt;

pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// One task per connection: the read half feeds the protocol, a writer task
/// drains the connection's event channel into the socket. The only suspension
/// points in the loop are the receive and the outbound sends.
async fn handle_socket(socket: WebSocket, state: AppState) {
    let (client_id, mut events) = state.registry.register();
    tracing::info!(client = %client_id, "client connected");

    let (mut sink, mut stream) = socket.split();

    let writer = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            let payload = match serde_json::to_string(&event) {
                Ok(payload) => payload,
                Err(e) => {
                    tracing::error!(error = %e, "failed to encode outbound event");
                    continue;
                }
            };
            if sink.send(Message::Text(payload.into())).await.is_err() {
                break;
            }
        }
    });

    while let Some(msg) = stream.next().await {
        match msg {
            Ok(Message::Text(text)) => protocol::process_message(&state, client_id, &text),
            Ok(Message::Close(_)) | Err(_) => break,
            Ok(_) => {}
        }
    }

    // Fault tolerance: a dropped connection releases everything it held so
    // other clients are not starved waiting on orphaned selections.
    protocol::disconnect(&state, client_id);
    writer.abort();
    tracing::info!(client = %client_id, "client disconnected");
}
