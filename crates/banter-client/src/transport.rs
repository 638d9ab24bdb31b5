//! WebSocket transport for the room session.
//!
//! Provides [`ConnectedSession`] which owns the single socket for one
//! session and bridges it to typed frame channels. This is a thin layer
//! that just sends/receives frames - room semantics stay in the pure
//! [`RoomSession`](crate::RoomSession).

use banter_proto::{ClientFrame, ServerFrame};
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use thiserror::Error;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use url::Url;

/// Transport errors.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Connection could not be established.
    #[error("connection failed: {0}")]
    Connect(String),

    /// Socket I/O failed.
    #[error("stream error: {0}")]
    Stream(String),

    /// Frame could not be put on the wire.
    #[error("protocol error: {0}")]
    Protocol(String),
}

/// Frames buffered per direction before backpressure applies.
const CHANNEL_CAPACITY: usize = 32;

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Handle to a connected room session transport.
///
/// Frames are exchanged via the channels; an internal task owns the socket
/// I/O. Dropping the handle aborts the task and with it the socket, so a
/// session cannot leak its connection on any exit path.
pub struct ConnectedSession {
    /// Send frames to the room service.
    pub to_server: mpsc::Sender<ClientFrame>,
    /// Receive frames from the room service.
    pub from_server: mpsc::Receiver<ServerFrame>,
    /// Abort handle to stop the connection task.
    abort_handle: tokio::task::AbortHandle,
}

impl ConnectedSession {
    /// Stop the connection.
    pub fn stop(&self) {
        self.abort_handle.abort();
    }
}

impl Drop for ConnectedSession {
    fn drop(&mut self) {
        self.abort_handle.abort();
    }
}

/// Connect to the room service and announce entry.
///
/// Opens the WebSocket and sends the ENTER announcement for `display_name`
/// immediately on open, then spawns the I/O task. A connection that opens
/// but is never confirmed is the state machine's concern; this layer only
/// reports frames.
pub async fn connect(
    endpoint: &str,
    display_name: &str,
) -> Result<ConnectedSession, TransportError> {
    let url = Url::parse(endpoint)
        .map_err(|e| TransportError::Connect(format!("invalid endpoint: {e}")))?;

    let (socket, _response) = connect_async(url.as_str())
        .await
        .map_err(|e| TransportError::Connect(format!("websocket open failed: {e}")))?;

    let (mut sink, stream) = socket.split();

    let announce = ClientFrame::Enter { sender: display_name.to_owned() };
    let text = announce.encode().map_err(|e| TransportError::Protocol(e.to_string()))?;
    sink.send(Message::Text(text))
        .await
        .map_err(|e| TransportError::Stream(format!("entry announcement failed: {e}")))?;

    let (to_server_tx, to_server_rx) = mpsc::channel::<ClientFrame>(CHANNEL_CAPACITY);
    let (from_server_tx, from_server_rx) = mpsc::channel::<ServerFrame>(CHANNEL_CAPACITY);

    let handle = tokio::spawn(run_connection(sink, stream, to_server_rx, from_server_tx));

    Ok(ConnectedSession {
        to_server: to_server_tx,
        from_server: from_server_rx,
        abort_handle: handle.abort_handle(),
    })
}

/// Run the connection, bridging between channels and the socket.
async fn run_connection(
    mut sink: SplitSink<Socket, Message>,
    mut stream: SplitStream<Socket>,
    mut to_server: mpsc::Receiver<ClientFrame>,
    from_server: mpsc::Sender<ServerFrame>,
) {
    loop {
        tokio::select! {
            outbound = to_server.recv() => {
                let Some(frame) = outbound else { break };

                let text = match frame.encode() {
                    Ok(text) => text,
                    Err(error) => {
                        tracing::warn!(%error, "dropping unencodable outbound frame");
                        continue;
                    },
                };

                if let Err(error) = sink.send(Message::Text(text)).await {
                    tracing::warn!(%error, "socket write failed");
                    break;
                }
            },
            inbound = stream.next() => {
                match inbound {
                    Some(Ok(Message::Text(text))) => match ServerFrame::decode(&text) {
                        Ok(frame) => {
                            if from_server.send(frame).await.is_err() {
                                break;
                            }
                        },
                        // One bad frame must never take the session down.
                        Err(error) => {
                            tracing::warn!(%error, raw = %text, "dropping malformed frame");
                        },
                    },
                    Some(Ok(Message::Close(_))) | None => break,
                    // Pings are answered by the library; binary has no
                    // meaning in this protocol.
                    Some(Ok(_)) => {},
                    Some(Err(error)) => {
                        tracing::warn!(%error, "socket read failed");
                        break;
                    },
                }
            },
        }
    }

    let _ = sink.close().await;
}
