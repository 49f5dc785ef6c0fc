use crate::signaling::SignalingOutput;
use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use relaymesh_core::SignalMessage;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, error, info, warn};

#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("failed to connect to relay {url}: {source}")]
    Connect {
        url: String,
        #[source]
        source: tokio_tungstenite::tungstenite::Error,
    },
}

/// What the relay connection reports to the session loop.
#[derive(Debug)]
pub enum ChannelEvent {
    Message(SignalMessage),
    Closed,
}

/// Sending side of a [`WsSignalChannel`]; cheap to clone.
#[derive(Clone)]
pub struct WsSignalSender {
    tx: mpsc::UnboundedSender<SignalMessage>,
}

#[async_trait]
impl SignalingOutput for WsSignalSender {
    async fn send_signal(&self, msg: SignalMessage) {
        if self.tx.send(msg).is_err() {
            warn!("Relay connection is gone, dropping outbound signal");
        }
    }
}

/// JSON-over-WebSocket connection to the signaling relay.
pub struct WsSignalChannel;

impl WsSignalChannel {
    pub async fn connect(
        url: &str,
    ) -> Result<(WsSignalSender, mpsc::UnboundedReceiver<ChannelEvent>), ChannelError> {
        let (socket, _) = connect_async(url)
            .await
            .map_err(|source| ChannelError::Connect {
                url: url.to_owned(),
                source,
            })?;
        info!("Connected to relay at {}", url);

        let (mut sink, mut stream) = socket.split();
        let (out_tx, mut out_rx) = mpsc::unbounded_channel::<SignalMessage>();
        let (event_tx, event_rx) = mpsc::unbounded_channel();

        tokio::spawn(async move {
            while let Some(msg) = out_rx.recv().await {
                let json = match msg.to_json() {
                    Ok(json) => json,
                    Err(e) => {
                        error!("Failed to serialize signal message: {}", e);
                        continue;
                    }
                };
                debug!("WS OUT: {}", json);
                if sink.send(Message::Text(json.into())).await.is_err() {
                    break;
                }
            }
            let _ = sink.close().await;
        });

        tokio::spawn(async move {
            while let Some(frame) = stream.next().await {
                match frame {
                    Ok(Message::Text(text)) => match SignalMessage::from_json(text.as_str()) {
                        Ok(msg) => {
                            if event_tx.send(ChannelEvent::Message(msg)).is_err() {
                                break;
                            }
                        }
                        Err(e) => warn!("Invalid signal message from relay: {}", e),
                    },
                    Ok(Message::Close(_)) => break,
                    Ok(_) => {}
                    Err(e) => {
                        warn!("Relay connection error: {}", e);
                        break;
                    }
                }
            }

            info!("Relay connection closed");
            let _ = event_tx.send(ChannelEvent::Closed);
        });

        Ok((WsSignalSender { tx: out_tx }, event_rx))
    }
}
