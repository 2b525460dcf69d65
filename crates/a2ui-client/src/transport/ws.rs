//! `tokio-tungstenite` connector.

use async_trait::async_trait;
use futures::{SinkExt, StreamExt, future};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::debug;

use super::{Channel, Connector};
use crate::error::TransportError;

/// Connects over real WebSockets.
///
/// `wss://` targets need the `tls` feature.
#[derive(Clone, Copy, Debug, Default)]
pub struct WsConnector;

#[async_trait]
impl Connector for WsConnector {
    async fn connect(&self, target: &str) -> Result<Channel, TransportError> {
        let (ws, response) = connect_async(target).await?;
        debug!(status = %response.status(), "websocket handshake complete");

        let (sink, stream) = ws.split();
        let sink = sink.with(|text: String| {
            future::ready(Ok::<_, TransportError>(Message::Text(text.into())))
        });
        // Control frames are answered by tungstenite itself; only text
        // frames carry envelopes.
        let stream = stream.filter_map(|msg| {
            future::ready(match msg {
                Ok(Message::Text(text)) => Some(Ok(text.as_str().to_owned())),
                Ok(_) => None,
                Err(e) => Some(Err(TransportError::from(e))),
            })
        });

        Ok(Channel::new(sink, stream))
    }
}
