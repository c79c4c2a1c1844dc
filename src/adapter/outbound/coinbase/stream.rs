//! Coinbase ticker WebSocket feed.

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};
use tracing::{debug, error, info, trace, warn};

use super::dto::{CoinbaseSubscribe, CoinbaseWsMessage};
use crate::domain::ProductId;
use crate::error::{Error, Result};
use crate::port::{RawTicker, TickerFeed};

/// [`TickerFeed`] over the Coinbase `ticker` channel.
///
/// Heartbeats, subscription acknowledgements and other channels are skipped.
/// The stream does not reconnect; `next_ticker` returns `None` once the
/// socket closes.
pub struct CoinbaseTickerStream {
    url: String,
    ws: Option<WebSocketStream<MaybeTlsStream<TcpStream>>>,
}

impl CoinbaseTickerStream {
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ws: None,
        }
    }

    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.ws.is_some()
    }
}

#[async_trait]
impl TickerFeed for CoinbaseTickerStream {
    async fn connect(&mut self) -> Result<()> {
        info!(url = %self.url, "Connecting to Coinbase feed");
        let (ws_stream, response) = connect_async(self.url.as_str()).await?;
        info!(status = %response.status(), "Coinbase feed connected");
        self.ws = Some(ws_stream);
        Ok(())
    }

    async fn subscribe(&mut self, product_ids: &[ProductId]) -> Result<()> {
        let ws = self.ws.as_mut().ok_or(Error::FeedClosed)?;

        let ids: Vec<String> = product_ids.iter().map(|id| id.as_str().to_string()).collect();
        let json = serde_json::to_string(&CoinbaseSubscribe::ticker(ids.clone()))?;
        info!(products = ?ids, "Subscribing to ticker channel");
        ws.send(Message::Text(json)).await?;
        Ok(())
    }

    async fn next_ticker(&mut self) -> Option<RawTicker> {
        let ws = self.ws.as_mut()?;

        loop {
            match ws.next().await {
                Some(Ok(Message::Text(text))) => {
                    trace!(bytes = text.len(), "Received WebSocket text frame");
                    match serde_json::from_str::<CoinbaseWsMessage>(&text) {
                        Ok(CoinbaseWsMessage::Ticker(raw)) => return Some(raw),
                        Ok(CoinbaseWsMessage::Subscriptions { channels }) => {
                            debug!(channels = channels.len(), "Subscription acknowledged");
                        }
                        Ok(CoinbaseWsMessage::Error { message, reason }) => {
                            warn!(message = %message, reason = ?reason, "Coinbase feed error");
                        }
                        Ok(CoinbaseWsMessage::Other) => {}
                        Err(e) => {
                            warn!(error = %e, bytes = text.len(), "Failed to parse message");
                        }
                    }
                }
                Some(Ok(Message::Ping(data))) => {
                    trace!("Received WebSocket ping");
                    if let Err(e) = ws.send(Message::Pong(data)).await {
                        error!(error = %e, "Failed to send pong");
                        break;
                    }
                }
                Some(Ok(Message::Close(frame))) => {
                    info!(frame = ?frame, "WebSocket closed by server");
                    break;
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    error!(error = %e, "WebSocket error");
                    break;
                }
                None => break,
            }
        }

        self.ws = None;
        None
    }

    fn exchange_name(&self) -> &'static str {
        "Coinbase"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn subscribe_before_connect_fails() {
        let mut stream = CoinbaseTickerStream::new("wss://ws-feed.exchange.coinbase.com");
        let err = stream
            .subscribe(&[ProductId::from("BTC-USD")])
            .await
            .unwrap_err();
        assert!(matches!(err, Error::FeedClosed));
    }

    #[tokio::test]
    async fn unconnected_stream_yields_nothing() {
        let mut stream = CoinbaseTickerStream::new("wss://ws-feed.exchange.coinbase.com");
        assert!(!stream.is_connected());
        assert!(stream.next_ticker().await.is_none());
        assert_eq!(stream.exchange_name(), "Coinbase");
    }
}
