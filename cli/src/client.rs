//! Websocket plumbing shared by every console subcommand.

#[cfg(test)]
#[path = "client_test.rs"]
mod client_test;

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use protocol::{ClientEvent, ServerEvent};
use reqwest::Url;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

use crate::CliError;

pub type HubStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// How long to wait for the hub's opening moderation-list snapshot.
const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(5);

/// Websocket endpoint for an `http(s)://host:port` base URL.
pub fn ws_url(base_url: &str) -> Result<String, CliError> {
    let base = base_url.trim_end_matches('/');
    if let Some(rest) = base.strip_prefix("http://") {
        return Ok(format!("ws://{rest}/ws"));
    }
    if let Some(rest) = base.strip_prefix("https://") {
        return Ok(format!("wss://{rest}/ws"));
    }

    Err(CliError::InvalidBaseUrl(base_url.to_owned()))
}

/// The same base URL pointed at another port, used to follow a listener move.
pub fn with_port(base_url: &str, port: u16) -> Result<String, CliError> {
    let mut url = Url::parse(base_url).map_err(|_| CliError::InvalidBaseUrl(base_url.to_owned()))?;
    url.set_port(Some(port)).map_err(|()| CliError::InvalidBaseUrl(base_url.to_owned()))?;
    Ok(url.as_str().trim_end_matches('/').to_owned())
}

/// Open a hub connection and consume the opening snapshot.
///
/// Returns the stream together with the moderation list the hub sent first.
pub async fn connect(base_url: &str) -> Result<(HubStream, Vec<String>), CliError> {
    let url = ws_url(base_url)?;
    let (mut stream, _) = connect_async(url.as_str())
        .await
        .map_err(|error| CliError::WsConnect(Box::new(error)))?;
    tracing::debug!(%url, "connected to hub");

    loop {
        match recv_next(&mut stream, HANDSHAKE_TIMEOUT).await? {
            ServerEvent::ModerationListSnapshot(list) => return Ok((stream, list.words)),
            other => tracing::debug!(event = other.name(), "event before snapshot skipped"),
        }
    }
}

pub async fn send(stream: &mut HubStream, event: &ClientEvent) -> Result<(), CliError> {
    let text = protocol::encode_client_event(event)?;
    stream
        .send(Message::text(text))
        .await
        .map_err(|error| CliError::WsConnect(Box::new(error)))?;
    tracing::debug!(event = event.name(), "sent");
    Ok(())
}

/// Send one event on a fresh connection and close it.
pub async fn send_once(base_url: &str, event: &ClientEvent) -> Result<(), CliError> {
    let (mut stream, _) = connect(base_url).await?;
    send(&mut stream, event).await?;
    if let Err(error) = stream.close(None).await {
        tracing::debug!(%error, "close handshake failed");
    }
    Ok(())
}

/// Next hub event, skipping frames that do not decode.
pub async fn recv_next(stream: &mut HubStream, timeout: Duration) -> Result<ServerEvent, CliError> {
    tokio::time::timeout(timeout, recv_event(stream))
        .await
        .map_err(|_| CliError::Timeout)?
}

/// Next hub event with no deadline.
pub async fn recv_event(stream: &mut HubStream) -> Result<ServerEvent, CliError> {
    loop {
        let Some(message) = stream.next().await else {
            return Err(CliError::WsClosed);
        };
        match message.map_err(|error| CliError::WsConnect(Box::new(error)))? {
            Message::Text(text) => match protocol::decode_server_event(text.as_str()) {
                Ok(event) => return Ok(event),
                Err(error) => tracing::debug!(%error, "undecodable frame skipped"),
            },
            Message::Close(_) => return Err(CliError::WsClosed),
            _ => {}
        }
    }
}
