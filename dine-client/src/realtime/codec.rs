//! Engine.IO v4 / Socket.IO v5 text framing
//!
//! Only what a client in the default namespace needs: the open handshake,
//! heartbeat, namespace connect, and JSON events. Binary attachments and
//! acknowledgements are not used by the backend and are rejected.

use serde_json::Value;
use std::time::Duration;

/// Engine.IO packet types (first character of a frame)
const EIO_OPEN: char = '0';
const EIO_CLOSE: char = '1';
const EIO_PING: char = '2';
const EIO_PONG: char = '3';
const EIO_MESSAGE: char = '4';
const EIO_UPGRADE: char = '5';
const EIO_NOOP: char = '6';

/// Socket.IO packet types (second character of a message frame)
const SIO_CONNECT: char = '0';
const SIO_DISCONNECT: char = '1';
const SIO_EVENT: char = '2';
const SIO_CONNECT_ERROR: char = '4';

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CodecError {
    #[error("empty frame")]
    Empty,
    #[error("unknown packet type {0:?}")]
    UnknownType(char),
    #[error("unsupported packet: {0}")]
    Unsupported(String),
    #[error("malformed payload: {0}")]
    Malformed(String),
}

/// Handshake data the server sends in its open packet
#[derive(Debug, Clone, Default, PartialEq, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenInfo {
    #[serde(default)]
    pub sid: String,
    #[serde(default)]
    pub ping_interval: u64,
    #[serde(default)]
    pub ping_timeout: u64,
}

impl OpenInfo {
    /// How long the server may stay silent before the link counts as dead
    pub fn silence_limit(&self) -> Option<Duration> {
        match self.ping_interval.saturating_add(self.ping_timeout) {
            0 => None,
            ms => Some(Duration::from_millis(ms)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum EnginePacket {
    Open(OpenInfo),
    Close,
    Ping(String),
    Pong(String),
    Message(SocketPacket),
    Upgrade,
    Noop,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SocketPacket {
    Connect(Option<Value>),
    Disconnect,
    Event { name: String, data: Value },
    ConnectError(Value),
}

/// Parse one text frame
pub fn decode(frame: &str) -> Result<EnginePacket, CodecError> {
    let mut chars = frame.chars();
    let kind = chars.next().ok_or(CodecError::Empty)?;
    let rest = chars.as_str();

    match kind {
        EIO_OPEN => serde_json::from_str(rest)
            .map(EnginePacket::Open)
            .map_err(|e| CodecError::Malformed(e.to_string())),
        EIO_CLOSE => Ok(EnginePacket::Close),
        EIO_PING => Ok(EnginePacket::Ping(rest.to_string())),
        EIO_PONG => Ok(EnginePacket::Pong(rest.to_string())),
        EIO_MESSAGE => decode_socket(rest).map(EnginePacket::Message),
        EIO_UPGRADE => Ok(EnginePacket::Upgrade),
        EIO_NOOP => Ok(EnginePacket::Noop),
        other => Err(CodecError::UnknownType(other)),
    }
}

fn decode_socket(packet: &str) -> Result<SocketPacket, CodecError> {
    let mut chars = packet.chars();
    let kind = chars.next().ok_or(CodecError::Empty)?;
    let body = strip_namespace(chars.as_str());

    match kind {
        SIO_CONNECT => Ok(SocketPacket::Connect(parse_optional(body)?)),
        SIO_DISCONNECT => Ok(SocketPacket::Disconnect),
        SIO_EVENT => {
            // an ack id (digits) may precede the array
            let body = body.trim_start_matches(|c: char| c.is_ascii_digit());
            let Value::Array(mut parts) =
                serde_json::from_str(body).map_err(|e| CodecError::Malformed(e.to_string()))?
            else {
                return Err(CodecError::Malformed("event payload is not an array".into()));
            };
            if parts.is_empty() {
                return Err(CodecError::Malformed("event without a name".into()));
            }
            let name = match parts.remove(0) {
                Value::String(name) => name,
                other => return Err(CodecError::Malformed(format!("event name {other}"))),
            };
            let data = if parts.is_empty() {
                Value::Null
            } else {
                parts.remove(0)
            };
            Ok(SocketPacket::Event { name, data })
        }
        SIO_CONNECT_ERROR => Ok(SocketPacket::ConnectError(
            parse_optional(body)?.unwrap_or(Value::Null),
        )),
        other => Err(CodecError::Unsupported(format!("socket packet type {other}"))),
    }
}

/// `/admin,["x"]` -> `["x"]`; the default namespace has no prefix
fn strip_namespace(body: &str) -> &str {
    if body.starts_with('/') {
        body.split_once(',').map(|(_, rest)| rest).unwrap_or("")
    } else {
        body
    }
}

fn parse_optional(body: &str) -> Result<Option<Value>, CodecError> {
    if body.is_empty() {
        return Ok(None);
    }
    serde_json::from_str(body)
        .map(Some)
        .map_err(|e| CodecError::Malformed(e.to_string()))
}

/// Namespace connect for the default namespace
pub fn encode_connect() -> String {
    format!("{EIO_MESSAGE}{SIO_CONNECT}")
}

/// Heartbeat answer; echoes the ping payload if any
pub fn encode_pong(payload: &str) -> String {
    format!("{EIO_PONG}{payload}")
}

/// `42["name",data]`
pub fn encode_event(name: &str, data: &Value) -> String {
    let body = Value::Array(vec![Value::String(name.to_string()), data.clone()]);
    format!("{EIO_MESSAGE}{SIO_EVENT}{body}")
}
