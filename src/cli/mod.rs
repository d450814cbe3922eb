use std::str::FromStr;
use std::time::Duration;

use clap::Parser;
use url::Url;

use crate::error::ClientError;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Host and port of the chat server (e.g., 127.0.0.1:8000)
    #[arg(long, env = "SERVER_HOST", default_value = "127.0.0.1:8000")]
    pub server_host: String,

    /// Path of the WebSocket chat endpoint on the server.
    /// The legacy text-framed endpoint lives at /chat/ws.
    #[arg(long, env = "ENDPOINT_PATH", default_value = "/ws")]
    pub endpoint_path: String,

    /// Inbound frame format (json, text)
    #[arg(long, env = "FRAMING", default_value = "json")]
    pub framing: String,

    /// Seconds to wait after a close or error before reconnecting.
    #[arg(long, env = "RECONNECT_DELAY_SECS", default_value = "2")]
    pub reconnect_delay_secs: u64,
}

impl Args {
    /// Full ws:// URL of the chat endpoint, validated up front so a typo
    /// fails at startup instead of on the first connect attempt.
    pub fn endpoint_url(&self) -> Result<Url, ClientError> {
        let raw = format!("ws://{}{}", self.server_host, self.endpoint_path);
        Url::parse(&raw).map_err(|source| ClientError::InvalidEndpoint { url: raw, source })
    }

    pub fn framing(&self) -> Result<Framing, ClientError> {
        self.framing.parse()
    }

    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_secs(self.reconnect_delay_secs)
    }
}

/// How inbound frames are decoded. The two chat endpoints diverge here:
/// the current one wraps replies in a JSON envelope, the legacy one sends
/// raw text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Framing {
    Json,
    Text,
}

impl FromStr for Framing {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(Framing::Json),
            "text" => Ok(Framing::Text),
            other =>
                Err(ClientError::InvalidArgument {
                    field: "framing",
                    value: other.to_string(),
                }),
        }
    }
}
