//! Client configuration
//!
//! Parsed from the command line with clap. The server URL is resolved from:
//! 1. first CLI argument
//! 2. `CHAT_SERVER_URL`
//! 3. built-in default

use std::time::Duration;

use clap::Parser;

use crate::controller::DEFAULT_TYPING_TIMEOUT;
use crate::error::AppError;
use crate::transport::Backoff;

/// Default server URL
pub const DEFAULT_SERVER_URL: &str = "ws://127.0.0.1:8080";

/// Environment variable overriding the server URL
pub const SERVER_URL_ENV: &str = "CHAT_SERVER_URL";

/// Channel buffer size for inbound events and intents
pub const CHANNEL_BUFFER_SIZE: usize = 256;

/// First reconnect delay; doubles per failed attempt
pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_secs(1);

/// Upper bound for the reconnect delay
pub const MAX_RECONNECT_DELAY: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub server_url: String,
    pub typing_timeout: Duration,
    pub channel_capacity: usize,
    /// `None` disables reconnecting
    pub reconnect: Option<Backoff>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
            typing_timeout: DEFAULT_TYPING_TIMEOUT,
            channel_capacity: CHANNEL_BUFFER_SIZE,
            reconnect: Some(Backoff::new(DEFAULT_RECONNECT_DELAY, MAX_RECONNECT_DELAY)),
        }
    }
}

/// WebSocket chat client
#[derive(Parser, Debug)]
#[command(name = "live_chat_client")]
#[command(about = "Console client for the live chat server")]
#[command(version)]
pub struct ClientArgs {
    /// Server URL (ws:// or wss://)
    #[arg(env = SERVER_URL_ENV, default_value = DEFAULT_SERVER_URL)]
    pub server_url: String,

    /// Milliseconds of inactivity before we stop reporting as typing
    #[arg(long, default_value = "3000")]
    pub typing_timeout_ms: u64,

    /// Buffer size for inbound events and user commands
    #[arg(long, default_value = "256")]
    pub channel_capacity: usize,

    /// First reconnect delay in milliseconds
    #[arg(long, default_value = "1000")]
    pub reconnect_delay_ms: u64,

    /// Give up after the first disconnect instead of reconnecting
    #[arg(long)]
    pub no_reconnect: bool,
}

impl ClientArgs {
    /// Validate the arguments into a client configuration
    pub fn into_config(self) -> Result<ClientConfig, AppError> {
        let server_url = self.server_url.trim().to_string();
        if !(server_url.starts_with("ws://") || server_url.starts_with("wss://")) {
            return Err(AppError::InvalidConfig(format!(
                "server URL must start with ws:// or wss://, got '{}'",
                server_url
            )));
        }
        if self.channel_capacity == 0 {
            return Err(AppError::InvalidConfig(
                "channel capacity must be at least 1".to_string(),
            ));
        }

        let reconnect = (!self.no_reconnect).then(|| {
            let initial = Duration::from_millis(self.reconnect_delay_ms);
            Backoff::new(initial, MAX_RECONNECT_DELAY.max(initial))
        });

        Ok(ClientConfig {
            server_url,
            typing_timeout: Duration::from_millis(self.typing_timeout_ms),
            channel_capacity: self.channel_capacity,
            reconnect,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<ClientConfig, AppError> {
        let argv = std::iter::once("live_chat_client").chain(args.iter().copied());
        ClientArgs::try_parse_from(argv).unwrap().into_config()
    }

    #[test]
    fn test_flag_defaults_match_config_default() {
        let args = ClientArgs::try_parse_from(["live_chat_client", "ws://127.0.0.1:8080"]).unwrap();
        assert_eq!(args.into_config().unwrap(), ClientConfig::default());
    }

    #[test]
    fn test_server_url_argument() {
        let config = parse(&[" wss://chat.local:5000 "]).unwrap();
        assert_eq!(config.server_url, "wss://chat.local:5000");
        assert_eq!(config.typing_timeout, Duration::from_secs(3));
        assert_eq!(config.channel_capacity, 256);
    }

    #[test]
    fn test_tuning_flags() {
        let config = parse(&[
            "ws://chat.local:5000",
            "--typing-timeout-ms",
            "500",
            "--channel-capacity",
            "8",
            "--reconnect-delay-ms",
            "250",
        ])
        .unwrap();

        assert_eq!(config.typing_timeout, Duration::from_millis(500));
        assert_eq!(config.channel_capacity, 8);
        assert_eq!(
            config.reconnect,
            Some(Backoff::new(Duration::from_millis(250), MAX_RECONNECT_DELAY))
        );

        let config = parse(&["ws://chat.local:5000", "--no-reconnect"]).unwrap();
        assert!(config.reconnect.is_none());
    }

    #[test]
    fn test_rejects_bad_values() {
        let err = parse(&["http://localhost:5000"]).unwrap_err();
        assert!(matches!(err, AppError::InvalidConfig(_)));

        let err = parse(&["ws://localhost:5000", "--channel-capacity", "0"]).unwrap_err();
        assert!(matches!(err, AppError::InvalidConfig(_)));

        assert!(ClientArgs::try_parse_from(["live_chat_client", "--typing-timeout-ms", "soon"]).is_err());
    }
}
