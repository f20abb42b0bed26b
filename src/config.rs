//! Configuration and CLI argument handling

use clap::Parser;

use crate::gateway::DEFAULT_GATEWAY_IDENTIFIER;

/// CLI argument parsing structure
#[derive(Parser, Debug)]
#[command(name = "chat-countdown")]
#[command(about = "A chat-driven countdown timer with tip extensions and a live overlay stream")]
#[command(version = "1.0.0")]
pub struct Config {
    /// Port to bind the server to
    #[arg(short, long, env = "PORT", default_value = "8080")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Webhook that receives outbound `send_message` gateway commands.
    /// Chat replies are only logged when unset.
    #[arg(long, env = "CHAT_WEBHOOK_URL")]
    pub chat_webhook_url: Option<String>,

    /// Gateway channel identifier stamped on outbound commands
    #[arg(long, env = "GATEWAY_IDENTIFIER", default_value = DEFAULT_GATEWAY_IDENTIFIER)]
    pub gateway_identifier: String,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments and the environment
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the server address as a formatted string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::try_parse_from(["chat-countdown"]).unwrap();
        assert_eq!(config.gateway_identifier, DEFAULT_GATEWAY_IDENTIFIER);
        assert_eq!(config.log_level(), "info");
    }

    #[test]
    fn test_overrides() {
        let config = Config::try_parse_from([
            "chat-countdown",
            "--port",
            "9000",
            "--host",
            "127.0.0.1",
            "--chat-webhook-url",
            "http://localhost:3000/chat",
            "-v",
        ])
        .unwrap();

        assert_eq!(config.address(), "127.0.0.1:9000");
        assert_eq!(config.chat_webhook_url.as_deref(), Some("http://localhost:3000/chat"));
        assert_eq!(config.log_level(), "debug");
    }
}
