//! Configuration and CLI argument handling

use std::{path::PathBuf, time::Duration};

use clap::Parser;

use crate::state::{Viewport, WidgetSize};

/// CLI argument parsing structure
#[derive(Parser, Debug, Clone)]
#[command(name = "pomodoro-dock")]
#[command(about = "A state-managed HTTP server for a focus timer and its floating widget")]
#[command(version)]
pub struct Config {
    /// Port to bind the server to
    #[arg(short, long, default_value = "20554")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Directory holding the timer snapshot and widget position
    #[arg(short, long, default_value = ".pomodoro-dock")]
    pub data_dir: PathBuf,

    /// Base URL of the API that stores time records and lists tasks
    #[arg(long, default_value = "http://127.0.0.1:8000/api")]
    pub api_url: String,

    /// Bearer token for the API
    #[arg(long, env = "POMODORO_API_TOKEN", hide_env_values = true)]
    pub api_token: Option<String>,

    /// Request timeout for API calls in seconds
    #[arg(long, default_value = "10", value_parser = clap::value_parser!(u64).range(1..))]
    pub api_timeout_secs: u64,

    /// Timer recompute interval in milliseconds
    #[arg(long, default_value = "1000", value_parser = clap::value_parser!(u64).range(50..))]
    pub tick_ms: u64,

    /// Viewport width assumed until a client reports one
    #[arg(long, default_value = "1280")]
    pub viewport_width: f64,

    /// Viewport height assumed until a client reports one
    #[arg(long, default_value = "800")]
    pub viewport_height: f64,

    /// Widget width assumed until a client measures it
    #[arg(long, default_value = "240")]
    pub widget_width: f64,

    /// Widget height assumed until a client measures it
    #[arg(long, default_value = "96")]
    pub widget_height: f64,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
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

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    pub fn api_timeout(&self) -> Duration {
        Duration::from_secs(self.api_timeout_secs)
    }

    pub fn viewport(&self) -> Viewport {
        Viewport {
            width: self.viewport_width,
            height: self.viewport_height,
        }
    }

    pub fn widget_size(&self) -> WidgetSize {
        WidgetSize {
            width: self.widget_width,
            height: self.widget_height,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::try_parse_from(["pomodoro-dock"]).unwrap();
        assert_eq!(config.address(), "127.0.0.1:20554");
        assert_eq!(config.tick_interval(), Duration::from_secs(1));
        assert_eq!(config.api_timeout(), Duration::from_secs(10));
        assert_eq!(config.log_level(), "info");
        assert_eq!(config.viewport().width, 1280.0);
        assert_eq!(config.widget_size().height, 96.0);
    }

    #[test]
    fn test_overrides() {
        let config = Config::try_parse_from([
            "pomodoro-dock",
            "--port",
            "9000",
            "--data-dir",
            "/tmp/dock",
            "--tick-ms",
            "250",
            "--api-timeout-secs",
            "3",
            "-v",
        ])
        .unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.data_dir, PathBuf::from("/tmp/dock"));
        assert_eq!(config.tick_interval(), Duration::from_millis(250));
        assert_eq!(config.api_timeout(), Duration::from_secs(3));
        assert_eq!(config.log_level(), "debug");
    }

    #[test]
    fn test_tick_interval_has_a_floor() {
        assert!(Config::try_parse_from(["pomodoro-dock", "--tick-ms", "5"]).is_err());
        assert!(Config::try_parse_from(["pomodoro-dock", "--api-timeout-secs", "0"]).is_err());
    }
}
