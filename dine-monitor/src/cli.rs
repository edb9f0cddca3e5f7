//! Command line interface

use clap::{Args, Parser, Subcommand};
use dine_client::ClientConfig;
use std::path::PathBuf;
use std::time::Duration;

/// Follow the restaurant backend from a terminal
#[derive(Parser, Debug)]
#[command(name = "dine-monitor")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// REST base URL including the `/api` prefix
    #[arg(long, env = "DINE_API_BASE_URL", default_value = "http://localhost:5000/api")]
    pub api_url: String,

    /// Socket origin, when it differs from the API host
    #[arg(long, env = "DINE_SOCKET_URL")]
    pub socket_url: Option<String>,

    /// Skip the realtime channel and rely on polling alone
    #[arg(long)]
    pub no_realtime: bool,

    #[command(flatten)]
    pub login: LoginArgs,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Emit JSON log lines on the console
    #[arg(long, env = "LOG_JSON")]
    pub log_json: bool,

    /// Also write daily rotated JSON logs here
    #[arg(long, env = "DINE_LOG_DIR")]
    pub log_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Args, Debug, Clone, Default)]
pub struct LoginArgs {
    /// Staff email; with a password the monitor signs in before starting
    #[arg(long, env = "DINE_EMAIL")]
    pub email: Option<String>,

    #[arg(long, env = "DINE_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Soft identity cache file
    #[arg(long, env = "DINE_IDENTITY_CACHE")]
    pub identity_cache: Option<PathBuf>,
}

impl LoginArgs {
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (&self.email, &self.password) {
            (Some(email), Some(password)) => Some((email.as_str(), password.as_str())),
            _ => None,
        }
    }
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Follow the kitchen queue
    Kitchen {
        /// Use the faster dashboard refresh
        #[arg(long)]
        dashboard: bool,
    },

    /// Move one item to its next kitchen step and exit
    Advance {
        order_id: String,
        item_id: String,
    },

    /// Follow a table's orders like the customer tracker does
    Track {
        #[command(flatten)]
        table: TableArg,
    },

    /// Follow a single order
    Order { order_id: String },

    /// Cancel an order
    Cancel {
        order_id: String,
        /// Why the order is cancelled
        #[arg(long)]
        reason: String,
    },

    /// Follow the live dashboard counters
    Dashboard,

    /// Follow the signed-in waiter's tables
    Waiter,

    /// Print new-order alerts as they arrive
    Alerts,

    /// Render a payment gateway return query
    PaymentResult {
        /// Query string as received, e.g. `status=success&message=Paid`
        query: String,
        #[arg(long)]
        table_number: Option<u32>,
    },
}

#[derive(Args, Debug, Clone, PartialEq)]
#[group(required = true, multiple = false)]
pub struct TableArg {
    /// Table id
    #[arg(long)]
    pub table_id: Option<String>,

    /// Table number printed on the QR code
    #[arg(long)]
    pub table_number: Option<u32>,
}

impl Cli {
    /// Environment defaults from [`ClientConfig::from_env`], overridden by flags
    pub fn client_config(&self) -> ClientConfig {
        let env = ClientConfig::from_env();
        let mut config = ClientConfig::new(&self.api_url)
            .with_timeout(env.timeout)
            .with_reconnect_backoff(env.reconnect_delay, env.max_reconnect_delay);
        if let Some(url) = &self.socket_url {
            config = config.with_socket_url(url);
        }
        if let Some(path) = &self.login.identity_cache {
            config = config.with_identity_cache(path);
        }
        config
    }
}

/// Poll interval for `kitchen`
pub fn kitchen_interval(dashboard: bool) -> Duration {
    if dashboard {
        dine_client::views::KITCHEN_DASHBOARD_INTERVAL
    } else {
        dine_client::views::KITCHEN_QUEUE_INTERVAL
    }
}
