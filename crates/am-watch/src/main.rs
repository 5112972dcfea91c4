use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use am_watch::{watcher, SinkConfig, WatchMethod, WatcherConfig};

#[derive(Parser)]
#[command(name = "am-watch", about = "Agent Mail watcher — real-time notification sidecar")]
struct Cli {
    /// Project slug
    #[arg(short, long)]
    project: String,

    /// Agent name
    #[arg(short, long)]
    agent: String,

    /// Watch method: 'file' (signal polling) or 'sse' (streaming)
    #[arg(short, long, default_value = "file")]
    method: String,

    /// Base URL of the relay host
    #[arg(long, default_value = "http://localhost:8765")]
    url: String,

    /// Polling interval in seconds (file mode)
    #[arg(long, default_value_t = 2.0)]
    interval: f64,

    /// Bearer token for the streaming endpoint and inbox fetches
    #[arg(long, env = "AGENT_MAIL_TOKEN")]
    token: Option<String>,

    /// Print an alert line with terminal bell on each new message
    #[arg(long)]
    alert: bool,

    /// Fetch and print the latest inbox message on each notification
    #[arg(long)]
    auto_fetch: bool,

    /// Include the message body in auto-fetch output
    #[arg(long)]
    show_body: bool,

    /// Shell command to run on each notification (env: AM_PROJECT, AM_AGENT,
    /// AM_MESSAGE_ID, AM_FROM, AM_SUBJECT, AM_IMPORTANCE)
    #[arg(long, value_name = "CMD")]
    on_notify: Option<String>,

    /// Markdown file to keep updated with a pending-notification summary
    #[arg(long, value_name = "PATH")]
    buffer_file: Option<PathBuf>,

    /// JSON sentinel file overwritten per notification, consumed by an
    /// external hook
    #[arg(long, value_name = "PATH")]
    sentinel_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("am_watch=info")),
        )
        .init();

    let cli = Cli::parse();

    // An unknown method is the one fatal configuration error; everything
    // past this point recovers locally.
    let method: WatchMethod = cli.method.parse().map_err(anyhow::Error::msg)?;

    let config = WatcherConfig {
        project: cli.project,
        agent: cli.agent,
        method,
        url: cli.url,
        token: cli.token,
        interval: Duration::from_secs_f64(cli.interval),
        sinks: SinkConfig {
            alert: cli.alert,
            auto_fetch: cli.auto_fetch,
            show_body: cli.show_body,
            on_notify: cli.on_notify,
            buffer_file: cli.buffer_file,
            sentinel_file: cli.sentinel_file,
        },
    };

    watcher::run(config).await
}
