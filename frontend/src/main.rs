//! Signage template editor.

use clap::Parser;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use signage_frontend::Config;

/// Digital signage template editor
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Base URL of the REST backend
    #[arg(long, env = "SIGNAGE_API_URL")]
    api_url: Option<String>,

    /// Multipart file upload endpoint
    #[arg(long, env = "SIGNAGE_UPLOAD_URL")]
    upload_url: Option<String>,

    /// Template to open at startup
    #[arg(long)]
    template: Option<String>,

    /// Bearer token for the backend
    #[arg(long, env = "SIGNAGE_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Start in full-screen TV preview
    #[arg(long)]
    tv: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = Config::from_figment(args.api_url, args.upload_url, args.template, args.token)?;
    config.tv_preview |= args.tv;

    // RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(config.log_level.as_deref().unwrap_or("info"))
    });
    fmt().with_env_filter(filter).with_target(false).compact().init();

    info!("Starting signage template editor");

    let runtime = tokio::runtime::Runtime::new()?;
    let _guard = runtime.enter();

    signage_frontend::run_native(config)
}
