use clap::Parser;
use gobang_engine::web::run_server;
use gobang_engine::{GridSize, SessionConfig};
use std::net::SocketAddr;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "gobang-engine", about = "Gobang rule engine served over HTTP")]
struct Cli {
    /// Address to listen on
    #[arg(long, default_value = "127.0.0.1:3000")]
    bind: SocketAddr,

    /// Width of the client viewport in pixels; picks the board size
    #[arg(long)]
    viewport_width: Option<u32>,

    /// Highest cell index on each axis; overrides --viewport-width
    #[arg(long)]
    grid_size: Option<usize>,

    /// Milliseconds between accepting a move and judging it
    #[arg(long, default_value_t = 50)]
    resolve_delay_ms: u64,
}

impl Cli {
    fn session_config(&self) -> Result<SessionConfig, Box<dyn std::error::Error>> {
        let mut config = match self.viewport_width {
            Some(width) => SessionConfig::for_viewport(width),
            None => SessionConfig::default(),
        };
        if let Some(n) = self.grid_size {
            config.grid_size = GridSize::new(n)?;
        }
        config.resolve_delay_ms = self.resolve_delay_ms;
        Ok(config)
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();
    let config = cli.session_config()?;

    info!(
        grid = %config.grid_size,
        resolve_delay_ms = config.resolve_delay_ms,
        "starting gobang engine"
    );
    run_server(config, cli.bind).await
}
