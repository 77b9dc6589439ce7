use clap::Parser;
use log::{error, info};
use server::config::{GameConfig, ServerConfig};
use server::network::Server;
use shared::{
    GRID_HEIGHT, GRID_WIDTH, IDLE_TIMEOUT_MS, MESSAGE_TTL_MS, MIN_FOOD, SNEK_PORT, VIEWER_PORT,
};
use std::net::IpAddr;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Server IP address to bind to
    #[arg(short = 'H', long, default_value = "0.0.0.0")]
    host: IpAddr,

    /// Port players connect to
    #[arg(short, long, default_value_t = SNEK_PORT)]
    port: u16,

    /// Port viewers connect to for grid snapshots
    #[arg(short, long, default_value_t = VIEWER_PORT)]
    viewer_port: u16,

    /// Grid width in cells
    #[arg(long, default_value_t = GRID_WIDTH)]
    width: i32,

    /// Grid height in cells
    #[arg(long, default_value_t = GRID_HEIGHT)]
    height: i32,

    /// Food kept on the board at all times
    #[arg(long, default_value_t = MIN_FOOD)]
    min_food: usize,

    /// Maximum concurrent players
    #[arg(short, long, default_value = "64")]
    max_players: usize,

    /// Kill a player after this many milliseconds without input
    #[arg(long, default_value_t = IDLE_TIMEOUT_MS)]
    idle_timeout_ms: u64,

    /// How long a message stays on a snek, in milliseconds
    #[arg(long, default_value_t = MESSAGE_TTL_MS)]
    message_ttl_ms: u64,

    /// Seed for reproducible spawns
    #[arg(long)]
    seed: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    env_logger::init();

    if std::env::var("RUST_LOG").is_err() {
        eprintln!("Set RUST_LOG=info for detailed logging");
    }

    let args = Args::parse();

    let config = ServerConfig {
        player_address: (args.host, args.port).into(),
        viewer_address: (args.host, args.viewer_port).into(),
        idle_timeout: Duration::from_millis(args.idle_timeout_ms),
        message_ttl: Duration::from_millis(args.message_ttl_ms),
        seed: args.seed,
        game: GameConfig {
            width: args.width,
            height: args.height,
            min_food: args.min_food,
            max_players: args.max_players,
            ..GameConfig::default()
        },
    };

    info!(
        "Starting snek server on {}x{} grid",
        config.game.width, config.game.height
    );

    let server = Server::bind(config).await?;

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
        info!("Received Ctrl+C, shutting down gracefully...");
    };

    if let Err(e) = server.run_until(shutdown).await {
        error!("Server error: {}", e);
    }

    Ok(())
}
