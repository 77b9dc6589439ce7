//! Headless random-walk player for load and manual testing

use clap::Parser;
use log::{info, warn};
use rand::seq::SliceRandom;
use shared::{Command, Direction, SNEK_PORT};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::sleep;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Server address to connect to
    #[arg(short, long, default_value_t = format!("127.0.0.1:{}", SNEK_PORT))]
    server: String,

    /// Number of moves to send before leaving
    #[arg(short, long, default_value = "200")]
    moves: u32,

    /// Delay between moves in milliseconds
    #[arg(short, long, default_value = "250")]
    interval_ms: u64,

    /// Name shown above the snek
    #[arg(short, long, default_value = "bot")]
    name: String,
}

/// Picks a random direction that does not reverse into the neck.
fn next_direction(last: Option<Direction>) -> Direction {
    let options: Vec<Direction> = Direction::ALL
        .into_iter()
        .filter(|d| Some(d.opposite()) != last)
        .collect();
    *options
        .choose(&mut rand::thread_rng())
        .unwrap_or(&Direction::Left)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    env_logger::init();
    let args = Args::parse();

    let stream = TcpStream::connect(&args.server).await?;
    info!("Connected to {}", args.server);
    let (mut reader, mut writer) = stream.into_split();

    let notice = tokio::spawn(async move {
        let mut received = String::new();
        let _ = reader.read_to_string(&mut received).await;
        received
    });

    let greeting = Command::Name(args.name.clone()).to_wire() + "\n";
    writer.write_all(greeting.as_bytes()).await?;

    // Fresh sneks face left: the body trails off in +x.
    let mut last = Some(Direction::Left);
    for _ in 0..args.moves {
        if notice.is_finished() {
            break;
        }
        let direction = next_direction(last);
        let line = Command::Move(direction).to_wire() + "\n";
        if let Err(e) = writer.write_all(line.as_bytes()).await {
            warn!("Connection lost: {}", e);
            break;
        }
        last = Some(direction);
        sleep(Duration::from_millis(args.interval_ms)).await;
    }

    writer.shutdown().await.ok();
    let message = notice.await.unwrap_or_default();
    if message.is_empty() {
        info!("Bot left after {} moves", args.moves);
    } else {
        info!("Server says: {}", message);
    }

    Ok(())
}
