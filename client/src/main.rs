use clap::Parser;
use client::game::ClientGameState;
use client::input::InputManager;
use client::network::{NetworkConfig, NetworkHandle};
use client::rendering::{Renderer, HUD_HEIGHT};
use log::{error, info};
use macroquad::prelude::*;
use shared::{Command, GRID_HEIGHT, GRID_WIDTH, SNEK_PORT, VIEWER_PORT};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Game server address for the player connection
    #[arg(short = 's', long, default_value_t = format!("127.0.0.1:{}", SNEK_PORT))]
    server: String,

    /// Address of the viewer feed
    #[arg(short = 'v', long, default_value_t = format!("127.0.0.1:{}", VIEWER_PORT))]
    viewer: String,

    /// Name shown above your snek when you join
    #[arg(short = 'n', long)]
    name: Option<String>,

    /// Pixel size of one grid cell in the initial window
    #[arg(short = 'c', long, default_value = "12")]
    cell_size: u16,
}

fn window_conf() -> Conf {
    // Conf is built before main runs, so only the defaults can shape the window.
    let args = Args::parse();
    let cell = args.cell_size.max(4) as i32;
    Conf {
        window_title: "Snek".to_owned(),
        window_width: GRID_WIDTH * cell,
        window_height: GRID_HEIGHT * cell + HUD_HEIGHT as i32,
        window_resizable: true,
        ..Default::default()
    }
}

#[macroquad::main(window_conf)]
async fn main() {
    env_logger::init();

    if std::env::var("RUST_LOG").is_err() {
        eprintln!("Set RUST_LOG=info for detailed logging");
    }

    let args = Args::parse();

    info!("Starting client...");
    info!("Connecting to: {} (viewer {})", args.server, args.viewer);
    info!("Controls: arrow keys or WASD to steer, Esc to quit");

    let mut network = match NetworkHandle::start(NetworkConfig {
        server: args.server.clone(),
        viewer: args.viewer.clone(),
        name: args.name.clone(),
    }) {
        Ok(network) => network,
        Err(e) => {
            error!("Failed to start network thread: {}", e);
            return;
        }
    };

    let mut game = ClientGameState::new();
    let mut input = InputManager::new();
    let mut renderer = Renderer::new();

    loop {
        if is_key_pressed(KeyCode::Escape) {
            break;
        }

        if let Some(snapshot) = network.latest_snapshot() {
            game.apply_snapshot(snapshot);
        }
        game.set_status(network.status());

        if let Some(direction) = input.update() {
            if game.steer(direction) {
                network.send(Command::Move(direction));
            }
        }

        renderer.render(&game);
        next_frame().await;
    }

    info!(
        "Client closed after {} frames and {} snapshots",
        renderer.frames(),
        game.snapshots_received
    );
}
