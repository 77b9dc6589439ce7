//! Background networking for the player and viewer connections
//!
//! The macroquad render loop owns the main thread, so all socket work runs on a
//! tokio runtime in a separate thread. The two sides meet through channels:
//! commands go out over an unbounded mpsc channel, while the latest board and
//! connection status come back through `watch` channels the render loop can
//! poll without blocking.

use crate::game::ConnectionStatus;
use log::{debug, error, info, warn};
use shared::{decode_snapshot, Command, GridSnapshot, MAX_FRAME_LEN};
use std::io;
use std::thread;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, watch};

const READ_BUFFER_SIZE: usize = 1024;

#[derive(Debug, Clone)]
pub struct NetworkConfig {
    pub server: String,
    pub viewer: String,
    pub name: Option<String>,
}

/// Render-loop side of the network thread
pub struct NetworkHandle {
    command_tx: mpsc::UnboundedSender<Command>,
    snapshot_rx: watch::Receiver<Option<GridSnapshot>>,
    status_rx: watch::Receiver<ConnectionStatus>,
}

impl NetworkHandle {
    /// Starts the network thread and connects both sockets in the background.
    pub fn start(config: NetworkConfig) -> io::Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()?;

        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (snapshot_tx, snapshot_rx) = watch::channel(None);
        let (status_tx, status_rx) = watch::channel(ConnectionStatus::Connecting);

        thread::Builder::new()
            .name("snek-network".into())
            .spawn(move || {
                runtime.block_on(run_network(config, command_rx, snapshot_tx, status_tx));
            })?;

        Ok(Self {
            command_tx,
            snapshot_rx,
            status_rx,
        })
    }

    /// Queues a command for the server. Returns false once the connection is gone.
    pub fn send(&self, command: Command) -> bool {
        self.command_tx.send(command).is_ok()
    }

    /// Returns the newest board if it changed since the last call.
    pub fn latest_snapshot(&mut self) -> Option<GridSnapshot> {
        match self.snapshot_rx.has_changed() {
            Ok(true) => self.snapshot_rx.borrow_and_update().clone(),
            _ => None,
        }
    }

    pub fn status(&self) -> ConnectionStatus {
        self.status_rx.borrow().clone()
    }
}

async fn run_network(
    config: NetworkConfig,
    commands: mpsc::UnboundedReceiver<Command>,
    snapshots: watch::Sender<Option<GridSnapshot>>,
    status: watch::Sender<ConnectionStatus>,
) {
    let player = async {
        match TcpStream::connect(&config.server).await {
            Ok(stream) => {
                info!("Connected to game server at {}", config.server);
                if let Err(e) = stream.set_nodelay(true) {
                    warn!("Failed to set TCP_NODELAY: {}", e);
                }
                run_player(stream, config.name.clone(), commands, &status).await;
            }
            Err(e) => {
                error!("Could not reach game server {}: {}", config.server, e);
                status.send_replace(ConnectionStatus::Disconnected(e.to_string()));
            }
        }
    };

    let viewer = async {
        match TcpStream::connect(&config.viewer).await {
            Ok(stream) => {
                info!("Watching board at {}", config.viewer);
                if let Err(e) = run_viewer(stream, &snapshots).await {
                    warn!("Viewer feed ended: {}", e);
                }
            }
            Err(e) => error!("Could not reach viewer feed {}: {}", config.viewer, e),
        }
    };

    tokio::join!(player, viewer);
    debug!("Network thread finished");
}

/// Forwards commands to the server until it closes the connection.
///
/// Whatever text the server writes before closing is the reason the snek died.
pub async fn run_player<S>(
    stream: S,
    name: Option<String>,
    mut commands: mpsc::UnboundedReceiver<Command>,
    status: &watch::Sender<ConnectionStatus>,
) where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let (mut reader, mut writer) = tokio::io::split(stream);
    status.send_replace(ConnectionStatus::Playing);

    if let Some(name) = name {
        if let Err(e) = write_command(&mut writer, &Command::Name(name)).await {
            status.send_replace(ConnectionStatus::Disconnected(e.to_string()));
            return;
        }
    }

    let mut received = Vec::new();
    let mut buffer = [0u8; READ_BUFFER_SIZE];
    let mut commands_open = true;

    loop {
        tokio::select! {
            command = commands.recv(), if commands_open => {
                match command {
                    Some(command) => {
                        if let Err(e) = write_command(&mut writer, &command).await {
                            debug!("Write failed: {}", e);
                        }
                    }
                    None => {
                        commands_open = false;
                        let _ = writer.shutdown().await;
                    }
                }
            }
            read = reader.read(&mut buffer) => {
                match read {
                    Ok(0) => break,
                    Ok(len) => received.extend_from_slice(&buffer[..len]),
                    Err(e) => {
                        status.send_replace(ConnectionStatus::Disconnected(e.to_string()));
                        return;
                    }
                }
            }
        }
    }

    let notice = String::from_utf8_lossy(&received).trim().to_string();
    if notice.is_empty() {
        info!("Server closed the connection");
        status.send_replace(ConnectionStatus::Disconnected(
            "Server closed the connection".into(),
        ));
    } else {
        info!("Server says: {}", notice);
        status.send_replace(ConnectionStatus::Dead(notice));
    }
}

async fn write_command<W>(writer: &mut W, command: &Command) -> io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    let line = command.to_wire() + "\n";
    writer.write_all(line.as_bytes()).await
}

/// Publishes every board received from the viewer feed.
pub async fn run_viewer<R>(
    mut reader: R,
    snapshots: &watch::Sender<Option<GridSnapshot>>,
) -> io::Result<()>
where
    R: AsyncRead + Unpin,
{
    loop {
        let snapshot = match read_snapshot(&mut reader).await {
            Ok(snapshot) => snapshot,
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => return Ok(()),
            Err(e) => return Err(e),
        };
        snapshots.send_replace(Some(snapshot));
    }
}

/// Reads one length-prefixed frame and decodes the board inside it.
pub async fn read_snapshot<R>(reader: &mut R) -> io::Result<GridSnapshot>
where
    R: AsyncRead + Unpin,
{
    let len = reader.read_u32().await? as usize;
    if len > MAX_FRAME_LEN {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("frame of {} bytes exceeds limit", len),
        ));
    }

    let mut body = vec![0u8; len];
    reader.read_exact(&mut body).await?;
    decode_snapshot(&body).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::{encode_frame, Coord, Direction, COLLISION_NOTICE};
    use tokio::io::duplex;
    use tokio_test::{assert_err, assert_ok};

    fn board() -> GridSnapshot {
        GridSnapshot {
            width: 80,
            height: 40,
            foods: vec![Coord::new(3, 4)],
            ..GridSnapshot::default()
        }
    }

    #[tokio::test]
    async fn test_read_snapshot_decodes_frame() {
        let (mut server, mut client) = duplex(4096);
        server.write_all(&encode_frame(&board()).unwrap()).await.unwrap();

        let snapshot = assert_ok!(read_snapshot(&mut client).await);
        assert_eq!(snapshot, board());
    }

    #[tokio::test]
    async fn test_read_snapshot_rejects_oversized_frame() {
        let (mut server, mut client) = duplex(64);
        server.write_u32(MAX_FRAME_LEN as u32 + 1).await.unwrap();

        let err = assert_err!(read_snapshot(&mut client).await);
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[tokio::test]
    async fn test_viewer_publishes_latest_board() {
        let (mut server, client) = duplex(4096);
        let (tx, rx) = watch::channel(None);

        let mut second = board();
        second.foods.push(Coord::new(9, 9));
        server.write_all(&encode_frame(&board()).unwrap()).await.unwrap();
        server.write_all(&encode_frame(&second).unwrap()).await.unwrap();
        drop(server);

        assert_ok!(run_viewer(client, &tx).await);
        assert_eq!(rx.borrow().as_ref(), Some(&second));
    }

    #[tokio::test]
    async fn test_player_sends_name_and_moves() {
        let (mut server, client) = duplex(4096);
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (status_tx, status_rx) = watch::channel(ConnectionStatus::Connecting);

        command_tx.send(Command::Move(Direction::Up)).unwrap();
        drop(command_tx);

        let player = tokio::spawn(async move {
            run_player(client, Some("ada".into()), command_rx, &status_tx).await;
            status_tx
        });

        let mut sent = vec![0u8; "Name: ada\nMove: up\n".len()];
        server.read_exact(&mut sent).await.unwrap();
        assert_eq!(sent, b"Name: ada\nMove: up\n");

        server.write_all(COLLISION_NOTICE.as_bytes()).await.unwrap();
        drop(server);

        let _status_tx = player.await.unwrap();
        assert_eq!(
            *status_rx.borrow(),
            ConnectionStatus::Dead(COLLISION_NOTICE.to_string())
        );
    }

    #[tokio::test]
    async fn test_silent_close_is_a_disconnect() {
        let (server, client) = duplex(4096);
        let (_command_tx, command_rx) = mpsc::unbounded_channel();
        let (status_tx, status_rx) = watch::channel(ConnectionStatus::Connecting);

        drop(server);
        run_player(client, None, command_rx, &status_tx).await;
        assert!(matches!(
            *status_rx.borrow(),
            ConnectionStatus::Disconnected(_)
        ));
    }
}
