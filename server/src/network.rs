//! Server network layer: player and viewer listeners plus the snapshot feed

use crate::config::ServerConfig;
use crate::game::{GameState, StateObserver};
use crate::grid::Grid;
use crate::session::Session;
use crate::world::WorldHandle;
use log::{debug, error, info, warn};
use shared::{encode_frame, GridSnapshot};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::watch;

/// Publishes the latest board to viewers.
///
/// A `watch` channel only keeps the newest value, so a slow viewer skips
/// intermediate refreshes instead of holding up the game.
pub struct SnapshotPublisher {
    tx: watch::Sender<Arc<GridSnapshot>>,
}

impl SnapshotPublisher {
    pub fn new(tx: watch::Sender<Arc<GridSnapshot>>) -> Self {
        Self { tx }
    }
}

impl StateObserver for SnapshotPublisher {
    fn on_state_changed(&mut self, grid: &Grid) {
        self.tx.send_replace(Arc::new(grid.snapshot()));
    }
}

/// Main server accepting players and viewers
pub struct Server {
    config: ServerConfig,
    player_listener: TcpListener,
    viewer_listener: TcpListener,
}

impl Server {
    pub async fn bind(
        config: ServerConfig,
    ) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let player_listener = TcpListener::bind(config.player_address).await?;
        let viewer_listener = TcpListener::bind(config.viewer_address).await?;
        info!(
            "Snek server listening for players on {} and viewers on {}",
            player_listener.local_addr()?,
            viewer_listener.local_addr()?
        );

        Ok(Server {
            config,
            player_listener,
            viewer_listener,
        })
    }

    pub fn player_addr(&self) -> std::io::Result<SocketAddr> {
        self.player_listener.local_addr()
    }

    pub fn viewer_addr(&self) -> std::io::Result<SocketAddr> {
        self.viewer_listener.local_addr()
    }

    /// Accepts connections until the task is dropped.
    pub async fn run(self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.run_until(std::future::pending()).await
    }

    /// Accepts connections until `shutdown` resolves, then stops the world task
    /// and closes both listeners.
    pub async fn run_until<F>(
        self,
        shutdown: F,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>
    where
        F: Future<Output = ()>,
    {
        let mut state = match self.config.seed {
            Some(seed) => GameState::with_seed(self.config.game.clone(), seed),
            None => GameState::new(self.config.game.clone()),
        };
        let (snapshot_tx, snapshot_rx) = watch::channel(Arc::new(state.grid().snapshot()));
        state.add_observer(Box::new(SnapshotPublisher::new(snapshot_tx)));

        let world = WorldHandle::spawn(state, self.config.message_ttl);

        info!("Server started successfully");
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Shutting down");
                    world.shutdown();
                    return Ok(());
                },


                accepted = self.player_listener.accept() => {
                    match accepted {
                        Ok((stream, addr)) => {
                            info!("Player connected from {}", addr);
                            let session = Session::new(stream, world.clone(), self.config.idle_timeout);
                            tokio::spawn(async move {
                                let end = session.run().await;
                                info!("Player {} disconnected ({:?})", addr, end);
                            });
                        }
                        Err(e) => error!("Error accepting player: {}", e),
                    }
                },

                accepted = self.viewer_listener.accept() => {
                    match accepted {
                        Ok((stream, addr)) => {
                            info!("Viewer connected from {}", addr);
                            let snapshots = snapshot_rx.clone();
                            tokio::spawn(async move {
                                if let Err(e) = feed_viewer(stream, snapshots).await {
                                    debug!("Viewer {} dropped: {}", addr, e);
                                }
                                info!("Viewer {} disconnected", addr);
                            });
                        }
                        Err(e) => error!("Error accepting viewer: {}", e),
                    }
                },
            }
        }
    }
}

/// Sends the current board right away, then again after every refresh.
async fn feed_viewer(
    mut stream: TcpStream,
    mut snapshots: watch::Receiver<Arc<GridSnapshot>>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    stream.set_nodelay(true)?;
    loop {
        let snapshot = snapshots.borrow_and_update().clone();
        match encode_frame(&snapshot) {
            Ok(frame) => stream.write_all(&frame).await?,
            Err(e) => warn!("Failed to encode snapshot: {}", e),
        }

        if snapshots.changed().await.is_err() {
            return Ok(());
        }
    }
}
