//! Per-connection protocol handling
//!
//! A session owns exactly one snek id for its whole life. It joins the world
//! when it starts, feeds every received command into the world task, and
//! removes the snek however the connection ends: idle timeout, collision,
//! client hang-up or transport error.

use crate::error::GameError;
use crate::game::MoveOutcome;
use crate::world::WorldHandle;
use log::{debug, info};
use shared::{
    Command, CommandDecoder, SnekId, COLLISION_NOTICE, IDLE_NOTICE, NO_ROOM_NOTICE,
    SERVER_FULL_NOTICE,
};
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::time::timeout;

const READ_BUFFER_SIZE: usize = 4096;

/// Why a session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// Nothing was received within the idle timeout.
    Idle,
    /// The snek ran into a wall or a body.
    Collided,
    /// The peer closed the connection or the transport failed.
    Disconnected,
    /// No room could be found for a new snek.
    SpawnFailed,
    /// The player limit was reached.
    ServerFull,
}

impl SessionEnd {
    /// Text written to the peer before the connection is closed, if any.
    pub fn notice(self) -> Option<&'static str> {
        match self {
            SessionEnd::Idle => Some(IDLE_NOTICE),
            SessionEnd::Collided => Some(COLLISION_NOTICE),
            SessionEnd::SpawnFailed => Some(NO_ROOM_NOTICE),
            SessionEnd::ServerFull => Some(SERVER_FULL_NOTICE),
            SessionEnd::Disconnected => None,
        }
    }
}

impl From<GameError> for SessionEnd {
    fn from(error: GameError) -> Self {
        match error {
            GameError::ServerFull => SessionEnd::ServerFull,
            GameError::NoSpace | GameError::SpawnFailed => SessionEnd::SpawnFailed,
        }
    }
}

pub struct Session<S> {
    stream: S,
    world: WorldHandle,
    idle_timeout: Duration,
}

impl<S> Session<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: S, world: WorldHandle, idle_timeout: Duration) -> Self {
        Self {
            stream,
            world,
            idle_timeout,
        }
    }

    /// Drives the connection until it ends and returns the reason.
    pub async fn run(mut self) -> SessionEnd {
        let end = match self.world.join().await {
            Ok(id) => {
                info!("Session started for snek {}", id);
                let end = self.play(id).await;
                // Already gone after a collision; removal is idempotent.
                self.world.leave(id);
                info!("Session for snek {} ended: {:?}", id, end);
                end
            }
            Err(e) => {
                info!("Session rejected: {}", e);
                SessionEnd::from(e)
            }
        };

        self.finish(end).await;
        end
    }

    async fn play(&mut self, id: SnekId) -> SessionEnd {
        let mut buffer = vec![0u8; READ_BUFFER_SIZE];
        let mut decoder = CommandDecoder::new();

        loop {
            // Every data event restarts the idle window.
            let len = match timeout(self.idle_timeout, self.stream.read(&mut buffer)).await {
                Err(_) => return SessionEnd::Idle,
                Ok(Err(e)) => {
                    debug!("Read error on snek {}: {}", id, e);
                    return SessionEnd::Disconnected;
                }
                Ok(Ok(0)) => return SessionEnd::Disconnected,
                Ok(Ok(len)) => len,
            };

            for raw in decoder.feed(&buffer[..len]) {
                let command = Command::parse(&raw);
                if self.world.apply(id, command).await == MoveOutcome::Collision {
                    return SessionEnd::Collided;
                }
            }
        }
    }

    async fn finish(&mut self, end: SessionEnd) {
        if let Some(notice) = end.notice() {
            if let Err(e) = self.stream.write_all(notice.as_bytes()).await {
                debug!("Could not deliver notice: {}", e);
            }
        }
        if let Err(e) = self.stream.shutdown().await {
            debug!("Could not shut down stream: {}", e);
        }
    }
}
