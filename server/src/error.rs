use thiserror::Error;

/// Failures scoped to a single snek or connection. None of these are fatal to the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GameError {
    /// Random placement exhausted its retries without finding free cells.
    #[error("no free space left on the grid")]
    NoSpace,
    /// A joining player could not be given a snek.
    #[error("could not find room to spawn a snek")]
    SpawnFailed,
    /// The configured player limit has been reached.
    #[error("server is full")]
    ServerFull,
}
