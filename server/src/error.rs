use std::io;
use std::net::SocketAddr;
use thiserror::Error;

/// Failures that stop the server before it starts serving.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to bind listener on {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },
    #[error("failed to query listener address: {0}")]
    LocalAddr(#[source] io::Error),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("all {0} player slots are occupied")]
    TableFull(usize),
}
