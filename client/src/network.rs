//! Client side of the server connection.
//!
//! The game loop drives this once per frame: send one input, then drain
//! whatever snapshots arrived and keep only the newest. Nothing here ever
//! waits on the network after the handshake.

use log::{debug, info, warn};
use shared::{
    Input, Message, MessageKind, ProtocolError, StateUpdate, STATE_UPDATE_SIZE, WELCOME_SIZE,
};
use std::io;
use std::net::SocketAddr;
use std::time::Duration;
use thiserror::Error;
use tokio::net::{TcpStream, ToSocketAddrs};
use tokio::time::timeout;

pub const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("failed to connect: {0}")]
    Connect(#[source] io::Error),
    /// The server closed the connection before assigning a slot.
    #[error("server is full")]
    ServerFull,
    #[error("no welcome from server within {0:?}")]
    HandshakeTimeout(Duration),
    #[error("server disconnected")]
    Disconnected,
    #[error("network error: {0}")]
    Io(#[from] io::Error),
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),
}

pub struct ServerConnection {
    stream: TcpStream,
    player_id: u8,
    inbound: Vec<u8>,
    latest: Option<StateUpdate>,
}

impl ServerConnection {
    /// Connects and waits for the Welcome that assigns this client's slot.
    pub async fn connect<A: ToSocketAddrs>(addr: A) -> Result<Self, ClientError> {
        let stream = TcpStream::connect(addr).await.map_err(ClientError::Connect)?;
        stream.set_nodelay(true)?;
        info!("Connected to {}, waiting for player ID", stream.peer_addr()?);

        let player_id = timeout(HANDSHAKE_TIMEOUT, await_welcome(&stream))
            .await
            .map_err(|_| ClientError::HandshakeTimeout(HANDSHAKE_TIMEOUT))??;
        info!("Assigned player ID {}", player_id);

        Ok(Self {
            stream,
            player_id,
            inbound: Vec::with_capacity(STATE_UPDATE_SIZE * 2),
            latest: None,
        })
    }

    pub fn player_id(&self) -> u8 {
        self.player_id
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.stream.local_addr()
    }

    /// Newest snapshot received so far.
    pub fn latest(&self) -> Option<&StateUpdate> {
        self.latest.as_ref()
    }

    /// Sends one input, best-effort. A full send buffer drops the input
    /// instead of stalling the caller. A short write is not retried, and since
    /// the server reads fixed-size inputs it leaves this session misframed.
    pub fn send_input(&self, input: Input) -> Result<(), ClientError> {
        let input = Input {
            id: self.player_id,
            ..input
        };
        self.send(&Message::Input(input))
    }

    pub fn send_restart(&self) -> Result<(), ClientError> {
        self.send(&Message::RestartRequest)
    }

    fn send(&self, message: &Message) -> Result<(), ClientError> {
        let bytes = message.encode()?;
        match self.stream.try_write(&bytes) {
            Ok(n) if n < bytes.len() => {
                warn!("Short write of {:?} ({} of {} bytes)", message.kind(), n, bytes.len())
            }
            Ok(_) => {}
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => {
                debug!("Send buffer full, dropping {:?}", message.kind())
            }
            Err(e) => return Err(e.into()),
        }
        Ok(())
    }

    /// Drains everything readable and returns the newest complete snapshot
    /// among it, if any. A closed connection is terminal.
    pub fn poll_state(&mut self) -> Result<Option<StateUpdate>, ClientError> {
        let mut chunk = [0u8; STATE_UPDATE_SIZE * 4];
        loop {
            match self.stream.try_read(&mut chunk) {
                Ok(0) => return Err(ClientError::Disconnected),
                Ok(n) => self.inbound.extend_from_slice(&chunk[..n]),
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => break,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }

        let newest = take_latest_snapshot(&mut self.inbound);
        if newest.is_some() {
            self.latest = newest;
        }
        Ok(newest)
    }

    /// One client cycle: send this frame's input, then drain snapshots.
    pub fn exchange(&mut self, input: Input) -> Result<Option<StateUpdate>, ClientError> {
        self.send_input(input)?;
        self.poll_state()
    }
}

async fn await_welcome(stream: &TcpStream) -> Result<u8, ClientError> {
    let welcome_tag = MessageKind::Welcome.tag();
    let mut buf = [0u8; WELCOME_SIZE];
    let mut filled = 0;

    loop {
        stream.readable().await?;
        match stream.try_read(&mut buf[filled..]) {
            Ok(0) => return Err(ClientError::ServerFull),
            Ok(n) => filled += n,
            Err(e)
                if matches!(
                    e.kind(),
                    io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted
                ) =>
            {
                continue
            }
            Err(e) => return Err(e.into()),
        }

        while filled > 0 && buf[0] != welcome_tag {
            debug!("Skipping byte {:#04x} while waiting for welcome", buf[0]);
            buf.copy_within(1..filled, 0);
            filled -= 1;
        }

        if filled == WELCOME_SIZE {
            // Welcome is the tag followed by the assigned slot.
            return Ok(buf[1]);
        }
    }
}

/// Pulls every complete snapshot out of `buf`, returning the last one.
///
/// Bytes that cannot start a snapshot are skipped. A trailing partial frame
/// stays in `buf` for the next drain.
pub(crate) fn take_latest_snapshot(buf: &mut Vec<u8>) -> Option<StateUpdate> {
    let tag = MessageKind::StateUpdate.tag();
    let mut latest = None;
    let mut start = 0;

    while start < buf.len() {
        if buf[start] != tag {
            start += 1;
            continue;
        }
        let end = start + STATE_UPDATE_SIZE;
        if end > buf.len() {
            break;
        }
        if let Ok(Message::StateUpdate(update)) = Message::decode(&buf[start..end]) {
            latest = Some(update);
        }
        start = end;
    }

    buf.drain(..start);
    latest
}
