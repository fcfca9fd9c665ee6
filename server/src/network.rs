//! Server network layer: the readiness-multiplexed tick loop
//!
//! One task owns the listener, every session socket and the simulation. Each
//! cycle:
//! 1. waits until the listener or any session is readable, or the tick budget
//!    runs out
//! 2. accepts at most one pending connection
//! 3. ingests at most one message per session, resolving strikes as they are
//!    applied
//! 4. broadcasts the resulting snapshot to every session
//!
//! Nothing is shared across tasks, so no locks are needed and every client
//! receives the same fully-resolved snapshot for a given tick.
//!
//! Writes are best-effort. A short snapshot write leaves a partial frame that
//! clients skip over, but reads here are fixed-size and never realign, so a
//! client whose input write was cut short stays misframed until it reconnects.

use crate::combat::Hit;
use crate::config::ServerConfig;
use crate::error::ServerError;
use crate::game::GameState;
use crate::ingest::{ingest_session, Ingested};
use crate::session_table::SessionTable;
use futures_util::future::select_all;
use log::{debug, error, info, warn};
use shared::{Message, Welcome};
use std::io;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};
use tokio::time::sleep;

/// What ended a wait for I/O.
enum Wake {
    Incoming(io::Result<(TcpStream, SocketAddr)>),
    Readable,
    Timeout,
}

/// A connected client: its socket plus the peer address for logging.
struct Session {
    stream: TcpStream,
    addr: SocketAddr,
}

/// Everything that happened during one tick.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct TickReport {
    pub tick: u32,
    pub accepted: Vec<usize>,
    pub rejected: usize,
    pub disconnected: Vec<usize>,
    pub inputs: usize,
    pub discarded: usize,
    pub restarts: usize,
    pub hits: Vec<Hit>,
}

impl TickReport {
    /// True when the tick changed nothing but the tick counter.
    pub fn is_quiet(&self) -> bool {
        self.accepted.is_empty()
            && self.rejected == 0
            && self.disconnected.is_empty()
            && self.inputs == 0
            && self.restarts == 0
    }
}

/// Authoritative game server
pub struct Server {
    listener: TcpListener,
    sessions: SessionTable<Session>,
    game_state: GameState,
    tick_duration: Duration,
}

impl Server {
    /// Binds the listening socket. Failure here is fatal: the server never
    /// starts serving.
    pub async fn bind(config: ServerConfig) -> Result<Self, ServerError> {
        let listener = TcpListener::bind(config.addr)
            .await
            .map_err(|source| ServerError::Bind {
                addr: config.addr,
                source,
            })?;
        info!("Server listening on {}", config.addr);

        Ok(Server {
            listener,
            sessions: SessionTable::new(),
            game_state: GameState::new(config.rules),
            tick_duration: config.tick_duration,
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, ServerError> {
        self.listener.local_addr().map_err(ServerError::LocalAddr)
    }

    pub fn game_state(&self) -> &GameState {
        &self.game_state
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    /// Peer address of the client holding `slot`, if any.
    pub fn peer_addr(&self, slot: usize) -> Option<SocketAddr> {
        self.sessions.get(slot).map(|session| session.addr)
    }

    /// Blocks until the listener or a session is readable, or the tick budget
    /// elapses.
    async fn wait_for_io(&self) -> Wake {
        let any_session_readable = async {
            if self.sessions.is_empty() {
                std::future::pending::<()>().await;
            }
            let waits = self
                .sessions
                .iter()
                .map(|(_, session)| Box::pin(session.stream.readable()));
            // A readiness error surfaces again on the next read, where it is
            // handled as a disconnect.
            let _ = select_all(waits).await;
        };

        tokio::select! {
            accepted = self.listener.accept() => Wake::Incoming(accepted),
            _ = any_session_readable => Wake::Readable,
            _ = sleep(self.tick_duration) => Wake::Timeout,
        }
    }

    fn admit(&mut self, stream: TcpStream, addr: SocketAddr, report: &mut TickReport) {
        if let Err(e) = stream.set_nodelay(true) {
            warn!("Failed to disable send coalescing for {}: {}", addr, e);
        }

        match self.sessions.accept(Session { stream, addr }) {
            Ok(slot) => {
                self.game_state.spawn(slot);
                info!("Player {} joined from {}", slot, addr);

                let welcome = Message::Welcome(Welcome {
                    assigned_id: slot as u8,
                });
                if let Some(session) = self.sessions.get(slot) {
                    send_message(&session.stream, slot, &welcome);
                }
                report.accepted.push(slot);
            }
            Err(e) => {
                info!("Refused connection from {}: {}", addr, e);
                report.rejected += 1;
            }
        }
    }

    fn disconnect(&mut self, slot: usize, report: &mut TickReport) {
        if let Some(session) = self.sessions.release(slot) {
            self.game_state.despawn(slot);
            info!("Player {} disconnected ({})", slot, session.addr);
            report.disconnected.push(slot);
        }
    }

    /// One pass over every active session, in slot order.
    fn ingest_all(&mut self, report: &mut TickReport) {
        for slot in self.sessions.active_slots() {
            let Some(session) = self.sessions.get(slot) else {
                continue;
            };

            match ingest_session(&mut self.game_state, slot, &session.stream) {
                Ingested::Applied { hits } => {
                    report.inputs += 1;
                    report.hits.extend(hits);
                }
                Ingested::Restarted => report.restarts += 1,
                Ingested::Discarded { .. } => report.discarded += 1,
                Ingested::Idle => {}
                Ingested::Closed => self.disconnect(slot, report),
            }
        }
    }

    /// Sends the post-tick snapshot to every session. Sends are best-effort
    /// and never retried; a dead peer is noticed by the next read.
    fn broadcast(&self) {
        let snapshot = Message::StateUpdate(self.game_state.snapshot());
        let bytes = match snapshot.encode() {
            Ok(bytes) => bytes,
            Err(e) => {
                error!("Failed to encode snapshot: {}", e);
                return;
            }
        };

        for (slot, session) in self.sessions.iter() {
            send_bytes(&session.stream, slot, &bytes);
        }
    }

    /// Runs one full cycle: wait, accept, ingest and resolve, broadcast.
    pub async fn tick(&mut self) -> TickReport {
        let mut report = TickReport::default();

        match self.wait_for_io().await {
            Wake::Incoming(Ok((stream, addr))) => self.admit(stream, addr, &mut report),
            Wake::Incoming(Err(e)) => warn!("Failed to accept connection: {}", e),
            Wake::Readable | Wake::Timeout => {}
        }

        self.ingest_all(&mut report);

        self.game_state.tick = self.game_state.tick.wrapping_add(1);
        report.tick = self.game_state.tick;
        self.broadcast();

        report
    }

    /// Main server loop. Only process termination stops it.
    pub async fn run(&mut self) {
        info!("Server started successfully");

        loop {
            let report = self.tick().await;

            if !report.is_quiet() {
                debug!("{:?}", report);
            }

            if report.tick % 60 == 0 && !self.sessions.is_empty() {
                debug!(
                    "Tick {}: {} clients, {} active players",
                    report.tick,
                    self.sessions.len(),
                    self.game_state.active_count()
                );
            }
        }
    }
}

fn send_message(stream: &TcpStream, slot: usize, message: &Message) {
    match message.encode() {
        Ok(bytes) => send_bytes(stream, slot, &bytes),
        Err(e) => error!("Failed to encode {:?} for player {}: {}", message.kind(), slot, e),
    }
}

fn send_bytes(stream: &TcpStream, slot: usize, bytes: &[u8]) {
    match stream.try_write(bytes) {
        Ok(n) if n == bytes.len() => {}
        Ok(n) => warn!(
            "Short write to player {} ({} of {} bytes)",
            slot,
            n,
            bytes.len()
        ),
        Err(e) if e.kind() == io::ErrorKind::WouldBlock => {
            debug!("Send buffer full for player {}, dropping update", slot)
        }
        Err(e) => warn!("Failed to send to player {}: {}", slot, e),
    }
}
