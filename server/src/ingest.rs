//! Per-tick input ingestion.
//!
//! Each tick the server performs at most one non-blocking read of up to
//! `INPUT_SIZE` bytes per session. What came back decides what happens:
//!
//! | read result                    | effect                                    |
//! |--------------------------------|-------------------------------------------|
//! | full Input message             | move, aim, attack (combat resolved now)   |
//! | lone RestartRequest tag byte   | reset every active player                 |
//! | 0 bytes                        | orderly disconnect                        |
//! | short read or unknown tag      | discarded, session kept, no state change  |
//! | would block / interrupted      | nothing this tick                         |
//! | any other error                | treated as a disconnect                   |
//!
//! Short reads are tolerated on purpose: a garbled packet costs the player one
//! tick of input, not the connection.

use crate::combat::{resolve_attack, Hit};
use crate::game::GameState;
use log::{debug, warn};
use shared::{Input, Message, MessageKind, INPUT_SIZE, RESTART_REQUEST_SIZE};
use std::io;

/// A connection that can be read without waiting.
pub trait NonBlockingRead {
    fn try_read(&self, buf: &mut [u8]) -> io::Result<usize>;
}

impl NonBlockingRead for tokio::net::TcpStream {
    fn try_read(&self, buf: &mut [u8]) -> io::Result<usize> {
        tokio::net::TcpStream::try_read(self, buf)
    }
}

/// Classification of a single read attempt.
#[derive(Debug)]
pub enum ReadOutcome {
    Input(Input),
    Restart,
    Closed,
    Garbled { len: usize },
    WouldBlock,
    Failed(io::Error),
}

/// What ingesting one session did to the simulation.
#[derive(Debug, PartialEq, Eq)]
pub enum Ingested {
    Applied { hits: Vec<Hit> },
    Restarted,
    Discarded { len: usize },
    Idle,
    /// The session is gone and its slot must be released.
    Closed,
}

pub fn classify_read(result: io::Result<usize>, buf: &[u8]) -> ReadOutcome {
    let len = match result {
        Ok(0) => return ReadOutcome::Closed,
        Ok(len) => len.min(buf.len()),
        Err(e)
            if matches!(
                e.kind(),
                io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted
            ) =>
        {
            return ReadOutcome::WouldBlock
        }
        Err(e) => return ReadOutcome::Failed(e),
    };

    let bytes = &buf[..len];
    if len == RESTART_REQUEST_SIZE && bytes[0] == MessageKind::RestartRequest.tag() {
        return ReadOutcome::Restart;
    }
    if len < INPUT_SIZE {
        return ReadOutcome::Garbled { len };
    }

    match Message::decode(bytes) {
        Ok(Message::Input(input)) => ReadOutcome::Input(input),
        _ => ReadOutcome::Garbled { len },
    }
}

/// Performs this tick's single read from `conn`.
pub fn read_input<R: NonBlockingRead + ?Sized>(conn: &R) -> ReadOutcome {
    let mut buf = [0u8; INPUT_SIZE];
    let result = conn.try_read(&mut buf);
    classify_read(result, &buf)
}

/// Applies a read outcome for `slot` to the simulation.
///
/// Combat runs right after the input that carried the attack flag, so later
/// slots in the same tick see its knockback and score changes.
pub fn apply_outcome(state: &mut GameState, slot: usize, outcome: ReadOutcome) -> Ingested {
    match outcome {
        ReadOutcome::Input(input) => {
            state.apply_input(slot, &input);
            let hits = if input.is_attacking() {
                resolve_attack(state, slot)
            } else {
                Vec::new()
            };
            Ingested::Applied { hits }
        }
        ReadOutcome::Restart => {
            debug!("Restart requested by player {}", slot);
            state.reset_all();
            Ingested::Restarted
        }
        ReadOutcome::Garbled { len } => {
            debug!(
                "Discarding incomplete packet from player {} ({} of {} bytes)",
                slot, len, INPUT_SIZE
            );
            Ingested::Discarded { len }
        }
        ReadOutcome::WouldBlock => Ingested::Idle,
        ReadOutcome::Closed => Ingested::Closed,
        ReadOutcome::Failed(e) => {
            warn!("Read error from player {}: {}", slot, e);
            Ingested::Closed
        }
    }
}

/// Reads and applies at most one message from a session.
pub fn ingest_session<R: NonBlockingRead + ?Sized>(
    state: &mut GameState,
    slot: usize,
    conn: &R,
) -> Ingested {
    let outcome = read_input(conn);
    apply_outcome(state, slot, outcome)
}
