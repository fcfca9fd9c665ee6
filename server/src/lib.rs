//! # Arena Server Library
//!
//! Authoritative server for the melee arena. It owns the canonical world state,
//! applies client input, resolves strikes and broadcasts a full snapshot to
//! every client once per tick.
//!
//! ## Architecture Design
//!
//! ### Single-Task Readiness Loop
//! All sockets and all game state are owned by one [`network::Server`] value
//! driven from a single task. Each tick waits for readiness on the listener
//! and every session (bounded by the tick budget), then runs the accept,
//! ingest and broadcast phases in order. There are no worker tasks and no
//! locks, so every client observes the same fully-resolved tick.
//!
//! ### Fixed Slots
//! At most [`shared::MAX_PLAYERS`] sessions exist at once. A session's slot
//! index is its player ID on the wire for its whole lifetime; a full server
//! closes new connections immediately.
//!
//! ### Tolerant Ingestion
//! One fixed-size message is read per session per tick. Short or garbled reads
//! are dropped without disconnecting; a zero-byte read or hard error tears the
//! session down.
//!
//! ## Module Organization
//!
//! - `config`: tick budget, bind address and tunable game rules
//! - `session_table`: slot allocation for connections
//! - `game`: authoritative player state, movement and clamping
//! - `combat`: strike hit-testing, scoring and knockback
//! - `ingest`: per-tick read classification and application
//! - `network`: the tick loop itself
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use server::config::ServerConfig;
//! use server::network::Server;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut server = Server::bind(ServerConfig::default()).await?;
//!     server.run().await;
//!     Ok(())
//! }
//! ```

pub mod combat;
pub mod config;
pub mod error;
pub mod game;
pub mod ingest;
pub mod network;
pub mod session_table;
