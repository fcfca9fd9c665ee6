//! # Arena Client Library
//!
//! Server-facing half of the arena client. Drawing and input capture live
//! elsewhere; this crate only speaks the wire protocol.
//!
//! ## Connection Lifecycle
//!
//! 1. Connect and wait for the Welcome that assigns a player slot. A server
//!    that closes the connection instead is full.
//! 2. Every frame, send exactly one input without waiting, then drain all
//!    inbound bytes and keep only the newest complete snapshot.
//! 3. A zero-byte read means the server went away; that is terminal.
//!
//! ## Module Organization
//!
//! - `network`: the [`network::ServerConnection`] adapter
//! - `bot`: a headless player that drives the adapter from the command line
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use client::network::ServerConnection;
//! use shared::Input;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut conn = ServerConnection::connect("127.0.0.1:8080").await?;
//!     let me = conn.player_id();
//!
//!     loop {
//!         let input = Input::new(me, 1.0, 0.0, 0.0, false);
//!         if let Some(state) = conn.exchange(input)? {
//!             println!("score: {}", state.players[me as usize].score);
//!         }
//!         tokio::time::sleep(std::time::Duration::from_millis(16)).await;
//!     }
//! }
//! ```

pub mod bot;
pub mod network;
