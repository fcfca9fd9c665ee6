use clap::Parser;
use client::bot::Bot;
use client::network::{ClientError, ServerConnection};
use log::{info, warn};
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Server address to connect to
    #[arg(short = 's', long, default_value = "127.0.0.1:8080")]
    server: String,

    /// Number of frames to play before leaving (0 plays until disconnected)
    #[arg(short = 'n', long, default_value = "0")]
    frames: u64,

    /// Swing at opponents that come close
    #[arg(short = 'a', long)]
    attack: bool,

    /// Send a restart request once someone reaches this score
    #[arg(long)]
    restart_at: Option<u32>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    if std::env::var("RUST_LOG").is_err() {
        eprintln!("Set RUST_LOG=info for detailed logging");
    }

    let args = Args::parse();
    info!("Connecting to: {}", args.server);

    let mut conn = match ServerConnection::connect(args.server.as_str()).await {
        Ok(conn) => conn,
        Err(ClientError::ServerFull) => {
            info!("Server full");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    let mut bot = Bot::new(conn.player_id(), args.attack);
    let mut rng = rand::thread_rng();
    let mut frame_timer = interval(Duration::from_millis(16));
    frame_timer.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let mut frame = 0u64;
    while args.frames == 0 || frame < args.frames {
        frame_timer.tick().await;
        frame += 1;

        let input = bot.next_input(conn.latest(), &mut rng);
        match conn.exchange(input) {
            Ok(Some(state)) => {
                let leader = state.active_players().max_by_key(|p| p.score);
                if let (Some(limit), Some(leader)) = (args.restart_at, leader) {
                    if leader.score >= limit {
                        info!("Player {} reached {}, requesting restart", leader.id, leader.score);
                        conn.send_restart()?;
                    }
                }
                if frame % 60 == 0 {
                    let me = &state.players[conn.player_id() as usize];
                    info!("Frame {}: at ({:.0}, {:.0}), score {}", frame, me.x, me.y, me.score);
                }
            }
            Ok(None) => {}
            Err(ClientError::Disconnected) => {
                info!("Server disconnected");
                return Ok(());
            }
            Err(e) => {
                warn!("Connection error: {}", e);
                return Err(e.into());
            }
        }
    }

    Ok(())
}
