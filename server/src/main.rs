use clap::Parser;
use log::info;
use server::config::{tick_duration_for, GameRules, ServerConfig};
use server::network::Server;
use shared::SERVER_PORT;
use std::net::SocketAddr;

/// Command line arguments
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Server IP address to bind to
    #[arg(short = 'H', long, default_value = "0.0.0.0")]
    host: String,

    /// Server port to listen on
    #[arg(short, long, default_value_t = SERVER_PORT)]
    port: u16,

    /// Tick rate (upper bound on how long a tick waits, in Hz)
    #[arg(short, long, default_value_t = shared::TICK_RATE)]
    tick_rate: u32,

    /// Units moved per tick at full input
    #[arg(long)]
    speed: Option<f32>,

    /// Strike reach at score 0
    #[arg(long)]
    attack_base: Option<f32>,

    /// Extra reach per point of score
    #[arg(long)]
    attack_per_score: Option<f32>,

    /// Distance from the strike point that still counts as a hit
    #[arg(long)]
    hit_radius: Option<f32>,

    /// Distance a victim is pushed when hit
    #[arg(long)]
    knockback: Option<f32>,

    /// Score that wins a round
    #[arg(long)]
    win_score: Option<u32>,
}

impl Args {
    fn rules(&self) -> GameRules {
        let defaults = GameRules::default();
        GameRules {
            speed: self.speed.unwrap_or(defaults.speed),
            attack_base: self.attack_base.unwrap_or(defaults.attack_base),
            attack_per_score: self.attack_per_score.unwrap_or(defaults.attack_per_score),
            hit_radius: self.hit_radius.unwrap_or(defaults.hit_radius),
            knockback: self.knockback.unwrap_or(defaults.knockback),
            win_score: self.win_score.unwrap_or(defaults.win_score),
            ..defaults
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;

    let config = ServerConfig {
        addr,
        tick_duration: tick_duration_for(args.tick_rate),
        rules: args.rules(),
    };
    info!("Starting server with {:?}", config);

    let mut server = Server::bind(config).await?;
    server.run().await;

    Ok(())
}
