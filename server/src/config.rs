//! Deployment-tunable server settings.
//!
//! Protocol-level constants (capacity, arena size, port) live in `shared` and
//! must match on both ends. Everything here only affects the server's own
//! simulation and can differ between deployments without breaking clients.

use shared::{SERVER_PORT, TICK_RATE, WORLD_HEIGHT, WORLD_WIDTH};
use std::net::SocketAddr;
use std::time::Duration;

/// Movement and combat tuning applied by the simulation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GameRules {
    pub world_width: f32,
    pub world_height: f32,
    /// Distance kept between a player's position and the arena edge.
    pub margin: f32,
    /// Units moved per tick at full input deflection.
    pub speed: f32,
    pub spawn_x: f32,
    pub spawn_y: f32,
    /// Strike reach at score 0.
    pub attack_base: f32,
    /// Extra reach gained per point of score.
    pub attack_per_score: f32,
    pub hit_radius: f32,
    pub knockback: f32,
    pub win_score: u32,
}

impl Default for GameRules {
    fn default() -> Self {
        Self {
            world_width: WORLD_WIDTH,
            world_height: WORLD_HEIGHT,
            margin: 20.0,
            speed: 5.0,
            spawn_x: WORLD_WIDTH / 2.0,
            spawn_y: WORLD_HEIGHT / 2.0,
            attack_base: 40.0,
            attack_per_score: 10.0,
            hit_radius: 20.0,
            knockback: 20.0,
            win_score: 10,
        }
    }
}

impl GameRules {
    pub fn min_x(&self) -> f32 {
        self.margin
    }

    pub fn max_x(&self) -> f32 {
        self.world_width - self.margin
    }

    pub fn min_y(&self) -> f32 {
        self.margin
    }

    pub fn max_y(&self) -> f32 {
        self.world_height - self.margin
    }

    /// Reach of a strike for an attacker holding `score` points.
    pub fn attack_range(&self, score: u32) -> f32 {
        self.attack_base + self.attack_per_score * score as f32
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub addr: SocketAddr,
    /// Upper bound on how long one cycle waits for socket readiness.
    pub tick_duration: Duration,
    pub rules: GameRules,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([0, 0, 0, 0], SERVER_PORT)),
            tick_duration: tick_duration_for(TICK_RATE),
            rules: GameRules::default(),
        }
    }
}

/// Converts a tick rate in Hz to a per-tick wait budget. A rate of 0 is
/// treated as 1 Hz.
pub fn tick_duration_for(tick_rate: u32) -> Duration {
    Duration::from_secs_f64(1.0 / tick_rate.max(1) as f64)
}
