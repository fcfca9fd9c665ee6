use rand::Rng;
use shared::{Input, StateUpdate};

/// Distance at which the bot starts swinging at an opponent.
const SWING_DISTANCE: f32 = 60.0;
/// Frames between changes of wander direction.
const WANDER_FRAMES: u32 = 45;

/// Headless stand-in for a human player.
///
/// Wanders in a random direction, aims at the nearest opponent and swings
/// when one is close enough (if attacking is enabled).
pub struct Bot {
    player_id: u8,
    attack: bool,
    direction: (f32, f32),
    frames_left: u32,
}

impl Bot {
    pub fn new(player_id: u8, attack: bool) -> Self {
        Self {
            player_id,
            attack,
            direction: (0.0, 0.0),
            frames_left: 0,
        }
    }

    /// Builds this frame's input from the newest snapshot.
    pub fn next_input<R: Rng>(&mut self, state: Option<&StateUpdate>, rng: &mut R) -> Input {
        if self.frames_left == 0 {
            self.direction = (rng.gen_range(-1.0..=1.0), rng.gen_range(-1.0..=1.0));
            self.frames_left = WANDER_FRAMES;
        }
        self.frames_left -= 1;

        let (dx, dy) = self.direction;
        let mut input = Input::new(self.player_id, dx, dy, 0.0, false);

        if let Some((rotation, distance)) = state.and_then(|s| self.nearest_opponent(s)) {
            input.rotation = rotation;
            input.attack = (self.attack && distance < SWING_DISTANCE) as u8;
        }
        input
    }

    /// Aim angle and distance to the closest other active player.
    fn nearest_opponent(&self, state: &StateUpdate) -> Option<(f32, f32)> {
        let me = state.players.get(self.player_id as usize).filter(|p| p.is_active())?;

        state
            .active_players()
            .filter(|p| p.id != self.player_id)
            .map(|p| {
                let (dx, dy) = (p.x - me.x, p.y - me.y);
                (dy.atan2(dx), (dx * dx + dy * dy).sqrt())
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
    }
}
