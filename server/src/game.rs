use crate::config::GameRules;
use log::info;
use shared::{Input, PlayerState, StateUpdate, MAX_PLAYERS};

/// Authoritative state of one player slot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerSlot {
    pub active: bool,
    pub x: f32,
    pub y: f32,
    /// Aim angle in radians.
    pub rotation: f32,
    pub score: u32,
    pub attacking: bool,
}

impl Default for PlayerSlot {
    fn default() -> Self {
        Self {
            active: false,
            x: 0.0,
            y: 0.0,
            rotation: 0.0,
            score: 0,
            attacking: false,
        }
    }
}

impl PlayerSlot {
    pub fn position(&self) -> (f32, f32) {
        (self.x, self.y)
    }

    fn to_wire(self, id: usize) -> PlayerState {
        PlayerState {
            id: id as u8,
            active: self.active as u8,
            x: self.x,
            y: self.y,
            rotation: self.rotation,
            score: self.score,
            is_attacking: self.attacking as u8,
        }
    }
}

#[derive(Debug, Clone)]
pub struct GameState {
    pub tick: u32,
    pub players: [PlayerSlot; MAX_PLAYERS],
    pub rules: GameRules,
}

impl GameState {
    pub fn new(rules: GameRules) -> Self {
        Self {
            tick: 0,
            players: [PlayerSlot::default(); MAX_PLAYERS],
            rules,
        }
    }

    /// Activates a slot at the spawn point with a clean score.
    pub fn spawn(&mut self, slot: usize) {
        let rules = self.rules;
        if let Some(player) = self.players.get_mut(slot) {
            *player = PlayerSlot {
                active: true,
                x: rules.spawn_x,
                y: rules.spawn_y,
                rotation: 0.0,
                score: 0,
                attacking: false,
            };
            info!("Spawned player {} at ({}, {})", slot, player.x, player.y);
        }
    }

    pub fn despawn(&mut self, slot: usize) {
        if let Some(player) = self.players.get_mut(slot) {
            player.active = false;
            player.attacking = false;
            info!("Removed player {}", slot);
        }
    }

    /// Moves a slot by `(dx, dy) * speed` and clamps it into the arena.
    pub fn integrate(&mut self, slot: usize, dx: f32, dy: f32) {
        let rules = self.rules;
        if let Some(player) = self.players.get_mut(slot) {
            player.x += finite_or_zero(dx) * rules.speed;
            player.y += finite_or_zero(dy) * rules.speed;
            clamp_to_arena(player, &rules);
        }
    }

    /// Applies one input message: movement, then aim and attack flag verbatim.
    pub fn apply_input(&mut self, slot: usize, input: &Input) {
        self.integrate(slot, input.dx, input.dy);
        if let Some(player) = self.players.get_mut(slot) {
            player.rotation = finite_or_zero(input.rotation);
            player.attacking = input.is_attacking();
        }
    }

    /// Zeroes every active player's score and moves them back to spawn.
    ///
    /// Activity flags are left alone; inactive slots are not touched.
    pub fn reset_all(&mut self) {
        let rules = self.rules;
        for player in self.players.iter_mut().filter(|p| p.active) {
            player.x = rules.spawn_x;
            player.y = rules.spawn_y;
            player.rotation = 0.0;
            player.score = 0;
            player.attacking = false;
        }
        info!("Round restarted");
    }

    /// Lowest-indexed active slot whose score reached the win threshold.
    pub fn winner(&self) -> Option<usize> {
        self.players
            .iter()
            .position(|p| p.active && p.score >= self.rules.win_score)
    }

    pub fn active_count(&self) -> usize {
        self.players.iter().filter(|p| p.active).count()
    }

    pub fn snapshot(&self) -> StateUpdate {
        let mut update = StateUpdate::empty();
        for (id, (wire, player)) in update.players.iter_mut().zip(&self.players).enumerate() {
            *wire = player.to_wire(id);
        }
        update
    }
}

/// Clamps each axis independently into `[margin, extent - margin]`.
pub(crate) fn clamp_to_arena(player: &mut PlayerSlot, rules: &GameRules) {
    player.x = player.x.max(rules.min_x()).min(rules.max_x());
    player.y = player.y.max(rules.min_y()).min(rules.max_y());
}

fn finite_or_zero(value: f32) -> f32 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}
