//! Melee hit resolution.
//!
//! A strike lands at a point in front of the attacker along its aim. Reach
//! scales with the attacker's score, so leaders hit from further away. Every
//! other active player within `hit_radius` of that point is hit; one swing can
//! connect with several victims in the same tick.

use crate::game::{clamp_to_arena, GameState};
use log::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hit {
    pub attacker: usize,
    pub victim: usize,
}

/// Where `attacker`'s current strike lands, or `None` for an inactive slot.
pub fn strike_point(state: &GameState, attacker: usize) -> Option<(f32, f32)> {
    let player = state.players.get(attacker).filter(|p| p.active)?;
    let range = state.rules.attack_range(player.score);
    Some((
        player.x + range * player.rotation.cos(),
        player.y + range * player.rotation.sin(),
    ))
}

/// Resolves one strike from `attacker` against every other active slot.
///
/// Victims are tested in slot order against the reach the attacker had when
/// the swing started. Each hit gives the attacker a point, takes one from the
/// victim (never below zero) and pushes the victim along the attacker's aim,
/// clamped back into the arena immediately.
pub fn resolve_attack(state: &mut GameState, attacker: usize) -> Vec<Hit> {
    let Some((hit_x, hit_y)) = strike_point(state, attacker) else {
        return Vec::new();
    };

    let rules = state.rules;
    let rotation = state.players[attacker].rotation;
    let (push_x, push_y) = (
        rotation.cos() * rules.knockback,
        rotation.sin() * rules.knockback,
    );

    let mut hits = Vec::new();
    for victim in 0..state.players.len() {
        if victim == attacker || !state.players[victim].active {
            continue;
        }

        let target = &mut state.players[victim];
        let distance = ((hit_x - target.x).powi(2) + (hit_y - target.y).powi(2)).sqrt();
        if distance >= rules.hit_radius {
            continue;
        }

        target.score = target.score.saturating_sub(1);
        target.x += push_x;
        target.y += push_y;
        clamp_to_arena(target, &rules);

        debug!(
            "Player {} hit player {} at distance {:.1}",
            attacker, victim, distance
        );
        hits.push(Hit { attacker, victim });
    }

    if !hits.is_empty() {
        let attacker_state = &mut state.players[attacker];
        attacker_state.score = attacker_state.score.saturating_add(hits.len() as u32);

        if attacker_state.score >= rules.win_score {
            info!(
                "Player {} reached the winning score ({})",
                attacker, attacker_state.score
            );
        }
    }

    hits
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameRules;
    use assert_approx_eq::assert_approx_eq;
    use std::f32::consts::FRAC_PI_2;

    fn arena_with(positions: &[(usize, f32, f32)]) -> GameState {
        let mut state = GameState::new(GameRules::default());
        for &(slot, x, y) in positions {
            state.spawn(slot);
            state.players[slot].x = x;
            state.players[slot].y = y;
        }
        state
    }

    #[test]
    fn test_strike_point() {
        let mut state = arena_with(&[(0, 100.0, 100.0)]);
        state.players[0].rotation = FRAC_PI_2;
        state.players[0].score = 2;

        let (x, y) = strike_point(&state, 0).unwrap();
        assert_approx_eq!(x, 100.0, 1e-3);
        assert_approx_eq!(y, 160.0, 1e-3);

        assert!(strike_point(&state, 1).is_none());
    }

    #[test]
    fn test_single_hit_at_base_range() {
        let base = GameRules::default().attack_base;
        let mut state = arena_with(&[(0, 100.0, 100.0), (1, 100.0 + base, 100.0)]);

        let hits = resolve_attack(&mut state, 0);

        assert_eq!(hits, vec![Hit { attacker: 0, victim: 1 }]);
        assert_eq!(state.players[0].score, 1);
        assert_eq!(state.players[1].score, 0);
    }

    #[test]
    fn test_knockback_along_aim() {
        let rules = GameRules::default();
        let mut state = arena_with(&[(0, 100.0, 100.0), (1, 140.0, 100.0)]);
        state.players[1].score = 5;

        resolve_attack(&mut state, 0);

        assert_approx_eq!(state.players[1].x, 140.0 + rules.knockback);
        assert_approx_eq!(state.players[1].y, 100.0);
        assert_eq!(state.players[1].score, 4);
    }

    #[test]
    fn test_knockback_is_clamped() {
        let mut state = arena_with(&[(0, 730.0, 300.0), (1, 770.0, 300.0)]);

        resolve_attack(&mut state, 0);

        assert_eq!(state.players[1].x, state.rules.max_x());
    }

    #[test]
    fn test_miss_outside_hit_radius() {
        let mut state = arena_with(&[(0, 100.0, 100.0), (1, 100.0, 140.0)]);

        let hits = resolve_attack(&mut state, 0);

        assert!(hits.is_empty());
        assert_eq!(state.players[0].score, 0);
        assert_eq!(state.players[1].position(), (100.0, 140.0));
    }

    #[test]
    fn test_exact_hit_radius_is_a_miss() {
        let mut state = arena_with(&[(0, 100.0, 100.0), (1, 160.0, 100.0)]);

        assert!(resolve_attack(&mut state, 0).is_empty());
    }

    #[test]
    fn test_multiple_victims_in_one_strike() {
        let mut state = arena_with(&[
            (0, 100.0, 100.0),
            (1, 135.0, 100.0),
            (2, 145.0, 105.0),
            (3, 300.0, 300.0),
        ]);
        state.players[2].score = 1;

        let hits = resolve_attack(&mut state, 0);

        assert_eq!(
            hits,
            vec![
                Hit { attacker: 0, victim: 1 },
                Hit { attacker: 0, victim: 2 }
            ]
        );
        assert_eq!(state.players[0].score, 2);
        assert_eq!(state.players[2].score, 0);
        assert_eq!(state.players[3].position(), (300.0, 300.0));
    }

    #[test]
    fn test_inactive_slots_are_never_hit() {
        let mut state = arena_with(&[(0, 100.0, 100.0), (1, 140.0, 100.0)]);
        state.despawn(1);

        assert!(resolve_attack(&mut state, 0).is_empty());
    }

    #[test]
    fn test_reach_grows_with_score() {
        let mut state = arena_with(&[(0, 100.0, 100.0), (1, 200.0, 100.0)]);
        assert!(resolve_attack(&mut state, 0).is_empty());

        // Range 40 + 10 * 6 = 100 reaches the victim exactly.
        state.players[0].score = 6;
        assert_eq!(resolve_attack(&mut state, 0).len(), 1);
        assert_eq!(state.players[0].score, 7);
    }

    #[test]
    fn test_score_never_underflows() {
        let mut state = arena_with(&[(0, 100.0, 100.0), (1, 140.0, 100.0)]);

        let mut total_hits = 0;
        for _ in 0..25 {
            state.players[0].score = 0;
            state.players[1].x = 140.0;
            state.players[1].y = 100.0;
            total_hits += resolve_attack(&mut state, 0).len();
            assert_eq!(state.players[1].score, 0);
        }
        assert_eq!(total_hits, 25);
    }
}
