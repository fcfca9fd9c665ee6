//! Performance benchmarks for the per-tick hot paths

use server::combat::resolve_attack;
use server::config::GameRules;
use server::game::GameState;
use server::ingest::classify_read;
use server::session_table::SessionTable;
use shared::{Input, Message, MAX_PLAYERS};
use std::time::Instant;

fn full_arena() -> GameState {
    let mut state = GameState::new(GameRules::default());
    for slot in 0..MAX_PLAYERS {
        state.spawn(slot);
        state.players[slot].x = 100.0 + slot as f32 * 30.0;
    }
    state
}

/// Benchmarks movement integration with clamping
#[test]
fn benchmark_movement_integration() {
    let mut state = full_arena();
    let iterations = 100_000;
    let start = Instant::now();

    for i in 0..iterations {
        let dir = if i % 2 == 0 { 1.0 } else { -1.0 };
        for slot in 0..MAX_PLAYERS {
            state.integrate(slot, dir, -dir);
        }
    }

    let duration = start.elapsed();
    println!(
        "Movement: {} ticks × {} players in {:?} ({:.2} ns/tick)",
        iterations,
        MAX_PLAYERS,
        duration,
        duration.as_nanos() as f64 / iterations as f64
    );

    // Should complete in under 1 second
    assert!(duration.as_millis() < 1000);
}

/// Benchmarks hit resolution with every slot occupied
#[test]
fn benchmark_attack_resolution() {
    let iterations = 50_000;
    let mut total_hits = 0;
    let start = Instant::now();

    for i in 0..iterations {
        let mut state = full_arena();
        let attacker = i % MAX_PLAYERS;
        total_hits += resolve_attack(&mut state, attacker).len();
    }

    let duration = start.elapsed();
    println!(
        "Attack resolution: {} swings ({} hits) in {:?} ({:.2} ns/swing)",
        iterations,
        total_hits,
        duration,
        duration.as_nanos() as f64 / iterations as f64
    );

    // Should complete in under 1 second
    assert!(duration.as_millis() < 1000);
}

/// Benchmarks snapshot construction and encoding, done once per tick
#[test]
fn benchmark_snapshot_encoding() {
    let state = full_arena();
    let iterations = 100_000;
    let mut bytes_out = 0;
    let start = Instant::now();

    for _ in 0..iterations {
        let bytes = Message::StateUpdate(state.snapshot()).encode().unwrap();
        bytes_out += bytes.len();
    }

    let duration = start.elapsed();
    println!(
        "Snapshot encoding: {} snapshots ({} bytes) in {:?} ({:.2} ns/snapshot)",
        iterations,
        bytes_out,
        duration,
        duration.as_nanos() as f64 / iterations as f64
    );

    // Should complete in under 2 seconds
    assert!(duration.as_millis() < 2000);
}

/// Benchmarks classifying and applying raw input reads
#[test]
fn benchmark_input_ingest() {
    let mut state = full_arena();
    let packet = Message::Input(Input::new(0, 0.5, -0.5, 1.0, false))
        .encode()
        .unwrap();

    let iterations = 100_000;
    let start = Instant::now();

    for i in 0..iterations {
        let outcome = classify_read(Ok(packet.len()), &packet);
        if let server::ingest::ReadOutcome::Input(input) = outcome {
            state.apply_input(i % MAX_PLAYERS, &input);
        }
    }

    let duration = start.elapsed();
    println!(
        "Input ingest: {} reads in {:?} ({:.2} ns/read)",
        iterations,
        duration,
        duration.as_nanos() as f64 / iterations as f64
    );

    // Should complete in under 1 second
    assert!(duration.as_millis() < 1000);
}

/// Stress tests slot churn under rapid connect/disconnect
#[test]
fn stress_test_session_churn() {
    let mut table: SessionTable<u32> = SessionTable::new();
    let iterations = 100_000u32;
    let start = Instant::now();

    for i in 0..iterations {
        match table.accept(i) {
            Ok(_) => {}
            Err(_) => {
                table.release((i as usize) % MAX_PLAYERS);
            }
        }
    }

    let duration = start.elapsed();
    println!(
        "Session churn: {} accepts in {:?}, {} slots held",
        iterations,
        duration,
        table.len()
    );

    assert!(table.len() <= MAX_PLAYERS);
    // Should complete in under 100ms
    assert!(duration.as_millis() < 100);
}
