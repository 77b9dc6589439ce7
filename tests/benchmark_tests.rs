//! Performance benchmarks for critical game systems

use server::config::GameConfig;
use server::game::{GameState, MoveOutcome};
use server::occupancy::Occupancy;
use shared::{encode_frame, split_commands, Command, Coord, Direction};
use std::time::Instant;

fn crowded_state(players: usize) -> GameState {
    let mut state = GameState::with_seed(GameConfig::default(), 7);
    for _ in 0..players {
        state.add_snek().unwrap();
    }
    state.ensure_min_food();
    state
}

/// Benchmarks cell classification across the whole board
#[test]
fn benchmark_occupancy_checks() {
    let state = crowded_state(20);
    let grid = state.grid();

    let iterations = 20;
    let start = Instant::now();
    let mut bodies = 0usize;

    for _ in 0..iterations {
        for y in -1..=grid.height() {
            for x in -1..=grid.width() {
                if grid.classify(Coord::new(x, y)) == Occupancy::Body {
                    bodies += 1;
                }
            }
        }
    }

    let duration = start.elapsed();
    let checks = iterations * ((grid.width() + 2) * (grid.height() + 2)) as usize;
    println!(
        "Occupancy: {} checks in {:?} ({:.2} ns/check)",
        checks,
        duration,
        duration.as_nanos() as f64 / checks as f64
    );

    assert_eq!(bodies, iterations * 20 * 5);
    // 20 sneks of 5 cells each, scanned linearly; should stay well under a second
    assert!(duration.as_millis() < 1000);
}

/// Benchmarks movement until each snek walks off the board
#[test]
fn benchmark_moves_until_collision() {
    let mut state = GameState::with_seed(GameConfig::default(), 11);
    let rounds = 200;
    let mut moves = 0u64;
    let start = Instant::now();

    for _ in 0..rounds {
        let id = state.add_snek().unwrap();
        state.ensure_min_food();
        loop {
            moves += 1;
            if state.move_snek(&id, Direction::Up) == MoveOutcome::Collision {
                break;
            }
        }
        assert!(!state.grid().contains_snek(&id));
    }

    let duration = start.elapsed();
    println!(
        "Movement: {} moves in {:?} ({:.2} μs/move)",
        moves,
        duration,
        duration.as_micros() as f64 / moves as f64
    );

    assert!(moves >= rounds);
    assert!(duration.as_millis() < 1000);
}

/// Benchmarks spawning onto a filling board
#[test]
fn benchmark_spawning() {
    let start = Instant::now();
    let state = crowded_state(60);
    let duration = start.elapsed();

    println!("Spawning: 60 sneks in {:?}", duration);
    assert_eq!(state.grid().sneks().len(), 60);
    assert!(duration.as_millis() < 500);
}

/// Benchmarks command framing and decoding
#[test]
fn benchmark_command_parsing() {
    let chunk = "Move: up\nMove: left\r\nSay: hello there\nName: ada\nJump\n".repeat(200);

    let iterations = 100;
    let start = Instant::now();
    let mut moves = 0usize;

    for _ in 0..iterations {
        for raw in split_commands(&chunk) {
            if let Command::Move(_) = Command::parse(raw) {
                moves += 1;
            }
        }
    }

    let duration = start.elapsed();
    println!(
        "Parsing: {} chunks in {:?} ({:.2} μs/chunk)",
        iterations,
        duration,
        duration.as_micros() as f64 / iterations as f64
    );

    assert_eq!(moves, iterations * 400);
    assert!(duration.as_millis() < 1000);
}

/// Benchmarks viewer frame encoding with a busy board
#[test]
fn benchmark_snapshot_encoding() {
    let state = crowded_state(40);

    let iterations = 200;
    let start = Instant::now();
    let mut bytes = 0usize;

    for _ in 0..iterations {
        let frame = encode_frame(&state.grid().snapshot()).unwrap();
        bytes += frame.len();
    }

    let duration = start.elapsed();
    println!(
        "Encoding: {} frames ({} bytes) in {:?}",
        iterations, bytes, duration
    );

    assert!(bytes > 0);
    assert!(duration.as_millis() < 2000);
}
