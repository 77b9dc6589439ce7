//! Keyboard steering with press detection and hold-to-repeat

use macroquad::prelude::*;
use shared::Direction;
use std::time::{Duration, Instant};

/// Held keys resend their direction at this pace so the server never idles us out.
pub const REPEAT_INTERVAL: Duration = Duration::from_millis(150);

/// Per-frame key sample, decoupled from macroquad so it can be tested
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeySample {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

impl KeySample {
    /// Reads arrow keys and WASD from the current frame.
    pub fn capture() -> Self {
        Self {
            up: is_key_down(KeyCode::Up) || is_key_down(KeyCode::W),
            down: is_key_down(KeyCode::Down) || is_key_down(KeyCode::S),
            left: is_key_down(KeyCode::Left) || is_key_down(KeyCode::A),
            right: is_key_down(KeyCode::Right) || is_key_down(KeyCode::D),
        }
    }

    fn is_down(&self, direction: Direction) -> bool {
        match direction {
            Direction::Up => self.up,
            Direction::Down => self.down,
            Direction::Left => self.left,
            Direction::Right => self.right,
        }
    }
}

/// First direction that went down this frame, in `Direction::ALL` order.
pub fn newly_pressed(previous: KeySample, current: KeySample) -> Option<Direction> {
    Direction::ALL
        .into_iter()
        .find(|&d| current.is_down(d) && !previous.is_down(d))
}

/// First direction currently held, in `Direction::ALL` order.
pub fn held(current: KeySample) -> Option<Direction> {
    Direction::ALL.into_iter().find(|&d| current.is_down(d))
}

/// Turns key samples into direction requests
pub struct InputManager {
    previous: KeySample,
    last_sent: Option<Instant>,
}

impl InputManager {
    pub fn new() -> Self {
        Self {
            previous: KeySample::default(),
            last_sent: None,
        }
    }

    /// Samples the keyboard and returns a direction to send, if any.
    pub fn update(&mut self) -> Option<Direction> {
        self.process(KeySample::capture(), Instant::now())
    }

    /// A fresh press is sent right away; a held key repeats every [`REPEAT_INTERVAL`].
    pub fn process(&mut self, sample: KeySample, now: Instant) -> Option<Direction> {
        let pressed = newly_pressed(self.previous, sample);
        self.previous = sample;

        let direction = match pressed {
            Some(direction) => Some(direction),
            None => {
                let due = self
                    .last_sent
                    .map_or(true, |sent| now.duration_since(sent) >= REPEAT_INTERVAL);
                if due {
                    held(sample)
                } else {
                    None
                }
            }
        };

        if direction.is_some() {
            self.last_sent = Some(now);
        }
        direction
    }
}

impl Default for InputManager {
    fn default() -> Self {
        Self::new()
    }
}
