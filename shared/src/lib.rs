use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use std::fmt;
use uuid::Uuid;

pub const SNEK_PORT: u16 = 50541;
pub const VIEWER_PORT: u16 = 50542;
pub const GRID_WIDTH: i32 = 80;
pub const GRID_HEIGHT: i32 = 40;
pub const BASE_SNEK_SIZE: usize = 4;
pub const MIN_FOOD: usize = 3;
pub const MAX_SPAWN_RETRIES: u32 = 100;
pub const IDLE_TIMEOUT_MS: u64 = 5000;
pub const MESSAGE_TTL_MS: u64 = 4000;

/// Upper bound for a single viewer frame body. Anything larger is treated as corrupt.
pub const MAX_FRAME_LEN: usize = 4 * 1024 * 1024;

pub const IDLE_NOTICE: &str = "You're dead since you idled!";
pub const COLLISION_NOTICE: &str = "You're dead since you collided with something!";
pub const NO_ROOM_NOTICE: &str = "There is no room left on the grid!";
pub const SERVER_FULL_NOTICE: &str = "Server full";

pub type SnekId = Uuid;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Coord {
    pub x: i32,
    pub y: i32,
}

impl Coord {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The neighbouring cell one step towards `direction`.
    pub fn offset(self, direction: Direction) -> Coord {
        let (dx, dy) = direction.delta();
        Coord::new(self.x + dx, self.y + dy)
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Left,
        Direction::Right,
        Direction::Up,
        Direction::Down,
    ];

    /// Unit step for this direction. Positive y points down the grid.
    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
        }
    }

    /// Decodes an exact wire token; anything else is not a direction.
    pub fn parse(token: &str) -> Option<Direction> {
        match token {
            "left" => Some(Direction::Left),
            "right" => Some(Direction::Right),
            "up" => Some(Direction::Up),
            "down" => Some(Direction::Down),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Left => "left",
            Direction::Right => "right",
            Direction::Up => "up",
            Direction::Down => "down",
        }
    }

    pub fn opposite(self) -> Direction {
        match self {
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgb({},{},{})", self.r, self.g, self.b)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct SnekColor {
    pub head: Rgb,
    pub body: Rgb,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Snek {
    pub id: SnekId,
    /// Head first, tail last.
    pub body: VecDeque<Coord>,
    pub color: SnekColor,
    pub message: String,
}

impl Snek {
    pub fn new(id: SnekId, body: VecDeque<Coord>, color: SnekColor) -> Self {
        Self {
            id,
            body,
            color,
            message: String::new(),
        }
    }

    pub fn head(&self) -> Option<Coord> {
        self.body.front().copied()
    }

    pub fn neck(&self) -> Option<Coord> {
        self.body.get(1).copied()
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }
}

/// Full board state pushed to viewers on every refresh.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct GridSnapshot {
    pub width: i32,
    pub height: i32,
    pub sneks: HashMap<SnekId, Snek>,
    pub foods: Vec<Coord>,
}

/// A decoded player command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Move(Direction),
    Say(String),
    Name(String),
    Unknown,
}

impl Command {
    /// Decodes one raw command using the fixed-prefix rules of the snek protocol.
    ///
    /// `Move` takes its direction from character 6 onwards, `Say` its text from
    /// character 5 and `Name` from character 6, so `"Move: left"`, `"Say: hi"`
    /// and `"Name: bob"` are the canonical spellings. Offsets count characters,
    /// not bytes. An unrecognised prefix or direction decodes to `Unknown`.
    pub fn parse(raw: &str) -> Command {
        if raw.starts_with("Move") {
            return match Direction::parse(char_tail(raw, 6)) {
                Some(direction) => Command::Move(direction),
                None => Command::Unknown,
            };
        }
        if raw.starts_with("Say") {
            return Command::Say(char_tail(raw, 5).to_string());
        }
        if raw.starts_with("Name") {
            return Command::Name(char_tail(raw, 6).to_string());
        }
        Command::Unknown
    }

    /// Canonical text form understood by [`Command::parse`].
    pub fn to_wire(&self) -> String {
        match self {
            Command::Move(direction) => format!("Move: {}", direction.as_str()),
            Command::Say(text) => format!("Say: {}", text),
            Command::Name(name) => format!("Name: {}", name),
            Command::Unknown => String::new(),
        }
    }
}

fn char_tail(raw: &str, skip: usize) -> &str {
    match raw.char_indices().nth(skip) {
        Some((idx, _)) => &raw[idx..],
        None => "",
    }
}

/// Splits one received chunk into individual commands.
///
/// Every newline-terminated line is a command and a trailing piece without a
/// newline is one as well, so a chunk with no newline at all is exactly one
/// command. Empty lines are skipped and a trailing `\r` is stripped.
pub fn split_commands(chunk: &str) -> impl Iterator<Item = &str> {
    chunk
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .filter(|line| !line.is_empty())
}

/// Reassembles commands from the raw reads of one connection.
///
/// A UTF-8 sequence cut off at the end of a read is held back until the rest
/// arrives, and so is an unterminated line that follows a newline in the same
/// read. A read without any newline is still a single command on its own.
#[derive(Debug, Default)]
pub struct CommandDecoder {
    partial_char: Vec<u8>,
    partial_line: String,
}

impl CommandDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds one read and returns the commands it completed.
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<String> {
        let text = self.decode(bytes);

        if !text.contains('\n') {
            self.partial_line.push_str(&text);
            if !self.partial_char.is_empty() {
                return Vec::new();
            }
            let chunk = std::mem::take(&mut self.partial_line);
            return split_commands(&chunk).map(str::to_string).collect();
        }

        let mut combined = std::mem::take(&mut self.partial_line);
        combined.push_str(&text);
        let (complete, tail) = match combined.rsplit_once('\n') {
            Some(parts) => parts,
            None => (combined.as_str(), ""),
        };
        self.partial_line = tail.to_string();
        split_commands(complete).map(str::to_string).collect()
    }

    /// Bytes still waiting for the rest of a character or line.
    pub fn is_empty(&self) -> bool {
        self.partial_char.is_empty() && self.partial_line.is_empty()
    }

    fn decode(&mut self, bytes: &[u8]) -> String {
        let mut pending = std::mem::take(&mut self.partial_char);
        pending.extend_from_slice(bytes);

        let mut text = String::with_capacity(pending.len());
        let mut rest = pending.as_slice();
        loop {
            match std::str::from_utf8(rest) {
                Ok(valid) => {
                    text.push_str(valid);
                    break;
                }
                Err(e) => {
                    let (valid, after) = rest.split_at(e.valid_up_to());
                    text.push_str(&String::from_utf8_lossy(valid));
                    match e.error_len() {
                        Some(len) => {
                            text.push(char::REPLACEMENT_CHARACTER);
                            rest = &after[len..];
                        }
                        None => {
                            self.partial_char = after.to_vec();
                            break;
                        }
                    }
                }
            }
        }
        text
    }
}

/// Serializes a snapshot as a length-prefixed viewer frame.
pub fn encode_frame(snapshot: &GridSnapshot) -> Result<Vec<u8>, bincode::Error> {
    let body = bincode::serialize(snapshot)?;
    let mut frame = Vec::with_capacity(body.len() + 4);
    frame.extend_from_slice(&(body.len() as u32).to_be_bytes());
    frame.extend_from_slice(&body);
    Ok(frame)
}

/// Decodes the body of a viewer frame (without its length prefix).
pub fn decode_snapshot(body: &[u8]) -> Result<GridSnapshot, bincode::Error> {
    bincode::deserialize(body)
}
