//! Common types shared across Questvale crates.

use serde::{Deserialize, Serialize};

/// Simple 2D coordinate.
///
/// Serialized as a `[x, y]` pair, which is how positions appear in save files.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "(i32, i32)", into = "(i32, i32)")]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    /// Creates a new [`Point`].
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Returns the point shifted by `delta`.
    pub fn offset(self, delta: Point) -> Self {
        Self::new(self.x + delta.x, self.y + delta.y)
    }
}

impl From<(i32, i32)> for Point {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

impl From<Point> for (i32, i32) {
    fn from(p: Point) -> Self {
        (p.x, p.y)
    }
}

/// Unified error type for game logic.
#[derive(thiserror::Error, Debug)]
pub enum GameError {
    #[error("invalid operation")]
    InvalidOperation,
    #[error("invalid unit price {0}")]
    InvalidPrice(i32),
    #[error("no such item: {0}")]
    UnknownItem(String),
    #[error("unrecognized action: {0}")]
    InvalidAction(String),
    #[error("save file not found: {0}")]
    SaveMissing(String),
    #[error("save file is corrupt: {0}")]
    SaveCorrupt(String),
    #[error("config error: {0}")]
    Config(String),
    #[error("parse error: {0}")]
    Parse(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl GameError {
    /// True for errors the session can recover from by starting over.
    pub fn is_save_failure(&self) -> bool {
        matches!(self, GameError::SaveMissing(_) | GameError::SaveCorrupt(_))
    }
}

pub type GameResult<T> = Result<T, GameError>;
