use std::time::Duration;

// Tick cadence and CLI defaults for one match process.

pub const GRAVITY: Duration = Duration::from_millis(800);
pub const LOCK_DELAY: Duration = Duration::from_millis(400);
pub const SNAPSHOT_INTERVAL: Duration = Duration::from_millis(200);

pub const BOARD_W: i32 = crate::domain::tetris::BOARD_W;
pub const BOARD_H: i32 = crate::domain::tetris::BOARD_H;
