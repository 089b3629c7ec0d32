pub mod entities;
pub mod errors;
pub mod tetris;

pub use entities::{Phase, Seat};
pub use errors::RoomError;
