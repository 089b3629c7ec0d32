pub mod connection;
pub mod state;
pub mod tick_loops;
pub mod wire;

pub use state::RoomShared;
