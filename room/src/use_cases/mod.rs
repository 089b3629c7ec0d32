pub mod room_state;

pub use room_state::RoomState;
