pub mod entities;
pub mod errors;
pub mod ports;

pub use entities::{Role, SeatRole, Session};
pub use errors::LobbyError;
pub use ports::{Document, ProcessSpawner, RoomProcessHandle, StoreClientError, StorePort};
