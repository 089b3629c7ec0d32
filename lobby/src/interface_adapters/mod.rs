pub mod clients;
pub mod protocol;
pub mod state;

pub use protocol::dispatch;
pub use state::{AppState, ConnectionState};
