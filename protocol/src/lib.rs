//! Shared framed wire protocol used by every peer pair in the platform:
//! lobby↔client, lobby↔store, and room↔client.

pub mod envelope;
pub mod error;
pub mod frame;

pub use envelope::{PushFrame, Request, Response, Status};
pub use error::ProtocolError;
pub use frame::{read_frame, write_frame};
