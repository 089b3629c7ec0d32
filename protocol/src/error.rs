// Protocol-level errors shared by every framed peer.

#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("connection closed")]
    ConnectionClosed,

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("frame of {0} bytes exceeds the maximum of {1} bytes")]
    FrameTooLarge(u32, u32),

    #[error("frame was not valid utf-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("frame was not valid json: {0}")]
    Json(#[from] serde_json::Error),
}
