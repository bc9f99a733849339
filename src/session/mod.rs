pub mod config;
pub mod message;
pub mod socket;

pub use config::{SessionConfig, DEFAULT_FALLBACK_TIMEOUT};
pub use message::{ClientMessage, ServerMessage};
pub use socket::{connect, ConnectionState, LiveSession, SessionHandle};

// Live session transport: one persistent bidirectional websocket per process.
// Hooks and the progress indicator see only a cloneable SessionHandle; the
// socket tasks themselves are owned by LiveSession.
