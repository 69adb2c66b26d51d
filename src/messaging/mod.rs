pub mod event;
pub mod router;

pub use event::{ConnectionError, ConnectionEvent, DisconnectReason};
pub use router::{Dispatch, FrameDispatcher, MessageHandler};
