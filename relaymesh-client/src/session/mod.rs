mod negotiation;
mod orchestrator;
mod peer_session;
mod session_event;

pub use negotiation::*;
pub use orchestrator::*;
pub use peer_session::*;
pub use session_event::*;
