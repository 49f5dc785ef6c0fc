mod signaling_output;
mod ws_channel;

pub use signaling_output::*;
pub use ws_channel::*;
