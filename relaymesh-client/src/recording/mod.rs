mod recording_session;
mod uploader;

pub use recording_session::*;
pub use uploader::*;
