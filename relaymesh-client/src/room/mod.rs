mod room_command;
mod room_controller;

pub use room_command::*;
pub use room_controller::*;
