use relaymesh_core::RoomId;

/// Requests from the user side of the client, handled by the event loop.
#[derive(Debug)]
pub enum RoomCommand {
    /// Join a room; held back until the relay has assigned our identity.
    Join(RoomId),

    /// Close every session and stop the loop.
    Shutdown,
}
