use async_trait::async_trait;
use relaymesh_core::SignalMessage;

/// Outbound half of the signal channel.
///
/// Delivery is fire-and-forget: there is no acknowledgement and a failed
/// send is not retried.
#[async_trait]
pub trait SignalingOutput: Send + Sync {
    async fn send_signal(&self, msg: SignalMessage);
}
