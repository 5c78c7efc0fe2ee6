//! The event sink boundary
//!
//! Dispatch to the consuming runtime is the core's only asynchronous edge.
//! A sink accepts a translated event and hands back an [`EventAck`], a
//! one-shot promise of the runtime's "handled" verdict. The translator
//! awaits the acknowledgment of the genuine event only; synthesized events
//! are fire-and-forget, their acknowledgments dropped on the floor.
//!
//! Cancellation is a first-class outcome, not an error: a sink that is torn
//! down mid-flight simply drops its [`AckSender`], and the pending
//! acknowledgment resolves as "not handled" without surfacing a failure.

use tokio::sync::oneshot;

use crate::error::SinkError;
use crate::event::KeyEvent;

/// Consumer of translated key events.
///
/// The translator holds a [`Weak`](std::sync::Weak) reference to its sink
/// and checks liveness before every dispatch; implementations only need to
/// accept events for as long as they are strongly held.
pub trait EventSink: Send + Sync {
    /// Deliver one translated event, returning the pending acknowledgment.
    fn deliver(&self, event: KeyEvent) -> EventAck;
}

/// Resolver half of an acknowledgment; held by the sink.
///
/// Dropping an unresolved sender cancels the acknowledgment, which the
/// awaiting side reports as `handled = false`.
#[derive(Debug)]
pub struct AckSender {
    tx: oneshot::Sender<Result<bool, SinkError>>,
}

impl AckSender {
    /// Resolve with the runtime's verdict.
    pub fn resolve(self, handled: bool) {
        let _ = self.tx.send(Ok(handled));
    }

    /// Resolve with a delivery failure.
    pub fn fail(self, error: SinkError) {
        let _ = self.tx.send(Err(error));
    }
}

/// Pending acknowledgment for one dispatched event.
#[derive(Debug)]
pub struct EventAck {
    rx: oneshot::Receiver<Result<bool, SinkError>>,
}

impl EventAck {
    /// Create a connected sender/acknowledgment pair.
    pub fn channel() -> (AckSender, EventAck) {
        let (tx, rx) = oneshot::channel();
        (AckSender { tx }, EventAck { rx })
    }

    /// Await the runtime's verdict.
    ///
    /// A cancelled acknowledgment (sender dropped unresolved) yields
    /// `Ok(false)`; only a failure the sink explicitly reported comes back
    /// as an error.
    pub async fn handled(self) -> Result<bool, SinkError> {
        match self.rx.await {
            Ok(verdict) => verdict,
            Err(_) => {
                tracing::debug!("event acknowledgment cancelled before resolution");
                Ok(false)
            }
        }
    }
}
