//! Minimal actor plumbing: unbounded channels that carry the sender's
//! tracing span with every event, so handler logs nest under the code that
//! produced the event.

pub mod switcher;

use tokio::sync::mpsc;
use tracing::Span;

pub struct Sender<T>(mpsc::UnboundedSender<(Span, T)>);

impl<T> Clone for Sender<T> {
    fn clone(&self) -> Self { Sender(self.0.clone()) }
}

impl<T> Sender<T> {
    /// Send, tagging the event with the current span. Returns false if the
    /// receiving actor is gone.
    pub fn try_send(&self, event: T) -> bool {
        self.0.send((Span::current(), event)).is_ok()
    }
}

pub struct Receiver<T>(mpsc::UnboundedReceiver<(Span, T)>);

impl<T> Receiver<T> {
    pub async fn recv(&mut self) -> Option<(Span, T)> { self.0.recv().await }
}

pub fn channel<T>() -> (Sender<T>, Receiver<T>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (Sender(tx), Receiver(rx))
}
