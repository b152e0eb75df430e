//! Hand-off queue between the receive loop and the UI tick.
//!
//! One producer (the receive loop), one consumer. Pushing never blocks, and
//! the consumer drains whatever has arrived once per tick.

use tokio::sync::mpsc;

use super::event::BroadcastEvent;

/// Create a connected sender/queue pair.
pub fn event_queue() -> (EventSender, EventQueue) {
    let (tx, rx) = mpsc::unbounded_channel();
    (EventSender { tx }, EventQueue { rx })
}

/// Producing half, owned by the router.
#[derive(Debug, Clone)]
pub struct EventSender {
    tx: mpsc::UnboundedSender<BroadcastEvent>,
}

impl EventSender {
    /// Queue an event. Events pushed after the consumer is gone are dropped.
    pub fn push(&self, event: BroadcastEvent) {
        if let Err(mpsc::error::SendError(event)) = self.tx.send(event) {
            tracing::debug!(?event, "Event queue consumer dropped, discarding event");
        }
    }
}

/// Consuming half, owned by the UI.
#[derive(Debug)]
pub struct EventQueue {
    rx: mpsc::UnboundedReceiver<BroadcastEvent>,
}

impl EventQueue {
    /// Take every queued event, oldest first, without waiting.
    pub fn drain(&mut self) -> Vec<BroadcastEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.rx.try_recv() {
            events.push(event);
        }
        events
    }

    /// Take the oldest queued event, if any.
    pub fn try_next(&mut self) -> Option<BroadcastEvent> {
        self.rx.try_recv().ok()
    }

    /// Wait for the next event. `None` once the connection is gone and the
    /// queue is empty.
    pub async fn recv(&mut self) -> Option<BroadcastEvent> {
        self.rx.recv().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::broadcast::{CloseReason, GameNotice};

    #[test]
    fn test_drain_preserves_order() {
        let (tx, mut queue) = event_queue();
        tx.push(BroadcastEvent::Game(GameNotice::Shuffled));
        tx.push(BroadcastEvent::Game(GameNotice::Terminated));

        let events = queue.drain();
        assert_eq!(
            events,
            vec![
                BroadcastEvent::Game(GameNotice::Shuffled),
                BroadcastEvent::Game(GameNotice::Terminated),
            ]
        );
        assert!(queue.drain().is_empty());
    }

    #[test]
    fn test_try_next_on_empty() {
        let (_tx, mut queue) = event_queue();
        assert!(queue.try_next().is_none());
    }

    #[test]
    fn test_push_after_consumer_dropped() {
        let (tx, queue) = event_queue();
        drop(queue);
        tx.push(BroadcastEvent::Disconnected(CloseReason::Requested));
    }

    #[tokio::test]
    async fn test_recv_ends_when_sender_dropped() {
        let (tx, mut queue) = event_queue();
        tx.push(BroadcastEvent::Game(GameNotice::Shuffled));
        drop(tx);

        assert!(queue.recv().await.is_some());
        assert!(queue.recv().await.is_none());
    }
}
