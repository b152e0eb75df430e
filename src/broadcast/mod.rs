//! Broadcast handling: phase state machine, events, and the hand-off queue.

mod event;
mod queue;
mod router;

pub use event::{BroadcastEvent, CloseReason, GameNotice, LobbyNotice, RosterChange};
pub use queue::{event_queue, EventQueue, EventSender};
pub use router::{BroadcastRouter, Phase};
