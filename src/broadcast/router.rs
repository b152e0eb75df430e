//! Phase-aware decoding of server broadcasts.
//!
//! The server reuses the same channel IDs for differently shaped bodies, so
//! the phase decides which schema a broadcast is read with:
//!
//! ```text
//!  Init ──any frame──► LobbyBroadcast ──Start──► GameBroadcast
//!                            ▲                        │
//!                            └─────────Leave──────────┘
//! ```
//!
//! Losing the connection resets the phase to `Init`.

use std::fmt;

use prost::Message;
use tokio::sync::watch;

use super::event::{BroadcastEvent, CloseReason, GameNotice, LobbyNotice, RosterChange};
use super::queue::EventSender;
use crate::error::{ClientError, Result};
use crate::model::{GameSnapshot, TurnResult};
use crate::protocol::Channel;
use crate::schema::{GameBroadcast, GameEvent, LobbyBroadcast, LobbyEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    /// Nothing received yet.
    #[default]
    Init,
    /// Broadcasts are lobby events.
    LobbyBroadcast,
    /// Broadcasts are game events.
    GameBroadcast,
}

impl Phase {
    /// Channel the server is expected to use in this phase.
    fn expected_channel(self) -> Channel {
        match self {
            Phase::Init | Phase::LobbyBroadcast => Channel::Lobby,
            Phase::GameBroadcast => Channel::Game,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Init => "Init",
            Phase::LobbyBroadcast => "LobbyBroadcast",
            Phase::GameBroadcast => "GameBroadcast",
        };
        f.write_str(name)
    }
}

/// Decodes broadcasts and pushes the resulting events.
///
/// Owned by the receive loop; the only writer of the phase.
pub struct BroadcastRouter {
    phase: watch::Sender<Phase>,
    events: EventSender,
}

impl BroadcastRouter {
    /// Create a router in `Init`, returning a receiver that tracks the phase.
    pub fn new(events: EventSender) -> (Self, watch::Receiver<Phase>) {
        let (phase, rx) = watch::channel(Phase::Init);
        (Self { phase, events }, rx)
    }

    /// Current phase.
    pub fn phase(&self) -> Phase {
        *self.phase.borrow()
    }

    fn transition(&self, next: Phase) {
        let prev = self.phase.send_replace(next);
        if prev != next {
            tracing::debug!(from = %prev, to = %next, "Broadcast phase changed");
        }
    }

    /// Called for every frame, response or broadcast, before it is dispatched.
    ///
    /// A broadcast that moves the router out of `Init` is not consumed by the
    /// advance; it is then decoded as a lobby event by [`route`](Self::route).
    pub fn observe_frame(&self) {
        if self.phase() == Phase::Init {
            self.transition(Phase::LobbyBroadcast);
        }
    }

    /// Decode a broadcast with the schema of the current phase.
    ///
    /// An unreadable body or unknown event tag is an error the caller must
    /// treat as fatal for the connection.
    pub fn route(&self, channel: Channel, payload: &[u8]) -> Result<()> {
        let phase = self.phase();
        if channel != phase.expected_channel() {
            tracing::warn!(?channel, %phase, "Broadcast arrived on unexpected channel");
        }

        match phase {
            Phase::Init | Phase::LobbyBroadcast => self.route_lobby(payload),
            Phase::GameBroadcast => self.route_game(payload),
        }
    }

    fn route_lobby(&self, payload: &[u8]) -> Result<()> {
        let msg = LobbyBroadcast::decode(payload)?;
        let event = LobbyEvent::try_from(msg.event)
            .map_err(|_| ClientError::Protocol(format!("Unknown lobby event {}", msg.event)))?;

        let notice = match event {
            LobbyEvent::Join => LobbyNotice::RosterUpdated {
                change: RosterChange::Joined,
                lobby: msg.lobby,
            },
            LobbyEvent::Leave => LobbyNotice::RosterUpdated {
                change: RosterChange::Left,
                lobby: msg.lobby,
            },
            LobbyEvent::Destroy => LobbyNotice::Destroyed { lobby: msg.lobby },
            LobbyEvent::Start => {
                let snapshot = GameSnapshot::from(msg);
                self.events
                    .push(BroadcastEvent::Lobby(LobbyNotice::GameStarted(snapshot)));
                self.transition(Phase::GameBroadcast);
                return Ok(());
            }
        };

        self.events.push(BroadcastEvent::Lobby(notice));
        Ok(())
    }

    fn route_game(&self, payload: &[u8]) -> Result<()> {
        let msg = GameBroadcast::decode(payload)?;
        let event = GameEvent::try_from(msg.event)
            .map_err(|_| ClientError::Protocol(format!("Unknown game event {}", msg.event)))?;

        let notice = match event {
            GameEvent::PlaceTile => GameNotice::TilePlaced { board: msg.board },
            GameEvent::FinishTurn => GameNotice::TurnAdvanced(TurnResult::from(msg)),
            GameEvent::Shuffle => GameNotice::Shuffled,
            GameEvent::Destroy => GameNotice::Terminated,
            GameEvent::Leave => {
                self.events
                    .push(BroadcastEvent::Game(GameNotice::PlayerLeft { player: msg.player }));
                self.transition(Phase::LobbyBroadcast);
                return Ok(());
            }
        };

        self.events.push(BroadcastEvent::Game(notice));
        Ok(())
    }

    /// Emit the terminal event and reset to `Init`.
    pub fn connection_lost(&self, reason: CloseReason) {
        self.events.push(BroadcastEvent::Disconnected(reason));
        self.transition(Phase::Init);
    }
}
