//! Events delivered to the consumer.

use std::fmt;

use crate::model::{GameSnapshot, TurnResult};
use crate::schema::{Board, Lobby, Player};

/// Why the connection stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloseReason {
    /// Local shutdown (`disconnect`, `shutdown`, or every handle dropped).
    Requested,
    /// The server closed the socket on a frame boundary.
    PeerClosed,
    /// Malformed frame or broadcast.
    Protocol(String),
    /// Socket read or write failure.
    Io(String),
}

impl fmt::Display for CloseReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CloseReason::Requested => f.write_str("closed by client"),
            CloseReason::PeerClosed => f.write_str("closed by server"),
            CloseReason::Protocol(msg) => write!(f, "protocol error: {}", msg),
            CloseReason::Io(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RosterChange {
    Joined,
    Left,
}

/// Events decoded while in the lobby phase.
#[derive(Debug, Clone, PartialEq)]
pub enum LobbyNotice {
    /// A player joined or left; `lobby` is the roster after the change.
    RosterUpdated {
        change: RosterChange,
        lobby: Option<Lobby>,
    },
    /// The lobby no longer exists.
    Destroyed { lobby: Option<Lobby> },
    /// The game began. Hand, board and turn order are included.
    GameStarted(GameSnapshot),
}

/// Events decoded while a game is running.
#[derive(Debug, Clone, PartialEq)]
pub enum GameNotice {
    TilePlaced { board: Option<Board> },
    TurnAdvanced(TurnResult),
    /// Nothing changed that the broadcast describes; refresh from the server.
    Shuffled,
    /// The game was torn down.
    Terminated,
    /// A player left; the client is back in the lobby phase.
    PlayerLeft { player: Option<Player> },
}

/// Everything the receive loop hands to the consumer.
#[derive(Debug, Clone, PartialEq)]
pub enum BroadcastEvent {
    Lobby(LobbyNotice),
    Game(GameNotice),
    /// Always the last event of a connection.
    Disconnected(CloseReason),
}

impl BroadcastEvent {
    pub fn is_disconnect(&self) -> bool {
        matches!(self, BroadcastEvent::Disconnected(_))
    }
}
