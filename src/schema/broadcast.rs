//! Server-pushed broadcast envelopes.

use super::model::{Board, Cards, Lobby, Player, Words};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, prost::Enumeration)]
#[repr(i32)]
pub enum LobbyEvent {
    Join = 0,
    Leave = 1,
    Destroy = 2,
    Start = 3,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, prost::Enumeration)]
#[repr(i32)]
pub enum GameEvent {
    Destroy = 0,
    Leave = 1,
    Shuffle = 2,
    PlaceTile = 3,
    FinishTurn = 4,
}

/// Lobby-phase broadcast. `Start` fills in the opening game state.
#[derive(Clone, PartialEq, prost::Message)]
pub struct LobbyBroadcast {
    #[prost(enumeration = "LobbyEvent", tag = "1")]
    pub event: i32,
    #[prost(message, optional, tag = "2")]
    pub lobby: Option<Lobby>,
    #[prost(message, optional, tag = "3")]
    pub cards: Option<Cards>,
    #[prost(message, optional, tag = "4")]
    pub current_player: Option<Player>,
    #[prost(message, optional, tag = "5")]
    pub next_player: Option<Player>,
    #[prost(message, optional, tag = "6")]
    pub board: Option<Board>,
}

/// Game-phase broadcast.
#[derive(Clone, PartialEq, prost::Message)]
pub struct GameBroadcast {
    #[prost(enumeration = "GameEvent", tag = "1")]
    pub event: i32,
    #[prost(message, optional, tag = "2")]
    pub board: Option<Board>,
    #[prost(message, optional, tag = "3")]
    pub cards: Option<Cards>,
    #[prost(message, optional, tag = "4")]
    pub current_player: Option<Player>,
    #[prost(message, optional, tag = "5")]
    pub next_player: Option<Player>,
    /// Player who left, for `Leave`.
    #[prost(message, optional, tag = "6")]
    pub player: Option<Player>,
    #[prost(message, optional, tag = "7")]
    pub words: Option<Words>,
}
