//! Protobuf payload schema shared with the game server.
//!
//! Messages are declared with `prost` derives rather than generated from
//! `.proto` files, so the crate builds without `protoc`.

mod broadcast;
mod model;
mod rpc;

pub use broadcast::{GameBroadcast, GameEvent, LobbyBroadcast, LobbyEvent};
pub use model::{
    Board, Card, Cards, Column, HandCard, Lobby, LobbyInfo, LobbyInfos, Player, Row, Tile, Words,
    BOARD_SIZE,
};
pub use rpc::{
    CancelRequest, CancelResponse, CardsResponse, ConnectRequest, ConnectResponse, CreateRequest,
    Empty, FinishTurnResponse, JoinRequest, ListResponse, LobbyResponse, RpcResponse,
    SetTileRequest, StartResponse, StatusResponse,
};
