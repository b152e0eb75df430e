//! Request and response bodies, one pair per verb.

use super::model::{Board, Card, Cards, Lobby, LobbyInfos, Player, Words};

/// Body of verbs that take no arguments. Encodes to zero bytes.
#[derive(Clone, PartialEq, prost::Message)]
pub struct Empty {}

#[derive(Clone, PartialEq, prost::Message)]
pub struct ConnectRequest {
    #[prost(string, tag = "1")]
    pub name: String,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct CreateRequest {
    #[prost(uint32, tag = "1")]
    pub max_players: u32,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct JoinRequest {
    #[prost(uint32, tag = "1")]
    pub lobby_id: u32,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct SetTileRequest {
    #[prost(uint32, tag = "1")]
    pub x: u32,
    #[prost(uint32, tag = "2")]
    pub y: u32,
    #[prost(uint32, tag = "3")]
    pub card_index: u32,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct CancelRequest {
    #[prost(uint32, tag = "1")]
    pub x: u32,
    #[prost(uint32, tag = "2")]
    pub y: u32,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct ConnectResponse {
    #[prost(bool, tag = "1")]
    pub success: bool,
    #[prost(message, optional, tag = "2")]
    pub player: Option<Player>,
}

/// Response to `CreateLobby` and `JoinLobby`.
#[derive(Clone, PartialEq, prost::Message)]
pub struct LobbyResponse {
    #[prost(bool, tag = "1")]
    pub success: bool,
    #[prost(message, optional, tag = "2")]
    pub lobby: Option<Lobby>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct ListResponse {
    #[prost(bool, tag = "1")]
    pub success: bool,
    #[prost(message, optional, tag = "2")]
    pub lobby_infos: Option<LobbyInfos>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct StartResponse {
    #[prost(bool, tag = "1")]
    pub success: bool,
    #[prost(message, optional, tag = "2")]
    pub board: Option<Board>,
    #[prost(message, optional, tag = "3")]
    pub cards: Option<Cards>,
    #[prost(message, optional, tag = "4")]
    pub current_player: Option<Player>,
    #[prost(message, optional, tag = "5")]
    pub next_player: Option<Player>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct FinishTurnResponse {
    #[prost(bool, tag = "1")]
    pub success: bool,
    #[prost(message, optional, tag = "2")]
    pub current_player: Option<Player>,
    #[prost(message, optional, tag = "3")]
    pub next_player: Option<Player>,
    #[prost(message, optional, tag = "4")]
    pub cards: Option<Cards>,
    #[prost(message, optional, tag = "5")]
    pub words: Option<Words>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct CardsResponse {
    #[prost(bool, tag = "1")]
    pub success: bool,
    #[prost(message, optional, tag = "2")]
    pub cards: Option<Cards>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct CancelResponse {
    #[prost(bool, tag = "1")]
    pub success: bool,
    #[prost(message, optional, tag = "2")]
    pub cards: Option<Cards>,
    #[prost(message, optional, tag = "3")]
    pub card: Option<Card>,
}

/// Response of verbs that only report success
/// (Disconnect, Heartbeat, QuitLobby, Ready, SetTile, Exit).
#[derive(Clone, PartialEq, prost::Message)]
pub struct StatusResponse {
    #[prost(bool, tag = "1")]
    pub success: bool,
}

/// A response body carrying the server's success flag.
pub trait RpcResponse: prost::Message + Default {
    fn success(&self) -> bool;
}

macro_rules! impl_rpc_response {
    ($($ty:ty),* $(,)?) => {
        $(
            impl RpcResponse for $ty {
                #[inline]
                fn success(&self) -> bool {
                    self.success
                }
            }
        )*
    };
}

impl_rpc_response!(
    ConnectResponse,
    LobbyResponse,
    ListResponse,
    StartResponse,
    FinishTurnResponse,
    CardsResponse,
    CancelResponse,
    StatusResponse,
);

#[cfg(test)]
mod tests {
    use super::*;
    use prost::Message;

    #[test]
    fn test_empty_encodes_to_nothing() {
        assert!(Empty {}.encode_to_vec().is_empty());
    }

    #[test]
    fn test_missing_success_reads_false() {
        let decoded = StatusResponse::decode(&[][..]).unwrap();
        assert!(!decoded.success());
    }

    #[test]
    fn test_success_flag_survives_encoding() {
        let response = LobbyResponse {
            success: true,
            lobby: Some(Lobby {
                id: 5,
                players: vec![],
            }),
        };
        let decoded = LobbyResponse::decode(response.encode_to_vec().as_slice()).unwrap();
        assert!(decoded.success());
        assert_eq!(decoded.lobby.map(|l| l.id), Some(5));
    }
}
