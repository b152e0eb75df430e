//! Decoded results handed to callers and event consumers.

use crate::schema::{
    Board, Card, Cards, CancelResponse, FinishTurnResponse, GameBroadcast, HandCard, LobbyBroadcast,
    Player, StartResponse,
};

/// Opening state of a game.
#[derive(Debug, Clone, PartialEq)]
pub struct GameSnapshot {
    pub board: Board,
    pub hand: Vec<HandCard>,
    pub current_player: Option<Player>,
    pub next_player: Option<Player>,
}

impl From<StartResponse> for GameSnapshot {
    fn from(res: StartResponse) -> Self {
        Self {
            board: res.board.unwrap_or_else(Board::empty),
            hand: Cards::hand(res.cards),
            current_player: res.current_player,
            next_player: res.next_player,
        }
    }
}

impl From<LobbyBroadcast> for GameSnapshot {
    fn from(msg: LobbyBroadcast) -> Self {
        Self {
            board: msg.board.unwrap_or_else(Board::empty),
            hand: Cards::hand(msg.cards),
            current_player: msg.current_player,
            next_player: msg.next_player,
        }
    }
}

/// Outcome of a finished turn.
#[derive(Debug, Clone, PartialEq)]
pub struct TurnResult {
    pub current_player: Option<Player>,
    pub next_player: Option<Player>,
    pub hand: Vec<HandCard>,
    /// Words formed by the turn that just ended.
    pub words: Vec<String>,
}

impl From<FinishTurnResponse> for TurnResult {
    fn from(res: FinishTurnResponse) -> Self {
        Self {
            current_player: res.current_player,
            next_player: res.next_player,
            hand: Cards::hand(res.cards),
            words: res.words.map(|w| w.words).unwrap_or_default(),
        }
    }
}

impl From<GameBroadcast> for TurnResult {
    fn from(msg: GameBroadcast) -> Self {
        Self {
            current_player: msg.current_player,
            next_player: msg.next_player,
            hand: Cards::hand(msg.cards),
            words: msg.words.map(|w| w.words).unwrap_or_default(),
        }
    }
}

/// Card taken back from the board by `cancel`, with the refreshed hand.
#[derive(Debug, Clone, PartialEq)]
pub struct CancelOutcome {
    pub card: Option<Card>,
    pub hand: Vec<HandCard>,
}

impl From<CancelResponse> for CancelOutcome {
    fn from(res: CancelResponse) -> Self {
        Self {
            card: res.card,
            hand: Cards::hand(res.cards),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Words, BOARD_SIZE};
    use prost::Message;

    #[test]
    fn test_snapshot_defaults_to_empty_board() {
        let snapshot = GameSnapshot::from(StartResponse {
            success: true,
            ..Default::default()
        });
        assert_eq!(snapshot.board.rows.len(), BOARD_SIZE);
        assert!(snapshot.hand.is_empty());
    }

    #[test]
    fn test_turn_result_flattens_words() {
        let result = TurnResult::from(FinishTurnResponse {
            success: true,
            words: Some(Words {
                words: vec!["cat".into(), "at".into()],
            }),
            ..Default::default()
        });
        assert_eq!(result.words, vec!["cat", "at"]);
    }

    #[test]
    fn test_hand_is_read_from_cards_wrapper() {
        let hand: Vec<HandCard> = ["a", "b", "c", "d", "e", "f", "g"]
            .iter()
            .map(|symbol| HandCard {
                card: Some(Card {
                    symbol: Some(symbol.to_string()),
                }),
            })
            .collect();
        let body = StartResponse {
            success: true,
            cards: Some(Cards { cards: hand }),
            ..Default::default()
        }
        .encode_to_vec();

        let decoded = StartResponse::decode(body.as_slice()).unwrap();
        let snapshot = GameSnapshot::from(decoded);
        assert_eq!(snapshot.hand.len(), 7);
        assert_eq!(snapshot.hand[0].symbol(), Some("a"));
        assert_eq!(snapshot.hand[6].symbol(), Some("g"));
    }

    #[test]
    fn test_cancel_outcome_flattens_hand() {
        let outcome = CancelOutcome::from(CancelResponse {
            success: true,
            cards: Some(Cards {
                cards: vec![HandCard::default(); 2],
            }),
            card: Some(Card {
                symbol: Some("q".into()),
            }),
        });
        assert_eq!(outcome.hand.len(), 2);
        assert_eq!(outcome.card.and_then(|c| c.symbol).as_deref(), Some("q"));
    }
}
