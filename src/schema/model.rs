//! Shared game objects: players, lobbies, board and hand.

/// Width and height of the square board.
pub const BOARD_SIZE: usize = 26;

#[derive(Clone, PartialEq, prost::Message)]
pub struct Player {
    #[prost(uint32, tag = "1")]
    pub id: u32,
    #[prost(string, tag = "2")]
    pub name: String,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct Lobby {
    #[prost(uint32, tag = "1")]
    pub id: u32,
    #[prost(message, repeated, tag = "2")]
    pub players: Vec<Player>,
}

/// Summary row returned by `ListLobby`.
#[derive(Clone, PartialEq, prost::Message)]
pub struct LobbyInfo {
    #[prost(uint32, tag = "1")]
    pub id: u32,
    #[prost(uint32, tag = "2")]
    pub max_players: u32,
    #[prost(uint32, tag = "3")]
    pub current_players: u32,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct LobbyInfos {
    #[prost(message, repeated, tag = "1")]
    pub lobby_infos: Vec<LobbyInfo>,
}

/// A letter on the board and the player who placed it.
#[derive(Clone, PartialEq, prost::Message)]
pub struct Tile {
    #[prost(string, tag = "1")]
    pub char: String,
    #[prost(uint32, tag = "2")]
    pub owner: u32,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct Column {
    #[prost(message, optional, tag = "1")]
    pub tile: Option<Tile>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct Row {
    #[prost(message, repeated, tag = "1")]
    pub columns: Vec<Column>,
}

/// Full board, indexed `rows[x].columns[y]`.
#[derive(Clone, PartialEq, prost::Message)]
pub struct Board {
    #[prost(message, repeated, tag = "1")]
    pub rows: Vec<Row>,
}

impl Board {
    /// A `BOARD_SIZE` x `BOARD_SIZE` board with no tiles.
    pub fn empty() -> Self {
        let row = Row {
            columns: vec![Column::default(); BOARD_SIZE],
        };
        Self {
            rows: vec![row; BOARD_SIZE],
        }
    }

    /// Tile at `(x, y)`, or `None` if the cell is empty or out of range.
    pub fn tile(&self, x: usize, y: usize) -> Option<&Tile> {
        self.rows.get(x)?.columns.get(y)?.tile.as_ref()
    }

    /// Number of placed tiles.
    pub fn tile_count(&self) -> usize {
        self.rows
            .iter()
            .flat_map(|row| row.columns.iter())
            .filter(|column| column.tile.is_some())
            .count()
    }
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct Card {
    #[prost(string, optional, tag = "1")]
    pub symbol: Option<String>,
}

/// A hand slot. `card` is `None` once the card has been played this turn.
#[derive(Clone, PartialEq, prost::Message)]
pub struct HandCard {
    #[prost(message, optional, tag = "1")]
    pub card: Option<Card>,
}

impl HandCard {
    /// Letter on the card, if the slot still holds one.
    pub fn symbol(&self) -> Option<&str> {
        self.card.as_ref()?.symbol.as_deref()
    }
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct Cards {
    #[prost(message, repeated, tag = "1")]
    pub cards: Vec<HandCard>,
}

impl Cards {
    /// Hand slots of an optional `Cards` field; an absent hand is empty.
    pub fn hand(cards: Option<Cards>) -> Vec<HandCard> {
        cards.map(|c| c.cards).unwrap_or_default()
    }
}

/// Words formed by the last turn.
#[derive(Clone, PartialEq, prost::Message)]
pub struct Words {
    #[prost(string, repeated, tag = "1")]
    pub words: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_board_dimensions() {
        let board = Board::empty();
        assert_eq!(board.rows.len(), BOARD_SIZE);
        assert!(board.rows.iter().all(|r| r.columns.len() == BOARD_SIZE));
        assert_eq!(board.tile_count(), 0);
    }

    #[test]
    fn test_board_tile_lookup() {
        let mut board = Board::empty();
        board.rows[25].columns[0].tile = Some(Tile {
            char: "c".to_string(),
            owner: 4,
        });

        assert_eq!(board.tile(25, 0).map(|t| t.char.as_str()), Some("c"));
        assert!(board.tile(0, 0).is_none());
        assert!(board.tile(26, 0).is_none());
        assert_eq!(board.tile_count(), 1);
    }

    #[test]
    fn test_hand_card_symbol() {
        let full = HandCard {
            card: Some(Card {
                symbol: Some("q".to_string()),
            }),
        };
        assert_eq!(full.symbol(), Some("q"));
        assert_eq!(HandCard::default().symbol(), None);
    }
}
