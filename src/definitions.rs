use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/** The four seats around the board, in move order. */
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayerColor {
    Red = 0,
    Blue = 1,
    Yellow = 2,
    Green = 3,
}

impl PlayerColor {
    pub const ALL: [PlayerColor; 4] = [
        PlayerColor::Red,
        PlayerColor::Blue,
        PlayerColor::Yellow,
        PlayerColor::Green,
    ];

    pub fn team(&self) -> Team {
        match self {
            PlayerColor::Red | PlayerColor::Yellow => Team::RedYellow,
            PlayerColor::Blue | PlayerColor::Green => Team::BlueGreen,
        }
    }

    /** Next seat clockwise: Red → Blue → Yellow → Green → Red. */
    pub fn next(&self) -> PlayerColor {
        match self {
            PlayerColor::Red => PlayerColor::Blue,
            PlayerColor::Blue => PlayerColor::Yellow,
            PlayerColor::Yellow => PlayerColor::Green,
            PlayerColor::Green => PlayerColor::Red,
        }
    }

    pub fn previous(&self) -> PlayerColor {
        match self {
            PlayerColor::Red => PlayerColor::Green,
            PlayerColor::Blue => PlayerColor::Red,
            PlayerColor::Yellow => PlayerColor::Blue,
            PlayerColor::Green => PlayerColor::Yellow,
        }
    }

    pub fn index(&self) -> usize {
        *self as usize
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Team {
    RedYellow,
    BlueGreen,
}

impl Team {
    pub fn other(&self) -> Team {
        match self {
            Team::RedYellow => Team::BlueGreen,
            Team::BlueGreen => Team::RedYellow,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PieceType {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

impl PieceType {
    /** Material value; kings are priceless and count for nothing. */
    pub fn value(&self) -> i32 {
        match self {
            PieceType::Pawn => 1,
            PieceType::Knight => 3,
            PieceType::Bishop => 4,
            PieceType::Rook => 5,
            PieceType::Queen => 10,
            PieceType::King => 0,
        }
    }

    pub fn letter(&self) -> char {
        match self {
            PieceType::Pawn => 'P',
            PieceType::Knight => 'N',
            PieceType::Bishop => 'B',
            PieceType::Rook => 'R',
            PieceType::Queen => 'Q',
            PieceType::King => 'K',
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Piece {
    pub player: PlayerColor,
    pub piece_type: PieceType,
}

impl Piece {
    pub fn new(player: PlayerColor, piece_type: PieceType) -> Piece {
        Piece { player, piece_type }
    }

    pub fn team(&self) -> Team {
        self.player.team()
    }

    pub fn value(&self) -> i32 {
        self.piece_type.value()
    }
}

/** Square on the 14x14 cross board. Row 0 is Yellow's back rank,
row 13 is Red's; the 3x3 corner blocks are off-board. */
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoardLocation {
    pub row: i8,
    pub col: i8,
}

impl BoardLocation {
    pub fn new(row: i8, col: i8) -> BoardLocation {
        BoardLocation { row, col }
    }

    /** Offset square; may land off-board, check with `is_legal_location`. */
    pub fn relative(&self, delta_row: i8, delta_col: i8) -> BoardLocation {
        BoardLocation {
            row: self.row + delta_row,
            col: self.col + delta_col,
        }
    }
}

impl Display for BoardLocation {
    /** Algebraic form: column letter 'a'..'n', row number 14 down to 1. */
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}",
            (b'a' + self.col as u8) as char,
            14 - self.row
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacedPiece {
    pub location: BoardLocation,
    pub piece: Piece,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CastlingSide {
    Kingside,
    Queenside,
}

/** What a player is still allowed to castle into. */
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CastlingRights {
    pub kingside: bool,
    pub queenside: bool,
}

impl CastlingRights {
    pub fn none() -> CastlingRights {
        CastlingRights {
            kingside: false,
            queenside: false,
        }
    }

    pub fn any(&self) -> bool {
        self.kingside || self.queenside
    }
}

impl Default for CastlingRights {
    fn default() -> CastlingRights {
        CastlingRights {
            kingside: true,
            queenside: true,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameResult {
    InProgress,
    WinRedYellow,
    WinBlueGreen,
    Stalemate,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("malformed input: {0:?}")]
    MalformedInput(String),
    #[error("illegal move: {0:?}")]
    IllegalMove(String),
    #[error("invalid state: {0}")]
    InvalidState(&'static str),
}

/** Wire form of a position: enough to rebuild a `Board`, history aside. */
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoardSnapshot {
    pub turn: PlayerColor,
    pub placements: Vec<PlacedPiece>,
    pub castling_rights: [CastlingRights; 4],
}
