pub mod definitions;
pub mod engine;
pub mod game;
pub mod utils;

// module re-exports
pub use definitions::{
    BoardLocation, BoardSnapshot, CastlingRights, CastlingSide, EngineError, GameResult, Piece,
    PieceType, PlacedPiece, PlayerColor, Team,
};
pub use engine::{Board, Move, SimpleMove};
pub use game::{parse_move, replay_game_log, replay_standard_game};

#[cfg(test)]
mod tests;
