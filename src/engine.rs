#![allow(dead_code)]

use std::collections::HashMap;
use std::fmt::{self, Display};

use log::trace;
use serde::{Deserialize, Serialize};

use crate::definitions::{
    BoardLocation, BoardSnapshot, CastlingRights, CastlingSide, EngineError, GameResult, Piece,
    PieceType, PlacedPiece, PlayerColor, Team,
};
use crate::utils::{is_legal_location, is_on_board};

const KNIGHT_OFFSETS: [(i8, i8); 8] = [
    (1, 2),
    (1, -2),
    (-1, 2),
    (-1, -2),
    (2, 1),
    (2, -1),
    (-2, 1),
    (-2, -1),
];

const ROOK_DIRECTIONS: [(i8, i8); 4] = [(0, 1), (0, -1), (1, 0), (-1, 0)];
const BISHOP_DIRECTIONS: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];

/** Square a player's rook starts on. Moving any piece off this square
spends the matching castling right. */
fn initial_rook_location(color: PlayerColor, side: CastlingSide) -> BoardLocation {
    match (color, side) {
        (PlayerColor::Red, CastlingSide::Kingside) => BoardLocation::new(13, 10),
        (PlayerColor::Red, CastlingSide::Queenside) => BoardLocation::new(13, 3),
        (PlayerColor::Blue, CastlingSide::Kingside) => BoardLocation::new(10, 0),
        (PlayerColor::Blue, CastlingSide::Queenside) => BoardLocation::new(3, 0),
        (PlayerColor::Yellow, CastlingSide::Kingside) => BoardLocation::new(0, 3),
        (PlayerColor::Yellow, CastlingSide::Queenside) => BoardLocation::new(0, 10),
        (PlayerColor::Green, CastlingSide::Kingside) => BoardLocation::new(3, 13),
        (PlayerColor::Green, CastlingSide::Queenside) => BoardLocation::new(10, 13),
    }
}

fn rook_location_side(color: PlayerColor, location: BoardLocation) -> Option<CastlingSide> {
    if location == initial_rook_location(color, CastlingSide::Kingside) {
        Some(CastlingSide::Kingside)
    } else if location == initial_rook_location(color, CastlingSide::Queenside) {
        Some(CastlingSide::Queenside)
    } else {
        None
    }
}

/** Score contribution of a piece: positive for Red/Yellow, negative
for Blue/Green. */
fn evaluation_delta(piece: Piece) -> i32 {
    match piece.team() {
        Team::RedYellow => piece.value(),
        Team::BlueGreen => -piece.value(),
    }
}

/** The rook's half of a castling move. */
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimpleMove {
    pub from: BoardLocation,
    pub to: BoardLocation,
    pub piece: Piece,
}

/** A move with everything needed to take it back: the captured piece,
the rook's half of a castle, the rights it spends, and the promotion
choice. `ends_game` is unset until stamped after the move is applied. */
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Move {
    pub from: BoardLocation,
    pub to: BoardLocation,
    pub standard_capture: Option<Piece>,
    pub initial_castling_rights: Option<CastlingRights>,
    pub castling_rights: Option<CastlingRights>,
    pub en_passant_location: Option<BoardLocation>,
    pub en_passant_capture: Option<Piece>,
    pub promotion_piece_type: Option<PieceType>,
    pub rook_move: Option<SimpleMove>,
    ends_game: Option<bool>,
}

impl Move {
    pub fn from_standard_move(
        from: BoardLocation,
        to: BoardLocation,
        standard_capture: Option<Piece>,
        initial_castling_rights: Option<CastlingRights>,
        castling_rights: Option<CastlingRights>,
    ) -> Move {
        Move {
            from,
            to,
            standard_capture,
            initial_castling_rights,
            castling_rights,
            en_passant_location: None,
            en_passant_capture: None,
            promotion_piece_type: None,
            rook_move: None,
            ends_game: None,
        }
    }

    pub fn from_pawn_move(
        from: BoardLocation,
        to: BoardLocation,
        standard_capture: Option<Piece>,
        en_passant_location: Option<BoardLocation>,
        en_passant_capture: Option<Piece>,
        promotion_piece_type: Option<PieceType>,
    ) -> Move {
        Move {
            from,
            to,
            standard_capture,
            initial_castling_rights: None,
            castling_rights: None,
            en_passant_location,
            en_passant_capture,
            promotion_piece_type,
            rook_move: None,
            ends_game: None,
        }
    }

    pub fn from_castling_move(
        from: BoardLocation,
        to: BoardLocation,
        rook_move: SimpleMove,
        initial_castling_rights: Option<CastlingRights>,
        castling_rights: Option<CastlingRights>,
    ) -> Move {
        Move {
            from,
            to,
            standard_capture: None,
            initial_castling_rights,
            castling_rights,
            en_passant_location: None,
            en_passant_capture: None,
            promotion_piece_type: None,
            rook_move: Some(rook_move),
            ends_game: None,
        }
    }

    /** Whatever this move removes from the board, if anything. */
    pub fn capture(&self) -> Option<Piece> {
        self.standard_capture.or(self.en_passant_capture)
    }

    pub fn is_capture(&self) -> bool {
        self.capture().is_some()
    }

    pub fn is_castling(&self) -> bool {
        self.rook_move.is_some()
    }

    /** Two for a pawn double advance, which is what opens the
    en passant window. */
    pub fn manhattan_distance(&self) -> i8 {
        (self.from.row - self.to.row).abs() + (self.from.col - self.to.col).abs()
    }

    pub fn ends_game(&self) -> Option<bool> {
        self.ends_game
    }

    pub fn set_ends_game(&mut self, ends_game: bool) {
        self.ends_game = Some(ends_game);
    }
}

impl Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let separator = if self.is_capture() { 'x' } else { '-' };
        write!(f, "{}{}{}", self.from, separator, self.to)?;
        if let Some(piece_type) = self.promotion_piece_type {
            write!(f, "={}", piece_type.letter())?;
        }
        Ok(())
    }
}

/** Full game state: placement, whose turn it is, castling rights,
material score, and the move history needed for undo and en passant. */
#[derive(Clone, Debug)]
pub struct Board {
    turn: PlayerColor,
    location_to_piece: [[Option<Piece>; 14]; 14],
    piece_list: [Vec<PlacedPiece>; 4],
    castling_rights: [CastlingRights; 4],
    moves: Vec<Move>,
    piece_evaluation: i32,
}

impl PartialEq for Board {
    /** Positions compare by what a player can observe: turn,
    placement, rights, and score. History and list bookkeeping order
    are not part of the position. */
    fn eq(&self, other: &Board) -> bool {
        self.turn == other.turn
            && self.location_to_piece == other.location_to_piece
            && self.castling_rights == other.castling_rights
            && self.piece_evaluation == other.piece_evaluation
    }
}

impl Board {
    pub fn new(
        turn: PlayerColor,
        placement: HashMap<BoardLocation, Piece>,
        castling_rights: Option<[CastlingRights; 4]>,
    ) -> Result<Board, EngineError> {
        let mut board = Board {
            turn,
            location_to_piece: [[None; 14]; 14],
            piece_list: [Vec::new(), Vec::new(), Vec::new(), Vec::new()],
            castling_rights: castling_rights.unwrap_or([CastlingRights::default(); 4]),
            moves: Vec::new(),
            piece_evaluation: 0,
        };
        for (location, piece) in placement {
            if !is_on_board(location) {
                return Err(EngineError::InvalidState("piece placed outside the board"));
            }
            board.set_piece(location, piece);
            board.piece_evaluation += evaluation_delta(piece);
        }
        Ok(board)
    }

    /** The usual four-player start: eight pawns and the standard back
    rank for each seat, Red to move. */
    pub fn standard_setup() -> Board {
        const BACK_RANK: [PieceType; 8] = [
            PieceType::Rook,
            PieceType::Knight,
            PieceType::Bishop,
            PieceType::Queen,
            PieceType::King,
            PieceType::Bishop,
            PieceType::Knight,
            PieceType::Rook,
        ];
        let mut placement = HashMap::new();
        for color in PlayerColor::ALL {
            let (mut location, delta_row, delta_col, pawn_row, pawn_col) = match color {
                PlayerColor::Red => (BoardLocation::new(13, 3), 0, 1, -1, 0),
                PlayerColor::Blue => (BoardLocation::new(3, 0), 1, 0, 0, 1),
                PlayerColor::Yellow => (BoardLocation::new(0, 10), 0, -1, 1, 0),
                PlayerColor::Green => (BoardLocation::new(10, 13), -1, 0, 0, -1),
            };
            for piece_type in BACK_RANK {
                placement.insert(location, Piece::new(color, piece_type));
                placement.insert(
                    location.relative(pawn_row, pawn_col),
                    Piece::new(color, PieceType::Pawn),
                );
                location = location.relative(delta_row, delta_col);
            }
        }
        Board::new(PlayerColor::Red, placement, None).expect("standard setup fits the board")
    }

    pub fn turn(&self) -> PlayerColor {
        self.turn
    }

    /** Material balance, positive when Red/Yellow are ahead. */
    pub fn material_score(&self) -> i32 {
        self.piece_evaluation
    }

    pub fn castling_rights(&self, color: PlayerColor) -> CastlingRights {
        self.castling_rights[color.index()]
    }

    pub fn last_move(&self) -> Option<&Move> {
        self.moves.last()
    }

    pub fn move_history(&self) -> &[Move] {
        &self.moves
    }

    pub fn get_piece(&self, location: BoardLocation) -> Option<Piece> {
        if location.row < 0 || location.row > 13 || location.col < 0 || location.col > 13 {
            return None;
        }
        self.location_to_piece[location.row as usize][location.col as usize]
    }

    fn set_piece(&mut self, location: BoardLocation, piece: Piece) {
        self.location_to_piece[location.row as usize][location.col as usize] = Some(piece);
        self.piece_list[piece.player.index()].push(PlacedPiece { location, piece });
    }

    fn remove_piece(&mut self, location: BoardLocation) -> Piece {
        let piece = self.location_to_piece[location.row as usize][location.col as usize]
            .take()
            .expect("removing a piece from an empty square");
        let placed_pieces = &mut self.piece_list[piece.player.index()];
        if let Some(index) = placed_pieces
            .iter()
            .position(|placed| placed.location == location)
        {
            placed_pieces.remove(index);
        }
        piece
    }

    /** Apply a move produced by move generation. Validates the origin
    before touching anything, so a failed apply leaves the position
    unchanged. */
    pub fn make_move(&mut self, _move: &Move) -> Result<(), EngineError> {
        // A promotion re-creates the piece, so only non-promotions need
        // the mover resolved up front.
        let placed = match (_move.promotion_piece_type, self.get_piece(_move.from)) {
            (Some(piece_type), _) => Piece::new(self.turn, piece_type),
            (None, Some(mover)) => mover,
            (None, None) => {
                return Err(EngineError::InvalidState("no piece at move origin"));
            }
        };
        trace!("apply {}", _move);

        // Capture at the destination, scored against the owner's team.
        if let Some(capture) = self.get_piece(_move.to) {
            self.remove_piece(_move.to);
            self.piece_evaluation -= evaluation_delta(capture);
        }

        self.set_piece(_move.to, placed);
        if self.get_piece(_move.from).is_some() {
            self.remove_piece(_move.from);
        }

        if let Some(en_passant_location) = _move.en_passant_location {
            let captured = self.remove_piece(en_passant_location);
            self.piece_evaluation -= evaluation_delta(captured);
        } else {
            if let Some(rook_move) = _move.rook_move {
                let rook = self.remove_piece(rook_move.from);
                self.set_piece(rook_move.to, rook);
            }
            if let Some(castling_rights) = _move.castling_rights {
                self.castling_rights[self.turn.index()] = castling_rights;
            }
        }

        self.turn = self.turn.next();
        self.moves.push(_move.clone());
        Ok(())
    }

    /** Take back the most recent move. */
    pub fn undo_move(&mut self) -> Result<Move, EngineError> {
        let _move = match self.moves.last() {
            Some(_move) => _move.clone(),
            None => return Err(EngineError::InvalidState("no moves to undo")),
        };
        trace!("undo {}", _move);
        let turn_before = self.turn.previous();

        // Move the piece back; a promoted piece reverts to a pawn.
        match _move.promotion_piece_type {
            Some(_) => self.set_piece(_move.from, Piece::new(turn_before, PieceType::Pawn)),
            None => {
                let piece = self
                    .get_piece(_move.to)
                    .ok_or(EngineError::InvalidState("moved piece missing on undo"))?;
                self.set_piece(_move.from, piece);
            }
        }
        self.remove_piece(_move.to);

        if let Some(capture) = _move.standard_capture {
            self.set_piece(_move.to, capture);
            self.piece_evaluation += evaluation_delta(capture);
        }

        if let Some(en_passant_location) = _move.en_passant_location {
            if let Some(capture) = _move.en_passant_capture {
                self.set_piece(en_passant_location, capture);
                self.piece_evaluation += evaluation_delta(capture);
            }
        } else {
            if let Some(rook_move) = _move.rook_move {
                self.set_piece(rook_move.from, Piece::new(turn_before, PieceType::Rook));
                self.remove_piece(rook_move.to);
            }
            if let Some(initial_rights) = _move.initial_castling_rights {
                self.castling_rights[turn_before.index()] = initial_rights;
            }
        }

        self.turn = turn_before;
        self.moves.pop();
        Ok(_move)
    }

    // --- Move generation ---

    fn add_pawn_moves(
        &self,
        moves: &mut Vec<Move>,
        from: BoardLocation,
        to: BoardLocation,
        color: PlayerColor,
        capture: Option<Piece>,
        en_passant_location: Option<BoardLocation>,
        en_passant_capture: Option<Piece>,
    ) {
        const RED_PROMOTION_ROW: i8 = 3;
        const YELLOW_PROMOTION_ROW: i8 = 10;
        const BLUE_PROMOTION_COL: i8 = 10;
        const GREEN_PROMOTION_COL: i8 = 3;

        let is_promotion = match color {
            PlayerColor::Red => to.row == RED_PROMOTION_ROW,
            PlayerColor::Blue => to.col == BLUE_PROMOTION_COL,
            PlayerColor::Yellow => to.row == YELLOW_PROMOTION_ROW,
            PlayerColor::Green => to.col == GREEN_PROMOTION_COL,
        };

        if is_promotion {
            for piece_type in [
                PieceType::Knight,
                PieceType::Bishop,
                PieceType::Rook,
                PieceType::Queen,
            ] {
                moves.push(Move::from_pawn_move(
                    from,
                    to,
                    capture,
                    en_passant_location,
                    en_passant_capture,
                    Some(piece_type),
                ));
            }
        } else {
            moves.push(Move::from_pawn_move(
                from,
                to,
                capture,
                en_passant_location,
                en_passant_capture,
                None,
            ));
        }
    }

    fn pawn_moves(&self, piece: Piece, from: BoardLocation) -> Vec<Move> {
        let mut moves = Vec::new();
        let color = piece.player;
        let team = piece.team();

        let (delta_row, delta_col, not_moved) = match color {
            PlayerColor::Red => (-1, 0, from.row == 12),
            PlayerColor::Blue => (0, 1, from.col == 1),
            PlayerColor::Yellow => (1, 0, from.row == 1),
            PlayerColor::Green => (0, -1, from.col == 12),
        };

        let forward = from.relative(delta_row, delta_col);
        if is_on_board(forward) {
            match self.get_piece(forward) {
                None => {
                    self.add_pawn_moves(&mut moves, from, forward, color, None, None, None);
                    if not_moved {
                        let double = from.relative(delta_row * 2, delta_col * 2);
                        if self.get_piece(double).is_none() {
                            self.add_pawn_moves(&mut moves, from, double, color, None, None, None);
                        }
                    }
                }
                Some(blocker) => {
                    // En passant: the blocker is an enemy pawn that just
                    // double-advanced onto the forward square; we land on
                    // the square it skipped. A diagonal capture also spans
                    // distance 2, so the last move must be a straight line.
                    if blocker.piece_type == PieceType::Pawn && blocker.team() != team {
                        if let Some(last_move) = self.moves.last() {
                            if last_move.to == forward
                                && last_move.manhattan_distance() == 2
                                && (last_move.from.row == last_move.to.row
                                    || last_move.from.col == last_move.to.col)
                            {
                                let moved_from = last_move.from;
                                let jump_row = forward.row - moved_from.row;
                                let jump_col = forward.col - moved_from.col;
                                let en_passant_to =
                                    moved_from.relative(jump_row / 2, jump_col / 2);
                                self.add_pawn_moves(
                                    &mut moves,
                                    from,
                                    en_passant_to,
                                    color,
                                    None,
                                    Some(forward),
                                    Some(blocker),
                                );
                            }
                        }
                    }
                }
            }
        }

        // Diagonal captures; sideways for the row players, up/down for
        // the column players.
        let check_cols = team == Team::RedYellow;
        for incr in 0..2 {
            let mut capture_row = from.row + delta_row;
            let mut capture_col = from.col + delta_col;
            if check_cols {
                capture_col += if incr == 0 { -1 } else { 1 };
            } else {
                capture_row += if incr == 0 { -1 } else { 1 };
            }
            if is_legal_location(capture_row, capture_col) {
                let to = BoardLocation::new(capture_row, capture_col);
                if let Some(target) = self.get_piece(to) {
                    if target.team() != team {
                        self.add_pawn_moves(&mut moves, from, to, color, Some(target), None, None);
                    }
                }
            }
        }

        moves
    }

    fn knight_moves(&self, piece: Piece, from: BoardLocation) -> Vec<Move> {
        let mut moves = Vec::new();
        for (delta_row, delta_col) in KNIGHT_OFFSETS {
            let to = from.relative(delta_row, delta_col);
            if !is_on_board(to) {
                continue;
            }
            let capture = self.get_piece(to);
            if capture.map_or(true, |target| target.team() != piece.team()) {
                moves.push(Move::from_standard_move(from, to, capture, None, None));
            }
        }
        moves
    }

    fn add_sliding_moves(
        &self,
        moves: &mut Vec<Move>,
        piece: Piece,
        from: BoardLocation,
        incr_row: i8,
        incr_col: i8,
        initial_castling_rights: Option<CastlingRights>,
        castling_rights: Option<CastlingRights>,
    ) {
        let mut to = from.relative(incr_row, incr_col);
        while is_on_board(to) {
            match self.get_piece(to) {
                None => moves.push(Move::from_standard_move(
                    from,
                    to,
                    None,
                    initial_castling_rights,
                    castling_rights,
                )),
                Some(capture) => {
                    if capture.team() != piece.team() {
                        moves.push(Move::from_standard_move(
                            from,
                            to,
                            Some(capture),
                            initial_castling_rights,
                            castling_rights,
                        ));
                    }
                    break;
                }
            }
            to = to.relative(incr_row, incr_col);
        }
    }

    fn bishop_moves(&self, piece: Piece, from: BoardLocation) -> Vec<Move> {
        let mut moves = Vec::new();
        for (incr_row, incr_col) in BISHOP_DIRECTIONS {
            self.add_sliding_moves(&mut moves, piece, from, incr_row, incr_col, None, None);
        }
        moves
    }

    /** Rights spent by moving whatever sits on an original rook
    square, attached to every move from that square. */
    fn rook_rights_update(
        &self,
        color: PlayerColor,
        from: BoardLocation,
    ) -> (Option<CastlingRights>, Option<CastlingRights>) {
        let side = match rook_location_side(color, from) {
            Some(side) => side,
            None => return (None, None),
        };
        let current = self.castling_rights[color.index()];
        match side {
            CastlingSide::Kingside if current.kingside => (
                Some(current),
                Some(CastlingRights {
                    kingside: false,
                    queenside: current.queenside,
                }),
            ),
            CastlingSide::Queenside if current.queenside => (
                Some(current),
                Some(CastlingRights {
                    kingside: current.kingside,
                    queenside: false,
                }),
            ),
            _ => (None, None),
        }
    }

    fn rook_moves(&self, piece: Piece, from: BoardLocation) -> Vec<Move> {
        let mut moves = Vec::new();
        let (initial_castling_rights, castling_rights) =
            self.rook_rights_update(piece.player, from);
        for (incr_row, incr_col) in ROOK_DIRECTIONS {
            self.add_sliding_moves(
                &mut moves,
                piece,
                from,
                incr_row,
                incr_col,
                initial_castling_rights,
                castling_rights,
            );
        }
        moves
    }

    fn queen_moves(&self, piece: Piece, from: BoardLocation) -> Vec<Move> {
        let mut moves = self.bishop_moves(piece, from);
        moves.extend(self.rook_moves(piece, from));
        moves
    }

    /** Squares the king crosses and the rook square, relative to the
    king. The king lands on the second transit square and the rook on
    the first. */
    fn castling_path(
        color: PlayerColor,
        side: CastlingSide,
        from: BoardLocation,
    ) -> (Vec<BoardLocation>, BoardLocation) {
        match (color, side) {
            (PlayerColor::Red, CastlingSide::Kingside) => (
                vec![from.relative(0, 1), from.relative(0, 2)],
                from.relative(0, 3),
            ),
            (PlayerColor::Red, CastlingSide::Queenside) => (
                vec![
                    from.relative(0, -1),
                    from.relative(0, -2),
                    from.relative(0, -3),
                ],
                from.relative(0, -4),
            ),
            (PlayerColor::Blue, CastlingSide::Kingside) => (
                vec![from.relative(1, 0), from.relative(2, 0)],
                from.relative(3, 0),
            ),
            (PlayerColor::Blue, CastlingSide::Queenside) => (
                vec![
                    from.relative(-1, 0),
                    from.relative(-2, 0),
                    from.relative(-3, 0),
                ],
                from.relative(-4, 0),
            ),
            (PlayerColor::Yellow, CastlingSide::Kingside) => (
                vec![from.relative(0, -1), from.relative(0, -2)],
                from.relative(0, -3),
            ),
            (PlayerColor::Yellow, CastlingSide::Queenside) => (
                vec![
                    from.relative(0, 1),
                    from.relative(0, 2),
                    from.relative(0, 3),
                ],
                from.relative(0, 4),
            ),
            (PlayerColor::Green, CastlingSide::Kingside) => (
                vec![from.relative(-1, 0), from.relative(-2, 0)],
                from.relative(-3, 0),
            ),
            (PlayerColor::Green, CastlingSide::Queenside) => (
                vec![
                    from.relative(1, 0),
                    from.relative(2, 0),
                    from.relative(3, 0),
                ],
                from.relative(4, 0),
            ),
        }
    }

    fn king_moves(&self, piece: Piece, from: BoardLocation) -> Vec<Move> {
        let mut moves = Vec::new();
        let current = self.castling_rights[piece.player.index()];
        let (initial_castling_rights, castling_rights) = if current.any() {
            (Some(current), Some(CastlingRights::none()))
        } else {
            (None, None)
        };

        for delta_row in -1..=1 {
            for delta_col in -1..=1 {
                if delta_row == 0 && delta_col == 0 {
                    continue;
                }
                let to = from.relative(delta_row, delta_col);
                if !is_on_board(to) {
                    continue;
                }
                let capture = self.get_piece(to);
                if capture.map_or(true, |target| target.team() != piece.team()) {
                    moves.push(Move::from_standard_move(
                        from,
                        to,
                        capture,
                        initial_castling_rights,
                        castling_rights,
                    ));
                }
            }
        }

        let other_team = piece.team().other();
        for side in [CastlingSide::Queenside, CastlingSide::Kingside] {
            let allowed = match side {
                CastlingSide::Kingside => current.kingside,
                CastlingSide::Queenside => current.queenside,
            };
            if !allowed {
                continue;
            }
            let (squares_between, rook_location) =
                Board::castling_path(piece.player, side, from);

            // The rook must still be home.
            let rook = match self.get_piece(rook_location) {
                Some(rook) => rook,
                None => continue,
            };
            if rook.piece_type != PieceType::Rook || rook.team() != piece.team() {
                continue;
            }

            if squares_between
                .iter()
                .any(|location| self.get_piece(*location).is_some())
            {
                continue;
            }

            // The king may not castle out of or through check.
            if self.is_attacked_by_team(other_team, squares_between[0])
                || self.is_attacked_by_team(other_team, from)
            {
                continue;
            }

            let rook_move = SimpleMove {
                from: rook_location,
                to: squares_between[0],
                piece: rook,
            };
            moves.push(Move::from_castling_move(
                from,
                squares_between[1],
                rook_move,
                initial_castling_rights,
                castling_rights,
            ));
        }

        moves
    }

    fn moves_for_piece(&self, piece: Piece, from: BoardLocation) -> Vec<Move> {
        match piece.piece_type {
            PieceType::Pawn => self.pawn_moves(piece, from),
            PieceType::Knight => self.knight_moves(piece, from),
            PieceType::Bishop => self.bishop_moves(piece, from),
            PieceType::Rook => self.rook_moves(piece, from),
            PieceType::Queen => self.queen_moves(piece, from),
            PieceType::King => self.king_moves(piece, from),
        }
    }

    /** All moves for the side to move before king-safety filtering.
    Empty when that side's king is already off the board, so terminal
    positions never fault. */
    pub fn pseudo_legal_moves(&self) -> Vec<Move> {
        let mut moves = Vec::new();
        if self.king_location(self.turn).is_none() {
            return moves;
        }
        for placed_piece in &self.piece_list[self.turn.index()] {
            moves.extend(self.moves_for_piece(placed_piece.piece, placed_piece.location));
        }
        moves
    }

    fn filter_king_safe(&mut self, candidates: Vec<Move>) -> Vec<Move> {
        let turn = self.turn;
        let other_team = turn.team().other();
        let mut legal_moves = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            self.make_move(&candidate)
                .expect("generated move has a piece at its origin");
            let safe = match self.king_location(turn) {
                Some(king_location) => !self.is_attacked_by_team(other_team, king_location),
                None => true,
            };
            self.undo_move()
                .expect("history holds the move just applied");
            if safe {
                legal_moves.push(candidate);
            }
        }
        legal_moves
    }

    /** Legal moves for the piece at `from`, empty if the square is
    empty or the piece has no legal move. */
    pub fn legal_moves(&mut self, from: BoardLocation) -> Vec<Move> {
        let piece = match self.get_piece(from) {
            Some(piece) => piece,
            None => return Vec::new(),
        };
        let candidates = self.moves_for_piece(piece, from);
        self.filter_king_safe(candidates)
    }

    pub fn all_legal_moves(&mut self) -> Vec<Move> {
        let candidates = self.pseudo_legal_moves();
        self.filter_king_safe(candidates)
    }

    pub fn king_location(&self, color: PlayerColor) -> Option<BoardLocation> {
        self.piece_list[color.index()]
            .iter()
            .find(|placed| placed.piece.piece_type == PieceType::King)
            .map(|placed| placed.location)
    }

    /** False when the king is gone; the game is over by then. */
    pub fn is_king_in_check(&self, color: PlayerColor) -> bool {
        match self.king_location(color) {
            Some(king_location) => {
                self.is_attacked_by_team(color.team().other(), king_location)
            }
            None => false,
        }
    }

    pub fn is_attacked_by_team(&self, team: Team, location: BoardLocation) -> bool {
        // Rooks and queens
        for (incr_row, incr_col) in ROOK_DIRECTIONS {
            let mut row = location.row + incr_row;
            let mut col = location.col + incr_col;
            while (0..14).contains(&row) && (0..14).contains(&col) {
                if let Some(piece) = self.get_piece(BoardLocation::new(row, col)) {
                    if piece.team() == team
                        && matches!(piece.piece_type, PieceType::Rook | PieceType::Queen)
                    {
                        return true;
                    }
                    break;
                }
                row += incr_row;
                col += incr_col;
            }
        }

        // Bishops and queens
        for (incr_row, incr_col) in BISHOP_DIRECTIONS {
            let mut row = location.row + incr_row;
            let mut col = location.col + incr_col;
            while is_legal_location(row, col) {
                if let Some(piece) = self.get_piece(BoardLocation::new(row, col)) {
                    if piece.team() == team
                        && matches!(piece.piece_type, PieceType::Bishop | PieceType::Queen)
                    {
                        return true;
                    }
                    break;
                }
                row += incr_row;
                col += incr_col;
            }
        }

        // Knights
        for (delta_row, delta_col) in KNIGHT_OFFSETS {
            let row = location.row + delta_row;
            let col = location.col + delta_col;
            if is_legal_location(row, col) {
                if let Some(piece) = self.get_piece(BoardLocation::new(row, col)) {
                    if piece.team() == team && piece.piece_type == PieceType::Knight {
                        return true;
                    }
                }
            }
        }

        // Pawns, one diagonal step away in their own capture direction
        for delta_row in [-1, 1] {
            let row = location.row + delta_row;
            if !(0..14).contains(&row) {
                continue;
            }
            for delta_col in [-1, 1] {
                let col = location.col + delta_col;
                if !(0..14).contains(&col) {
                    continue;
                }
                if let Some(piece) = self.get_piece(BoardLocation::new(row, col)) {
                    if piece.team() == team && piece.piece_type == PieceType::Pawn {
                        let attacks = match piece.player {
                            PlayerColor::Red => delta_row == 1,
                            PlayerColor::Blue => delta_col == -1,
                            PlayerColor::Yellow => delta_row == -1,
                            PlayerColor::Green => delta_col == 1,
                        };
                        if attacks {
                            return true;
                        }
                    }
                }
            }
        }

        // Kings
        for delta_row in -1..=1 {
            for delta_col in -1..=1 {
                if delta_row == 0 && delta_col == 0 {
                    continue;
                }
                let row = location.row + delta_row;
                let col = location.col + delta_col;
                if is_legal_location(row, col) {
                    if let Some(piece) = self.get_piece(BoardLocation::new(row, col)) {
                        if piece.team() == team && piece.piece_type == PieceType::King {
                            return true;
                        }
                    }
                }
            }
        }

        false
    }

    /** A win by the team that captured a king with the last move, or
    `InProgress` when the last move captured no king. */
    pub fn king_capture_result(&self) -> GameResult {
        if let Some(last_move) = self.moves.last() {
            if let Some(capture) = last_move.capture() {
                if capture.piece_type == PieceType::King {
                    return match capture.team() {
                        Team::RedYellow => GameResult::WinBlueGreen,
                        Team::BlueGreen => GameResult::WinRedYellow,
                    };
                }
            }
        }
        GameResult::InProgress
    }

    /** Classify the position for the side to move: in progress while
    any legal reply (or a pseudo-legal king capture) exists, otherwise
    stalemate or a win for the attackers. */
    pub fn game_result(&mut self) -> GameResult {
        if self.king_location(self.turn).is_none() {
            return match self.turn.team() {
                Team::RedYellow => GameResult::WinBlueGreen,
                Team::BlueGreen => GameResult::WinRedYellow,
            };
        }
        let player = self.turn;
        for _move in self.pseudo_legal_moves() {
            self.make_move(&_move)
                .expect("generated move has a piece at its origin");
            let king_capture = self.king_capture_result();
            if king_capture != GameResult::InProgress {
                self.undo_move()
                    .expect("history holds the move just applied");
                return king_capture;
            }
            let legal = !self.is_king_in_check(player);
            self.undo_move()
                .expect("history holds the move just applied");
            if legal {
                return GameResult::InProgress;
            }
        }
        if !self.is_king_in_check(player) {
            return GameResult::Stalemate;
        }
        match player.team() {
            Team::RedYellow => GameResult::WinBlueGreen,
            Team::BlueGreen => GameResult::WinRedYellow,
        }
    }

    /** Stamp the last applied move's ends-game marker: set iff it
    captured a king or left the next player without a legal reply.
    Does nothing if there is no history or the marker is already
    stamped. */
    pub fn mark_ends_game(&mut self) {
        let (already_stamped, king_captured) = match self.moves.last() {
            Some(last_move) => (
                last_move.ends_game().is_some(),
                matches!(last_move.capture(), Some(piece) if piece.piece_type == PieceType::King),
            ),
            None => return,
        };
        if already_stamped {
            return;
        }
        let ends_game = king_captured || self.all_legal_moves().is_empty();
        if let Some(last_move) = self.moves.last_mut() {
            last_move.set_ends_game(ends_game);
        }
    }

    pub fn snapshot(&self) -> BoardSnapshot {
        let mut placements = Vec::new();
        for row in 0..14 {
            for col in 0..14 {
                if let Some(piece) = self.location_to_piece[row][col] {
                    placements.push(PlacedPiece {
                        location: BoardLocation::new(row as i8, col as i8),
                        piece,
                    });
                }
            }
        }
        BoardSnapshot {
            turn: self.turn,
            placements,
            castling_rights: self.castling_rights,
        }
    }

    /** Rebuild a position from its snapshot. History does not survive
    the trip; the score is recomputed from the placements. */
    pub fn from_snapshot(snapshot: &BoardSnapshot) -> Result<Board, EngineError> {
        let mut placement = HashMap::new();
        for placed in &snapshot.placements {
            placement.insert(placed.location, placed.piece);
        }
        Board::new(snapshot.turn, placement, Some(snapshot.castling_rights))
    }
}

impl Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..14 {
            for col in 0..14 {
                if is_legal_location(row, col) {
                    match self.location_to_piece[row as usize][col as usize] {
                        Some(piece) => write!(f, "{}", piece.piece_type.letter())?,
                        None => write!(f, ".")?,
                    }
                } else {
                    write!(f, " ")?;
                }
            }
            writeln!(f)?;
        }
        writeln!(f, "Turn: {:?}", self.turn)
    }
}
