use std::collections::HashMap;

use super::*;

fn kings_board(turn: PlayerColor, extra: &[(BoardLocation, Piece)]) -> Board {
    let mut placement = HashMap::new();
    placement.insert(
        BoardLocation::new(13, 7),
        Piece::new(PlayerColor::Red, PieceType::King),
    );
    placement.insert(
        BoardLocation::new(7, 0),
        Piece::new(PlayerColor::Blue, PieceType::King),
    );
    placement.insert(
        BoardLocation::new(0, 6),
        Piece::new(PlayerColor::Yellow, PieceType::King),
    );
    placement.insert(
        BoardLocation::new(6, 13),
        Piece::new(PlayerColor::Green, PieceType::King),
    );
    for (location, piece) in extra {
        placement.insert(*location, *piece);
    }
    Board::new(turn, placement, None).unwrap()
}

#[test]
fn standard_setup_shape() {
    let board = Board::standard_setup();
    assert_eq!(board.turn(), PlayerColor::Red);
    assert_eq!(board.material_score(), 0);
    assert_eq!(board.snapshot().placements.len(), 64);
    assert_eq!(
        board.king_location(PlayerColor::Red),
        Some(BoardLocation::new(13, 7))
    );
    assert_eq!(
        board.king_location(PlayerColor::Blue),
        Some(BoardLocation::new(7, 0))
    );
    assert_eq!(
        board.king_location(PlayerColor::Yellow),
        Some(BoardLocation::new(0, 6))
    );
    assert_eq!(
        board.king_location(PlayerColor::Green),
        Some(BoardLocation::new(6, 13))
    );
    for color in PlayerColor::ALL {
        assert!(board.castling_rights(color).kingside);
        assert!(board.castling_rights(color).queenside);
    }
    // Red's pawn rank
    for col in 3..=10 {
        assert_eq!(
            board.get_piece(BoardLocation::new(12, col)),
            Some(Piece::new(PlayerColor::Red, PieceType::Pawn))
        );
    }
}

#[test]
fn make_undo_round_trip() {
    let mut board = Board::standard_setup();
    let reference = board.clone();
    for _move in board.all_legal_moves() {
        board.make_move(&_move).unwrap();
        assert_ne!(board, reference, "applying {_move} changed nothing");
        board.undo_move().unwrap();
        assert_eq!(board, reference, "undoing {_move} left a different position");
        assert!(board.move_history().is_empty());
    }
}

#[test]
fn legality_matches_king_safety() {
    // Red king in check from a blue rook down the h file.
    let mut board = kings_board(
        PlayerColor::Red,
        &[(
            BoardLocation::new(7, 7),
            Piece::new(PlayerColor::Blue, PieceType::Rook),
        )],
    );
    assert!(board.is_king_in_check(PlayerColor::Red));
    let pseudo_legal = board.pseudo_legal_moves();
    let legal = board.all_legal_moves();
    assert!(!legal.is_empty(), "the king has escape squares");
    for _move in &pseudo_legal {
        board.make_move(_move).unwrap();
        let safe = !board.is_king_in_check(PlayerColor::Red);
        board.undo_move().unwrap();
        assert_eq!(
            safe,
            legal.contains(_move),
            "king-safety filter disagrees on {_move}"
        );
    }
}

#[test]
fn promotion_offers_four_choices() {
    let mut board = kings_board(
        PlayerColor::Red,
        &[(
            BoardLocation::new(4, 7),
            Piece::new(PlayerColor::Red, PieceType::Pawn),
        )],
    );
    let moves = board.legal_moves(BoardLocation::new(4, 7));
    assert_eq!(moves.len(), 4, "one advance, four promotion choices");
    let mut choices: Vec<PieceType> = moves
        .iter()
        .map(|_move| {
            assert_eq!(_move.to, BoardLocation::new(3, 7));
            _move.promotion_piece_type.unwrap()
        })
        .collect();
    choices.sort();
    assert_eq!(
        choices,
        vec![
            PieceType::Knight,
            PieceType::Bishop,
            PieceType::Rook,
            PieceType::Queen
        ]
    );
}

#[test]
fn promoted_pawn_reverts_on_undo() {
    let mut board = kings_board(
        PlayerColor::Red,
        &[(
            BoardLocation::new(4, 7),
            Piece::new(PlayerColor::Red, PieceType::Pawn),
        )],
    );
    let reference = board.clone();
    let moves = board.legal_moves(BoardLocation::new(4, 7));
    let promotion = moves
        .iter()
        .find(|_move| _move.promotion_piece_type == Some(PieceType::Queen))
        .unwrap()
        .clone();
    board.make_move(&promotion).unwrap();
    assert_eq!(
        board.get_piece(BoardLocation::new(3, 7)),
        Some(Piece::new(PlayerColor::Red, PieceType::Queen))
    );
    // Captures alone move the score; the promotion itself does not.
    assert_eq!(board.material_score(), reference.material_score());
    board.undo_move().unwrap();
    assert_eq!(board, reference);
    assert_eq!(
        board.get_piece(BoardLocation::new(4, 7)),
        Some(Piece::new(PlayerColor::Red, PieceType::Pawn))
    );
}

#[test]
fn en_passant_window_opens_and_closes() {
    let setup = kings_board(
        PlayerColor::Red,
        &[
            (
                BoardLocation::new(12, 7),
                Piece::new(PlayerColor::Red, PieceType::Pawn),
            ),
            (
                BoardLocation::new(10, 6),
                Piece::new(PlayerColor::Blue, PieceType::Pawn),
            ),
        ],
    );

    // Red double-advances past the blue pawn.
    let mut board = setup.clone();
    let double_push = board
        .legal_moves(BoardLocation::new(12, 7))
        .into_iter()
        .find(|_move| _move.to == BoardLocation::new(10, 7))
        .unwrap();
    assert_eq!(double_push.manhattan_distance(), 2);
    board.make_move(&double_push).unwrap();

    let replies = board.legal_moves(BoardLocation::new(10, 6));
    assert_eq!(replies.len(), 1, "forward is blocked, only the capture");
    let en_passant = &replies[0];
    assert_eq!(en_passant.to, BoardLocation::new(11, 7));
    assert_eq!(en_passant.en_passant_location, Some(BoardLocation::new(10, 7)));
    assert_eq!(en_passant.standard_capture, None);

    let before_capture = board.clone();
    let en_passant = en_passant.clone();
    board.make_move(&en_passant).unwrap();
    assert_eq!(board.get_piece(BoardLocation::new(10, 7)), None);
    assert_eq!(
        board.get_piece(BoardLocation::new(11, 7)),
        Some(Piece::new(PlayerColor::Blue, PieceType::Pawn))
    );
    assert_eq!(board.material_score(), -1);
    board.undo_move().unwrap();
    assert_eq!(board, before_capture);

    // A different red move first: the window never opens.
    let mut board = setup;
    let king_step = board
        .legal_moves(BoardLocation::new(13, 7))
        .into_iter()
        .find(|_move| _move.to == BoardLocation::new(13, 6))
        .unwrap();
    board.make_move(&king_step).unwrap();
    let replies = board.legal_moves(BoardLocation::new(10, 6));
    assert!(replies
        .iter()
        .all(|_move| _move.en_passant_location.is_none()));
}

#[test]
fn diagonal_capture_opens_no_en_passant_window() {
    // A green pawn captures a knight and lands right in front of
    // Red's pawn. The landing spans two squares like a double
    // advance, but diagonally, so there is nothing to capture in
    // passing.
    let mut board = kings_board(
        PlayerColor::Green,
        &[
            (
                BoardLocation::new(3, 5),
                Piece::new(PlayerColor::Green, PieceType::Pawn),
            ),
            (
                BoardLocation::new(4, 4),
                Piece::new(PlayerColor::Red, PieceType::Knight),
            ),
            (
                BoardLocation::new(5, 4),
                Piece::new(PlayerColor::Red, PieceType::Pawn),
            ),
        ],
    );
    let capture = board
        .legal_moves(BoardLocation::new(3, 5))
        .into_iter()
        .find(|_move| _move.to == BoardLocation::new(4, 4))
        .expect("the knight is en prise");
    assert_eq!(capture.manhattan_distance(), 2);
    board.make_move(&capture).unwrap();

    let replies = board.legal_moves(BoardLocation::new(5, 4));
    assert!(
        replies.is_empty(),
        "forward is blocked and nothing passed by: {replies:?}"
    );
}

#[test]
fn king_castles_both_ways_when_clear() {
    let mut board = kings_board(
        PlayerColor::Red,
        &[
            (
                BoardLocation::new(13, 3),
                Piece::new(PlayerColor::Red, PieceType::Rook),
            ),
            (
                BoardLocation::new(13, 10),
                Piece::new(PlayerColor::Red, PieceType::Rook),
            ),
        ],
    );
    let moves = board.legal_moves(BoardLocation::new(13, 7));
    let castles: Vec<&Move> = moves.iter().filter(|_move| _move.is_castling()).collect();
    assert_eq!(castles.len(), 2);
    let kingside = castles
        .iter()
        .find(|_move| _move.to == BoardLocation::new(13, 9))
        .unwrap();
    let rook_move = kingside.rook_move.unwrap();
    assert_eq!(rook_move.from, BoardLocation::new(13, 10));
    assert_eq!(rook_move.to, BoardLocation::new(13, 8));
    let queenside = castles
        .iter()
        .find(|_move| _move.to == BoardLocation::new(13, 5))
        .unwrap();
    let rook_move = queenside.rook_move.unwrap();
    assert_eq!(rook_move.from, BoardLocation::new(13, 3));
    assert_eq!(rook_move.to, BoardLocation::new(13, 6));
}

#[test]
fn castling_through_check_is_rejected() {
    // A blue rook covers the kingside transit square h1 (13, 8).
    let mut board = kings_board(
        PlayerColor::Red,
        &[
            (
                BoardLocation::new(13, 3),
                Piece::new(PlayerColor::Red, PieceType::Rook),
            ),
            (
                BoardLocation::new(13, 10),
                Piece::new(PlayerColor::Red, PieceType::Rook),
            ),
            (
                BoardLocation::new(3, 8),
                Piece::new(PlayerColor::Blue, PieceType::Rook),
            ),
        ],
    );
    let moves = board.legal_moves(BoardLocation::new(13, 7));
    let castles: Vec<&Move> = moves.iter().filter(|_move| _move.is_castling()).collect();
    assert_eq!(castles.len(), 1);
    assert_eq!(castles[0].to, BoardLocation::new(13, 5));
}

#[test]
fn spent_right_blocks_castling() {
    let mut rights = [CastlingRights::default(); 4];
    rights[PlayerColor::Red.index()] = CastlingRights {
        kingside: false,
        queenside: true,
    };
    let mut placement = HashMap::new();
    placement.insert(
        BoardLocation::new(13, 7),
        Piece::new(PlayerColor::Red, PieceType::King),
    );
    placement.insert(
        BoardLocation::new(13, 3),
        Piece::new(PlayerColor::Red, PieceType::Rook),
    );
    placement.insert(
        BoardLocation::new(13, 10),
        Piece::new(PlayerColor::Red, PieceType::Rook),
    );
    placement.insert(
        BoardLocation::new(7, 0),
        Piece::new(PlayerColor::Blue, PieceType::King),
    );
    let mut board = Board::new(PlayerColor::Red, placement, Some(rights)).unwrap();
    let moves = board.legal_moves(BoardLocation::new(13, 7));
    let castles: Vec<&Move> = moves.iter().filter(|_move| _move.is_castling()).collect();
    assert_eq!(castles.len(), 1);
    assert_eq!(castles[0].to, BoardLocation::new(13, 5));
}

#[test]
fn moving_a_rook_spends_its_right() {
    let mut board = kings_board(
        PlayerColor::Red,
        &[
            (
                BoardLocation::new(13, 3),
                Piece::new(PlayerColor::Red, PieceType::Rook),
            ),
            (
                BoardLocation::new(13, 10),
                Piece::new(PlayerColor::Red, PieceType::Rook),
            ),
        ],
    );
    let rook_step = board
        .legal_moves(BoardLocation::new(13, 10))
        .into_iter()
        .find(|_move| _move.to == BoardLocation::new(12, 10))
        .unwrap();
    assert_eq!(
        rook_step.castling_rights,
        Some(CastlingRights {
            kingside: false,
            queenside: true,
        })
    );
    board.make_move(&rook_step).unwrap();
    assert!(!board.castling_rights(PlayerColor::Red).kingside);
    assert!(board.castling_rights(PlayerColor::Red).queenside);
    board.undo_move().unwrap();
    assert!(board.castling_rights(PlayerColor::Red).kingside);
}

#[test]
fn moving_the_king_spends_both_rights() {
    let mut board = kings_board(
        PlayerColor::Red,
        &[
            (
                BoardLocation::new(13, 3),
                Piece::new(PlayerColor::Red, PieceType::Rook),
            ),
            (
                BoardLocation::new(13, 10),
                Piece::new(PlayerColor::Red, PieceType::Rook),
            ),
        ],
    );
    let king_step = board
        .legal_moves(BoardLocation::new(13, 7))
        .into_iter()
        .find(|_move| _move.to == BoardLocation::new(12, 7))
        .unwrap();
    board.make_move(&king_step).unwrap();
    assert!(!board.castling_rights(PlayerColor::Red).kingside);
    assert!(!board.castling_rights(PlayerColor::Red).queenside);
    board.undo_move().unwrap();
    assert!(board.castling_rights(PlayerColor::Red).kingside);
    assert!(board.castling_rights(PlayerColor::Red).queenside);
}

#[test]
fn yellow_queenside_castle_walks_toward_its_rook() {
    let mut board = kings_board(
        PlayerColor::Yellow,
        &[(
            BoardLocation::new(0, 10),
            Piece::new(PlayerColor::Yellow, PieceType::Rook),
        )],
    );
    let moves = board.legal_moves(BoardLocation::new(0, 6));
    let castle = moves
        .iter()
        .find(|_move| _move.is_castling())
        .expect("queenside castle generates");
    assert_eq!(castle.to, BoardLocation::new(0, 8));
    let rook_move = castle.rook_move.unwrap();
    assert_eq!(rook_move.from, BoardLocation::new(0, 10));
    assert_eq!(rook_move.to, BoardLocation::new(0, 7));
}

#[test]
fn attack_rays_stop_at_blockers() {
    let board = kings_board(
        PlayerColor::Red,
        &[
            (
                BoardLocation::new(7, 5),
                Piece::new(PlayerColor::Blue, PieceType::Rook),
            ),
            (
                BoardLocation::new(7, 8),
                Piece::new(PlayerColor::Yellow, PieceType::Pawn),
            ),
        ],
    );
    assert!(board.is_attacked_by_team(Team::BlueGreen, BoardLocation::new(7, 7)));
    // The yellow pawn shadows everything past it.
    assert!(!board.is_attacked_by_team(Team::BlueGreen, BoardLocation::new(7, 10)));
}

#[test]
fn pawns_attack_in_their_own_direction() {
    let board = kings_board(
        PlayerColor::Red,
        &[(
            BoardLocation::new(8, 7),
            Piece::new(PlayerColor::Red, PieceType::Pawn),
        )],
    );
    // Red pawns capture toward lower rows only.
    assert!(board.is_attacked_by_team(Team::RedYellow, BoardLocation::new(7, 6)));
    assert!(board.is_attacked_by_team(Team::RedYellow, BoardLocation::new(7, 8)));
    assert!(!board.is_attacked_by_team(Team::RedYellow, BoardLocation::new(9, 6)));
    assert!(!board.is_attacked_by_team(Team::RedYellow, BoardLocation::new(9, 8)));
}

#[test]
fn first_move_scenario() {
    let mut board = Board::standard_setup();
    let _move = parse_move(&mut board, "h2-h3").unwrap().unwrap();
    assert_eq!(_move.from, BoardLocation::new(12, 7));
    assert_eq!(_move.to, BoardLocation::new(11, 7));
    assert!(!_move.is_capture());
    board.make_move(&_move).unwrap();
    assert_eq!(board.turn(), PlayerColor::Blue);
    assert_eq!(board.material_score(), 0);
    board.mark_ends_game();
    assert_eq!(board.last_move().unwrap().ends_game(), Some(false));
}

#[test]
fn replay_one_full_round() {
    let (board, moves) =
        replay_standard_game("1. h2-h3 .. b7-c7 .. g13-g12 .. m8-l8").unwrap();
    assert_eq!(moves.len(), 4);
    assert_eq!(board.turn(), PlayerColor::Red);
    assert_eq!(moves[0].to_string(), "h2-h3");
    assert_eq!(
        board.get_piece(BoardLocation::new(11, 7)),
        Some(Piece::new(PlayerColor::Red, PieceType::Pawn))
    );
    assert_eq!(
        board.get_piece(BoardLocation::new(7, 2)),
        Some(Piece::new(PlayerColor::Blue, PieceType::Pawn))
    );
    assert_eq!(
        board.get_piece(BoardLocation::new(2, 6)),
        Some(Piece::new(PlayerColor::Yellow, PieceType::Pawn))
    );
    assert_eq!(
        board.get_piece(BoardLocation::new(6, 11)),
        Some(Piece::new(PlayerColor::Green, PieceType::Pawn))
    );
}

#[test]
fn replay_round_trip_restores_setup() {
    let (mut board, moves) =
        replay_standard_game("1. h2-h3 .. b7-c7 .. g13-g12 .. m8-l8").unwrap();
    for _ in 0..moves.len() {
        board.undo_move().unwrap();
    }
    assert_eq!(board, Board::standard_setup());
}

#[test]
fn castling_token_resolves_to_the_king_move() {
    let mut board = kings_board(
        PlayerColor::Red,
        &[(
            BoardLocation::new(13, 3),
            Piece::new(PlayerColor::Red, PieceType::Rook),
        )],
    );
    let _move = parse_move(&mut board, "O-O-O").unwrap().unwrap();
    assert_eq!(_move.from, BoardLocation::new(13, 7));
    assert_eq!(_move.to, BoardLocation::new(13, 5));
    assert!(_move.is_castling());
}

#[test]
fn malformed_token_aborts_the_log() {
    let result = replay_standard_game("1. z9-z9 .. b7-c7");
    assert_eq!(
        result.unwrap_err(),
        EngineError::MalformedInput("z9-z9".to_string())
    );
}

#[test]
fn illegal_move_names_the_token() {
    let result = replay_standard_game("1. h2-h5");
    assert_eq!(
        result.unwrap_err(),
        EngineError::IllegalMove("h2-h5".to_string())
    );
}

#[test]
fn log_without_moves_is_malformed() {
    let result = replay_standard_game("just commentary\nno numbered lines here");
    assert!(matches!(
        result.unwrap_err(),
        EngineError::MalformedInput(_)
    ));
}

#[test]
fn too_many_tokens_per_line_is_malformed() {
    let result = replay_standard_game("1. h2-h3 b7-c7 g13-g12 m8-l8 h3-h4");
    assert!(matches!(
        result.unwrap_err(),
        EngineError::MalformedInput(_)
    ));
}

#[test]
fn game_end_markers_are_skipped() {
    let (_, moves) = replay_standard_game("1. h2-h3 .. b7-c7 .. R").unwrap();
    assert_eq!(moves.len(), 2);
}

#[test]
fn undo_on_fresh_board_is_an_error() {
    let mut board = Board::standard_setup();
    assert_eq!(
        board.undo_move().unwrap_err(),
        EngineError::InvalidState("no moves to undo")
    );
}

#[test]
fn apply_from_empty_square_is_an_error() {
    let mut board = Board::standard_setup();
    let ghost = Move::from_standard_move(
        BoardLocation::new(7, 7),
        BoardLocation::new(7, 8),
        None,
        None,
        None,
    );
    let reference = board.clone();
    assert!(board.make_move(&ghost).is_err());
    assert_eq!(board, reference, "failed apply must not touch the board");
}

#[test]
fn king_capture_ends_the_game() {
    let mut board = kings_board(
        PlayerColor::Red,
        &[(
            BoardLocation::new(7, 1),
            Piece::new(PlayerColor::Red, PieceType::Queen),
        )],
    );
    let capture = board
        .legal_moves(BoardLocation::new(7, 1))
        .into_iter()
        .find(|_move| _move.to == BoardLocation::new(7, 0))
        .expect("the blue king is en prise");
    board.make_move(&capture).unwrap();
    board.mark_ends_game();
    assert_eq!(board.last_move().unwrap().ends_game(), Some(true));
    assert_eq!(board.king_capture_result(), GameResult::WinRedYellow);
    assert_eq!(board.game_result(), GameResult::WinRedYellow);
    // Blue has no king, so blue has no moves.
    assert!(board.pseudo_legal_moves().is_empty());
}

#[test]
fn standard_setup_is_in_progress() {
    let mut board = Board::standard_setup();
    assert_eq!(board.game_result(), GameResult::InProgress);
}

#[test]
fn boxed_in_king_is_stalemated() {
    // Blue to move with a lone king on b7; red rooks cover every
    // escape square but never give check.
    let mut placement = HashMap::new();
    placement.insert(
        BoardLocation::new(7, 0),
        Piece::new(PlayerColor::Blue, PieceType::King),
    );
    placement.insert(
        BoardLocation::new(13, 7),
        Piece::new(PlayerColor::Red, PieceType::King),
    );
    placement.insert(
        BoardLocation::new(6, 5),
        Piece::new(PlayerColor::Red, PieceType::Rook),
    );
    placement.insert(
        BoardLocation::new(8, 5),
        Piece::new(PlayerColor::Red, PieceType::Rook),
    );
    placement.insert(
        BoardLocation::new(3, 1),
        Piece::new(PlayerColor::Red, PieceType::Rook),
    );
    let mut board = Board::new(PlayerColor::Blue, placement, None).unwrap();
    assert!(!board.is_king_in_check(PlayerColor::Blue));
    assert!(board.all_legal_moves().is_empty());
    assert_eq!(board.game_result(), GameResult::Stalemate);
}

#[test]
fn snapshot_round_trip() {
    let (board, _) = replay_standard_game("1. h2-h3 .. b7-c7").unwrap();
    let snapshot = board.snapshot();
    let encoded = serde_json::to_string(&snapshot).unwrap();
    let decoded: BoardSnapshot = serde_json::from_str(&encoded).unwrap();
    let restored = Board::from_snapshot(&decoded).unwrap();
    assert_eq!(restored, board);
    assert_eq!(restored.material_score(), board.material_score());
    assert!(restored.move_history().is_empty());
}
