use log::debug;

use crate::definitions::{BoardLocation, EngineError, PieceType, PlayerColor};
use crate::engine::{Board, Move};
use crate::utils::{parse_location, parse_promotion};

/** What a game-log token resolves to before it is matched against
the legal moves of the position. */
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct MoveToken {
    from: BoardLocation,
    to: BoardLocation,
    promotion: Option<PieceType>,
    castling: bool,
}

fn king_origin(color: PlayerColor) -> BoardLocation {
    match color {
        PlayerColor::Red => BoardLocation::new(13, 7),
        PlayerColor::Blue => BoardLocation::new(7, 0),
        PlayerColor::Yellow => BoardLocation::new(0, 6),
        PlayerColor::Green => BoardLocation::new(6, 13),
    }
}

fn kingside_destination(color: PlayerColor) -> BoardLocation {
    match color {
        PlayerColor::Red => BoardLocation::new(13, 9),
        PlayerColor::Blue => BoardLocation::new(9, 0),
        PlayerColor::Yellow => BoardLocation::new(0, 4),
        PlayerColor::Green => BoardLocation::new(4, 13),
    }
}

fn queenside_destination(color: PlayerColor) -> BoardLocation {
    match color {
        PlayerColor::Red => BoardLocation::new(13, 5),
        PlayerColor::Blue => BoardLocation::new(5, 0),
        PlayerColor::Yellow => BoardLocation::new(0, 8),
        PlayerColor::Green => BoardLocation::new(8, 13),
    }
}

/** Decode one token of the current player. `None` for the game-end
markers (`#`, `R`, `T`), which carry no move. */
fn decode_token(color: PlayerColor, token: &str) -> Result<Option<MoveToken>, EngineError> {
    if matches!(token, "#" | "R" | "T") {
        return Ok(None);
    }
    let trimmed = token.trim_end_matches(['+', '#']);
    if trimmed == "O-O" || trimmed == "O-O-O" {
        let to = if trimmed == "O-O" {
            kingside_destination(color)
        } else {
            queenside_destination(color)
        };
        return Ok(Some(MoveToken {
            from: king_origin(color),
            to,
            promotion: None,
            castling: true,
        }));
    }
    let malformed = || EngineError::MalformedInput(token.to_string());
    let (next, from) = parse_location(trimmed, 0).ok_or_else(malformed)?;
    let (next, to) = parse_location(trimmed, next).ok_or_else(malformed)?;
    let (next, promotion) = parse_promotion(trimmed, next);
    if next != trimmed.len() {
        return Err(malformed());
    }
    Ok(Some(MoveToken {
        from,
        to,
        promotion,
        castling: false,
    }))
}

/** Resolve a token against the position: the unique legal move with
the token's origin, destination, and promotion choice. Castling
tokens only match a castling move. `None` for game-end markers. */
pub fn parse_move(board: &mut Board, token: &str) -> Result<Option<Move>, EngineError> {
    let decoded = match decode_token(board.turn(), token)? {
        Some(decoded) => decoded,
        None => return Ok(None),
    };
    for candidate in board.all_legal_moves() {
        if candidate.from == decoded.from
            && candidate.to == decoded.to
            && candidate.promotion_piece_type == decoded.promotion
            && (!decoded.castling || candidate.is_castling())
        {
            return Ok(Some(candidate));
        }
    }
    Err(EngineError::IllegalMove(token.to_string()))
}

/** Drop parenthesized variations, including ones spanning lines.
An unmatched closing parenthesis is left for the token parser to
reject. */
fn strip_variations(text: &str) -> String {
    let mut depth = 0usize;
    let mut stripped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '(' => depth += 1,
            ')' if depth > 0 => depth -= 1,
            _ if depth == 0 => stripped.push(c),
            _ => {}
        }
    }
    stripped
}

/** `"12. rest"` is a move line; everything else is commentary. */
fn move_line(line: &str) -> Option<&str> {
    let digits = line.bytes().take_while(|b| b.is_ascii_digit()).count();
    if digits == 0 {
        return None;
    }
    line[digits..].strip_prefix(". ")
}

/** Replay a game log on top of `board`. Returns the applied moves.
The first unparseable or illegal token aborts the rest of the log;
the board keeps the moves applied up to that point. */
pub fn replay_game_log(board: &mut Board, text: &str) -> Result<Vec<Move>, EngineError> {
    let stripped = strip_variations(text);
    let mut moves = Vec::new();
    let mut matched_lines = 0;
    for line in stripped.lines() {
        let rest = match move_line(line) {
            Some(rest) => rest,
            None => continue,
        };
        matched_lines += 1;
        let cleaned = rest.replace("..", " ");
        let tokens: Vec<&str> = cleaned.split_whitespace().collect();
        if tokens.len() > 4 {
            return Err(EngineError::MalformedInput(line.to_string()));
        }
        for token in tokens {
            if let Some(_move) = parse_move(board, token)? {
                debug!("replay {}: {}", moves.len() + 1, _move);
                board.make_move(&_move)?;
                moves.push(_move);
            }
        }
    }
    if matched_lines == 0 {
        return Err(EngineError::MalformedInput(
            "no move lines in game log".to_string(),
        ));
    }
    Ok(moves)
}

/** Replay a game log from the standard setup. */
pub fn replay_standard_game(text: &str) -> Result<(Board, Vec<Move>), EngineError> {
    let mut board = Board::standard_setup();
    let moves = replay_game_log(&mut board, text)?;
    Ok((board, moves))
}
