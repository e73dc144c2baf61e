use crate::definitions::{BoardLocation, PieceType};

/** True for squares of the cross board: the 14x14 grid minus
the four 3x3 corner blocks. */
pub fn is_legal_location(row: i8, col: i8) -> bool {
    if row < 0 || row > 13 || col < 0 || col > 13 {
        return false;
    }
    if row < 3 && (col < 3 || col > 10) {
        return false;
    }
    if row > 10 && (col < 3 || col > 10) {
        return false;
    }
    true
}

pub fn is_on_board(location: BoardLocation) -> bool {
    is_legal_location(location.row, location.col)
}

fn piece_letter_type(c: char) -> Option<PieceType> {
    match c {
        'N' | 'n' => Some(PieceType::Knight),
        'B' | 'b' => Some(PieceType::Bishop),
        'R' | 'r' => Some(PieceType::Rook),
        'Q' | 'q' => Some(PieceType::Queen),
        _ => None,
    }
}

/** Scan a board location out of `token` starting at byte `start`.
Leading separators ('-', 'x') and piece letters (K Q N B R) are
skipped; the location itself is a column letter 'a'..'n' followed by
a one- or two-digit row number counted from Red's side. Returns the
index just past the location and the square, or `None` when the text
does not fit the grammar or names an off-board square. */
pub fn parse_location(token: &str, start: usize) -> Option<(usize, BoardLocation)> {
    let bytes = token.as_bytes();
    let mut i = start;
    while i < bytes.len() && matches!(bytes[i], b'-' | b'x' | b'K' | b'Q' | b'N' | b'B' | b'R') {
        i += 1;
    }
    if i >= bytes.len() || !(b'a'..=b'n').contains(&bytes[i]) {
        return None;
    }
    let col = (bytes[i] - b'a') as i8;
    i += 1;
    let mut digits = 0;
    let mut number: i8 = 0;
    while i < bytes.len() && bytes[i].is_ascii_digit() && digits < 2 {
        number = number * 10 + (bytes[i] - b'0') as i8;
        i += 1;
        digits += 1;
    }
    if digits == 0 || number < 1 || number > 14 {
        return None;
    }
    let location = BoardLocation::new(14 - number, col);
    if !is_on_board(location) {
        return None;
    }
    Some((i, location))
}

/** Scan an optional promotion suffix (`=Q`, `=n`, or a bare piece
letter) starting at `start`. Returns the index past the suffix and
the chosen piece type, if any. */
pub fn parse_promotion(token: &str, start: usize) -> (usize, Option<PieceType>) {
    let bytes = token.as_bytes();
    let mut i = start;
    if i < bytes.len() && bytes[i] == b'=' {
        i += 1;
    }
    if i < bytes.len() {
        if let Some(piece_type) = piece_letter_type(bytes[i] as char) {
            return (i + 1, Some(piece_type));
        }
    }
    (start, None)
}
