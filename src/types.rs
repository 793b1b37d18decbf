use chess::{Board, ChessMove, Color, File, Piece, Rank, Square};

// ---------------------------
// Score constants
// ---------------------------
pub const INF: i32 = 1 << 30;
pub const MATE: i32 = 20_000;
// Anything beyond this is a proven mate.
pub const MATE_THRESHOLD: i32 = 19_000;

pub const MAX_ITER_DEPTH: i32 = 15;

// Piece values
pub const PAWN_VALUE: i32 = 100;
pub const KNIGHT_VALUE: i32 = 320;
pub const BISHOP_VALUE: i32 = 330;
pub const ROOK_VALUE: i32 = 500;
pub const QUEEN_VALUE: i32 = 900;
pub const KING_VALUE: i32 = 20_000;

#[inline]
pub fn piece_value(pc: Piece) -> i32 {
    match pc {
        Piece::Pawn => PAWN_VALUE,
        Piece::Knight => KNIGHT_VALUE,
        Piece::Bishop => BISHOP_VALUE,
        Piece::Rook => ROOK_VALUE,
        Piece::Queen => QUEEN_VALUE,
        Piece::King => KING_VALUE,
    }
}

// ---------------------------
// Board helpers
// ---------------------------
#[inline]
pub fn board_key(b: &Board) -> u64 {
    b.get_hash()
}

#[inline]
pub fn file_of(sq: Square) -> usize {
    sq.get_file().to_index()
}

#[inline]
pub fn rank_of(sq: Square) -> usize {
    sq.get_rank().to_index()
}

#[inline]
pub fn square_at(file: usize, rank: usize) -> Square {
    Square::make_square(Rank::from_index(rank), File::from_index(file))
}

pub fn count_pieces(b: &Board, piece: Piece, color: Color) -> i32 {
    (b.pieces(piece) & b.color_combined(color)).popcnt() as i32
}

// Capture test, en passant included (pawn moving diagonally onto an empty square).
#[inline]
pub fn is_capture(b: &Board, mv: ChessMove) -> bool {
    let to = mv.get_dest();
    if b.color_on(to) == Some(!b.side_to_move()) {
        return true;
    }
    if b.en_passant().is_some()
        && b.piece_on(mv.get_source()) == Some(Piece::Pawn)
        && file_of(mv.get_source()) != file_of(to)
        && b.piece_on(to).is_none()
    {
        return true;
    }
    false
}

// Pawn push onto the last rank without capturing anything.
#[inline]
pub fn is_promotion_push(b: &Board, mv: ChessMove) -> bool {
    mv.get_promotion().is_some() && b.piece_on(mv.get_dest()).is_none() && !is_capture(b, mv)
}

// MVV-LVA sort key: 10 * victim - attacker. En passant counts pawn for
// pawn; a quiet promotion is valued as the material it manufactures.
#[inline]
pub fn mvv_lva(b: &Board, mv: ChessMove) -> i32 {
    if let Some(victim) = b.piece_on(mv.get_dest()) {
        let attacker = b
            .piece_on(mv.get_source())
            .map(piece_value)
            .unwrap_or(PAWN_VALUE);
        return piece_value(victim) * 10 - attacker;
    }
    if is_capture(b, mv) {
        return PAWN_VALUE * 10 - PAWN_VALUE;
    }
    if mv.get_promotion().is_some() {
        return (QUEEN_VALUE - PAWN_VALUE) * 10;
    }
    0
}

// ---------------------------
// Move pack/unpack for TT
// ---------------------------
pub fn pack_move(m: ChessMove) -> u16 {
    let from = m.get_source().to_index() as u16;
    let to = m.get_dest().to_index() as u16;
    let promo = match m.get_promotion() {
        Some(Piece::Knight) => 1,
        Some(Piece::Bishop) => 2,
        Some(Piece::Rook) => 3,
        Some(Piece::Queen) => 4,
        _ => 0,
    } as u16;
    (from & 63) | ((to & 63) << 6) | ((promo & 7) << 12)
}

pub fn unpack_move(code: u16) -> Option<ChessMove> {
    if code == 0 {
        return None;
    }
    let from = (code & 63) as usize;
    let to = ((code >> 6) & 63) as usize;
    let promo = match (code >> 12) & 7 {
        1 => Some(Piece::Knight),
        2 => Some(Piece::Bishop),
        3 => Some(Piece::Rook),
        4 => Some(Piece::Queen),
        _ => None,
    };
    Some(ChessMove::new(
        square_at(from % 8, from / 8),
        square_at(to % 8, to / 8),
        promo,
    ))
}
