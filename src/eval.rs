use chess::{get_file, Board, BoardStatus, Color, Piece, Square};

use crate::types::*;

// Below this much non-pawn material (both sides combined) the position is
// scored with the endgame rules: no center terms, bigger passed-pawn
// bonuses, king centralization instead of a pawn shield.
const ENDGAME_MATERIAL: i32 = 2500;

const CENTER: [Square; 4] = [Square::D4, Square::D5, Square::E4, Square::E5];
const WHITE_CENTER_PAWNS: [Square; 4] = [Square::C3, Square::D3, Square::E3, Square::F3];
const BLACK_CENTER_PAWNS: [Square; 4] = [Square::C6, Square::D6, Square::E6, Square::F6];

/// Static evaluation in centipawns from the side to move's perspective.
///
/// Checkmate scores `-MATE` and stalemate 0; otherwise the score is a
/// White-perspective sum of material, center control, pawn advancement,
/// king safety, rook activity and the bishop pair, negated for Black.
pub fn evaluate(b: &Board) -> i32 {
    match b.status() {
        BoardStatus::Checkmate => return -MATE,
        BoardStatus::Stalemate => return 0,
        BoardStatus::Ongoing => {}
    }

    let endgame = is_endgame(b);

    let mut score = material(b);
    if !endgame {
        score += center_control(b);
    }
    score += pawn_advancement(b, endgame);
    score += king_activity(b, endgame);
    score += rook_activity(b);
    score += bishop_pair(b);

    if b.side_to_move() == Color::White {
        score
    } else {
        -score
    }
}

pub fn is_endgame(b: &Board) -> bool {
    let mut material = 0;
    for piece in [Piece::Queen, Piece::Rook, Piece::Bishop, Piece::Knight] {
        material += piece_value(piece)
            * (count_pieces(b, piece, Color::White) + count_pieces(b, piece, Color::Black));
    }
    material < ENDGAME_MATERIAL
}

fn material(b: &Board) -> i32 {
    let mut score = 0;
    for piece in [
        Piece::Pawn,
        Piece::Knight,
        Piece::Bishop,
        Piece::Rook,
        Piece::Queen,
        Piece::King,
    ] {
        score += piece_value(piece)
            * (count_pieces(b, piece, Color::White) - count_pieces(b, piece, Color::Black));
    }
    score
}

fn center_control(b: &Board) -> i32 {
    let mut score = 0;

    for sq in CENTER {
        match b.color_on(sq) {
            Some(Color::White) => score += 30,
            Some(Color::Black) => score -= 30,
            None => {}
        }
    }

    for sq in WHITE_CENTER_PAWNS {
        if b.piece_on(sq) == Some(Piece::Pawn) && b.color_on(sq) == Some(Color::White) {
            score += 15;
        }
    }
    for sq in BLACK_CENTER_PAWNS {
        if b.piece_on(sq) == Some(Piece::Pawn) && b.color_on(sq) == Some(Color::Black) {
            score -= 15;
        }
    }

    score
}

fn pawn_advancement(b: &Board, endgame: bool) -> i32 {
    let passer_unit = if endgame { 50 } else { 25 };
    let mut score = 0;

    for sq in b.pieces(Piece::Pawn) & b.color_combined(Color::White) {
        let r = rank_of(sq) as i32;
        let f = file_of(sq);
        score += 3 * r;
        if f == 3 || f == 4 {
            score += 5 * r;
            if r == 3 {
                score += 10;
            }
            if r == 4 {
                score += 15;
            }
        }
        if r > 3 && is_passed(b, sq, Color::White) {
            score += passer_unit * (r - 3);
        }
    }

    for sq in b.pieces(Piece::Pawn) & b.color_combined(Color::Black) {
        let r = rank_of(sq) as i32;
        let f = file_of(sq);
        let rr = 7 - r;
        score -= 3 * rr;
        if f == 3 || f == 4 {
            score -= 5 * rr;
            if rr == 3 {
                score -= 10;
            }
            if rr == 4 {
                score -= 15;
            }
        }
        if r < 4 && is_passed(b, sq, Color::Black) {
            score -= passer_unit * (4 - r);
        }
    }

    score
}

// No enemy pawn on the same or an adjacent file anywhere ahead of the pawn.
pub fn is_passed(b: &Board, sq: Square, us: Color) -> bool {
    let enemy_pawns = b.pieces(Piece::Pawn) & b.color_combined(!us);
    let f = file_of(sq) as i32;
    let r = rank_of(sq) as i32;
    for psq in enemy_pawns {
        if (file_of(psq) as i32 - f).abs() > 1 {
            continue;
        }
        let pr = rank_of(psq) as i32;
        let ahead = match us {
            Color::White => pr > r,
            Color::Black => pr < r,
        };
        if ahead {
            return false;
        }
    }
    true
}

fn king_activity(b: &Board, endgame: bool) -> i32 {
    let mut score = 0;

    for color in [Color::White, Color::Black] {
        let sign = if color == Color::White { 1 } else { -1 };
        let ksq = (b.pieces(Piece::King) & b.color_combined(color)).to_square();
        let kf = file_of(ksq) as i32;
        let kr = rank_of(ksq) as i32;

        if endgame {
            // |file - 3.5| + |rank - 3.5|, kept in integers by doubling.
            let center_distance = ((2 * kf - 7).abs() + (2 * kr - 7).abs()) / 2;
            score += sign * (7 - center_distance) * 10;
        } else {
            let shield_rank = kr + sign;
            if (0..8).contains(&shield_rank) {
                let mut shield = 0;
                for df in -1..=1 {
                    let sf = kf + df;
                    if !(0..8).contains(&sf) {
                        continue;
                    }
                    let sq = square_at(sf as usize, shield_rank as usize);
                    if b.piece_on(sq) == Some(Piece::Pawn) && b.color_on(sq) == Some(color) {
                        shield += 1;
                    }
                }
                score += sign * shield * 10;
            }
        }
    }

    score
}

fn rook_activity(b: &Board) -> i32 {
    let all_pawns = *b.pieces(Piece::Pawn);
    let mut score = 0;

    for color in [Color::White, Color::Black] {
        let sign = if color == Color::White { 1 } else { -1 };
        let seventh = if color == Color::White { 6 } else { 1 };
        for sq in b.pieces(Piece::Rook) & b.color_combined(color) {
            if (get_file(sq.get_file()) & all_pawns).popcnt() == 0 {
                score += sign * 25;
            }
            if rank_of(sq) == seventh {
                score += sign * 20;
            }
        }
    }

    score
}

fn bishop_pair(b: &Board) -> i32 {
    let mut score = 0;
    if count_pieces(b, Piece::Bishop, Color::White) >= 2 {
        score += 50;
    }
    if count_pieces(b, Piece::Bishop, Color::Black) >= 2 {
        score -= 50;
    }
    score
}
