use chess::{Board, ChessMove, MoveGen, Piece};
use std::cmp::Reverse;

use crate::types::*;

/// All legal moves, most promising first: the hint move (from the TT or the
/// previous iteration), captures in MVV-LVA order, promotions, quiet checks,
/// castling, then the remaining quiets in generator order. The hint is
/// emitted once and only if it is actually legal here.
pub fn ordered_moves(b: &Board, hint: Option<ChessMove>) -> Vec<ChessMove> {
    let legal: Vec<ChessMove> = MoveGen::new_legal(b).collect();

    let hint = hint.filter(|h| legal.contains(h));

    let mut captures = Vec::new();
    let mut promotions = Vec::new();
    let mut checks = Vec::new();
    let mut castles = Vec::new();
    let mut quiets = Vec::new();

    for m in &legal {
        let m = *m;
        if Some(m) == hint {
            continue;
        }
        if is_capture(b, m) {
            captures.push(m);
        } else if m.get_promotion().is_some() {
            promotions.push(m);
        } else if is_castle(b, m) {
            castles.push(m);
        } else if gives_check(b, m) {
            checks.push(m);
        } else {
            quiets.push(m);
        }
    }

    // Stable, so equal trades keep their generator order.
    captures.sort_by_key(|&m| Reverse(mvv_lva(b, m)));

    let mut ordered = Vec::with_capacity(legal.len());
    ordered.extend(hint);
    ordered.extend(captures);
    ordered.extend(promotions);
    ordered.extend(checks);
    ordered.extend(castles);
    ordered.extend(quiets);
    ordered
}

/// The quiescence move list: captures (en passant included) plus
/// non-capturing promotion pushes, as one MVV-LVA-sorted batch.
pub fn noisy_moves(b: &Board) -> Vec<ChessMove> {
    let mut noisy: Vec<ChessMove> = MoveGen::new_legal(b)
        .filter(|&m| is_capture(b, m) || is_promotion_push(b, m))
        .collect();
    noisy.sort_by_key(|&m| Reverse(mvv_lva(b, m)));
    noisy
}

#[inline]
fn is_castle(b: &Board, m: ChessMove) -> bool {
    b.piece_on(m.get_source()) == Some(Piece::King)
        && (file_of(m.get_source()) as i32 - file_of(m.get_dest()) as i32).abs() == 2
}

#[inline]
fn gives_check(b: &Board, m: ChessMove) -> bool {
    b.make_move_new(m).checkers().popcnt() > 0
}
