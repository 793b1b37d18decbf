use chess::{Board, BoardStatus, ChessMove, Color, MoveGen};

const WIN: i32 = 100_000;

/// Decide whether the side to move can force checkmate within `n` of its
/// own moves, and return the winning line when it can. Pure minimax with
/// alpha-beta over `2n` plies; no evaluation function is involved.
pub fn solve(board: &Board, n: u32) -> Option<Vec<ChessMove>> {
    let attacker = board.side_to_move();
    let mut line = Vec::new();
    let score = mate_search(board, 2 * n as i32, attacker, &mut line, -WIN, WIN);
    (score > 0).then_some(line)
}

fn mate_search(
    b: &Board,
    depth: i32,
    attacker: Color,
    line: &mut Vec<ChessMove>,
    mut alpha: i32,
    mut beta: i32,
) -> i32 {
    let defender_mated = b.status() == BoardStatus::Checkmate && b.side_to_move() != attacker;
    if depth == 0 {
        return if defender_mated { WIN } else { -WIN };
    }

    let moves: Vec<ChessMove> = MoveGen::new_legal(b).collect();
    if moves.is_empty() {
        return if defender_mated { WIN } else { -WIN };
    }

    if b.side_to_move() == attacker {
        let mut best = -WIN;
        for m in moves {
            let child = b.make_move_new(m);
            let mut continuation = Vec::new();
            let score = mate_search(&child, depth - 1, attacker, &mut continuation, alpha, beta);
            if score >= best {
                best = score;
                line.clear();
                line.push(m);
                line.extend(continuation);
            }
            alpha = alpha.max(best);
            if beta <= alpha {
                break;
            }
        }
        best
    } else {
        let mut worst = WIN;
        for m in moves {
            let child = b.make_move_new(m);
            let mut continuation = Vec::new();
            let score = mate_search(&child, depth - 1, attacker, &mut continuation, alpha, beta);
            if score <= worst {
                worst = score;
                line.clear();
                line.push(m);
                line.extend(continuation);
            }
            beta = beta.min(worst);
            if beta <= alpha {
                break;
            }
        }
        worst
    }
}
