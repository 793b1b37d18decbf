use std::io::{self, BufRead, Write};
use std::str::FromStr;

use chess::{Board, ChessMove, MoveGen, Piece, Square};
use log::debug;

use crate::search::Search;
use crate::time::budget_from_go;

const NAME: &str = "Sable";
const AUTHOR: &str = "the Sable developers";

/// One UCI session: the current position plus the engine state that
/// persists between `go` commands.
pub struct Uci {
    board: Board,
    search: Search,
}

impl Uci {
    pub fn new() -> Self {
        Self {
            board: Board::default(),
            search: Search::new(),
        }
    }

    /// Read commands from standard input until `quit` or end of input.
    pub fn main_loop(&mut self) {
        let stdin = io::stdin();
        let mut stdout = io::stdout();
        for line in stdin.lock().lines() {
            let Ok(raw) = line else { break };
            let cmd = raw.trim();
            if cmd == "quit" {
                break;
            }
            if let Some(reply) = self.handle(cmd) {
                let _ = writeln!(stdout, "{reply}");
                let _ = stdout.flush();
            }
        }
    }

    /// Process one command line; the returned text, if any, goes to stdout.
    /// Unknown input is ignored so a confused GUI cannot wedge the session.
    pub fn handle(&mut self, cmd: &str) -> Option<String> {
        let tokens: Vec<&str> = cmd.split_whitespace().collect();
        match tokens.first().copied() {
            Some("uci") => Some(format!(
                "id name {NAME} {}\nid author {AUTHOR}\nuciok",
                env!("CARGO_PKG_VERSION")
            )),
            Some("isready") => Some("readyok".to_string()),
            Some("ucinewgame") => {
                self.board = Board::default();
                self.search.reset();
                None
            }
            Some("position") => {
                self.set_position(&tokens);
                None
            }
            Some("go") => Some(self.go(&tokens)),
            _ => {
                if !cmd.is_empty() {
                    debug!("ignoring {cmd:?}");
                }
                None
            }
        }
    }

    // `position startpos [moves ...]` or `position fen <6 fields> [moves ...]`.
    // Anything malformed leaves the board reset to the start position.
    fn set_position(&mut self, tokens: &[&str]) {
        self.board = Board::default();

        let moves_from = match tokens.get(1).copied() {
            Some("startpos") => 2,
            Some("fen") if tokens.len() >= 8 => {
                let fen = tokens[2..8].join(" ");
                match Board::from_str(&fen) {
                    Ok(b) => {
                        self.board = b;
                        8
                    }
                    Err(_) => {
                        debug!("unusable fen {fen:?}");
                        return;
                    }
                }
            }
            _ => return,
        };

        if tokens.get(moves_from) == Some(&"moves") {
            for s in &tokens[moves_from + 1..] {
                match parse_uci_move(&self.board, s) {
                    Some(m) => self.board = self.board.make_move_new(m),
                    None => {
                        debug!("unplayable move {s:?}, keeping the position so far");
                        break;
                    }
                }
            }
        }
    }

    fn go(&mut self, tokens: &[&str]) -> String {
        let budget = budget_from_go(tokens, self.board.side_to_move());
        match self.search.find_best_move(&self.board, budget) {
            Some(m) => format!("bestmove {m}"),
            None => "bestmove 0000".to_string(),
        }
    }
}

impl Default for Uci {
    fn default() -> Self {
        Self::new()
    }
}

// A move is playable when it parses and is legal on this board.
fn parse_uci_move(board: &Board, s: &str) -> Option<ChessMove> {
    if s.len() < 4 {
        return None;
    }
    let from = Square::from_str(&s[0..2]).ok()?;
    let to = Square::from_str(&s[2..4]).ok()?;
    let promo = if s.len() == 5 {
        match &s[4..5] {
            "q" => Some(Piece::Queen),
            "r" => Some(Piece::Rook),
            "b" => Some(Piece::Bishop),
            "n" => Some(Piece::Knight),
            _ => return None,
        }
    } else {
        None
    };
    let mv = ChessMove::new(from, to, promo);
    if MoveGen::new_legal(board).any(|m| m == mv) {
        Some(mv)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn position_after(moves: &str) -> Board {
        let mut board = Board::default();
        for s in moves.split_whitespace() {
            let m = parse_uci_move(&board, s).expect("legal move");
            board = board.make_move_new(m);
        }
        board
    }

    #[test]
    fn identifies_itself() {
        let mut uci = Uci::new();
        let reply = uci.handle("uci").expect("reply");
        assert!(reply.starts_with("id name Sable"));
        assert!(reply.ends_with("uciok"));
        assert_eq!(uci.handle("isready").as_deref(), Some("readyok"));
    }

    #[test]
    fn startpos_with_moves() {
        let mut uci = Uci::new();
        assert!(uci.handle("position startpos moves e2e4 e7e5").is_none());
        assert_eq!(uci.board.get_hash(), position_after("e2e4 e7e5").get_hash());
    }

    #[test]
    fn fen_positions_load() {
        let mut uci = Uci::new();
        uci.handle("position fen 6k1/5ppp/8/8/8/8/5PPP/R5K1 w - - 0 1 moves g1h1");
        let expected = Board::from_str("6k1/5ppp/8/8/8/8/5PPP/R5K1 w - - 0 1").unwrap();
        let expected = expected.make_move_new(ChessMove::new(Square::G1, Square::H1, None));
        assert_eq!(uci.board.get_hash(), expected.get_hash());
    }

    #[test]
    fn broken_positions_fall_back_to_startpos() {
        let mut uci = Uci::new();
        uci.handle("position startpos moves e2e4 e7e5");
        uci.handle("position fen not a real fen at all x");
        assert_eq!(uci.board.get_hash(), Board::default().get_hash());

        uci.handle("position gibberish");
        assert_eq!(uci.board.get_hash(), Board::default().get_hash());
    }

    #[test]
    fn move_list_truncates_at_first_bad_move() {
        let mut uci = Uci::new();
        uci.handle("position startpos moves e2e4 e9e5 d2d4");
        assert_eq!(uci.board.get_hash(), position_after("e2e4").get_hash());

        // Illegal but well-formed moves truncate too.
        let mut uci = Uci::new();
        uci.handle("position startpos moves e2e4 e7e4 d7d5");
        assert_eq!(uci.board.get_hash(), position_after("e2e4").get_hash());
    }

    #[test]
    fn ucinewgame_resets_the_board() {
        let mut uci = Uci::new();
        uci.handle("position startpos moves e2e4");
        uci.handle("ucinewgame");
        assert_eq!(uci.board.get_hash(), Board::default().get_hash());
    }

    #[test]
    fn go_reports_0000_when_nothing_is_playable() {
        let mut uci = Uci::new();
        // Black is stalemated.
        uci.handle("position fen 7k/5Q2/6K1/8/8/8/8/8 b - - 0 1");
        let reply = uci.handle("go movetime 200").expect("go always answers");
        assert_eq!(reply, "bestmove 0000");
    }

    #[test]
    fn go_produces_a_legal_move() {
        let mut uci = Uci::new();
        uci.handle("position startpos");
        let reply = uci.handle("go movetime 150").expect("go always answers");
        let mv = reply.strip_prefix("bestmove ").expect("bestmove line");
        assert!(parse_uci_move(&Board::default(), mv).is_some());
    }
}
