//! Standalone mate-in-N prover. Not part of the playing engine: no
//! evaluation, no clock, just an exhaustive minimax over 2N plies.

use std::str::FromStr;

use anyhow::{anyhow, Result};
use chess::Board;
use clap::Parser;

/// Decide whether the side to move forces mate within N moves.
#[derive(Parser)]
#[command(name = "matein", version)]
struct Args {
    /// Mate distance, in full moves by the attacker.
    n: u32,
    /// Position to solve, as a FEN string.
    fen: String,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let board =
        Board::from_str(&args.fen).map_err(|e| anyhow!("invalid FEN {:?}: {e}", args.fen))?;

    match engine::mate::solve(&board, args.n) {
        Some(line) => {
            let line: Vec<String> = line.iter().map(|m| m.to_string()).collect();
            println!("mate in {} found: {}", args.n, line.join(" "));
        }
        None => println!("no forced mate in {}", args.n),
    }
    Ok(())
}
