//! UCI entry point: hand control straight to the command loop.
//! Diagnostics go to stderr via `RUST_LOG`; stdout carries only UCI.

use engine::Uci;

fn main() {
    env_logger::init();
    Uci::new().main_loop();
}
