//! upcheck CLI binary
//!
//! Minimal entrypoint; all logic is in the library. cli::run() handles all
//! output including errors and main only maps to a process exit.

fn main() {
    if let Err(code) = upcheck::cli::run() {
        std::process::exit(code.as_i32());
    }
}
