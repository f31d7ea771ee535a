//! Operator confirmation prompt

use std::io::{self, BufRead, Write};

/// Ask the operator whether to proceed with the upgrade on `host`.
///
/// Only "y" or "yes" (case-insensitive, surrounding whitespace trimmed)
/// count as confirmation; anything else, including EOF, declines. The
/// reader and writer are injectable so tests can drive the prompt.
pub fn confirm_upgrade(
    host: &str,
    input: &mut impl BufRead,
    output: &mut impl Write,
) -> io::Result<bool> {
    write!(output, "[?] Proceed with upgrade on {host}? (y/n): ")?;
    output.flush()?;

    let mut line = String::new();
    let bytes = input.read_line(&mut line)?;
    if bytes == 0 {
        return Ok(false);
    }

    let answer = line.trim().to_lowercase();
    Ok(answer == "y" || answer == "yes")
}
