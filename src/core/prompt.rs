//! Interactive choice of installation mode.

use crate::core::error::DeployError;
use crate::core::target::InstallMode;
use std::io::{BufRead, Write};

pub const MAX_ATTEMPTS: usize = 3;

/// Interpret one line of operator input. Empty means the default.
pub fn parse_choice(input: &str) -> Option<InstallMode> {
    match input.trim() {
        "" | "1" => Some(InstallMode::Project),
        "2" => Some(InstallMode::Global),
        _ => None,
    }
}

/// Ask for a mode until a valid answer arrives. EOF or too many invalid
/// answers fall back to project mode.
pub fn ask_mode<R: BufRead, W: Write>(input: &mut R, out: &mut W) -> Result<InstallMode, DeployError> {
    writeln!(out, "Where should the constitution be installed?")?;
    writeln!(out, "  1) project  (.opencode/agent-constitution in this directory)")?;
    writeln!(out, "  2) global   (shared user configuration directory)")?;

    for _ in 0..MAX_ATTEMPTS {
        write!(out, "Choose [1]: ")?;
        out.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            writeln!(out)?;
            return Ok(InstallMode::Project);
        }
        match parse_choice(&line) {
            Some(mode) => return Ok(mode),
            None => writeln!(out, "Please answer 1 or 2.")?,
        }
    }
    writeln!(out, "No valid answer, using project mode.")?;
    Ok(InstallMode::Project)
}
