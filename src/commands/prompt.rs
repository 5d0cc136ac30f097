// src/commands/prompt.rs

//! Terminal confirmation for stream switches

use conary_modules::module::Confirm;
use std::io::{self, BufRead, IsTerminal, Write};

/// Asks on stdin; declines when stdin is not a terminal or cannot be read
pub struct TerminalConfirm;

impl Confirm for TerminalConfirm {
    fn confirm(&self, prompt: &str) -> bool {
        if !io::stdin().is_terminal() {
            return false;
        }

        let mut stdout = io::stdout();
        if write!(stdout, "{} [y/N]: ", prompt).and_then(|_| stdout.flush()).is_err() {
            return false;
        }

        let mut input = String::new();
        if io::stdin().lock().read_line(&mut input).is_err() {
            return false;
        }
        matches!(input.trim().to_lowercase().as_str(), "y" | "yes")
    }
}
