//! Yes/no confirmation prompts.
use std::io::{self, BufRead, Write as _};

/// Asks the user a yes/no question.
#[cfg_attr(test, mockall::automock)]
pub trait Prompt {
    /// Ask `question`; `true` means the user agreed.
    fn confirm(&self, question: &str) -> bool;
}

/// Prompt on the controlling terminal.
///
/// Reads one line from stdin. Only `y` or `yes` (any case) agree; an empty
/// line, EOF or a read error declines.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdinPrompt;

impl Prompt for StdinPrompt {
    fn confirm(&self, question: &str) -> bool {
        print!("{question} [y/N] ");
        if io::stdout().flush().is_err() {
            return false;
        }
        ask(&mut io::stdin().lock())
    }
}

/// Read one answer from `input`.
fn ask(input: &mut impl BufRead) -> bool {
    let mut answer = String::new();
    match input.read_line(&mut answer) {
        Ok(0) | Err(_) => false,
        Ok(_) => is_yes(&answer),
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

/// A prompt with a fixed answer, for non-interactive runs.
#[derive(Debug, Clone, Copy)]
pub struct FixedPrompt(pub bool);

impl Prompt for FixedPrompt {
    fn confirm(&self, _question: &str) -> bool {
        self.0
    }
}
