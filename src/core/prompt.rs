//! Yes/no confirmation before acting on the filesystem

use std::io::{self, BufRead, Write};

/// Answer to a confirmation prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Accepted,
    Declined,
}

impl Confirmation {
    /// Only `y` or `Y` (surrounding whitespace ignored) counts as yes
    pub fn from_answer(answer: &str) -> Self {
        if answer.trim().eq_ignore_ascii_case("y") {
            Confirmation::Accepted
        } else {
            Confirmation::Declined
        }
    }

    pub fn is_accepted(self) -> bool {
        self == Confirmation::Accepted
    }
}

pub trait Prompter {
    fn confirm(&mut self, question: &str) -> io::Result<Confirmation>;
}

/// Prompts on any line-based reader/writer pair
pub struct LinePrompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> LinePrompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl<R: BufRead, W: Write> Prompter for LinePrompter<R, W> {
    fn confirm(&mut self, question: &str) -> io::Result<Confirmation> {
        write!(self.output, "{} (y/n): ", question)?;
        self.output.flush()?;

        let mut answer = String::new();
        self.input.read_line(&mut answer)?;
        Ok(Confirmation::from_answer(&answer))
    }
}

/// Prompter bound to the terminal
///
/// Questions go to stderr so that stdout only carries reports, which keeps
/// `--json` output parseable even when the user is asked to confirm.
pub type StdinPrompter = LinePrompter<io::StdinLock<'static>, io::Stderr>;

impl StdinPrompter {
    pub fn stdin() -> Self {
        LinePrompter::new(io::stdin().lock(), io::stderr())
    }
}

/// Accepts every prompt without asking
pub struct AssumeYes;

impl Prompter for AssumeYes {
    fn confirm(&mut self, _question: &str) -> io::Result<Confirmation> {
        Ok(Confirmation::Accepted)
    }
}
