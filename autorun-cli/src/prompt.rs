//! Line-oriented console prompts.
//!
//! Generic over the input and output streams so the menu can be driven by a
//! scripted transcript in tests. End of input behaves like "go back".

use std::io::{self, BufRead, Write};

pub struct Prompt<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompt<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn out(&mut self) -> &mut W {
        &mut self.output
    }

    #[cfg(test)]
    pub fn into_output(self) -> W {
        self.output
    }

    /// Print `question` and read one trimmed line. `None` at end of input.
    pub fn ask(&mut self, question: &str) -> io::Result<Option<String>> {
        write!(self.output, "{question}")?;
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            writeln!(self.output)?;
            return Ok(None);
        }
        Ok(Some(line.trim().to_owned()))
    }

    /// Like [`ask`](Self::ask) but `b`/`B` also yields `None`.
    pub fn ask_or_back(&mut self, question: &str) -> io::Result<Option<String>> {
        Ok(self
            .ask(question)?
            .filter(|answer| !answer.eq_ignore_ascii_case("b")))
    }

    /// `true` only for `y` / `yes` (any case).
    pub fn confirm(&mut self, question: &str) -> io::Result<bool> {
        let answer = self.ask(question)?.unwrap_or_default().to_lowercase();
        Ok(answer == "y" || answer == "yes")
    }

    /// Pick a 1-based entry out of `len`; returns the 0-based index.
    pub fn choose(&mut self, len: usize) -> io::Result<Option<usize>> {
        let Some(answer) = self.ask_or_back("Enter a number (or 'b' to go back): ")? else {
            return Ok(None);
        };
        match answer.parse::<usize>() {
            Ok(n) if (1..=len).contains(&n) => Ok(Some(n - 1)),
            _ => {
                writeln!(self.output, "Invalid number.")?;
                Ok(None)
            }
        }
    }
}
