//! Terminal prompt surface used by the interactive session.

use crate::Result;
use std::io::{BufRead, Write};

pub const INVALID_INPUT_MSG: &str = "Invalid Input .. Try Again!";

/// Reads choices and free text from the user and writes messages back.
///
/// Every read returns `None` once input is exhausted, which ends the session.
pub trait Prompt {
    /// Print a line.
    fn say(&mut self, message: &str) -> Result<()>;

    /// Print `label` and read one raw line (without the line terminator).
    fn read_line(&mut self, label: &str) -> Result<Option<String>>;

    /// Read an integer, asking again until the input parses.
    fn read_int(&mut self, label: &str) -> Result<Option<i64>> {
        loop {
            let Some(line) = self.read_line(label)? else {
                return Ok(None);
            };
            match line.trim().parse() {
                Ok(value) => return Ok(Some(value)),
                Err(_) => self.say(INVALID_INPUT_MSG)?,
            }
        }
    }

    /// Read a single whitespace-free word, asking again on blank input.
    fn read_word(&mut self, label: &str) -> Result<Option<String>> {
        loop {
            let Some(line) = self.read_line(label)? else {
                return Ok(None);
            };
            let word = line.trim();
            if !word.is_empty() && !word.contains(char::is_whitespace) {
                return Ok(Some(word.to_string()));
            }
            self.say(INVALID_INPUT_MSG)?;
        }
    }

    /// Print a numbered menu and return the 1-based choice as typed.
    fn choose(&mut self, options: &[&str]) -> Result<Option<i64>> {
        self.say("Menu:")?;
        for (idx, option) in options.iter().enumerate() {
            self.say(&format!("\t {}: {}", idx + 1, option))?;
        }
        self.say("")?;
        self.read_int(&format!("Enter number in range 1 - {}: ", options.len()))
    }
}

/// [`Prompt`] over any reader/writer pair, normally stdin and stdout.
pub struct ConsolePrompt<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> ConsolePrompt<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn into_output(self) -> W {
        self.output
    }
}

impl<R: BufRead, W: Write> Prompt for ConsolePrompt<R, W> {
    fn say(&mut self, message: &str) -> Result<()> {
        writeln!(self.output, "{}", message)?;
        Ok(())
    }

    fn read_line(&mut self, label: &str) -> Result<Option<String>> {
        write!(self.output, "{}", label)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        let trimmed = line.trim_end_matches(['\r', '\n']).len();
        line.truncate(trimmed);
        Ok(Some(line))
    }
}
