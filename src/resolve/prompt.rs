//! Operator dialogue transport
//!
//! The disambiguation protocol is written against this capability so the
//! resolution algorithm never touches a particular I/O channel. Validation
//! and re-prompting live with the algorithm, not here.

use crate::{FootyError, Result};
use std::collections::VecDeque;
use std::io::{self, BufRead, Write};

/// One line out, one line back
pub trait Prompt {
    /// Show a message without expecting a response
    fn say(&mut self, message: &str);

    /// Show a question and read one response line
    fn ask(&mut self, message: &str) -> Result<String>;
}

/// Interactive prompt over stdin/stdout
#[derive(Debug, Default)]
pub struct ConsolePrompt;

impl Prompt for ConsolePrompt {
    fn say(&mut self, message: &str) {
        println!("{}", message);
    }

    fn ask(&mut self, message: &str) -> Result<String> {
        println!("{}", message);
        io::stdout().flush()?;
        let mut line = String::new();
        io::stdin().lock().read_line(&mut line)?;
        Ok(line.trim().to_string())
    }
}

/// Prompt answering from a fixed list of replies (for testing)
#[derive(Debug, Default)]
pub struct ScriptedPrompt {
    replies: VecDeque<String>,
    /// Everything shown or asked, in order
    pub transcript: Vec<String>,
}

impl ScriptedPrompt {
    pub fn new<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ScriptedPrompt {
            replies: replies.into_iter().map(Into::into).collect(),
            transcript: Vec::new(),
        }
    }

    /// Replies not yet consumed
    pub fn remaining(&self) -> usize {
        self.replies.len()
    }
}

impl Prompt for ScriptedPrompt {
    fn say(&mut self, message: &str) {
        self.transcript.push(message.to_string());
    }

    fn ask(&mut self, message: &str) -> Result<String> {
        self.transcript.push(message.to_string());
        self.replies
            .pop_front()
            .ok_or_else(|| FootyError::Prompt(format!("Script ran out of replies at: {}", message)))
    }
}
