//! Confirmation providers: where the release tag and the publish decision
//! come from.
//!
//! The pipeline only talks to [`Prompter`], so the same run can be driven
//! from a terminal, from flags/environment, or from a script.

use std::io::{BufRead, Write};

use grein_release_core::ImageRef;

/// The only answer that confirms publishing.
pub const AFFIRMATIVE: &str = "y";

pub trait Prompter {
    /// Raw tag string as entered; validation happens in the pipeline.
    fn release_tag(&mut self) -> Result<String, PromptError>;

    /// Whether `image` should be pushed to `registry`.
    fn confirm_publish(&mut self, registry: &str, image: &ImageRef) -> Result<bool, PromptError>;
}

/// Line-oriented prompts over a reader/writer pair, normally stdin/stdout.
///
/// A preset tag or publish decision skips the corresponding prompt.
pub struct TerminalPrompter<R, W> {
    input: R,
    output: W,
    tag: Option<String>,
    publish: Option<bool>,
}

impl TerminalPrompter<std::io::StdinLock<'static>, std::io::Stdout> {
    pub fn stdio() -> Self {
        Self::new(std::io::stdin().lock(), std::io::stdout())
    }
}

impl<R: BufRead, W: Write> TerminalPrompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self {
            input,
            output,
            tag: None,
            publish: None,
        }
    }

    pub fn with_tag(mut self, tag: Option<String>) -> Self {
        self.tag = tag;
        self
    }

    pub fn with_publish(mut self, publish: Option<bool>) -> Self {
        self.publish = publish;
        self
    }

    /// Prints `question` and reads one line as raw bytes, without its line
    /// ending.
    ///
    /// End of input reads as an empty answer.
    fn ask(&mut self, question: &str) -> Result<Vec<u8>, PromptError> {
        write!(self.output, "{question}").map_err(|e| PromptError::Write { source: e })?;
        self.output
            .flush()
            .map_err(|e| PromptError::Write { source: e })?;

        let mut line = Vec::new();
        self.input
            .read_until(b'\n', &mut line)
            .map_err(|e| PromptError::Read { source: e })?;

        while matches!(line.last(), Some(b'\n' | b'\r')) {
            line.pop();
        }
        Ok(line)
    }
}

impl<R: BufRead, W: Write> Prompter for TerminalPrompter<R, W> {
    fn release_tag(&mut self) -> Result<String, PromptError> {
        match self.tag.take() {
            Some(tag) => Ok(tag),
            // Undecodable bytes become U+FFFD and fail tag validation
            None => Ok(String::from_utf8_lossy(&self.ask("Tag: ")?).into_owned()),
        }
    }

    fn confirm_publish(&mut self, registry: &str, _image: &ImageRef) -> Result<bool, PromptError> {
        if let Some(publish) = self.publish {
            return Ok(publish);
        }
        let answer = self.ask(&format!("Push to {registry}? [y/N]: "))?;
        Ok(answer == AFFIRMATIVE.as_bytes())
    }
}

/// Fixed answers, for automation and tests.
#[derive(Debug, Clone)]
pub struct ScriptedPrompter {
    pub tag: String,
    pub publish: bool,
}

impl ScriptedPrompter {
    pub fn new(tag: &str, publish: bool) -> Self {
        Self {
            tag: tag.to_owned(),
            publish,
        }
    }
}

impl Prompter for ScriptedPrompter {
    fn release_tag(&mut self) -> Result<String, PromptError> {
        Ok(self.tag.clone())
    }

    fn confirm_publish(&mut self, _registry: &str, _image: &ImageRef) -> Result<bool, PromptError> {
        Ok(self.publish)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PromptError {
    #[error("failed to read answer")]
    Read { source: std::io::Error },

    #[error("failed to write prompt")]
    Write { source: std::io::Error },
}
