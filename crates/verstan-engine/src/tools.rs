//! External language tools: the morphological analyzer, the tagger and the
//! phonetic transcriber.
//!
//! Each tool is a text-in/text-out service behind a trait. `CommandTool` is
//! the subprocess-backed implementation used in production; tests plug in
//! in-memory fakes.

use log::debug;
use std::io::Write;
use std::process::{Command, Stdio};
use std::thread;

#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("Failed to start {program}: {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },
    #[error("IO error while talking to {program}: {source}")]
    Io {
        program: String,
        source: std::io::Error,
    },
    #[error("{program} exited with {status}: {stderr}")]
    Failed {
        program: String,
        status: std::process::ExitStatus,
        stderr: String,
    },
    #[error("{program} produced output that is not valid UTF-8")]
    Encoding { program: String },
}

/// Morphological analyzer: one token per input line, one blank-line
/// separated block of `surface\tanalysis\tweight` lines per token.
pub trait MorphAnalyzer {
    fn analyze(&self, input: &str) -> Result<String, ToolError>;
}

/// Statistical tagger: one sentence per input line, `surface#lemma#tag`
/// tokens on output.
pub trait Tagger {
    fn tag(&self, input: &str) -> Result<String, ToolError>;
}

/// Phonetic transcriber for a single word.
pub trait Transcriber {
    fn transcribe(&self, word: &str) -> Result<String, ToolError>;
}

/// A tool run as a child process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandTool {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandTool {
    pub fn new(program: impl Into<String>, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Run the command feeding `input` on stdin, returning stdout.
    pub fn run_with_stdin(&self, input: &str) -> Result<String, ToolError> {
        debug!("Running {} with {} bytes of input", self.program, input.len());

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| ToolError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        // Feed stdin from a separate thread so a tool that streams its
        // output cannot fill the stdout pipe while we are still writing.
        let writer = child.stdin.take().map(|mut stdin| {
            let input = input.to_owned();
            thread::spawn(move || stdin.write_all(input.as_bytes()))
        });

        let output = child.wait_with_output().map_err(|source| self.io_error(source))?;

        let written = match writer {
            Some(writer) => writer
                .join()
                .unwrap_or_else(|_| Err(std::io::Error::other("stdin writer panicked"))),
            None => Ok(()),
        };

        // A non-zero exit explains a broken stdin pipe better than the pipe error.
        let stdout = self.finish(output)?;
        written.map_err(|source| self.io_error(source))?;
        Ok(stdout)
    }

    /// Run the command with `arg` appended to its arguments, returning stdout.
    pub fn run_with_arg(&self, arg: &str) -> Result<String, ToolError> {
        let output = Command::new(&self.program)
            .args(&self.args)
            .arg(arg)
            .stdin(Stdio::null())
            .output()
            .map_err(|source| ToolError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        self.finish(output)
    }

    fn finish(&self, output: std::process::Output) -> Result<String, ToolError> {
        if !output.status.success() {
            return Err(ToolError::Failed {
                program: self.program.clone(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        String::from_utf8(output.stdout).map_err(|_| ToolError::Encoding {
            program: self.program.clone(),
        })
    }

    fn io_error(&self, source: std::io::Error) -> ToolError {
        ToolError::Io {
            program: self.program.clone(),
            source,
        }
    }
}

impl MorphAnalyzer for CommandTool {
    fn analyze(&self, input: &str) -> Result<String, ToolError> {
        self.run_with_stdin(input)
    }
}

impl Tagger for CommandTool {
    fn tag(&self, input: &str) -> Result<String, ToolError> {
        self.run_with_stdin(input)
    }
}

impl Transcriber for CommandTool {
    fn transcribe(&self, word: &str) -> Result<String, ToolError> {
        self.run_with_arg(word)
    }
}
