//! The token stream exchanged with the analyzer and the tagger.
//!
//! Words are referred to by their index in the unit's word order, so every
//! later stage can attach results without re-walking the document.

use super::MorphologyError;
use super::analyzer::AnalyzerBlock;

pub const END_OF_LINE: &str = "[EOL]";
pub const END_OF_STANZA: &str = "[EOS]";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamToken {
    Word(usize),
    EndOfLine,
    EndOfStanza,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WordStream {
    tokens: Vec<StreamToken>,
    forms: Vec<String>,
}

impl WordStream {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a word in its analysis form; returns its index.
    pub fn push_word(&mut self, form: impl Into<String>) -> usize {
        let index = self.forms.len();
        self.forms.push(form.into());
        self.tokens.push(StreamToken::Word(index));
        index
    }

    pub fn end_line(&mut self) {
        self.tokens.push(StreamToken::EndOfLine);
    }

    pub fn end_stanza(&mut self) {
        self.tokens.push(StreamToken::EndOfStanza);
    }

    pub fn word_count(&self) -> usize {
        self.forms.len()
    }

    pub fn form(&self, index: usize) -> &str {
        &self.forms[index]
    }

    fn token_text(&self, token: StreamToken) -> &str {
        match token {
            StreamToken::Word(index) => self.form(index),
            StreamToken::EndOfLine => END_OF_LINE,
            StreamToken::EndOfStanza => END_OF_STANZA,
        }
    }

    /// One token per line, sentinels included.
    pub fn analyzer_input(&self) -> String {
        let mut input = self
            .tokens
            .iter()
            .map(|token| self.token_text(*token))
            .collect::<Vec<_>>()
            .join("\n");
        input.push('\n');
        input
    }

    /// One sentence per stanza: words separated by spaces, each rendered by
    /// `render`. Line ends are not sentence boundaries.
    pub fn tagger_input<F>(&self, mut render: F) -> String
    where
        F: FnMut(usize) -> String,
    {
        let mut out = String::new();
        let mut need_space = false;
        for token in &self.tokens {
            match token {
                StreamToken::Word(index) => {
                    if need_space {
                        out.push(' ');
                    }
                    out.push_str(&render(*index));
                    need_space = true;
                }
                StreamToken::EndOfStanza => {
                    out.push('\n');
                    need_space = false;
                }
                StreamToken::EndOfLine => {}
            }
        }
        out
    }

    /// Pair every analyzer block with its stream token, returning the word
    /// blocks in word order.
    pub fn align(&self, blocks: Vec<AnalyzerBlock>) -> Result<Vec<AnalyzerBlock>, MorphologyError> {
        if blocks.len() != self.tokens.len() {
            return Err(MorphologyError::Misaligned {
                stage: "analyzer",
                expected: self.tokens.len(),
                found: blocks.len(),
            });
        }

        let mut words = Vec::with_capacity(self.forms.len());
        for (token, block) in self.tokens.iter().zip(blocks) {
            let expected = self.token_text(*token);
            if block.surface != expected {
                return Err(MorphologyError::SurfaceMismatch {
                    expected: expected.to_string(),
                    found: block.surface,
                });
            }
            if let StreamToken::Word(_) = token {
                words.push(block);
            }
        }
        Ok(words)
    }
}
