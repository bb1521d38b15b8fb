use serde::{Deserialize, Serialize};

/// A stanza of a segmented poem.
///
/// `stanza_number` follows the position of the stanza in the raw text, so a
/// stanza that was dropped for being empty leaves a gap in the numbering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stanza {
    pub stanza_number: u32,
    #[serde(default)]
    pub lines: Vec<LineEntry>,
    /// Comma-joined syllable counts of the verse lines, filled by scansion.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub syllables: Option<String>,
}

impl Stanza {
    pub fn new(stanza_number: u32, lines: Vec<LineEntry>) -> Self {
        Self {
            stanza_number,
            lines,
            syllables: None,
        }
    }

    /// Verse lines in order, skipping missing-lines records.
    pub fn verse_lines(&self) -> impl Iterator<Item = &Line> {
        self.lines.iter().filter_map(LineEntry::as_verse)
    }

    pub fn verse_lines_mut(&mut self) -> impl Iterator<Item = &mut Line> {
        self.lines.iter_mut().filter_map(LineEntry::as_verse_mut)
    }
}

/// One entry of a stanza's line sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LineEntry {
    Verse(Line),
    Missing(MissingLines),
}

impl LineEntry {
    pub fn as_verse(&self) -> Option<&Line> {
        match self {
            LineEntry::Verse(line) => Some(line),
            LineEntry::Missing(_) => None,
        }
    }

    pub fn as_verse_mut(&mut self) -> Option<&mut Line> {
        match self {
            LineEntry::Verse(line) => Some(line),
            LineEntry::Missing(_) => None,
        }
    }
}

/// Lines known to be lost from the source; they only advance numbering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissingLines {
    pub missing_lines: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Line {
    pub line_number: u32,
    #[serde(default)]
    pub line_text: String,
    #[serde(default)]
    pub words: Vec<Word>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub syllable_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stress_count: Option<u32>,
    /// One mark per syllable: `|` stressed, `.` unstressed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stress_pattern: Option<String>,
    /// One mark per syllable: `-` long, `U` short.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metric_pattern: Option<String>,
}

impl Line {
    pub fn new(line_number: u32, line_text: impl Into<String>, words: Vec<Word>) -> Self {
        Self {
            line_number,
            line_text: line_text.into(),
            words,
            syllable_count: None,
            stress_count: None,
            stress_pattern: None,
            metric_pattern: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Word {
    pub word_number: u32,
    pub word_text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub word_text_normalized: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lemma: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub morphology: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub morphology_guessed: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub syllable_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rhyme: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub word_ipa_espeak: Option<String>,
}

impl Word {
    pub fn new(word_number: u32, word_text: impl Into<String>) -> Self {
        Self {
            word_number,
            word_text: word_text.into(),
            word_text_normalized: None,
            lemma: None,
            morphology: None,
            morphology_guessed: None,
            syllable_count: None,
            rhyme: None,
            word_ipa_espeak: None,
        }
    }

    /// The form handed to the analyzer: normalized text when present.
    pub fn analysis_form(&self) -> &str {
        self.word_text_normalized
            .as_deref()
            .unwrap_or(&self.word_text)
    }
}
