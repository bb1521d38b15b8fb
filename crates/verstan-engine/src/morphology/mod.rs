//! Lemmatization and morphological tagging of a text unit.
//!
//! Words are normalized, sent through the analyzer, converted into tagger
//! notation, disambiguated by the tagger and finally re-attached to the
//! document by word index.

pub mod analyzer;
pub mod normalize;
pub mod notation;
pub mod stream;
pub mod tagger;

use log::{debug, info};
use std::fmt;

use crate::context::{ErrorRecord, RunContext};
use crate::model::StanzaSet;
use crate::tools::{MorphAnalyzer, Tagger, ToolError};
use normalize::Normalizer;
use stream::WordStream;
use tagger::TokenReading;

#[derive(Debug, thiserror::Error)]
pub enum MorphologyError {
    #[error("Analyzer failed: {0}")]
    Analyzer(#[source] ToolError),
    #[error("Tagger failed: {0}")]
    Tagger(#[source] ToolError),
    #[error("Malformed {stage} output: expected {expected} tokens, found {found}")]
    Misaligned {
        stage: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("Malformed analyzer output: expected {expected:?}, found {found:?}")]
    SurfaceMismatch { expected: String, found: String },
}

/// Counters of one morphology run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MorphologySummary {
    pub words: usize,
    /// Words the analyzer had no analysis for.
    pub guessed: usize,
    /// Words whose normalized form was recorded.
    pub prenormalized: usize,
}

fn percent(part: usize, whole: usize) -> usize {
    if whole == 0 {
        0
    } else {
        (part as f64 * 100.0 / whole as f64).round() as usize
    }
}

impl fmt::Display for MorphologySummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Words: {}  Guessed: {} ({}%)  Prenormalized: {}%",
            self.words,
            self.guessed,
            percent(self.guessed, self.words),
            percent(self.prenormalized, self.words)
        )
    }
}

/// Normalize every word of the unit and build the analyzer stream.
fn normalize_unit<S: StanzaSet + ?Sized>(unit: &mut S, normalizer: &Normalizer) -> (WordStream, usize) {
    let mut stream = WordStream::new();
    let mut prenormalized = 0;

    for stanza in unit.stanzas_mut() {
        for line in stanza.verse_lines_mut() {
            for word in &mut line.words {
                let form = normalizer.normalize(&word.word_text);
                word.lemma = None;
                word.morphology = None;
                word.morphology_guessed = None;
                if form.is_recorded() {
                    prenormalized += 1;
                    word.word_text_normalized = Some(form.text.clone());
                } else {
                    word.word_text_normalized = None;
                }
                stream.push_word(form.text);
            }
            stream.end_line();
        }
        stream.end_stanza();
    }

    (stream, prenormalized)
}

/// Lemmatize and tag every word of a unit in place.
pub fn analyze_morphology<S: StanzaSet + ?Sized>(
    unit: &mut S,
    normalizer: &Normalizer,
    analyzer: &dyn MorphAnalyzer,
    tagger: &dyn Tagger,
    context: &mut RunContext,
) -> Result<MorphologySummary, MorphologyError> {
    let (stream, prenormalized) = normalize_unit(unit, normalizer);
    let mut summary = MorphologySummary {
        words: stream.word_count(),
        guessed: 0,
        prenormalized,
    };
    if summary.words == 0 {
        debug!("No words to analyze");
        return Ok(summary);
    }

    let raw = analyzer
        .analyze(&stream.analyzer_input())
        .map_err(MorphologyError::Analyzer)?;
    let blocks: Vec<_> = stream
        .align(analyzer::parse_output(&raw))?
        .into_iter()
        .map(analyzer::AnalyzerBlock::without_derivations)
        .collect();

    let mut guessed = vec![false; blocks.len()];
    for (index, block) in blocks.iter().enumerate() {
        if block.is_unanalyzed() {
            guessed[index] = true;
            summary.guessed += 1;
            context.record_unanalyzed(&block.surface);
        }
    }

    let tagger_input = stream.tagger_input(|index| notation::tagger_token(&blocks[index]));
    let tagged = tagger.tag(&tagger_input).map_err(MorphologyError::Tagger)?;
    let tokens = tagger::parse_tokens(&tagged);
    if tokens.len() != stream.word_count() {
        return Err(MorphologyError::Misaligned {
            stage: "tagger",
            expected: stream.word_count(),
            found: tokens.len(),
        });
    }

    for (index, (word, token)) in unit.words_mut().zip(tokens).enumerate() {
        match tagger::read_token(token) {
            TokenReading::Accepted { lemma, morphology } => {
                word.lemma = Some(lemma);
                word.morphology = Some(morphology);
            }
            TokenReading::Rejected(token) => {
                context.record_error(ErrorRecord::rejected(token.surface, token.lemma, token.tag));
                guessed[index] = true;
            }
            TokenReading::Malformed(token) => {
                debug!("Malformed tagger token {token:?}");
                guessed[index] = true;
            }
        }

        if guessed[index] {
            word.morphology_guessed = Some(true);
            if let Some(normalized) = &word.word_text_normalized {
                context.record_normalization_failure(&word.word_text, normalized);
            }
        }
    }

    info!("{summary}");
    Ok(summary)
}
