//! Orchestration of the analyses over poems and corpora.

use log::{error, info};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::context::RunContext;
use crate::model::{Poem, StanzaSet};
use crate::morphology::normalize::{Normalizer, NormalizerSet};
use crate::morphology::{MorphologyError, analyze_morphology};
use crate::tools::{MorphAnalyzer, Tagger, ToolError, Transcriber};
use crate::{phonetic, scansion, stats};

/// An analysis that can be requested for a run. Ordering is execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Analysis {
    Morphology,
    Syllables,
    Length,
    Phonetic,
    WordStat,
}

impl Analysis {
    pub const ALL: [Analysis; 5] = [
        Analysis::Morphology,
        Analysis::Syllables,
        Analysis::Length,
        Analysis::Phonetic,
        Analysis::WordStat,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Analysis::Morphology => "morphology",
            Analysis::Syllables => "syllables",
            Analysis::Length => "length",
            Analysis::Phonetic => "phonetic",
            Analysis::WordStat => "wordstat",
        }
    }
}

impl fmt::Display for Analysis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Unknown analysis: {0}")]
pub struct ParseAnalysisError(String);

impl FromStr for Analysis {
    type Err = ParseAnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Analysis::ALL
            .into_iter()
            .find(|analysis| analysis.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseAnalysisError(s.to_string()))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Morphology(#[from] MorphologyError),
    #[error("Phonetic transcription failed: {0}")]
    Phonetic(#[from] ToolError),
}

/// A poem whose analysis failed; it is left unchanged in the corpus.
#[derive(Debug)]
pub struct PoemFailure {
    pub poem_id: Option<String>,
    pub error: PipelineError,
}

#[derive(Debug, Default)]
pub struct RunReport {
    pub context: RunContext,
    pub failures: Vec<PoemFailure>,
}

pub struct Pipeline {
    analyses: BTreeSet<Analysis>,
    analyzer: Box<dyn MorphAnalyzer>,
    tagger: Box<dyn Tagger>,
    transcriber: Box<dyn Transcriber>,
    normalizers: NormalizerSet,
}

impl Pipeline {
    pub fn new(
        analyses: impl IntoIterator<Item = Analysis>,
        analyzer: Box<dyn MorphAnalyzer>,
        tagger: Box<dyn Tagger>,
        transcriber: Box<dyn Transcriber>,
        normalizers: NormalizerSet,
    ) -> Self {
        Self {
            analyses: analyses.into_iter().collect(),
            analyzer,
            tagger,
            transcriber,
            normalizers,
        }
    }

    pub fn analyses(&self) -> impl Iterator<Item = Analysis> + '_ {
        self.analyses.iter().copied()
    }

    fn run_unit<S: StanzaSet + ?Sized>(
        &self,
        unit: &mut S,
        normalizer: &Normalizer,
        context: &mut RunContext,
    ) -> Result<(), PipelineError> {
        for analysis in &self.analyses {
            match analysis {
                Analysis::Morphology => {
                    analyze_morphology(
                        unit,
                        normalizer,
                        self.analyzer.as_ref(),
                        self.tagger.as_ref(),
                        context,
                    )?;
                }
                Analysis::Syllables => {
                    scansion::scan(unit);
                }
                Analysis::Length => stats::count_length(unit),
                Analysis::Phonetic => {
                    phonetic::transcribe(unit, self.transcriber.as_ref())?;
                }
                Analysis::WordStat => {
                    stats::word_statistics(unit);
                }
            }
        }
        Ok(())
    }

    /// Run every requested analysis on a poem, part by part when it has
    /// parts.
    pub fn analyze_poem(&self, poem: &mut Poem, context: &mut RunContext) -> Result<(), PipelineError> {
        info!(
            "{}\t{}\t{}",
            poem.poem_id.as_deref().unwrap_or_default(),
            poem.poem_author.as_deref().unwrap_or_default(),
            poem.poem_title.as_deref().unwrap_or_default()
        );
        let normalizer = self.normalizers.for_author(poem.poem_author.as_deref());

        if poem.has_parts() {
            for part in poem.parts.iter_mut().flatten() {
                self.run_unit(part, normalizer, context)?;
            }
            stats::sum_parts(poem);
        } else {
            self.run_unit(poem, normalizer, context)?;
        }
        Ok(())
    }

    /// Analyze a whole corpus. A poem that fails is logged, kept in its
    /// original state and reported; the others are still analyzed.
    pub fn analyze_corpus(&self, corpus: &mut [Poem]) -> RunReport {
        let mut report = RunReport::default();

        for poem in corpus.iter_mut() {
            let mut working = poem.clone();
            let mut context = RunContext::new();
            match self.analyze_poem(&mut working, &mut context) {
                Ok(()) => {
                    *poem = working;
                    report.context.absorb(context);
                }
                Err(error) => {
                    error!(
                        "Analysis of {} failed: {error}",
                        poem.poem_id.as_deref().unwrap_or("unnamed poem")
                    );
                    report.failures.push(PoemFailure {
                        poem_id: poem.poem_id.clone(),
                        error,
                    });
                }
            }
        }

        info!(
            "Analyzed {} poems, {} failed",
            corpus.len(),
            report.failures.len()
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PoemMeta;
    use crate::segment::segment_poem;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    struct Unavailable;

    impl MorphAnalyzer for Unavailable {
        fn analyze(&self, _: &str) -> Result<String, ToolError> {
            Err(ToolError::Encoding {
                program: "analyzer".to_string(),
            })
        }
    }

    impl Tagger for Unavailable {
        fn tag(&self, _: &str) -> Result<String, ToolError> {
            Err(ToolError::Encoding {
                program: "tagger".to_string(),
            })
        }
    }

    /// Transcribes by lower-casing; fails on words starting with `X`.
    struct Lowercase;

    impl Transcriber for Lowercase {
        fn transcribe(&self, word: &str) -> Result<String, ToolError> {
            if word.starts_with('X') {
                return Err(ToolError::Encoding {
                    program: "transcriber".to_string(),
                });
            }
            Ok(word.to_lowercase())
        }
    }

    fn pipeline(analyses: &[Analysis]) -> Pipeline {
        Pipeline::new(
            analyses.iter().copied(),
            Box::new(Unavailable),
            Box::new(Unavailable),
            Box::new(Lowercase),
            NormalizerSet::identity(),
        )
    }

    fn poem(id: &str, text: &str) -> Poem {
        segment_poem(
            text,
            PoemMeta {
                id: Some(id.to_string()),
                author: None,
                title: None,
            },
        )
    }

    #[rstest]
    #[case("morphology", Analysis::Morphology)]
    #[case("Syllables", Analysis::Syllables)]
    #[case(" wordstat ", Analysis::WordStat)]
    fn test_parse_analysis(#[case] input: &str, #[case] expected: Analysis) {
        assert_eq!(input.parse::<Analysis>().unwrap(), expected);
    }

    #[test]
    fn test_parse_unknown_analysis() {
        let err = "demo".parse::<Analysis>().unwrap_err();
        assert_eq!(err.to_string(), "Unknown analysis: demo");
    }

    #[test]
    fn test_analyze_partless_poem() {
        let pipeline = pipeline(&[Analysis::WordStat, Analysis::Length, Analysis::Syllables]);
        let mut poem = poem("RPHA-1", "Ki ne tudna\n\nMásik versben");
        let mut context = RunContext::new();

        pipeline.analyze_poem(&mut poem, &mut context).unwrap();

        assert_eq!(poem.statistics.number_of_lines, Some(2));
        assert_eq!(poem.statistics.wordstat, Some(crate::model::WordStat::empty()));
        assert!(poem.statistics.long_syllable_statistics.is_some());
    }

    #[test]
    fn test_analyze_poem_with_parts_sums_statistics() {
        let pipeline = pipeline(&[Analysis::Length, Analysis::Syllables]);
        let mut poem = poem("RPHA-2", "[part \"Egy\"]\nKi ne tudna\n[part \"Kettő\"]\nMásik versben");
        let mut context = RunContext::new();

        pipeline.analyze_poem(&mut poem, &mut context).unwrap();

        assert_eq!(poem.statistics.number_of_lines, Some(2));
        assert_eq!(
            poem.statistics.long_syllable_statistics.as_ref().unwrap().get(&4),
            Some(&vec![1, 1, 2, 2])
        );
        let parts = poem.parts.as_ref().unwrap();
        assert!(parts.iter().all(|part| part.statistics.is_empty()));
        assert_eq!(parts[1].stanzas[0].syllables.as_deref(), Some("4"));
    }

    #[test]
    fn test_later_run_keeps_part_statistics_of_earlier_run() {
        let text = "[part \"Egy\"]\nKi ne tudna\n[part \"Kettő\"]\nMásik versben";
        let mut poem = poem("RPHA-6", text);
        let mut context = RunContext::new();

        pipeline(&[Analysis::Syllables])
            .analyze_poem(&mut poem, &mut context)
            .unwrap();
        pipeline(&[Analysis::Length])
            .analyze_poem(&mut poem, &mut context)
            .unwrap();

        assert_eq!(
            poem.statistics.long_syllable_statistics.as_ref().unwrap().get(&4),
            Some(&vec![1, 1, 2, 2])
        );
        assert!(poem.statistics.stressed_syllable_statistics.is_some());
        assert_eq!(poem.statistics.number_of_lines, Some(2));
    }

    #[test]
    fn test_failed_poem_is_left_unchanged() {
        // Given a corpus where one poem trips the transcriber
        let pipeline = pipeline(&[Analysis::Syllables, Analysis::Phonetic]);
        let broken = poem("RPHA-2", "Xantus vitéz");
        let mut corpus = vec![poem("RPHA-1", "Szép napom"), broken.clone(), poem("RPHA-3", "Jó estét")];

        // When the corpus is analyzed
        let report = pipeline.analyze_corpus(&mut corpus);

        // Then the broken poem is reported and untouched, the rest analyzed
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].poem_id.as_deref(), Some("RPHA-2"));
        assert!(matches!(report.failures[0].error, PipelineError::Phonetic(_)));
        assert_eq!(corpus[1], broken);
        assert!(corpus[0].statistics.long_syllable_statistics.is_some());
        assert!(corpus[2].words().all(|word| word.word_ipa_espeak.is_some()));
    }

    #[test]
    fn test_morphology_failure_is_reported() {
        let pipeline = pipeline(&[Analysis::Morphology]);
        let mut corpus = vec![poem("RPHA-1", "Szép napom")];

        let report = pipeline.analyze_corpus(&mut corpus);

        assert!(matches!(
            report.failures[0].error,
            PipelineError::Morphology(MorphologyError::Analyzer(_))
        ));
        assert!(report.context.is_empty());
    }
}
