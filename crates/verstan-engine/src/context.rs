//! Per-run bookkeeping shared by the analyses of a batch.
//!
//! A `RunContext` is created by the caller and threaded through every
//! morphology call, replacing any process-wide accumulator.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Kind of a recorded tool error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ErrorMarker {
    /// The tagger could not settle on an analysis for a token.
    Rejected,
    /// The analyzer had no analysis for a word.
    Unanalyzed,
}

impl ErrorMarker {
    pub fn as_char(self) -> char {
        match self {
            ErrorMarker::Rejected => '!',
            ErrorMarker::Unanalyzed => '?',
        }
    }
}

/// One line of the error file.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ErrorRecord {
    pub marker: ErrorMarker,
    pub surface: String,
    pub details: Vec<String>,
}

impl ErrorRecord {
    pub fn rejected(surface: impl Into<String>, lemma: impl Into<String>, tag: impl Into<String>) -> Self {
        Self {
            marker: ErrorMarker::Rejected,
            surface: surface.into(),
            details: vec![lemma.into(), tag.into()],
        }
    }

    pub fn unanalyzed(surface: impl Into<String>) -> Self {
        Self {
            marker: ErrorMarker::Unanalyzed,
            surface: surface.into(),
            details: Vec::new(),
        }
    }
}

impl fmt::Display for ErrorRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}|{}", self.marker.as_char(), self.surface)?;
        for detail in &self.details {
            write!(f, "|{detail}")?;
        }
        Ok(())
    }
}

/// A guessed word whose normalized form may be to blame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizationFailure {
    pub normalized: String,
    pub count: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunContext {
    /// Distinct tool errors, in error-file order.
    pub errors: BTreeSet<ErrorRecord>,
    /// Surface forms the analyzer failed on, with frequencies.
    pub unanalyzed: BTreeMap<String, u32>,
    /// Original surface forms of guessed words that had been normalized.
    pub normalization_failures: BTreeMap<String, NormalizationFailure>,
}

impl RunContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_error(&mut self, record: ErrorRecord) {
        self.errors.insert(record);
    }

    pub fn record_unanalyzed(&mut self, surface: &str) {
        *self.unanalyzed.entry(surface.to_string()).or_default() += 1;
        self.record_error(ErrorRecord::unanalyzed(surface));
    }

    /// Count a guessed word; the first normalized form seen is kept.
    pub fn record_normalization_failure(&mut self, surface: &str, normalized: &str) {
        self.normalization_failures
            .entry(surface.to_string())
            .and_modify(|failure| failure.count += 1)
            .or_insert_with(|| NormalizationFailure {
                normalized: normalized.to_string(),
                count: 1,
            });
    }

    /// Merge the records of another run into this one.
    pub fn absorb(&mut self, other: RunContext) {
        self.errors.extend(other.errors);
        for (surface, count) in other.unanalyzed {
            *self.unanalyzed.entry(surface).or_default() += count;
        }
        for (surface, failure) in other.normalization_failures {
            self.normalization_failures
                .entry(surface)
                .and_modify(|existing| existing.count += failure.count)
                .or_insert(failure);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty() && self.unanalyzed.is_empty() && self.normalization_failures.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_error_record_display() {
        assert_eq!(
            ErrorRecord::rejected("hadnagy", "hadnagy", "[N?]").to_string(),
            "!|hadnagy|hadnagy|[N?]"
        );
        assert_eq!(ErrorRecord::unanalyzed("néktek").to_string(), "?|néktek");
    }

    #[test]
    fn test_errors_are_deduplicated() {
        let mut context = RunContext::new();
        context.record_unanalyzed("néktek");
        context.record_unanalyzed("néktek");

        assert_eq!(context.errors.len(), 1);
        assert_eq!(context.unanalyzed.get("néktek"), Some(&2));
    }

    #[test]
    fn test_absorb_sums_counts() {
        let mut first = RunContext::new();
        first.record_unanalyzed("vitéz");
        first.record_normalization_failure("vitéz", "vitéz");

        let mut second = RunContext::new();
        second.record_unanalyzed("vitéz");
        second.record_normalization_failure("vitéz", "vitéz");
        second.record_error(ErrorRecord::rejected("Buda", "Buda", "?"));

        first.absorb(second);

        assert_eq!(first.unanalyzed.get("vitéz"), Some(&2));
        assert_eq!(first.normalization_failures["vitéz"].count, 2);
        assert_eq!(first.errors.len(), 2);
    }
}
