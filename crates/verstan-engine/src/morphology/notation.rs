//! Conversion of analyzer analyses into tagger input notation.
//!
//! An analysis such as `el[VPfx]mond[V][Prs.Def.1Sg]` becomes a lemma and
//! a colon-joined tag list: `elmond[VPfx:V:Prs.Def.1Sg]`. The lemma is
//! derived by the first rule of [`LEMMA_RULES`] that applies.

use regex::Regex;
use std::sync::OnceLock;

use super::analyzer::{AnalyzerBlock, Candidate};

static TAG: OnceLock<Regex> = OnceLock::new();
static NOMINAL_MORPHEME: OnceLock<Regex> = OnceLock::new();

const VERBAL_PREFIX: &str = "[VPfx]";

fn tag() -> &'static Regex {
    TAG.get_or_init(|| Regex::new(r"\[(.*?)\]").expect("Invalid tag regex"))
}

fn nominal_morpheme() -> &'static Regex {
    NOMINAL_MORPHEME.get_or_init(|| {
        Regex::new(r"([A-Za-zűáéúőóüöíŰÁÉÚŐÓÜÖÍ]+)\[[NQ]\]").expect("Invalid morpheme regex")
    })
}

/// One way of reading a lemma off an analysis.
pub struct LemmaRule {
    pub name: &'static str,
    pub applies: fn(&str) -> bool,
    pub build: fn(&str) -> String,
}

pub const LEMMA_RULES: [LemmaRule; 3] = [
    LemmaRule {
        name: "verbal prefix",
        applies: has_verbal_prefix,
        build: prefixed_verb_lemma,
    },
    LemmaRule {
        name: "compound",
        applies: is_compound,
        build: compound_lemma,
    },
    LemmaRule {
        name: "plain",
        applies: always,
        build: plain_lemma,
    },
];

fn has_verbal_prefix(analysis: &str) -> bool {
    analysis.contains(VERBAL_PREFIX)
}

/// Every prefix before the last `[VPfx]`, without tags, followed by the
/// verb radical.
fn prefixed_verb_lemma(analysis: &str) -> String {
    let Some(split) = analysis.rfind(VERBAL_PREFIX) else {
        return plain_lemma(analysis);
    };
    let prefixes = tag().replace_all(&analysis[..split], "");
    let radical = plain_lemma(&analysis[split + VERBAL_PREFIX.len()..]);
    format!("{prefixes}{radical}")
}

fn is_compound(analysis: &str) -> bool {
    nominal_morpheme().find_iter(analysis).count() > 1
}

fn compound_lemma(analysis: &str) -> String {
    nominal_morpheme()
        .captures_iter(analysis)
        .filter_map(|caps| caps.get(1))
        .map(|stem| stem.as_str())
        .collect()
}

fn always(_: &str) -> bool {
    true
}

fn plain_lemma(analysis: &str) -> String {
    analysis.split('[').next().unwrap_or_default().to_string()
}

pub fn lemma(analysis: &str) -> String {
    LEMMA_RULES
        .iter()
        .find(|rule| (rule.applies)(analysis))
        .map(|rule| (rule.build)(analysis))
        .unwrap_or_default()
}

/// Tagger notation of one candidate; empty for a failed analysis.
pub fn candidate_notation(candidate: &Candidate) -> String {
    if candidate.is_failure() {
        return String::new();
    }
    let tags: Vec<&str> = tag()
        .captures_iter(&candidate.analysis)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str())
        .collect();
    format!("{}[{}]", lemma(&candidate.analysis), tags.join(":"))
}

/// Tagger token of a word: `surface{{n1||n2}}`, or the bare surface when
/// the analyzer offered nothing usable.
pub fn tagger_token(block: &AnalyzerBlock) -> String {
    let notations: Vec<String> = block.candidates.iter().map(candidate_notation).collect();
    match notations.first() {
        Some(first) if !first.is_empty() => {
            format!("{}{{{{{}}}}}", block.surface, notations.join("||"))
        }
        _ => block.surface.clone(),
    }
}
