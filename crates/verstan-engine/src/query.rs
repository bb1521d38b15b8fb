//! Read-only views over a corpus: line search and plain-text extraction.

use log::info;
use regex::Regex;
use std::collections::BTreeMap;

use crate::io::UNKNOWN_POEM_ID;
use crate::model::Poem;

/// Result of a line search.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchHits {
    /// Total number of matches across the corpus.
    pub hits: usize,
    /// Every poem with at least one match.
    pub poems: BTreeMap<String, PoemHits>,
}

/// Matches within one poem.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PoemHits {
    /// Number of matches, counting every match on a line.
    pub hits: usize,
    /// Texts of the lines with at least one match.
    pub lines: Vec<String>,
}

fn poem_label(poem: &Poem) -> &str {
    poem.poem_id.as_deref().unwrap_or(UNKNOWN_POEM_ID)
}

pub fn search_lines(pattern: &Regex, corpus: &[Poem]) -> SearchHits {
    let mut result = SearchHits::default();

    for poem in corpus {
        let mut poem_hits = 0;
        let mut lines = Vec::new();
        for line in poem.all_stanzas().flat_map(|stanza| stanza.verse_lines()) {
            let count = pattern.find_iter(&line.line_text).count();
            if count > 0 {
                poem_hits += count;
                lines.push(line.line_text.clone());
            }
        }

        if poem_hits > 0 {
            info!("{}: {poem_hits}", poem_label(poem));
            result.hits += poem_hits;
            let entry = result.poems.entry(poem_label(poem).to_string()).or_default();
            entry.hits += poem_hits;
            entry.lines.extend(lines);
        }
    }

    info!("Total hits for {:?}: {}", pattern.as_str(), result.hits);
    result
}

/// Plain text of every poem: a header line, a blank line, then the lines
/// of each stanza followed by a blank line.
pub fn extract_text(corpus: &[Poem]) -> Vec<String> {
    corpus
        .iter()
        .map(|poem| {
            let mut text = format!(
                "{}: {} ({})\n\n",
                poem.poem_author.as_deref().unwrap_or_default(),
                poem.metadata_str("poem_incipit").unwrap_or_default(),
                poem_label(poem)
            );
            for stanza in poem.all_stanzas() {
                for line in stanza.verse_lines() {
                    text.push_str(&line.line_text);
                    text.push('\n');
                }
                text.push('\n');
            }
            text
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PoemMeta;
    use crate::segment::segment_poem;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn corpus() -> Vec<Poem> {
        let mut first = segment_poem(
            "Isten, Isten, te vagy\nMásik sor\n\nIsten nevében",
            PoemMeta {
                id: Some("RPHA-1".to_string()),
                author: Some("Tinódi".to_string()),
                title: None,
            },
        );
        first
            .metadata
            .insert("poem_incipit".to_string(), json!("Isten, Isten"));
        let second = segment_poem(
            "[part \"Egy\"]\nNincs itt semmi",
            PoemMeta {
                id: Some("RPHA-2".to_string()),
                author: None,
                title: None,
            },
        );
        vec![first, second]
    }

    #[test]
    fn test_search_lines_counts_every_match() {
        let pattern = Regex::new("Isten").unwrap();
        let hits = search_lines(&pattern, &corpus());

        assert_eq!(hits.hits, 3);
        assert_eq!(
            hits.poems["RPHA-1"],
            PoemHits {
                hits: 3,
                lines: vec!["Isten, Isten, te vagy".to_string(), "Isten nevében".to_string()],
            }
        );
        assert!(!hits.poems.contains_key("RPHA-2"));
    }

    #[test]
    fn test_search_inside_parts() {
        let pattern = Regex::new("semmi").unwrap();
        let hits = search_lines(&pattern, &corpus());
        assert_eq!(hits.hits, 1);
        assert_eq!(hits.poems["RPHA-2"].hits, 1);
    }

    #[test]
    fn test_extract_text() {
        let texts = extract_text(&corpus());

        assert_eq!(
            texts[0],
            "Tinódi: Isten, Isten (RPHA-1)\n\nIsten, Isten, te vagy\nMásik sor\n\nIsten nevében\n\n"
        );
        assert_eq!(texts[1], ":  (RPHA-2)\n\nNincs itt semmi\n\n");
    }
}
