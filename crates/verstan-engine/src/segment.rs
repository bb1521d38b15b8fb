//! Segmentation of a plain-text transcription into parts, stanzas, lines
//! and words.
//!
//! The input convention is loose: stanzas are separated by blank lines,
//! parts are introduced by `[part "Title"]` markers and lost lines are noted
//! as `[miss "N" lines]`. Segmentation never fails; anomalies such as text
//! before the first part marker are kept and flagged in the output.

use log::{debug, warn};
use regex::Regex;
use std::sync::OnceLock;

use crate::model::{Line, LineEntry, MissingLines, Part, PartNumber, Poem, PoemMeta, Stanza, Word};

static PART_MARKER: OnceLock<Regex> = OnceLock::new();
static ANNOTATION: OnceLock<Regex> = OnceLock::new();
static MISSING_COUNT: OnceLock<Regex> = OnceLock::new();

/// Letters besides ASCII that may appear inside a word.
const HUNGARIAN_LETTERS: &str = "öüóőúéáűíÖÜÓŐÚÉÁŰÍ";

fn part_marker() -> &'static Regex {
    PART_MARKER.get_or_init(|| {
        Regex::new(r#"\n*\[part ?"?([^\]]*?)"?\]\n*"#).expect("Invalid part marker regex")
    })
}

fn annotation() -> &'static Regex {
    ANNOTATION.get_or_init(|| Regex::new(r"\[[^\]]*\]").expect("Invalid annotation regex"))
}

fn missing_count() -> &'static Regex {
    MISSING_COUNT.get_or_init(|| {
        Regex::new(r#"miss[_ ]"?([^"_ \]]*)"?[_ ]lines"#).expect("Invalid missing lines regex")
    })
}

/// Segment a whole poem. Parts are produced only when the text contains
/// at least one part marker.
pub fn segment_poem(text: &str, meta: PoemMeta) -> Poem {
    let text = text.replace("\r\n", "\n");

    let mut poem = Poem {
        poem_id: meta.id,
        poem_title: meta.title,
        poem_author: meta.author,
        ..Poem::default()
    };

    let markers: Vec<_> = part_marker().captures_iter(&text).collect();
    if markers.is_empty() {
        poem.stanzas = Some(segment_stanzas(&text));
        return poem;
    }

    let mut parts = Vec::with_capacity(markers.len() + 1);

    let lead_end = markers[0].get(0).map_or(0, |m| m.start());
    let lead = &text[..lead_end];
    if !lead.trim().is_empty() {
        warn!(
            "Text before the first part marker in {}",
            poem.poem_id.as_deref().unwrap_or("unnamed poem")
        );
        parts.push(Part::new(PartNumber::Unidentified, None, segment_stanzas(lead)));
    }

    for (index, marker) in markers.iter().enumerate() {
        let body_start = marker.get(0).map_or(0, |m| m.end());
        let body_end = markers
            .get(index + 1)
            .and_then(|next| next.get(0))
            .map_or(text.len(), |m| m.start());
        let title = marker.get(1).map(|m| m.as_str().to_string());
        let ordinal = index as u32 + 1;

        parts.push(Part::new(
            PartNumber::Ordinal(ordinal),
            title,
            segment_stanzas(&text[body_start..body_end]),
        ));
    }

    debug!("Segmented {} parts", parts.len());
    poem.parts = Some(parts);
    poem
}

/// Segment a text without part markers into stanzas.
pub fn segment_stanzas(text: &str) -> Vec<Stanza> {
    let text = annotation().replace_all(text, |caps: &regex::Captures| caps[0].replace(' ', "_"));

    text.split("\n\n")
        .enumerate()
        .filter_map(|(index, raw)| {
            let lines = segment_lines(raw);
            if lines.is_empty() {
                None
            } else {
                Some(Stanza::new(index as u32 + 1, lines))
            }
        })
        .collect()
}

fn segment_lines(stanza: &str) -> Vec<LineEntry> {
    let mut entries = Vec::new();
    let mut line_number = 0u32;

    for raw in stanza.split('\n') {
        if raw.contains("[miss") {
            if raw.contains("lines") {
                let missing = parse_missing_count(raw);
                match line_number.checked_add(missing) {
                    Some(next) => line_number = next,
                    None => {
                        warn!("Missing lines count out of range: {raw}");
                        continue;
                    }
                }
                if missing > 0 {
                    entries.push(LineEntry::Missing(MissingLines {
                        missing_lines: missing,
                    }));
                }
            }
            continue;
        }

        line_number = line_number.saturating_add(1);
        let words = tokenize(raw);
        if !words.is_empty() {
            entries.push(LineEntry::Verse(Line::new(line_number, raw, words)));
        }
    }

    entries
}

fn parse_missing_count(line: &str) -> u32 {
    let Some(count) = missing_count().captures(line).and_then(|caps| caps.get(1)) else {
        warn!("Unreadable missing lines marker: {line}");
        return 0;
    };

    match count.as_str() {
        "?" => 0,
        digits => digits.parse().unwrap_or_else(|_| {
            warn!("Unreadable missing lines count {digits:?}, assuming 0");
            0
        }),
    }
}

/// Whether a character can be part of a word.
pub fn is_letter(c: char) -> bool {
    c.is_ascii_alphabetic() || HUNGARIAN_LETTERS.contains(c)
}

/// Split a line into words, trimming punctuation at both ends of each token.
pub fn tokenize(line: &str) -> Vec<Word> {
    line.split_whitespace()
        .map(|token| token.trim_matches(|c: char| !is_letter(c)))
        .filter(|token| !token.is_empty())
        .enumerate()
        .map(|(index, token)| Word::new(index as u32 + 1, token))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use std::fmt::Write as _;

    fn meta(id: &str) -> PoemMeta {
        PoemMeta {
            id: Some(id.to_string()),
            author: None,
            title: None,
        }
    }

    fn outline(stanzas: &[Stanza], out: &mut String) {
        for stanza in stanzas {
            writeln!(out, "stanza {}", stanza.stanza_number).unwrap();
            for entry in &stanza.lines {
                match entry {
                    LineEntry::Verse(line) => {
                        let words: Vec<&str> =
                            line.words.iter().map(|w| w.word_text.as_str()).collect();
                        writeln!(out, "  line {}: {}", line.line_number, words.join(" ")).unwrap();
                    }
                    LineEntry::Missing(missing) => {
                        writeln!(out, "  missing {}", missing.missing_lines).unwrap();
                    }
                }
            }
        }
    }

    fn poem_outline(poem: &Poem) -> String {
        let mut out = String::new();
        if let Some(parts) = &poem.parts {
            for part in parts {
                writeln!(
                    out,
                    "part {} {:?}",
                    part.part_number,
                    part.part_title.as_deref().unwrap_or_default()
                )
                .unwrap();
                outline(&part.stanzas, &mut out);
            }
        } else {
            outline(poem.stanzas.as_deref().unwrap_or_default(), &mut out);
        }
        out
    }

    #[test]
    fn test_two_stanzas_without_parts() {
        let poem = segment_poem(
            "Szép asszonyomnak szóljak most dolgáról.\n\nMásik versben.",
            meta("RPHA-1"),
        );

        assert!(poem.parts.is_none());
        let stanzas = poem.stanzas.as_ref().unwrap();
        assert_eq!(stanzas.len(), 2);

        let first: Vec<&Line> = stanzas[0].verse_lines().collect();
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].words.len(), 5);
        assert_eq!(first[0].words.last().unwrap().word_text, "dolgáról");
        assert_eq!(first[0].line_text, "Szép asszonyomnak szóljak most dolgáról.");
        assert_eq!(stanzas[1].verse_lines().count(), 1);
    }

    #[test]
    fn test_missing_lines_offset_numbering() {
        let poem = segment_poem(
            "Első sor\n[miss \"2\" lines]\nNegyedik sor",
            meta("RPHA-2"),
        );
        let stanza = &poem.stanzas.as_ref().unwrap()[0];

        assert_eq!(
            stanza.lines[1],
            LineEntry::Missing(MissingLines { missing_lines: 2 })
        );
        let numbers: Vec<u32> = stanza.verse_lines().map(|l| l.line_number).collect();
        assert_eq!(numbers, vec![1, 4]);
    }

    #[rstest]
    #[case::unknown_count("Egy\n[miss \"?\" lines]\nKettő", vec![1, 2], 2)]
    #[case::unquoted_count("Egy\n[miss 3 lines]\nKettő", vec![1, 5], 3)]
    #[case::garbled_count("Egy\n[miss \"sok\" lines]\nKettő", vec![1, 2], 2)]
    #[case::marker_without_lines("Egy\n[missing stanza]\nKettő", vec![1, 2], 2)]
    #[case::count_out_of_range("Egy\n[miss \"4294967295\" lines]\nKettő", vec![1, 2], 2)]
    fn test_missing_marker_variants(
        #[case] text: &str,
        #[case] expected_numbers: Vec<u32>,
        #[case] expected_entries: usize,
    ) {
        let stanzas = segment_stanzas(text);
        let numbers: Vec<u32> = stanzas[0].verse_lines().map(|l| l.line_number).collect();

        assert_eq!(numbers, expected_numbers);
        assert_eq!(stanzas[0].lines.len(), expected_entries);
    }

    #[rstest]
    #[case("Szép, asszony!", vec!["Szép", "asszony"])]
    #[case("\"Ó  Uram\" ...", vec!["Ó", "Uram"])]
    #[case("-- 12 --", vec![])]
    #[case("fő-fő vitéz", vec!["fő-fő", "vitéz"])]
    fn test_tokenize(#[case] line: &str, #[case] expected: Vec<&str>) {
        let words = tokenize(line);
        let texts: Vec<&str> = words.iter().map(|w| w.word_text.as_str()).collect();
        let ordinals: Vec<u32> = words.iter().map(|w| w.word_number).collect();

        assert_eq!(texts, expected);
        assert_eq!(ordinals, (1..=expected.len() as u32).collect::<Vec<_>>());
    }

    #[test]
    fn test_empty_lines_and_stanzas_consume_numbers() {
        let stanzas = segment_stanzas("Egy\n...\nHárom\n\n-- --\n\nÖt");

        let numbers: Vec<u32> = stanzas.iter().map(|s| s.stanza_number).collect();
        assert_eq!(numbers, vec![1, 3]);
        let lines: Vec<u32> = stanzas[0].verse_lines().map(|l| l.line_number).collect();
        assert_eq!(lines, vec![1, 3]);
    }

    #[test]
    fn test_annotation_spaces_become_underscores() {
        let stanzas = segment_stanzas("Kezdet [lap szele] vége");
        let line = stanzas[0].verse_lines().next().unwrap();

        assert_eq!(line.line_text, "Kezdet [lap_szele] vége");
        let texts: Vec<&str> = line.words.iter().map(|w| w.word_text.as_str()).collect();
        assert_eq!(texts, vec!["Kezdet", "lap_szele", "vége"]);
    }

    #[test]
    fn test_crlf_input() {
        let poem = segment_poem("Egy sor\r\n\r\nMásik sor\r\n", meta("RPHA-3"));
        assert_eq!(poem.stanzas.as_ref().unwrap().len(), 2);
    }

    #[test]
    fn test_parts_outline() {
        let text = "Előhang sora\n\n[part \"Első rész\"]\nElső rész sora\nMásodik sor\n\nÚj versszak\n[part Második]\n\nUtolsó sor\n[miss \"1\" lines]";
        let poem = segment_poem(text, meta("RPHA-4"));

        insta::assert_snapshot!(poem_outline(&poem), @r#"
        part UNINDENTIFIED ""
        stanza 1
          line 1: Előhang sora
        part 1 "Első rész"
        stanza 1
          line 1: Első rész sora
          line 2: Második sor
        stanza 2
          line 1: Új versszak
        part 2 "Második"
        stanza 1
          line 1: Utolsó sor
          missing 1
        "#);
    }

    #[test]
    fn test_part_without_leading_text() {
        let poem = segment_poem("[part \"Egy\"]\nSor egy\n[part \"Kettő\"]\nSor kettő", meta("RPHA-5"));
        let parts = poem.parts.unwrap();

        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0].part_number, PartNumber::Ordinal(1));
        assert_eq!(parts[1].part_title.as_deref(), Some("Kettő"));
    }
}
