//! Document model of a segmented poem and its JSON interchange format.
//!
//! Every derived field is optional: absence means the corresponding analysis
//! has not been run. Unknown top-level poem keys are carried through
//! untouched so metadata survives a load/store cycle.

pub mod serde_helpers;
mod verse;

use serde::de::{self, Deserializer};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

pub use verse::{Line, LineEntry, MissingLines, Stanza, Word};

/// Per line length (in syllables), a per-position counter.
pub type PositionStatistics = BTreeMap<usize, Vec<u32>>;

/// Wire sentinel for text found before the first part marker.
pub const UNIDENTIFIED_PART: &str = "UNINDENTIFIED";

/// Identity fields given to the segmenter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PoemMeta {
    pub id: Option<String>,
    pub author: Option<String>,
    pub title: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Poem {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub poem_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub poem_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub poem_author: Option<String>,
    pub manually_checked: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stanzas: Option<Vec<Stanza>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parts: Option<Vec<Part>>,
    #[serde(flatten)]
    pub statistics: Statistics,
    /// Any other top-level key, e.g. `poem_date` or `poem_incipit`.
    #[serde(flatten)]
    pub metadata: BTreeMap<String, serde_json::Value>,
}

impl Poem {
    pub fn has_parts(&self) -> bool {
        self.parts.is_some()
    }

    /// The poem's own stanzas followed by the stanzas of every part.
    pub fn all_stanzas(&self) -> impl Iterator<Item = &Stanza> {
        let own = self.stanzas.iter().flatten();
        let parted = self.parts.iter().flatten().flat_map(|part| part.stanzas.iter());
        own.chain(parted)
    }

    /// Metadata value as a string, if present and textual.
    pub fn metadata_str(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).and_then(serde_json::Value::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Part {
    pub part_number: PartNumber,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub part_title: Option<String>,
    #[serde(default)]
    pub stanzas: Vec<Stanza>,
    #[serde(flatten)]
    pub statistics: Statistics,
}

impl Part {
    pub fn new(part_number: PartNumber, part_title: Option<String>, stanzas: Vec<Stanza>) -> Self {
        Self {
            part_number,
            part_title,
            stanzas,
            statistics: Statistics::default(),
        }
    }
}

/// Ordinal of a part, or the marker for text preceding the first part.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PartNumber {
    Ordinal(u32),
    Unidentified,
}

impl fmt::Display for PartNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PartNumber::Ordinal(n) => write!(f, "{n}"),
            PartNumber::Unidentified => f.write_str(UNIDENTIFIED_PART),
        }
    }
}

impl Serialize for PartNumber {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            PartNumber::Ordinal(n) => serializer.serialize_u32(*n),
            PartNumber::Unidentified => serializer.serialize_str(UNIDENTIFIED_PART),
        }
    }
}

impl<'de> Deserialize<'de> for PartNumber {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(u32),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(n) => Ok(PartNumber::Ordinal(n)),
            Raw::Text(text) if text == UNIDENTIFIED_PART => Ok(PartNumber::Unidentified),
            Raw::Text(text) => match text.parse::<u32>() {
                Ok(n) => Ok(PartNumber::Ordinal(n)),
                Err(_) => Err(de::Error::custom(format!("invalid part number: {text}"))),
            },
        }
    }
}

/// Aggregate statistics of a poem or part. Flattened into the owner.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Statistics {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number_of_stanzas: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number_of_lines: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number_of_words: Option<u32>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        with = "serde_helpers::syllable_keyed"
    )]
    pub long_syllable_statistics: Option<PositionStatistics>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        with = "serde_helpers::syllable_keyed"
    )]
    pub stressed_syllable_statistics: Option<PositionStatistics>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wordstat: Option<WordStat>,
}

impl Statistics {
    pub fn is_empty(&self) -> bool {
        *self == Statistics::default()
    }
}

/// Lemma frequency profile of a text unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordStat {
    #[serde(rename = "_vocabulary")]
    pub vocabulary: f64,
    #[serde(rename = "_repetitivity")]
    pub repetitivity: f64,
    /// Lemmas occurring more often than the mean, with their counts.
    #[serde(flatten)]
    pub frequent: BTreeMap<String, u32>,
}

impl WordStat {
    /// Profile of a unit with no qualifying lemmas.
    pub fn empty() -> Self {
        Self {
            vocabulary: 0.0,
            repetitivity: 1.0,
            frequent: BTreeMap::new(),
        }
    }
}

/// A unit that owns an ordered list of stanzas and carries statistics:
/// a partless poem, or one part of a poem.
pub trait StanzaSet {
    fn stanzas(&self) -> &[Stanza];
    fn stanzas_mut(&mut self) -> &mut [Stanza];
    fn statistics_mut(&mut self) -> &mut Statistics;

    fn words(&self) -> Box<dyn Iterator<Item = &Word> + '_> {
        Box::new(
            self.stanzas()
                .iter()
                .flat_map(|stanza| stanza.verse_lines())
                .flat_map(|line| line.words.iter()),
        )
    }

    fn words_mut(&mut self) -> Box<dyn Iterator<Item = &mut Word> + '_> {
        Box::new(
            self.stanzas_mut()
                .iter_mut()
                .flat_map(|stanza| stanza.verse_lines_mut())
                .flat_map(|line| line.words.iter_mut()),
        )
    }
}

impl StanzaSet for Part {
    fn stanzas(&self) -> &[Stanza] {
        &self.stanzas
    }

    fn stanzas_mut(&mut self) -> &mut [Stanza] {
        &mut self.stanzas
    }

    fn statistics_mut(&mut self) -> &mut Statistics {
        &mut self.statistics
    }
}

impl StanzaSet for Poem {
    fn stanzas(&self) -> &[Stanza] {
        self.stanzas.as_deref().unwrap_or_default()
    }

    fn stanzas_mut(&mut self) -> &mut [Stanza] {
        self.stanzas.as_deref_mut().unwrap_or_default()
    }

    fn statistics_mut(&mut self) -> &mut Statistics {
        &mut self.statistics
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn sample_stanza() -> Stanza {
        let mut line = Line::new(1, "Szép napom", vec![Word::new(1, "Szép"), Word::new(2, "napom")]);
        line.syllable_count = Some(3);
        line.stress_pattern = Some("||.".to_string());
        line.metric_pattern = Some("--U".to_string());
        Stanza::new(
            1,
            vec![
                LineEntry::Verse(line),
                LineEntry::Missing(MissingLines { missing_lines: 2 }),
            ],
        )
    }

    #[test]
    fn test_poem_round_trip_preserves_metadata() {
        let value = json!({
            "poem_id": "RPHA-1",
            "poem_title": "Ének",
            "manually_checked": true,
            "poem_date": "1554",
            "poem_genre": ["história"],
            "stanzas": [
                {
                    "stanza_number": 1,
                    "lines": [
                        {"line_number": 1, "line_text": "Szép napom", "words": [
                            {"word_number": 1, "word_text": "Szép"}
                        ]},
                        {"missing_lines": 3}
                    ]
                }
            ]
        });

        let poem: Poem = serde_json::from_value(value.clone()).unwrap();
        assert_eq!(poem.metadata_str("poem_date"), Some("1554"));
        assert!(poem.manually_checked);
        let stanza = &poem.stanzas()[0];
        assert_eq!(stanza.verse_lines().count(), 1);
        assert_eq!(
            stanza.lines[1],
            LineEntry::Missing(MissingLines { missing_lines: 3 })
        );

        let back = serde_json::to_value(&poem).unwrap();
        assert_eq!(back, value);
    }

    #[test]
    fn test_position_statistics_use_string_keys() {
        let mut stats = Statistics::default();
        let mut long = PositionStatistics::new();
        long.insert(12, vec![1, 0, 2]);
        long.insert(8, vec![0, 1]);
        stats.long_syllable_statistics = Some(long.clone());

        let poem = Poem {
            statistics: stats,
            ..Poem::default()
        };
        let value = serde_json::to_value(&poem).unwrap();
        assert_eq!(
            value["long_syllable_statistics"],
            json!({"8": [0, 1], "12": [1, 0, 2]})
        );

        let back: Poem = serde_json::from_value(value).unwrap();
        assert_eq!(back.statistics.long_syllable_statistics, Some(long));
        assert!(back.metadata.is_empty());
    }

    #[test]
    fn test_part_number_sentinel() {
        let part = Part::new(PartNumber::Unidentified, None, vec![sample_stanza()]);
        let value = serde_json::to_value(&part).unwrap();
        assert_eq!(value["part_number"], json!("UNINDENTIFIED"));

        let back: Part = serde_json::from_value(value).unwrap();
        assert_eq!(back, part);

        let numbered: Part =
            serde_json::from_value(json!({"part_number": 3, "stanzas": []})).unwrap();
        assert_eq!(numbered.part_number, PartNumber::Ordinal(3));
    }

    #[test]
    fn test_wordstat_wire_names() {
        let mut stat = WordStat::empty();
        stat.vocabulary = 4.0;
        stat.repetitivity = 1.5;
        stat.frequent.insert("isten".to_string(), 3);

        let value = serde_json::to_value(&stat).unwrap();
        assert_eq!(
            value,
            json!({"_vocabulary": 4.0, "_repetitivity": 1.5, "isten": 3})
        );
    }

    #[test]
    fn test_words_iterates_verse_lines_only() {
        let part = Part::new(PartNumber::Ordinal(1), None, vec![sample_stanza()]);
        let texts: Vec<&str> = part.words().map(|word| word.word_text.as_str()).collect();
        assert_eq!(texts, vec!["Szép", "napom"]);
    }

    #[test]
    fn test_partless_poem_without_stanzas_has_no_words() {
        let poem = Poem::default();
        assert_eq!(poem.words().count(), 0);
    }
}
