//! Syllable counting, stress and quantity patterns.
//!
//! Hungarian verse is scanned by vowel count: every vowel is a syllable
//! nucleus and word stress falls on the first syllable. Quantity follows the
//! classical rule: a syllable is long by nature (long vowel) or by position
//! (the vowel is followed by two or more consonants).

use log::debug;

use crate::model::{Line, PositionStatistics, StanzaSet, Word};

const VOWELS: &str = "aeiouöüóőúéáűíAEIOUÖÜÓŐÚÉÁŰÍ";
const LONG_VOWELS: &str = "áéíóúőű";
/// Two-letter spellings of a single consonant.
const DIGRAPHS: [&str; 8] = ["cs", "dz", "gy", "ly", "ny", "sz", "ty", "zs"];
/// Characters that do not take part in quantity scansion.
const IGNORED: &str = " ,.;:!?-–'\"…";

pub const STRESSED: char = '|';
pub const UNSTRESSED: char = '.';
pub const LONG: char = '-';
pub const SHORT: char = 'U';

/// Position statistics of a scanned unit, keyed by line syllable count.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScansionProfile {
    pub long: PositionStatistics,
    pub stressed: PositionStatistics,
}

impl ScansionProfile {
    fn record(&mut self, line: &Line) {
        let Some(count) = line.syllable_count.map(|c| c as usize) else {
            return;
        };
        if count == 0 {
            return;
        }

        let long = self.long.entry(count).or_insert_with(|| vec![0; count]);
        if let Some(metric) = &line.metric_pattern {
            for (slot, mark) in long.iter_mut().zip(metric.chars()) {
                if mark == LONG {
                    *slot += 1;
                }
            }
        }

        let stressed = self.stressed.entry(count).or_insert_with(|| vec![0; count]);
        if let Some(stress) = &line.stress_pattern {
            for (slot, mark) in stressed.iter_mut().zip(stress.chars()) {
                if mark == STRESSED {
                    *slot += 1;
                }
            }
        }
    }
}

pub fn is_vowel(c: char) -> bool {
    VOWELS.contains(c)
}

/// Number of syllables of a word: its vowel count.
pub fn syllable_count(text: &str) -> u32 {
    text.chars().filter(|c| is_vowel(*c)).count() as u32
}

/// Stress marks of a word. Monosyllables are unstressed.
pub fn word_stress(syllables: u32) -> String {
    match syllables {
        0 => String::new(),
        1 => UNSTRESSED.to_string(),
        n => std::iter::once(STRESSED)
            .chain(std::iter::repeat_n(UNSTRESSED, n as usize - 1))
            .collect(),
    }
}

/// Quantity pattern of a line of text, one mark per vowel.
pub fn metric_pattern(line_text: &str) -> String {
    let cleaned: String = line_text
        .chars()
        .filter(|c| !IGNORED.contains(*c))
        .flat_map(char::to_lowercase)
        .collect();

    let mut segments: Vec<String> = Vec::new();
    for c in cleaned.chars() {
        if is_vowel(c) {
            segments.push(c.to_string());
        } else if let Some(current) = segments.last_mut() {
            current.push(c);
        }
    }

    let mut pattern: String = segments
        .iter()
        .map(|segment| if is_long(segment) { LONG } else { SHORT })
        .collect();

    if pattern.ends_with(SHORT) {
        pattern.pop();
        pattern.push(LONG);
    }
    pattern
}

/// Weight of a syllable segment: a vowel and the consonants up to the next
/// vowel.
fn is_long(segment: &str) -> bool {
    let Some(first) = segment.chars().next() else {
        return false;
    };
    if LONG_VOWELS.contains(first) {
        return true;
    }

    match segment.chars().count() {
        0..=2 => false,
        3 => {
            let tail: String = segment.chars().skip(1).collect();
            !DIGRAPHS.contains(&tail.as_str())
        }
        4 => !segment.contains("dzs"),
        _ => true,
    }
}

fn scan_line(line: &mut Line) {
    let mut stress = String::new();
    let mut total = 0;

    let last = line.words.len().saturating_sub(1);
    for (index, word) in line.words.iter_mut().enumerate() {
        let count = scan_word(word);
        if index == last {
            word.rhyme = Some(true);
        }
        stress.push_str(&word_stress(count));
        total += count;
    }

    let metric = if total == 0 {
        stress.clear();
        String::new()
    } else {
        metric_pattern(&line.line_text)
    };

    line.stress_count = Some(stress.chars().filter(|c| *c == STRESSED).count() as u32);
    line.syllable_count = Some(total);
    line.stress_pattern = Some(stress);
    line.metric_pattern = Some(metric);
}

fn scan_word(word: &mut Word) -> u32 {
    let count = syllable_count(&word.word_text);
    word.syllable_count = Some(count);
    count
}

/// Scan every verse line of a unit and store its position statistics.
pub fn scan<S: StanzaSet + ?Sized>(unit: &mut S) -> ScansionProfile {
    let mut profile = ScansionProfile::default();

    for stanza in unit.stanzas_mut() {
        let mut counts = Vec::new();
        for line in stanza.verse_lines_mut() {
            scan_line(line);
            profile.record(line);
            counts.push(line.syllable_count.unwrap_or_default().to_string());
        }
        stanza.syllables = Some(counts.join(", "));
    }

    debug!("Scanned {} line lengths", profile.long.len());

    let statistics = unit.statistics_mut();
    statistics.long_syllable_statistics = Some(profile.long.clone());
    statistics.stressed_syllable_statistics = Some(profile.stressed.clone());
    profile
}
