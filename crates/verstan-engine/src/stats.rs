//! Length counts, lemma frequency profiles and part summation.

use log::debug;
use std::collections::BTreeMap;
use std::mem;

use crate::model::{Poem, PositionStatistics, StanzaSet, Statistics, WordStat};

/// Part-of-speech tags whose lemmas count towards the vocabulary.
const CONTENT_TAGS: [&str; 4] = ["[N]", "[V]", "[Adv]", "[Adj]"];

/// Count stanzas, verse lines and words of a unit.
pub fn count_length<S: StanzaSet + ?Sized>(unit: &mut S) {
    let stanzas = unit.stanzas().len() as u32;
    let lines = unit
        .stanzas()
        .iter()
        .map(|stanza| stanza.verse_lines().count() as u32)
        .sum();
    let words = unit.words().count() as u32;

    let statistics = unit.statistics_mut();
    statistics.number_of_stanzas = Some(stanzas);
    statistics.number_of_lines = Some(lines);
    statistics.number_of_words = Some(words);
}

/// Build the lemma frequency profile of a unit.
pub fn word_statistics<S: StanzaSet + ?Sized>(unit: &mut S) -> WordStat {
    let mut frequencies: BTreeMap<String, u32> = BTreeMap::new();
    for word in unit.words() {
        let (Some(lemma), Some(morphology)) = (&word.lemma, &word.morphology) else {
            continue;
        };
        let content_word = CONTENT_TAGS.iter().any(|tag| morphology.contains(tag));
        if content_word && lemma.to_lowercase() == *lemma {
            *frequencies.entry(lemma.clone()).or_default() += 1;
        }
    }

    let stat = if frequencies.is_empty() {
        WordStat::empty()
    } else {
        let occurrences: u32 = frequencies.values().sum();
        let mean = f64::from(occurrences) / frequencies.len() as f64;
        WordStat {
            vocabulary: frequencies.len() as f64,
            repetitivity: mean,
            frequent: frequencies
                .into_iter()
                .filter(|(_, count)| f64::from(*count) > mean)
                .collect(),
        }
    };

    unit.statistics_mut().wordstat = Some(stat.clone());
    stat
}

fn add_positions(total: &mut Option<PositionStatistics>, part: Option<PositionStatistics>) {
    let Some(part) = part else {
        return;
    };
    let total = total.get_or_insert_with(PositionStatistics::new);
    for (syllables, counts) in part {
        let sums = total.entry(syllables).or_default();
        if sums.len() < counts.len() {
            sums.resize(counts.len(), 0);
        }
        for (sum, count) in sums.iter_mut().zip(counts) {
            *sum += count;
        }
    }
}

fn nonzero(count: u32) -> Option<u32> {
    (count > 0).then_some(count)
}

/// Aggregate the statistics of every part into the poem, clearing them
/// from the parts. Poem fields that no part supplied are left as they are.
pub fn sum_parts(poem: &mut Poem) {
    let Some(parts) = poem.parts.as_mut() else {
        return;
    };

    let mut total = Statistics::default();
    let (mut stanzas, mut lines, mut words) = (0, 0, 0);
    let mut frequent: BTreeMap<String, u32> = BTreeMap::new();
    let mut wordstats = Vec::new();

    for part in parts.iter_mut() {
        let part_stats = mem::take(&mut part.statistics);
        add_positions(&mut total.long_syllable_statistics, part_stats.long_syllable_statistics);
        add_positions(
            &mut total.stressed_syllable_statistics,
            part_stats.stressed_syllable_statistics,
        );
        stanzas += part_stats.number_of_stanzas.unwrap_or_default();
        lines += part_stats.number_of_lines.unwrap_or_default();
        words += part_stats.number_of_words.unwrap_or_default();

        if let Some(stat) = part_stats.wordstat {
            for (lemma, count) in &stat.frequent {
                *frequent.entry(lemma.clone()).or_default() += count;
            }
            wordstats.push(stat);
        }
    }

    debug!("Summed statistics of {} parts", parts.len());

    // Fields no part supplied keep what an earlier run stored on the poem.
    let statistics = &mut poem.statistics;
    if total.long_syllable_statistics.is_some() {
        statistics.long_syllable_statistics = total.long_syllable_statistics;
    }
    if total.stressed_syllable_statistics.is_some() {
        statistics.stressed_syllable_statistics = total.stressed_syllable_statistics;
    }
    if let Some(stanzas) = nonzero(stanzas) {
        statistics.number_of_stanzas = Some(stanzas);
    }
    if let Some(lines) = nonzero(lines) {
        statistics.number_of_lines = Some(lines);
    }
    if let Some(words) = nonzero(words) {
        statistics.number_of_words = Some(words);
    }

    if !wordstats.is_empty() {
        let counted: Vec<&WordStat> = wordstats.iter().filter(|stat| stat.vocabulary > 0.0).collect();
        let mut stat = if counted.is_empty() {
            WordStat::empty()
        } else {
            let n = counted.len() as f64;
            WordStat {
                vocabulary: counted.iter().map(|stat| stat.vocabulary).sum::<f64>() / n,
                repetitivity: counted.iter().map(|stat| stat.repetitivity).sum::<f64>() / n,
                frequent: BTreeMap::new(),
            }
        };
        stat.frequent = frequent;
        statistics.wordstat = Some(stat);
    }
}
