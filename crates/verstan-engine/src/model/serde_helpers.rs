//! Serde helpers for the interchange format.

/// (De)serializes position statistics keyed by line syllable count.
///
/// JSON object keys are strings, and once a map has been buffered through a
/// flattened struct serde can no longer coerce them back into integers, so
/// the keys are parsed here explicitly.
pub mod syllable_keyed {
    use serde::de::Error as _;
    use serde::ser::SerializeMap;
    use serde::{Deserialize, Deserializer, Serializer};
    use std::collections::BTreeMap;

    use crate::model::PositionStatistics;

    pub fn serialize<S>(value: &Option<PositionStatistics>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(map) => {
                let mut out = serializer.serialize_map(Some(map.len()))?;
                for (syllables, counts) in map {
                    out.serialize_entry(&syllables.to_string(), counts)?;
                }
                out.end()
            }
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<PositionStatistics>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<BTreeMap<String, Vec<u32>>> = Option::deserialize(deserializer)?;
        let Some(raw) = raw else {
            return Ok(None);
        };

        let mut parsed = PositionStatistics::new();
        for (key, counts) in raw {
            let syllables = key
                .parse::<usize>()
                .map_err(|_| D::Error::custom(format!("invalid syllable count key: {key}")))?;
            parsed.insert(syllables, counts);
        }
        Ok(Some(parsed))
    }
}
