//! Enrichment of poems with fields from an external catalogue.

use log::{debug, warn};
use serde_json::Value;

use crate::model::Poem;

/// A catalogue that can look up fields of a poem by id.
pub trait MetadataSource {
    fn fetch(&self, poem_id: &str, field: &str) -> anyhow::Result<Option<Value>>;
}

/// Store every field the source knows as `poem_<field>` metadata. Returns
/// the number of values stored; poems without an id are skipped.
pub fn enrich(corpus: &mut [Poem], fields: &[&str], source: &dyn MetadataSource) -> anyhow::Result<usize> {
    let mut stored = 0;
    for poem in corpus.iter_mut() {
        let Some(id) = poem.poem_id.clone() else {
            warn!("Skipping metadata for a poem without id");
            continue;
        };
        for field in fields {
            if let Some(value) = source.fetch(&id, field)? {
                debug!("{id}: {field} = {value}");
                poem.metadata.insert(format!("poem_{field}"), value);
                stored += 1;
            }
        }
    }
    Ok(stored)
}
