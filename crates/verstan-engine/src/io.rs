//! Corpus storage: raw text import, JSON load/store and the error file.

use log::{debug, info};
use std::fs;
use std::path::{Path, PathBuf};

use crate::context::ErrorRecord;
use crate::model::{Poem, PoemMeta};
use crate::segment::segment_poem;

/// File stem used for poems without an id.
pub const UNKNOWN_POEM_ID: &str = "UNKNOWN";

#[derive(Debug, thiserror::Error)]
pub enum IoError {
    #[error("Corpus directory not found: {0}")]
    NotFound(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid poem JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Regular files of a directory, sorted by name.
fn corpus_files(dir: &Path) -> Result<Vec<PathBuf>, IoError> {
    if !dir.is_dir() {
        return Err(IoError::NotFound(dir.to_path_buf()));
    }

    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Name of an imported poem: the file name without a `.txt` extension.
fn poem_name(path: &Path) -> Option<String> {
    let name = if path.extension().is_some_and(|ext| ext == "txt") {
        path.file_stem()
    } else {
        path.file_name()
    };
    name.map(|name| name.to_string_lossy().into_owned())
}

/// Segment every file of a directory. The poem name becomes both the poem
/// id and its title.
pub fn import_corpus(dir: &Path) -> Result<Vec<Poem>, IoError> {
    let mut corpus = Vec::new();
    for path in corpus_files(dir)? {
        let text = fs::read_to_string(&path)?;
        let stem = poem_name(&path);
        debug!("Importing {}", path.display());
        corpus.push(segment_poem(
            &text,
            PoemMeta {
                id: stem.clone(),
                author: None,
                title: stem,
            },
        ));
    }
    info!("Imported {} poems from {}", corpus.len(), dir.display());
    Ok(corpus)
}

pub fn load_corpus(dir: &Path) -> Result<Vec<Poem>, IoError> {
    let mut corpus = Vec::new();
    for path in corpus_files(dir)? {
        let content = fs::read_to_string(&path)?;
        let poem = serde_json::from_str(&content).map_err(|source| IoError::Json {
            path: path.clone(),
            source,
        })?;
        corpus.push(poem);
    }
    info!("Loaded {} poems from {}", corpus.len(), dir.display());
    Ok(corpus)
}

pub fn poem_file_name(poem: &Poem) -> String {
    let id = poem
        .poem_id
        .as_deref()
        .filter(|id| !id.is_empty())
        .unwrap_or(UNKNOWN_POEM_ID);
    format!("{id}.json")
}

/// Write every poem to `<dir>/<poem_id>.json`, creating `dir` if needed.
pub fn store_corpus(dir: &Path, corpus: &[Poem]) -> Result<(), IoError> {
    fs::create_dir_all(dir)?;
    for poem in corpus {
        let path = dir.join(poem_file_name(poem));
        let json = serde_json::to_string_pretty(poem).map_err(|source| IoError::Json {
            path: path.clone(),
            source,
        })?;
        fs::write(&path, json)?;
    }
    info!("Stored {} poems in {}", corpus.len(), dir.display());
    Ok(())
}

/// Overwrite `path` with one record per line.
pub fn write_error_file<'a>(
    path: &Path,
    records: impl IntoIterator<Item = &'a ErrorRecord>,
) -> Result<(), IoError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }

    let mut content = String::new();
    for record in records {
        content.push_str(&record.to_string());
        content.push('\n');
    }
    fs::write(path, content)?;
    Ok(())
}
