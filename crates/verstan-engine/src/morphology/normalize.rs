//! Pre-normalization of historical spelling before morphological analysis.
//!
//! A profile is a memory dictionary of known forms plus an ordered list of
//! character rewrite rules. Proper names are never rewritten.

use log::{debug, info};
use regex::Regex;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

static BACKREFERENCE: OnceLock<Regex> = OnceLock::new();

pub const PROPER_NAMES_FILE: &str = "proper_names.csv";

#[derive(Debug, thiserror::Error)]
pub enum NormalizationError {
    #[error("Failed to read normalization file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid rewrite rule on line {line} of {path}: {source}")]
    Rule {
        path: PathBuf,
        line: usize,
        source: regex::Error,
    },
    #[error("Malformed entry on line {line} of {path}")]
    Malformed { path: PathBuf, line: usize },
}

/// A character-level rewrite rule applied to lower-cased words.
#[derive(Debug, Clone)]
pub struct CharRule {
    pub pattern: Regex,
    pub replacement: String,
}

impl CharRule {
    pub fn new(pattern: &str, replacement: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: Regex::new(pattern)?,
            replacement: convert_backreferences(replacement),
        })
    }
}

/// Rewrites `\1` style group references to the `${1}` syntax of `regex`.
fn convert_backreferences(replacement: &str) -> String {
    let backreference = BACKREFERENCE
        .get_or_init(|| Regex::new(r"\\(\d+)").expect("Invalid backreference regex"));
    backreference
        .replace_all(&replacement.replace('$', "$$"), "$${${1}}")
        .into_owned()
}

/// Result of normalizing one surface form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedForm {
    pub text: String,
    pub proper_name: bool,
    pub changed: bool,
}

impl NormalizedForm {
    /// Whether the form belongs in `word_text_normalized`.
    pub fn is_recorded(&self) -> bool {
        self.changed || self.proper_name
    }
}

#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    memory: HashMap<String, String>,
    rules: Vec<CharRule>,
    proper_names: Vec<String>,
}

impl Normalizer {
    pub fn new(memory: HashMap<String, String>, rules: Vec<CharRule>, proper_names: Vec<String>) -> Self {
        Self {
            memory,
            rules,
            proper_names: proper_names.into_iter().filter(|name| !name.is_empty()).collect(),
        }
    }

    /// A normalizer that changes nothing but still knows proper names.
    pub fn identity(proper_names: Vec<String>) -> Self {
        Self::new(HashMap::new(), Vec::new(), proper_names)
    }

    pub fn is_proper_name(&self, surface: &str) -> bool {
        self.proper_names.iter().any(|name| surface.starts_with(name.as_str()))
    }

    pub fn normalize(&self, surface: &str) -> NormalizedForm {
        if self.is_proper_name(surface) {
            debug!("Proper name: {surface}");
            return NormalizedForm {
                text: surface.to_string(),
                proper_name: true,
                changed: false,
            };
        }

        let text = match self.memory.get(surface) {
            Some(known) => known.clone(),
            None => self.apply_rules(surface),
        };

        NormalizedForm {
            changed: text != surface,
            text,
            proper_name: false,
        }
    }

    fn apply_rules(&self, surface: &str) -> String {
        let mut text = surface.to_lowercase();
        for rule in &self.rules {
            text = rule
                .pattern
                .replace_all(&text, rule.replacement.as_str())
                .into_owned();
        }

        if surface.chars().next().is_some_and(char::is_uppercase) {
            capitalize(&text)
        } else {
            text
        }
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Splits a two-column line on its first tab, or on its first comma when
/// there is no tab.
fn split_pair(line: &str) -> Option<(&str, &str)> {
    line.split_once('\t').or_else(|| line.split_once(','))
}

fn read_lines(path: &Path) -> Result<Vec<String>, NormalizationError> {
    let content = fs::read_to_string(path).map_err(|source| NormalizationError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(content
        .lines()
        .map(|line| line.trim_end_matches('\r').to_string())
        .collect())
}

fn profile_file(dir: &Path, profile: &str, suffix: &str) -> PathBuf {
    dir.join(format!("{profile}_{suffix}.csv"))
}

pub fn load_memory(path: &Path) -> Result<HashMap<String, String>, NormalizationError> {
    let mut memory = HashMap::new();
    for (index, line) in read_lines(path)?.iter().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let (surface, normalized) = split_pair(line).ok_or_else(|| NormalizationError::Malformed {
            path: path.to_path_buf(),
            line: index + 1,
        })?;
        memory.insert(surface.to_string(), normalized.trim().to_string());
    }
    Ok(memory)
}

pub fn load_rules(path: &Path) -> Result<Vec<CharRule>, NormalizationError> {
    let mut rules = Vec::new();
    for (index, line) in read_lines(path)?.iter().enumerate() {
        if line.is_empty() {
            continue;
        }
        let (pattern, replacement) = split_pair(line).ok_or_else(|| NormalizationError::Malformed {
            path: path.to_path_buf(),
            line: index + 1,
        })?;
        let rule = CharRule::new(pattern, replacement).map_err(|source| NormalizationError::Rule {
            path: path.to_path_buf(),
            line: index + 1,
            source,
        })?;
        rules.push(rule);
    }
    Ok(rules)
}

pub fn load_proper_names(path: &Path) -> Result<Vec<String>, NormalizationError> {
    Ok(read_lines(path)?
        .into_iter()
        .map(|line| line.trim().to_string())
        .filter(|line| !line.is_empty())
        .collect())
}

/// Load the dictionary and rules of a named profile from `dir`.
pub fn load_profile(dir: &Path, profile: &str, proper_names: Vec<String>) -> Result<Normalizer, NormalizationError> {
    let memory = load_memory(&profile_file(dir, profile, "dict"))?;
    let rules = load_rules(&profile_file(dir, profile, "char_subs"))?;
    info!(
        "Loaded normalization profile {profile}: {} known forms, {} rules",
        memory.len(),
        rules.len()
    );
    Ok(Normalizer::new(memory, rules, proper_names))
}

/// Maps an author to a profile by substring match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorRule {
    pub author_contains: String,
    pub profile: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileSelector {
    pub default_profile: String,
    pub author_rules: Vec<AuthorRule>,
}

impl ProfileSelector {
    pub fn profile_for(&self, author: Option<&str>) -> &str {
        author
            .and_then(|author| {
                self.author_rules
                    .iter()
                    .find(|rule| author.contains(rule.author_contains.as_str()))
            })
            .map_or(self.default_profile.as_str(), |rule| rule.profile.as_str())
    }
}

/// All normalizers a run may need, resolved by poem author.
#[derive(Debug, Clone)]
pub struct NormalizerSet {
    selector: Option<ProfileSelector>,
    profiles: BTreeMap<String, Normalizer>,
    fallback: Normalizer,
}

impl NormalizerSet {
    /// Every author gets the identity normalizer.
    pub fn identity() -> Self {
        Self {
            selector: None,
            profiles: BTreeMap::new(),
            fallback: Normalizer::default(),
        }
    }

    /// Load every profile the selector can produce. Profiles listed in
    /// `identity_profiles` load no files.
    pub fn load(dir: &Path, selector: ProfileSelector, identity_profiles: &[String]) -> Result<Self, NormalizationError> {
        let proper_names = load_proper_names(&dir.join(PROPER_NAMES_FILE))?;

        let mut wanted: Vec<&str> = vec![selector.default_profile.as_str()];
        wanted.extend(selector.author_rules.iter().map(|rule| rule.profile.as_str()));

        let mut profiles = BTreeMap::new();
        for profile in wanted {
            if profiles.contains_key(profile) {
                continue;
            }
            let normalizer = if identity_profiles.iter().any(|p| p == profile) {
                Normalizer::identity(proper_names.clone())
            } else {
                load_profile(dir, profile, proper_names.clone())?
            };
            profiles.insert(profile.to_string(), normalizer);
        }

        Ok(Self {
            selector: Some(selector),
            profiles,
            fallback: Normalizer::identity(proper_names),
        })
    }

    pub fn for_author(&self, author: Option<&str>) -> &Normalizer {
        self.selector
            .as_ref()
            .and_then(|selector| self.profiles.get(selector.profile_for(author)))
            .unwrap_or(&self.fallback)
    }
}
