use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {config_path}: {source}")]
    ConfigReadError {
        config_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {config_path}: {source}")]
    ConfigParseError {
        config_path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid profile pattern {pattern}: {source}")]
    ProfilePatternError {
        pattern: String,
        source: glob::PatternError,
    },
}

/// An external command: program and leading arguments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCommand {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
}

impl ToolCommand {
    fn new(program: &str, args: &[&str]) -> Self {
        Self {
            program: program.to_string(),
            args: args.iter().map(|arg| arg.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    pub analyzer: ToolCommand,
    pub tagger: ToolCommand,
    pub transcriber: ToolCommand,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            analyzer: ToolCommand::new(
                "hfst-lookup",
                &[
                    "--pipe-mode=input",
                    "--cascade=composition",
                    "emMorphOMH_distrib/hfst/OMH.hfstol",
                ],
            ),
            tagger: ToolCommand::new(
                "java",
                &[
                    "-jar",
                    "purepos/purepos-2.1.one-jar.jar",
                    "tag",
                    "-a",
                    "none",
                    "-m",
                    "purepos/omh.model",
                ],
            ),
            transcriber: ToolCommand::new("espeak", &["-q", "--ipa", "-v", "hu-hu"]),
        }
    }
}

/// Routes poems whose author contains `author_contains` to `profile`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorProfile {
    pub author_contains: String,
    pub profile: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizationConfig {
    /// Directory holding `<profile>_dict.csv`, `<profile>_char_subs.csv`
    /// and `proper_names.csv`.
    pub dir: PathBuf,
    pub default_profile: String,
    /// Profiles that leave spelling untouched and load no files.
    pub identity_profiles: Vec<String>,
    pub author_profiles: Vec<AuthorProfile>,
}

impl Default for NormalizationConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("elonorm"),
            default_profile: "historias".to_string(),
            identity_profiles: vec!["tinodi".to_string()],
            author_profiles: vec![AuthorProfile {
                author_contains: "Tinódi".to_string(),
                profile: "tinodi".to_string(),
            }],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub error_file: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            error_file: PathBuf::from("errors.csv"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub tools: ToolsConfig,
    pub normalization: NormalizationConfig,
    pub output: OutputConfig,
}

impl Config {
    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Option<Self>, ConfigError> {
        let config_path = config_path.as_ref();
        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(config_path).map_err(|source| {
            ConfigError::ConfigReadError {
                config_path: config_path.to_path_buf(),
                source,
            }
        })?;

        let mut config: Config =
            toml::from_str(&content).map_err(|source| ConfigError::ConfigParseError {
                config_path: config_path.to_path_buf(),
                source,
            })?;

        config.expand_paths();

        Ok(Some(config))
    }

    pub fn load() -> Result<Option<Self>, ConfigError> {
        let config_path = Self::config_path();
        Self::load_from_path(&config_path)
    }

    pub fn save_to_path<P: AsRef<Path>>(&self, config_path: P) -> anyhow::Result<()> {
        let config_path = config_path.as_ref();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = Self::config_path();
        self.save_to_path(&config_path)
    }

    pub fn config_path() -> PathBuf {
        let config_dir = shellexpand::tilde("~/.config/verstan");
        PathBuf::from(config_dir.as_ref()).join("config.toml")
    }

    /// Normalization profiles that have a dictionary in the normalization
    /// directory, sorted by name.
    pub fn available_profiles(&self) -> Result<Vec<String>, ConfigError> {
        let pattern = self
            .normalization
            .dir
            .join("*_dict.csv")
            .to_string_lossy()
            .into_owned();
        let entries = glob::glob(&pattern).map_err(|source| ConfigError::ProfilePatternError {
            pattern: pattern.clone(),
            source,
        })?;

        let mut profiles: Vec<String> = entries
            .filter_map(Result::ok)
            .filter_map(|path| {
                path.file_name()
                    .and_then(|name| name.to_str())
                    .and_then(|name| name.strip_suffix("_dict.csv"))
                    .map(str::to_string)
            })
            .collect();
        profiles.sort();
        Ok(profiles)
    }

    /// Configured profiles, other than identity profiles, that have no
    /// dictionary in the normalization directory.
    pub fn missing_profiles(&self) -> Result<Vec<String>, ConfigError> {
        let available = self.available_profiles()?;
        let normalization = &self.normalization;

        let mut missing: Vec<String> = std::iter::once(&normalization.default_profile)
            .chain(normalization.author_profiles.iter().map(|rule| &rule.profile))
            .filter(|profile| !normalization.identity_profiles.contains(*profile))
            .filter(|profile| !available.contains(*profile))
            .cloned()
            .collect();
        missing.sort();
        missing.dedup();
        Ok(missing)
    }

    fn expand_paths(&mut self) {
        // Expand shell variables and tilde in the loaded paths
        if let Some(dir) = Self::expand_path(&self.normalization.dir) {
            self.normalization.dir = dir;
        }
        if let Some(error_file) = Self::expand_path(&self.output.error_file) {
            self.output.error_file = error_file;
        }
    }

    fn expand_path(path: &Path) -> Option<PathBuf> {
        let path_str = path.to_string_lossy();
        match shellexpand::full(&path_str) {
            Ok(expanded) => Some(PathBuf::from(expanded.as_ref())),
            Err(_) => None,
        }
    }
}
