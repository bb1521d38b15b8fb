use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use log::{info, warn};
use regex::Regex;
use std::path::{Path, PathBuf};
use verstan_config::Config;
use verstan_engine::morphology::normalize::{AuthorRule, NormalizerSet, ProfileSelector};
use verstan_engine::{Analysis, CommandTool, Pipeline, io, query};

#[derive(Parser)]
#[command(
    name = "verstan",
    version,
    about = "Segmentation, scansion and morphological annotation of premodern verse"
)]
struct Cli {
    /// Config file to use instead of ~/.config/verstan/config.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Write the default configuration to the config path
    Init {
        /// Replace an existing config file
        #[arg(long)]
        force: bool,
    },
    /// Segment a directory of plain-text poems into JSON
    Import {
        /// Directory of plain-text transcriptions
        source: PathBuf,
        /// Directory to write the JSON corpus to
        output: PathBuf,
    },
    /// Run analyses over a JSON corpus
    Analyze {
        /// Directory of JSON poems
        corpus: PathBuf,
        /// Where to store the analyzed corpus (defaults to the input directory)
        #[arg(long)]
        output: Option<PathBuf>,
        /// Analyses to run, comma separated
        #[arg(
            long,
            value_delimiter = ',',
            default_values_t = vec![Analysis::Morphology, Analysis::Syllables, Analysis::Length, Analysis::WordStat]
        )]
        analyses: Vec<Analysis>,
    },
    /// Count regex matches in the line texts of a JSON corpus
    Search {
        corpus: PathBuf,
        pattern: String,
    },
    /// Print the plain text of a JSON corpus
    Extract { corpus: PathBuf },
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    let config = match path {
        Some(path) => Config::load_from_path(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => Config::load().context("Failed to load config")?,
    };
    Ok(config.unwrap_or_else(|| {
        info!("No config file found, using defaults");
        Config::default()
    }))
}

fn command_tool(command: &verstan_config::ToolCommand) -> CommandTool {
    CommandTool::new(command.program.clone(), command.args.clone())
}

fn normalizers(config: &Config) -> Result<NormalizerSet> {
    let normalization = &config.normalization;
    let missing = config
        .missing_profiles()
        .context("Failed to list normalization profiles")?;
    if !missing.is_empty() {
        bail!(
            "No dictionary for normalization profiles {} in {}",
            missing.join(", "),
            normalization.dir.display()
        );
    }

    let selector = ProfileSelector {
        default_profile: normalization.default_profile.clone(),
        author_rules: normalization
            .author_profiles
            .iter()
            .map(|rule| AuthorRule {
                author_contains: rule.author_contains.clone(),
                profile: rule.profile.clone(),
            })
            .collect(),
    };

    NormalizerSet::load(&normalization.dir, selector, &normalization.identity_profiles).with_context(|| {
        format!(
            "Failed to load normalization profiles from {}",
            normalization.dir.display()
        )
    })
}

fn run_init(path: Option<&Path>, force: bool) -> Result<()> {
    let target = path.map_or_else(Config::config_path, Path::to_path_buf);
    if target.exists() && !force {
        bail!("{} already exists, use --force to replace it", target.display());
    }

    let config = Config::default();
    match path {
        Some(path) => config.save_to_path(path),
        None => config.save(),
    }
    .with_context(|| format!("Failed to write config to {}", target.display()))?;
    info!("Wrote default config to {}", target.display());
    Ok(())
}

fn run_import(source: &Path, output: &Path) -> Result<()> {
    let corpus = io::import_corpus(source)
        .with_context(|| format!("Failed to import {}", source.display()))?;
    io::store_corpus(output, &corpus)
        .with_context(|| format!("Failed to store corpus in {}", output.display()))?;
    Ok(())
}

fn run_analyze(config: &Config, corpus_dir: &Path, output: Option<&Path>, analyses: Vec<Analysis>) -> Result<()> {
    let mut corpus = io::load_corpus(corpus_dir)
        .with_context(|| format!("Failed to load corpus from {}", corpus_dir.display()))?;

    let normalizers = if analyses.contains(&Analysis::Morphology) {
        normalizers(config)?
    } else {
        NormalizerSet::identity()
    };

    let pipeline = Pipeline::new(
        analyses,
        Box::new(command_tool(&config.tools.analyzer)),
        Box::new(command_tool(&config.tools.tagger)),
        Box::new(command_tool(&config.tools.transcriber)),
        normalizers,
    );
    let requested: Vec<String> = pipeline.analyses().map(|a| a.to_string()).collect();
    info!("Running {}", requested.join(", "));

    let report = pipeline.analyze_corpus(&mut corpus);

    for failure in &report.failures {
        warn!(
            "{} was left unanalyzed: {}",
            failure.poem_id.as_deref().unwrap_or("unnamed poem"),
            failure.error
        );
    }
    for (surface, failure) in &report.context.normalization_failures {
        info!(
            "Normalization suspect: {surface} -> {} ({}x)",
            failure.normalized, failure.count
        );
    }

    io::write_error_file(&config.output.error_file, &report.context.errors).with_context(|| {
        format!(
            "Failed to write error file {}",
            config.output.error_file.display()
        )
    })?;

    let target = output.unwrap_or(corpus_dir);
    io::store_corpus(target, &corpus)
        .with_context(|| format!("Failed to store corpus in {}", target.display()))?;
    Ok(())
}

fn run_search(corpus_dir: &Path, pattern: &str) -> Result<()> {
    let pattern = Regex::new(pattern).with_context(|| format!("Invalid pattern {pattern:?}"))?;
    let corpus = io::load_corpus(corpus_dir)
        .with_context(|| format!("Failed to load corpus from {}", corpus_dir.display()))?;

    let hits = query::search_lines(&pattern, &corpus);
    for (poem_id, poem_hits) in &hits.poems {
        println!("{poem_id}: {}", poem_hits.hits);
        for line in &poem_hits.lines {
            println!("{line}");
        }
    }
    println!("----------\nTotal hits: {}", hits.hits);
    Ok(())
}

fn run_extract(corpus_dir: &Path) -> Result<()> {
    let corpus = io::load_corpus(corpus_dir)
        .with_context(|| format!("Failed to load corpus from {}", corpus_dir.display()))?;
    for text in query::extract_text(&corpus) {
        print!("{text}");
    }
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Init { force } => run_init(cli.config.as_deref(), force),
        Command::Import { source, output } => run_import(&source, &output),
        Command::Analyze {
            corpus,
            output,
            analyses,
        } => {
            let config = load_config(cli.config.as_deref())?;
            run_analyze(&config, &corpus, output.as_deref(), analyses)
        }
        Command::Search { corpus, pattern } => run_search(&corpus, &pattern),
        Command::Extract { corpus } => run_extract(&corpus),
    }
}
