use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use cgpa_features::engine::{self, Engine, RawForm};
use cgpa_features::grading::{self, GradeEntry, Level};
use cgpa_features::output;

const EXIT_SUCCESS: i32 = 0;
const EXIT_INPUT: i32 = 1;
const EXIT_FRAMEWORK: i32 = 3;
const EXIT_CONFIG: i32 = 4;

#[derive(ValueEnum, Clone, Copy, Debug)]
enum LevelArg {
    Olevel,
    Alevel,
}

impl From<LevelArg> for Level {
    fn from(arg: LevelArg) -> Self {
        match arg {
            LevelArg::Olevel => Level::OLevel,
            LevelArg::Alevel => Level::ALevel,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List grading frameworks, oldest scheme first
    Frameworks {
        /// Only list frameworks for this level
        #[arg(short, long, value_enum)]
        level: Option<LevelArg>,
    },
    /// Aggregate one level's grades under a framework
    Aggregate {
        /// Framework id, e.g. ALEVEL_CLASSIC_18 or classic-18
        #[arg(short, long)]
        framework: String,

        /// Read tokens as GRADE=COUNT histogram buckets
        #[arg(long)]
        histogram: bool,

        /// Print JSON instead of a summary
        #[arg(long)]
        json: bool,

        /// Grade tokens, e.g. `A B C` or `1=2 3=4 7=2` with --histogram
        #[arg(required = true)]
        grades: Vec<String>,
    },
    /// Recompute features for a raw form record (YAML, or JSON by extension)
    Check {
        /// Path to the record file
        file: PathBuf,

        /// Print the full engine output as JSON
        #[arg(long, conflicts_with = "tsv")]
        json: bool,

        /// Print payload fields as tab-separated key/value pairs
        #[arg(long)]
        tsv: bool,
    },
}

#[derive(Parser, Debug)]
#[command(name = "cgpa-features")]
#[command(about = "Academic record feature extraction for CGPA prediction", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to config file (defaults to ~/.config/cgpa-features/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn parse_grades(tokens: &[String], histogram: bool) -> Result<GradeEntry> {
    if !histogram {
        return Ok(GradeEntry::sequence(tokens.iter().map(String::as_str)));
    }

    let mut buckets = Vec::with_capacity(tokens.len());
    for token in tokens {
        let Some((grade, count)) = token.split_once('=') else {
            bail!("histogram bucket '{}' must look like GRADE=COUNT", token);
        };
        let count: u32 = count
            .trim()
            .parse()
            .with_context(|| format!("invalid count in histogram bucket '{}'", token))?;
        buckets.push((grade.trim(), count));
    }
    Ok(GradeEntry::histogram(buckets))
}

fn load_raw_form(path: &Path) -> Result<RawForm> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read record file at {}", path.display()))?;

    if path.extension().is_some_and(|ext| ext == "json") {
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse record: invalid JSON in {}", path.display()))
    } else {
        serde_saphyr::from_str(&content)
            .with_context(|| format!("Failed to parse record: invalid YAML in {}", path.display()))
    }
}

fn print_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Failed to serialize output: {}", e);
            std::process::exit(EXIT_INPUT);
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    // Load config
    let config_path = cli.config.map(PathBuf::from);
    let config = match cgpa_features::config::load_config(config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };

    // Validate config at startup
    if let Err(errors) = cgpa_features::config::validate_config(&config) {
        eprintln!("Config errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        std::process::exit(EXIT_CONFIG);
    }
    debug!(?config, "loaded config");

    let use_colors = output::should_use_colors();

    match cli.command {
        Commands::Frameworks { level } => {
            let levels = match level {
                Some(l) => vec![Level::from(l)],
                None => vec![Level::OLevel, Level::ALevel],
            };
            let single = levels.len() == 1;
            let sections: Vec<String> = levels
                .into_iter()
                .map(|level| {
                    let list = output::format_frameworks(&engine::list_frameworks(level), use_colors);
                    if single {
                        list
                    } else {
                        format!("{}\n{}", level, list)
                    }
                })
                .collect();
            println!("{}", sections.join("\n\n"));
        }
        Commands::Aggregate {
            framework,
            histogram,
            json,
            grades,
        } => {
            let entry = match parse_grades(&grades, histogram) {
                Ok(e) => e,
                Err(e) => {
                    eprintln!("Invalid grades: {:#}", e);
                    std::process::exit(EXIT_INPUT);
                }
            };

            let fw = match engine::resolve_framework(&framework) {
                Ok(fw) => fw,
                Err(e) => {
                    eprintln!("{}", e);
                    std::process::exit(EXIT_FRAMEWORK);
                }
            };
            debug!(framework = %fw.id, subjects = entry.count(), "aggregating");

            match grading::aggregate(&entry, fw) {
                Ok(features) if json => print_json(&features),
                Ok(features) => {
                    println!("{}", output::format_features(fw.level, &features, use_colors))
                }
                Err(e) => {
                    eprintln!("{}", e);
                    std::process::exit(EXIT_INPUT);
                }
            }
        }
        Commands::Check { file, json, tsv } => {
            let raw = match load_raw_form(&file) {
                Ok(r) => r,
                Err(e) => {
                    eprintln!("{:#}", e);
                    std::process::exit(EXIT_INPUT);
                }
            };

            let engine = match Engine::from_config(&config) {
                Ok(engine) => engine,
                Err(e) => {
                    eprintln!("Config error: {}", e);
                    std::process::exit(EXIT_CONFIG);
                }
            };

            let result = match engine.recompute(&raw) {
                Ok(r) => r,
                Err(e) => {
                    eprintln!("{}", e);
                    std::process::exit(EXIT_FRAMEWORK);
                }
            };

            if json {
                print_json(&result);
            } else if tsv {
                println!("{}", output::format_tsv(&result.features));
            } else {
                let blocks: Vec<String> = [
                    (Level::OLevel, result.olevel.as_ref()),
                    (Level::ALevel, result.alevel.as_ref()),
                ]
                .into_iter()
                .filter_map(|(level, features)| {
                    features.map(|f| output::format_features(level, f, use_colors))
                })
                .collect();
                if !blocks.is_empty() {
                    println!("{}", blocks.join("\n\n"));
                }
                if !result.errors.is_empty() {
                    println!("{}", output::format_issues(&result.errors, use_colors));
                }
            }

            if result.has_blocking_errors() {
                std::process::exit(EXIT_INPUT);
            }
        }
    }

    std::process::exit(EXIT_SUCCESS);
}
