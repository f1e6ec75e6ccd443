//! Subvocab - vocabulary tracking from a video library
//!
//! Entry point: parses the command line, loads configuration, sets up
//! logging and dispatches to the workflow.

use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use std::path::{Path, PathBuf};
use tracing::{info, warn, Level};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use subvocab::cli::{Args, Commands};
use subvocab::config::Config;
use subvocab::error::SubvocabError;
use subvocab::media::MediaProcessorFactory;
use subvocab::vocab::VocabularyStore;
use subvocab::workflow::{RunOptions, RunReport, Workflow};

const DEFAULT_CONFIG_FILE: &str = "subvocab.toml";

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let (mut config, config_source) = load_config(args.config.as_deref())?;
    apply_overrides(&mut config, &args.command);

    let _log_guard = setup_logging(args.verbose, log_dir(&args.command, &config))?;
    match config_source {
        Some(path) => info!("Loaded configuration from {}", path.display()),
        None => info!("Using default configuration"),
    }

    match args.command {
        Commands::Scan { dry_run, json, .. } => {
            let workflow = Workflow::new(config)?;
            let options = RunOptions {
                dry_run,
                show_progress: !json,
            };

            if !json {
                println!("Creating file list...");
            }
            let report = workflow.run(&options).await?;

            if json {
                println!("{}", report.to_json()?);
            } else {
                print_report(&report);
            }
        }
        Commands::Words { input } => {
            info!("Extracting words from: {}", input.display());
            let workflow = Workflow::new(config)?;
            for word in workflow.words_in_file(&input).await? {
                println!("{}", word);
            }
        }
        Commands::Status { .. } => {
            let store = VocabularyStore::new(&config.vocabulary);
            let seen = store.load_seen().await?;
            let known = store.peek_known().await?;
            let new_words = store.load_new().await?;

            println!("\nWord Databases:");
            println!("{:<20} {:>8}  {}", "Seen files", seen.len(), store.seen_path().display());
            println!("{:<20} {:>8}  {}", "Known words", known.len(), store.known_path().display());
            println!("{:<20} {:>8}  {}", "New words", new_words.len(), store.new_words_path().display());
            println!("{}", "-".repeat(60));
            println!("Library: {}", config.library.videos_path.display());

            let media = MediaProcessorFactory::create_processor(config.media.clone());
            match media.get_version_info().await {
                Ok(version) => println!("Media processor: {}", version),
                Err(e) => println!("Media processor: {}", format!("not available ({})", e).yellow()),
            }
        }
        Commands::Learn { words, all, .. } => {
            let store = VocabularyStore::new(&config.vocabulary);
            let requested = if all {
                store.load_new().await?.sorted()
            } else {
                words
            };

            let moved = store.learn(&requested).await?;
            for word in &requested {
                let word = word.trim().to_lowercase();
                if !moved.contains(&word) {
                    warn!("'{}' is not in the new words list", word);
                }
            }

            println!(
                "Moved {} word(s) to {}",
                moved.len().to_string().green(),
                file_name(store.known_path())
            );
        }
        Commands::Init { output, force } => {
            if output.exists() && !force {
                return Err(SubvocabError::Config(format!(
                    "{} already exists, use --force to overwrite",
                    output.display()
                ))
                .into());
            }

            Config::default().save_to_file(&output)?;
            println!("Wrote default configuration to {}", output.display());
        }
    }

    Ok(())
}

/// Explicit path, then ./subvocab.toml, then built-in defaults
fn load_config(path: Option<&Path>) -> Result<(Config, Option<PathBuf>)> {
    match path {
        Some(path) => Ok((Config::from_file(path)?, Some(path.to_path_buf()))),
        None => {
            let local = PathBuf::from(DEFAULT_CONFIG_FILE);
            if local.exists() {
                Ok((Config::from_file(&local)?, Some(local)))
            } else {
                Ok((Config::default(), None))
            }
        }
    }
}

fn apply_overrides(config: &mut Config, command: &Commands) {
    let (videos, work_dir) = match command {
        Commands::Scan { videos, work_dir, .. } => (videos.clone(), work_dir.clone()),
        Commands::Status { work_dir } | Commands::Learn { work_dir, .. } => (None, work_dir.clone()),
        _ => (None, None),
    };

    if let Some(videos) = videos {
        config.library.videos_path = videos;
    }
    if let Some(work_dir) = work_dir {
        config.vocabulary.work_path = work_dir;
    }
}

/// Only commands that write the databases keep a log file next to them
fn log_dir(command: &Commands, config: &Config) -> Option<PathBuf> {
    match command {
        Commands::Scan { .. } | Commands::Learn { .. } => {
            Some(config.vocabulary.work_path.join("log"))
        }
        Commands::Words { .. } | Commands::Status { .. } | Commands::Init { .. } => None,
    }
}

/// Console logging on stderr plus, when given a folder, a daily rolling file
fn setup_logging(verbose: bool, log_dir: Option<PathBuf>) -> Result<Option<WorkerGuard>> {
    let (file_writer, guard) = match &log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;
            let (writer, guard) = non_blocking(rolling::daily(dir, "subvocab.log"));
            (Some(writer), Some(guard))
        }
        None => (None, None),
    };

    let log_level = if verbose { Level::DEBUG } else { Level::INFO };
    let console_level = if verbose { LevelFilter::DEBUG } else { LevelFilter::WARN };

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(console_level);

    let file_layer = file_writer.map(|writer| {
        fmt::layer()
            .with_writer(writer)
            .with_target(false)
            .with_file(true)
            .with_line_number(true)
            .with_ansi(false)
    });

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    match &log_dir {
        Some(dir) => info!("Logging initialized - level: {}, file: {}",
                           log_level, dir.join("subvocab.log").display()),
        None => info!("Logging initialized - level: {}", log_level),
    }

    Ok(guard)
}

fn print_report(report: &RunReport) {
    let green = |n: usize| n.to_string().green();

    println!("Files found: {}", green(report.files_found));
    if report.videos_processed > 0 || report.videos_deferred > 0 {
        println!("Videos processed: {} ({} without subtitles)",
                 green(report.videos_processed), report.videos_failed);
    }
    if report.videos_deferred > 0 {
        println!("{}", format!("Videos postponed, ffmpeg not available: {}", report.videos_deferred).yellow());
    }
    println!("Subtitles processed: {}", green(report.subtitles_processed));
    if report.subtitles_failed > 0 {
        println!("{}", format!("Unreadable subtitle files: {}", report.subtitles_failed).red());
    }
    println!("Words read: {}", green(report.words_read));

    if report.known_words_created {
        println!("{}", "Known words DB is empty, created it".yellow());
    } else {
        println!("Known words DB: {}", green(report.known_words));
    }

    println!("Unknown words in new files: {}", green(report.unknown_in_new_files));
    if report.unknown_in_db == 0 {
        println!("{}", "Unknown words DB is empty".yellow());
    } else {
        println!("Unknown words in DB: {}", green(report.unknown_in_db));
    }
    println!("Total unknown words: {}", green(report.total_unknown));

    println!("Skipped {} file(s)", report.files_skipped);
    if report.excluded_by_language > 0 {
        println!("Excluded {} video(s) by file name language", report.excluded_by_language);
    }

    if report.dry_run {
        println!("{}", "Dry run: databases were not updated".yellow());
    } else {
        println!(
            "Now review {} and move words you know to {} (or run `subvocab learn <word>...`)",
            file_name(&report.new_words_file).green(),
            file_name(&report.known_words_file).green()
        );
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_file_only_for_commands_that_write_databases() {
        let mut config = Config::default();
        config.vocabulary.work_path = PathBuf::from("/data/vocab");

        let parse = |argv: &[&str]| Args::try_parse_from(argv.iter().copied()).unwrap().command;

        assert_eq!(
            log_dir(&parse(&["subvocab", "scan"]), &config),
            Some(PathBuf::from("/data/vocab/log"))
        );
        assert!(log_dir(&parse(&["subvocab", "learn", "--all"]), &config).is_some());
        assert_eq!(log_dir(&parse(&["subvocab", "status", "-w", "/fresh"]), &config), None);
        assert_eq!(log_dir(&parse(&["subvocab", "words", "-i", "ep.srt"]), &config), None);
        assert_eq!(log_dir(&parse(&["subvocab", "init"]), &config), None);
    }
}
