use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Scan the library for unseen files and collect unknown words
    Scan {
        /// Library folder with videos and subtitles
        #[arg(long)]
        videos: Option<PathBuf>,

        /// Folder holding the word databases
        #[arg(short, long)]
        work_dir: Option<PathBuf>,

        /// Collect words without updating the databases
        #[arg(long)]
        dry_run: bool,

        /// Print the run report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the cleaned words of a single video or subtitle file
    Words {
        /// Input video or subtitle file
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Show the size of the word databases
    Status {
        /// Folder holding the word databases
        #[arg(short, long)]
        work_dir: Option<PathBuf>,
    },

    /// Move reviewed words from the new words list to the known words list
    Learn {
        /// Words to mark as known
        #[arg(required_unless_present = "all")]
        words: Vec<String>,

        /// Mark every word in the new words list as known
        #[arg(long, conflicts_with = "words")]
        all: bool,

        /// Folder holding the word databases
        #[arg(short, long)]
        work_dir: Option<PathBuf>,
    },

    /// Write a configuration file with default settings
    Init {
        /// Output configuration file
        #[arg(short, long, default_value = "subvocab.toml")]
        output: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}
