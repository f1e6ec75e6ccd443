//! Subvocab - vocabulary tracking from a video library
//!
//! Scans a folder of videos and subtitles, pulls subtitle text out with ffmpeg,
//! reduces it to lemmas and keeps three plain text databases: files already
//! seen, words already known and new words waiting for review.

pub mod cli;
pub mod config;
pub mod workflow;
pub mod library;
pub mod subtitle;
pub mod cleanup;
pub mod lemma;
pub mod media;
pub mod vocab;
pub mod error;
