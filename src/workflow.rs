use chrono::{DateTime, Utc};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::cleanup::WordCleaner;
use crate::config::Config;
use crate::error::{Result, SubvocabError};
use crate::lemma::{Lemmatizer, LemmatizerFactory};
use crate::library::{classify, scan_library, FileKind, LibraryFile};
use crate::media::{MediaProcessorFactory, MediaProcessorTrait};
use crate::subtitle::read_subtitle_words;
use crate::vocab::{VocabularyStore, WordList};

#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Do everything except writing the databases
    pub dry_run: bool,
    /// Draw progress bars on the terminal
    pub show_progress: bool,
}

/// Counters gathered during one run
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub dry_run: bool,
    pub files_found: usize,
    pub files_skipped: usize,
    pub excluded_by_language: usize,
    pub videos_processed: usize,
    pub videos_failed: usize,
    pub videos_deferred: usize,
    pub subtitles_processed: usize,
    pub subtitles_failed: usize,
    pub words_read: usize,
    pub known_words: usize,
    pub known_words_created: bool,
    pub unknown_in_new_files: usize,
    pub unknown_in_db: usize,
    pub total_unknown: usize,
    pub new_words_file: PathBuf,
    pub known_words_file: PathBuf,
}

impl RunReport {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

pub struct Workflow {
    config: Config,
    media: Box<dyn MediaProcessorTrait>,
    cleaner: WordCleaner,
    store: VocabularyStore,
}

impl Workflow {
    pub fn new(config: Config) -> Result<Self> {
        let media = MediaProcessorFactory::create_processor(config.media.clone());
        let lemmatizer = LemmatizerFactory::create(&config.lemmatizer)?;

        Ok(Self::with_components(config, media, lemmatizer))
    }

    pub fn with_components(
        config: Config,
        media: Box<dyn MediaProcessorTrait>,
        lemmatizer: Box<dyn Lemmatizer>,
    ) -> Self {
        let cleaner = WordCleaner::new(config.filter.clone(), lemmatizer);
        let store = VocabularyStore::new(&config.vocabulary);

        Self {
            config,
            media,
            cleaner,
            store,
        }
    }

    /// Scan the library, collect words from unseen files and update the databases
    pub async fn run(&self, options: &RunOptions) -> Result<RunReport> {
        let started_at = Utc::now();

        let seen = self.store.load_seen().await?;
        let scan = scan_library(&self.config.library, &seen)?;

        let mut words_read = WordList::new();
        let mut processed: Vec<String> = Vec::new();

        let mut videos_processed = 0;
        let mut videos_failed = 0;
        let mut videos_deferred = 0;

        if !scan.videos.is_empty() {
            match self.media.check_availability().await {
                Ok(()) => {
                    let pb = progress_bar(scan.videos.len(), "Video", options.show_progress);
                    for video in &scan.videos {
                        pb.set_message(video.relative.display().to_string());
                        match self.words_from_video(&video.path).await {
                            Ok(words) => {
                                debug!("{} words from {}", words.len(), video.relative.display());
                                words.into_iter().for_each(|w| {
                                    words_read.insert(w);
                                });
                            }
                            Err(e) => {
                                warn!("No subtitles taken from {}: {}", video.relative.display(), e);
                                videos_failed += 1;
                            }
                        }
                        // Marked seen even when nothing could be extracted
                        processed.push(video.name.clone());
                        videos_processed += 1;
                        pb.inc(1);
                    }
                    pb.finish_and_clear();
                }
                Err(e) => {
                    warn!("Skipping {} videos, media processor unavailable: {}", scan.videos.len(), e);
                    videos_deferred = scan.videos.len();
                }
            }
        }

        let (subtitles_processed, subtitles_failed) = self
            .collect_subtitles(&scan.subtitles, &mut words_read, &mut processed, options)
            .await;

        let known = self.store.load_known().await?;
        let unknown_new: WordList = words_read.difference(&known.words).into_iter().collect();

        let db_new = self.store.load_new().await?;
        let merged = db_new.iter().cloned().chain(unknown_new.iter().cloned());
        let recleaned: WordList = self.cleaner.clean(merged).await?.into_iter().collect();
        let total: WordList = recleaned.difference(&known.words).into_iter().collect();

        if options.dry_run {
            info!("Dry run, databases left untouched");
        } else {
            self.store.save_new(&total).await?;
            self.store.append_seen(&processed).await?;
            info!(
                "Wrote {} unknown words to {}",
                total.len(),
                self.store.new_words_path().display()
            );
        }

        Ok(RunReport {
            started_at,
            finished_at: Utc::now(),
            dry_run: options.dry_run,
            files_found: scan.total_files,
            files_skipped: scan.skipped,
            excluded_by_language: scan.excluded_by_language,
            videos_processed,
            videos_failed,
            videos_deferred,
            subtitles_processed,
            subtitles_failed,
            words_read: words_read.len(),
            known_words: known.words.len(),
            known_words_created: known.created,
            unknown_in_new_files: unknown_new.len(),
            unknown_in_db: db_new.len(),
            total_unknown: total.len(),
            new_words_file: self.store.new_words_path().to_path_buf(),
            known_words_file: self.store.known_path().to_path_buf(),
        })
    }

    async fn collect_subtitles(
        &self,
        subtitles: &[LibraryFile],
        words_read: &mut WordList,
        processed: &mut Vec<String>,
        options: &RunOptions,
    ) -> (usize, usize) {
        let mut ok = 0;
        let mut failed = 0;

        let pb = progress_bar(subtitles.len(), "Subtitle", options.show_progress);
        for subtitle in subtitles {
            pb.set_message(subtitle.relative.display().to_string());
            match read_subtitle_words(&subtitle.path, &self.cleaner).await {
                Ok(words) => {
                    words.into_iter().for_each(|w| {
                        words_read.insert(w);
                    });
                    processed.push(subtitle.name.clone());
                    ok += 1;
                }
                Err(e) => {
                    warn!("Failed to read {}: {}", subtitle.relative.display(), e);
                    failed += 1;
                }
            }
            pb.inc(1);
        }
        pb.finish_and_clear();

        (ok, failed)
    }

    /// Cleaned words of a single video or subtitle file
    pub async fn words_in_file<P: AsRef<Path>>(&self, path: P) -> Result<Vec<String>> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(SubvocabError::FileNotFound(path.display().to_string()));
        }

        match classify(path, &self.config.library) {
            FileKind::Video => {
                self.media.check_availability().await?;
                self.words_from_video(path).await
            }
            FileKind::Subtitle => read_subtitle_words(path, &self.cleaner).await,
            FileKind::Other => Err(SubvocabError::Config(format!(
                "{} is neither a video nor a subtitle file",
                path.display()
            ))),
        }
    }

    async fn words_from_video(&self, video_path: &Path) -> Result<Vec<String>> {
        let extracted = tempfile::Builder::new()
            .prefix("subvocab-")
            .suffix(".srt")
            .tempfile()?;

        self.media.extract_subtitles(video_path, extracted.path()).await?;
        read_subtitle_words(extracted.path(), &self.cleaner).await
    }
}

fn progress_bar(len: usize, label: &str, visible: bool) -> ProgressBar {
    if !visible || len == 0 {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new(len as u64);
    let template = format!("{} {{pos}}/{{len}} [{{bar:30.cyan/blue}}] {{msg}}", label);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(&template)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );
    pb
}
