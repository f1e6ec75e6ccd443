use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::{DirEntry, WalkDir};

use crate::config::LibraryConfig;
use crate::error::{Result, SubvocabError};
use crate::vocab::WordList;

/// A file queued for processing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryFile {
    /// Absolute or as-walked path
    pub path: PathBuf,
    /// Path relative to the library root, for display
    pub relative: PathBuf,
    /// Base name, the key stored in the seen files database
    pub name: String,
}

#[derive(Debug, Clone, Default)]
pub struct ScanResult {
    pub total_files: usize,
    pub videos: Vec<LibraryFile>,
    pub subtitles: Vec<LibraryFile>,
    /// Files already listed in the seen files database
    pub skipped: usize,
    /// Videos left out because of the language of their name
    pub excluded_by_language: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Video,
    Subtitle,
    Other,
}

/// Language of a file name as an ISO 639-3 code, `None` when it cannot be told
pub fn detect_language(name: &str) -> Option<String> {
    whatlang::detect(name).map(|info| info.lang().code().to_string())
}

/// Classify a path by its extension (case-insensitive)
pub fn classify(path: &Path, config: &LibraryConfig) -> FileKind {
    let extension = match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => ext.to_lowercase(),
        None => return FileKind::Other,
    };

    if config.video_extensions.iter().any(|e| e.eq_ignore_ascii_case(&extension)) {
        FileKind::Video
    } else if config.subtitle_extensions.iter().any(|e| e.eq_ignore_ascii_case(&extension)) {
        FileKind::Subtitle
    } else {
        FileKind::Other
    }
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry
            .file_name()
            .to_str()
            .map(|name| name.starts_with('.'))
            .unwrap_or(false)
}

fn should_skip_language(name: &str, skip: &[String]) -> bool {
    if skip.is_empty() {
        return false;
    }

    match detect_language(name) {
        Some(code) => skip.iter().any(|s| s.eq_ignore_ascii_case(&code)),
        None => false,
    }
}

/// Walk the library and queue every unseen video and subtitle file
pub fn scan_library(config: &LibraryConfig, seen: &WordList) -> Result<ScanResult> {
    let root = &config.videos_path;
    info!("Scanning library: {}", root.display());

    if !root.is_dir() {
        return Err(SubvocabError::FileNotFound(root.display().to_string()));
    }

    let mut result = ScanResult::default();
    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| config.include_hidden || !is_hidden(e));

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Skipping unreadable entry: {}", e);
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        let name = entry.file_name().to_string_lossy().to_string();
        if !name.contains('.') {
            continue;
        }
        result.total_files += 1;

        if seen.contains(&name) {
            result.skipped += 1;
            continue;
        }

        let path = entry.path().to_path_buf();
        let relative = pathdiff::diff_paths(&path, root).unwrap_or_else(|| path.clone());
        let file = LibraryFile { path, relative, name };

        match classify(&file.path, config) {
            FileKind::Video => {
                if should_skip_language(&file.name, &config.skip_video_languages) {
                    debug!("Skipping {} by file name language", file.relative.display());
                    result.excluded_by_language += 1;
                } else {
                    result.videos.push(file);
                }
            }
            FileKind::Subtitle => result.subtitles.push(file),
            FileKind::Other => {}
        }
    }

    info!(
        "Found {} files: {} videos, {} subtitles, {} already seen",
        result.total_files,
        result.videos.len(),
        result.subtitles.len(),
        result.skipped
    );

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use assert_fs::prelude::*;
    use assert_fs::TempDir;

    fn library(dir: &TempDir) -> LibraryConfig {
        let mut config = Config::default().library;
        config.videos_path = dir.path().to_path_buf();
        config
    }

    #[test]
    fn test_classify_is_case_insensitive() {
        let config = Config::default().library;
        assert_eq!(classify(Path::new("a/Show.MKV"), &config), FileKind::Video);
        assert_eq!(classify(Path::new("b.mp4"), &config), FileKind::Video);
        assert_eq!(classify(Path::new("c.Srt"), &config), FileKind::Subtitle);
        assert_eq!(classify(Path::new("d.vtt"), &config), FileKind::Subtitle);
        assert_eq!(classify(Path::new("e.nfo"), &config), FileKind::Other);
        assert_eq!(classify(Path::new("noext"), &config), FileKind::Other);
    }

    #[test]
    fn test_cyrillic_name_is_russian() {
        assert_eq!(
            detect_language("Ирония судьбы, или С лёгким паром.mkv").as_deref(),
            Some("rus")
        );
    }

    #[test]
    fn test_scan_queues_unseen_files() {
        let dir = TempDir::new().unwrap();
        dir.child("season1/ep1.srt").write_str("1\nHello\n").unwrap();
        dir.child("season1/ep2.mkv").touch().unwrap();
        dir.child("season1/ep3.srt").write_str("").unwrap();
        dir.child("notes.txt").write_str("ignore me").unwrap();
        dir.child("README").write_str("no extension").unwrap();
        dir.child(".hidden/secret.srt").write_str("").unwrap();

        let seen: WordList = vec!["ep3.srt".to_string()].into_iter().collect();
        let result = scan_library(&library(&dir), &seen).unwrap();

        assert_eq!(result.total_files, 4);
        assert_eq!(result.skipped, 1);
        assert_eq!(result.subtitles.len(), 1);
        assert_eq!(result.subtitles[0].name, "ep1.srt");
        assert_eq!(result.subtitles[0].relative, PathBuf::from("season1/ep1.srt"));
        assert_eq!(result.videos.len(), 1);
        assert_eq!(result.videos[0].name, "ep2.mkv");
    }

    #[test]
    fn test_scan_excludes_videos_by_name_language() {
        let dir = TempDir::new().unwrap();
        dir.child("Ирония судьбы, или С лёгким паром.mkv").touch().unwrap();
        dir.child("Ирония судьбы, или С лёгким паром.srt").write_str("").unwrap();

        let result = scan_library(&library(&dir), &WordList::new()).unwrap();
        assert_eq!(result.excluded_by_language, 1);
        assert!(result.videos.is_empty());
        assert_eq!(result.subtitles.len(), 1);
    }

    #[test]
    fn test_missing_root_is_error() {
        let mut config = Config::default().library;
        config.videos_path = PathBuf::from("/nonexistent/library/root");
        let err = scan_library(&config, &WordList::new()).unwrap_err();
        assert!(matches!(err, SubvocabError::FileNotFound(_)));
    }
}
