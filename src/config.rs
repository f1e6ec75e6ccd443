use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use crate::error::{Result, SubvocabError};

fn default_include_hidden() -> bool {
    false
}

fn default_max_codepoint() -> u32 {
    0x03FF
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub library: LibraryConfig,
    pub vocabulary: VocabularyConfig,
    pub filter: FilterConfig,
    pub lemmatizer: LemmatizerConfig,
    pub media: MediaConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LibraryConfig {
    /// Root folder of the video/subtitle library
    pub videos_path: PathBuf,
    /// Extensions treated as videos (without the leading dot)
    pub video_extensions: Vec<String>,
    /// Extensions treated as subtitle files
    pub subtitle_extensions: Vec<String>,
    /// ISO 639-3 codes; videos whose file name is detected as one of these are skipped
    pub skip_video_languages: Vec<String>,
    /// Also scan entries whose name starts with a dot
    #[serde(default = "default_include_hidden")]
    pub include_hidden: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VocabularyConfig {
    /// Folder holding the word databases and logs
    pub work_path: PathBuf,
    /// Base names of already processed files
    pub seen_file: PathBuf,
    /// Words the learner already knows
    pub known_words_file: PathBuf,
    /// Words waiting for review
    pub new_words_file: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Fragments removed from every word, applied in order
    pub fragments: Vec<String>,
    /// Words shorter than this (in characters) are dropped before trimming
    pub min_word_length: usize,
    /// Words with more dashes than this look like markup and are dropped
    pub max_dashes: usize,
    /// Words with more dots than this look like markup and are dropped
    pub max_dots: usize,
    /// Words containing a character above this code point are dropped
    #[serde(default = "default_max_codepoint")]
    pub max_codepoint: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum LemmatizerMode {
    /// Rules: built-in English rules with an optional lookup table
    Rules,
    /// External: pipe tokens through a user-supplied command
    External,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LemmatizerConfig {
    pub mode: LemmatizerMode,
    /// Tab separated `form<TAB>lemma` file consulted before the rules
    #[serde(default)]
    pub lookup_table: Option<PathBuf>,
    /// Command used in External mode
    #[serde(default)]
    pub command: Option<String>,
    /// Arguments for the external command
    #[serde(default)]
    pub args: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaConfig {
    /// Path to ffmpeg binary
    pub binary_path: String,
    /// Subtitle stream to extract; ffmpeg picks the first one when unset
    #[serde(default)]
    pub subtitle_stream: Option<u32>,
    /// Additional options inserted before the output file
    #[serde(default)]
    pub extract_options: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            library: LibraryConfig {
                videos_path: PathBuf::from("."),
                video_extensions: vec!["mkv".to_string(), "mp4".to_string()],
                subtitle_extensions: vec!["srt".to_string(), "vtt".to_string()],
                skip_video_languages: vec!["rus".to_string()],
                include_hidden: false,
            },
            vocabulary: VocabularyConfig {
                work_path: PathBuf::from("."),
                seen_file: PathBuf::from("seen_files.txt"),
                known_words_file: PathBuf::from("known_words.txt"),
                new_words_file: PathBuf::from("new_words.txt"),
            },
            filter: FilterConfig::default(),
            lemmatizer: LemmatizerConfig {
                mode: LemmatizerMode::Rules,
                lookup_table: None,
                command: None,
                args: Vec::new(),
            },
            media: MediaConfig {
                binary_path: "ffmpeg".to_string(),
                subtitle_stream: None,
                extract_options: Vec::new(),
            },
        }
    }
}

impl Default for FilterConfig {
    fn default() -> Self {
        let fragments = [
            "'s", "&lt", "&gt", "'ll", "</i", "i>", "...", "'ve", "'re", "anti-", "self-",
            "semi-", "ex-", "non-", "font", "<c>", "</c>", "--", "color=", "www", ".com",
            ".org", "size=", "\\h",
        ];

        Self {
            fragments: fragments.iter().map(|f| f.to_string()).collect(),
            min_word_length: 3,
            max_dashes: 1,
            max_dots: 1,
            max_codepoint: default_max_codepoint(),
        }
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| SubvocabError::Config(format!("Failed to read config file: {}", e)))?;

        Ok(toml::from_str(&content)?)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| SubvocabError::Config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| SubvocabError::Config(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }
}

impl VocabularyConfig {
    /// Resolve a database file name against the work folder
    pub fn resolve(&self, file: &Path) -> PathBuf {
        if file.is_absolute() {
            file.to_path_buf()
        } else {
            self.work_path.join(file)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_roundtrips_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("subvocab.toml");

        let mut config = Config::default();
        config.library.videos_path = PathBuf::from("/media/shows");
        config.media.subtitle_stream = Some(1);
        config.save_to_file(&path).unwrap();

        let loaded = Config::from_file(&path).unwrap();
        assert_eq!(loaded.library.videos_path, PathBuf::from("/media/shows"));
        assert_eq!(loaded.media.subtitle_stream, Some(1));
        assert_eq!(loaded.filter.fragments.len(), 24);
        assert!(matches!(loaded.lemmatizer.mode, LemmatizerMode::Rules));
    }

    #[test]
    fn test_missing_config_file_is_config_error() {
        let err = Config::from_file("/nonexistent/subvocab.toml").unwrap_err();
        assert!(matches!(err, SubvocabError::Config(_)));
    }

    #[test]
    fn test_malformed_config_is_toml_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("subvocab.toml");
        std::fs::write(&path, "[library\nvideos_path = 3\n").unwrap();

        let err = Config::from_file(&path).unwrap_err();
        assert!(matches!(err, SubvocabError::Toml(_)));
    }

    #[test]
    fn test_resolve_relative_and_absolute() {
        let vocab = VocabularyConfig {
            work_path: PathBuf::from("/data/vocab"),
            seen_file: PathBuf::from("seen_files.txt"),
            known_words_file: PathBuf::from("/elsewhere/known.txt"),
            new_words_file: PathBuf::from("new_words.txt"),
        };
        assert_eq!(vocab.resolve(&vocab.seen_file), PathBuf::from("/data/vocab/seen_files.txt"));
        assert_eq!(vocab.resolve(&vocab.known_words_file), PathBuf::from("/elsewhere/known.txt"));
    }
}
