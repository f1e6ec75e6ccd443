use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use crate::config::VocabularyConfig;
use crate::error::Result;

/// Newline-delimited list of unique entries, kept in first-seen order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WordList {
    items: Vec<String>,
    index: BTreeSet<String>,
}

impl WordList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a list; a missing file is an empty list
    pub async fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        match fs::read_to_string(path).await {
            Ok(content) => {
                let list: Self = content.lines().map(str::to_string).collect();
                debug!("Loaded {} entries from {}", list.len(), path.display());
                Ok(list)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::new()),
            Err(e) => Err(e.into()),
        }
    }

    /// Overwrite the file with the sorted entries
    pub async fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut content = String::new();
        for item in self.sorted() {
            content.push_str(&item);
            content.push('\n');
        }
        fs::write(path, content).await?;
        Ok(())
    }

    /// Append entries to the file, creating it if needed
    pub async fn append<P: AsRef<Path>>(path: P, items: &[String]) -> Result<()> {
        if items.is_empty() {
            return Ok(());
        }

        let mut content = items.join("\n");
        content.push('\n');

        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .await?;
        file.write_all(content.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }

    /// Insert an entry; blank entries are ignored. Returns true if it was new.
    pub fn insert<S: AsRef<str>>(&mut self, item: S) -> bool {
        let item = item.as_ref().trim_end();
        if item.is_empty() || self.index.contains(item) {
            return false;
        }
        self.index.insert(item.to_string());
        self.items.push(item.to_string());
        true
    }

    pub fn remove(&mut self, item: &str) -> bool {
        if self.index.remove(item) {
            self.items.retain(|existing| existing != item);
            true
        } else {
            false
        }
    }

    pub fn contains(&self, item: &str) -> bool {
        self.index.contains(item)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.items.iter()
    }

    pub fn sorted(&self) -> Vec<String> {
        self.index.iter().cloned().collect()
    }

    /// Entries not present in `other`, sorted
    pub fn difference(&self, other: &WordList) -> Vec<String> {
        self.index.difference(&other.index).cloned().collect()
    }
}

impl FromIterator<String> for WordList {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        let mut list = Self::new();
        for item in iter {
            list.insert(item);
        }
        list
    }
}

/// Result of opening the known words database
pub struct KnownWords {
    pub words: WordList,
    /// The database did not exist and an empty one was created
    pub created: bool,
}

/// The three word databases kept in the work folder
pub struct VocabularyStore {
    seen_path: PathBuf,
    known_path: PathBuf,
    new_path: PathBuf,
}

impl VocabularyStore {
    pub fn new(config: &VocabularyConfig) -> Self {
        Self {
            seen_path: config.resolve(&config.seen_file),
            known_path: config.resolve(&config.known_words_file),
            new_path: config.resolve(&config.new_words_file),
        }
    }

    pub fn seen_path(&self) -> &Path {
        &self.seen_path
    }

    pub fn known_path(&self) -> &Path {
        &self.known_path
    }

    pub fn new_words_path(&self) -> &Path {
        &self.new_path
    }

    pub async fn load_seen(&self) -> Result<WordList> {
        WordList::load(&self.seen_path).await
    }

    /// Load known words, creating an empty database when missing
    pub async fn load_known(&self) -> Result<KnownWords> {
        if fs::try_exists(&self.known_path).await? {
            let words = WordList::load(&self.known_path).await?;
            return Ok(KnownWords { words, created: false });
        }

        if let Some(parent) = self.known_path.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&self.known_path, "").await?;
        info!("Created empty known words database at {}", self.known_path.display());

        Ok(KnownWords {
            words: WordList::new(),
            created: true,
        })
    }

    /// Read known words without creating the database
    pub async fn peek_known(&self) -> Result<WordList> {
        WordList::load(&self.known_path).await
    }

    pub async fn load_new(&self) -> Result<WordList> {
        WordList::load(&self.new_path).await
    }

    pub async fn save_new(&self, words: &WordList) -> Result<()> {
        words.save(&self.new_path).await
    }

    pub async fn append_seen(&self, names: &[String]) -> Result<()> {
        WordList::append(&self.seen_path, names).await
    }

    /// Move words from the new words database to the known words database.
    /// Returns the words that were actually moved.
    pub async fn learn(&self, words: &[String]) -> Result<Vec<String>> {
        let mut new_words = self.load_new().await?;
        let mut known = self.load_known().await?.words;

        let mut moved = Vec::new();
        for word in words {
            let word = word.trim().to_lowercase();
            if new_words.remove(&word) {
                known.insert(&word);
                moved.push(word);
            }
        }

        if !moved.is_empty() {
            known.save(&self.known_path).await?;
            new_words.save(&self.new_path).await?;
            info!("Moved {} words to {}", moved.len(), self.known_path.display());
        }

        Ok(moved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::prelude::*;
    use assert_fs::TempDir;

    fn store(dir: &TempDir) -> VocabularyStore {
        VocabularyStore::new(&VocabularyConfig {
            work_path: dir.path().to_path_buf(),
            seen_file: PathBuf::from("seen_files.txt"),
            known_words_file: PathBuf::from("known_words.txt"),
            new_words_file: PathBuf::from("new_words.txt"),
        })
    }

    #[tokio::test]
    async fn test_load_ignores_blank_lines_and_crlf() {
        let dir = TempDir::new().unwrap();
        let file = dir.child("words.txt");
        file.write_str("apple\r\n\nbanana\napple\n").unwrap();

        let list = WordList::load(file.path()).await.unwrap();
        assert_eq!(list.iter().cloned().collect::<Vec<_>>(), vec!["apple", "banana"]);
    }

    #[tokio::test]
    async fn test_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let list = WordList::load(dir.path().join("absent.txt")).await.unwrap();
        assert!(list.is_empty());
    }

    #[tokio::test]
    async fn test_save_writes_sorted_lines() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.txt");
        let list: WordList = vec!["pear".to_string(), "apple".to_string()].into_iter().collect();

        list.save(&path).await.unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "apple\npear\n");
    }

    #[tokio::test]
    async fn test_append_adds_to_existing_file() {
        let dir = TempDir::new().unwrap();
        let file = dir.child("seen.txt");
        file.write_str("ep1.srt\n").unwrap();

        WordList::append(file.path(), &["ep2.mkv".to_string()]).await.unwrap();
        WordList::append(file.path(), &[]).await.unwrap();
        assert_eq!(std::fs::read_to_string(file.path()).unwrap(), "ep1.srt\nep2.mkv\n");
    }

    #[test]
    fn test_difference_is_sorted() {
        let read: WordList = ["zebra", "apple", "house"].iter().map(|s| s.to_string()).collect();
        let known: WordList = ["house"].iter().map(|s| s.to_string()).collect();
        assert_eq!(read.difference(&known), vec!["apple", "zebra"]);
    }

    #[tokio::test]
    async fn test_known_words_created_when_missing() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);

        let known = store.load_known().await.unwrap();
        assert!(known.created);
        assert!(known.words.is_empty());
        assert!(dir.child("known_words.txt").path().exists());

        let again = store.load_known().await.unwrap();
        assert!(!again.created);
    }

    #[tokio::test]
    async fn test_learn_moves_words() {
        let dir = TempDir::new().unwrap();
        dir.child("new_words.txt").write_str("apple\nbanana\ncherry\n").unwrap();
        dir.child("known_words.txt").write_str("zebra\n").unwrap();
        let store = store(&dir);

        let moved = store
            .learn(&["Banana".to_string(), "durian".to_string()])
            .await
            .unwrap();
        assert_eq!(moved, vec!["banana"]);

        let known = std::fs::read_to_string(store.known_path()).unwrap();
        let new_words = std::fs::read_to_string(store.new_words_path()).unwrap();
        assert_eq!(known, "banana\nzebra\n");
        assert_eq!(new_words, "apple\ncherry\n");
    }
}
