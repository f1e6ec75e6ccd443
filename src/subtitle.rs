use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;
use tokio::fs;
use tracing::debug;

use crate::cleanup::WordCleaner;
use crate::error::{Result, SubvocabError};

static MARKUP_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<.*?>").expect("static tag pattern")
});

/// Read a subtitle file as UTF-8 text
pub async fn read_subtitle_text<P: AsRef<Path>>(path: P) -> Result<String> {
    let path = path.as_ref();
    let bytes = fs::read(path).await?;

    let text = String::from_utf8(bytes).map_err(|e| {
        SubvocabError::Subtitle(format!("{} is not valid UTF-8: {}", path.display(), e))
    })?;

    Ok(text.strip_prefix('\u{feff}').map(str::to_string).unwrap_or(text))
}

/// Strip markup tags, lowercase and split into raw tokens
pub fn subtitle_tokens(text: &str) -> Vec<String> {
    let text = MARKUP_TAG.replace_all(text, " ");
    text.to_lowercase()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// Read a subtitle file and return its cleaned, lemmatized words
pub async fn read_subtitle_words<P: AsRef<Path>>(
    path: P,
    cleaner: &WordCleaner,
) -> Result<Vec<String>> {
    let path = path.as_ref();
    let text = read_subtitle_text(path).await?;
    let tokens = subtitle_tokens(&text);
    debug!("{} raw tokens in {}", tokens.len(), path.display());

    cleaner.clean(tokens).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subtitle_tokens_strips_tags() {
        let text = "1\n00:00:01,000 --> 00:00:02,500\n<i>Hello</i> <font color=\"#fff\">World</font>\n";
        let tokens = subtitle_tokens(text);
        assert_eq!(
            tokens,
            vec!["1", "00:00:01,000", "-->", "00:00:02,500", "hello", "world"]
        );
    }

    #[test]
    fn test_tags_do_not_span_lines() {
        let tokens = subtitle_tokens("a < b\nc > d");
        assert_eq!(tokens, vec!["a", "<", "b", "c", ">", "d"]);
    }

    #[tokio::test]
    async fn test_read_subtitle_text_strips_bom() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ep.srt");
        std::fs::write(&path, "\u{feff}1\nHi\n").unwrap();

        let text = read_subtitle_text(&path).await.unwrap();
        assert_eq!(text, "1\nHi\n");
    }

    #[tokio::test]
    async fn test_read_subtitle_text_rejects_invalid_utf8() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("latin1.srt");
        std::fs::write(&path, [0x63, 0x61, 0x66, 0xe9]).unwrap();

        let err = read_subtitle_text(&path).await.unwrap_err();
        assert!(matches!(err, SubvocabError::Subtitle(_)));
    }
}
