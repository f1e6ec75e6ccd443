use async_trait::async_trait;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

use crate::error::{Result, SubvocabError};
use super::Lemmatizer;

/// Lemmatizer that pipes space separated tokens into a command and reads one
/// lemma per stdout line
pub struct ExternalLemmatizer {
    command: String,
    args: Vec<String>,
}

impl ExternalLemmatizer {
    pub fn new<S: Into<String>>(command: S, args: Vec<String>) -> Self {
        Self {
            command: command.into(),
            args,
        }
    }
}

#[async_trait]
impl Lemmatizer for ExternalLemmatizer {
    async fn lemmatize(&self, tokens: &[String]) -> Result<Vec<String>> {
        if tokens.is_empty() {
            return Ok(Vec::new());
        }

        debug!("Sending {} tokens to {} {:?}", tokens.len(), self.command, self.args);

        let mut child = Command::new(&self.command)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| SubvocabError::Lemmatizer(format!("Failed to start {}: {}", self.command, e)))?;

        let mut input = tokens.join(" ");
        input.push('\n');

        let mut stdin = child.stdin.take().ok_or_else(|| {
            SubvocabError::Lemmatizer("Lemmatizer stdin is not available".to_string())
        })?;
        // A command that exits early closes the pipe; its exit status is reported below.
        if let Err(e) = stdin.write_all(input.as_bytes()).await {
            if e.kind() != std::io::ErrorKind::BrokenPipe {
                return Err(e.into());
            }
        }
        drop(stdin);

        let output = child.wait_with_output().await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SubvocabError::Lemmatizer(format!(
                "{} exited with {}: {}",
                self.command,
                output.status,
                stderr.trim()
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(stdout
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect())
    }

    fn name(&self) -> &str {
        "external"
    }
}
