use std::path::Path;
use tokio::process::Command;
use tracing::debug;

use crate::error::{Result, SubvocabError};

/// Abstract media processing command representation
#[derive(Debug, Clone)]
pub struct MediaCommand {
    pub binary_path: String,
    pub args: Vec<String>,
    pub description: String,
}

impl MediaCommand {
    /// Create a new media processing command
    pub fn new<S1: Into<String>, S2: Into<String>>(binary_path: S1, description: S2) -> Self {
        Self {
            binary_path: binary_path.into(),
            args: Vec::new(),
            description: description.into(),
        }
    }

    /// Add an argument
    pub fn arg<S: Into<String>>(mut self, arg: S) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Add multiple arguments
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(|s| s.into()));
        self
    }

    /// Add input file
    pub fn input<P: AsRef<Path>>(self, path: P) -> Self {
        self.arg("-i").arg(path.as_ref().to_string_lossy().to_string())
    }

    /// Add output file
    pub fn output<P: AsRef<Path>>(self, path: P) -> Self {
        self.arg(path.as_ref().to_string_lossy().to_string())
    }

    /// Force overwrite output
    pub fn overwrite(self) -> Self {
        self.arg("-y")
    }

    /// Only report errors on stderr
    pub fn quiet(self) -> Self {
        self.arg("-hide_banner").arg("-loglevel").arg("error")
    }

    /// Select the n-th subtitle stream of the first input
    pub fn subtitle_stream(self, index: u32) -> Self {
        self.arg("-map").arg(format!("0:s:{}", index))
    }

    /// Execute the command
    pub async fn execute(&self) -> Result<()> {
        debug!("Executing media processing command: {} {:?}", self.binary_path, self.args);
        debug!("Description: {}", self.description);

        let output = Command::new(&self.binary_path)
            .args(&self.args)
            .output()
            .await
            .map_err(|e| SubvocabError::Media(format!("Failed to execute media processor: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SubvocabError::Media(format!(
                "{} failed: {}",
                self.description,
                stderr.trim()
            )));
        }

        Ok(())
    }
}

/// Builder for the media operations used by the scanner
pub struct MediaCommandBuilder {
    binary_path: String,
}

impl MediaCommandBuilder {
    /// Create a new command builder
    pub fn new<S: Into<String>>(binary_path: S) -> Self {
        Self {
            binary_path: binary_path.into(),
        }
    }

    /// Build subtitle extraction command; the output extension picks the subtitle codec
    pub fn extract_subtitles<P: AsRef<Path>>(
        &self,
        video_path: P,
        subtitle_path: P,
        stream: Option<u32>,
        additional_options: &[String],
    ) -> MediaCommand {
        let mut cmd = MediaCommand::new(&self.binary_path, "Subtitle extraction")
            .input(video_path)
            .overwrite()
            .quiet();

        if let Some(index) = stream {
            cmd = cmd.subtitle_stream(index);
        }

        cmd.args(additional_options.iter().cloned())
            .output(subtitle_path)
    }

    /// Build version check command
    pub fn version_check(&self) -> MediaCommand {
        MediaCommand::new(&self.binary_path, "Version check")
            .arg("-version")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_subtitles_default_stream() {
        let builder = MediaCommandBuilder::new("ffmpeg");
        let cmd = builder.extract_subtitles("show/ep1.mkv", "/tmp/out.srt", None, &[]);

        assert_eq!(cmd.binary_path, "ffmpeg");
        assert_eq!(
            cmd.args,
            vec!["-i", "show/ep1.mkv", "-y", "-hide_banner", "-loglevel", "error", "/tmp/out.srt"]
        );
    }

    #[test]
    fn test_extract_subtitles_with_stream_and_options() {
        let builder = MediaCommandBuilder::new("/opt/ffmpeg/bin/ffmpeg");
        let extra = vec!["-sub_charenc".to_string(), "UTF-8".to_string()];
        let cmd = builder.extract_subtitles("a.mp4", "b.srt", Some(2), &extra);

        assert_eq!(
            cmd.args,
            vec![
                "-i", "a.mp4", "-y", "-hide_banner", "-loglevel", "error",
                "-map", "0:s:2", "-sub_charenc", "UTF-8", "b.srt",
            ]
        );
        assert_eq!(cmd.description, "Subtitle extraction");
    }

    #[tokio::test]
    async fn test_missing_binary_is_media_error() {
        let cmd = MediaCommandBuilder::new("definitely-not-a-real-ffmpeg-binary").version_check();
        let err = cmd.execute().await.unwrap_err();
        assert!(matches!(err, SubvocabError::Media(_)));
    }
}
