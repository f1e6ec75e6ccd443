use async_trait::async_trait;
use std::path::Path;
use tokio::process::Command;
use tracing::{info, debug};

use crate::config::MediaConfig;
use crate::error::{Result, SubvocabError};
use super::{MediaProcessorTrait, MediaCommandBuilder};

/// Concrete implementation of media processor (FFmpeg-based)
pub struct MediaProcessorImpl {
    config: MediaConfig,
    command_builder: MediaCommandBuilder,
}

impl MediaProcessorImpl {
    /// Create a new media processor implementation
    pub fn new(config: MediaConfig) -> Self {
        let command_builder = MediaCommandBuilder::new(&config.binary_path);

        Self {
            config,
            command_builder,
        }
    }
}

#[async_trait]
impl MediaProcessorTrait for MediaProcessorImpl {
    async fn extract_subtitles(
        &self,
        video_path: &Path,
        subtitle_path: &Path,
    ) -> Result<()> {
        debug!("Extracting subtitles from {} to {}", video_path.display(), subtitle_path.display());

        let command = self.command_builder.extract_subtitles(
            video_path,
            subtitle_path,
            self.config.subtitle_stream,
            &self.config.extract_options,
        );

        command.execute().await
    }

    async fn check_availability(&self) -> Result<()> {
        let output = self.command_builder.version_check().execute().await;

        match output {
            Ok(()) => {
                info!("Media processor is available");
                Ok(())
            }
            Err(e) => Err(SubvocabError::Media(format!("Media processor not found: {}", e))),
        }
    }

    async fn get_version_info(&self) -> Result<String> {
        debug!("Getting media processor version information");

        let output = Command::new(&self.config.binary_path)
            .arg("-version")
            .output()
            .await
            .map_err(|e| SubvocabError::Media(format!("Failed to execute media processor: {}", e)))?;

        if output.status.success() {
            let version_info = String::from_utf8_lossy(&output.stdout);
            let first_line = version_info.lines().next().unwrap_or("Unknown version");
            Ok(first_line.to_string())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Err(SubvocabError::Media(format!("Media processor version check failed: {}", stderr)))
        }
    }
}
