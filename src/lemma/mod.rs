// Reducing inflected words to their dictionary form
//
// - Rules: in-process English lemmatizer (lookup table, exceptions, suffix rules)
// - External: delegates to a user-supplied command such as a spaCy script

pub mod external;
pub mod rules;

use async_trait::async_trait;
use tracing::info;

pub use external::ExternalLemmatizer;
pub use rules::RuleLemmatizer;

use crate::config::{LemmatizerConfig, LemmatizerMode};
use crate::error::{Result, SubvocabError};

#[async_trait]
pub trait Lemmatizer: Send + Sync {
    /// Map tokens to lemmas, in order. A token may yield more than one lemma
    /// (contractions) or none.
    async fn lemmatize(&self, tokens: &[String]) -> Result<Vec<String>>;

    /// Short name used in logs
    fn name(&self) -> &str;
}

pub struct LemmatizerFactory;

impl LemmatizerFactory {
    pub fn create(config: &LemmatizerConfig) -> Result<Box<dyn Lemmatizer>> {
        let lemmatizer: Box<dyn Lemmatizer> = match config.mode {
            LemmatizerMode::Rules => match &config.lookup_table {
                Some(path) => Box::new(RuleLemmatizer::with_lookup_table(path)?),
                None => Box::new(RuleLemmatizer::new()),
            },
            LemmatizerMode::External => {
                let command = config.command.clone().ok_or_else(|| {
                    SubvocabError::Config("External lemmatizer mode requires lemmatizer.command".to_string())
                })?;
                Box::new(ExternalLemmatizer::new(command, config.args.clone()))
            }
        };

        info!("Using {} lemmatizer", lemmatizer.name());
        Ok(lemmatizer)
    }
}
