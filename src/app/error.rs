use thiserror::Error;

use crate::config::ConfigError;
use crate::rules::RuleError;

#[derive(Error, Debug)]
pub enum NewswatchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Feed parsing error: {0}")]
    FeedParse(String),

    #[error("Malformed item {entry} from {source_url}: missing {field}")]
    MalformedItem {
        source_url: String,
        entry: String,
        field: &'static str,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Rules(#[from] RuleError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, NewswatchError>;
