use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("could not read catalog file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("catalog file {} does not contain valid JSON: {source}", path.display())]
    InvalidFileJson {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("catalog input is neither an existing file nor valid JSON: {0}")]
    InvalidJson(#[source] serde_json::Error),

    #[error("the 'articles' key must hold a list of objects")]
    WrapperNotList,

    #[error("catalog JSON must be a list of objects or an object with an 'articles' key")]
    NotAList,

    #[error("catalog entry {index} is not a JSON object")]
    ItemNotObject { index: usize },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("invalid value for {key}: {value:?}")]
    InvalidValue { key: &'static str, value: String },
}

#[derive(Error, Debug)]
pub enum SummaryError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("summarization service answered {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("summarization response had no content")]
    EmptyResponse,

    #[error("summarization content is not the expected JSON object: {0}")]
    MalformedContent(#[from] serde_json::Error),
}
