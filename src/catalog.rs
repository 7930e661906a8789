use std::fs;
use std::path::Path;

use serde_json::Value;

use crate::data_models::Article;
use crate::error::CatalogError;

/// Key under which a wrapped catalog keeps its list of articles.
pub const WRAPPER_KEY: &str = "articles";

/// Load a catalog from a file path, or, when no such file exists, from the
/// input itself treated as raw JSON. Nothing is cached: every call re-reads.
pub fn load_catalog(path_or_json: &str) -> Result<Vec<Article>, CatalogError> {
    let path = Path::new(path_or_json);
    let data = if path.is_file() {
        let raw = fs::read_to_string(path).map_err(|source| CatalogError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| CatalogError::InvalidFileJson {
            path: path.to_path_buf(),
            source,
        })?
    } else {
        serde_json::from_str(path_or_json).map_err(CatalogError::InvalidJson)?
    };

    let articles = normalize(data)?;
    tracing::debug!("loaded catalog with {} articles", articles.len());
    Ok(articles)
}

/// Unwrap the optional `articles` key and check every entry is an object.
pub fn normalize(data: Value) -> Result<Vec<Article>, CatalogError> {
    let items = match data {
        Value::Object(mut map) if map.contains_key(WRAPPER_KEY) => {
            match map.remove(WRAPPER_KEY) {
                Some(Value::Array(items)) => items,
                _ => return Err(CatalogError::WrapperNotList),
            }
        }
        Value::Array(items) => items,
        _ => return Err(CatalogError::NotAList),
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| match item {
            Value::Object(fields) => Ok(Article::new(fields)),
            _ => Err(CatalogError::ItemNotObject { index }),
        })
        .collect()
}
