//! Hosted asset seam: where page and site content documents come from.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::domain::error::StorableError;

pub const FOOTER_ASSET_PATH: &str = "content/footer.json";
pub const TOPBAR_ASSET_PATH: &str = "content/top-bar.json";
pub const CATEGORIES_ASSET_PATH: &str = "content/listing-categories.json";

/// Path of the hosted page asset called `name`.
pub fn page_asset_path(name: &str) -> String {
    format!("content/pages/{name}.json")
}

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("asset `{path}` not found")]
    NotFound { path: String },
    #[error("asset path `{path}` is not allowed")]
    InvalidPath { path: String },
    #[error("asset `{path}` could not be fetched: {message}")]
    Fetch {
        path: String,
        status: Option<u16>,
        message: String,
    },
    #[error("asset `{path}` is not valid JSON")]
    Decode {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

impl AssetError {
    pub fn fetch(path: impl Into<String>, status: Option<u16>, message: impl Into<String>) -> Self {
        Self::Fetch {
            path: path.into(),
            status,
            message: message.into(),
        }
    }

    pub fn to_storable(&self) -> StorableError {
        let error = StorableError::from_error("AssetError", self);
        match self {
            AssetError::NotFound { .. } => error.with_status(404),
            AssetError::Fetch {
                status: Some(status),
                ..
            } => error.with_status(*status),
            _ => error,
        }
    }
}

#[async_trait]
pub trait AssetSource: Send + Sync {
    /// Fetch the JSON document stored at `path` (e.g. `content/footer.json`).
    async fn fetch(&self, path: &str) -> Result<Value, AssetError>;
}

/// Fetch an optional site asset: a missing document is an empty object.
pub async fn fetch_optional(source: &dyn AssetSource, path: &str) -> Result<Value, AssetError> {
    match source.fetch(path).await {
        Ok(value) => Ok(value),
        Err(AssetError::NotFound { .. }) => Ok(Value::Object(Default::default())),
        Err(err) => Err(err),
    }
}

/// Reject paths that could escape the asset root.
pub fn validate_asset_path(path: &str) -> Result<&str, AssetError> {
    let trimmed = path.trim_start_matches('/');
    let escapes = trimmed.is_empty()
        || trimmed
            .split('/')
            .any(|segment| segment.is_empty() || segment == "." || segment == "..");
    if escapes || trimmed.contains('\\') {
        return Err(AssetError::InvalidPath {
            path: path.to_string(),
        });
    }
    Ok(trimmed)
}
