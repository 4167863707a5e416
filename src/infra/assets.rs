//! Hosted asset sources backed by a local directory or an HTTP origin.

use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde_json::Value;
use tracing::debug;

use crate::application::assets::{AssetError, AssetSource, validate_asset_path};
use crate::infra::error::InfraError;

/// Serves asset documents from files under `root`.
#[derive(Debug, Clone)]
pub struct DirectoryAssetSource {
    root: PathBuf,
}

impl DirectoryAssetSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl AssetSource for DirectoryAssetSource {
    async fn fetch(&self, path: &str) -> Result<Value, AssetError> {
        let relative = validate_asset_path(path)?;
        let file = self.root.join(relative);

        let bytes = match tokio::fs::read(&file).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!(
                    target = "storefront::infra::assets",
                    path = %relative,
                    "asset file missing"
                );
                return Err(AssetError::NotFound {
                    path: relative.to_string(),
                });
            }
            Err(err) => return Err(AssetError::fetch(relative, None, err.to_string())),
        };

        serde_json::from_slice(&bytes).map_err(|source| AssetError::Decode {
            path: relative.to_string(),
            source,
        })
    }
}

/// Fetches asset documents relative to a base URL.
#[derive(Debug, Clone)]
pub struct HttpAssetSource {
    client: Client,
    base: Url,
}

impl HttpAssetSource {
    pub fn new(base: &str) -> Result<Self, InfraError> {
        let base = directory_url(base, "assets")?;
        let client = Client::builder().user_agent(user_agent()).build()?;
        Ok(Self { client, base })
    }
}

/// Parse `base` so that relative joins land underneath its path.
pub(crate) fn directory_url(base: &str, what: &str) -> Result<Url, InfraError> {
    let mut url = Url::parse(base)
        .map_err(|err| InfraError::configuration(format!("invalid {what} URL `{base}`: {err}")))?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

pub(crate) fn user_agent() -> &'static str {
    concat!("storefront/", env!("CARGO_PKG_VERSION"))
}

#[async_trait]
impl AssetSource for HttpAssetSource {
    async fn fetch(&self, path: &str) -> Result<Value, AssetError> {
        let relative = validate_asset_path(path)?;
        let url = self
            .base
            .join(relative)
            .map_err(|err| AssetError::fetch(relative, None, err.to_string()))?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|err| AssetError::fetch(relative, None, err.to_string()))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(AssetError::NotFound {
                path: relative.to_string(),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|err| AssetError::fetch(relative, Some(status.as_u16()), err.to_string()))?;
        if !status.is_success() {
            let body = String::from_utf8_lossy(&bytes).into_owned();
            return Err(AssetError::fetch(
                relative,
                Some(status.as_u16()),
                format!("status {status} body {body}"),
            ));
        }

        serde_json::from_slice(&bytes).map_err(|source| AssetError::Decode {
            path: relative.to_string(),
            source,
        })
    }
}
