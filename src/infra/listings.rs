use async_trait::async_trait;
use reqwest::{Client, Url};
use tracing::debug;

use crate::application::listings::{ListingsApi, ListingsApiError, ListingsQuery};
use crate::domain::listings::ListingsResponse;
use crate::infra::assets::{directory_url, user_agent};
use crate::infra::error::InfraError;

const QUERY_PATH: &str = "v1/api/listings/query";

/// Marketplace listings endpoint reached over HTTP.
#[derive(Debug, Clone)]
pub struct HttpListingsApi {
    client: Client,
    base: Url,
}

impl HttpListingsApi {
    pub fn new(base: &str) -> Result<Self, InfraError> {
        let base = directory_url(base, "marketplace API")?;
        let client = Client::builder().user_agent(user_agent()).build()?;
        Ok(Self { client, base })
    }

    fn query_url(&self, query: &ListingsQuery) -> Result<Url, ListingsApiError> {
        let mut url = self
            .base
            .join(QUERY_PATH)
            .map_err(|err| ListingsApiError::Transport(err.to_string()))?;
        url.query_pairs_mut().extend_pairs(query.to_query_pairs());
        Ok(url)
    }
}

#[async_trait]
impl ListingsApi for HttpListingsApi {
    async fn query(&self, query: &ListingsQuery) -> Result<ListingsResponse, ListingsApiError> {
        let url = self.query_url(query)?;
        debug!(target = "storefront::infra::listings", url = %url, "querying listings");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|err| ListingsApiError::Transport(err.to_string()))?;
        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|err| ListingsApiError::Transport(err.to_string()))?;

        if !status.is_success() {
            return Err(ListingsApiError::Status {
                status: status.as_u16(),
                message: String::from_utf8_lossy(&bytes).into_owned(),
            });
        }

        serde_json::from_slice(&bytes).map_err(|err| ListingsApiError::Decode(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::listings::{ListingImageConfig, load_data};

    #[test]
    fn query_url_targets_listings_endpoint() {
        let api = HttpListingsApi::new("https://api.example.com").expect("client");
        let query = load_data("?page=2", &ListingImageConfig::default(), 10);
        let url = api.query_url(&query).expect("url");

        assert_eq!(url.path(), "/v1/api/listings/query");
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert!(pairs.contains(&("page".to_string(), "2".to_string())), "{pairs:?}");
        assert!(pairs.contains(&("perPage".to_string(), "10".to_string())), "{pairs:?}");
    }
}
