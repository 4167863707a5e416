//! Listings query for the landing page: query construction from the page URL,
//! request state transitions and the marketplace entity store.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use thiserror::Error;
use tracing::{error, info};
use url::form_urlencoded;

use crate::domain::error::StorableError;
use crate::domain::listings::{Listing, ListingId, ListingsResponse, Pagination};

pub const RESULT_PAGE_SIZE: u32 = 42;
const MAX_IMAGE_VARIANT_DIMENSION: u32 = 3072;
const CARD_IMAGE_WIDTH: u32 = 400;
const CARD_IMAGE_WIDTH_2X: u32 = 800;

/// Listing-card image variant settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingImageConfig {
    pub aspect_width: u32,
    pub aspect_height: u32,
    pub variant_prefix: String,
}

impl Default for ListingImageConfig {
    fn default() -> Self {
        Self {
            aspect_width: 1,
            aspect_height: 1,
            variant_prefix: "listing-card".to_string(),
        }
    }
}

impl ListingImageConfig {
    fn aspect_ratio(&self) -> f64 {
        f64::from(self.aspect_height) / f64::from(self.aspect_width.max(1))
    }
}

/// Query parameters for one listings request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingsQuery {
    /// Parameters carried over from the page URL.
    pub extra: BTreeMap<String, String>,
    pub page: u32,
    pub per_page: u32,
    pub include: Vec<String>,
    pub image_fields: Vec<String>,
    pub image_variants: BTreeMap<String, String>,
    pub image_limit: u32,
}

impl ListingsQuery {
    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs: Vec<(String, String)> = self
            .extra
            .iter()
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        pairs.push(("page".into(), self.page.to_string()));
        pairs.push(("perPage".into(), self.per_page.to_string()));
        if !self.include.is_empty() {
            pairs.push(("include".into(), self.include.join(",")));
        }
        if !self.image_fields.is_empty() {
            pairs.push(("fields.image".into(), self.image_fields.join(",")));
        }
        pairs.extend(
            self.image_variants
                .iter()
                .map(|(key, value)| (key.clone(), value.clone())),
        );
        pairs.push(("limit.images".into(), self.image_limit.to_string()));
        pairs
    }

    pub fn to_query_string(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.to_query_pairs())
            .finish()
    }
}

/// `imageVariant.<name>` parameter for a `width`-wide crop, or `None` when the
/// variant would exceed the maximum dimension the image service accepts.
pub fn image_variant(name: &str, width: u32, aspect_ratio: f64) -> Option<(String, String)> {
    let height = (aspect_ratio * f64::from(width)).round();
    if width > MAX_IMAGE_VARIANT_DIMENSION || height > f64::from(MAX_IMAGE_VARIANT_DIMENSION) {
        error!(
            target = "storefront::listings",
            variant = %name,
            width,
            height,
            "image variant exceeds maximum dimension; skipping"
        );
        return None;
    }
    let height = height as u32;
    Some((
        format!("imageVariant.{name}"),
        format!("w:{width};h:{height};fit:crop"),
    ))
}

/// Build the landing listings query from the page URL's search string.
///
/// `page` defaults to 1; `perPage` from the URL is ignored in favour of
/// `page_size`.
pub fn load_data(search: &str, image: &ListingImageConfig, page_size: u32) -> ListingsQuery {
    let mut extra: BTreeMap<String, String> =
        form_urlencoded::parse(search.trim_start_matches('?').as_bytes())
            .map(|(key, value)| (key.into_owned(), value.into_owned()))
            .collect();

    let page = extra
        .remove("page")
        .and_then(|value| value.parse::<u32>().ok())
        .filter(|page| *page > 0)
        .unwrap_or(1);
    extra.remove("perPage");

    let prefix = image.variant_prefix.as_str();
    let prefix_2x = format!("{prefix}-2x");
    let aspect_ratio = image.aspect_ratio();
    let image_variants = [
        image_variant(prefix, CARD_IMAGE_WIDTH, aspect_ratio),
        image_variant(&prefix_2x, CARD_IMAGE_WIDTH_2X, aspect_ratio),
    ]
    .into_iter()
    .flatten()
    .collect();

    ListingsQuery {
        extra,
        page,
        per_page: page_size,
        include: vec!["images".into()],
        image_fields: vec![format!("variants.{prefix}"), format!("variants.{prefix_2x}")],
        image_variants,
        image_limit: 1,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ListingsAction {
    Request { query: ListingsQuery },
    Success { response: ListingsResponse },
    Error(StorableError),
}

/// State of the landing listings query.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ListingsState {
    pub query: Option<ListingsQuery>,
    pub in_progress: bool,
    pub error: Option<StorableError>,
    pub result_ids: Vec<ListingId>,
    pub pagination: Option<Pagination>,
}

impl ListingsState {
    pub fn reduce(self, action: ListingsAction) -> Self {
        match action {
            ListingsAction::Request { query } => Self {
                query: Some(query),
                in_progress: true,
                error: None,
                result_ids: Vec::new(),
                ..self
            },
            ListingsAction::Success { response } => Self {
                result_ids: response.result_ids(),
                pagination: response.meta,
                in_progress: false,
                ..self
            },
            ListingsAction::Error(err) => {
                error!(target = "storefront::listings", error = %err, "listings query failed");
                Self {
                    in_progress: false,
                    error: Some(err),
                    ..self
                }
            }
        }
    }
}

/// Listings fetched so far, by id.
#[derive(Debug, Clone, Default)]
pub struct MarketplaceEntities {
    listings: HashMap<ListingId, Listing>,
}

impl MarketplaceEntities {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_listings(&mut self, response: &ListingsResponse) {
        for listing in &response.data {
            self.listings.insert(listing.id, listing.clone());
        }
    }

    /// Listings for `ids` in the given order; unknown ids are skipped.
    pub fn listings_by_id(&self, ids: &[ListingId]) -> Vec<Listing> {
        ids.iter()
            .filter_map(|id| self.listings.get(id).cloned())
            .collect()
    }
}

#[derive(Debug, Error)]
pub enum ListingsApiError {
    #[error("listings request failed: {0}")]
    Transport(String),
    #[error("listings request returned status {status}: {message}")]
    Status { status: u16, message: String },
    #[error("listings response could not be decoded: {0}")]
    Decode(String),
}

impl ListingsApiError {
    pub fn to_storable(&self) -> StorableError {
        let error = StorableError::from_error("ListingsApiError", self);
        match self {
            ListingsApiError::Status { status, .. } => error.with_status(*status),
            _ => error,
        }
    }
}

#[async_trait]
pub trait ListingsApi: Send + Sync {
    async fn query(&self, query: &ListingsQuery) -> Result<ListingsResponse, ListingsApiError>;
}

/// Run a listings query, recording every transition in `state` and storing
/// the returned listings in `entities`.
pub async fn query_listings(
    api: &dyn ListingsApi,
    query: ListingsQuery,
    state: &mut ListingsState,
    entities: &mut MarketplaceEntities,
) -> Result<ListingsResponse, ListingsApiError> {
    *state = std::mem::take(state).reduce(ListingsAction::Request {
        query: query.clone(),
    });

    match api.query(&query).await {
        Ok(response) => {
            entities.add_listings(&response);
            info!(
                target = "storefront::listings",
                page = query.page,
                results = response.data.len(),
                "listings query succeeded"
            );
            *state = std::mem::take(state).reduce(ListingsAction::Success {
                response: response.clone(),
            });
            Ok(response)
        }
        Err(err) => {
            *state = std::mem::take(state).reduce(ListingsAction::Error(err.to_storable()));
            Err(err)
        }
    }
}
