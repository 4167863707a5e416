use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Listing identifier as the marketplace API encodes it: `{ "uuid": "..." }`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ListingId {
    pub uuid: Uuid,
}

impl ListingId {
    pub fn new(uuid: Uuid) -> Self {
        Self { uuid }
    }
}

/// Amount in minor units (cents).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    pub amount: i64,
    pub currency: String,
}

impl Money {
    pub fn formatted(&self) -> String {
        let sign = if self.amount < 0 { "-" } else { "" };
        let abs = self.amount.unsigned_abs();
        format!("{sign}{}.{:02} {}", abs / 100, abs % 100, self.currency)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingAttributes {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<Money>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub id: ListingId,
    pub attributes: ListingAttributes,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub total_items: u64,
    pub total_pages: u64,
    pub page: u64,
    pub per_page: u64,
}

/// Body of a listings query response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingsResponse {
    pub data: Vec<Listing>,
    #[serde(default)]
    pub meta: Option<Pagination>,
}

impl ListingsResponse {
    pub fn result_ids(&self) -> Vec<ListingId> {
        self.data.iter().map(|listing| listing.id).collect()
    }
}
