use std::sync::Arc;

use serde_json::Value;
use tracing::{info, warn};

use crate::application::assets::AssetSource;
use crate::application::listings::{
    ListingImageConfig, ListingsApi, ListingsState, MarketplaceEntities, load_data, query_listings,
};
use crate::application::page::{HostedAssetsStore, PageBuilder, PageOutput, PageState};
use crate::application::sections::builtin::{FEATURES, FeaturesSection, column_layout};
use crate::application::sections::{
    SectionOverrides, SectionRegistry, SectionRenderError, SectionRenderer,
};
use crate::domain::listings::Listing;
use crate::domain::navigation::CurrentUser;
use crate::domain::sections::{PageAssetsData, SectionDescriptor};
use crate::presentation::views::{
    ListingCardView, ListingCarouselTemplate, TemplateRenderError, render_template,
};

pub const ASSET_NAME: &str = "landing-page";
pub const USER_SECTION_ID: &str = "authenticated-user";
pub const USER_SECTION_TYPE: &str = "customUser";
const USER_SECTION_POSITION: usize = 2;
const LISTINGS_CONTAINER_ID: &str = "listings-carousel-container";
const LISTINGS_SLIDER_ID: &str = "listings-slider";
const CAROUSEL_PANEL_WIDTH: f64 = 62.5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LandingConfig {
    pub asset_name: String,
    pub page_size: u32,
    pub carousel_columns: u64,
    pub listing_image: ListingImageConfig,
}

impl Default for LandingConfig {
    fn default() -> Self {
        Self {
            asset_name: ASSET_NAME.to_string(),
            page_size: crate::application::listings::RESULT_PAGE_SIZE,
            carousel_columns: 2,
            listing_image: ListingImageConfig::default(),
        }
    }
}

/// Section carrying the signed-in user's listings.
pub fn user_section(display_name: Option<&str>, listings: &[Listing]) -> SectionDescriptor {
    let listing_data = serde_json::to_value(listings).unwrap_or_else(|err| {
        warn!(
            target = "storefront::landing",
            error = %err,
            "failed to serialize listings for user section"
        );
        Value::Array(Vec::new())
    });
    let display_name = display_name.map_or(Value::Null, |name| Value::String(name.to_string()));

    SectionDescriptor::new(USER_SECTION_ID, USER_SECTION_TYPE)
        .with_field("displayName", display_name)
        .with_field("listingData", listing_data)
}

/// Landing sections with the user section placed third (or last, for pages
/// with fewer than two sections).
pub fn landing_sections(
    mut page: PageAssetsData,
    user_section: SectionDescriptor,
) -> PageAssetsData {
    let position = USER_SECTION_POSITION.min(page.sections.len());
    page.sections.insert(position, user_section);
    page
}

/// Renderer overrides the landing page layers over the built-ins.
pub fn landing_overrides(carousel_columns: u64) -> SectionOverrides {
    SectionOverrides::new()
        .insert(USER_SECTION_TYPE, ListingCarouselSection::new(carousel_columns))
        .insert(FEATURES, FeaturesSection::with_variant("landing"))
}

/// Responsive size hints for listing cards inside the landing carousel panel.
fn card_render_sizes() -> String {
    [
        "(max-width: 767px) 100vw".to_string(),
        format!("(max-width: 1920px) {}vw", CAROUSEL_PANEL_WIDTH / 2.0),
        format!("{}vw", CAROUSEL_PANEL_WIDTH / 3.0),
    ]
    .join(", ")
}

/// Horizontal carousel of listing cards.
#[derive(Debug, Clone, Copy)]
pub struct ListingCarouselSection {
    num_columns: u64,
}

impl ListingCarouselSection {
    pub fn new(num_columns: u64) -> Self {
        Self { num_columns }
    }
}

impl SectionRenderer for ListingCarouselSection {
    fn render(&self, section: &SectionDescriptor) -> Result<String, SectionRenderError> {
        let listings: Vec<Listing> = section
            .field_as("listingData")
            .map_err(|err| SectionRenderError::invalid_field("listingData", err))?
            .unwrap_or_default();

        let cards = listings
            .iter()
            .map(|listing| ListingCardView {
                id: listing.id.uuid.to_string(),
                title: listing.attributes.title.clone(),
                price: listing.attributes.price.as_ref().map(|price| price.formatted()),
                href: format!("/l/{}", listing.id.uuid),
            })
            .collect::<Vec<_>>();

        let template = ListingCarouselTemplate {
            section_id: section.section_id.clone(),
            container_id: LISTINGS_CONTAINER_ID,
            slider_id: LISTINGS_SLIDER_ID,
            display_name: section.text("displayName"),
            column_class: column_layout(self.num_columns).class,
            render_sizes: card_render_sizes(),
            not_enough_blocks: (cards.len() as u64) <= self.num_columns,
            cards,
        };
        Ok(render_template(&template)?)
    }
}

/// Everything the landing page needs for one navigation.
#[derive(Debug, Clone, PartialEq)]
pub struct LandingPageData {
    pub page: PageState,
    pub listings: Vec<Listing>,
    pub listings_state: ListingsState,
}

/// Loads and renders the landing page.
pub struct LandingPageService {
    assets: Arc<dyn AssetSource>,
    listings_api: Option<Arc<dyn ListingsApi>>,
    store: HostedAssetsStore,
    builder: PageBuilder,
    config: LandingConfig,
}

impl LandingPageService {
    pub fn new(
        assets: Arc<dyn AssetSource>,
        listings_api: Option<Arc<dyn ListingsApi>>,
        registry: &SectionRegistry,
        config: LandingConfig,
    ) -> Self {
        let registry = registry.with_overrides(&landing_overrides(config.carousel_columns));
        Self {
            assets,
            listings_api,
            store: HostedAssetsStore::new(),
            builder: PageBuilder::new(registry),
            config,
        }
    }

    /// Fetch the landing asset and the listings for `search` concurrently.
    pub async fn load(&self, search: &str) -> LandingPageData {
        let page = self.store.load(self.assets.as_ref(), &self.config.asset_name);
        let listings = self.load_listings(search);
        let (page, (listings, listings_state)) = tokio::join!(page, listings);

        LandingPageData {
            page,
            listings,
            listings_state,
        }
    }

    async fn load_listings(&self, search: &str) -> (Vec<Listing>, ListingsState) {
        let mut state = ListingsState::default();
        let Some(api) = self.listings_api.as_ref() else {
            info!(
                target = "storefront::landing",
                "no listings API configured; landing carousel stays empty"
            );
            return (Vec::new(), state);
        };

        let query = load_data(search, &self.config.listing_image, self.config.page_size);
        let mut entities = MarketplaceEntities::new();
        // Failures are kept in `state`; the page still renders without listings.
        let _ = query_listings(api.as_ref(), query, &mut state, &mut entities).await;
        let listings = entities.listings_by_id(&state.result_ids);
        (listings, state)
    }

    pub fn render(
        &self,
        data: &LandingPageData,
        current_user: Option<&CurrentUser>,
    ) -> Result<PageOutput, TemplateRenderError> {
        let display_name = current_user.map(|user| user.profile.display_name.as_str());
        let section = user_section(display_name, &data.listings);
        let state = data
            .page
            .clone()
            .map_data(|page| landing_sections(page, section));
        self.builder.render(&state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::listings::{ListingAttributes, ListingId, Money};
    use serde_json::json;
    use uuid::Uuid;

    fn listing(n: u128) -> Listing {
        Listing {
            id: ListingId::new(Uuid::from_u128(n)),
            attributes: ListingAttributes {
                title: format!("Item {n}"),
                description: None,
                price: Some(Money {
                    amount: 1200,
                    currency: "USD".into(),
                }),
            },
        }
    }

    fn page(count: usize) -> PageAssetsData {
        PageAssetsData {
            sections: (0..count)
                .map(|i| SectionDescriptor::new(format!("s{i}"), "hero"))
                .collect(),
        }
    }

    fn ids(page: &PageAssetsData) -> Vec<&str> {
        page.sections.iter().map(|s| s.section_id.as_str()).collect()
    }

    #[test]
    fn user_section_is_inserted_third() {
        let sections = landing_sections(page(4), user_section(None, &[]));
        assert_eq!(ids(&sections), vec!["s0", "s1", USER_SECTION_ID, "s2", "s3"]);
    }

    #[test]
    fn short_pages_get_user_section_last() {
        let sections = landing_sections(page(1), user_section(None, &[]));
        assert_eq!(ids(&sections), vec!["s0", USER_SECTION_ID]);
    }

    #[test]
    fn render_sizes_follow_panel_width() {
        assert_eq!(
            card_render_sizes(),
            "(max-width: 767px) 100vw, (max-width: 1920px) 31.25vw, 20.833333333333332vw"
        );
    }

    #[test]
    fn carousel_renders_cards_and_flags_short_lists() {
        let section = user_section(Some("Ada"), &[listing(1)]);
        let html = ListingCarouselSection::new(2)
            .render(&section)
            .expect("carousel html");

        assert!(html.contains(r#"id="authenticated-user""#), "{html}");
        assert!(html.contains("not-enough-blocks"), "{html}");
        assert!(html.contains(r#"class="two-columns""#), "{html}");
        assert!(html.contains("12.00 USD"), "{html}");
        assert!(html.contains("Ada"), "{html}");

        let section = user_section(None, &[listing(1), listing(2), listing(3)]);
        let html = ListingCarouselSection::new(2)
            .render(&section)
            .expect("carousel html");
        assert!(!html.contains("not-enough-blocks"), "{html}");
    }

    #[test]
    fn carousel_rejects_malformed_listing_data() {
        let section = SectionDescriptor::new(USER_SECTION_ID, USER_SECTION_TYPE)
            .with_field("listingData", json!([{ "id": 1 }]));
        let err = ListingCarouselSection::new(2)
            .render(&section)
            .expect_err("invalid listing data");
        assert!(matches!(
            err,
            SectionRenderError::InvalidField {
                field: "listingData",
                ..
            }
        ));
    }

    #[test]
    fn landing_overrides_replace_features_variant() {
        let registry = SectionRegistry::builtin().with_overrides(&landing_overrides(2));
        let section = SectionDescriptor::new("f", FEATURES);
        let html = registry
            .get(FEATURES)
            .expect("features renderer")
            .render(&section)
            .expect("features html");
        assert!(html.contains("features-landing"), "{html}");
        assert!(registry.contains(USER_SECTION_TYPE));
    }
}
