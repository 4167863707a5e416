use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use storefront::application::assets::{AssetSource, FOOTER_ASSET_PATH, fetch_optional};
use storefront::application::footer::render_footer;
use storefront::application::landing::{LandingConfig, LandingPageService, USER_SECTION_ID};
use storefront::application::listings::{ListingsApi, ListingsApiError, ListingsQuery};
use storefront::application::page::{HostedAssetsStore, PageBuilder, PageOutput, PageState};
use storefront::application::sections::{
    FallbackReason, SectionOverrides, SectionRegistry, SectionRenderError,
};
use storefront::domain::listings::{Listing, ListingAttributes, ListingId, ListingsResponse, Money};
use storefront::domain::navigation::{CurrentUser, UserProfile};
use storefront::domain::sections::SectionDescriptor;
use storefront::infra::assets::DirectoryAssetSource;
use tempfile::TempDir;
use uuid::Uuid;

fn write_asset(root: &Path, relative: &str, contents: &str) {
    let path = root.join(relative);
    std::fs::create_dir_all(path.parent().expect("asset parent")).expect("create asset dirs");
    std::fs::write(path, contents).expect("write asset");
}

fn asset_root() -> TempDir {
    let root = TempDir::new().expect("tempdir");
    write_asset(
        root.path(),
        "content/pages/landing-page.json",
        r#"{
            "data": {
                "sections": [
                    { "sectionId": "hero", "sectionType": "hero", "title": { "content": "Buy and sell" } },
                    { "sectionId": "how", "sectionType": "features", "title": "How it works" },
                    { "sectionId": "map", "sectionType": "interactiveMap" },
                    { "sectionId": "faq", "sectionType": "article", "title": "FAQ" }
                ]
            }
        }"#,
    );
    write_asset(
        root.path(),
        "content/pages/about.json",
        r#"{ "sections": [
            { "sectionId": "a", "sectionType": "hero", "title": "About us" },
            { "sectionId": "b", "sectionType": "unknownWidget" }
        ] }"#,
    );
    write_asset(
        root.path(),
        FOOTER_ASSET_PATH,
        r#"{ "slogan": "Second life for good things", "copyright": "Storefront Ltd" }"#,
    );
    root
}

struct FixedListings(Vec<Listing>);

#[async_trait]
impl ListingsApi for FixedListings {
    async fn query(&self, _: &ListingsQuery) -> Result<ListingsResponse, ListingsApiError> {
        Ok(ListingsResponse {
            data: self.0.clone(),
            meta: None,
        })
    }
}

fn listing(n: u128, title: &str) -> Listing {
    Listing {
        id: ListingId::new(Uuid::from_u128(n)),
        attributes: ListingAttributes {
            title: title.to_string(),
            description: None,
            price: Some(Money {
                amount: 4550,
                currency: "EUR".to_string(),
            }),
        },
    }
}

#[tokio::test]
async fn generic_page_keeps_order_and_falls_back_for_unknown_types() {
    let root = asset_root();
    let source = DirectoryAssetSource::new(root.path());
    let store = HostedAssetsStore::new();

    let state = store.load(&source, "about").await;
    let output = PageBuilder::new(SectionRegistry::builtin())
        .render(&state)
        .expect("render page");

    let PageOutput::Composed { composition, html } = output else {
        panic!("expected composed page");
    };
    assert_eq!(composition.section_ids(), vec!["a", "b"]);
    assert_eq!(composition.diagnostics.len(), 1);
    assert_eq!(composition.diagnostics[0].reason, FallbackReason::UnknownType);
    assert!(html.contains("About us"), "{html}");
    assert!(html.contains(r#"data-section-type="unknownWidget""#), "{html}");
}

#[tokio::test]
async fn missing_page_asset_renders_whole_page_fallback() {
    let root = asset_root();
    let source = DirectoryAssetSource::new(root.path());
    let store = HostedAssetsStore::new();

    let state = store.load(&source, "does-not-exist").await;
    let error = state.error().expect("errored state").clone();
    assert_eq!(error.status, Some(404));

    let output = PageBuilder::new(SectionRegistry::builtin())
        .render(&state)
        .expect("render fallback");
    assert!(matches!(output, PageOutput::Fallback { .. }));
    assert!(output.html().contains("page-fallback"));
}

#[tokio::test]
async fn landing_page_injects_user_section_and_landing_overrides() {
    let root = asset_root();
    let source: Arc<dyn AssetSource> = Arc::new(DirectoryAssetSource::new(root.path()));
    let api: Arc<dyn ListingsApi> = Arc::new(FixedListings(vec![
        listing(1, "Oak chair"),
        listing(2, "Desk lamp"),
        listing(3, "Bookshelf"),
    ]));

    let service = LandingPageService::new(
        source,
        Some(api),
        &SectionRegistry::builtin(),
        LandingConfig::default(),
    );
    let data = service.load("?page=1").await;
    assert_eq!(data.listings.len(), 3);
    assert!(data.listings_state.error.is_none());

    let user = CurrentUser {
        profile: UserProfile {
            display_name: "Ada".to_string(),
            ..UserProfile::default()
        },
    };
    let output = service.render(&data, Some(&user)).expect("render landing");
    let PageOutput::Composed { composition, html } = output else {
        panic!("expected composed landing page");
    };

    insta::assert_snapshot!(
        composition.section_ids().join(","),
        @"hero,how,authenticated-user,map,faq"
    );
    assert_eq!(composition.diagnostics.len(), 1);
    assert_eq!(composition.diagnostics[0].section_id, "map");
    assert!(html.contains("features-landing"), "{html}");
    assert!(html.contains("Oak chair"), "{html}");
    assert!(html.contains("45.50 EUR"), "{html}");
    assert!(html.contains(USER_SECTION_ID), "{html}");
}

#[tokio::test]
async fn landing_page_without_listings_api_still_renders() {
    let root = asset_root();
    let source: Arc<dyn AssetSource> = Arc::new(DirectoryAssetSource::new(root.path()));
    let service = LandingPageService::new(
        source,
        None,
        &SectionRegistry::builtin(),
        LandingConfig::default(),
    );

    let data = service.load("").await;
    assert!(data.listings.is_empty());
    assert!(matches!(data.page, PageState::Ready(_)));

    let output = service.render(&data, None).expect("render landing");
    assert!(output.html().contains("not-enough-blocks"), "{}", output.html());
}

#[tokio::test]
async fn overrides_replace_builtins_without_touching_the_base_registry() {
    let base = SectionRegistry::builtin();
    let overrides = SectionOverrides::new().insert(
        "hero",
        |section: &SectionDescriptor| -> Result<String, SectionRenderError> {
            Ok(format!("<div class=\"custom-hero\">{}</div>", section.section_id))
        },
    );
    let customised = base.with_overrides(&overrides);

    let root = asset_root();
    let source = DirectoryAssetSource::new(root.path());
    let state = HostedAssetsStore::new().load(&source, "about").await;

    let custom_html = PageBuilder::new(customised)
        .render(&state)
        .expect("render")
        .html()
        .to_string();
    let base_html = PageBuilder::new(base)
        .render(&state)
        .expect("render")
        .html()
        .to_string();

    assert!(custom_html.contains("custom-hero"), "{custom_html}");
    assert!(!base_html.contains("custom-hero"), "{base_html}");
}

#[tokio::test]
async fn footer_renders_from_hosted_asset() {
    let root = asset_root();
    let source = DirectoryAssetSource::new(root.path());

    let footer = fetch_optional(&source, FOOTER_ASSET_PATH)
        .await
        .expect("footer asset");
    let topbar = fetch_optional(&source, "content/top-bar.json")
        .await
        .expect("missing topbar is empty");

    let html = render_footer(&footer, &topbar, &SectionRegistry::builtin())
        .expect("render footer")
        .expect("footer present");
    assert!(html.contains("Second life for good things"), "{html}");
    assert!(html.contains("footer-wrapper"), "{html}");
}
