use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::application::assets::{AssetSource, page_asset_path};
use crate::application::sections::{Composition, SectionRegistry, resolve_sections};
use crate::domain::error::StorableError;
use crate::domain::sections::{PageAssetsData, SectionDescriptor};
use crate::presentation::views::{
    FallbackPageTemplate, PageTemplate, TemplateRenderError, render_template,
};

/// Content state of the page for the current navigation.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum PageState {
    #[default]
    Loading,
    Ready(PageAssetsData),
    Errored(StorableError),
}

impl PageState {
    pub fn from_result(result: Result<PageAssetsData, StorableError>) -> Self {
        match result {
            Ok(data) => PageState::Ready(data),
            Err(error) => PageState::Errored(error),
        }
    }

    pub fn data(&self) -> Option<&PageAssetsData> {
        match self {
            PageState::Ready(data) => Some(data),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&StorableError> {
        match self {
            PageState::Errored(error) => Some(error),
            _ => None,
        }
    }

    /// Transform ready data, leaving loading and errored states as they are.
    pub fn map_data(self, f: impl FnOnce(PageAssetsData) -> PageAssetsData) -> Self {
        match self {
            PageState::Ready(data) => PageState::Ready(f(data)),
            other => other,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PageOutput {
    Loading { html: String },
    Composed { composition: Composition, html: String },
    Fallback { error: StorableError, html: String },
}

impl PageOutput {
    pub fn html(&self) -> &str {
        match self {
            PageOutput::Loading { html }
            | PageOutput::Composed { html, .. }
            | PageOutput::Fallback { html, .. } => html,
        }
    }
}

/// Renders a whole page from its [`PageState`].
#[derive(Debug, Clone)]
pub struct PageBuilder {
    registry: SectionRegistry,
}

impl PageBuilder {
    pub fn new(registry: SectionRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &SectionRegistry {
        &self.registry
    }

    pub fn compose(&self, sections: Option<&[SectionDescriptor]>) -> Composition {
        resolve_sections(sections, &self.registry)
    }

    pub fn render(&self, state: &PageState) -> Result<PageOutput, TemplateRenderError> {
        match state {
            PageState::Loading => {
                let html = render_template(&PageTemplate {
                    loading: true,
                    sections: &[],
                })?;
                Ok(PageOutput::Loading { html })
            }
            PageState::Ready(data) => {
                let composition = self.compose(Some(&data.sections));
                let html = render_template(&PageTemplate {
                    loading: false,
                    sections: &composition.sections,
                })?;
                Ok(PageOutput::Composed { composition, html })
            }
            PageState::Errored(error) => {
                let html = render_template(&FallbackPageTemplate { error: Some(error) })?;
                Ok(PageOutput::Fallback {
                    error: error.clone(),
                    html,
                })
            }
        }
    }
}

/// Proof that a navigation was started; completing requires the ticket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationTicket {
    generation: u64,
    asset_name: String,
}

impl NavigationTicket {
    pub fn asset_name(&self) -> &str {
        &self.asset_name
    }
}

#[derive(Debug, Default)]
struct StoreInner {
    generation: u64,
    state: PageState,
}

/// Page content for the most recent navigation.
///
/// Each navigation resets the state to `Loading`. Results for an older
/// navigation are dropped when they arrive, so the last navigation wins
/// regardless of the order in which fetches finish.
#[derive(Debug, Default)]
pub struct HostedAssetsStore {
    inner: RwLock<StoreInner>,
}

impl HostedAssetsStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn begin_navigation(&self, asset_name: impl Into<String>) -> NavigationTicket {
        let mut inner = self.inner.write().await;
        inner.generation += 1;
        inner.state = PageState::Loading;
        let ticket = NavigationTicket {
            generation: inner.generation,
            asset_name: asset_name.into(),
        };
        debug!(
            target = "storefront::page",
            generation = ticket.generation,
            asset = %ticket.asset_name,
            "navigation started"
        );
        ticket
    }

    /// Apply a fetch outcome. Returns `false` when the ticket is stale.
    pub async fn complete(
        &self,
        ticket: &NavigationTicket,
        outcome: Result<PageAssetsData, StorableError>,
    ) -> bool {
        let mut inner = self.inner.write().await;
        if inner.generation != ticket.generation {
            debug!(
                target = "storefront::page",
                generation = ticket.generation,
                current = inner.generation,
                asset = %ticket.asset_name,
                "dropping result of superseded navigation"
            );
            return false;
        }
        inner.state = PageState::from_result(outcome);
        true
    }

    pub async fn state(&self) -> PageState {
        self.inner.read().await.state.clone()
    }

    /// Start a navigation to `asset_name`, fetch it, and return the page state
    /// as it stands afterwards (which reflects a newer navigation if one
    /// started in the meantime).
    pub async fn load(&self, source: &dyn AssetSource, asset_name: &str) -> PageState {
        let ticket = self.begin_navigation(asset_name).await;
        let outcome = fetch_page_assets(source, asset_name).await;
        self.complete(&ticket, outcome).await;
        self.state().await
    }
}

/// Fetch and parse the page asset called `asset_name`.
pub async fn fetch_page_assets(
    source: &dyn AssetSource,
    asset_name: &str,
) -> Result<PageAssetsData, StorableError> {
    let path = page_asset_path(asset_name);
    let value = source.fetch(&path).await.map_err(|err| {
        warn!(
            target = "storefront::page",
            asset = %asset_name,
            error = %err,
            "failed to fetch page asset"
        );
        err.to_storable()
    })?;

    let data = PageAssetsData::from_asset(value).map_err(|err| {
        warn!(
            target = "storefront::page",
            asset = %asset_name,
            error = %err,
            "page asset has unexpected shape"
        );
        StorableError::from_error("AssetError", &err)
    })?;

    info!(
        target = "storefront::page",
        asset = %asset_name,
        sections = data.sections.len(),
        "page asset loaded"
    );
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::sections::{SectionRenderError, SectionOutcome};
    use serde_json::json;

    fn builder() -> PageBuilder {
        PageBuilder::new(SectionRegistry::empty().with_renderer(
            "hero",
            |section: &SectionDescriptor| -> Result<String, SectionRenderError> {
                Ok(format!("<h1>{}</h1>", section.text("title").unwrap_or_default()))
            },
        ))
    }

    fn ready() -> PageState {
        PageState::Ready(
            PageAssetsData::from_asset(json!({
                "sections": [
                    { "sectionId": "s1", "sectionType": "hero", "title": "Welcome" },
                    { "sectionId": "s2", "sectionType": "mystery" }
                ]
            }))
            .expect("page data"),
        )
    }

    #[test]
    fn ready_state_composes_sections() {
        let output = builder().render(&ready()).expect("render");
        let PageOutput::Composed { composition, html } = output else {
            panic!("expected composed output");
        };
        assert_eq!(composition.section_ids(), vec!["s1", "s2"]);
        assert_eq!(composition.sections[1].outcome, SectionOutcome::Fallback);
        assert!(html.contains("<h1>Welcome</h1>"), "{html}");
        assert!(html.contains(r#"data-section-id="s2""#), "{html}");
    }

    #[test]
    fn errored_state_renders_fallback_page() {
        let error = StorableError::new("AssetError", "asset missing").with_status(404);
        let output = builder()
            .render(&PageState::Errored(error.clone()))
            .expect("render");
        let PageOutput::Fallback { error: carried, html } = output else {
            panic!("expected fallback output");
        };
        assert_eq!(carried, error);
        assert!(html.contains("asset missing"), "{html}");
    }

    #[test]
    fn loading_state_renders_empty_shell() {
        let output = builder().render(&PageState::Loading).expect("render");
        assert!(matches!(output, PageOutput::Loading { .. }));
        assert!(output.html().contains("page-loading"));
    }

    #[test]
    fn map_data_only_touches_ready_state() {
        let mapped = ready().map_data(|mut data| {
            data.sections.truncate(1);
            data
        });
        assert_eq!(mapped.data().map(|data| data.sections.len()), Some(1));

        let errored = PageState::Errored(StorableError::new("E", "x")).map_data(|data| data);
        assert!(errored.error().is_some());
    }

    #[tokio::test]
    async fn stale_navigation_results_are_ignored() {
        let store = HostedAssetsStore::new();
        let first = store.begin_navigation("landing-page").await;
        let second = store.begin_navigation("about").await;

        let applied = store
            .complete(&first, Ok(PageAssetsData::default()))
            .await;
        assert!(!applied);
        assert_eq!(store.state().await, PageState::Loading);

        let error = StorableError::new("AssetError", "missing");
        assert!(store.complete(&second, Err(error.clone())).await);
        assert_eq!(store.state().await, PageState::Errored(error));
        assert_eq!(second.asset_name(), "about");
    }
}
