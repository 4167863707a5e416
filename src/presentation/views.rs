use askama::{Error as AskamaError, Template};
use thiserror::Error;

use crate::application::sections::RenderedSection;
use crate::domain::error::StorableError;
use crate::domain::sections::SectionLink;

#[derive(Debug, Error)]
#[error("{public_message}")]
pub struct TemplateRenderError {
    pub(crate) source: &'static str,
    pub(crate) public_message: &'static str,
    #[source]
    pub(crate) error: AskamaError,
}

impl TemplateRenderError {
    pub fn new(source: &'static str, public_message: &'static str, error: AskamaError) -> Self {
        Self {
            source,
            public_message,
            error,
        }
    }

    pub fn origin(&self) -> &'static str {
        self.source
    }
}

pub fn render_template<T: Template>(template: &T) -> Result<String, TemplateRenderError> {
    template.render().map_err(|err| {
        TemplateRenderError::new(
            "presentation::views::render_template",
            "Template rendering failed",
            err,
        )
    })
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlockView {
    pub block_id: String,
    pub title: Option<String>,
    pub text: Option<String>,
    pub call_to_action: Option<SectionLink>,
}

#[derive(Template)]
#[template(path = "sections/hero.html")]
pub struct HeroSectionTemplate {
    pub section_id: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub call_to_action: Option<SectionLink>,
}

#[derive(Template)]
#[template(path = "sections/article.html")]
pub struct ArticleSectionTemplate {
    pub section_id: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub blocks: Vec<BlockView>,
}

#[derive(Template)]
#[template(path = "sections/columns.html")]
pub struct ColumnsSectionTemplate {
    pub section_id: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub column_class: &'static str,
    pub blocks: Vec<BlockView>,
}

#[derive(Template)]
#[template(path = "sections/features.html")]
pub struct FeaturesSectionTemplate {
    pub section_id: String,
    pub variant: &'static str,
    pub title: Option<String>,
    pub description: Option<String>,
    pub blocks: Vec<BlockView>,
}

#[derive(Template)]
#[template(path = "sections/carousel.html")]
pub struct CarouselSectionTemplate {
    pub section_id: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub column_class: &'static str,
    pub image_sizes: &'static str,
    pub blocks: Vec<BlockView>,
}

#[derive(Template)]
#[template(path = "sections/footer.html")]
pub struct FooterSectionTemplate {
    pub section_id: String,
    pub logo_href: String,
    pub logo_external: bool,
    pub slogan: Option<String>,
    pub copyright: Option<String>,
    pub social_links: Vec<SectionLink>,
    pub column_class: &'static str,
    pub blocks: Vec<BlockView>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ListingCardView {
    pub id: String,
    pub title: String,
    pub price: Option<String>,
    pub href: String,
}

#[derive(Template)]
#[template(path = "sections/listing_carousel.html")]
pub struct ListingCarouselTemplate {
    pub section_id: String,
    pub container_id: &'static str,
    pub slider_id: &'static str,
    pub display_name: Option<String>,
    pub column_class: &'static str,
    pub render_sizes: String,
    pub not_enough_blocks: bool,
    pub cards: Vec<ListingCardView>,
}

#[derive(Template)]
#[template(path = "sections/unsupported.html")]
pub struct UnsupportedSectionTemplate {
    pub section_id: String,
    pub section_type: String,
    pub reason: &'static str,
}

#[derive(Template)]
#[template(path = "page.html")]
pub struct PageTemplate<'a> {
    pub loading: bool,
    pub sections: &'a [RenderedSection],
}

#[derive(Template)]
#[template(path = "fallback_page.html")]
pub struct FallbackPageTemplate<'a> {
    pub error: Option<&'a StorableError>,
}

#[derive(Template)]
#[template(path = "footer_wrapper.html")]
pub struct FooterWrapperTemplate<'a> {
    pub sections: &'a [RenderedSection],
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MenuLinkView {
    pub key: String,
    pub text: String,
    pub href: String,
    pub current: bool,
    pub external: bool,
}

#[derive(Template)]
#[template(path = "topbar/mobile_menu.html")]
pub struct MobileMenuTemplate<'a> {
    pub open: bool,
    pub open_href: &'a str,
    pub close_href: &'a str,
    pub custom_links: &'a [MenuLinkView],
    pub category_links: &'a [MenuLinkView],
}

#[derive(Template)]
#[template(path = "topbar/profile_menu.html")]
pub struct ProfileMenuTemplate<'a> {
    pub greeting: &'a str,
    pub notification_count: u32,
    pub items: &'a [MenuLinkView],
}
