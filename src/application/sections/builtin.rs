//! Section types every page can use without registering anything.

use std::sync::Arc;

use serde_json::Value;

use crate::domain::sections::{SectionDescriptor, SectionLink, text_content};
use crate::presentation::views::{
    ArticleSectionTemplate, BlockView, CarouselSectionTemplate, ColumnsSectionTemplate,
    FeaturesSectionTemplate, FooterSectionTemplate, HeroSectionTemplate, render_template,
};

use super::registry::{SectionRenderError, SectionRenderer};

pub const HERO: &str = "hero";
pub const ARTICLE: &str = "article";
pub const COLUMNS: &str = "columns";
pub const FEATURES: &str = "features";
pub const CAROUSEL: &str = "carousel";
pub const FOOTER: &str = "footer";

pub(crate) fn renderers() -> Vec<(&'static str, Arc<dyn SectionRenderer>)> {
    vec![
        entry(HERO, HeroSection),
        entry(ARTICLE, ArticleSection),
        entry(COLUMNS, ColumnsSection),
        entry(FEATURES, FeaturesSection::default()),
        entry(CAROUSEL, CarouselSection),
        entry(FOOTER, FooterSection),
    ]
}

fn entry(
    section_type: &'static str,
    renderer: impl SectionRenderer + 'static,
) -> (&'static str, Arc<dyn SectionRenderer>) {
    (section_type, Arc::new(renderer))
}

/// Column layout shared by grid and carousel sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnLayout {
    pub class: &'static str,
    pub image_sizes: &'static str,
}

const COLUMN_LAYOUTS: [ColumnLayout; 4] = [
    ColumnLayout {
        class: "one-column",
        image_sizes: "(max-width: 767px) 100vw, 1200px",
    },
    ColumnLayout {
        class: "two-columns",
        image_sizes: "(max-width: 767px) 100vw, 600px",
    },
    ColumnLayout {
        class: "three-columns",
        image_sizes: "(max-width: 767px) 100vw, 400px",
    },
    ColumnLayout {
        class: "four-columns",
        image_sizes: "(max-width: 767px) 100vw, 290px",
    },
];

/// Layout for `num_columns`; anything outside 1..=4 gets the single-column layout.
pub fn column_layout(num_columns: u64) -> ColumnLayout {
    num_columns
        .checked_sub(1)
        .and_then(|index| usize::try_from(index).ok())
        .and_then(|index| COLUMN_LAYOUTS.get(index).copied())
        .unwrap_or(COLUMN_LAYOUTS[0])
}

fn num_columns(section: &SectionDescriptor) -> u64 {
    section
        .field("numColumns")
        .and_then(Value::as_u64)
        .unwrap_or(1)
}

fn call_to_action(section: &SectionDescriptor) -> Option<SectionLink> {
    section.field("callToAction").and_then(SectionLink::from_value)
}

/// Blocks of a section. Entries that are not objects are rejected.
pub(crate) fn blocks(section: &SectionDescriptor) -> Result<Vec<BlockView>, SectionRenderError> {
    let Some(value) = section.field("blocks") else {
        return Ok(Vec::new());
    };
    let Some(entries) = value.as_array() else {
        return Err(SectionRenderError::custom(format!(
            "section `{}` has non-array `blocks`",
            section.section_id
        )));
    };

    entries
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            let object = entry.as_object().ok_or_else(|| {
                SectionRenderError::custom(format!(
                    "block {index} of section `{}` is not an object",
                    section.section_id
                ))
            })?;
            let block_id = object
                .get("blockId")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| format!("{}-block-{index}", section.section_id));
            Ok(BlockView {
                block_id,
                title: object.get("title").and_then(text_content),
                text: object.get("text").and_then(text_content),
                call_to_action: object.get("callToAction").and_then(SectionLink::from_value),
            })
        })
        .collect()
}

#[derive(Debug, Default, Clone, Copy)]
pub struct HeroSection;

impl SectionRenderer for HeroSection {
    fn render(&self, section: &SectionDescriptor) -> Result<String, SectionRenderError> {
        let template = HeroSectionTemplate {
            section_id: section.section_id.clone(),
            title: section.text("title"),
            description: section.text("description"),
            call_to_action: call_to_action(section),
        };
        Ok(render_template(&template)?)
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ArticleSection;

impl SectionRenderer for ArticleSection {
    fn render(&self, section: &SectionDescriptor) -> Result<String, SectionRenderError> {
        let template = ArticleSectionTemplate {
            section_id: section.section_id.clone(),
            title: section.text("title"),
            description: section.text("description"),
            blocks: blocks(section)?,
        };
        Ok(render_template(&template)?)
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ColumnsSection;

impl SectionRenderer for ColumnsSection {
    fn render(&self, section: &SectionDescriptor) -> Result<String, SectionRenderError> {
        let template = ColumnsSectionTemplate {
            section_id: section.section_id.clone(),
            title: section.text("title"),
            description: section.text("description"),
            column_class: column_layout(num_columns(section)).class,
            blocks: blocks(section)?,
        };
        Ok(render_template(&template)?)
    }
}

/// Features section. The variant only changes the CSS hook, so page-specific
/// flavours register another instance under the same type.
#[derive(Debug, Clone, Copy)]
pub struct FeaturesSection {
    variant: &'static str,
}

impl FeaturesSection {
    pub const fn with_variant(variant: &'static str) -> Self {
        Self { variant }
    }
}

impl Default for FeaturesSection {
    fn default() -> Self {
        Self::with_variant("default")
    }
}

impl SectionRenderer for FeaturesSection {
    fn render(&self, section: &SectionDescriptor) -> Result<String, SectionRenderError> {
        let template = FeaturesSectionTemplate {
            section_id: section.section_id.clone(),
            variant: self.variant,
            title: section.text("title"),
            description: section.text("description"),
            blocks: blocks(section)?,
        };
        Ok(render_template(&template)?)
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct CarouselSection;

impl SectionRenderer for CarouselSection {
    fn render(&self, section: &SectionDescriptor) -> Result<String, SectionRenderError> {
        let layout = column_layout(num_columns(section));
        let template = CarouselSectionTemplate {
            section_id: section.section_id.clone(),
            title: section.text("title"),
            description: section.text("description"),
            column_class: layout.class,
            image_sizes: layout.image_sizes,
            blocks: blocks(section)?,
        };
        Ok(render_template(&template)?)
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct FooterSection;

impl SectionRenderer for FooterSection {
    fn render(&self, section: &SectionDescriptor) -> Result<String, SectionRenderError> {
        let (logo_href, logo_external) = match section.field("linkLogoToExternalSite") {
            Some(Value::String(href)) if !href.trim().is_empty() => {
                (href.trim().to_string(), true)
            }
            Some(value) if value.is_object() => SectionLink::from_value(value)
                .map(|link| (link.href, link.external))
                .unwrap_or_else(|| ("/".to_string(), false)),
            _ => ("/".to_string(), false),
        };

        let social_links = match section.field("socialMediaLinks") {
            Some(Value::Array(entries)) => {
                entries.iter().filter_map(SectionLink::from_value).collect()
            }
            _ => Vec::new(),
        };

        let template = FooterSectionTemplate {
            section_id: section.section_id.clone(),
            logo_href,
            logo_external,
            slogan: section.text("slogan"),
            copyright: section.text("copyright"),
            social_links,
            column_class: column_layout(num_columns(section)).class,
            blocks: blocks(section)?,
        };
        Ok(render_template(&template)?)
    }
}
