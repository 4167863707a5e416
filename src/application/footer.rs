use serde_json::{Map, Value};
use tracing::debug;

use crate::application::sections::builtin::FOOTER;
use crate::application::sections::{SectionRegistry, resolve_sections};
use crate::domain::sections::SectionDescriptor;
use crate::presentation::views::{FooterWrapperTemplate, TemplateRenderError, render_template};

pub const FOOTER_SECTION_ID: &str = "footer";

/// Footer section built from the hosted footer asset.
///
/// The asset carries no section identity of its own, so id and type are
/// assigned here. An empty or non-object asset means the marketplace has no
/// footer.
pub fn footer_section(footer: &Value, topbar: &Value) -> Option<SectionDescriptor> {
    let fields: &Map<String, Value> = footer.as_object().filter(|object| !object.is_empty())?;

    let mut section = SectionDescriptor::new(FOOTER_SECTION_ID, FOOTER);
    section.fields = fields.clone();
    section.fields.remove("sectionId");
    section.fields.remove("sectionType");
    if let Some(logo_link) = topbar.get("logoLink").filter(|value| !value.is_null()) {
        section
            .fields
            .insert("linkLogoToExternalSite".to_string(), logo_link.clone());
    }
    Some(section)
}

/// Render the footer through `registry`, or `None` when there is no footer.
pub fn render_footer(
    footer: &Value,
    topbar: &Value,
    registry: &SectionRegistry,
) -> Result<Option<String>, TemplateRenderError> {
    let Some(section) = footer_section(footer, topbar) else {
        debug!(target = "storefront::footer", "footer asset empty; skipping footer");
        return Ok(None);
    };

    let sections = [section];
    let composition = resolve_sections(Some(&sections), registry);
    render_template(&FooterWrapperTemplate {
        sections: &composition.sections,
    })
    .map(Some)
}
