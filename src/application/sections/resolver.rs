use metrics::counter;
use tracing::{debug, warn};

use crate::domain::sections::SectionDescriptor;

use super::registry::SectionRegistry;

pub const RENDER_METRIC: &str = "storefront_section_render_total";
pub const FALLBACK_METRIC: &str = "storefront_section_fallback_total";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionOutcome {
    Rendered,
    Fallback,
}

/// One rendered section, keyed by its `sectionId`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedSection {
    pub section_id: String,
    pub section_type: String,
    pub outcome: SectionOutcome,
    pub html: String,
}

impl RenderedSection {
    pub fn is_fallback(&self) -> bool {
        self.outcome == SectionOutcome::Fallback
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FallbackReason {
    UnknownType,
    RenderFailed { message: String },
}

impl FallbackReason {
    pub fn label(&self) -> &'static str {
        match self {
            FallbackReason::UnknownType => "unknown_type",
            FallbackReason::RenderFailed { .. } => "render_failed",
        }
    }
}

/// Record of a section that was replaced by the fallback renderer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionDiagnostic {
    pub section_id: String,
    pub section_type: String,
    pub reason: FallbackReason,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Composition {
    pub sections: Vec<RenderedSection>,
    pub diagnostics: Vec<SectionDiagnostic>,
}

impl Composition {
    pub fn section_ids(&self) -> Vec<&str> {
        self.sections
            .iter()
            .map(|section| section.section_id.as_str())
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn has_fallbacks(&self) -> bool {
        !self.diagnostics.is_empty()
    }
}

/// Render `sections` in order against `registry`.
///
/// Absent sections yield an empty composition. A section whose type is not
/// registered, or whose renderer fails, is rendered by the registry's fallback
/// and reported in [`Composition::diagnostics`]; siblings are unaffected.
pub fn resolve_sections(
    sections: Option<&[SectionDescriptor]>,
    registry: &SectionRegistry,
) -> Composition {
    let Some(sections) = sections else {
        debug!(
            target = "storefront::sections",
            "no sections supplied; composing empty page"
        );
        return Composition::default();
    };

    let mut composition = Composition {
        sections: Vec::with_capacity(sections.len()),
        diagnostics: Vec::new(),
    };

    for section in sections {
        let rendered = match registry.get(&section.section_type) {
            Some(renderer) => renderer
                .render(section)
                .map_err(|err| FallbackReason::RenderFailed {
                    message: err.to_string(),
                }),
            None => Err(FallbackReason::UnknownType),
        };

        match rendered {
            Ok(html) => {
                counter!(RENDER_METRIC).increment(1);
                composition.sections.push(RenderedSection {
                    section_id: section.section_id.clone(),
                    section_type: section.section_type.clone(),
                    outcome: SectionOutcome::Rendered,
                    html,
                });
            }
            Err(reason) => {
                let html = registry.fallback().render(section, &reason);
                record_fallback(section, &reason);
                composition.sections.push(RenderedSection {
                    section_id: section.section_id.clone(),
                    section_type: section.section_type.clone(),
                    outcome: SectionOutcome::Fallback,
                    html,
                });
                composition.diagnostics.push(SectionDiagnostic {
                    section_id: section.section_id.clone(),
                    section_type: section.section_type.clone(),
                    reason,
                });
            }
        }
    }

    composition
}

fn record_fallback(section: &SectionDescriptor, reason: &FallbackReason) {
    counter!(FALLBACK_METRIC, "reason" => reason.label()).increment(1);
    match reason {
        FallbackReason::UnknownType => warn!(
            target = "storefront::sections",
            section_id = %section.section_id,
            section_type = %section.section_type,
            "unsupported section type; rendering fallback"
        ),
        FallbackReason::RenderFailed { message } => warn!(
            target = "storefront::sections",
            section_id = %section.section_id,
            section_type = %section.section_type,
            error = %message,
            "section renderer failed; rendering fallback"
        ),
    }
}
