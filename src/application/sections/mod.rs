//! Section composition: registry of renderers keyed by section type, and the
//! resolver that turns an ordered list of descriptors into rendered sections.

pub mod builtin;
mod registry;
mod resolver;

pub use registry::{
    FallbackRenderer, SectionOverrides, SectionRegistry, SectionRenderError, SectionRenderer,
    UnsupportedSection,
};
pub use resolver::{
    Composition, FALLBACK_METRIC, FallbackReason, RENDER_METRIC, RenderedSection,
    SectionDiagnostic, SectionOutcome, resolve_sections,
};
