use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use thiserror::Error;
use tracing::error;

use crate::domain::sections::SectionDescriptor;
use crate::presentation::views::{TemplateRenderError, UnsupportedSectionTemplate, render_template};

use super::builtin;
use super::resolver::FallbackReason;

#[derive(Debug, Error)]
pub enum SectionRenderError {
    #[error("section field `{field}` is invalid: {source}")]
    InvalidField {
        field: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error(transparent)]
    Template(#[from] TemplateRenderError),
    #[error("{0}")]
    Custom(String),
}

impl SectionRenderError {
    pub fn invalid_field(field: &'static str, source: serde_json::Error) -> Self {
        Self::InvalidField { field, source }
    }

    pub fn custom(message: impl Into<String>) -> Self {
        Self::Custom(message.into())
    }
}

/// Renders one section type to an HTML fragment.
pub trait SectionRenderer: Send + Sync {
    fn render(&self, section: &SectionDescriptor) -> Result<String, SectionRenderError>;
}

impl<F> SectionRenderer for F
where
    F: Fn(&SectionDescriptor) -> Result<String, SectionRenderError> + Send + Sync,
{
    fn render(&self, section: &SectionDescriptor) -> Result<String, SectionRenderError> {
        self(section)
    }
}

/// Renders the placeholder for a section no registered renderer could handle.
///
/// Infallible; an implementation that cannot render returns an empty fragment.
pub trait FallbackRenderer: Send + Sync {
    fn render(&self, section: &SectionDescriptor, reason: &FallbackReason) -> String;
}

impl<F> FallbackRenderer for F
where
    F: Fn(&SectionDescriptor, &FallbackReason) -> String + Send + Sync,
{
    fn render(&self, section: &SectionDescriptor, reason: &FallbackReason) -> String {
        self(section, reason)
    }
}

/// Default fallback: a hidden element that records the type and reason.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnsupportedSection;

impl FallbackRenderer for UnsupportedSection {
    fn render(&self, section: &SectionDescriptor, reason: &FallbackReason) -> String {
        let template = UnsupportedSectionTemplate {
            section_id: section.section_id.clone(),
            section_type: section.section_type.clone(),
            reason: reason.label(),
        };
        render_template(&template).unwrap_or_else(|err| {
            error!(
                target = "storefront::sections",
                section_id = %section.section_id,
                origin = err.origin(),
                error = %err,
                "failed to render unsupported-section placeholder"
            );
            String::new()
        })
    }
}

/// Caller-supplied renderers layered over a registry.
///
/// Inserting the same type twice keeps the later renderer.
#[derive(Clone, Default)]
pub struct SectionOverrides {
    entries: Vec<(String, Arc<dyn SectionRenderer>)>,
}

impl SectionOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(
        mut self,
        section_type: impl Into<String>,
        renderer: impl SectionRenderer + 'static,
    ) -> Self {
        self.entries.push((section_type.into(), Arc::new(renderer)));
        self
    }
}

impl fmt::Debug for SectionOverrides {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.entries.iter().map(|(section_type, _)| section_type))
            .finish()
    }
}

/// Effective mapping from section type to renderer for one composition pass.
///
/// A registry is an immutable value: [`SectionRegistry::with_overrides`]
/// returns a new registry and leaves the receiver untouched, so a shared
/// built-in registry can back any number of per-page variants.
#[derive(Clone)]
pub struct SectionRegistry {
    renderers: HashMap<String, Arc<dyn SectionRenderer>>,
    fallback: Arc<dyn FallbackRenderer>,
}

impl SectionRegistry {
    /// Registry with no renderers; every section falls back.
    pub fn empty() -> Self {
        Self {
            renderers: HashMap::new(),
            fallback: Arc::new(UnsupportedSection),
        }
    }

    /// Registry with the built-in section types.
    pub fn builtin() -> Self {
        builtin::renderers()
            .into_iter()
            .fold(Self::empty(), |registry, (section_type, renderer)| {
                registry.with_shared(section_type, renderer)
            })
    }

    pub fn with_renderer(
        self,
        section_type: impl Into<String>,
        renderer: impl SectionRenderer + 'static,
    ) -> Self {
        self.with_shared(section_type, Arc::new(renderer))
    }

    fn with_shared(
        mut self,
        section_type: impl Into<String>,
        renderer: Arc<dyn SectionRenderer>,
    ) -> Self {
        self.renderers.insert(section_type.into(), renderer);
        self
    }

    pub fn with_fallback(mut self, fallback: impl FallbackRenderer + 'static) -> Self {
        self.fallback = Arc::new(fallback);
        self
    }

    /// Built-ins ∪ overrides; an override replaces a renderer of the same type.
    pub fn with_overrides(&self, overrides: &SectionOverrides) -> Self {
        overrides
            .entries
            .iter()
            .fold(self.clone(), |registry, (section_type, renderer)| {
                registry.with_shared(section_type.clone(), Arc::clone(renderer))
            })
    }

    pub fn get(&self, section_type: &str) -> Option<&dyn SectionRenderer> {
        self.renderers.get(section_type).map(Arc::as_ref)
    }

    pub fn contains(&self, section_type: &str) -> bool {
        self.renderers.contains_key(section_type)
    }

    pub fn fallback(&self) -> &dyn FallbackRenderer {
        self.fallback.as_ref()
    }

    /// Registered types in lexical order.
    pub fn section_types(&self) -> Vec<&str> {
        let mut types: Vec<&str> = self.renderers.keys().map(String::as_str).collect();
        types.sort_unstable();
        types
    }
}

impl Default for SectionRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl fmt::Debug for SectionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SectionRegistry")
            .field("section_types", &self.section_types())
            .finish_non_exhaustive()
    }
}
