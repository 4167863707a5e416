use std::error::Error as StdError;

use thiserror::Error;

use crate::{
    application::assets::AssetError,
    config::LoadError,
    infra::error::InfraError,
    presentation::views::TemplateRenderError,
};

/// Flattened view of an error and its sources, for logging at the edge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorReport {
    pub source: &'static str,
    pub messages: Vec<String>,
}

impl ErrorReport {
    pub fn from_error(source: &'static str, error: &dyn StdError) -> Self {
        let mut messages = vec![error.to_string()];
        let mut current = error.source();
        while let Some(inner) = current {
            messages.push(inner.to_string());
            current = inner.source();
        }
        Self { source, messages }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] LoadError),
    #[error(transparent)]
    Infra(#[from] InfraError),
    #[error(transparent)]
    Asset(#[from] AssetError),
    #[error(transparent)]
    Template(#[from] TemplateRenderError),
}

impl AppError {
    /// Short message suitable for a terminal or an error page.
    pub fn presentation_message(&self) -> &'static str {
        match self {
            AppError::Config(_) => "Configuration could not be loaded",
            AppError::Infra(InfraError::Telemetry(_)) => "Logging subsystem could not start",
            AppError::Infra(_) => "Infrastructure failure",
            AppError::Asset(AssetError::NotFound { .. }) => "Hosted asset not found",
            AppError::Asset(_) => "Hosted asset could not be loaded",
            AppError::Template(_) => "Page could not be rendered",
        }
    }

    pub fn report(&self) -> ErrorReport {
        ErrorReport::from_error("application::error::AppError", self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_walks_source_chain() {
        let error = AppError::from(AssetError::Decode {
            path: "content/footer.json".into(),
            source: serde_json::from_str::<serde_json::Value>("{").expect_err("invalid json"),
        });
        let report = error.report();
        assert_eq!(report.source, "application::error::AppError");
        assert!(report.messages.len() >= 2, "{report:?}");
        assert_eq!(error.presentation_message(), "Hosted asset could not be loaded");
    }

    #[test]
    fn not_found_assets_have_their_own_message() {
        let error = AppError::from(AssetError::NotFound {
            path: "content/pages/missing.json".into(),
        });
        assert_eq!(error.presentation_message(), "Hosted asset not found");
    }
}
