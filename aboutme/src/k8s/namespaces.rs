//! Namespace candidates for the pod search.
use crate::{config::SearchOptions, selector::parse_selector};

use super::ControlPlane;

/// The ordered namespaces to search: everything the selector matched, then the fallback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceCandidates {
    /// Namespaces matched by the selector, in the order the API server listed them.
    pub selected: Vec<String>,
    /// Always tried last, even if it also appears in `selected`.
    pub fallback: String,
}

impl NamespaceCandidates {
    pub fn fallback_only(fallback: impl Into<String>) -> Self {
        Self {
            selected: Vec::new(),
            fallback: fallback.into(),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.selected
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(self.fallback.as_str()))
    }
}

/// List the namespaces matching the configured selector.
///
/// Failures are not fatal: an unparseable selector or a failed list call leaves
/// only the fallback namespace as a candidate.
pub async fn namespace_candidates<C: ControlPlane + ?Sized>(
    client: &C,
    options: &SearchOptions,
) -> NamespaceCandidates {
    let selector = match parse_selector(&options.selector) {
        Ok(selector) => selector,
        Err(e) => {
            tracing::warn!("Ignoring namespace selector: {}", e);
            return NamespaceCandidates::fallback_only(&options.fallback_namespace);
        }
    };

    let selected = match client.list_namespaces(&selector).await {
        Ok(namespaces) => namespaces,
        Err(e) => {
            tracing::warn!(
                selector = %options.selector,
                "Failed listing namespaces, falling back to {:?}: {}",
                options.fallback_namespace,
                e
            );
            Vec::new()
        }
    };
    tracing::debug!("Namespace candidates from {:?}: {:?}", options.selector, selected);

    NamespaceCandidates {
        selected,
        fallback: options.fallback_namespace.clone(),
    }
}
