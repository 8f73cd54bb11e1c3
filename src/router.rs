//! Contract type routing.
//!
//! An explicit code must match a registered code exactly. A free-text intent is
//! handed to an [`IntentClassifier`] and must yield exactly one candidate; zero or
//! several candidates fail with [`FillError::AmbiguousIntent`].

use tracing::debug;

use crate::definition::ContractDefinition;
use crate::errors::{FillError, FillResult};
use crate::registry::Registry;

/// What the caller knows about the wanted contract type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteRequest<'a> {
    /// An explicit registry code such as `tigong`.
    Code(&'a str),
    /// A free-form description of what the user wants.
    Intent(&'a str),
}

/// Maps an intent sentence to candidate contract codes.
pub trait IntentClassifier {
    /// Every code whose trigger set matches, in registry order.
    fn candidates(&self, registry: &Registry, intent: &str) -> Vec<String>;
}

/// Substring matching against each type's name and keyword list.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordClassifier;

impl KeywordClassifier {
    pub fn new() -> Self {
        Self
    }

    fn matches(def: &ContractDefinition, intent: &str) -> bool {
        std::iter::once(def.name())
            .chain(def.keywords().iter().map(String::as_str))
            .filter(|trigger| !trigger.trim().is_empty())
            .any(|trigger| intent.contains(&trigger.to_lowercase()))
    }
}

impl IntentClassifier for KeywordClassifier {
    fn candidates(&self, registry: &Registry, intent: &str) -> Vec<String> {
        let intent = intent.to_lowercase();
        registry
            .iter()
            .filter(|def| Self::matches(def, &intent))
            .map(|def| def.code().to_string())
            .collect()
    }
}

/// Resolves a [`RouteRequest`] to exactly one registered definition.
pub struct ContractRouter<'r, C = KeywordClassifier> {
    registry: &'r Registry,
    classifier: C,
}

impl<'r> ContractRouter<'r, KeywordClassifier> {
    /// Router using keyword matching for intents.
    pub fn new(registry: &'r Registry) -> Self {
        Self {
            registry,
            classifier: KeywordClassifier,
        }
    }
}

impl<'r, C: IntentClassifier> ContractRouter<'r, C> {
    pub fn with_classifier(registry: &'r Registry, classifier: C) -> Self {
        Self {
            registry,
            classifier,
        }
    }

    pub fn resolve(&self, request: RouteRequest<'_>) -> FillResult<&'r ContractDefinition> {
        match request {
            RouteRequest::Code(code) => self.resolve_code(code),
            RouteRequest::Intent(intent) => self.resolve_intent(intent),
        }
    }

    pub fn resolve_code(&self, code: &str) -> FillResult<&'r ContractDefinition> {
        self.registry.lookup(code)
    }

    pub fn resolve_intent(&self, intent: &str) -> FillResult<&'r ContractDefinition> {
        let candidates = self.classifier.candidates(self.registry, intent);
        debug!(intent, ?candidates, "classified intent");

        if candidates.len() == 1 {
            return self.registry.lookup(&candidates[0]);
        }
        Err(FillError::AmbiguousIntent {
            intent: intent.to_string(),
            candidates,
        })
    }
}
