//! Error types for the fill engine.
//!
//! [`FillError`] covers every user-recoverable condition raised while routing,
//! updating, loading or generating. [`DefinitionError`] covers mistakes in a
//! contract definition and is only ever raised while the registry is built.

use std::path::PathBuf;

use thiserror::Error;

use crate::gate::Deficiencies;

/// Errors that can occur while filling a contract.
#[derive(Debug, Error)]
pub enum FillError {
    /// No registered contract type has this code.
    #[error("unknown contract type `{code}` (known types: {})", known.join(", "))]
    UnknownType { code: String, known: Vec<String> },

    /// The intent matched zero or several contract types.
    #[error("{}", describe_ambiguity(intent, candidates))]
    AmbiguousIntent {
        intent: String,
        candidates: Vec<String>,
    },

    /// The field is not part of the contract type.
    #[error("{}", describe_unknown_field(contract, field, suggestions))]
    UnknownField {
        contract: String,
        field: String,
        suggestions: Vec<String>,
    },

    /// Derived fields are computed, never written.
    #[error("field `{field}` is derived from `{source_field}` and cannot be set directly")]
    DerivedFieldReadOnly { field: String, source_field: String },

    /// The literal does not map to a checkbox state.
    #[error(
        "invalid checkbox value `{value}` for `{field}` (selected: {}; unselected: {})",
        accepted_selected.join(" "),
        accepted_unselected.join(" ")
    )]
    InvalidCheckboxValue {
        field: String,
        value: String,
        accepted_selected: Vec<String>,
        accepted_unselected: Vec<String>,
    },

    /// Empty text is rejected; skipping is a separate directive.
    #[error("empty value for `{field}` is not allowed; mark the field as skipped instead")]
    EmptyValueNotAllowed { field: String },

    /// A boolean was supplied for a text field.
    #[error("field `{field}` expects text, got boolean `{value}`")]
    TextValueExpected { field: String, value: bool },

    /// The persisted state does not match its contract definition.
    #[error("corrupt state: {reason}")]
    CorruptState { reason: String },

    /// Generation was requested before every field was resolved.
    #[error("contract `{}` is not ready: {} field(s) unresolved", .0.contract, .0.len())]
    NotReady(Deficiencies),

    /// The template contains placeholders that name no field of the contract type.
    #[error(
        "template `{template}` has placeholders with no field in `{contract}`: {}",
        placeholders.join(", ")
    )]
    UnmappedPlaceholders {
        contract: String,
        template: String,
        placeholders: Vec<String>,
    },

    /// A contract definition failed validation.
    #[error(transparent)]
    Definition(#[from] DefinitionError),

    /// Reading or writing a file failed.
    #[error("I/O error on {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The document filler could not produce the artifact.
    #[error("template `{template}`: {message}")]
    Template { template: String, message: String },
}

/// Errors in a contract type definition, raised at load time.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DefinitionError {
    /// The TOML source could not be parsed.
    #[error("failed to parse contract definition: {message}")]
    Parse { message: String },

    /// Two definitions share a code.
    #[error("duplicate contract type code `{code}`")]
    DuplicateContract { code: String },

    /// A field appears twice across the groups.
    #[error("[{contract}] field `{field}` is declared more than once")]
    DuplicateField { contract: String, field: String },

    /// A group declares no fields.
    #[error("[{contract}] group `{group}` has no fields")]
    EmptyGroup { contract: String, group: String },

    /// An alias, derivation or optional entry names a field no group declares.
    #[error("[{contract}] `{field}` is referenced by {context} but not declared in any group")]
    UndeclaredField {
        contract: String,
        field: String,
        context: &'static str,
    },

    /// A field lists itself as an alias target.
    #[error("[{contract}] field `{field}` aliases itself")]
    SelfAlias { contract: String, field: String },

    /// The alias graph is not acyclic.
    #[error("[{contract}] alias cycle through `{field}`")]
    AliasCycle { contract: String, field: String },

    /// Alias source and target differ in kind.
    #[error("[{contract}] alias `{source_field}` -> `{target}` links a {source_kind} field to a {target_kind} field")]
    AliasKindMismatch {
        contract: String,
        source_field: String,
        target: String,
        source_kind: &'static str,
        target_kind: &'static str,
    },

    /// Derived fields take part in no alias link.
    #[error("[{contract}] derived field `{field}` cannot take part in an alias")]
    DerivedAlias { contract: String, field: String },

    /// A derivation reads from another derived field.
    #[error("[{contract}] derived field `{field}` reads from derived field `{source_field}`")]
    ChainedDerivation {
        contract: String,
        field: String,
        source_field: String,
    },

    /// A derivation source must be a text field.
    #[error("[{contract}] derived field `{field}` reads from non-text field `{source_field}`")]
    DerivationSourceKind {
        contract: String,
        field: String,
        source_field: String,
    },
}

/// Result type for fill operations.
pub type FillResult<T> = Result<T, FillError>;

fn describe_ambiguity(intent: &str, candidates: &[String]) -> String {
    if candidates.is_empty() {
        format!("no contract type recognized in `{}`", intent)
    } else {
        format!(
            "intent `{}` matches several contract types: {}",
            intent,
            candidates.join(", ")
        )
    }
}

fn describe_unknown_field(contract: &str, field: &str, suggestions: &[String]) -> String {
    if suggestions.is_empty() {
        format!("unknown field `{}` for contract type `{}`", field, contract)
    } else {
        format!(
            "unknown field `{}` for contract type `{}` (did you mean: {})",
            field,
            contract,
            suggestions.join(", ")
        )
    }
}

impl From<toml::de::Error> for DefinitionError {
    fn from(e: toml::de::Error) -> Self {
        DefinitionError::Parse {
            message: e.to_string(),
        }
    }
}
