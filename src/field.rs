//! Field-level types: definitions, values and update directives.

use std::fmt;

use serde::{Deserialize, Serialize};

/// What kind of value a field holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    /// Free text, any non-empty string.
    Text,
    /// One of [`CheckboxState::Selected`] / [`CheckboxState::Unselected`].
    Checkbox,
    /// Computed from another field, never set directly.
    Derived,
}

impl FieldKind {
    /// Lowercase label used in messages.
    pub fn label(&self) -> &'static str {
        match self {
            FieldKind::Text => "text",
            FieldKind::Checkbox => "checkbox",
            FieldKind::Derived => "derived",
        }
    }
}

/// Conversion applied by a derived field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DerivationRule {
    /// Numeric amount rendered in Chinese financial numerals, e.g. `500000` -> `伍拾万元整`.
    AmountInWords,
}

/// How a derived field obtains its value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Derivation {
    /// The text field the value is computed from.
    pub source: String,
    /// The conversion rule.
    pub rule: DerivationRule,
}

/// Schema of one field within a contract type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDefinition {
    /// Name, unique within the contract type. Matches the `{{name}}` placeholder.
    pub name: String,
    /// Value kind.
    pub kind: FieldKind,
    /// Whether an unset value blocks generation.
    pub required: bool,
    /// Index of the owning group in priority order.
    pub group: usize,
    /// Fields overwritten with this field's value whenever it is set.
    pub aliases: Vec<String>,
    /// Present for [`FieldKind::Derived`] fields only.
    pub derivation: Option<Derivation>,
}

impl FieldDefinition {
    pub fn is_derived(&self) -> bool {
        self.kind == FieldKind::Derived
    }
}

/// Canonical checkbox state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckboxState {
    Selected,
    Unselected,
}

impl CheckboxState {
    /// Canonical literal used in persisted state.
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckboxState::Selected => "selected",
            CheckboxState::Unselected => "unselected",
        }
    }

    /// Glyph written into the generated document.
    pub fn glyph(&self) -> &'static str {
        match self {
            CheckboxState::Selected => "☑",
            CheckboxState::Unselected => "☐",
        }
    }
}

/// A resolved value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Text(String),
    Checkbox(CheckboxState),
}

impl Value {
    /// Text as stored, or the canonical checkbox literal.
    pub fn as_str(&self) -> &str {
        match self {
            Value::Text(s) => s,
            Value::Checkbox(state) => state.as_str(),
        }
    }

    /// Text as stored, or the checkbox glyph.
    pub fn display(&self) -> &str {
        match self {
            Value::Text(s) => s,
            Value::Checkbox(state) => state.glyph(),
        }
    }
}

/// Per-field state inside a [`crate::ContractState`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FieldValue {
    /// Not answered yet.
    #[default]
    Unset,
    /// The user declined to answer. Terminal, and satisfies the completeness gate.
    Skipped,
    /// Answered.
    Set(Value),
}

impl FieldValue {
    /// Set or skipped.
    pub fn is_resolved(&self) -> bool {
        !matches!(self, FieldValue::Unset)
    }

    pub fn value(&self) -> Option<&Value> {
        match self {
            FieldValue::Set(v) => Some(v),
            _ => None,
        }
    }
}

/// A value as supplied by the user, before canonicalization.
///
/// JSON batches may carry booleans for checkboxes; everything else is text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Bool(bool),
    Text(String),
}

impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawValue::Bool(b) => write!(f, "{}", b),
            RawValue::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<&str> for RawValue {
    fn from(s: &str) -> Self {
        RawValue::Text(s.to_string())
    }
}

impl From<String> for RawValue {
    fn from(s: String) -> Self {
        RawValue::Text(s)
    }
}

impl From<bool> for RawValue {
    fn from(b: bool) -> Self {
        RawValue::Bool(b)
    }
}

/// One requested change to a field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    /// Set the field from a raw value.
    Set(RawValue),
    /// Mark the field as explicitly skipped.
    Skip,
}

impl Directive {
    /// Shorthand for `Directive::Set(RawValue::Text(..))`.
    pub fn text(s: impl Into<String>) -> Self {
        Directive::Set(RawValue::Text(s.into()))
    }

    /// Shorthand for `Directive::Set(RawValue::Bool(..))`.
    pub fn flag(b: bool) -> Self {
        Directive::Set(RawValue::Bool(b))
    }
}
