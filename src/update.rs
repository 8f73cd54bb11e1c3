//! The update engine.
//!
//! Every update runs against a copy of the state. The copy replaces the caller's
//! state only when the whole batch succeeded, so a failed batch never leaves a
//! partial write behind.

use tracing::debug;

use crate::amount::amount_in_words;
use crate::checkbox::{accepted_literals, canonicalize_checkbox};
use crate::definition::ContractDefinition;
use crate::errors::{FillError, FillResult};
use crate::field::{DerivationRule, Directive, FieldDefinition, FieldKind, FieldValue, RawValue, Value};
use crate::state::ContractState;
use crate::suggest::suggest_field_names;

/// Applies [`Directive`]s to states of one contract type.
#[derive(Debug, Clone, Copy)]
pub struct UpdateEngine<'d> {
    def: &'d ContractDefinition,
}

impl<'d> UpdateEngine<'d> {
    pub fn new(def: &'d ContractDefinition) -> Self {
        Self { def }
    }

    /// Apply one directive to `name`.
    ///
    /// The value is canonicalized for the field's kind, copied to every alias
    /// target reachable from the field, and every derived field that reads from a
    /// touched field is recomputed. Applying the same directive twice yields the
    /// same state.
    pub fn apply(
        &self,
        state: &ContractState,
        name: &str,
        directive: Directive,
    ) -> FillResult<ContractState> {
        let mut next = state.clone();
        self.apply_one(&mut next, name, &directive)?;
        Ok(next)
    }

    /// Shorthand for applying [`Directive::Skip`].
    pub fn mark_skipped(&self, state: &ContractState, name: &str) -> FillResult<ContractState> {
        self.apply(state, name, Directive::Skip)
    }

    /// Apply a batch in order, all or nothing.
    ///
    /// The first failing entry aborts the batch and its error is returned; the
    /// input state is left untouched either way.
    pub fn apply_all<I, K>(&self, state: &ContractState, updates: I) -> FillResult<ContractState>
    where
        I: IntoIterator<Item = (K, Directive)>,
        K: AsRef<str>,
    {
        let mut next = state.clone();
        for (name, directive) in updates {
            self.apply_one(&mut next, name.as_ref(), &directive)?;
        }
        Ok(next)
    }

    fn apply_one(
        &self,
        state: &mut ContractState,
        name: &str,
        directive: &Directive,
    ) -> FillResult<()> {
        let idx = self
            .def
            .index_of(name)
            .ok_or_else(|| FillError::UnknownField {
                contract: self.def.code().to_string(),
                field: name.to_string(),
                suggestions: suggest_field_names(self.def, name),
            })?;
        let fields = self.def.fields();

        let field = &fields[idx];
        let value = resolve(field, directive)?;
        state.set_value(&field.name, value);

        let mut touched = vec![idx];
        for &target in self.def.propagation_targets(idx) {
            let target_field = &fields[target];
            let value = resolve(target_field, directive)?;
            debug!(from = %field.name, to = %target_field.name, "propagated alias");
            state.set_value(&target_field.name, value);
            touched.push(target);
        }

        for &source in &touched {
            for &dependent in self.def.derived_dependents(source) {
                let derived = &fields[dependent];
                let value = derive_value(derived, state);
                debug!(field = %derived.name, ?value, "recomputed derived field");
                state.set_value(&derived.name, value);
            }
        }
        Ok(())
    }
}

/// Canonical value a directive produces for one field.
fn resolve(field: &FieldDefinition, directive: &Directive) -> FillResult<FieldValue> {
    let raw = match directive {
        Directive::Skip if field.is_derived() => return Err(read_only(field)),
        Directive::Skip => return Ok(FieldValue::Skipped),
        Directive::Set(raw) => raw,
    };

    match (field.kind, raw) {
        (FieldKind::Derived, _) => Err(read_only(field)),
        (FieldKind::Checkbox, raw) => canonicalize_checkbox(raw)
            .map(|checked| FieldValue::Set(Value::Checkbox(checked)))
            .ok_or_else(|| {
                let (accepted_selected, accepted_unselected) = accepted_literals();
                FillError::InvalidCheckboxValue {
                    field: field.name.clone(),
                    value: raw.to_string(),
                    accepted_selected,
                    accepted_unselected,
                }
            }),
        (FieldKind::Text, RawValue::Bool(value)) => Err(FillError::TextValueExpected {
            field: field.name.clone(),
            value: *value,
        }),
        (FieldKind::Text, RawValue::Text(text)) if text.trim().is_empty() => {
            Err(FillError::EmptyValueNotAllowed {
                field: field.name.clone(),
            })
        }
        (FieldKind::Text, RawValue::Text(text)) => Ok(FieldValue::Set(Value::Text(text.clone()))),
    }
}

fn read_only(field: &FieldDefinition) -> FillError {
    FillError::DerivedFieldReadOnly {
        field: field.name.clone(),
        source_field: field
            .derivation
            .as_ref()
            .map(|d| d.source.clone())
            .unwrap_or_default(),
    }
}

/// Value a derived field must hold given the current state of its source.
///
/// An unset or skipped source leaves the derived field unset. A source that is
/// not a readable amount, such as `人民币伍拾万元（含税）`, is carried over as
/// entered. Non-derived fields always yield [`FieldValue::Unset`].
pub(crate) fn derive_value(field: &FieldDefinition, state: &ContractState) -> FieldValue {
    let derivation = match &field.derivation {
        Some(derivation) => derivation,
        None => return FieldValue::Unset,
    };

    let source = match state.get(&derivation.source).and_then(FieldValue::value) {
        Some(Value::Text(text)) => text,
        _ => return FieldValue::Unset,
    };

    let text = match derivation.rule {
        DerivationRule::AmountInWords => amount_in_words(source).unwrap_or_else(|| {
            debug!(field = %derivation.source, value = %source, "amount kept as entered");
            source.trim().to_string()
        }),
    };
    FieldValue::Set(Value::Text(text))
}
