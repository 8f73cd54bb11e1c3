//! The per-session contract state and its persisted form.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::checkbox::canonicalize_checkbox;
use crate::definition::ContractDefinition;
use crate::errors::{FillError, FillResult};
use crate::field::{FieldKind, FieldValue, RawValue, Value};
use crate::update::derive_value;

/// Field values of one in-progress contract.
///
/// Holds an entry for every field of its definition. Mutation goes through
/// [`crate::UpdateEngine`], which returns a new state rather than editing in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractState {
    contract: String,
    values: BTreeMap<String, FieldValue>,
    revision: u64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ContractState {
    /// Fresh state with every field unset.
    pub fn new(def: &ContractDefinition) -> Self {
        Self::new_at(def, Utc::now())
    }

    pub fn new_at(def: &ContractDefinition, now: DateTime<Utc>) -> Self {
        Self {
            contract: def.code().to_string(),
            values: def
                .fields()
                .iter()
                .map(|f| (f.name.clone(), FieldValue::Unset))
                .collect(),
            revision: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Code of the contract type this state belongs to.
    pub fn contract(&self) -> &str {
        &self.contract
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.values.get(name)
    }

    pub fn values(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of persisted transactions that changed at least one value.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// True when both states hold identical field values, ignoring markers.
    pub fn same_values(&self, other: &ContractState) -> bool {
        self.contract == other.contract && self.values == other.values
    }

    /// Names whose value differs from `other`.
    pub fn changed_fields<'a>(&'a self, other: &'a ContractState) -> Vec<&'a str> {
        self.values
            .iter()
            .filter(|(name, value)| other.values.get(name.as_str()) != Some(value))
            .map(|(name, _)| name.as_str())
            .collect()
    }

    /// Record a committed transaction.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.revision += 1;
        self.updated_at = now;
    }

    pub(crate) fn set_value(&mut self, name: &str, value: FieldValue) {
        if let Some(slot) = self.values.get_mut(name) {
            *slot = value;
        }
    }

    /// Rehydrate from persisted form, validating against the definition.
    pub fn from_persisted(def: &ContractDefinition, persisted: PersistedState) -> FillResult<Self> {
        if persisted.contract != def.code() {
            return Err(corrupt(format!(
                "state belongs to contract type `{}`, not `{}`",
                persisted.contract,
                def.code()
            )));
        }

        let mut state = Self {
            contract: persisted.contract,
            values: def
                .fields()
                .iter()
                .map(|f| (f.name.clone(), FieldValue::Unset))
                .collect(),
            revision: persisted.revision,
            created_at: persisted.created_at,
            updated_at: persisted.updated_at,
        };

        for (name, stored) in persisted.fields {
            let field = def.field(&name).ok_or_else(|| {
                corrupt(format!(
                    "field `{}` is not defined for contract type `{}`",
                    name,
                    def.code()
                ))
            })?;

            let value = match (field.kind, stored) {
                (_, StoredValue::Unset) => FieldValue::Unset,
                (FieldKind::Derived, StoredValue::Skipped) => {
                    return Err(corrupt(format!("derived field `{}` is marked skipped", name)))
                }
                (_, StoredValue::Skipped) => FieldValue::Skipped,
                (FieldKind::Checkbox, StoredValue::Set(raw)) => match canonicalize_checkbox(&raw) {
                    Some(checked) => FieldValue::Set(Value::Checkbox(checked)),
                    None => {
                        return Err(corrupt(format!(
                            "checkbox `{}` holds unrecognized value `{}`",
                            name, raw
                        )))
                    }
                },
                (_, StoredValue::Set(RawValue::Text(text))) if !text.trim().is_empty() => {
                    FieldValue::Set(Value::Text(text))
                }
                (_, StoredValue::Set(raw)) => {
                    return Err(corrupt(format!(
                        "text field `{}` holds invalid value `{}`",
                        name, raw
                    )))
                }
            };

            state.values.insert(name, value);
        }

        for field in def.fields().iter().filter(|f| f.is_derived()) {
            let expected = derive_value(field, &state);
            if state.values.get(&field.name) != Some(&expected) {
                return Err(corrupt(format!(
                    "derived field `{}` does not match its source",
                    field.name
                )));
            }
        }

        Ok(state)
    }

    /// Persisted form, with display metadata from the definition.
    pub fn to_persisted(&self, def: &ContractDefinition) -> PersistedState {
        PersistedState {
            contract: self.contract.clone(),
            name: def.name().to_string(),
            standard_code: def.standard_code().to_string(),
            revision: self.revision,
            created_at: self.created_at,
            updated_at: self.updated_at,
            fields: self
                .values
                .iter()
                .map(|(name, value)| (name.clone(), StoredValue::from(value)))
                .collect(),
        }
    }
}

/// On-disk layout of a [`ContractState`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedState {
    /// Contract type code.
    #[serde(rename = "type")]
    pub contract: String,
    /// Contract name, informational only.
    #[serde(default)]
    pub name: String,
    /// Standard identifier, informational only.
    #[serde(default)]
    pub standard_code: String,
    #[serde(default)]
    pub revision: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub fields: BTreeMap<String, StoredValue>,
}

/// Persisted field value; checkboxes are stored as `selected` / `unselected`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "value", rename_all = "lowercase")]
pub enum StoredValue {
    Unset,
    Skipped,
    Set(RawValue),
}

impl From<&FieldValue> for StoredValue {
    fn from(value: &FieldValue) -> Self {
        match value {
            FieldValue::Unset => StoredValue::Unset,
            FieldValue::Skipped => StoredValue::Skipped,
            FieldValue::Set(v) => StoredValue::Set(RawValue::Text(v.as_str().to_string())),
        }
    }
}

fn corrupt(reason: String) -> FillError {
    FillError::CorruptState { reason }
}
