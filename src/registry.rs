//! The immutable catalog of contract types.

use std::collections::HashSet;

use crate::definition::{ContractDefinition, DefinitionSource};
use crate::errors::{DefinitionError, FillError, FillResult};

/// Validated contract definitions, in registration order.
#[derive(Debug, Clone)]
pub struct Registry {
    definitions: Vec<ContractDefinition>,
}

/// Catalog entry for listing and disambiguation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractSummary {
    pub code: String,
    pub name: String,
    pub standard_code: String,
    pub description: String,
    pub parties: Vec<String>,
    pub field_count: usize,
}

impl Registry {
    /// Build from already validated definitions; codes must be unique.
    pub fn new(definitions: Vec<ContractDefinition>) -> Result<Self, DefinitionError> {
        let mut seen = HashSet::new();
        for def in &definitions {
            if !seen.insert(def.code().to_string()) {
                return Err(DefinitionError::DuplicateContract {
                    code: def.code().to_string(),
                });
            }
        }
        Ok(Self { definitions })
    }

    pub fn from_sources(sources: Vec<DefinitionSource>) -> Result<Self, DefinitionError> {
        let definitions = sources
            .into_iter()
            .map(ContractDefinition::from_source)
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(definitions)
    }

    /// Parse and validate one TOML document per contract type.
    pub fn from_toml_strs(sources: &[&str]) -> Result<Self, DefinitionError> {
        let definitions = sources
            .iter()
            .map(|s| ContractDefinition::from_toml_str(s))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(definitions)
    }

    pub fn get(&self, code: &str) -> Option<&ContractDefinition> {
        self.definitions.iter().find(|d| d.code() == code)
    }

    /// Like [`Registry::get`], failing with [`FillError::UnknownType`].
    pub fn lookup(&self, code: &str) -> FillResult<&ContractDefinition> {
        self.get(code).ok_or_else(|| FillError::UnknownType {
            code: code.to_string(),
            known: self.codes().map(str::to_string).collect(),
        })
    }

    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.definitions.iter().map(|d| d.code())
    }

    pub fn iter(&self) -> impl Iterator<Item = &ContractDefinition> {
        self.definitions.iter()
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    pub fn summaries(&self) -> Vec<ContractSummary> {
        self.definitions
            .iter()
            .map(|d| ContractSummary {
                code: d.code().to_string(),
                name: d.name().to_string(),
                standard_code: d.standard_code().to_string(),
                description: d.description().to_string(),
                parties: d.parties().to_vec(),
                field_count: d.field_count(),
            })
            .collect()
    }
}
