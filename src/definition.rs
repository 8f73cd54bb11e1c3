//! Contract type definitions: groups, field kinds, aliases and derivations.
//!
//! A [`ContractDefinition`] is built from a [`DefinitionSource`] (usually parsed from
//! TOML) and validated once. After construction it is immutable; every structural
//! mistake is reported as a [`DefinitionError`] here, never at update time.
//!
//! Field kinds follow the template conventions: a name starting with `☐` is a
//! checkbox, a name listed under `[derived]` is derived, anything else is text.
//!
//! Alias links form a directed graph that must be acyclic. The transitive target set
//! of every alias source is precomputed, so an update reaches its fixed point in a
//! single pass.

use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};

use pathfinding::directed::topological_sort::topological_sort;
use serde::{Deserialize, Serialize};

use crate::errors::DefinitionError;
use crate::field::{Derivation, DerivationRule, FieldDefinition, FieldKind};

const CHECKBOX_PREFIX: char = '☐';

/// Serialized form of a contract type definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefinitionSource {
    /// Short routing code, e.g. `tigong`.
    pub code: String,
    /// Human-readable contract name.
    pub name: String,
    /// National standard identifier, e.g. `GF-2025-2615`.
    #[serde(default)]
    pub standard_code: String,
    #[serde(default)]
    pub description: String,
    /// Party roles, in signing order.
    #[serde(default)]
    pub parties: Vec<String>,
    /// Trigger phrases for intent routing.
    #[serde(default)]
    pub keywords: Vec<String>,
    /// Template file name handed to the document filler.
    pub template: String,
    pub groups: Vec<GroupSource>,
    /// Alias source -> targets.
    #[serde(default)]
    pub aliases: BTreeMap<String, Vec<String>>,
    /// Derived field -> derivation.
    #[serde(default)]
    pub derived: BTreeMap<String, DerivedSource>,
    /// Fields that do not block generation when unset.
    #[serde(default)]
    pub optional: Vec<String>,
}

/// Serialized form of one collection group.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupSource {
    pub name: String,
    /// Lower is collected first.
    pub priority: u32,
    #[serde(default)]
    pub description: String,
    /// Prompt used when asking the user for this group.
    #[serde(default)]
    pub ask: String,
    pub fields: Vec<String>,
}

/// Serialized form of a derivation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DerivedSource {
    pub source: String,
    pub rule: DerivationRule,
}

/// A validated collection group.
#[derive(Debug, Clone)]
pub struct GroupDefinition {
    pub name: String,
    pub priority: u32,
    pub description: String,
    pub ask: String,
    /// Field names in declaration order.
    pub fields: Vec<String>,
}

/// A validated, immutable contract type.
#[derive(Debug, Clone)]
pub struct ContractDefinition {
    code: String,
    name: String,
    standard_code: String,
    description: String,
    parties: Vec<String>,
    keywords: Vec<String>,
    template: String,
    /// Sorted by priority, ties in declaration order.
    groups: Vec<GroupDefinition>,
    /// Group order, then declaration order within each group.
    fields: Vec<FieldDefinition>,
    index: HashMap<String, usize>,
    /// Alias source -> every field reachable through alias links.
    propagation: HashMap<usize, Vec<usize>>,
    /// Derivation source -> derived fields reading from it.
    dependents: HashMap<usize, Vec<usize>>,
}

impl ContractDefinition {
    /// Parse and validate a TOML definition.
    pub fn from_toml_str(source: &str) -> Result<Self, DefinitionError> {
        let source: DefinitionSource = toml::from_str(source)?;
        Self::from_source(source)
    }

    /// Validate a definition source.
    pub fn from_source(source: DefinitionSource) -> Result<Self, DefinitionError> {
        let contract = source.code.clone();

        let mut group_sources = source.groups;
        group_sources.sort_by_key(|g| g.priority);

        let mut groups = Vec::with_capacity(group_sources.len());
        let mut fields = Vec::new();
        let mut index = HashMap::new();

        for (group_idx, group) in group_sources.into_iter().enumerate() {
            if group.fields.is_empty() {
                return Err(DefinitionError::EmptyGroup {
                    contract,
                    group: group.name,
                });
            }
            for name in &group.fields {
                if index.contains_key(name) {
                    return Err(DefinitionError::DuplicateField {
                        contract,
                        field: name.clone(),
                    });
                }
                let kind = if source.derived.contains_key(name) {
                    FieldKind::Derived
                } else if name.starts_with(CHECKBOX_PREFIX) {
                    FieldKind::Checkbox
                } else {
                    FieldKind::Text
                };
                index.insert(name.clone(), fields.len());
                fields.push(FieldDefinition {
                    name: name.clone(),
                    kind,
                    required: true,
                    group: group_idx,
                    aliases: Vec::new(),
                    derivation: None,
                });
            }
            groups.push(GroupDefinition {
                name: group.name,
                priority: group.priority,
                description: group.description,
                ask: group.ask,
                fields: group.fields,
            });
        }

        let lookup = |name: &str, context: &'static str| -> Result<usize, DefinitionError> {
            index
                .get(name)
                .copied()
                .ok_or_else(|| DefinitionError::UndeclaredField {
                    contract: contract.clone(),
                    field: name.to_string(),
                    context,
                })
        };

        for name in &source.optional {
            let idx = lookup(name, "`optional`")?;
            fields[idx].required = false;
        }

        let mut dependents: HashMap<usize, Vec<usize>> = HashMap::new();
        for (name, derived) in &source.derived {
            let idx = lookup(name, "`[derived]`")?;
            let src = lookup(&derived.source, "a derivation")?;
            match fields[src].kind {
                FieldKind::Derived => {
                    return Err(DefinitionError::ChainedDerivation {
                        contract: contract.clone(),
                        field: name.clone(),
                        source_field: derived.source.clone(),
                    })
                }
                FieldKind::Checkbox => {
                    return Err(DefinitionError::DerivationSourceKind {
                        contract: contract.clone(),
                        field: name.clone(),
                        source_field: derived.source.clone(),
                    })
                }
                FieldKind::Text => {}
            }
            fields[idx].derivation = Some(Derivation {
                source: derived.source.clone(),
                rule: derived.rule,
            });
            dependents.entry(src).or_default().push(idx);
        }

        let mut edges: HashMap<usize, Vec<usize>> = HashMap::new();
        for (name, targets) in &source.aliases {
            let src = lookup(name, "`[aliases]`")?;
            if fields[src].is_derived() {
                return Err(DefinitionError::DerivedAlias {
                    contract: contract.clone(),
                    field: name.clone(),
                });
            }
            for target in targets {
                let dst = lookup(target, "`[aliases]`")?;
                if dst == src {
                    return Err(DefinitionError::SelfAlias {
                        contract: contract.clone(),
                        field: name.clone(),
                    });
                }
                if fields[dst].is_derived() {
                    return Err(DefinitionError::DerivedAlias {
                        contract: contract.clone(),
                        field: target.clone(),
                    });
                }
                if fields[dst].kind != fields[src].kind {
                    return Err(DefinitionError::AliasKindMismatch {
                        contract: contract.clone(),
                        source_field: name.clone(),
                        target: target.clone(),
                        source_kind: fields[src].kind.label(),
                        target_kind: fields[dst].kind.label(),
                    });
                }
                let out = edges.entry(src).or_default();
                if !out.contains(&dst) {
                    out.push(dst);
                    fields[src].aliases.push(target.clone());
                }
            }
        }

        let roots: Vec<usize> = edges.keys().copied().collect();
        topological_sort(&roots, |n| edges.get(n).cloned().unwrap_or_default()).map_err(
            |node| DefinitionError::AliasCycle {
                contract: contract.clone(),
                field: fields[node].name.clone(),
            },
        )?;

        let propagation = edges
            .keys()
            .map(|&src| (src, reachable(src, &edges)))
            .collect();

        Ok(Self {
            code: source.code,
            name: source.name,
            standard_code: source.standard_code,
            description: source.description,
            parties: source.parties,
            keywords: source.keywords,
            template: source.template,
            groups,
            fields,
            index,
            propagation,
            dependents,
        })
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn standard_code(&self) -> &str {
        &self.standard_code
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn parties(&self) -> &[String] {
        &self.parties
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    /// Groups in collection order.
    pub fn groups(&self) -> &[GroupDefinition] {
        &self.groups
    }

    /// Fields in collection order.
    pub fn fields(&self) -> &[FieldDefinition] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldDefinition> {
        self.index.get(name).map(|&i| &self.fields[i])
    }

    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    /// Every field a write to `name` propagates to, transitively, in breadth-first order.
    pub fn alias_closure(&self, name: &str) -> Vec<&str> {
        self.index
            .get(name)
            .map(|&i| {
                self.propagation_targets(i)
                    .iter()
                    .map(|&t| self.fields[t].name.as_str())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub(crate) fn index_of(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub(crate) fn propagation_targets(&self, idx: usize) -> &[usize] {
        self.propagation.get(&idx).map(Vec::as_slice).unwrap_or(&[])
    }

    pub(crate) fn derived_dependents(&self, idx: usize) -> &[usize] {
        self.dependents.get(&idx).map(Vec::as_slice).unwrap_or(&[])
    }
}

fn reachable(start: usize, edges: &HashMap<usize, Vec<usize>>) -> Vec<usize> {
    let mut seen = HashSet::new();
    let mut order = Vec::new();
    let mut queue = VecDeque::from([start]);
    seen.insert(start);
    while let Some(node) = queue.pop_front() {
        for &next in edges.get(&node).into_iter().flatten() {
            if seen.insert(next) {
                order.push(next);
                queue.push_back(next);
            }
        }
    }
    order
}
