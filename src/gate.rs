//! The completeness gate and progress accounting.
//!
//! A state is ready when every required input field is set or skipped. Derived
//! fields follow their source and are never reported on their own.

use serde::Serialize;

use crate::definition::ContractDefinition;
use crate::field::FieldValue;
use crate::state::ContractState;

/// Outcome of [`check`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Readiness {
    Ready,
    Incomplete(Deficiencies),
}

impl Readiness {
    pub fn is_ready(&self) -> bool {
        matches!(self, Readiness::Ready)
    }
}

/// Unresolved fields, grouped in collection order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Deficiencies {
    pub contract: String,
    /// Groups by ascending priority; only groups with something missing.
    pub groups: Vec<GroupDeficiency>,
}

/// Missing fields of one group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupDeficiency {
    pub group: String,
    pub priority: u32,
    /// Prompt for asking the user about this group.
    pub ask: String,
    /// In declaration order.
    pub fields: Vec<String>,
}

impl Deficiencies {
    /// Total number of missing fields.
    pub fn len(&self) -> usize {
        self.groups.iter().map(|g| g.fields.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Every missing field, in report order.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.groups
            .iter()
            .flat_map(|g| g.fields.iter().map(String::as_str))
    }

    /// The group to collect next.
    pub fn next_group(&self) -> Option<&GroupDeficiency> {
        self.groups.first()
    }
}

/// Decide whether `state` may be handed to generation.
pub fn check(def: &ContractDefinition, state: &ContractState) -> Readiness {
    let fields = def.fields();
    let groups: Vec<GroupDeficiency> = def
        .groups()
        .iter()
        .enumerate()
        .filter_map(|(group_idx, group)| {
            let missing: Vec<String> = fields
                .iter()
                .filter(|f| f.group == group_idx && f.required && !f.is_derived())
                .filter(|f| !state.get(&f.name).map_or(false, FieldValue::is_resolved))
                .map(|f| f.name.clone())
                .collect();
            if missing.is_empty() {
                None
            } else {
                Some(GroupDeficiency {
                    group: group.name.clone(),
                    priority: group.priority,
                    ask: group.ask.clone(),
                    fields: missing,
                })
            }
        })
        .collect();

    if groups.is_empty() {
        Readiness::Ready
    } else {
        Readiness::Incomplete(Deficiencies {
            contract: def.code().to_string(),
            groups,
        })
    }
}

/// Counts over the input (non-derived) fields of a state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Progress {
    pub total: usize,
    pub set: usize,
    pub skipped: usize,
    pub unset: usize,
    pub groups: Vec<GroupProgress>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupProgress {
    pub group: String,
    pub priority: u32,
    pub total: usize,
    pub resolved: usize,
}

impl Progress {
    /// Resolved share of input fields, 0 to 100.
    pub fn percentage(&self) -> u32 {
        if self.total == 0 {
            return 100;
        }
        ((self.set + self.skipped) * 100 / self.total) as u32
    }

    /// First group in priority order that still has unresolved fields.
    pub fn next_group(&self) -> Option<&GroupProgress> {
        self.groups.iter().find(|g| g.resolved < g.total)
    }
}

pub fn progress(def: &ContractDefinition, state: &ContractState) -> Progress {
    let mut report = Progress {
        groups: def
            .groups()
            .iter()
            .map(|g| GroupProgress {
                group: g.name.clone(),
                priority: g.priority,
                total: 0,
                resolved: 0,
            })
            .collect(),
        ..Progress::default()
    };

    for field in def.fields().iter().filter(|f| !f.is_derived()) {
        let value = state.get(&field.name).cloned().unwrap_or_default();
        report.total += 1;
        match value {
            FieldValue::Set(_) => report.set += 1,
            FieldValue::Skipped => report.skipped += 1,
            FieldValue::Unset => report.unset += 1,
        }
        let group = &mut report.groups[field.group];
        group.total += 1;
        if value.is_resolved() {
            group.resolved += 1;
        }
    }
    report
}
