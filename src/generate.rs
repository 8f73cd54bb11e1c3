//! Generation trigger.
//!
//! The engine never renders documents itself. Once the gate passes and every
//! placeholder of the template names a field, the field map is rendered to display
//! strings and handed to a [`DocumentFiller`].

use std::collections::{BTreeMap, BTreeSet};

use tracing::{info, warn};

use crate::definition::ContractDefinition;
use crate::errors::{FillError, FillResult};
use crate::field::FieldValue;
use crate::gate::{check, Readiness};
use crate::state::ContractState;

/// Placeholder name -> text substituted into the template.
pub type RenderedFields = BTreeMap<String, String>;

/// Substitutes rendered field values into a template.
pub trait DocumentFiller {
    /// What a successful fill produces, e.g. the written path.
    type Output;

    /// Names of the placeholders `template` contains.
    fn placeholders(&self, template: &str) -> FillResult<BTreeSet<String>>;

    /// Fill `template` with `fields`.
    fn fill(&self, template: &str, fields: &RenderedFields) -> FillResult<Self::Output>;
}

/// Display strings for every field of `state`.
///
/// Checkboxes render as `☑` / `☐`; skipped and unset fields render empty.
pub fn render_fields(def: &ContractDefinition, state: &ContractState) -> RenderedFields {
    def.fields()
        .iter()
        .map(|f| {
            let text = match state.get(&f.name) {
                Some(FieldValue::Set(value)) => value.display().to_string(),
                _ => String::new(),
            };
            (f.name.clone(), text)
        })
        .collect()
}

/// Placeholders that name no field of `def`.
///
/// Such a placeholder can never receive a value, so a template containing one
/// would be cleared in that spot no matter how complete the state is.
pub fn unmapped_placeholders(def: &ContractDefinition, placeholders: &BTreeSet<String>) -> Vec<String> {
    placeholders
        .iter()
        .filter(|name| def.field(name.as_str()).is_none())
        .cloned()
        .collect()
}

/// Fail with [`FillError::UnmappedPlaceholders`] if `placeholders` asks for
/// anything `def` does not define.
pub fn check_template(
    def: &ContractDefinition,
    template: &str,
    placeholders: &BTreeSet<String>,
) -> FillResult<()> {
    let unmapped = unmapped_placeholders(def, placeholders);
    if unmapped.is_empty() {
        return Ok(());
    }
    warn!(contract = def.code(), template, ?unmapped, "template placeholders without a field");
    Err(FillError::UnmappedPlaceholders {
        contract: def.code().to_string(),
        template: template.to_string(),
        placeholders: unmapped,
    })
}

/// Fill the contract's template once the completeness gate passes.
///
/// Fails with [`FillError::NotReady`] while any required field is unset, and with
/// [`FillError::UnmappedPlaceholders`] when the template holds a placeholder no
/// field answers. The filler's own errors are passed through unchanged.
pub fn generate<F: DocumentFiller>(
    def: &ContractDefinition,
    state: &ContractState,
    filler: &F,
) -> FillResult<F::Output> {
    if let Readiness::Incomplete(deficiencies) = check(def, state) {
        return Err(FillError::NotReady(deficiencies));
    }

    let placeholders = filler.placeholders(def.template())?;
    check_template(def, def.template(), &placeholders)?;

    let fields = render_fields(def, state);
    let output = filler.fill(def.template(), &fields)?;
    info!(contract = def.code(), template = def.template(), "generated contract");
    Ok(output)
}
