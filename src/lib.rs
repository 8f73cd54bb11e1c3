//! Field collection and validation engine for fixed legal-contract templates.
//!
//! A contract is filled over many separate invocations. Each invocation loads the
//! persisted [`ContractState`], applies one logical operation and persists the result.
//!
//! ## Components
//!
//! - [`Registry`] - Immutable catalog of [`ContractDefinition`]s, validated at load time
//! - [`ContractRouter`] - Resolves an explicit code or a free-text intent to one definition
//! - [`ContractState`] - The mutable per-session field map
//! - [`StateFile`] - Atomic JSON persistence of a [`ContractState`]
//! - [`UpdateEngine`] - Applies single and batch updates with alias propagation and derivation
//! - [`check`] - The completeness gate, with a deficiency report ordered by group priority
//! - [`generate`] - Hands a complete state to a [`DocumentFiller`]
//!
//! ## Example
//!
//! ```
//! use contract_fill::{check, Directive, Readiness, Registry, UpdateEngine, ContractState};
//!
//! let registry = Registry::from_toml_strs(&[r#"
//!     code = "demo"
//!     name = "演示合同"
//!     template = "demo.docx"
//!
//!     [[groups]]
//!     name = "当事人"
//!     priority = 1
//!     fields = ["甲方名称", "甲方_落款"]
//!
//!     [aliases]
//!     "甲方名称" = ["甲方_落款"]
//! "#]).unwrap();
//!
//! let def = registry.lookup("demo").unwrap();
//! let state = ContractState::new(def);
//! let state = UpdateEngine::new(def)
//!     .apply(&state, "甲方名称", Directive::text("北京数据科技有限公司"))
//!     .unwrap();
//!
//! assert!(matches!(check(def, &state), Readiness::Ready));
//! ```

mod amount;
mod checkbox;
mod definition;
mod errors;
mod field;
mod gate;
mod generate;
mod registry;
mod router;
mod state;
mod store;
mod suggest;
mod update;

pub use amount::amount_in_words;
pub use checkbox::{canonicalize_checkbox, SELECTED_LITERALS, UNSELECTED_LITERALS};
pub use definition::{
    ContractDefinition, DefinitionSource, DerivedSource, GroupDefinition, GroupSource,
};
pub use errors::{DefinitionError, FillError, FillResult};
pub use field::{
    CheckboxState, Derivation, DerivationRule, Directive, FieldDefinition, FieldKind, FieldValue,
    RawValue, Value,
};
pub use gate::{
    check, progress, Deficiencies, GroupDeficiency, GroupProgress, Progress, Readiness,
};
pub use generate::{
    check_template, generate, render_fields, unmapped_placeholders, DocumentFiller, RenderedFields,
};
pub use registry::{ContractSummary, Registry};
pub use router::{ContractRouter, IntentClassifier, KeywordClassifier, RouteRequest};
pub use state::{ContractState, PersistedState, StoredValue};
pub use store::StateFile;
pub use suggest::suggest_field_names;
pub use update::UpdateEngine;
