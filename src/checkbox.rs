//! Checkbox literal canonicalization.

use crate::field::{CheckboxState, RawValue};

/// Literals accepted as [`CheckboxState::Selected`].
pub const SELECTED_LITERALS: &[&str] = &[
    "☑", "是", "选中", "true", "True", "checked", "yes", "Yes", "YES", "1", "selected",
];

/// Literals accepted as [`CheckboxState::Unselected`].
pub const UNSELECTED_LITERALS: &[&str] = &[
    "☐", "否", "不选", "false", "False", "unchecked", "no", "No", "NO", "0", "unselected",
];

/// Map a raw value onto a canonical checkbox state.
///
/// Surrounding whitespace is ignored. Returns `None` for anything outside the
/// literal table.
pub fn canonicalize_checkbox(raw: &RawValue) -> Option<CheckboxState> {
    match raw {
        RawValue::Bool(true) => Some(CheckboxState::Selected),
        RawValue::Bool(false) => Some(CheckboxState::Unselected),
        RawValue::Text(s) => {
            let s = s.trim();
            if SELECTED_LITERALS.contains(&s) {
                Some(CheckboxState::Selected)
            } else if UNSELECTED_LITERALS.contains(&s) {
                Some(CheckboxState::Unselected)
            } else {
                None
            }
        }
    }
}

pub(crate) fn accepted_literals() -> (Vec<String>, Vec<String>) {
    (
        SELECTED_LITERALS.iter().map(|s| s.to_string()).collect(),
        UNSELECTED_LITERALS.iter().map(|s| s.to_string()).collect(),
    )
}
