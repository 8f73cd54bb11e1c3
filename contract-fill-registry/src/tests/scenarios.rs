//! End-to-end collection rounds against the built-in `tigong` definition.

use std::collections::BTreeSet;

use contract_fill::{
    check, generate, CheckboxState, ContractDefinition, ContractState, Directive, DocumentFiller,
    FieldValue, FillError, FillResult, Readiness, RenderedFields, StateFile, UpdateEngine, Value,
};
use tempfile::TempDir;

use crate::builtin;

struct NullFiller;

impl DocumentFiller for NullFiller {
    type Output = ();

    fn placeholders(&self, _template: &str) -> FillResult<BTreeSet<String>> {
        Ok(BTreeSet::new())
    }

    fn fill(&self, _template: &str, _fields: &RenderedFields) -> FillResult<()> {
        Ok(())
    }
}

fn tigong() -> &'static ContractDefinition {
    builtin().unwrap().lookup("tigong").unwrap()
}

#[test]
fn init_leaves_every_field_unset() {
    let def = tigong();
    let state = ContractState::new(def);

    assert_eq!(state.values().count(), def.field_count());
    assert!(state.values().all(|(_, v)| *v == FieldValue::Unset));
}

#[test]
fn party_name_fills_its_aliases() {
    let def = tigong();
    let state = UpdateEngine::new(def)
        .apply(
            &ContractState::new(def),
            "甲方名称",
            Directive::text("北京数据科技有限公司"),
        )
        .unwrap();

    let expected = FieldValue::Set(Value::Text("北京数据科技有限公司".into()));
    assert_eq!(state.get("甲方名称"), Some(&expected));
    assert_eq!(state.get("甲方_联系地址抬头"), Some(&expected));

    let deficiencies = match check(def, &state) {
        Readiness::Incomplete(d) => d,
        Readiness::Ready => panic!("a single field cannot complete the contract"),
    };
    let groups: Vec<&str> = deficiencies.groups.iter().map(|g| g.group.as_str()).collect();
    assert_eq!(
        groups,
        ["合同信息", "甲方信息", "乙方信息", "数据标的", "交付", "价款与支付", "期限与争议解决"]
    );
    assert_eq!(
        deficiencies.groups[1].fields[..2],
        ["☐甲方_统一社会信用代码", "☐甲方_其他证件"]
    );
    // 甲方名称 and its two aliases are resolved; 合同总金额大写 follows its source.
    assert_eq!(deficiencies.len(), def.field_count() - 4);
}

#[test]
fn checkbox_answer_leaves_deficiency_list() {
    let def = tigong();
    let state = UpdateEngine::new(def)
        .apply(&ContractState::new(def), "☐甲方_统一社会信用代码", Directive::text("是"))
        .unwrap();
    assert_eq!(
        state.get("☐甲方_统一社会信用代码"),
        Some(&FieldValue::Set(Value::Checkbox(CheckboxState::Selected)))
    );

    match generate(def, &state, &NullFiller) {
        Err(FillError::NotReady(deficiencies)) => {
            let missing: Vec<&str> = deficiencies.fields().collect();
            assert!(!missing.contains(&"☐甲方_统一社会信用代码"));
            assert!(missing.contains(&"☐甲方_其他证件"));
            assert!(missing.contains(&"甲方名称"));
        }
        other => panic!("expected NotReady, got {:?}", other),
    }
}

#[test]
fn unknown_field_leaves_state_unchanged() {
    let def = tigong();
    let state = ContractState::new(def);

    let err = UpdateEngine::new(def)
        .apply(&state, "甲方证件号码", Directive::text("91110000000000000X"))
        .unwrap_err();
    match err {
        FillError::UnknownField { suggestions, .. } => {
            assert_eq!(suggestions.first().map(String::as_str), Some("甲方_证件号码"))
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert!(state.values().all(|(_, v)| *v == FieldValue::Unset));
}

#[test]
fn full_collection_round_trips_through_disk() {
    let dir = TempDir::new().unwrap();
    let file = StateFile::new(dir.path().join("tigong.json"));
    let registry = builtin().unwrap();
    let def = tigong();
    let engine = UpdateEngine::new(def);

    file.persist(def, &ContractState::new(def)).unwrap();

    for group in def.groups() {
        let (_, state) = file.load(registry).unwrap();
        let batch = group
            .fields
            .iter()
            .filter(|name| def.field(name).map_or(false, |f| !f.is_derived()))
            .filter(|name| state.get(name) == Some(&FieldValue::Unset))
            .map(|name| {
                let directive = if name.starts_with('☐') {
                    Directive::text("否")
                } else if name.as_str() == "合同总金额" {
                    Directive::text("500000")
                } else {
                    Directive::text(format!("{}的值", name))
                };
                (name.clone(), directive)
            })
            .collect::<Vec<_>>();
        let mut next = engine.apply_all(&state, batch).unwrap();
        next.touch(state.updated_at());
        file.persist(def, &next).unwrap();
    }

    let (_, state) = file.load(registry).unwrap();
    assert_eq!(check(def, &state), Readiness::Ready);
    assert_eq!(
        state.get("合同总金额大写"),
        Some(&FieldValue::Set(Value::Text("伍拾万元整".into())))
    );
    assert_eq!(state.revision(), def.groups().len() as u64);
    generate(def, &state, &NullFiller).unwrap();
}
