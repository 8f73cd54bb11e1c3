use super::fixtures;
use crate::{
    check, progress, ContractState, Deficiencies, Directive, Readiness, StoredValue, UpdateEngine,
};

fn describe(deficiencies: &Deficiencies) -> String {
    deficiencies
        .groups
        .iter()
        .map(|g| format!("[{}] {}: {}", g.priority, g.group, g.fields.join(", ")))
        .collect::<Vec<_>>()
        .join("\n")
}

fn incomplete(readiness: Readiness) -> Deficiencies {
    match readiness {
        Readiness::Incomplete(d) => d,
        Readiness::Ready => panic!("expected an incomplete state"),
    }
}

#[test]
fn fresh_state_lists_every_required_input() {
    let registry = fixtures::registry();
    let def = fixtures::sample(&registry);

    let deficiencies = incomplete(check(def, &fixtures::fresh(def)));
    assert_eq!(deficiencies.contract, "sample");
    assert_eq!(deficiencies.len(), 8);
    insta::assert_snapshot!(describe(&deficiencies), @r###"
    [1] 当事人: 甲方名称, 甲方_联系地址抬头, 甲方_落款, 乙方名称
    [2] 资质: ☐甲方_统一社会信用代码, ☐乙方_统一社会信用代码, ☐乙方_营业执照
    [3] 价款: 合同总金额
    "###);
}

#[test]
fn resolved_groups_drop_out_of_report() {
    let registry = fixtures::registry();
    let def = fixtures::sample(&registry);

    let state = UpdateEngine::new(def)
        .apply_all(
            &fixtures::fresh(def),
            vec![
                ("甲方名称", Directive::text("甲公司")),
                ("乙方名称", Directive::Skip),
                ("☐乙方_统一社会信用代码", Directive::text("否")),
            ],
        )
        .unwrap();

    let deficiencies = incomplete(check(def, &state));
    assert_eq!(deficiencies.next_group().unwrap().group, "资质");
    assert_eq!(
        deficiencies.fields().collect::<Vec<_>>(),
        ["☐甲方_统一社会信用代码", "合同总金额"]
    );
}

#[test]
fn ready_once_every_input_resolved() {
    let registry = fixtures::registry();
    let def = fixtures::sample(&registry);

    let state = UpdateEngine::new(def)
        .apply_all(
            &fixtures::fresh(def),
            vec![
                ("甲方名称", Directive::text("甲公司")),
                ("乙方名称", Directive::text("乙公司")),
                ("☐甲方_统一社会信用代码", Directive::text("是")),
                ("☐乙方_统一社会信用代码", Directive::Skip),
                ("合同总金额", Directive::Skip),
            ],
        )
        .unwrap();

    assert_eq!(check(def, &state), Readiness::Ready);
}

#[test]
fn progress_counts_inputs_only() {
    let registry = fixtures::registry();
    let def = fixtures::sample(&registry);

    let state = UpdateEngine::new(def)
        .apply_all(
            &fixtures::fresh(def),
            vec![
                ("甲方名称", Directive::text("甲公司")),
                ("合同总金额", Directive::text("100")),
                ("备注", Directive::Skip),
            ],
        )
        .unwrap();

    let report = progress(def, &state);
    assert_eq!(report.total, 9);
    assert_eq!(report.set, 4);
    assert_eq!(report.skipped, 1);
    assert_eq!(report.unset, 4);
    assert_eq!(report.percentage(), 55);
    assert_eq!(report.next_group().unwrap().group, "当事人");
}

#[test]
fn clearing_one_field_of_ready_state_reports_exactly_that_field() {
    let registry = fixtures::registry();
    let def = fixtures::sample(&registry);

    let ready = UpdateEngine::new(def)
        .apply_all(
            &fixtures::fresh(def),
            vec![
                ("甲方名称", Directive::text("甲公司")),
                ("乙方名称", Directive::text("乙公司")),
                ("☐甲方_统一社会信用代码", Directive::text("是")),
                ("☐乙方_统一社会信用代码", Directive::Skip),
                ("合同总金额", Directive::text("500000")),
            ],
        )
        .unwrap();
    assert_eq!(check(def, &ready), Readiness::Ready);

    let inputs = def.fields().iter().filter(|f| f.required && !f.is_derived());
    for field in inputs {
        let mut persisted = ready.to_persisted(def);
        persisted.fields.insert(field.name.clone(), StoredValue::Unset);
        for derived in def.fields().iter().filter(|d| {
            d.derivation.as_ref().map_or(false, |rule| rule.source == field.name)
        }) {
            persisted.fields.insert(derived.name.clone(), StoredValue::Unset);
        }
        let cleared = ContractState::from_persisted(def, persisted).unwrap();

        let deficiencies = incomplete(check(def, &cleared));
        assert_eq!(
            deficiencies.fields().collect::<Vec<_>>(),
            [field.name.as_str()],
            "clearing {}",
            field.name
        );
    }
}
