use super::fixtures;
use crate::{ContractDefinition, DefinitionError, FieldKind, Registry};

fn load(extra: &str) -> Result<ContractDefinition, DefinitionError> {
    let source = format!(
        r#"
code = "t"
name = "测试合同"
template = "t.docx"

[[groups]]
name = "一"
priority = 1
fields = ["甲", "乙", "丙", "☐勾选", "☐另一勾选", "金额"]

{}
"#,
        extra
    );
    ContractDefinition::from_toml_str(&source)
}

// ============ Structure ============

#[test]
fn groups_sorted_by_priority() {
    let registry = fixtures::registry();
    let def = fixtures::sample(&registry);

    let groups: Vec<&str> = def.groups().iter().map(|g| g.name.as_str()).collect();
    assert_eq!(groups, ["当事人", "资质", "价款"]);

    let fields: Vec<&str> = def.fields().iter().map(|f| f.name.as_str()).collect();
    assert_eq!(
        fields,
        [
            "甲方名称",
            "甲方_联系地址抬头",
            "甲方_落款",
            "乙方名称",
            "☐甲方_统一社会信用代码",
            "☐乙方_统一社会信用代码",
            "☐乙方_营业执照",
            "合同总金额",
            "合同总金额大写",
            "备注",
        ]
    );
}

#[test]
fn field_kinds_inferred() {
    let registry = fixtures::registry();
    let def = fixtures::sample(&registry);

    assert_eq!(def.field("甲方名称").unwrap().kind, FieldKind::Text);
    assert_eq!(def.field("☐甲方_统一社会信用代码").unwrap().kind, FieldKind::Checkbox);
    let derived = def.field("合同总金额大写").unwrap();
    assert_eq!(derived.kind, FieldKind::Derived);
    assert_eq!(derived.derivation.as_ref().unwrap().source, "合同总金额");
    assert!(!def.field("备注").unwrap().required);
    assert!(def.field("乙方名称").unwrap().required);
}

#[test]
fn alias_closure_is_transitive() {
    let registry = fixtures::registry();
    let def = fixtures::sample(&registry);

    assert_eq!(def.alias_closure("甲方名称"), ["甲方_联系地址抬头", "甲方_落款"]);
    assert_eq!(def.alias_closure("甲方_联系地址抬头"), ["甲方_落款"]);
    assert!(def.alias_closure("甲方_落款").is_empty());
    assert!(def.alias_closure("不存在").is_empty());
}

#[test]
fn summaries_list_every_type() {
    let registry = fixtures::registry();
    let summaries = registry.summaries();
    assert_eq!(summaries.len(), 2);
    assert_eq!(summaries[0].code, "sample");
    assert_eq!(summaries[0].field_count, 10);
    assert_eq!(summaries[0].parties, ["甲方", "乙方"]);
}

// ============ Rejected definitions ============

#[test]
fn rejects_alias_cycle() {
    let err = load(
        r#"
[aliases]
"甲" = ["乙"]
"乙" = ["丙"]
"丙" = ["甲"]
"#,
    )
    .unwrap_err();
    assert!(matches!(err, DefinitionError::AliasCycle { .. }), "{:?}", err);
}

#[test]
fn rejects_self_alias() {
    let err = load(
        r#"
[aliases]
"甲" = ["甲"]
"#,
    )
    .unwrap_err();
    assert_eq!(
        err,
        DefinitionError::SelfAlias {
            contract: "t".into(),
            field: "甲".into()
        }
    );
}

#[test]
fn rejects_alias_between_kinds() {
    let err = load(
        r#"
[aliases]
"甲" = ["☐勾选"]
"#,
    )
    .unwrap_err();
    assert!(matches!(err, DefinitionError::AliasKindMismatch { .. }), "{:?}", err);
}

#[test]
fn rejects_chained_derivation() {
    let err = load(
        r#"
[derived."乙"]
source = "金额"
rule = "amount-in-words"

[derived."丙"]
source = "乙"
rule = "amount-in-words"
"#,
    )
    .unwrap_err();
    assert_eq!(
        err,
        DefinitionError::ChainedDerivation {
            contract: "t".into(),
            field: "丙".into(),
            source_field: "乙".into()
        }
    );
}

#[test]
fn rejects_checkbox_derivation_source() {
    let err = load(
        r#"
[derived."乙"]
source = "☐勾选"
rule = "amount-in-words"
"#,
    )
    .unwrap_err();
    assert!(matches!(err, DefinitionError::DerivationSourceKind { .. }), "{:?}", err);
}

#[test]
fn rejects_alias_on_derived_field() {
    let err = load(
        r#"
[aliases]
"甲" = ["乙"]

[derived."乙"]
source = "金额"
rule = "amount-in-words"
"#,
    )
    .unwrap_err();
    assert_eq!(
        err,
        DefinitionError::DerivedAlias {
            contract: "t".into(),
            field: "乙".into()
        }
    );
}

#[test]
fn rejects_undeclared_reference() {
    let err = load(
        r#"
[aliases]
"甲" = ["丁"]
"#,
    )
    .unwrap_err();
    assert!(
        matches!(&err, DefinitionError::UndeclaredField { field, .. } if field == "丁"),
        "{:?}",
        err
    );
}

#[test]
fn rejects_duplicate_field_and_empty_group() {
    let err = load(
        r#"
[[groups]]
name = "二"
priority = 2
fields = ["甲"]
"#,
    )
    .unwrap_err();
    assert!(matches!(err, DefinitionError::DuplicateField { .. }), "{:?}", err);

    let err = load(
        r#"
[[groups]]
name = "二"
priority = 2
fields = []
"#,
    )
    .unwrap_err();
    assert!(matches!(err, DefinitionError::EmptyGroup { .. }), "{:?}", err);
}

#[test]
fn rejects_duplicate_contract_code() {
    let err = Registry::from_toml_strs(&[fixtures::SAMPLE, fixtures::SAMPLE]).unwrap_err();
    assert_eq!(
        err,
        DefinitionError::DuplicateContract {
            code: "sample".into()
        }
    );
}

#[test]
fn rejects_malformed_toml() {
    let err = ContractDefinition::from_toml_str("code = ").unwrap_err();
    assert!(matches!(err, DefinitionError::Parse { .. }));
}
