use super::fixtures;
use crate::{ContractRouter, FillError, IntentClassifier, Registry, RouteRequest};

#[test]
fn explicit_code_resolves() {
    let registry = fixtures::registry();
    let router = ContractRouter::new(&registry);

    let def = router.resolve(RouteRequest::Code("other")).unwrap();
    assert_eq!(def.name(), "其他服务合同");
}

#[test]
fn unknown_code_lists_known_types() {
    let registry = fixtures::registry();
    let err = ContractRouter::new(&registry)
        .resolve(RouteRequest::Code("lease"))
        .unwrap_err();
    insta::assert_snapshot!(err.to_string(), @"unknown contract type `lease` (known types: sample, other)");
}

#[test]
fn intent_matches_keywords_case_insensitively() {
    let registry = fixtures::registry();
    let router = ContractRouter::new(&registry);

    assert_eq!(
        router
            .resolve(RouteRequest::Intent("帮我起草一份 SAMPLE 合同"))
            .unwrap()
            .code(),
        "sample"
    );
    assert_eq!(
        router
            .resolve(RouteRequest::Intent("我们要把数据处理外包出去"))
            .unwrap()
            .code(),
        "other"
    );
}

#[test]
fn intent_matching_several_types_is_ambiguous() {
    let registry = fixtures::registry();
    let err = ContractRouter::new(&registry)
        .resolve(RouteRequest::Intent("样例委托"))
        .unwrap_err();
    match err {
        FillError::AmbiguousIntent { candidates, .. } => {
            assert_eq!(candidates, ["sample", "other"])
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn intent_matching_nothing_is_ambiguous() {
    let registry = fixtures::registry();
    let err = ContractRouter::new(&registry)
        .resolve(RouteRequest::Intent("租房合同"))
        .unwrap_err();
    insta::assert_snapshot!(err.to_string(), @"no contract type recognized in `租房合同`");
}

struct Fixed(&'static str);

impl IntentClassifier for Fixed {
    fn candidates(&self, _registry: &Registry, _intent: &str) -> Vec<String> {
        vec![self.0.to_string()]
    }
}

#[test]
fn custom_classifier_is_used() {
    let registry = fixtures::registry();
    let router = ContractRouter::with_classifier(&registry, Fixed("other"));
    assert_eq!(
        router.resolve(RouteRequest::Intent("任何文字")).unwrap().code(),
        "other"
    );
}
