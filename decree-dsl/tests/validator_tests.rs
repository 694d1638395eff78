//! Integration tests for the validation protocol

use decree_dsl::{extract_policy, validate_policy, validate_snippet};

#[test]
fn policy_validation_is_deterministic() {
    let sources = [
        "allow alice read on file:reports",
        "deny bob write on db:users",
        "not a policy at all",
        "",
        "allow * read on *",
    ];

    for source in sources {
        let first = validate_policy(source);
        let second = validate_policy(source);
        assert_eq!(first, second, "validation of {:?} was not stable", source);
    }
}

#[test]
fn strict_valid_single_statements_are_snippet_valid() {
    let statements = [
        "allow alice read on file:reports",
        "allow group:auditors list on log:*",
        "allow alice read on file:x when clearance >= 3",
        "allow * write on db:scratch when team == \"infra\"",
    ];

    for statement in statements {
        assert!(
            validate_policy(statement).ok,
            "{:?} should be policy-valid",
            statement
        );
        assert!(
            validate_snippet(statement),
            "{:?} should also be snippet-valid",
            statement
        );
    }
}

#[test]
fn snippet_valid_does_not_imply_policy_valid() {
    // Relaxed accepts these; strict does not.
    let snippets = [
        "deny bob write on db:users", // no allow statement
        "when clearance >= 3",        // bare guard
    ];

    for snippet in snippets {
        assert!(validate_snippet(snippet));
        assert!(!validate_policy(snippet).ok);
    }
}

#[test]
fn extraction_of_valid_policy_is_identity() {
    let policy = "allow alice read on file:reports\ndeny bob write on db:users";
    let extraction = extract_policy(policy);
    assert!(extraction.valid);
    assert_eq!(extraction.policy, policy);
}

#[test]
fn extraction_never_degrades_input() {
    let cases = [
        "allow alice read on file:reports",
        "Some prose\nallow alice read on file:reports",
        "nothing usable here",
    ];

    for raw in cases {
        let raw_valid = validate_policy(raw).ok;
        let extraction = extract_policy(raw);
        if raw_valid {
            assert!(extraction.valid);
            assert_eq!(extraction.policy, raw);
        } else if extraction.valid {
            assert!(validate_policy(&extraction.policy).ok);
        } else {
            assert_eq!(extraction.policy, raw);
        }
    }
}

mod properties {
    use super::*;
    use proptest::prelude::*;

    fn action() -> impl Strategy<Value = &'static str> {
        prop::sample::select(vec![
            "read", "write", "create", "delete", "update", "execute", "list", "manage",
        ])
    }

    // Keywords would lex as keywords, not identifiers.
    const RESERVED: [&str; 9] = [
        "allow", "deny", "on", "when", "and", "or", "not", "contains", "in",
    ];

    fn name() -> impl Strategy<Value = String> {
        "[a-z][a-z0-9_]{0,11}".prop_filter("reserved word", |s| !RESERVED.contains(&s.as_str()))
    }

    prop_compose! {
        fn allow_statement()(subject in name(), verb in action(), kind in name(), res in name()) -> String {
            format!("allow {} {} on {}:{}", subject, verb, kind, res)
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn prop_validation_idempotent(source in ".{0,120}") {
            let first = validate_policy(&source);
            let second = validate_policy(&source);
            prop_assert_eq!(first, second);
        }

        #[test]
        fn prop_snippet_verdict_stable(source in ".{0,120}") {
            prop_assert_eq!(validate_snippet(&source), validate_snippet(&source));
        }

        #[test]
        fn prop_generated_allow_statements_valid_in_both_modes(stmt in allow_statement()) {
            prop_assert!(validate_policy(&stmt).ok);
            prop_assert!(validate_snippet(&stmt));
        }

        #[test]
        fn prop_policy_valid_statement_is_snippet_valid(stmt in allow_statement()) {
            if validate_policy(&stmt).ok {
                prop_assert!(validate_snippet(&stmt));
            }
        }

        #[test]
        fn prop_extraction_result_is_valid_or_raw(raw in ".{0,200}") {
            let extraction = extract_policy(&raw);
            if extraction.valid {
                prop_assert!(validate_policy(&extraction.policy).ok);
            } else {
                prop_assert_eq!(extraction.policy, raw);
            }
        }
    }
}
