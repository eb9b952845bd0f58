//! Builders for the native `rbac.authorization.k8s.io/v1` kinds.

pub mod clusterrole;
pub mod clusterrolebinding;
pub mod role;
pub mod rolebinding;

use k8s_openapi::api::rbac::v1::{PolicyRule, Subject};

use crate::error::ValidationError;

/// Rules must carry at least one verb and one resource each.
pub(crate) fn validate_rules(
    kind: &'static str,
    rules: &[PolicyRule],
) -> Result<(), ValidationError> {
    if rules.is_empty() {
        return Err(ValidationError::EmptyField { kind, field: "rules" });
    }

    for rule in rules {
        if rule.verbs.is_empty() {
            return Err(ValidationError::EmptyField {
                kind,
                field: "rule verbs",
            });
        }
        if rule
            .resources
            .as_deref()
            .unwrap_or_default()
            .is_empty()
        {
            return Err(ValidationError::EmptyField {
                kind,
                field: "rule resources",
            });
        }
    }

    Ok(())
}

pub(crate) fn validate_subjects(
    kind: &'static str,
    subjects: &[Subject],
) -> Result<(), ValidationError> {
    if subjects.is_empty() {
        return Err(ValidationError::EmptyField {
            kind,
            field: "subjects",
        });
    }

    for subject in subjects {
        if subject.kind.is_empty() {
            return Err(ValidationError::EmptyField {
                kind,
                field: "subject kind",
            });
        }
        if subject.name.is_empty() {
            return Err(ValidationError::EmptyField {
                kind,
                field: "subject name",
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    macro_rules! from_json {
        ($($json:tt)+) => {
            ::serde_json::from_value(::serde_json::json!($($json)+)).expect("Invalid json")
        };
    }

    #[test]
    fn should_reject_an_empty_rule_list() {
        assert_matches!(
            validate_rules("role", &[]),
            Err(ValidationError::EmptyField { kind: "role", field: "rules" })
        );
    }

    #[test]
    fn should_reject_a_rule_without_verbs() {
        let rule: PolicyRule = from_json!({ "resources": ["pods"], "verbs": [] });
        assert_matches!(
            validate_rules("role", &[rule]),
            Err(ValidationError::EmptyField { kind: "role", field: "rule verbs" })
        );
    }

    #[test]
    fn should_reject_a_rule_without_resources() {
        let rule: PolicyRule = from_json!({ "verbs": ["get"] });
        assert_matches!(
            validate_rules("role", &[rule]),
            Err(ValidationError::EmptyField { kind: "role", field: "rule resources" })
        );
    }

    #[test]
    fn should_reject_a_subject_without_a_name() {
        let subject: Subject = from_json!({ "kind": "ServiceAccount", "name": "" });
        assert_matches!(
            validate_subjects("rolebinding", &[subject]),
            Err(ValidationError::EmptyField { kind: "rolebinding", field: "subject name" })
        );
    }
}
